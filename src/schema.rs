// Column normalization for the two report layouts.
//
// Each report type has a static table of canonical fields and the header
// aliases accepted for them. Exports from different store systems name the
// same concept differently ("Special Code" vs "Specialcode1", "WH" vs
// "Warehouse"), so headers are matched case-insensitively after trimming.
use crate::error::{ReportError, ReportResult};
use std::collections::HashMap;
use tracing::debug;

pub const SPECIAL_CODE: &str = "Specialcode1";
pub const QTY_SOLD: &str = "Qty_Sold";
pub const MERCH_GROUP: &str = "Merch Group";
pub const COLOR: &str = "Color";
pub const WAREHOUSE: &str = "Warehouse";
pub const RAYON: &str = "RAYON";
pub const CASH: &str = "Cash";
pub const LOCATION_QUANTITY: &str = "Location_Quantity";
pub const LABEL_TYPE: &str = "EtiketTip";

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

pub static SALES_SCHEMA: TableSchema = TableSchema {
    name: "Sales",
    fields: &[
        FieldSpec { canonical: SPECIAL_CODE, aliases: &["Specialcode1", "Special Code"] },
        FieldSpec { canonical: QTY_SOLD, aliases: &["Quantity", "Qty"] },
        FieldSpec { canonical: MERCH_GROUP, aliases: &["Merch Group", "Top Group"] },
        FieldSpec { canonical: COLOR, aliases: &["Color", "RenkKodu"] },
    ],
};

pub static STOCK_SCHEMA: TableSchema = TableSchema {
    name: "Stock",
    fields: &[
        FieldSpec { canonical: SPECIAL_CODE, aliases: &["Specialcode1", "Special Code"] },
        FieldSpec { canonical: MERCH_GROUP, aliases: &["Merch Group", "Top Group"] },
        FieldSpec { canonical: COLOR, aliases: &["Color", "RenkKodu"] },
        FieldSpec { canonical: WAREHOUSE, aliases: &["Warehouse", "WH"] },
        FieldSpec { canonical: RAYON, aliases: &["RAYON", "Store"] },
        FieldSpec { canonical: CASH, aliases: &["Cash", "Price"] },
        FieldSpec {
            canonical: LOCATION_QUANTITY,
            aliases: &["Location: Quantity", "Location Quantity", "Location_Qty"],
        },
        FieldSpec { canonical: LABEL_TYPE, aliases: &["EtiketTip", "Etiket Tip", "Label Type"] },
    ],
};

/// A sheet as read from disk: one header row and string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A table whose matched columns carry their canonical names.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    index: HashMap<&'static str, usize>,
}

impl NormalizedTable {
    pub fn column(&self, canonical: &str) -> Option<usize> {
        self.index.get(canonical).copied()
    }

    /// Cell of `row` under a canonical field. Short rows read as missing.
    pub fn cell<'a>(&self, row: &'a [String], canonical: &str) -> Option<&'a str> {
        let idx = self.column(canonical)?;
        row.get(idx).map(String::as_str)
    }
}

fn header_key(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Resolve every canonical field of `schema` against the table headers in a
/// single pass. The first header (left to right) matching any alias wins.
pub fn normalize(raw: RawTable, schema: &TableSchema) -> ReportResult<NormalizedTable> {
    let alias_keys: Vec<Vec<String>> = schema
        .fields
        .iter()
        .map(|f| f.aliases.iter().map(|a| header_key(a)).collect())
        .collect();

    let mut resolved: Vec<Option<usize>> = vec![None; schema.fields.len()];
    for (col, header) in raw.headers.iter().enumerate() {
        let key = header_key(header);
        for (slot, aliases) in resolved.iter_mut().zip(&alias_keys) {
            if slot.is_none() && aliases.iter().any(|a| *a == key) {
                *slot = Some(col);
            }
        }
    }

    let missing: Vec<String> = schema
        .fields
        .iter()
        .zip(&resolved)
        .filter(|(_, slot)| slot.is_none())
        .map(|(field, _)| field.canonical.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::Schema { table: schema.name.to_string(), missing });
    }

    let mut headers = raw.headers;
    let mut index = HashMap::with_capacity(schema.fields.len());
    for (field, slot) in schema.fields.iter().zip(resolved) {
        if let Some(col) = slot {
            debug!(table = schema.name, field = field.canonical, source = %headers[col], "column matched");
            headers[col] = field.canonical.to_string();
            index.insert(field.canonical, col);
        }
    }

    Ok(NormalizedTable { headers, rows: raw.rows, index })
}

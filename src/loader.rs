// Reading the uploaded reports into typed records.
//
// Spreadsheets (first sheet) and CSV exports are both read into a `RawTable`
// of trimmed string cells. The schema layer then resolves the columns, and the
// cells are converted to records with the zero-fill numeric policy.
use crate::error::{ReportError, ReportResult};
use crate::schema::{
    self, NormalizedTable, RawTable, TableSchema, CASH, COLOR, LABEL_TYPE, LOCATION_QUANTITY,
    MERCH_GROUP, QTY_SOLD, RAYON, SALES_SCHEMA, SPECIAL_CODE, STOCK_SCHEMA, WAREHOUSE,
};
use crate::types::{SalesRecord, StockRecord};
use crate::util::{parse_cash, parse_qty};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub sales_rows: usize,
    pub stock_rows: usize,
}

pub fn read_table(path: &Path) -> ReportResult<RawTable> {
    if !path.exists() {
        return Err(ReportError::FileNotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let table = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path)?,
        _ => return Err(ReportError::UnsupportedFormat(ext)),
    };
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read table"
    );
    Ok(table)
}

fn read_csv(path: &Path) -> ReportResult<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn read_spreadsheet(path: &Path) -> ReportResult<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ReportError::EmptyWorkbook(path.display().to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .ok_or_else(|| ReportError::EmptyWorkbook(path.display().to_string()))?
        .iter()
        .map(cell_text)
        .collect();

    let mut rows = Vec::new();
    for data_row in sheet_rows {
        let row: Vec<String> = data_row.iter().map(cell_text).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

fn text(table: &NormalizedTable, row: &[String], field: &str) -> String {
    table.cell(row, field).unwrap_or("").to_string()
}

pub fn sales_records(table: &NormalizedTable) -> Vec<SalesRecord> {
    table
        .rows
        .iter()
        .map(|row| SalesRecord {
            special_code: text(table, row, SPECIAL_CODE),
            qty_sold: parse_qty(table.cell(row, QTY_SOLD)),
            merch_group: text(table, row, MERCH_GROUP),
            color: text(table, row, COLOR),
        })
        .collect()
}

pub fn stock_records(table: &NormalizedTable) -> Vec<StockRecord> {
    table
        .rows
        .iter()
        .map(|row| StockRecord {
            special_code: text(table, row, SPECIAL_CODE),
            merch_group: text(table, row, MERCH_GROUP),
            color: text(table, row, COLOR),
            warehouse: parse_qty(table.cell(row, WAREHOUSE)),
            rayon: parse_qty(table.cell(row, RAYON)),
            cash: parse_cash(table.cell(row, CASH)),
            location_quantity: parse_qty(table.cell(row, LOCATION_QUANTITY)),
            label_type: text(table, row, LABEL_TYPE),
        })
        .collect()
}

fn load_normalized(path: &Path, schema: &TableSchema) -> ReportResult<NormalizedTable> {
    let raw = read_table(path)?;
    schema::normalize(raw, schema)
}

/// Read and normalize both reports. Either schema failure aborts the load
/// before any record is produced.
pub fn load_reports(
    sales_path: &Path,
    stock_path: &Path,
) -> ReportResult<(Vec<SalesRecord>, Vec<StockRecord>, LoadReport)> {
    let sales_table = load_normalized(sales_path, &SALES_SCHEMA)?;
    let stock_table = load_normalized(stock_path, &STOCK_SCHEMA)?;

    let sales = sales_records(&sales_table);
    let stock = stock_records(&stock_table);
    let report = LoadReport { sales_rows: sales.len(), stock_rows: stock.len() };
    info!(sales_rows = report.sales_rows, stock_rows = report.stock_rows, "reports loaded");
    Ok((sales, stock, report))
}

// Key normalization and removal of the excluded code.
use crate::config::ReportSettings;
use crate::types::{SalesRecord, StockRecord};
use crate::util::normalize_key;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanReport {
    pub sales_excluded: usize,
    pub stock_excluded: usize,
}

pub fn clean_sales(rows: Vec<SalesRecord>, excluded_code: &str) -> Vec<SalesRecord> {
    rows.into_iter()
        .map(|r| SalesRecord {
            special_code: normalize_key(&r.special_code),
            merch_group: normalize_key(&r.merch_group),
            color: normalize_key(&r.color),
            ..r
        })
        .filter(|r| r.special_code != excluded_code)
        .collect()
}

pub fn clean_stock(rows: Vec<StockRecord>, excluded_code: &str) -> Vec<StockRecord> {
    rows.into_iter()
        .map(|r| StockRecord {
            special_code: normalize_key(&r.special_code),
            merch_group: normalize_key(&r.merch_group),
            color: normalize_key(&r.color),
            label_type: normalize_key(&r.label_type),
            ..r
        })
        .filter(|r| r.special_code != excluded_code)
        .collect()
}

/// Clean both tables independently. Never fails.
pub fn clean(
    sales: Vec<SalesRecord>,
    stock: Vec<StockRecord>,
    settings: &ReportSettings,
) -> (Vec<SalesRecord>, Vec<StockRecord>, CleanReport) {
    let (sales_in, stock_in) = (sales.len(), stock.len());
    let sales = clean_sales(sales, &settings.excluded_code);
    let stock = clean_stock(stock, &settings.excluded_code);
    let report = CleanReport {
        sales_excluded: sales_in - sales.len(),
        stock_excluded: stock_in - stock.len(),
    };
    if report.sales_excluded + report.stock_excluded > 0 {
        info!(
            code = %settings.excluded_code,
            sales = report.sales_excluded,
            stock = report.stock_excluded,
            "dropped excluded code rows"
        );
    }
    (sales, stock, report)
}

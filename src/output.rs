use crate::error::ReportResult;
use crate::reports::ReportSet;
use crate::types::{yes_no, BestSellerRow, BlockedRow, KpiSummary, MerchGroupOccupancyRow};
use crate::util::{format_int, format_number};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub const BEST_SELLERS_SHEET: &str = "Best_Sellers";
pub const REPLENISHMENT_SHEET: &str = "Immediate_Replenishment";
pub const ACTION_PLAN_SHEET: &str = "Merch_Group_Action_Plan";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> ReportResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub enum CellValue {
    Text(String),
    Number(f64),
}

/// A table row that can be written to a worksheet. Column titles come from
/// the `Tabled` headers so the console and the workbook agree.
pub trait SheetRow: Tabled {
    fn cells(&self) -> Vec<CellValue>;
}

impl SheetRow for BestSellerRow {
    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.special_code.clone()),
            CellValue::Text(self.merch_group.clone()),
            CellValue::Text(self.color.clone()),
            CellValue::Number(self.qty_sold as f64),
            CellValue::Number(self.warehouse as f64),
            CellValue::Number(self.rayon as f64),
            CellValue::Number(self.cash as f64),
            CellValue::Text(yes_no(self.blocked).to_string()),
        ]
    }
}

impl SheetRow for BlockedRow {
    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.special_code.clone()),
            CellValue::Text(self.merch_group.clone()),
            CellValue::Text(self.color.clone()),
            CellValue::Number(self.warehouse as f64),
            CellValue::Number(self.rayon as f64),
            CellValue::Number(self.location_quantity as f64),
            CellValue::Number(self.cash),
            CellValue::Number(self.value_at_risk),
            CellValue::Text(self.urgency.to_string()),
        ]
    }
}

impl SheetRow for MerchGroupOccupancyRow {
    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Text(self.merch_group.clone()),
            CellValue::Number(self.rayon as f64),
            CellValue::Number(self.warehouse as f64),
            CellValue::Number(self.capacity as f64),
            CellValue::Number(self.actual_occupancy_pct),
            CellValue::Number(self.pcs_to_push_today as f64),
            CellValue::Number(self.occupancy_after_push_pct),
            CellValue::Number(self.fragmented_pcs as f64),
            CellValue::Number(self.total_pcs as f64),
            CellValue::Number(self.fragmentation_pct),
        ]
    }
}

fn write_sheet<T: SheetRow>(workbook: &mut Workbook, name: &str, rows: &[T]) -> ReportResult<()> {
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    for (col, title) in T::headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title.to_string(), &bold)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, cell) in row.cells().into_iter().enumerate() {
            match cell {
                CellValue::Text(s) => sheet.write_string(r, col as u16, s)?,
                CellValue::Number(n) => sheet.write_number(r, col as u16, n)?,
            };
        }
    }
    Ok(())
}

/// Daily action plan workbook: best sellers, replenishment list and the merch
/// group plan, one sheet each.
pub fn write_workbook(path: &Path, reports: &ReportSet) -> ReportResult<()> {
    let mut workbook = Workbook::new();
    write_sheet(&mut workbook, BEST_SELLERS_SHEET, &reports.best_sellers)?;
    write_sheet(&mut workbook, REPLENISHMENT_SHEET, &reports.replenishment)?;
    write_sheet(&mut workbook, ACTION_PLAN_SHEET, &reports.action_plan)?;
    workbook.save(path)?;
    info!(path = %path.display(), "workbook written");
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn print_kpis(kpi: &KpiSummary) {
    println!("Warehouse %:              {}%", format_number(kpi.warehouse_share_pct, 2));
    println!("Rayon Occupancy %:        {}%", format_number(kpi.rayon_occupancy_pct, 2));
    println!("Total Warehouse Qty:      {}", format_int(kpi.total_warehouse));
    println!("PCS to Push Today:        {}", format_int(kpi.total_push));
    println!("Occupancy After Push %:   {}%", format_number(kpi.occupancy_after_push_pct, 2));
    println!("Fragmented PCS:           {}", format_int(kpi.total_fragmented));
    println!("Fragmentation %:          {}%", format_number(kpi.fragmentation_pct, 2));
    println!(
        "Discounted PCS:           {} ({}%)\n",
        format_int(kpi.discounted_qty),
        format_number(kpi.discounted_pct, 2)
    );
}

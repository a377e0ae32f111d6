// One report run: cleaned records in, derived tables and files out.
use crate::auth::Session;
use crate::clean::{clean, CleanReport};
use crate::config::ReportSettings;
use crate::error::ReportResult;
use crate::kpi::generate_summary;
use crate::output;
use crate::reports::{generate_reports, ReportSet};
use crate::types::{KpiSummary, SalesRecord, StockRecord};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ReportRun {
    pub reports: ReportSet,
    pub kpi: KpiSummary,
    pub clean: CleanReport,
}

pub fn analyze(
    session: &Session,
    sales: Vec<SalesRecord>,
    stock: Vec<StockRecord>,
    settings: &ReportSettings,
) -> ReportRun {
    let (sales, stock, clean_report) = clean(sales, stock, settings);
    let reports = generate_reports(&sales, &stock, settings);
    let kpi = generate_summary(&session.store_code, &reports, settings);
    ReportRun { reports, kpi, clean: clean_report }
}

/// Write the action plan workbook and the KPI summary, plus one CSV per
/// derived table when `with_csv` is set. Returns the written paths.
pub fn export(
    session: &Session,
    run: &ReportRun,
    out_dir: &Path,
    with_csv: bool,
) -> ReportResult<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    let workbook = out_dir.join(session.workbook_file_name());
    output::write_workbook(&workbook, &run.reports)?;
    written.push(workbook);

    let summary = out_dir.join(session.summary_file_name());
    output::write_json(&summary, &run.kpi)?;
    written.push(summary);

    if with_csv {
        let stem = session.file_stem();
        let files = [
            format!("{stem}_best_sellers.csv"),
            format!("{stem}_immediate_replenishment.csv"),
            format!("{stem}_merch_group_action_plan.csv"),
            format!("{stem}_discounted_merch_groups.csv"),
        ];
        let paths: Vec<PathBuf> = files.iter().map(|f| out_dir.join(f)).collect();
        output::write_csv(&paths[0], &run.reports.best_sellers)?;
        output::write_csv(&paths[1], &run.reports.replenishment)?;
        output::write_csv(&paths[2], &run.reports.action_plan)?;
        output::write_csv(&paths[3], &run.reports.discounted)?;
        written.extend(paths);
    }

    info!(store = %session.store_code, files = written.len(), "exports written");
    Ok(written)
}

// Headline metrics rolled up from the per-group tables.
use crate::config::ReportSettings;
use crate::reports::ReportSet;
use crate::types::KpiSummary;
use crate::util::percent;
use chrono::Local;

// Saturating sum; a single quantity cell may already be u64::MAX.
fn total(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

pub fn generate_summary(store: &str, reports: &ReportSet, settings: &ReportSettings) -> KpiSummary {
    let plan = &reports.action_plan;
    let total_rayon: u64 = total(plan.iter().map(|r| r.rayon));
    let total_warehouse: u64 = total(plan.iter().map(|r| r.warehouse));
    let total_push: u64 = total(plan.iter().map(|r| r.pcs_to_push_today));
    let total_fragmented: u64 = total(plan.iter().map(|r| r.fragmented_pcs));
    let discounted_qty: u64 = total(reports.discounted.iter().map(|r| r.total_discounted_pcs));

    let total_capacity = settings.total_capacity();
    let total_pcs = total_warehouse.saturating_add(total_rayon) as f64;

    KpiSummary {
        store: store.to_string(),
        generated_at: Local::now(),
        total_rayon,
        total_warehouse,
        total_capacity,
        total_push,
        total_fragmented,
        fragmentation_pct: percent(total_fragmented as f64, total_pcs),
        discounted_qty,
        discounted_pct: percent(discounted_qty as f64, total_pcs),
        warehouse_share_pct: percent(total_warehouse as f64, total_pcs),
        rayon_occupancy_pct: percent(total_rayon as f64, total_capacity as f64),
        occupancy_after_push_pct: percent(total_rayon.saturating_add(total_push) as f64, total_capacity as f64),
    }
}

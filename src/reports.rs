use crate::config::ReportSettings;
use crate::types::{
    BestSellerRow, BlockedRow, DiscountedMerchGroupRow, MerchGroupOccupancyRow, SalesRecord,
    StockRecord, UrgencyLevel,
};
use crate::util::{average, percent};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// (SpecialCode, MerchGroup, Color)
type ItemKey = (String, String, String);

fn item_key(code: &str, group: &str, color: &str) -> ItemKey {
    (code.to_string(), group.to_string(), color.to_string())
}

/// All derived tables of one run.
#[derive(Debug, Clone, Default)]
pub struct ReportSet {
    pub best_sellers: Vec<BestSellerRow>,
    pub replenishment: Vec<BlockedRow>,
    pub action_plan: Vec<MerchGroupOccupancyRow>,
    pub discounted: Vec<DiscountedMerchGroupRow>,
}

pub fn generate_reports(
    sales: &[SalesRecord],
    stock: &[StockRecord],
    settings: &ReportSettings,
) -> ReportSet {
    let set = ReportSet {
        best_sellers: generate_best_sellers(sales, stock, settings),
        replenishment: generate_replenishment(stock, settings),
        action_plan: generate_action_plan(stock, settings),
        discounted: generate_discounted(stock, settings),
    };
    debug!(
        best_sellers = set.best_sellers.len(),
        replenishment = set.replenishment.len(),
        merch_groups = set.action_plan.len(),
        discounted_groups = set.discounted.len(),
        "reports generated"
    );
    set
}

pub fn generate_best_sellers(
    sales: &[SalesRecord],
    stock: &[StockRecord],
    settings: &ReportSettings,
) -> Vec<BestSellerRow> {
    #[derive(Default)]
    struct Acc {
        warehouse: u64,
        rayon: u64,
        cash: Vec<f64>,
    }

    let mut sold: BTreeMap<ItemKey, u64> = BTreeMap::new();
    for r in sales {
        let e = sold.entry(item_key(&r.special_code, &r.merch_group, &r.color)).or_default();
        *e = e.saturating_add(r.qty_sold);
    }

    let mut on_hand: BTreeMap<ItemKey, Acc> = BTreeMap::new();
    for r in stock {
        let e = on_hand.entry(item_key(&r.special_code, &r.merch_group, &r.color)).or_default();
        e.warehouse = e.warehouse.saturating_add(r.warehouse);
        e.rayon = e.rayon.saturating_add(r.rayon);
        e.cash.push(r.cash);
    }

    let mut rows: Vec<BestSellerRow> = sold
        .into_iter()
        .map(|(key, qty_sold)| {
            // Items with no stock line keep zeros.
            let (warehouse, rayon, cash) = on_hand
                .get(&key)
                .map(|acc| (acc.warehouse, acc.rayon, average(&acc.cash)))
                .unwrap_or((0, 0, 0.0));
            let (special_code, merch_group, color) = key;
            BestSellerRow {
                special_code,
                merch_group,
                color,
                qty_sold,
                warehouse,
                rayon,
                cash: cash.trunc() as u64,
                blocked: warehouse > 0 && rayon <= settings.blocked_rayon_max,
            }
        })
        .collect();

    // Stable: equal quantities stay in key order.
    rows.sort_by(|a, b| b.qty_sold.cmp(&a.qty_sold));
    rows
}

pub fn urgency_for(warehouse: u64, settings: &ReportSettings) -> UrgencyLevel {
    if warehouse < settings.urgency_high_min {
        UrgencyLevel::Normal
    } else if warehouse <= settings.urgency_high_max {
        UrgencyLevel::High
    } else {
        UrgencyLevel::Critical
    }
}

/// Items with backroom stock and nothing at all on the floor, most money at
/// risk first.
pub fn generate_replenishment(stock: &[StockRecord], settings: &ReportSettings) -> Vec<BlockedRow> {
    #[derive(Default)]
    struct Acc {
        warehouse: u64,
        rayon: u64,
        location_quantity: u64,
        cash: Vec<f64>,
    }

    let mut map: BTreeMap<ItemKey, Acc> = BTreeMap::new();
    for r in stock.iter().filter(|r| r.warehouse > 0 && r.rayon == 0) {
        let e = map.entry(item_key(&r.special_code, &r.merch_group, &r.color)).or_default();
        e.warehouse = e.warehouse.saturating_add(r.warehouse);
        e.rayon = e.rayon.saturating_add(r.rayon);
        e.location_quantity = e.location_quantity.saturating_add(r.location_quantity);
        e.cash.push(r.cash);
    }

    let mut rows: Vec<BlockedRow> = map
        .into_iter()
        .map(|((special_code, merch_group, color), acc)| {
            let cash = average(&acc.cash);
            BlockedRow {
                special_code,
                merch_group,
                color,
                warehouse: acc.warehouse,
                rayon: acc.rayon,
                location_quantity: acc.location_quantity,
                cash,
                value_at_risk: acc.warehouse as f64 * cash,
                urgency: urgency_for(acc.warehouse, settings),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.value_at_risk
            .partial_cmp(&a.value_at_risk)
            .unwrap_or(Ordering::Equal)
    });
    rows
}

/// Pieces that can move to the floor today: bounded by floor headroom and by
/// what the warehouse holds.
pub fn pcs_to_push(capacity: u64, rayon: u64, warehouse: u64) -> u64 {
    capacity.saturating_sub(rayon).min(warehouse)
}

/// Fragmented pieces per merch group. A code is fragmented when its pieces
/// across all colors and both locations are at or below the threshold.
pub fn fragmented_pcs_by_group(
    stock: &[StockRecord],
    settings: &ReportSettings,
) -> BTreeMap<String, u64> {
    let mut per_code: BTreeMap<(String, String), u64> = BTreeMap::new();
    for r in stock {
        let e = per_code
            .entry((r.merch_group.clone(), r.special_code.clone()))
            .or_default();
        *e = e.saturating_add(r.total_pcs());
    }

    let mut per_group: BTreeMap<String, u64> = BTreeMap::new();
    for ((group, _), total) in per_code {
        if total <= settings.fragmented_max {
            let e = per_group.entry(group).or_default();
            *e = e.saturating_add(total);
        }
    }
    per_group
}

/// Capacity, push feasibility and fragmentation per merch group.
pub fn generate_action_plan(
    stock: &[StockRecord],
    settings: &ReportSettings,
) -> Vec<MerchGroupOccupancyRow> {
    let mut groups: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for r in stock {
        let e = groups.entry(r.merch_group.clone()).or_default();
        e.0 = e.0.saturating_add(r.rayon);
        e.1 = e.1.saturating_add(r.warehouse);
    }
    let fragmented = fragmented_pcs_by_group(stock, settings);

    groups
        .into_iter()
        .map(|(merch_group, (rayon, warehouse))| {
            let capacity = settings.capacity_for(&merch_group);
            let push = pcs_to_push(capacity, rayon, warehouse);
            let fragmented_pcs = fragmented.get(&merch_group).copied().unwrap_or(0);
            let total_pcs = rayon.saturating_add(warehouse);
            MerchGroupOccupancyRow {
                actual_occupancy_pct: percent(rayon as f64, capacity as f64),
                occupancy_after_push_pct: percent(rayon.saturating_add(push) as f64, capacity as f64),
                fragmentation_pct: percent(fragmented_pcs as f64, total_pcs as f64),
                merch_group,
                rayon,
                warehouse,
                capacity,
                pcs_to_push_today: push,
                fragmented_pcs,
                total_pcs,
            }
        })
        .collect()
}

/// Discount-labelled stock per merch group, against that group's full stock.
pub fn generate_discounted(
    stock: &[StockRecord],
    settings: &ReportSettings,
) -> Vec<DiscountedMerchGroupRow> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    let mut discounted: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for r in stock {
        let total = totals.entry(r.merch_group.as_str()).or_default();
        *total = total.saturating_add(r.total_pcs());
        if r.label_type == settings.discount_marker {
            let e = discounted.entry(r.merch_group.as_str()).or_default();
            e.0 = e.0.saturating_add(r.warehouse);
            e.1 = e.1.saturating_add(r.rayon);
        }
    }

    discounted
        .into_iter()
        .map(|(group, (warehouse, rayon))| {
            let total_pcs = totals.get(group).copied().unwrap_or(0);
            let total_discounted_pcs = warehouse.saturating_add(rayon);
            DiscountedMerchGroupRow {
                merch_group: group.to_string(),
                discounted_warehouse: warehouse,
                discounted_rayon: rayon,
                total_discounted_pcs,
                total_pcs,
                discounted_pct: percent(total_discounted_pcs as f64, total_pcs as f64),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::clean;

    fn stock(code: &str, group: &str, color: &str, warehouse: u64, rayon: u64) -> StockRecord {
        StockRecord {
            special_code: code.to_string(),
            merch_group: group.to_string(),
            color: color.to_string(),
            warehouse,
            rayon,
            cash: 10.0,
            location_quantity: warehouse,
            label_type: String::new(),
        }
    }

    fn sale(code: &str, group: &str, color: &str, qty: u64) -> SalesRecord {
        SalesRecord {
            special_code: code.to_string(),
            qty_sold: qty,
            merch_group: group.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn best_sellers_sum_join_and_sort() {
        let settings = ReportSettings::default();
        let sales = vec![
            sale("A1", "BG", "RED", 2),
            sale("A1", "BG", "RED", 3),
            sale("B2", "BU", "BLUE", 9),
            sale("C3", "CK", "BLACK", 1),
        ];
        let mut s1 = stock("A1", "BG", "RED", 4, 1);
        s1.cash = 99.0;
        let mut s2 = stock("A1", "BG", "RED", 1, 1);
        s2.cash = 100.0;
        let rows = generate_best_sellers(&sales, &[s1, s2, stock("B2", "BU", "BLUE", 0, 7)], &settings);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].special_code, "B2");
        assert!(!rows[0].blocked);
        assert_eq!(rows[1].special_code, "A1");
        assert_eq!(rows[1].qty_sold, 5);
        assert_eq!(rows[1].warehouse, 5);
        assert_eq!(rows[1].rayon, 2);
        assert_eq!(rows[1].cash, 99);
        assert!(rows[1].blocked);
        // No stock line for C3.
        assert_eq!((rows[2].warehouse, rows[2].rayon, rows[2].cash), (0, 0, 0));
        assert!(!rows[2].blocked);
    }

    #[test]
    fn blocked_best_seller_boundary() {
        let settings = ReportSettings::default();
        let sales = vec![sale("A", "BG", "RED", 1), sale("B", "BG", "RED", 1)];
        let rows = generate_best_sellers(
            &sales,
            &[stock("A", "BG", "RED", 1, 3), stock("B", "BG", "RED", 1, 4)],
            &settings,
        );
        let flag = |code: &str| rows.iter().find(|r| r.special_code == code).unwrap().blocked;
        assert!(flag("A"));
        assert!(!flag("B"));
    }

    #[test]
    fn replenishment_takes_only_empty_floor() {
        let settings = ReportSettings::default();
        let rows = generate_replenishment(
            &[
                stock("A", "BG", "RED", 4, 0),
                stock("B", "BG", "RED", 4, 1),
                stock("C", "BG", "RED", 0, 0),
            ],
            &settings,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].special_code, "A");
        assert_eq!(rows[0].rayon, 0);
    }

    #[test]
    fn replenishment_sorted_by_value_at_risk() {
        let settings = ReportSettings::default();
        let mut cheap = stock("A", "BG", "RED", 9, 0);
        cheap.cash = 1.0;
        let mut dear = stock("B", "BG", "RED", 2, 0);
        dear.cash = 50.0;
        let rows = generate_replenishment(&[cheap, dear], &settings);
        assert_eq!(rows[0].special_code, "B");
        assert_eq!(rows[0].value_at_risk, 100.0);
        assert_eq!(rows[1].value_at_risk, 9.0);
        assert_eq!(rows[1].urgency, UrgencyLevel::Critical);
    }

    #[test]
    fn urgency_boundaries() {
        let s = ReportSettings::default();
        assert_eq!(urgency_for(2, &s), UrgencyLevel::Normal);
        assert_eq!(urgency_for(3, &s), UrgencyLevel::High);
        assert_eq!(urgency_for(8, &s), UrgencyLevel::High);
        assert_eq!(urgency_for(9, &s), UrgencyLevel::Critical);
    }

    #[test]
    fn push_is_bounded_by_headroom_and_warehouse() {
        assert_eq!(pcs_to_push(100, 40, 10), 10);
        assert_eq!(pcs_to_push(100, 95, 10), 5);
        assert_eq!(pcs_to_push(100, 120, 10), 0);
        assert_eq!(pcs_to_push(0, 0, 10), 0);
        for (cap, rayon, wh) in [(129, 0, 500), (129, 200, 5), (9694, 9000, 1000), (7, 7, 7)] {
            let push = pcs_to_push(cap, rayon, wh);
            assert!(push <= wh);
            assert!(push <= cap.saturating_sub(rayon));
        }
    }

    #[test]
    fn action_plan_conserves_rayon() {
        let settings = ReportSettings::default();
        let rows_in = vec![
            stock("A", "BG", "RED", 3, 10),
            stock("B", "BG", "BLUE", 0, 5),
            stock("C", "EV", "RED", 200, 100),
            stock("D", "ZZ", "RED", 1, 2),
        ];
        let plan = generate_action_plan(&rows_in, &settings);
        let total: u64 = plan.iter().map(|r| r.rayon).sum();
        assert_eq!(total, rows_in.iter().map(|r| r.rayon).sum::<u64>());

        let ev = plan.iter().find(|r| r.merch_group == "EV").unwrap();
        assert_eq!(ev.capacity, 129);
        assert_eq!(ev.pcs_to_push_today, 29);
        assert!((ev.occupancy_after_push_pct - 100.0).abs() < 1e-9);

        // Unknown group: no capacity, no push, no NaN.
        let zz = plan.iter().find(|r| r.merch_group == "ZZ").unwrap();
        assert_eq!(zz.capacity, 0);
        assert_eq!(zz.pcs_to_push_today, 0);
        assert_eq!(zz.actual_occupancy_pct, 0.0);
    }

    #[test]
    fn fragmentation_boundary() {
        let settings = ReportSettings::default();
        let rows_in = vec![
            // F4 spread across colors, total 4
            stock("F4", "BG", "RED", 1, 1),
            stock("F4", "BG", "BLUE", 0, 2),
            stock("F5", "BG", "RED", 2, 3),
        ];
        let frag = fragmented_pcs_by_group(&rows_in, &settings);
        assert_eq!(frag.get("BG"), Some(&4));

        let plan = generate_action_plan(&rows_in, &settings);
        assert_eq!(plan[0].fragmented_pcs, 4);
        assert_eq!(plan[0].total_pcs, 9);
        assert!((plan[0].fragmentation_pct - 400.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn empty_group_has_zero_fragmentation_pct() {
        let plan = generate_action_plan(&[stock("A", "CU", "RED", 0, 0)], &ReportSettings::default());
        assert_eq!(plan[0].total_pcs, 0);
        assert_eq!(plan[0].fragmentation_pct, 0.0);
    }

    #[test]
    fn discounted_groups_against_group_totals() {
        let settings = ReportSettings::default();
        let mut red = stock("A", "BG", "RED", 2, 3);
        red.label_type = "KIRMIZI".to_string();
        let rows = generate_discounted(
            &[red, stock("B", "BG", "RED", 5, 0), stock("C", "CK", "RED", 1, 1)],
            &settings,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].merch_group, "BG");
        assert_eq!(rows[0].total_discounted_pcs, 5);
        assert_eq!(rows[0].total_pcs, 10);
        assert_eq!(rows[0].discounted_pct, 50.0);
    }

    #[test]
    fn single_discounted_blocked_row_end_to_end() {
        let settings = ReportSettings::default();
        let raw = StockRecord {
            special_code: "A1".to_string(),
            merch_group: "bg".to_string(),
            color: "red".to_string(),
            warehouse: 5,
            rayon: 0,
            cash: 100.0,
            location_quantity: 5,
            label_type: "kirmizi".to_string(),
        };
        let (sales, stock, _) = clean(Vec::new(), vec![raw], &settings);
        let set = generate_reports(&sales, &stock, &settings);

        assert_eq!(set.replenishment.len(), 1);
        let blocked = &set.replenishment[0];
        assert_eq!((blocked.warehouse, blocked.rayon), (5, 0));
        assert_eq!(blocked.value_at_risk, 500.0);
        assert_eq!(blocked.urgency, UrgencyLevel::High);

        assert_eq!(set.discounted.len(), 1);
        assert_eq!(set.discounted[0].merch_group, "BG");
        assert_eq!(set.discounted[0].total_discounted_pcs, 5);
        assert!(set.best_sellers.is_empty());
    }

    #[test]
    fn excluded_code_never_reaches_reports() {
        let settings = ReportSettings::default();
        let mut excluded = stock("W5LV19Z8", "BG", "RED", 9, 0);
        excluded.label_type = "KIRMIZI".to_string();
        let (sales, stock, _) = clean(
            vec![sale("W5LV19Z8", "BG", "RED", 50), sale("A", "BG", "RED", 1)],
            vec![excluded, stock("A", "BG", "RED", 1, 0)],
            &settings,
        );
        let set = generate_reports(&sales, &stock, &settings);
        assert!(set.best_sellers.iter().all(|r| r.special_code != "W5LV19Z8"));
        assert!(set.replenishment.iter().all(|r| r.special_code != "W5LV19Z8"));
        assert_eq!(set.action_plan[0].warehouse, 1);
        assert!(set.discounted.is_empty());
    }

    #[test]
    fn oversized_quantities_saturate_instead_of_overflowing() {
        use crate::loader::stock_records;
        use crate::schema::{normalize, RawTable, STOCK_SCHEMA};

        let huge = "99999999999999999999";
        let raw = RawTable {
            headers: ["Specialcode1", "Merch Group", "Color", "Warehouse", "RAYON", "Cash", "Location_Qty", "EtiketTip"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            rows: vec![
                vec!["A1".into(), "BG".into(), "RED".into(), huge.into(), "0".into(), "5".into(), huge.into(), "KIRMIZI".into()],
                vec!["A1".into(), "BG".into(), "RED".into(), huge.into(), "0".into(), "5".into(), huge.into(), "KIRMIZI".into()],
            ],
        };
        let stock = stock_records(&normalize(raw, &STOCK_SCHEMA).unwrap());
        let settings = ReportSettings::default();
        let sales = vec![sale("A1", "BG", "RED", u64::MAX), sale("A1", "BG", "RED", 1)];
        let set = generate_reports(&sales, &stock, &settings);

        assert_eq!(set.best_sellers[0].qty_sold, u64::MAX);
        assert_eq!(set.best_sellers[0].warehouse, u64::MAX);
        assert_eq!(set.replenishment[0].warehouse, u64::MAX);
        assert_eq!(set.replenishment[0].location_quantity, u64::MAX);
        assert_eq!(set.replenishment[0].urgency, UrgencyLevel::Critical);

        let plan = &set.action_plan[0];
        assert_eq!(plan.warehouse, u64::MAX);
        assert_eq!(plan.total_pcs, u64::MAX);
        assert_eq!(plan.pcs_to_push_today, 9694);
        assert_eq!(plan.fragmented_pcs, 0);
        assert!(plan.occupancy_after_push_pct.is_finite());

        assert_eq!(set.discounted[0].total_discounted_pcs, u64::MAX);
        assert!((set.discounted[0].discounted_pct - 100.0).abs() < 1e-9);

        let kpi = crate::kpi::generate_summary("MA-01", &set, &settings);
        assert_eq!(kpi.total_warehouse, u64::MAX);
        assert!(kpi.warehouse_share_pct.is_finite());
    }
}

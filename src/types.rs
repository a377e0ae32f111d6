use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::fmt;
use tabled::Tabled;

/// One line of the sales report after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub special_code: String,
    pub qty_sold: u64,
    pub merch_group: String,
    pub color: String,
}

/// One line of the stock report after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub special_code: String,
    pub merch_group: String,
    pub color: String,
    pub warehouse: u64,
    pub rayon: u64,
    pub cash: f64,
    pub location_quantity: u64,
    pub label_type: String,
}

impl StockRecord {
    pub fn total_pcs(&self) -> u64 {
        self.warehouse.saturating_add(self.rayon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrgencyLevel {
    Normal,
    High,
    Critical,
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UrgencyLevel::Normal => "NORMAL",
            UrgencyLevel::High => "HIGH",
            UrgencyLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

fn serialize_yes_no<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(yes_no(*flag))
}

fn display_yes_no(flag: &bool) -> String {
    yes_no(*flag).to_string()
}

fn display_pct(v: &f64) -> String {
    format!("{:.2}%", v)
}

fn display_money(v: &f64) -> String {
    crate::util::format_number(*v, 2)
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct BestSellerRow {
    #[serde(rename = "Special Code")]
    #[tabled(rename = "Special Code")]
    pub special_code: String,
    #[serde(rename = "Merch Group")]
    #[tabled(rename = "Merch Group")]
    pub merch_group: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
    #[serde(rename = "Qty_Sold")]
    #[tabled(rename = "Qty_Sold")]
    pub qty_sold: u64,
    #[serde(rename = "Warehouse")]
    #[tabled(rename = "Warehouse")]
    pub warehouse: u64,
    #[serde(rename = "RAYON")]
    #[tabled(rename = "RAYON")]
    pub rayon: u64,
    #[serde(rename = "Cash")]
    #[tabled(rename = "Cash")]
    pub cash: u64,
    #[serde(rename = "Blocked_Best_Seller", serialize_with = "serialize_yes_no")]
    #[tabled(rename = "Blocked_Best_Seller", display_with = "display_yes_no")]
    pub blocked: bool,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct BlockedRow {
    #[serde(rename = "Special Code")]
    #[tabled(rename = "Special Code")]
    pub special_code: String,
    #[serde(rename = "Merch Group")]
    #[tabled(rename = "Merch Group")]
    pub merch_group: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
    #[serde(rename = "Warehouse")]
    #[tabled(rename = "Warehouse")]
    pub warehouse: u64,
    #[serde(rename = "RAYON")]
    #[tabled(rename = "RAYON")]
    pub rayon: u64,
    #[serde(rename = "Location_Quantity")]
    #[tabled(rename = "Location_Quantity")]
    pub location_quantity: u64,
    #[serde(rename = "Cash")]
    #[tabled(rename = "Cash", display_with = "display_money")]
    pub cash: f64,
    #[serde(rename = "Value_At_Risk_MAD")]
    #[tabled(rename = "Value_At_Risk_MAD", display_with = "display_money")]
    pub value_at_risk: f64,
    #[serde(rename = "Urgency_Level")]
    #[tabled(rename = "Urgency_Level")]
    pub urgency: UrgencyLevel,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MerchGroupOccupancyRow {
    #[serde(rename = "Merch Group")]
    #[tabled(rename = "Merch Group")]
    pub merch_group: String,
    #[serde(rename = "RAYON")]
    #[tabled(rename = "RAYON")]
    pub rayon: u64,
    #[serde(rename = "Warehouse")]
    #[tabled(rename = "Warehouse")]
    pub warehouse: u64,
    #[serde(rename = "Capacity")]
    #[tabled(rename = "Capacity")]
    pub capacity: u64,
    #[serde(rename = "Actual_Occupancy_%")]
    #[tabled(rename = "Actual_Occupancy_%", display_with = "display_pct")]
    pub actual_occupancy_pct: f64,
    #[serde(rename = "PCS_To_Push_Today")]
    #[tabled(rename = "PCS_To_Push_Today")]
    pub pcs_to_push_today: u64,
    #[serde(rename = "Occupancy_After_Push_%")]
    #[tabled(rename = "Occupancy_After_Push_%", display_with = "display_pct")]
    pub occupancy_after_push_pct: f64,
    #[serde(rename = "Fragmented_PCS")]
    #[tabled(rename = "Fragmented_PCS")]
    pub fragmented_pcs: u64,
    #[serde(rename = "Total_PCS")]
    #[tabled(rename = "Total_PCS")]
    pub total_pcs: u64,
    #[serde(rename = "Fragmentation_%")]
    #[tabled(rename = "Fragmentation_%", display_with = "display_pct")]
    pub fragmentation_pct: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DiscountedMerchGroupRow {
    #[serde(rename = "Merch Group")]
    #[tabled(rename = "Merch Group")]
    pub merch_group: String,
    #[serde(rename = "Discounted_Warehouse")]
    #[tabled(rename = "Discounted_Warehouse")]
    pub discounted_warehouse: u64,
    #[serde(rename = "Discounted_RAYON")]
    #[tabled(rename = "Discounted_RAYON")]
    pub discounted_rayon: u64,
    #[serde(rename = "Total_Discounted_PCS")]
    #[tabled(rename = "Total_Discounted_PCS")]
    pub total_discounted_pcs: u64,
    #[serde(rename = "Total_PCS")]
    #[tabled(rename = "Total_PCS")]
    pub total_pcs: u64,
    #[serde(rename = "Discounted_%")]
    #[tabled(rename = "Discounted_%", display_with = "display_pct")]
    pub discounted_pct: f64,
}

/// Headline metrics of one report run.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct KpiSummary {
    pub store: String,
    pub generated_at: DateTime<Local>,
    pub total_rayon: u64,
    pub total_warehouse: u64,
    pub total_capacity: u64,
    pub total_push: u64,
    pub total_fragmented: u64,
    pub fragmentation_pct: f64,
    pub discounted_qty: u64,
    pub discounted_pct: f64,
    pub warehouse_share_pct: f64,
    pub rayon_occupancy_pct: f64,
    pub occupancy_after_push_pct: f64,
}

// Report constants and the store directory file.
//
// The defaults below are the fixed store rules. A `[report]` table in the
// store directory TOML may override any of them; missing keys keep the
// default.
use crate::error::ReportResult;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const EXCLUDED_CODE: &str = "W5LV19Z8";
pub const DISCOUNT_MARKER: &str = "KIRMIZI";

/// Sales-floor capacity in pieces per merch group.
pub static DEFAULT_CAPACITY: Lazy<BTreeMap<String, u64>> = Lazy::new(|| {
    [
        ("BG", 9694),
        ("BU", 8429),
        ("CK", 7823),
        ("CU", 7298),
        ("EV", 129),
        ("ST", 1294),
    ]
    .into_iter()
    .map(|(group, capacity)| (group.to_string(), capacity))
    .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub excluded_code: String,
    pub discount_marker: String,
    pub capacity: BTreeMap<String, u64>,
    /// A best seller with backroom stock is blocked while the floor holds at most this many.
    pub blocked_rayon_max: u64,
    pub urgency_high_min: u64,
    pub urgency_high_max: u64,
    /// A (merch group, code) whose total pieces are at most this is fragmented.
    pub fragmented_max: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            excluded_code: EXCLUDED_CODE.to_string(),
            discount_marker: DISCOUNT_MARKER.to_string(),
            capacity: DEFAULT_CAPACITY.clone(),
            blocked_rayon_max: 3,
            urgency_high_min: 3,
            urgency_high_max: 8,
            fragmented_max: 4,
        }
    }
}

impl ReportSettings {
    /// Unknown merch groups have no floor capacity.
    pub fn capacity_for(&self, merch_group: &str) -> u64 {
        self.capacity.get(merch_group).copied().unwrap_or(0)
    }

    pub fn total_capacity(&self) -> u64 {
        self.capacity.values().fold(0, |acc, c| acc.saturating_add(*c))
    }

    // Cleaned data is upper-case, so overrides have to be too.
    fn normalized(mut self) -> Self {
        self.excluded_code = self.excluded_code.trim().to_uppercase();
        self.discount_marker = self.discount_marker.trim().to_uppercase();
        self.capacity = std::mem::take(&mut self.capacity)
            .into_iter()
            .map(|(group, cap)| (group.trim().to_uppercase(), cap))
            .collect();
        self
    }
}

/// Contents of the store directory file:
///
/// ```toml
/// [stores]
/// "MA-CASA-01" = "secret"
///
/// [report]
/// discount_marker = "KIRMIZI"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreDirectory {
    #[serde(default)]
    pub stores: BTreeMap<String, String>,
    #[serde(default)]
    pub report: ReportSettings,
}

impl StoreDirectory {
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loaded store directory");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ReportResult<Self> {
        let mut dir: StoreDirectory = toml::from_str(content)?;
        dir.report = dir.report.normalized();
        Ok(dir)
    }

    pub fn store_codes(&self) -> Vec<&str> {
        self.stores.keys().map(String::as_str).collect()
    }
}

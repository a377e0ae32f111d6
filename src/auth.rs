// Store login.
//
// A successful login yields a `Session` that is passed explicitly to the
// render and export steps; there is no process-wide "current store".
use crate::config::StoreDirectory;
use crate::error::{ReportError, ReportResult};
use chrono::{DateTime, Local};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub store_code: String,
    pub logged_in_at: DateTime<Local>,
}

impl Session {
    /// Store code reduced to characters safe in a file name.
    pub fn file_stem(&self) -> String {
        self.store_code
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    pub fn workbook_file_name(&self) -> String {
        format!("{}_Daily_Action_Plan.xlsx", self.file_stem())
    }

    pub fn summary_file_name(&self) -> String {
        format!("{}_summary.json", self.file_stem())
    }
}

/// A directory without stores cannot log anyone in.
pub fn require_stores(dir: &StoreDirectory) -> ReportResult<()> {
    if dir.stores.is_empty() {
        return Err(ReportError::NoStores);
    }
    Ok(())
}

pub fn authenticate(dir: &StoreDirectory, store: &str, password: &str) -> ReportResult<Session> {
    require_stores(dir)?;
    let expected = dir
        .stores
        .get(store)
        .ok_or_else(|| ReportError::UnknownStore(store.to_string()))?;
    if expected != password {
        warn!(store, "login rejected");
        return Err(ReportError::Auth { store: store.to_string() });
    }
    info!(store, "logged in");
    Ok(Session { store_code: store.to_string(), logged_in_at: Local::now() })
}

// Error type shared by every stage of a report run.
//
// All variants are terminal for the current run: nothing is retried, and a
// schema or auth failure stops the run before any output is written.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{table} report missing columns: {}", .missing.join(", "))]
    Schema { table: String, missing: Vec<String> },

    #[error("incorrect password for store {store}")]
    Auth { store: String },

    #[error("unknown store: {0}")]
    UnknownStore(String),

    #[error("store directory has no stores configured")]
    NoStores,

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx, .xls, .ods or .csv)")]
    UnsupportedFormat(String),

    #[error("workbook has no sheets or no header row: {0}")]
    EmptyWorkbook(String),

    #[error("no data loaded, load the sales and stock files first")]
    NotLoaded,

    #[error("file read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet parse failed: {0}")]
    Excel(String),

    #[error("csv failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("config parse failed: {0}")]
    Config(#[from] toml::de::Error),

    #[error("json failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workbook export failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl From<calamine::Error> for ReportError {
    fn from(err: calamine::Error) -> Self {
        ReportError::Excel(err.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

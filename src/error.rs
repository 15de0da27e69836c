use std::path::PathBuf;

use thiserror::Error;

use crate::model::MAX_POINTS;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, NewsletterError>;

/// Error type covering every failure that aborts a newsletter build.
///
/// The `Display` output of each variant is the single line shown to the user,
/// so row numbers are reported the way a spreadsheet shows them (the header is
/// row 1, the first data row is row 2).
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from the workbook reader.
    #[error("workbook read error: {0}")]
    WorkbookRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the workbook writer.
    #[error("workbook write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a remote tab payload is not valid delimited text.
    #[error("CSV decode error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when the build report cannot be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a required sheet is absent from the workbook.
    #[error("workbook is missing required sheet: {0}")]
    MissingSheet(String),

    /// Raised when a table header lacks one or more required columns.
    #[error("missing required columns in {table} sheet: {}", .columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("missing order value at points row {row}")]
    MissingOrder { row: usize },

    #[error("invalid order value '{value}' at points row {row}")]
    InvalidOrder { row: usize, value: String },

    #[error("order value must be a whole number at points row {row}")]
    FractionalOrder { row: usize },

    #[error("order value must be between 1 and {} at points row {row}", MAX_POINTS)]
    OrderOutOfRange { row: usize },

    /// Raised when a non-blank points row lacks a mandatory field.
    #[error("missing {field} at points row {row}")]
    MissingField { row: usize, field: &'static str },

    /// Raised with every order value that appears more than once.
    #[error("duplicate order values found: {}", join_orders(.0))]
    DuplicateOrders(Vec<u32>),

    #[error(
        "found {count} points, max allowed is {}; delete or merge entries to keep it to {} or fewer",
        MAX_POINTS,
        MAX_POINTS
    )]
    TooManyPoints { count: usize },

    #[error("no points found, add at least 1 row in the points sheet")]
    NoPoints,

    #[error("distribution row is missing category")]
    MissingCategory,

    #[error("distribution amount cannot be negative for category '{category}'")]
    NegativeAmount { category: String },

    /// Raised when the remote sheet reference is neither a sheet URL nor an id.
    #[error("invalid Google Sheet reference, pass a full sheet URL or a sheet ID")]
    InvalidSheetReference,

    #[error("Google Sheet tab '{0}' is empty")]
    EmptyTab(String),

    /// Raised when the sheet endpoint answers with a non-success status.
    #[error(
        "could not load Google Sheet tab '{tab}' (HTTP {status}); confirm sharing is enabled and tab names are correct"
    )]
    SheetAccess { tab: String, status: u16 },

    /// Raised when the sheet endpoint answers with a sign-in page instead of data.
    #[error(
        "could not read Google Sheet tab '{0}'; share the sheet as viewable (anyone with the link can view)"
    )]
    SheetNotShared(String),

    #[error(
        "Google Sheets returned an error for tab '{0}'; check that the tab exists and has access permissions"
    )]
    SheetQueryFailed(String),

    /// Raised when the sheet endpoint could not be reached at all.
    #[error("network error while loading Google Sheet tab '{tab}': {reason}")]
    Network { tab: String, reason: String },

    /// Raised when the user provides a path that does not exist.
    #[error("workbook not found: {0}; run init-template first to create it")]
    MissingInput(PathBuf),

    #[error("template already exists at: {0}")]
    TemplateExists(PathBuf),

    #[error("init-template only works with local workbooks")]
    TemplateRequiresLocal,

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

fn join_orders(orders: &[u32]) -> String {
    orders
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

use thiserror::Error;

/// Error type shared by every sportscope component
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("Excel error: {0}")]
    ExcelError(String),

    #[error("SQL error: {0}")]
    SqlError(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Column '{name}' must be numeric for {context}")]
    NonNumericColumn { name: String, context: String },

    /// A required user selection or entry is missing
    #[error("{0}")]
    MissingInput(String),

    /// A 3D chart was requested without a Z-axis column
    #[error("Please select a Z-Axis column for 3D charts ({0}).")]
    MissingZAxis(String),

    #[error("Chart type '{0}' is not implemented")]
    NotImplemented(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[source] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[source] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

/// How a failure is presented at the action boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Reported before any library call: no file, no columns, no Z axis
    MissingInput,
    /// Parse failures, fit failures, I/O failures
    Runtime,
    /// The requested chart kind exists in the catalog but has no renderer
    Unsupported,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MissingInput(_) | Error::MissingZAxis(_) => ErrorCategory::MissingInput,
            Error::NotImplemented(_) => ErrorCategory::Unsupported,
            _ => ErrorCategory::Runtime,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Sqlite(err)
    }
}

#[cfg(feature = "excel")]
impl From<calamine::XlsxError> for Error {
    fn from(err: calamine::XlsxError) -> Self {
        Error::ExcelError(err.to_string())
    }
}

// Plotters drawing errors
#[cfg(feature = "visualization")]
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for Error
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Error::Visualization(format!("Plot drawing error: {}", err))
    }
}

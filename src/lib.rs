//! sportscope: explore tabular sports datasets
//!
//! Load a CSV, Excel or SQLite table, chart it through a fixed catalog of
//! chart kinds, forecast one column from another, flag outlying rows and
//! convert the table between file formats.

pub mod app;
pub mod column;
pub mod command;
pub mod error;
pub mod forecast;
pub mod io;
pub mod ml;
pub mod settings;
pub mod stats;
pub mod suggest;
pub mod table;
pub mod vis;

// Re-export commonly used types
pub use app::App;
pub use column::{Column, ColumnType, NumericColumn, TextColumn};
pub use error::{Error, ErrorCategory, Result};
pub use forecast::{run_forecast, ForecastConfig, ForecastModel, ForecastResult};
pub use io::{convert_table, load_table, FileFormat};
pub use settings::Settings;
pub use suggest::{suggest_charts, Suggestion};
pub use table::{Table, PREDICTION_COLUMN};
pub use vis::{build_dashboard, build_figure, ChartKind, ChartRequest, DashboardConfig, Figure};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

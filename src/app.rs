//! Application state and user actions
//!
//! [`App`] owns the loaded table, the user's selections, the last forecast,
//! the anomaly mask, the dashboard configuration and the appearance
//! settings. Every action handles its own failures: the error is turned
//! into a [`Notice`] and a status-bar message, and the state that existed
//! before the action is left in place.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCategory};
use crate::forecast::{parse_horizon, run_forecast, ForecastConfig, ForecastModel, ForecastResult};
use crate::io::{self, FileFormat};
use crate::ml::{detect_anomalies, AnomalyMask, IsolationForest};
use crate::settings::{is_valid_color, AppliedStyle, ColorTarget, Settings, ThemeMode};
use crate::suggest::{suggest_charts, Suggestion};
use crate::table::Table;
use crate::vis::{
    build_dashboard, build_figure, parse_chart_count, render_figure, ChartKind, ChartRequest,
    ChartStyle, DashboardConfig, Figure, Overlays,
};

pub const WELCOME_STATUS: &str = "Welcome to Sport Scope Dashboard!";
/// Status messages kept in the history
pub const STATUS_HISTORY_LIMIT: usize = 100;
/// Kinds accepted by the custom chart action
pub const CUSTOM_CHART_KINDS: [ChartKind; 6] = [
    ChartKind::Scatter,
    ChartKind::Line,
    ChartKind::Bar,
    ChartKind::Area,
    ChartKind::Bubble,
    ChartKind::Pie,
];

const ANOMALY_TREES: usize = 100;
const ANOMALY_MAX_SAMPLES: usize = 256;
const ANOMALY_CONTAMINATION: f64 = 0.05;
const ANOMALY_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
    NotImplemented,
}

impl NoticeKind {
    pub fn title(&self) -> &'static str {
        match self {
            NoticeKind::Info => "Success",
            NoticeKind::Warning => "Warning",
            NoticeKind::Error => "Error",
            NoticeKind::NotImplemented => "Not Implemented",
        }
    }
}

impl From<ErrorCategory> for NoticeKind {
    fn from(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::MissingInput => NoticeKind::Warning,
            ErrorCategory::Unsupported => NoticeKind::NotImplemented,
            ErrorCategory::Runtime => NoticeKind::Error,
        }
    }
}

/// A message box shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

/// One status-bar message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub message: String,
    pub error: bool,
    pub at: DateTime<Local>,
}

impl Status {
    fn new(message: impl Into<String>, error: bool) -> Self {
        Self {
            message: message.into(),
            error,
            at: Local::now(),
        }
    }
}

/// Where rendered figures are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub extension: String,
}

/// Current column and chart selections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub kind: Option<ChartKind>,
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "figure".to_string()
    } else {
        trimmed.to_string()
    }
}

/// State of one interactive session
#[derive(Debug)]
pub struct App {
    table: Option<Table>,
    source: Option<PathBuf>,
    selection: Selection,
    suggestions: Vec<Suggestion>,
    forecast_config: ForecastConfig,
    prediction_mode: bool,
    forecast: Option<ForecastResult>,
    anomalies: Option<AnomalyMask>,
    dashboard: DashboardConfig,
    settings: Settings,
    output: Option<OutputTarget>,
    last_figure: Option<Figure>,
    figures_written: usize,
    notices: Vec<Notice>,
    status: Status,
    history: Vec<Status>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let status = Status::new(WELCOME_STATUS, false);
        Self {
            table: None,
            source: None,
            selection: Selection::default(),
            suggestions: Vec::new(),
            forecast_config: ForecastConfig::default(),
            prediction_mode: false,
            forecast: None,
            anomalies: None,
            dashboard: DashboardConfig::new(),
            settings: Settings::default(),
            output: None,
            last_figure: None,
            figures_written: 0,
            notices: Vec::new(),
            history: vec![status.clone()],
            status,
        }
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn forecast_config(&self) -> &ForecastConfig {
        &self.forecast_config
    }

    pub fn prediction_mode(&self) -> bool {
        self.prediction_mode
    }

    pub fn forecast(&self) -> Option<&ForecastResult> {
        self.forecast.as_ref()
    }

    pub fn anomalies(&self) -> Option<&AnomalyMask> {
        self.anomalies.as_ref()
    }

    pub fn dashboard(&self) -> &DashboardConfig {
        &self.dashboard
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn last_figure(&self) -> Option<&Figure> {
        self.last_figure.as_ref()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn history(&self) -> &[Status] {
        &self.history
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Remove and return the pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn set_status(&mut self, message: impl Into<String>, error: bool) {
        let status = Status::new(message, error);
        if self.history.len() == STATUS_HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(status.clone());
        self.status = status;
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NoticeKind::Info => log::info!("{}", message),
            NoticeKind::Warning | NoticeKind::NotImplemented => log::warn!("{}", message),
            NoticeKind::Error => log::error!("{}", message),
        }
        self.notices.push(Notice {
            kind,
            title: kind.title().to_string(),
            message,
        });
    }

    fn succeed(&mut self, message: impl Into<String>, status: impl Into<String>) {
        self.notify(NoticeKind::Info, message);
        self.set_status(status, false);
    }

    fn fail(&mut self, err: &Error, message: impl Into<String>, status: impl Into<String>) {
        self.notify(err.category().into(), message);
        self.set_status(status, true);
    }

    fn warn(&mut self, message: impl Into<String>, status: impl Into<String>) {
        self.notify(NoticeKind::Warning, message);
        self.set_status(status, true);
    }

    fn overlays(&self) -> Overlays<'_> {
        Overlays {
            prediction_mode: self.prediction_mode,
            forecast: self.forecast.as_ref(),
            anomalies: self.anomalies.as_ref(),
        }
    }

    // ---- dataset ----

    /// Load a CSV, XLSX or SQLite file, replacing the current table
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        match io::load_table(path) {
            Ok(table) => {
                self.table = Some(table);
                self.source = Some(path.to_path_buf());
                self.selection = Selection::default();
                self.dashboard = DashboardConfig::new();
                self.prediction_mode = false;
                self.forecast = None;
                self.anomalies = None;
                self.last_figure = None;
                self.refresh_suggestions();
                self.succeed(
                    format!("File loaded: {}", path.display()),
                    format!("File loaded: {}", path.display()),
                );
                true
            }
            Err(e) => {
                self.fail(&e, format!("Failed to load file: {}", e), "Failed to load file.");
                false
            }
        }
    }

    fn refresh_suggestions(&mut self) {
        self.suggestions = self.table.as_ref().map(suggest_charts).unwrap_or_default();
        if self.suggestions.is_empty() {
            self.set_status("No chart suggestions available.", false);
        } else {
            self.set_status("Chart suggestions updated.", false);
        }
    }

    // ---- selections ----

    pub fn select_x(&mut self, column: &str) {
        self.selection.x = non_empty(column);
    }

    pub fn select_y(&mut self, column: &str) {
        self.selection.y = non_empty(column);
    }

    pub fn select_z(&mut self, column: &str) {
        self.selection.z = non_empty(column);
    }

    /// Select a chart kind by catalog name; blank clears the selection
    pub fn select_chart_kind(&mut self, name: &str) {
        self.selection.kind = non_empty(name).map(|n| ChartKind::parse(&n));
    }

    // ---- charts ----

    /// Render the selected chart kind over the selected columns
    pub fn generate_chart(&mut self) -> Option<Figure> {
        if self.table.is_none() {
            self.warn("Please upload a dataset first.", "No dataset loaded.");
            return None;
        }
        let Some(kind) = self.selection.kind.clone() else {
            self.warn("Please select a chart type.", "Chart type not selected.");
            return None;
        };
        let table = self.table.as_ref()?;

        let request = ChartRequest {
            kind: kind.clone(),
            x: self.selection.x.clone(),
            y: self.selection.y.clone(),
            z: self.selection.z.clone(),
            style: ChartStyle::default(),
        };
        let result = build_figure(table, &request, &self.overlays(), &self.settings);

        match result {
            Ok(figure) => {
                let figure = self.publish(figure)?;
                self.succeed(
                    format!("{} chart generated successfully.", kind.name()),
                    format!("{} chart generated successfully.", kind.name()),
                );
                Some(figure)
            }
            Err(e @ Error::MissingInput(_)) => {
                self.fail(&e, e.to_string(), "X or Y column not selected.");
                None
            }
            Err(e @ Error::MissingZAxis(_)) => {
                self.fail(
                    &e,
                    "Please select a Z-Axis column for 3D charts.",
                    format!("Missing Z-Axis for {}.", kind.name()),
                );
                None
            }
            Err(e @ Error::NotImplemented(_)) => {
                self.fail(
                    &e,
                    format!("The chart type '{}' is not implemented.", kind.name()),
                    format!("Chart type '{}' not implemented.", kind.name()),
                );
                None
            }
            Err(e) => {
                self.fail(
                    &e,
                    format!("Failed to create visualization: {}", e),
                    "Visualization failed.",
                );
                None
            }
        }
    }

    /// Adopt suggestion `index`: set its columns and kind, then render it
    pub fn select_suggestion(&mut self, index: usize) -> Option<Figure> {
        let Some(suggestion) = self.suggestions.get(index).cloned() else {
            let err = Error::IndexOutOfBounds {
                index,
                size: self.suggestions.len(),
            };
            self.fail(&err, format!("Invalid suggestion: {}", err), "No suggestion selected.");
            return None;
        };
        self.selection.x = Some(suggestion.x.clone());
        self.selection.y = suggestion.y.clone();
        self.selection.z = None;
        self.selection.kind = Some(suggestion.kind.clone());
        self.generate_chart()
    }

    /// Render one of [`CUSTOM_CHART_KINDS`] with an optional title and color
    pub fn custom_chart(&mut self, kind: &str, title: &str, color: &str) -> Option<Figure> {
        if self.table.is_none() {
            self.warn("Please upload a dataset first.", "No dataset loaded.");
            return None;
        }
        let (Some(x), Some(y)) = (self.selection.x.clone(), self.selection.y.clone()) else {
            self.warn(
                "Please select both X and Y columns.",
                "Custom chart generation failed.",
            );
            return None;
        };

        let chart_kind = ChartKind::parse(kind);
        if !CUSTOM_CHART_KINDS.contains(&chart_kind) {
            let err = Error::NotImplemented(kind.trim().to_string());
            self.fail(
                &err,
                format!("Custom chart type '{}' not implemented.", kind.trim()),
                "Custom chart generation failed.",
            );
            return None;
        }

        let color = non_empty(color);
        if let Some(color) = color.as_deref().filter(|c| !is_valid_color(c)) {
            let err = Error::InvalidValue(format!("invalid color: {}", color));
            self.fail(
                &err,
                format!("Custom chart failed: {}", err),
                "Custom chart generation failed.",
            );
            return None;
        }

        let title = non_empty(title)
            .unwrap_or_else(|| format!("Custom {}: {} vs {}", chart_kind.name(), x, y));
        let request = ChartRequest::new(chart_kind, x, y).with_style(ChartStyle {
            title: Some(title),
            color,
        });
        let table = self.table.as_ref()?;
        let result = build_figure(table, &request, &Overlays::default(), &self.settings);

        match result {
            Ok(figure) => {
                let figure = self.publish(figure)?;
                self.succeed("Custom chart generated successfully.", "Custom chart generated.");
                Some(figure)
            }
            Err(e) => {
                self.fail(
                    &e,
                    format!("Custom chart failed: {}", e),
                    "Custom chart generation failed.",
                );
                None
            }
        }
    }

    /// Write figures to `dir` as `extension` files from now on
    pub fn set_output(&mut self, dir: &str, extension: &str) -> bool {
        let extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        if !matches!(extension.as_str(), "png" | "svg" | "json") {
            let err = Error::UnsupportedFormat(extension);
            self.fail(&err, err.to_string(), "Output not changed.");
            return false;
        }
        let dir = PathBuf::from(dir.trim());
        let message = format!("Figures will be written to {} as {}.", dir.display(), extension);
        self.output = Some(OutputTarget { dir, extension });
        self.set_status(message, false);
        true
    }

    /// Stop writing figures; they are only kept in memory
    pub fn clear_output(&mut self) {
        self.output = None;
        self.set_status("Figures are no longer written to disk.", false);
    }

    /// Render `figure` to the output target, if any, and keep it as the last figure
    fn publish(&mut self, figure: Figure) -> Option<Figure> {
        if let Some(target) = &self.output {
            let name = format!(
                "{:03}_{}.{}",
                self.figures_written + 1,
                slug(&figure.layout.title),
                target.extension
            );
            let path = target.dir.join(name);
            if let Err(e) = render_figure(&figure, &path) {
                self.fail(
                    &e,
                    format!("Failed to create visualization: {}", e),
                    "Visualization failed.",
                );
                return None;
            }
            self.figures_written += 1;
            log::info!("figure written to {}", path.display());
        }
        self.last_figure = Some(figure.clone());
        Some(figure)
    }

    // ---- prediction ----

    pub fn set_forecast_model(&mut self, name: &str) -> bool {
        match name.parse::<ForecastModel>() {
            Ok(model) => {
                self.forecast_config.model = model;
                self.set_status(format!("Forecast model set to {}.", model), false);
                true
            }
            Err(e) => {
                self.fail(&e, e.to_string(), "Forecast model not changed.");
                false
            }
        }
    }

    /// Set the horizon from free text; anything but digits means the default
    pub fn set_forecast_horizon(&mut self, text: &str) {
        self.forecast_config.horizon = parse_horizon(text.trim());
        let message = format!("Forecast horizon set to {}.", self.forecast_config.horizon);
        self.set_status(message, false);
    }

    pub fn set_confidence_interval(&mut self, enabled: bool) {
        self.forecast_config.confidence_interval = enabled;
        let state = if enabled { "enabled" } else { "disabled" };
        self.set_status(format!("Confidence interval {}.", state), false);
    }

    /// Turn prediction mode on (and run a forecast) or off
    ///
    /// A forecast that fails leaves the mode as it was.
    pub fn set_prediction_mode(&mut self, enabled: bool) -> bool {
        if !enabled {
            self.prediction_mode = false;
            self.succeed("Prediction mode is now disabled.", "Prediction mode disabled.");
            return true;
        }
        if self.run_prediction() {
            self.prediction_mode = true;
            true
        } else {
            false
        }
    }

    pub fn toggle_prediction_mode(&mut self) -> bool {
        self.set_prediction_mode(!self.prediction_mode)
    }

    /// Forecast the selected Y from the selected X
    ///
    /// On success the `Prediction` column is rewritten and the result kept
    /// for chart overlays. On failure the table and previous result stay.
    pub fn run_prediction(&mut self) -> bool {
        if self.table.is_none() {
            let err = Error::MissingInput("no dataset loaded".to_string());
            self.fail(
                &err,
                "Prediction failed: no dataset loaded.",
                "Prediction failed: no dataset loaded.",
            );
            return false;
        }
        let (Some(x), Some(y)) = (self.selection.x.clone(), self.selection.y.clone()) else {
            self.warn(
                "Please select both X-Axis and Y-Axis columns for prediction.",
                "Prediction failed: columns not selected.",
            );
            return false;
        };
        let Some(table) = self.table.as_ref() else {
            return false;
        };

        let result = run_forecast(table, &x, &y, &self.forecast_config).and_then(|result| {
            let mut updated = table.clone();
            updated.set_prediction(result.fitted.clone())?;
            Ok((updated, result))
        });

        match result {
            Ok((table, result)) => {
                let mut message = format!(
                    "Prediction complete for '{}' using '{}' with {} model.",
                    result.y_column, result.x_column, result.model
                );
                if let Some(fallback) = &result.fallback {
                    message.push_str(&format!(" ({})", fallback));
                }
                self.table = Some(table);
                self.forecast = Some(result);
                self.suggestions = self.table.as_ref().map(suggest_charts).unwrap_or_default();
                self.succeed(message, "Prediction completed successfully.");
                true
            }
            Err(e @ Error::InsufficientData(_)) => {
                self.fail(
                    &e,
                    "Prediction failed: no valid numeric data.",
                    "Prediction failed: no valid numeric data.",
                );
                false
            }
            Err(e) => {
                self.fail(&e, format!("Prediction failed: {}", e), "Prediction failed.");
                false
            }
        }
    }

    /// Write the current table, `Prediction` column included, as CSV
    pub fn export_predictions<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        let Some(table) = self.table.as_ref() else {
            self.warn("No data to export.", "Export failed.");
            return false;
        };
        match io::write_csv(table, path) {
            Ok(()) => {
                let message = format!("Data exported to {}", path.display());
                self.succeed(message.clone(), message);
                true
            }
            Err(e) => {
                self.fail(&e, format!("Export failed: {}", e), "Export failed.");
                false
            }
        }
    }

    // ---- conversion ----

    /// Save the table in `format` (CSV, Excel or SQLite) at `path`
    pub fn convert_file<P: AsRef<Path>>(&mut self, format: &str, path: P) -> bool {
        let path = path.as_ref();
        let Some(table) = self.table.as_ref() else {
            self.warn(
                "Please upload a file in the File Converter section first.",
                "No dataset loaded.",
            );
            return false;
        };
        let result = format
            .parse::<FileFormat>()
            .and_then(|format| io::convert_table(table, format, path).map(|()| format));

        match result {
            Ok(format) => {
                self.succeed(
                    format!("File converted and saved to {}", path.display()),
                    format!("File converted to {} and saved.", format),
                );
                true
            }
            Err(e) => {
                self.fail(
                    &e,
                    format!("File conversion failed: {}", e),
                    "File conversion failed.",
                );
                false
            }
        }
    }

    // ---- dashboard ----

    /// Start a dashboard with `text` blank entries
    pub fn set_chart_count(&mut self, text: &str) -> bool {
        match parse_chart_count(text) {
            Ok(count) => {
                self.dashboard = DashboardConfig::with_count(count);
                self.set_status(format!("Dashboard configured for {} charts.", count), false);
                true
            }
            Err(e) => {
                self.fail(&e, e.to_string(), "Invalid chart count.");
                false
            }
        }
    }

    /// Configure dashboard entry `index` (zero-based)
    pub fn set_dashboard_entry(&mut self, index: usize, kind: &str, x: &str, y: &str) -> bool {
        match self.dashboard.set_entry(index, ChartKind::parse(kind), x.trim(), y.trim()) {
            Ok(()) => {
                self.set_status(format!("Chart {} configured.", index + 1), false);
                true
            }
            Err(e) => {
                self.fail(&e, format!("Invalid dashboard entry: {}", e), "Dashboard not changed.");
                false
            }
        }
    }

    pub fn create_dashboard(&mut self) -> Option<Figure> {
        let Some(table) = self.table.as_ref() else {
            self.warn(
                "Please upload a dataset in the File & Data tab first.",
                "No dataset loaded.",
            );
            return None;
        };
        match build_dashboard(table, &self.dashboard, &self.settings) {
            Ok(figure) => {
                let figure = self.publish(figure)?;
                self.succeed(
                    "Custom dashboard created successfully.",
                    "Custom dashboard created successfully.",
                );
                Some(figure)
            }
            Err(e) if e.category() == ErrorCategory::MissingInput => {
                self.fail(&e, e.to_string(), "Dashboard creation failed.");
                None
            }
            Err(e) => {
                self.fail(
                    &e,
                    format!("Failed to create dashboard: {}", e),
                    "Dashboard creation failed.",
                );
                None
            }
        }
    }

    // ---- anomalies ----

    /// Flag outliers over `columns`, or every numeric column when empty
    pub fn detect_anomalies(&mut self, columns: &[&str]) -> bool {
        let Some(table) = self.table.as_ref() else {
            self.warn("Please upload a dataset first.", "No dataset loaded.");
            return false;
        };
        let result = IsolationForest::new(
            ANOMALY_TREES,
            Some(ANOMALY_MAX_SAMPLES),
            ANOMALY_CONTAMINATION,
            Some(ANOMALY_SEED),
        )
        .and_then(|mut forest| detect_anomalies(table, columns, &mut forest));

        match result {
            Ok(mask) => {
                let flagged = mask.iter().filter(|&&m| m).count();
                let message = format!("Detected {} anomalies in {} rows.", flagged, mask.len());
                self.anomalies = Some(mask);
                self.succeed(message, "Anomaly detection complete.");
                true
            }
            Err(e) => {
                self.fail(
                    &e,
                    format!("Anomaly detection failed: {}", e),
                    "Anomaly detection failed.",
                );
                false
            }
        }
    }

    pub fn clear_anomalies(&mut self) {
        self.anomalies = None;
        self.set_status("Anomaly markers cleared.", false);
    }

    // ---- settings ----

    pub fn apply_settings(&mut self) -> AppliedStyle {
        let style = self.settings.apply();
        self.succeed("Settings applied successfully.", "Settings applied.");
        style
    }

    pub fn reset_settings(&mut self) -> AppliedStyle {
        self.settings.reset();
        self.succeed("Settings reset to defaults.", "Settings reset to defaults.");
        self.settings.apply()
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        let mode = self.settings.toggle_theme();
        let message = match mode {
            ThemeMode::Dark => "Switched to Dark Mode.",
            ThemeMode::Light => "Switched to Light Mode.",
        };
        self.set_status(message, false);
        mode
    }

    pub fn set_color(&mut self, target: &str, value: &str) -> bool {
        let result = target
            .parse::<ColorTarget>()
            .and_then(|t| self.settings.set_color(t, value).map(|()| t));
        match result {
            Ok(target) => {
                let message = match target {
                    ColorTarget::Background => "Background color updated.",
                    ColorTarget::Text => "Text color updated.",
                    ColorTarget::Button => "Button color updated.",
                    ColorTarget::ChartTitle => "Chart title color updated.",
                    ColorTarget::AxisLabel => "Axis label color updated.",
                };
                self.set_status(message, false);
                true
            }
            Err(e) => {
                self.fail(&e, e.to_string(), "Settings not changed.");
                false
            }
        }
    }

    pub fn set_font(&mut self, family: &str, size: &str) -> bool {
        let result = size
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::InvalidValue(format!("invalid font size: {}", size.trim())))
            .and_then(|size| self.settings.set_font(family, size));
        match result {
            Ok(()) => {
                let message = format!(
                    "Font set to {} {}.",
                    self.settings.font_family, self.settings.font_size
                );
                self.set_status(message, false);
                true
            }
            Err(e) => {
                self.fail(&e, e.to_string(), "Settings not changed.");
                false
            }
        }
    }

    pub fn set_palette(&mut self, text: &str) -> bool {
        match self.settings.set_palette(text) {
            Ok(()) => {
                self.set_status("Color palette updated.", false);
                true
            }
            Err(e) => {
                self.fail(&e, e.to_string(), "Settings not changed.");
                false
            }
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::table::Table;
use crate::vis::chart::{ChartKind, ChartRequest, ChartStyle, ResolvedColumns};
use crate::vis::figure::{Annotation, Figure, Margin};
use crate::vis::render::{base_layout, chart_traces};

pub const DASHBOARD_TITLE: &str = "Custom Dashboard";
pub const PANEL_WIDTH: u32 = 600;
pub const PANEL_HEIGHT: u32 = 400;

/// Grid of a dashboard with `n` panels as (rows, cols)
///
/// `cols = ceil(sqrt(n))`, `rows = ceil(n / cols)`.
pub fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (rows, cols)
}

/// Parse the chart count entry
pub fn parse_chart_count(text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::MissingInput(
            "Please enter a valid number for chart count.".to_string(),
        )),
    }
}

/// Ordered chart entries of a dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub entries: Vec<ChartRequest>,
}

impl DashboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` Scatter entries with no columns selected
    pub fn with_count(count: usize) -> Self {
        let blank = ChartRequest {
            kind: ChartKind::Scatter,
            x: None,
            y: None,
            z: None,
            style: ChartStyle::default(),
        };
        Self {
            entries: vec![blank; count],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_entry(&mut self, index: usize, kind: ChartKind, x: &str, y: &str) -> Result<()> {
        let size = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, size })?;
        entry.kind = kind;
        entry.x = Some(x.to_string());
        entry.y = Some(y.to_string());
        Ok(())
    }

    /// Every entry must have X and Y selected
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::MissingInput(
                "No chart configurations available.".to_string(),
            ));
        }
        let selected = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if self.entries.iter().any(|e| !selected(&e.x) || !selected(&e.y)) {
            return Err(Error::MissingInput(
                "Please select X and Y columns for all charts.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Combine every entry into one multi-panel figure
///
/// Panel `i` sits at `(i / cols, i % cols)`. Kinds without a 2D builder get
/// a placeholder annotation instead of traces.
pub fn build_dashboard(table: &Table, config: &DashboardConfig, settings: &Settings) -> Result<Figure> {
    config.validate()?;
    let (rows, cols) = grid_dims(config.len());

    let mut layout = base_layout(settings, DASHBOARD_TITLE.to_string(), Margin::PANEL);
    layout.grid = (rows, cols);
    layout.subplot_titles = (1..=config.len()).map(|i| format!("Chart {}", i)).collect();
    layout.width = Some(cols as u32 * PANEL_WIDTH);
    layout.height = Some(rows as u32 * PANEL_HEIGHT);
    let mut figure = Figure::new(layout);

    for (i, entry) in config.entries.iter().enumerate() {
        let panel = (i / cols, i % cols);
        if !entry.kind.is_implemented() || entry.kind.is_3d() {
            figure.annotations.push(Annotation {
                text: format!("Chart type '{}' not implemented", entry.kind.name()),
                subplot: panel,
            });
            continue;
        }

        let resolve = |name: &Option<String>| -> Result<String> {
            let name = name.as_deref().unwrap_or_default();
            table
                .resolve_column_name(name)
                .map(str::to_string)
                .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
        };
        let columns = ResolvedColumns {
            x: Some(resolve(&entry.x)?),
            y: Some(resolve(&entry.y)?),
            z: None,
        };

        let color = settings.palette_color(i);
        for mut trace in chart_traces(table, &entry.kind, &columns, color)? {
            trace.subplot = panel;
            figure.add_trace(trace);
        }
    }

    log::info!(
        "dashboard with {} charts laid out as {}x{}",
        config.len(),
        rows,
        cols
    );
    Ok(figure)
}

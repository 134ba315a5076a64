//! Serializable figure model
//!
//! A [`Figure`] is a backend-independent description of a chart: layout,
//! traces and free-standing annotations. It is produced by the builders in
//! [`crate::vis::render`] and drawn by the plotters backend or written out
//! as JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Margin {
    /// Margins of a single chart
    pub const SINGLE: Margin = Margin {
        left: 60,
        right: 80,
        top: 60,
        bottom: 60,
    };

    /// Margins of a dashboard figure
    pub const PANEL: Margin = Margin {
        left: 60,
        right: 60,
        top: 60,
        bottom: 60,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub title_font: Font,
    pub font: Font,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub z_title: Option<String>,
    pub margin: Margin,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Subplot grid as (rows, cols); `(1, 1)` for single charts
    pub grid: (usize, usize),
    pub subplot_titles: Vec<String>,
    pub background: String,
    pub palette: Vec<String>,
}

/// Values along one axis of a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum AxisValues {
    Numbers(Vec<f64>),
    Categories(Vec<String>),
}

impl AxisValues {
    pub fn len(&self) -> usize {
        match self {
            AxisValues::Numbers(v) => v.len(),
            AxisValues::Categories(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            AxisValues::Numbers(v) => Some(v),
            AxisValues::Categories(_) => None,
        }
    }

    /// Text labels for every point
    pub fn labels(&self) -> Vec<String> {
        match self {
            AxisValues::Numbers(v) => v.iter().map(|n| crate::column::format_number(*n)).collect(),
            AxisValues::Categories(v) => v.clone(),
        }
    }
}

impl Default for AxisValues {
    fn default() -> Self {
        AxisValues::Numbers(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Scatter,
    Line,
    Bar,
    Pie { hole: f64 },
    Area,
    Bubble,
    Waterfall,
    Histogram { bin_width: Option<f64> },
    Box,
    Heatmap,
    Scatter3d,
    Line3d,
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerSymbol {
    Circle,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dash {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub color: Option<String>,
    /// Per-point sizes; a single entry applies to all points
    pub sizes: Vec<f64>,
    pub symbol: MarkerSymbol,
    pub colorscale: Option<String>,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            color: None,
            sizes: Vec::new(),
            symbol: MarkerSymbol::Circle,
            colorscale: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: Option<String>,
    pub width: u32,
    pub dash: Dash,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: None,
            width: 2,
            dash: Dash::Solid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub x: AxisValues,
    pub y: AxisValues,
    pub z: Option<Vec<f64>>,
    /// Row-major z grid for heatmaps and surfaces; `None` cells are empty
    pub grid: Option<Vec<Vec<Option<f64>>>>,
    pub marker: Marker,
    pub line: LineStyle,
    /// Fill color for areas and confidence polygons
    pub fill: Option<String>,
    /// Zero-based (row, col) of the owning subplot
    pub subplot: (usize, usize),
    pub show_legend: bool,
}

impl Trace {
    pub fn new(name: impl Into<String>, kind: TraceKind, x: AxisValues, y: AxisValues) -> Self {
        Self {
            name: name.into(),
            kind,
            x,
            y,
            z: None,
            grid: None,
            marker: Marker::default(),
            line: LineStyle::default(),
            fill: None,
            subplot: (0, 0),
            show_legend: true,
        }
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.marker.color = color.clone();
        self.line.color = color;
        self
    }
}

/// Free text placed at the center of a subplot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub subplot: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub layout: Layout,
    pub traces: Vec<Trace>,
    pub annotations: Vec<Annotation>,
}

impl Figure {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            traces: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    pub fn traces_in(&self, subplot: (usize, usize)) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(move |t| t.subplot == subplot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

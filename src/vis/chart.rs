use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::table::Table;

/// Chart catalog
///
/// Parsing never fails: names outside the catalog become
/// [`ChartKind::Unsupported`] and are reported when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    Scatter,
    Line,
    Bar,
    Pie,
    Area,
    Bubble,
    Waterfall,
    Histogram,
    Funnel,
    Gantt,
    Donut,
    Radar,
    Treemap,
    BoxPlot,
    ClusteredBar,
    Flowchart,
    Heatmap,
    BulletGraph,
    Scatter3D,
    Surface3D,
    Line3D,
    Bubble3D,
    VennDiagram,
    Unsupported(String),
}

impl ChartKind {
    /// Every catalog entry, in menu order
    pub const CATALOG: [ChartKind; 23] = [
        ChartKind::Scatter,
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Area,
        ChartKind::Bubble,
        ChartKind::Waterfall,
        ChartKind::Histogram,
        ChartKind::Funnel,
        ChartKind::Gantt,
        ChartKind::Donut,
        ChartKind::Radar,
        ChartKind::Treemap,
        ChartKind::BoxPlot,
        ChartKind::ClusteredBar,
        ChartKind::Flowchart,
        ChartKind::Heatmap,
        ChartKind::BulletGraph,
        ChartKind::Scatter3D,
        ChartKind::Surface3D,
        ChartKind::Line3D,
        ChartKind::Bubble3D,
        ChartKind::VennDiagram,
    ];

    /// Parse a chart name, ignoring case and surrounding whitespace
    pub fn parse(name: &str) -> ChartKind {
        let wanted = name.trim();
        Self::CATALOG
            .iter()
            .find(|k| k.name().eq_ignore_ascii_case(wanted))
            .cloned()
            .unwrap_or_else(|| ChartKind::Unsupported(wanted.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            ChartKind::Scatter => "Scatter",
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Pie => "Pie",
            ChartKind::Area => "Area",
            ChartKind::Bubble => "Bubble",
            ChartKind::Waterfall => "Waterfall",
            ChartKind::Histogram => "Histogram",
            ChartKind::Funnel => "Funnel",
            ChartKind::Gantt => "Gantt",
            ChartKind::Donut => "Donut",
            ChartKind::Radar => "Radar",
            ChartKind::Treemap => "Treemap",
            ChartKind::BoxPlot => "Box Plot",
            ChartKind::ClusteredBar => "Clustered Bar",
            ChartKind::Flowchart => "Flowchart",
            ChartKind::Heatmap => "Heatmap",
            ChartKind::BulletGraph => "Bullet Graph",
            ChartKind::Scatter3D => "3D Scatter",
            ChartKind::Surface3D => "3D Surface",
            ChartKind::Line3D => "3D Line",
            ChartKind::Bubble3D => "3D Bubble",
            ChartKind::VennDiagram => "Venn Diagram",
            ChartKind::Unsupported(name) => name,
        }
    }

    pub fn is_3d(&self) -> bool {
        matches!(
            self,
            ChartKind::Scatter3D | ChartKind::Surface3D | ChartKind::Line3D | ChartKind::Bubble3D
        )
    }

    /// Whether a figure builder exists for this kind
    pub fn is_implemented(&self) -> bool {
        matches!(
            self,
            ChartKind::Scatter
                | ChartKind::Line
                | ChartKind::Bar
                | ChartKind::Pie
                | ChartKind::Area
                | ChartKind::Bubble
                | ChartKind::Waterfall
                | ChartKind::Histogram
                | ChartKind::Donut
                | ChartKind::BoxPlot
                | ChartKind::Heatmap
                | ChartKind::Scatter3D
                | ChartKind::Surface3D
                | ChartKind::Line3D
                | ChartKind::Bubble3D
        )
    }

    /// Kinds that get prediction and anomaly overlays
    pub fn supports_overlays(&self) -> bool {
        matches!(self, ChartKind::Scatter | ChartKind::Line | ChartKind::Bubble)
    }

    pub fn needs_x(&self) -> bool {
        !matches!(self, ChartKind::BoxPlot)
    }

    pub fn needs_y(&self) -> bool {
        !matches!(self, ChartKind::Histogram)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-chart overrides from the custom chart creator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub title: Option<String>,
    pub color: Option<String>,
}

/// A chart to draw from the current table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub style: ChartStyle,
}

/// Column names of a validated request, resolved against the table
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumns {
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ChartRequest {
    pub fn new(kind: ChartKind, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            kind,
            x: Some(x.into()),
            y: Some(y.into()),
            z: None,
            style: ChartStyle::default(),
        }
    }

    pub fn with_z(mut self, z: impl Into<String>) -> Self {
        self.z = Some(z.into());
        self
    }

    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// Check the request against `table`
    ///
    /// Checks run in order: required axes are selected, the kind has a
    /// builder, 3D kinds have a Z column, and every referenced column exists.
    pub fn validate(&self, table: &Table) -> Result<ResolvedColumns> {
        let x = non_empty(&self.x);
        let y = non_empty(&self.y);
        let z = non_empty(&self.z);

        if (self.kind.needs_x() && x.is_none()) || (self.kind.needs_y() && y.is_none()) {
            let message = match (self.kind.needs_x(), self.kind.needs_y()) {
                (true, true) => "Please select both X-Axis and Y-Axis columns.",
                (true, false) => "Please select an X-Axis column.",
                _ => "Please select a Y-Axis column.",
            };
            return Err(Error::MissingInput(message.to_string()));
        }

        if !self.kind.is_implemented() {
            return Err(Error::NotImplemented(self.kind.name().to_string()));
        }

        if self.kind.is_3d() && z.is_none() {
            return Err(Error::MissingZAxis(self.kind.name().to_string()));
        }

        let resolve = |name: Option<&str>| -> Result<Option<String>> {
            match name {
                Some(n) => table
                    .resolve_column_name(n)
                    .map(|r| Some(r.to_string()))
                    .ok_or_else(|| Error::ColumnNotFound(n.to_string())),
                None => Ok(None),
            }
        };

        Ok(ResolvedColumns {
            x: if self.kind.needs_x() { resolve(x)? } else { None },
            y: if self.kind.needs_y() { resolve(y)? } else { None },
            z: if self.kind.is_3d() { resolve(z)? } else { None },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, NumericColumn};
    use crate::error::ErrorCategory;

    fn table() -> Table {
        Table::from_columns(vec![
            Column::Numeric(NumericColumn::from_values("A", vec![1.0, 2.0])),
            Column::Numeric(NumericColumn::from_values("B", vec![3.0, 4.0])),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_catalog_names() {
        assert_eq!(ChartKind::parse("box plot"), ChartKind::BoxPlot);
        assert_eq!(ChartKind::parse("3d SCATTER"), ChartKind::Scatter3D);
        assert_eq!(ChartKind::parse(" Venn Diagram "), ChartKind::VennDiagram);
        assert_eq!(
            ChartKind::parse("Sankey"),
            ChartKind::Unsupported("Sankey".to_string())
        );
        for kind in ChartKind::CATALOG.iter() {
            assert_eq!(&ChartKind::parse(kind.name()), kind);
        }
    }

    #[test]
    fn test_missing_axes_reported_first() {
        let request = ChartRequest {
            kind: ChartKind::Funnel,
            x: Some("A".to_string()),
            y: None,
            z: None,
            style: ChartStyle::default(),
        };
        let err = request.validate(&table()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MissingInput);
    }

    #[test]
    fn test_not_implemented_before_z_check() {
        let request = ChartRequest::new(ChartKind::Gantt, "A", "B");
        let err = request.validate(&table()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unsupported);
    }

    #[test]
    fn test_3d_without_z_is_rejected() {
        let request = ChartRequest::new(ChartKind::Scatter3D, "A", "B");
        match request.validate(&table()) {
            Err(Error::MissingZAxis(kind)) => assert_eq!(kind, "3D Scatter"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_histogram_needs_only_x_and_resolves_case() {
        let request = ChartRequest {
            kind: ChartKind::Histogram,
            x: Some("a".to_string()),
            y: None,
            z: None,
            style: ChartStyle::default(),
        };
        let resolved = request.validate(&table()).unwrap();
        assert_eq!(resolved.x.as_deref(), Some("A"));
        assert_eq!(resolved.y, None);
    }

    #[test]
    fn test_unknown_column() {
        let request = ChartRequest::new(ChartKind::Scatter, "A", "Nope");
        assert!(matches!(
            request.validate(&table()),
            Err(Error::ColumnNotFound(name)) if name == "Nope"
        ));
    }
}

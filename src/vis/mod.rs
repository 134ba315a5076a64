//! Chart catalog, figure construction and rendering
//!
//! A [`ChartRequest`] names a [`ChartKind`] and the columns to plot.
//! [`build_figure`] turns it into a backend-independent [`Figure`];
//! [`build_dashboard`] combines several requests into one subplot grid.
//! With the `visualization` feature, [`render_figure`] draws figures to PNG
//! or SVG through plotters.

pub mod chart;
pub mod dashboard;
pub mod figure;
#[cfg(feature = "visualization")]
pub mod plotters_backend;
pub mod render;

pub use self::chart::{ChartKind, ChartRequest, ChartStyle, ResolvedColumns};
pub use self::dashboard::{build_dashboard, grid_dims, parse_chart_count, DashboardConfig};
pub use self::figure::{Annotation, AxisValues, Figure, Layout, Margin, Trace, TraceKind};
pub use self::render::{build_figure, default_title, Overlays};

#[cfg(feature = "visualization")]
pub use self::plotters_backend::render_figure;

/// Write `figure` as JSON when plotters rendering is disabled
#[cfg(not(feature = "visualization"))]
pub fn render_figure<P: AsRef<std::path::Path>>(
    figure: &Figure,
    path: P,
) -> crate::error::Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            std::fs::write(path, figure.to_json()?)?;
            Ok(())
        }
        _ => Err(crate::error::Error::UnsupportedFormat(
            "only JSON figures are available without the visualization feature".to_string(),
        )),
    }
}

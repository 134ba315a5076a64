//! Figure builders, one per implemented chart kind
//!
//! [`build_figure`] validates a [`ChartRequest`], dispatches on its
//! [`ChartKind`] and decorates Scatter, Line and Bubble charts with
//! prediction and anomaly overlays.

use std::collections::HashMap;

use crate::column::{CellValue, Column};
use crate::error::{Error, Result};
use crate::forecast::ForecastResult;
use crate::ml::AnomalyMask;
use crate::settings::Settings;
use crate::table::{Table, PREDICTION_COLUMN};
use crate::vis::chart::{ChartKind, ChartRequest, ResolvedColumns};
use crate::vis::figure::{
    AxisValues, Dash, Figure, Font, Layout, Margin, MarkerSymbol, Trace, TraceKind,
};

pub const OVERLAY_COLOR: &str = "red";
pub const CONFIDENCE_FILL: &str = "rgba(255,0,0,0.2)";
pub const BUBBLE_COLORSCALE: &str = "Viridis";
pub const DONUT_HOLE: f64 = 0.4;

/// Extra layers drawn over Scatter, Line and Bubble charts
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlays<'a> {
    pub prediction_mode: bool,
    pub forecast: Option<&'a ForecastResult>,
    pub anomalies: Option<&'a AnomalyMask>,
}

/// Title used when the request carries none
pub fn default_title(kind: &ChartKind, columns: &ResolvedColumns) -> String {
    let x = columns.x.as_deref().unwrap_or_default();
    let y = columns.y.as_deref().unwrap_or_default();
    match kind {
        ChartKind::Scatter => format!("Scatter plot: {} vs {}", x, y),
        ChartKind::Line => format!("Line plot: {} vs {}", x, y),
        ChartKind::Area => format!("Area plot: {} vs {}", x, y),
        ChartKind::Bubble => format!("Bubble plot: {} vs {}", x, y),
        ChartKind::Waterfall => format!("Waterfall plot: {} vs {}", x, y),
        ChartKind::Bar => format!("Bar chart: {} vs {}", x, y),
        ChartKind::Pie => format!("Pie chart: {} vs {}", x, y),
        ChartKind::Donut => format!("Donut chart: {} vs {}", x, y),
        ChartKind::Histogram => format!("Histogram: {}", x),
        ChartKind::BoxPlot => format!("Box plot: {}", y),
        ChartKind::Heatmap => format!("Heatmap: {} vs {}", x, y),
        other => other.name().to_string(),
    }
}

pub(crate) fn base_layout(settings: &Settings, title: String, margin: Margin) -> Layout {
    Layout {
        title,
        title_font: Font {
            family: settings.font_family.clone(),
            size: settings.title_font_size(),
            color: settings.chart_title_color.clone(),
        },
        font: Font {
            family: settings.font_family.clone(),
            size: settings.font_size,
            color: settings.axis_label_color.clone(),
        },
        x_title: None,
        y_title: None,
        z_title: None,
        margin,
        width: None,
        height: None,
        grid: (1, 1),
        subplot_titles: Vec::new(),
        background: settings.background_color.clone(),
        palette: settings.palette.clone(),
    }
}

/// Build the figure for a single chart request
pub fn build_figure(
    table: &Table,
    request: &ChartRequest,
    overlays: &Overlays<'_>,
    settings: &Settings,
) -> Result<Figure> {
    let columns = request.validate(table)?;
    let title = request
        .style
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| default_title(&request.kind, &columns));

    let mut layout = base_layout(settings, title, Margin::SINGLE);
    layout.x_title = columns.x.clone();
    layout.y_title = columns.y.clone();
    layout.z_title = columns.z.clone();
    let mut figure = Figure::new(layout);

    let color = request
        .style
        .color
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| settings.palette_color(0).to_string());
    for trace in chart_traces(table, &request.kind, &columns, &color)? {
        figure.add_trace(trace);
    }

    if request.kind.supports_overlays() {
        add_overlays(&mut figure, table, &columns, overlays)?;
    }

    log::debug!(
        "built {} figure with {} traces",
        request.kind,
        figure.traces.len()
    );
    Ok(figure)
}

/// Data traces of one chart, without layout or overlays
pub(crate) fn chart_traces(
    table: &Table,
    kind: &ChartKind,
    columns: &ResolvedColumns,
    color: &str,
) -> Result<Vec<Trace>> {
    let x = || required(&columns.x, "X");
    let y = || required(&columns.y, "Y");
    let z = || required(&columns.z, "Z");

    let trace = match kind {
        ChartKind::Scatter => xy_trace(table, x()?, y()?, TraceKind::Scatter)?,
        ChartKind::Line => xy_trace(table, x()?, y()?, TraceKind::Line)?,
        ChartKind::Bar => xy_trace(table, x()?, y()?, TraceKind::Bar)?,
        ChartKind::Area => {
            let mut trace = xy_trace(table, x()?, y()?, TraceKind::Area)?;
            trace.fill = Some(color.to_string());
            trace
        }
        ChartKind::Bubble => bubble_trace(table, x()?, y()?)?,
        ChartKind::Pie => pie_trace(table, x()?, y()?, 0.0)?,
        ChartKind::Donut => pie_trace(table, x()?, y()?, DONUT_HOLE)?,
        ChartKind::Waterfall => waterfall_trace(table, x()?, y()?)?,
        ChartKind::Histogram => histogram_trace(table, x()?)?,
        ChartKind::BoxPlot => box_trace(table, y()?)?,
        ChartKind::Heatmap => heatmap_trace(table, x()?, y()?)?,
        ChartKind::Scatter3D => xyz_trace(table, x()?, y()?, z()?, TraceKind::Scatter3d, false)?,
        ChartKind::Bubble3D => xyz_trace(table, x()?, y()?, z()?, TraceKind::Scatter3d, true)?,
        ChartKind::Line3D => xyz_trace(table, x()?, y()?, z()?, TraceKind::Line3d, false)?,
        ChartKind::Surface3D => surface_trace(table, x()?, y()?, z()?)?,
        other => return Err(Error::NotImplemented(other.name().to_string())),
    };

    // Bubble markers are colored by the scale, not by the trace color
    let trace = if trace.marker.colorscale.is_some() {
        trace
    } else {
        trace.with_color(Some(color.to_string()))
    };
    Ok(vec![trace])
}

fn required<'a>(name: &'a Option<String>, axis: &str) -> Result<&'a str> {
    name.as_deref()
        .ok_or_else(|| Error::MissingInput(format!("Please select a {}-Axis column.", axis)))
}

fn numeric_column<'a>(table: &'a Table, name: &str, context: &str) -> Result<&'a [Option<f64>]> {
    match table.column(name)? {
        Column::Numeric(c) => Ok(c.values()),
        Column::Text(_) => Err(Error::NonNumericColumn {
            name: name.to_string(),
            context: context.to_string(),
        }),
    }
}

/// Axis values for the given rows, numeric when the column is numeric
fn axis_values(column: &Column, rows: &[usize]) -> AxisValues {
    match column {
        Column::Numeric(c) => {
            AxisValues::Numbers(rows.iter().filter_map(|&i| c.values()[i]).collect())
        }
        Column::Text(_) => AxisValues::Categories(rows.iter().map(|&i| column.display_value(i)).collect()),
    }
}

/// Rows where none of `columns` is missing
fn complete_rows(columns: &[&Column]) -> Vec<usize> {
    let n = columns.first().map_or(0, |c| c.len());
    (0..n)
        .filter(|&i| columns.iter().all(|c| !c.is_missing(i)))
        .collect()
}

fn xy_trace(table: &Table, x: &str, y: &str, kind: TraceKind) -> Result<Trace> {
    let x_col = table.column(x)?;
    let y_col = table.column(y)?;
    let rows = complete_rows(&[x_col, y_col]);
    Ok(Trace::new(
        y,
        kind,
        axis_values(x_col, &rows),
        axis_values(y_col, &rows),
    ))
}

fn bubble_trace(table: &Table, x: &str, y: &str) -> Result<Trace> {
    let x_col = table.column(x)?;
    let y_col = table.column(y)?;
    let rows = complete_rows(&[x_col, y_col]);
    let mut trace = Trace::new(
        y,
        TraceKind::Bubble,
        axis_values(x_col, &rows),
        axis_values(y_col, &rows),
    );
    trace.marker.sizes = rows.iter().map(|&i| i as f64).collect();
    trace.marker.colorscale = Some(BUBBLE_COLORSCALE.to_string());
    Ok(trace)
}

/// Sum `values` per label, in order of first appearance
fn aggregate_by_label(table: &Table, labels: &str, values: &str) -> Result<(Vec<String>, Vec<f64>)> {
    let label_col = table.column(labels)?;
    let value_col = numeric_column(table, values, "pie and waterfall values")?;

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for (i, value) in value_col.iter().enumerate() {
        let (Some(v), false) = (value, label_col.is_missing(i)) else {
            continue;
        };
        let label = label_col.display_value(i);
        let entry = sums.entry(label.clone()).or_insert_with(|| {
            order.push(label);
            0.0
        });
        *entry += v;
    }
    let totals = order.iter().map(|l| sums[l]).collect();
    Ok((order, totals))
}

fn pie_trace(table: &Table, x: &str, y: &str, hole: f64) -> Result<Trace> {
    let (labels, values) = aggregate_by_label(table, x, y)?;
    Ok(Trace::new(
        y,
        TraceKind::Pie { hole },
        AxisValues::Categories(labels),
        AxisValues::Numbers(values),
    ))
}

fn waterfall_trace(table: &Table, x: &str, y: &str) -> Result<Trace> {
    let x_col = table.column(x)?;
    let values = numeric_column(table, y, "waterfall charts")?;
    let rows: Vec<usize> = complete_rows(&[x_col])
        .into_iter()
        .filter(|&i| values[i].is_some())
        .collect();
    Ok(Trace::new(
        y,
        TraceKind::Waterfall,
        AxisValues::Categories(rows.iter().map(|&i| x_col.display_value(i)).collect()),
        AxisValues::Numbers(rows.iter().filter_map(|&i| values[i]).collect()),
    ))
}

/// Sturges' rule: `ceil(log2(n)) + 1` bins
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Equal-width bins over `values`: (bin centers, bin width, bin index per value)
fn bin_values(values: &[f64]) -> (Vec<f64>, f64, Vec<usize>) {
    let bins = sturges_bins(values.len());
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / bins as f64 } else { 1.0 };

    let centers = (0..bins).map(|b| min + (b as f64 + 0.5) * width).collect();
    let index = values
        .iter()
        .map(|v| (((v - min) / width).floor() as usize).min(bins - 1))
        .collect();
    (centers, width, index)
}

fn histogram_trace(table: &Table, x: &str) -> Result<Trace> {
    match table.column(x)? {
        Column::Numeric(c) => {
            let values: Vec<f64> = c.present().collect();
            if values.is_empty() {
                return Ok(Trace::new(
                    x,
                    TraceKind::Histogram { bin_width: None },
                    AxisValues::Numbers(Vec::new()),
                    AxisValues::Numbers(Vec::new()),
                ));
            }
            let (centers, width, index) = bin_values(&values);
            let mut counts = vec![0.0; centers.len()];
            for b in index {
                counts[b] += 1.0;
            }
            Ok(Trace::new(
                x,
                TraceKind::Histogram {
                    bin_width: Some(width),
                },
                AxisValues::Numbers(centers),
                AxisValues::Numbers(counts),
            ))
        }
        Column::Text(c) => {
            let (labels, counts): (Vec<String>, Vec<f64>) = c
                .value_counts()
                .into_iter()
                .map(|(label, count)| (label, count as f64))
                .unzip();
            Ok(Trace::new(
                x,
                TraceKind::Histogram { bin_width: None },
                AxisValues::Categories(labels),
                AxisValues::Numbers(counts),
            ))
        }
    }
}

fn box_trace(table: &Table, y: &str) -> Result<Trace> {
    let values = numeric_column(table, y, "box plots")?;
    Ok(Trace::new(
        y,
        TraceKind::Box,
        AxisValues::Numbers(Vec::new()),
        AxisValues::Numbers(values.iter().flatten().copied().collect()),
    ))
}

/// Two-dimensional count density over Sturges bins of each axis
fn heatmap_trace(table: &Table, x: &str, y: &str) -> Result<Trace> {
    let xs = numeric_column(table, x, "heatmaps")?;
    let ys = numeric_column(table, y, "heatmaps")?;
    let (px, py): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();

    let mut trace = Trace::new(
        "density",
        TraceKind::Heatmap,
        AxisValues::Numbers(Vec::new()),
        AxisValues::Numbers(Vec::new()),
    );
    if px.is_empty() {
        trace.grid = Some(Vec::new());
        return Ok(trace);
    }

    let (x_centers, _, x_index) = bin_values(&px);
    let (y_centers, _, y_index) = bin_values(&py);
    let mut grid = vec![vec![Some(0.0); x_centers.len()]; y_centers.len()];
    for (&xi, &yi) in x_index.iter().zip(&y_index) {
        if let Some(cell) = grid[yi][xi].as_mut() {
            *cell += 1.0;
        }
    }
    trace.x = AxisValues::Numbers(x_centers);
    trace.y = AxisValues::Numbers(y_centers);
    trace.grid = Some(grid);
    Ok(trace)
}

fn xyz_points(table: &Table, x: &str, y: &str, z: &str) -> Result<(Vec<usize>, [Vec<f64>; 3])> {
    let xs = numeric_column(table, x, "3D charts")?;
    let ys = numeric_column(table, y, "3D charts")?;
    let zs = numeric_column(table, z, "3D charts")?;
    let mut rows = Vec::new();
    let mut out = [Vec::new(), Vec::new(), Vec::new()];
    for i in 0..table.row_count() {
        if let (Some(a), Some(b), Some(c)) = (xs[i], ys[i], zs[i]) {
            rows.push(i);
            out[0].push(a);
            out[1].push(b);
            out[2].push(c);
        }
    }
    Ok((rows, out))
}

fn xyz_trace(
    table: &Table,
    x: &str,
    y: &str,
    z: &str,
    kind: TraceKind,
    sized: bool,
) -> Result<Trace> {
    let (rows, [xs, ys, zs]) = xyz_points(table, x, y, z)?;
    let mut trace = Trace::new(z, kind, AxisValues::Numbers(xs), AxisValues::Numbers(ys));
    trace.z = Some(zs);
    if sized {
        trace.marker.sizes = rows.iter().map(|&i| i as f64).collect();
    }
    Ok(trace)
}

fn distinct_sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

/// Mean z over the grid of distinct x and y values; cells without data stay empty
fn surface_trace(table: &Table, x: &str, y: &str, z: &str) -> Result<Trace> {
    let (_, [xs, ys, zs]) = xyz_points(table, x, y, z)?;
    let x_levels = distinct_sorted(&xs);
    let y_levels = distinct_sorted(&ys);
    let position = |levels: &[f64], v: f64| levels.iter().position(|l| *l == v);

    let mut sums = vec![vec![(0.0, 0usize); x_levels.len()]; y_levels.len()];
    for ((&a, &b), &c) in xs.iter().zip(&ys).zip(&zs) {
        if let (Some(xi), Some(yi)) = (position(&x_levels, a), position(&y_levels, b)) {
            sums[yi][xi].0 += c;
            sums[yi][xi].1 += 1;
        }
    }
    let grid = sums
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(s, n)| if n > 0 { Some(s / n as f64) } else { None })
                .collect()
        })
        .collect();

    let mut trace = Trace::new(
        z,
        TraceKind::Surface,
        AxisValues::Numbers(x_levels),
        AxisValues::Numbers(y_levels),
    );
    trace.grid = Some(grid);
    Ok(trace)
}

fn sort_key(value: CellValue<'_>) -> (u8, f64, String) {
    match value {
        CellValue::Number(v) => (0, v, String::new()),
        CellValue::Text(s) => (1, 0.0, s.to_string()),
        CellValue::Missing => (2, 0.0, String::new()),
    }
}

fn add_overlays(
    figure: &mut Figure,
    table: &Table,
    columns: &ResolvedColumns,
    overlays: &Overlays<'_>,
) -> Result<()> {
    let (Some(x), Some(y)) = (columns.x.as_deref(), columns.y.as_deref()) else {
        return Ok(());
    };
    let x_col = table.column(x)?;

    if overlays.prediction_mode && table.has_prediction() {
        let prediction = table.column(PREDICTION_COLUMN)?;
        let mut rows = complete_rows(&[x_col, prediction]);
        rows.sort_by(|&a, &b| {
            sort_key(x_col.value(a))
                .partial_cmp(&sort_key(x_col.value(b)))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut fitted = Trace::new(
            "Fitted Prediction",
            TraceKind::Line,
            axis_values(x_col, &rows),
            axis_values(prediction, &rows),
        )
        .with_color(Some(OVERLAY_COLOR.to_string()));
        fitted.line.width = 2;
        figure.add_trace(fitted);

        if let Some(result) = overlays.forecast.filter(|r| !r.forecast.x.is_empty()) {
            let mut forecast = Trace::new(
                "Forecast",
                TraceKind::Line,
                AxisValues::Numbers(result.forecast.x.clone()),
                AxisValues::Numbers(result.forecast.y.clone()),
            )
            .with_color(Some(OVERLAY_COLOR.to_string()));
            forecast.line.dash = Dash::Dashed;
            figure.add_trace(forecast);

            if let Some(band) = &result.confidence {
                let band_x: Vec<f64> = result
                    .forecast
                    .x
                    .iter()
                    .chain(result.forecast.x.iter().rev())
                    .copied()
                    .collect();
                let band_y: Vec<f64> = band
                    .upper
                    .iter()
                    .chain(band.lower.iter().rev())
                    .copied()
                    .collect();
                let mut ci = Trace::new(
                    "95% CI",
                    TraceKind::Line,
                    AxisValues::Numbers(band_x),
                    AxisValues::Numbers(band_y),
                )
                .with_color(Some("rgba(255,255,255,0)".to_string()));
                ci.fill = Some(CONFIDENCE_FILL.to_string());
                figure.add_trace(ci);
            }
        }
    }

    if let Some(mask) = overlays.anomalies {
        let y_col = table.column(y)?;
        let rows: Vec<usize> = complete_rows(&[x_col, y_col])
            .into_iter()
            .filter(|&i| mask.get(i).copied().unwrap_or(false))
            .collect();
        if !rows.is_empty() {
            let mut anomalies = Trace::new(
                "Anomalies",
                TraceKind::Scatter,
                axis_values(x_col, &rows),
                axis_values(y_col, &rows),
            )
            .with_color(Some("black".to_string()));
            anomalies.marker.sizes = vec![10.0];
            anomalies.marker.symbol = MarkerSymbol::Cross;
            figure.add_trace(anomalies);
        }
    }

    Ok(())
}

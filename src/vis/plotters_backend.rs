//! Draw a [`Figure`] with plotters
//!
//! PNG and SVG go through the same generic drawing code; `.json` writes the
//! serialized figure instead. Each subplot is one evenly split area of the
//! root. Pie, box, heatmap and 3D panels have their own drawing paths, every
//! other trace kind shares a 2D cartesian chart.

use std::ops::Range;
use std::path::Path;

use plotters::chart::ChartContext;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{Error, Result};
use crate::vis::figure::{AxisValues, Dash, Figure, Layout, MarkerSymbol, Trace, TraceKind};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Render `figure` to `path`; the extension picks PNG, SVG or JSON
pub fn render_figure<P: AsRef<Path>>(figure: &Figure, path: P) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let size = (
        figure.layout.width.unwrap_or(DEFAULT_WIDTH),
        figure.layout.height.unwrap_or(DEFAULT_HEIGHT),
    );

    match extension.as_str() {
        "png" => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_figure(&root, figure)?;
            root.present()?;
        }
        "svg" => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_figure(&root, figure)?;
            root.present()?;
        }
        "json" => std::fs::write(path, figure.to_json()?)?,
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "figure output '.{}' (expected png, svg or json)",
                other
            )))
        }
    }

    log::info!("figure '{}' written to {}", figure.layout.title, path.display());
    Ok(())
}

/// Parse `#rgb`, `#rrggbb`, `rgba(r,g,b,a)` or a basic color name
pub fn parse_color(value: &str) -> RGBAColor {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        let expanded: String = if hex.len() == 3 {
            hex.chars().flat_map(|c| [c, c]).collect()
        } else {
            hex.to_string()
        };
        if expanded.len() == 6 {
            let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).unwrap_or(0);
            return RGBAColor(channel(0), channel(2), channel(4), 1.0);
        }
    }
    if let Some(inner) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|s| s.strip_suffix(')'))
    {
        let parts: Vec<f64> = inner
            .split(',')
            .filter_map(|p| p.trim().parse::<f64>().ok())
            .collect();
        if parts.len() >= 3 {
            let alpha = parts.get(3).copied().unwrap_or(1.0);
            return RGBAColor(parts[0] as u8, parts[1] as u8, parts[2] as u8, alpha);
        }
    }
    let (r, g, b) = match value.as_str() {
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gray" | "grey" => (128, 128, 128),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "olive" => (128, 128, 0),
        "maroon" => (128, 0, 0),
        "lime" => (0, 255, 0),
        "silver" => (192, 192, 192),
        "gold" => (255, 215, 0),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        _ => (0, 0, 0),
    };
    RGBAColor(r, g, b, 1.0)
}

fn viridis(t: f64) -> RGBAColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let f = scaled - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    RGBAColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2), 1.0)
}

fn trace_color(trace: &Trace, layout: &Layout, index: usize) -> RGBAColor {
    let fallback = layout
        .palette
        .get(index % layout.palette.len().max(1))
        .map(String::as_str)
        .unwrap_or("#636EFA");
    parse_color(
        trace
            .line
            .color
            .as_deref()
            .or(trace.marker.color.as_deref())
            .unwrap_or(fallback),
    )
}

fn text_style<'a>(layout: &'a Layout, size_delta: i32) -> TextStyle<'a> {
    let size = (layout.font.size as i32 + size_delta).max(6) as f64;
    FontDesc::new(FontFamily::Name(&layout.font.family), size, FontStyle::Normal)
        .color(&parse_color(&layout.font.color))
}

/// Data range padded by 5% on each side
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() {
        return 0.0..1.0;
    }
    if max == min {
        return (min - 1.0)..(max + 1.0);
    }
    let margin = (max - min) * 0.05;
    (min - margin)..(max + margin)
}

/// How one axis of a 2D panel maps values to coordinates
enum AxisScale {
    Numeric,
    Categorical(Vec<String>),
}

impl AxisScale {
    fn for_values<'t>(values: impl Iterator<Item = &'t AxisValues>) -> Self {
        let mut labels: Vec<String> = Vec::new();
        let mut categorical = false;
        for v in values {
            if let AxisValues::Categories(items) = v {
                categorical = true;
                for item in items {
                    if !labels.contains(item) {
                        labels.push(item.clone());
                    }
                }
            }
        }
        if categorical {
            AxisScale::Categorical(labels)
        } else {
            AxisScale::Numeric
        }
    }

    fn coords(&self, values: &AxisValues) -> Vec<Option<f64>> {
        match (self, values) {
            (AxisScale::Numeric, AxisValues::Numbers(v)) => v.iter().map(|x| Some(*x)).collect(),
            (AxisScale::Numeric, AxisValues::Categories(v)) => {
                v.iter().map(|s| s.parse::<f64>().ok()).collect()
            }
            (AxisScale::Categorical(labels), values) => values
                .labels()
                .iter()
                .map(|l| labels.iter().position(|c| c == l).map(|i| i as f64))
                .collect(),
        }
    }

    fn label(&self, coord: f64) -> String {
        match self {
            AxisScale::Numeric => format!("{:.1}", coord),
            AxisScale::Categorical(labels) => {
                let rounded = coord.round();
                if (coord - rounded).abs() < 1e-6 && rounded >= 0.0 {
                    labels.get(rounded as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            }
        }
    }
}

fn points(trace: &Trace, x_scale: &AxisScale, y_scale: &AxisScale) -> Vec<(f64, f64)> {
    x_scale
        .coords(&trace.x)
        .into_iter()
        .zip(y_scale.coords(&trace.y))
        .filter_map(|(x, y)| Some((x?, y?)))
        .collect()
}

fn bar_width(trace: &Trace, xs: &[f64], categorical: bool) -> f64 {
    if let TraceKind::Histogram {
        bin_width: Some(width),
    } = trace.kind
    {
        return width;
    }
    if categorical {
        return 0.8;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let gap = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|g| *g > 0.0)
        .fold(f64::INFINITY, f64::min);
    if gap.is_finite() {
        gap * 0.8
    } else {
        0.8
    }
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let layout = &figure.layout;
    root.fill(&parse_color(&layout.background))?;

    let title_style = FontDesc::new(
        FontFamily::Name(&layout.title_font.family),
        layout.title_font.size as f64,
        FontStyle::Normal,
    )
    .color(&parse_color(&layout.title_font.color));
    let body = root.titled(&layout.title, title_style)?;

    let (rows, cols) = (layout.grid.0.max(1), layout.grid.1.max(1));
    let panels = body.split_evenly((rows, cols));
    let mut color_index = 0;
    for (i, panel) in panels.iter().enumerate() {
        let subplot = (i / cols, i % cols);
        let traces: Vec<&Trace> = figure.traces_in(subplot).collect();
        let caption = layout.subplot_titles.get(i).map(String::as_str);

        for annotation in figure.annotations.iter().filter(|a| a.subplot == subplot) {
            let (w, h) = panel.dim_in_pixel();
            let style = text_style(layout, 0);
            let x = (w as i32 / 2 - annotation.text.len() as i32 * 3).max(0);
            panel.draw_text(&annotation.text, &style, (x, h as i32 / 2))?;
        }
        if traces.is_empty() {
            continue;
        }

        match &traces[0].kind {
            TraceKind::Pie { hole } => draw_pie(panel, layout, traces[0], *hole, caption)?,
            TraceKind::Box => draw_box(panel, layout, &traces, caption, color_index)?,
            TraceKind::Heatmap => draw_heatmap(panel, layout, traces[0], caption, color_index)?,
            TraceKind::Scatter3d | TraceKind::Line3d | TraceKind::Surface => {
                draw_3d(panel, layout, &traces, caption, color_index)?
            }
            _ => draw_cartesian(panel, layout, &traces, caption, color_index)?,
        }
        color_index += traces.len();
    }
    Ok(())
}

fn chart_builder<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    layout: &'b Layout,
    caption: Option<&'b str>,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .margin_left((layout.margin.left / 4) as i32)
        .margin_right((layout.margin.right / 4) as i32)
        .margin_top((layout.margin.top / 6) as i32)
        .margin_bottom((layout.margin.bottom / 6) as i32)
        .x_label_area_size(40)
        .y_label_area_size(50);
    if let Some(caption) = caption {
        builder.caption(caption, text_style(layout, 2));
    }
    builder
}

fn draw_cartesian<DB>(
    area: &DrawingArea<DB, Shift>,
    layout: &Layout,
    traces: &[&Trace],
    caption: Option<&str>,
    color_offset: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_scale = AxisScale::for_values(traces.iter().map(|t| &t.x));
    let y_scale = AxisScale::for_values(traces.iter().map(|t| &t.y));

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut needs_zero = false;
    for trace in traces {
        let pts = points(trace, &x_scale, &y_scale);
        match trace.kind {
            TraceKind::Waterfall => {
                let mut total = 0.0;
                for (_, y) in &pts {
                    total += y;
                    ys.push(total);
                }
                needs_zero = true;
            }
            TraceKind::Bar | TraceKind::Area | TraceKind::Histogram { .. } => {
                let width = bar_width(trace, &pts.iter().map(|p| p.0).collect::<Vec<_>>(), false);
                xs.extend(pts.iter().flat_map(|p| [p.0 - width / 2.0, p.0 + width / 2.0]));
                ys.extend(pts.iter().map(|p| p.1));
                needs_zero = true;
                continue;
            }
            _ => ys.extend(pts.iter().map(|p| p.1)),
        }
        xs.extend(pts.iter().map(|p| p.0));
    }
    if needs_zero {
        ys.push(0.0);
    }
    let x_range = match &x_scale {
        AxisScale::Categorical(labels) => -0.5..(labels.len().max(1) as f64 - 0.5),
        AxisScale::Numeric => padded_range(xs.into_iter()),
    };
    let y_range = padded_range(ys.into_iter());

    let mut chart = chart_builder(area, layout, caption).build_cartesian_2d(x_range, y_range)?;

    let x_fmt = |v: &f64| x_scale.label(*v);
    let y_fmt = |v: &f64| y_scale.label(*v);
    let axis_color = parse_color(&layout.font.color);
    chart
        .configure_mesh()
        .x_desc(layout.x_title.clone().unwrap_or_default())
        .y_desc(layout.y_title.clone().unwrap_or_default())
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .axis_desc_style(text_style(layout, 0))
        .label_style(text_style(layout, -2))
        .axis_style(axis_color)
        .draw()?;

    let categorical_x = matches!(x_scale, AxisScale::Categorical(_));
    for (i, trace) in traces.iter().enumerate() {
        let color = trace_color(trace, layout, color_offset + i);
        let pts = points(trace, &x_scale, &y_scale);
        draw_trace_2d(&mut chart, trace, &pts, color, categorical_x)?;
    }

    if traces.iter().any(|t| t.show_legend) {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(text_style(layout, -2))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }
    Ok(())
}

fn draw_trace_2d<DB>(
    chart: &mut Chart2d<'_, DB>,
    trace: &Trace,
    pts: &[(f64, f64)],
    color: RGBAColor,
    categorical_x: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let stroke = color.stroke_width(trace.line.width.max(1));
    let marker_size = trace.marker.sizes.first().map_or(4, |s| *s as i32);
    let name = trace.name.clone();

    let anno = match &trace.kind {
        TraceKind::Scatter if trace.marker.symbol == MarkerSymbol::Cross => chart.draw_series(
            pts.iter()
                .map(|&p| Cross::new(p, marker_size / 2, color.stroke_width(2))),
        )?,
        TraceKind::Scatter => {
            chart.draw_series(pts.iter().map(|&p| Circle::new(p, 3, color.filled())))?
        }
        TraceKind::Bubble => {
            let max = trace.marker.sizes.iter().cloned().fold(0.0, f64::max).max(1.0);
            chart.draw_series(pts.iter().enumerate().map(|(j, &p)| {
                let s = trace.marker.sizes.get(j).copied().unwrap_or(0.0) / max;
                Circle::new(p, (4.0 + 16.0 * s) as i32, viridis(s).mix(0.8).filled())
            }))?
        }
        TraceKind::Line if trace.fill.is_some() => {
            let fill = parse_color(trace.fill.as_deref().unwrap_or_default());
            chart.draw_series(std::iter::once(Polygon::new(pts.to_vec(), fill.filled())))?
        }
        TraceKind::Line if trace.line.dash == Dash::Dashed => {
            chart.draw_series(DashedLineSeries::new(pts.iter().copied(), 8, 6, stroke))?
        }
        TraceKind::Line => chart.draw_series(LineSeries::new(pts.iter().copied(), stroke))?,
        TraceKind::Area => {
            let fill = trace.fill.as_deref().map_or(color, parse_color);
            chart.draw_series(
                AreaSeries::new(pts.iter().copied(), 0.0, fill.mix(0.3)).border_style(stroke),
            )?
        }
        TraceKind::Bar | TraceKind::Histogram { .. } => {
            let xs: Vec<f64> = pts.iter().map(|p| p.0).collect();
            let half = bar_width(trace, &xs, categorical_x) / 2.0;
            chart.draw_series(
                pts.iter()
                    .map(|&(x, y)| Rectangle::new([(x - half, 0.0), (x + half, y)], color.filled())),
            )?
        }
        TraceKind::Waterfall => {
            let mut total = 0.0;
            let bars: Vec<Rectangle<(f64, f64)>> = pts
                .iter()
                .map(|&(x, y)| {
                    let start = total;
                    total += y;
                    let fill = if y >= 0.0 {
                        RGBAColor(0, 160, 90, 1.0)
                    } else {
                        RGBAColor(220, 50, 50, 1.0)
                    };
                    Rectangle::new([(x - 0.4, start), (x + 0.4, total)], fill.filled())
                })
                .collect();
            chart.draw_series(bars)?
        }
        _ => return Ok(()),
    };

    if trace.show_legend {
        anno.label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke));
    }
    Ok(())
}

fn draw_pie<DB>(
    area: &DrawingArea<DB, Shift>,
    layout: &Layout,
    trace: &Trace,
    hole: f64,
    caption: Option<&str>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let titled;
    let area = match caption {
        Some(c) => {
            titled = area.titled(c, text_style(layout, 2))?;
            &titled
        }
        None => area,
    };
    let labels = trace.x.labels();
    let values: Vec<f64> = trace
        .y
        .as_numbers()
        .map(|v| v.iter().map(|x| x.max(0.0)).collect())
        .unwrap_or_default();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Ok(());
    }

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64) * 0.38;
    let style = text_style(layout, -2);

    let mut start = -std::f64::consts::FRAC_PI_2;
    for (i, (label, value)) in labels.iter().zip(&values).enumerate() {
        let sweep = value / total * std::f64::consts::TAU;
        let steps = ((sweep / 0.05).ceil() as usize).max(2);
        let mut outline = vec![center];
        for s in 0..=steps {
            let angle = start + sweep * s as f64 / steps as f64;
            outline.push((
                center.0 + (radius * angle.cos()) as i32,
                center.1 + (radius * angle.sin()) as i32,
            ));
        }
        let color = parse_color(
            layout
                .palette
                .get(i % layout.palette.len().max(1))
                .map_or("#636EFA", String::as_str),
        );
        area.draw(&Polygon::new(outline, color.filled()))?;

        let mid = start + sweep / 2.0;
        let anchor = (
            center.0 + (radius * 1.1 * mid.cos()) as i32,
            center.1 + (radius * 1.1 * mid.sin()) as i32,
        );
        let text = format!("{} ({:.1}%)", label, value / total * 100.0);
        area.draw_text(&text, &style, anchor)?;
        start += sweep;
    }

    if hole > 0.0 {
        let background = parse_color(&layout.background);
        area.draw(&Circle::new(
            center,
            (radius * hole) as i32,
            background.filled(),
        ))?;
    }
    Ok(())
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn draw_box<DB>(
    area: &DrawingArea<DB, Shift>,
    layout: &Layout,
    traces: &[&Trace],
    caption: Option<&str>,
    color_offset: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let all: Vec<f64> = traces
        .iter()
        .filter_map(|t| t.y.as_numbers())
        .flatten()
        .copied()
        .collect();
    let mut chart = chart_builder(area, layout, caption)
        .build_cartesian_2d(-0.5..(traces.len() as f64 - 0.5), padded_range(all.into_iter()))?;
    let names: Vec<String> = traces.iter().map(|t| t.name.clone()).collect();
    let x_fmt = |v: &f64| {
        let r = v.round();
        if (v - r).abs() < 1e-6 && r >= 0.0 {
            names.get(r as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .x_label_formatter(&x_fmt)
        .y_desc(layout.y_title.clone().unwrap_or_default())
        .axis_desc_style(text_style(layout, 0))
        .label_style(text_style(layout, -2))
        .draw()?;

    for (i, trace) in traces.iter().enumerate() {
        let mut values: Vec<f64> = trace.y.as_numbers().unwrap_or_default().to_vec();
        if values.is_empty() {
            continue;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let (q1, median, q3) = (
            quantile(&values, 0.25),
            quantile(&values, 0.5),
            quantile(&values, 0.75),
        );
        let iqr = q3 - q1;
        let low = values
            .iter()
            .copied()
            .find(|v| *v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let high = values
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);

        let x = i as f64;
        let color = trace_color(trace, layout, color_offset + i);
        let stroke = color.stroke_width(2);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - 0.25, q1), (x + 0.25, q3)],
            color.mix(0.4).filled(),
        )))?;
        chart.draw_series(
            [
                vec![(x - 0.25, median), (x + 0.25, median)],
                vec![(x, q3), (x, high)],
                vec![(x, q1), (x, low)],
                vec![(x - 0.1, high), (x + 0.1, high)],
                vec![(x - 0.1, low), (x + 0.1, low)],
            ]
            .into_iter()
            .map(|segment| PathElement::new(segment, stroke)),
        )?;
        chart.draw_series(
            values
                .iter()
                .filter(|v| **v < low || **v > high)
                .map(|&v| Circle::new((x, v), 3, color.filled())),
        )?;
    }
    Ok(())
}

fn draw_heatmap<DB>(
    area: &DrawingArea<DB, Shift>,
    layout: &Layout,
    trace: &Trace,
    caption: Option<&str>,
    color_index: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let xs = trace.x.as_numbers().unwrap_or_default();
    let ys = trace.y.as_numbers().unwrap_or_default();
    let grid = trace.grid.as_deref().unwrap_or_default();
    let half_w = if xs.len() > 1 { (xs[1] - xs[0]) / 2.0 } else { 0.5 };
    let half_h = if ys.len() > 1 { (ys[1] - ys[0]) / 2.0 } else { 0.5 };

    let x_range = padded_range(xs.iter().flat_map(|x| [x - half_w, x + half_w]));
    let y_range = padded_range(ys.iter().flat_map(|y| [y - half_h, y + half_h]));
    let mut chart = chart_builder(area, layout, caption).build_cartesian_2d(x_range, y_range)?;
    chart
        .configure_mesh()
        .x_desc(layout.x_title.clone().unwrap_or_default())
        .y_desc(layout.y_title.clone().unwrap_or_default())
        .axis_desc_style(text_style(layout, 0))
        .label_style(text_style(layout, -2))
        .draw()?;

    let max = grid
        .iter()
        .flatten()
        .flatten()
        .cloned()
        .fold(0.0, f64::max)
        .max(1.0);
    let base = trace_color(trace, layout, color_index);
    let mut cells = Vec::new();
    for (yi, row) in grid.iter().enumerate() {
        for (xi, cell) in row.iter().enumerate() {
            if let (Some(v), Some(&x), Some(&y)) = (cell, xs.get(xi), ys.get(yi)) {
                cells.push(Rectangle::new(
                    [(x - half_w, y - half_h), (x + half_w, y + half_h)],
                    base.mix(0.1 + 0.9 * v / max).filled(),
                ));
            }
        }
    }
    chart.draw_series(cells)?;
    Ok(())
}

fn draw_3d<DB>(
    area: &DrawingArea<DB, Shift>,
    layout: &Layout,
    traces: &[&Trace],
    caption: Option<&str>,
    color_offset: usize,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    // Plot space is (x, value, y) so that the value axis is vertical
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut vs = Vec::new();
    for trace in traces {
        xs.extend_from_slice(trace.x.as_numbers().unwrap_or_default());
        ys.extend_from_slice(trace.y.as_numbers().unwrap_or_default());
        if let Some(z) = &trace.z {
            vs.extend_from_slice(z);
        }
        if let Some(grid) = &trace.grid {
            vs.extend(grid.iter().flatten().flatten().copied());
        }
    }

    let mut chart = chart_builder(area, layout, caption).build_cartesian_3d(
        padded_range(xs.into_iter()),
        padded_range(vs.into_iter()),
        padded_range(ys.into_iter()),
    )?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.5;
        pb.scale = 0.9;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .label_style(text_style(layout, -2))
        .draw()?;

    for (i, trace) in traces.iter().enumerate() {
        let color = trace_color(trace, layout, color_offset + i);
        let xs = trace.x.as_numbers().unwrap_or_default();
        let ys = trace.y.as_numbers().unwrap_or_default();
        match trace.kind {
            TraceKind::Surface => {
                let grid = trace.grid.as_deref().unwrap_or_default();
                let mut quads = Vec::new();
                for yi in 0..grid.len().saturating_sub(1) {
                    for xi in 0..grid[yi].len().saturating_sub(1) {
                        let corners = (
                            grid[yi][xi],
                            grid[yi][xi + 1],
                            grid[yi + 1].get(xi + 1).copied().flatten(),
                            grid[yi + 1].get(xi).copied().flatten(),
                        );
                        if let (Some(a), Some(b), Some(c), Some(d)) = corners {
                            quads.push(Polygon::new(
                                vec![
                                    (xs[xi], a, ys[yi]),
                                    (xs[xi + 1], b, ys[yi]),
                                    (xs[xi + 1], c, ys[yi + 1]),
                                    (xs[xi], d, ys[yi + 1]),
                                ],
                                color.mix(0.6).filled(),
                            ));
                        }
                    }
                }
                chart.draw_series(quads)?;
            }
            TraceKind::Line3d => {
                let zs = trace.z.as_deref().unwrap_or_default();
                let path: Vec<(f64, f64, f64)> = xs
                    .iter()
                    .zip(ys)
                    .zip(zs)
                    .map(|((&x, &y), &z)| (x, z, y))
                    .collect();
                chart.draw_series(LineSeries::new(path, color.stroke_width(2)))?;
            }
            _ => {
                let zs = trace.z.as_deref().unwrap_or_default();
                let max = trace.marker.sizes.iter().cloned().fold(0.0, f64::max).max(1.0);
                chart.draw_series(xs.iter().zip(ys).zip(zs).enumerate().map(
                    |(j, ((&x, &y), &z))| {
                        let size = trace
                            .marker
                            .sizes
                            .get(j)
                            .map_or(3, |s| (3.0 + 12.0 * s / max) as i32);
                        Circle::new((x, z, y), size, color.filled())
                    },
                ))?;
            }
        }
    }
    Ok(())
}

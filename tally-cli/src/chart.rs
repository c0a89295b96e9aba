//! Bar and pie charts of spend by category, written as SVG.

use anyhow::{Context, Result};
use std::f64::consts::PI;
use std::path::Path;
use svg::Document;
use svg::node::element::{Circle, Line, Path as SvgPath, Rectangle, Text};
use tally_core::CategorySummary;
use tracing::debug;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 500.0;
const MARGIN: f64 = 60.0;
/// Pie slices start here, counter-clockwise, in degrees
const START_ANGLE: f64 = 140.0;
const BAR_COLOR: &str = "skyblue";

const COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

fn text(x: f64, y: f64, content: impl Into<String>) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("font-family", "sans-serif")
        .set("font-size", 13)
        .add(svg::node::Text::new(content))
}

fn canvas(title: &str) -> Document {
    Document::new()
        .set("viewBox", (0.0, 0.0, WIDTH, HEIGHT))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .add(
            text(WIDTH / 2.0, MARGIN / 2.0, title)
                .set("text-anchor", "middle")
                .set("font-size", 18),
        )
}

/// Vertical bars, one per category in label order. `None` when there is
/// nothing to draw.
pub fn bar_document(summary: &CategorySummary, title: &str) -> Option<Document> {
    if summary.is_empty() {
        return None;
    }

    let max = summary.iter().map(|(_, v)| v).fold(0.0_f64, f64::max);
    let scale_max = if max > 0.0 { max } else { 1.0 };
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let slot = plot_w / summary.len() as f64;
    let baseline = HEIGHT - MARGIN;

    let mut doc = canvas(title)
        .add(
            Line::new()
                .set("x1", MARGIN)
                .set("x2", MARGIN)
                .set("y1", MARGIN)
                .set("y2", baseline)
                .set("stroke", "black"),
        )
        .add(
            Line::new()
                .set("x1", MARGIN)
                .set("x2", WIDTH - MARGIN)
                .set("y1", baseline)
                .set("y2", baseline)
                .set("stroke", "black"),
        )
        .add(
            text(MARGIN / 3.0, HEIGHT / 2.0, "Amount")
                .set("text-anchor", "middle")
                .set("transform", format!("rotate(-90 {} {})", MARGIN / 3.0, HEIGHT / 2.0)),
        );

    for (i, (label, total)) in summary.iter().enumerate() {
        let h = total.max(0.0) / scale_max * plot_h;
        let x = MARGIN + i as f64 * slot + slot * 0.15;
        let w = slot * 0.7;
        let center = x + w / 2.0;
        doc = doc
            .add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", baseline - h)
                    .set("width", w)
                    .set("height", h)
                    .set("fill", BAR_COLOR),
            )
            .add(text(center, baseline - h - 6.0, format!("{total:.2}")).set("text-anchor", "middle"))
            .add(text(center, baseline + 18.0, label).set("text-anchor", "middle"));
    }

    Some(doc)
}

fn polar(cx: f64, cy: f64, r: f64, deg: f64) -> (f64, f64) {
    let rad = deg * PI / 180.0;
    // screen y grows downward
    (cx + r * rad.cos(), cy - r * rad.sin())
}

/// Pie of percentage share per category, labelled `12.3%`. `None` when
/// there is nothing to draw.
pub fn pie_document(summary: &CategorySummary, title: &str) -> Option<Document> {
    let shares = summary.shares();
    if shares.is_empty() {
        return None;
    }

    let cx = WIDTH / 2.0;
    let cy = HEIGHT / 2.0 + MARGIN / 4.0;
    let r = (HEIGHT - 2.0 * MARGIN) / 2.0;

    let mut doc = canvas(title);
    let mut start = START_ANGLE;
    for (i, (label, pct)) in shares.iter().enumerate() {
        let sweep = pct / 100.0 * 360.0;
        let end = start + sweep;
        let color = COLORS[i % COLORS.len()];

        if sweep >= 359.999 {
            doc = doc.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", r)
                    .set("fill", color),
            );
        } else if sweep > 0.0 {
            let (x0, y0) = polar(cx, cy, r, start);
            let (x1, y1) = polar(cx, cy, r, end);
            let large = if sweep > 180.0 { 1 } else { 0 };
            let d = format!("M {cx} {cy} L {x0} {y0} A {r} {r} 0 {large} 0 {x1} {y1} Z");
            doc = doc.add(
                SvgPath::new()
                    .set("d", d)
                    .set("fill", color)
                    .set("stroke", "white"),
            );
        }

        let mid = start + sweep / 2.0;
        let (px, py) = polar(cx, cy, r * 0.6, mid);
        let (lx, ly) = polar(cx, cy, r * 1.12, mid);
        let anchor = if lx < cx { "end" } else { "start" };
        doc = doc
            .add(text(px, py, format!("{pct:.1}%")).set("text-anchor", "middle"))
            .add(text(lx, ly, *label).set("text-anchor", anchor));

        start = end;
    }

    Some(doc)
}

fn save(doc: Option<Document>, path: &Path) -> Result<bool> {
    let Some(doc) = doc else {
        debug!(path = %path.display(), "empty summary, no chart written");
        return Ok(false);
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    svg::save(path, &doc).with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}

/// Write a bar chart to `path`; `false` if the summary was empty
pub fn render_bar(summary: &CategorySummary, title: &str, path: &Path) -> Result<bool> {
    save(bar_document(summary, title), path)
}

/// Write a pie chart to `path`; `false` if the summary was empty
pub fn render_pie(summary: &CategorySummary, title: &str, path: &Path) -> Result<bool> {
    save(pie_document(summary, title), path)
}

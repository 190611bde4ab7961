//! Static SVG charts for the report pages.
//!
//! Charts are emitted as finished markup with no entry animation, so a print
//! snapshot taken the moment the page settles shows the final bars and
//! segments.

use std::fmt::Write;

use serde::Serialize;

use folio_core::models::report::{DemandSegment, PricePoint};

/// Segment colors for the demand ring, cycled by index.
pub const PALETTE: [&str; 5] = ["#8EB8B5", "#BDBAB5", "#6A908D", "#E5E7EB", "#4B5563"];

const AXIS_COLOR: &str = "#6B7280";
const GRID_COLOR: &str = "#E5E7EB";

const BAR_WIDTH: f64 = 600.0;
const BAR_HEIGHT: f64 = 256.0;
const BAR_MARGIN_LEFT: f64 = 48.0;
const BAR_MARGIN_RIGHT: f64 = 16.0;
const BAR_MARGIN_TOP: f64 = 16.0;
const BAR_MARGIN_BOTTOM: f64 = 32.0;
const BAR_RADIUS: f64 = 6.0;
const GRID_LINES: usize = 4;

const RING_SIZE: f64 = 300.0;
const RING_INNER: f64 = 70.0;
const RING_OUTER: f64 = 105.0;
const RING_PADDING_DEG: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: &'static str,
}

/// Palette color for the segment at `index`.
pub fn segment_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

pub fn legend(segments: &[DemandSegment]) -> Vec<LegendEntry> {
    segments
        .iter()
        .enumerate()
        .map(|(i, s)| LegendEntry {
            label: s.label.clone(),
            color: segment_color(i),
        })
        .collect()
}

/// Price-trend bar chart filled with a vertical gradient of `brand_color`.
pub fn price_bar_chart(points: &[PricePoint], brand_color: &str) -> String {
    let plot_w = BAR_WIDTH - BAR_MARGIN_LEFT - BAR_MARGIN_RIGHT;
    let plot_h = BAR_HEIGHT - BAR_MARGIN_TOP - BAR_MARGIN_BOTTOM;
    let baseline = BAR_MARGIN_TOP + plot_h;

    let max = points.iter().map(|p| p.price).fold(0.0_f64, f64::max);
    let top = nice_ceiling(max);
    let color = escape(brand_color);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {BAR_WIDTH} {BAR_HEIGHT}" role="img" aria-label="Price trend">"#
    );
    let _ = write!(
        svg,
        r#"<defs><linearGradient id="priceGradient" x1="0" y1="0" x2="0" y2="1"><stop offset="5%" stop-color="{color}" stop-opacity="0.9"/><stop offset="95%" stop-color="{color}" stop-opacity="0.4"/></linearGradient></defs>"#
    );

    for i in 0..=GRID_LINES {
        let value = top * i as f64 / GRID_LINES as f64;
        let y = baseline - plot_h * i as f64 / GRID_LINES as f64;
        let _ = write!(
            svg,
            r#"<line x1="{BAR_MARGIN_LEFT}" y1="{y:.2}" x2="{x2}" y2="{y:.2}" stroke="{GRID_COLOR}" stroke-dasharray="3 3"/>"#,
            x2 = BAR_WIDTH - BAR_MARGIN_RIGHT,
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{ty:.2}" text-anchor="end" font-size="12" fill="{AXIS_COLOR}">{label}</text>"#,
            x = BAR_MARGIN_LEFT - 8.0,
            ty = y + 4.0,
            label = format_number(value),
        );
    }

    if !points.is_empty() {
        let slot = plot_w / points.len() as f64;
        let bar_w = slot * 0.6;
        for (i, point) in points.iter().enumerate() {
            let x = BAR_MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
            let h = (point.price.max(0.0) / top) * plot_h;
            if h > 0.0 {
                let _ = write!(
                    svg,
                    r#"<path d="{d}" fill="url(#priceGradient)"/>"#,
                    d = rounded_top_bar(x, baseline - h, bar_w, h),
                );
            }
            let _ = write!(
                svg,
                r#"<text x="{cx:.2}" y="{ly:.2}" text-anchor="middle" font-size="12" fill="{AXIS_COLOR}">{label}</text>"#,
                cx = x + bar_w / 2.0,
                ly = baseline + 20.0,
                label = escape(&point.label),
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Demand ring chart, one segment per entry in palette order.
pub fn demand_ring_chart(segments: &[DemandSegment]) -> String {
    let c = RING_SIZE / 2.0;
    let total: f64 = segments.iter().map(|s| s.value.max(0.0)).sum();

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {RING_SIZE} {RING_SIZE}" role="img" aria-label="Demand by segment">"#
    );

    let visible: Vec<(usize, f64)> = segments
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.value.max(0.0)))
        .filter(|(_, v)| *v > 0.0)
        .collect();

    match visible.as_slice() {
        [] => {
            let _ = write!(svg, "{}", full_ring(c, GRID_COLOR));
        }
        [(i, _)] => {
            let _ = write!(svg, "{}", full_ring(c, segment_color(*i)));
        }
        many => {
            let available = 360.0 - RING_PADDING_DEG * many.len() as f64;
            let mut start = 0.0;
            for (i, value) in many {
                let sweep = available * value / total;
                let _ = write!(
                    svg,
                    r#"<path d="{d}" fill="{fill}"/>"#,
                    d = annular_sector(c, start, start + sweep),
                    fill = segment_color(*i),
                );
                start += sweep + RING_PADDING_DEG;
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn full_ring(c: f64, color: &str) -> String {
    format!(
        r#"<circle cx="{c}" cy="{c}" r="{r}" fill="none" stroke="{color}" stroke-width="{w}"/>"#,
        r = (RING_INNER + RING_OUTER) / 2.0,
        w = RING_OUTER - RING_INNER,
    )
}

/// Ring slice between `from` and `to` degrees, clockwise from twelve o'clock.
fn annular_sector(c: f64, from: f64, to: f64) -> String {
    let large = if to - from > 180.0 { 1 } else { 0 };
    let (ox0, oy0) = polar(c, RING_OUTER, from);
    let (ox1, oy1) = polar(c, RING_OUTER, to);
    let (ix1, iy1) = polar(c, RING_INNER, to);
    let (ix0, iy0) = polar(c, RING_INNER, from);
    format!(
        "M{ox0:.2} {oy0:.2} A{RING_OUTER} {RING_OUTER} 0 {large} 1 {ox1:.2} {oy1:.2} \
         L{ix1:.2} {iy1:.2} A{RING_INNER} {RING_INNER} 0 {large} 0 {ix0:.2} {iy0:.2} Z"
    )
}

fn polar(c: f64, r: f64, deg: f64) -> (f64, f64) {
    let rad = deg.to_radians();
    (c + r * rad.sin(), c - r * rad.cos())
}

fn rounded_top_bar(x: f64, y: f64, w: f64, h: f64) -> String {
    let r = BAR_RADIUS.min(w / 2.0).min(h);
    format!(
        "M{x:.2} {bottom:.2} V{ry:.2} Q{x:.2} {y:.2} {rx:.2} {y:.2} H{rx2:.2} Q{right:.2} {y:.2} {right:.2} {ry:.2} V{bottom:.2} Z",
        bottom = y + h,
        ry = y + r,
        rx = x + r,
        rx2 = x + w - r,
        right = x + w,
    )
}

/// Smallest of 1, 2, 2.5, 5, 10 times a power of ten at or above `v`.
fn nice_ceiling(v: f64) -> f64 {
    if !v.is_finite() || v <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(v.log10().floor());
    let normalized = v / magnitude;
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|s| normalized <= *s)
        .unwrap_or(10.0);
    step * magnitude
}

fn format_number(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{v:.1}")
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

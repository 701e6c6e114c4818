//! Inline SVG chart rendering.
//!
//! Charts are emitted as self-contained `<svg>` markup that templates embed
//! directly, so the dashboard needs no client-side charting library.

use std::fmt::Write;

/// Colours cycled through pie slices.
pub const PIE_COLORS: [&str; 5] = ["#8884d8", "#82ca9d", "#ffc658", "#ff7f50", "#00C49F"];

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 300.0;
const LEFT: f64 = 64.0;
const RIGHT: f64 = 16.0;
const TOP: f64 = 16.0;
const BOTTOM: f64 = 48.0;
const TICKS: u32 = 4;

/// A labelled value on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub label: String,
    pub value: f64,
}

impl Datum {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Line chart with value axis, grid and point markers.
#[must_use]
pub fn line_chart(title: &str, data: &[Datum], stroke: &str) -> String {
    if data.is_empty() {
        return empty_chart(title);
    }
    let frame = Frame::new(data);
    let mut svg = open(title);
    frame.grid(&mut svg);

    let points: Vec<(f64, f64)> = data
        .iter()
        .enumerate()
        .map(|(i, d)| (frame.slot_center(i), frame.y(d.value)))
        .collect();
    let path: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    let _ = write!(
        svg,
        r#"<polyline fill="none" stroke="{stroke}" stroke-width="2" points="{}"/>"#,
        path.join(" ")
    );
    for ((x, y), d) in points.iter().zip(data) {
        let _ = write!(
            svg,
            r#"<circle cx="{x:.1}" cy="{y:.1}" r="3.5" fill="{stroke}"><title>{}: {}</title></circle>"#,
            escape(&d.label),
            format_value(d.value)
        );
    }
    frame.x_labels(&mut svg, data);
    svg.push_str("</svg>");
    svg
}

/// Vertical bar chart.
#[must_use]
pub fn bar_chart(title: &str, data: &[Datum], fill: &str) -> String {
    if data.is_empty() {
        return empty_chart(title);
    }
    let frame = Frame::new(data);
    let mut svg = open(title);
    frame.grid(&mut svg);

    let bar_width = (frame.slot_width() * 0.6).max(1.0);
    for (i, d) in data.iter().enumerate() {
        let x = frame.slot_center(i) - bar_width / 2.0;
        let y = frame.y(d.value);
        let height = (HEIGHT - BOTTOM - y).max(0.0);
        let _ = write!(
            svg,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{fill}"><title>{}: {}</title></rect>"#,
            escape(&d.label),
            format_value(d.value)
        );
    }
    frame.x_labels(&mut svg, data);
    svg.push_str("</svg>");
    svg
}

/// Horizontal bar chart (top-selling products), one row per datum.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn horizontal_bar_chart(title: &str, data: &[Datum], fill: &str) -> String {
    if data.is_empty() {
        return empty_chart(title);
    }
    let label_width = 160.0;
    let plot_width = WIDTH - label_width - RIGHT - 40.0;
    let row = ((HEIGHT - TOP - 8.0) / data.len() as f64).min(40.0);
    let max = max_value(data);

    let mut svg = open(title);
    for (i, d) in data.iter().enumerate() {
        let y = TOP + row * i as f64;
        let width = if max > 0.0 { d.value / max * plot_width } else { 0.0 };
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end" dominant-baseline="middle" class="chart-label">{}</text>"#,
            label_width - 8.0,
            y + row / 2.0,
            escape(&truncate(&d.label, 24))
        );
        let _ = write!(
            svg,
            r#"<rect x="{label_width:.1}" y="{:.1}" width="{width:.1}" height="{:.1}" fill="{fill}"><title>{}: {}</title></rect>"#,
            y + row * 0.15,
            row * 0.7,
            escape(&d.label),
            format_value(d.value)
        );
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" dominant-baseline="middle" class="chart-value">{}</text>"#,
            label_width + width + 6.0,
            y + row / 2.0,
            format_value(d.value)
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Pie chart with a legend. Slices take colours from [`PIE_COLORS`] in turn.
#[must_use]
pub fn pie_chart(title: &str, data: &[Datum]) -> String {
    let total: f64 = data.iter().map(|d| d.value.max(0.0)).sum();
    if total <= 0.0 {
        return empty_chart(title);
    }

    let (cx, cy, r) = (150.0, HEIGHT / 2.0, 110.0);
    let mut svg = open(title);
    let mut angle = -std::f64::consts::FRAC_PI_2;
    let mut legend_y = TOP + 20.0;

    for (i, d) in data.iter().enumerate() {
        let color = PIE_COLORS[i % PIE_COLORS.len()];
        let share = d.value.max(0.0) / total;
        let percent = share * 100.0;

        if share >= 0.999_999 {
            let _ = write!(svg, r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{color}"/>"#);
        } else if share > 0.0 {
            let end = angle + share * std::f64::consts::TAU;
            let (x1, y1) = (cx + r * angle.cos(), cy + r * angle.sin());
            let (x2, y2) = (cx + r * end.cos(), cy + r * end.sin());
            let large = u8::from(share > 0.5);
            let _ = write!(
                svg,
                r#"<path d="M {cx} {cy} L {x1:.2} {y1:.2} A {r} {r} 0 {large} 1 {x2:.2} {y2:.2} Z" fill="{color}"><title>{}: {percent:.0}%</title></path>"#,
                escape(&d.label)
            );
            angle = end;
        }

        let _ = write!(
            svg,
            r#"<rect x="300" y="{:.1}" width="12" height="12" fill="{color}"/><text x="318" y="{legend_y:.1}" dominant-baseline="middle" class="chart-label">{} ({percent:.0}%)</text>"#,
            legend_y - 6.0,
            escape(&d.label)
        );
        legend_y += 22.0;
    }
    svg.push_str("</svg>");
    svg
}

/// Plot area geometry shared by the vertical charts.
struct Frame {
    count: usize,
    max: f64,
}

impl Frame {
    fn new(data: &[Datum]) -> Self {
        Self {
            count: data.len(),
            max: nice_ceiling(max_value(data)),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn slot_width(&self) -> f64 {
        (WIDTH - LEFT - RIGHT) / self.count.max(1) as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn slot_center(&self, index: usize) -> f64 {
        LEFT + self.slot_width() * (index as f64 + 0.5)
    }

    fn y(&self, value: f64) -> f64 {
        let plot = HEIGHT - TOP - BOTTOM;
        HEIGHT - BOTTOM - (value.max(0.0) / self.max) * plot
    }

    fn grid(&self, svg: &mut String) {
        for tick in 0..=TICKS {
            let value = self.max * f64::from(tick) / f64::from(TICKS);
            let y = self.y(value);
            let _ = write!(
                svg,
                r##"<line x1="{LEFT}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#e5e7eb" stroke-dasharray="3 3"/><text x="{:.1}" y="{y:.1}" text-anchor="end" dominant-baseline="middle" class="chart-axis">{}</text>"##,
                WIDTH - RIGHT,
                LEFT - 6.0,
                format_value(value)
            );
        }
    }

    fn x_labels(&self, svg: &mut String, data: &[Datum]) {
        // Thin out labels so they never overlap.
        let step = self.count.div_ceil(12).max(1);
        for (i, d) in data.iter().enumerate().filter(|(i, _)| i % step == 0) {
            let _ = write!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" class="chart-axis">{}</text>"#,
                self.slot_center(i),
                HEIGHT - BOTTOM + 18.0,
                escape(&d.label)
            );
        }
    }
}

fn open(title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" class="chart" role="img" aria-label="{0}"><title>{0}</title>"#,
        escape(title)
    )
}

fn empty_chart(title: &str) -> String {
    let mut svg = open(title);
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" class="chart-empty">No data yet</text></svg>"#,
        WIDTH / 2.0,
        HEIGHT / 2.0
    );
    svg
}

fn max_value(data: &[Datum]) -> f64 {
    data.iter().map(|d| d.value).fold(0.0, f64::max)
}

/// Round up to 1, 2 or 5 times a power of ten so axis ticks are readable.
fn nice_ceiling(value: f64) -> f64 {
    if value <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let scaled = value / magnitude;
    let nice = if scaled <= 1.0 {
        1.0
    } else if scaled <= 2.0 {
        2.0
    } else if scaled <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn format_value(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

/// Escape text for SVG content and attributes.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Datum> {
        vec![
            Datum::new("01-2025", 1200.0),
            Datum::new("02-2025", 3400.0),
            Datum::new("03-2025", 800.0),
        ]
    }

    #[test]
    fn test_line_chart_has_points() {
        let svg = line_chart("Revenue", &sample(), "#10b981");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("stroke=\"#10b981\""));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("02-2025"));
    }

    #[test]
    fn test_bar_chart_has_bars() {
        let svg = bar_chart("Orders", &sample(), "#6366f1");
        assert_eq!(svg.matches("fill=\"#6366f1\"").count(), 3);
    }

    #[test]
    fn test_pie_colors_cycle() {
        let data: Vec<Datum> = (0..6).map(|i| Datum::new(format!("C{i}"), 1.0)).collect();
        let svg = pie_chart("Categories", &data);
        assert_eq!(svg.matches("<path").count(), 6);
        // Sixth slice wraps back to the first colour.
        assert_eq!(svg.matches("fill=\"#8884d8\"").count(), 4);
    }

    #[test]
    fn test_single_slice_pie_is_circle() {
        let svg = pie_chart("Categories", &[Datum::new("Helmet", 10.0)]);
        assert!(svg.contains("<circle"));
        assert!(svg.contains("Helmet (100%)"));
    }

    #[test]
    fn test_empty_data() {
        assert!(line_chart("Revenue", &[], "#000").contains("No data yet"));
        assert!(pie_chart("Categories", &[Datum::new("x", 0.0)]).contains("No data yet"));
        assert!(horizontal_bar_chart("Top", &[], "#000").contains("No data yet"));
    }

    #[test]
    fn test_labels_escaped() {
        let svg = horizontal_bar_chart("Top", &[Datum::new("Nuts & <Bolts>", 5.0)], "#10b981");
        assert!(svg.contains("Nuts &amp; &lt;Bolts&gt;"));
        assert!(!svg.contains("<Bolts>"));
    }

    #[test]
    fn test_nice_ceiling() {
        assert!((nice_ceiling(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((nice_ceiling(3400.0) - 5000.0).abs() < f64::EPSILON);
        assert!((nice_ceiling(12.0) - 20.0).abs() < f64::EPSILON);
        assert!((nice_ceiling(100.0) - 100.0).abs() < f64::EPSILON);
    }
}

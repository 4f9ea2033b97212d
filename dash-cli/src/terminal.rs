//! Plain-text rendering of the dashboard for a terminal.
//!
//! Tables and the temperature chart are laid out by ratatui widgets into an off-screen
//! [`Buffer`], which is then flattened to lines so the output can be printed or piped.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    symbols::Marker,
    widgets::{Axis, Chart, Dataset, GraphType, Row, Table as TableWidget, Widget},
};
use unicode_width::UnicodeWidthStr;
use weather_dash_core::present::{ChartPoint, DisplaySurface, Table};

const RULE_WIDTH: usize = 60;
const CHART_WIDTH: u16 = 60;
const CHART_HEIGHT: u16 = 12;
const COLUMN_SPACING: u16 = 2;
const INDENT: &str = "  ";

/// Buffers the dashboard as text; call [`TerminalSurface::finish`] to get it.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    out: String,
    depth: usize,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for part in text.lines() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(part);
            self.out.push('\n');
        }
        if text.is_empty() {
            self.out.push('\n');
        }
    }
}

impl DisplaySurface for TerminalSurface {
    fn headline(&mut self, text: &str) {
        self.line(&format!("== {text} =="));
    }

    fn subheader(&mut self, text: &str) {
        self.line(text);
        self.line(&"-".repeat(text.width()));
    }

    fn text(&mut self, text: &str) {
        self.line(text);
    }

    fn divider(&mut self) {
        self.line(&"=".repeat(RULE_WIDTH));
    }

    fn success(&mut self, text: &str) {
        self.line(&format!("[ok] {text}"));
    }

    fn warning(&mut self, text: &str) {
        self.line(&format!("[!] {text}"));
    }

    fn error(&mut self, text: &str) {
        self.line(&format!("[error] {text}"));
    }

    fn line_chart(&mut self, y_label: &str, points: &[ChartPoint]) {
        for row in render_chart(y_label, points) {
            self.line(&row);
        }
    }

    fn begin_expander(&mut self, title: &str, _expanded: bool) {
        // A terminal has no collapsed state; sections are indented instead.
        self.line(&format!("> {title}"));
        self.depth += 1;
    }

    fn end_expander(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn table(&mut self, table: &Table) {
        for row in render_table(table) {
            self.line(&row);
        }
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Flatten a rendered buffer into trimmed lines. A wide symbol covers the cell after it.
fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let width = usize::from(buf.area.width);
    if width == 0 {
        return Vec::new();
    }

    buf.content
        .chunks(width)
        .map(|row| {
            let mut line = String::new();
            let mut skip = 0;
            for cell in row {
                if skip == 0 {
                    line.push_str(cell.symbol());
                }
                skip = skip.max(cell.symbol().width()).saturating_sub(1);
            }
            line.trim_end().to_string()
        })
        .collect()
}

fn render_table(table: &Table) -> Vec<String> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.width()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let header = Row::new(table.headers.iter().map(String::as_str));
    let rule = Row::new(widths.iter().map(|w| "-".repeat(*w)));
    let rows = std::iter::once(rule)
        .chain(table.rows.iter().map(|row| Row::new(row.iter().map(String::as_str))));

    let spacing = usize::from(COLUMN_SPACING) * widths.len().saturating_sub(1);
    let area = Rect::new(
        0,
        0,
        to_u16(widths.iter().sum::<usize>() + spacing),
        to_u16(table.rows.len() + 2),
    );
    let mut buf = Buffer::empty(area);

    TableWidget::new(rows, widths.iter().map(|&w| Constraint::Length(to_u16(w))))
        .header(header)
        .column_spacing(COLUMN_SPACING)
        .render(area, &mut buf);

    buffer_lines(&buf)
}

fn render_chart(y_label: &str, points: &[ChartPoint]) -> Vec<String> {
    if points.is_empty() {
        return vec![format!("{y_label}: no data")];
    }

    let data: Vec<(f64, f64)> =
        points.iter().enumerate().map(|(i, p)| (i as f64, p.value)).collect();

    let (mut lo, mut hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p.value), hi.max(p.value))
    });
    if hi - lo < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let first = points[0].label.as_str();
    let last = points[points.len() - 1].label.as_str();

    let dataset = Dataset::default().marker(Marker::Braille).graph_type(GraphType::Line).data(&data);
    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .bounds([0.0, (points.len() - 1).max(1) as f64])
                .labels([first, last]),
        )
        .y_axis(
            Axis::default()
                .title(y_label)
                .bounds([lo, hi])
                .labels([format!("{lo:.1}"), format!("{hi:.1}")]),
        );

    let area = Rect::new(0, 0, CHART_WIDTH, CHART_HEIGHT);
    let mut buf = Buffer::empty(area);
    chart.render(area, &mut buf);

    let mut lines = buffer_lines(&buf);
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_braille(c: char) -> bool {
        ('\u{2801}'..='\u{28FF}').contains(&c)
    }

    #[test]
    fn table_columns_are_aligned() {
        let mut t = Table::new(["Date", "City", "High"]);
        t.push_row(vec!["2024-01-01".into(), "東京".into(), "41.0".into()]);
        t.push_row(vec!["2024-01-02".into(), "Oslo".into(), "39.5".into()]);

        let rows = render_table(&t);

        assert_eq!(
            rows,
            vec![
                "Date        City  High",
                "----------  ----  ----",
                "2024-01-01  東京  41.0",
                "2024-01-02  Oslo  39.5",
            ]
        );
    }

    #[test]
    fn emoji_labels_keep_later_columns_aligned() {
        let mut t = Table::new(["Date", "Condition", "High (°F)"]);
        t.push_row(vec!["2024-01-01".into(), "☀️ Sunny".into(), "41.0".into()]);
        t.push_row(vec!["2024-01-02".into(), "🌧 Slight Rain".into(), "39.5".into()]);

        let rows = render_table(&t);
        let column_of = |line: &str, needle: &str| line[..line.find(needle).unwrap()].width();

        let high = column_of(&rows[0], "High");
        assert_eq!(column_of(&rows[2], "41.0"), high);
        assert_eq!(column_of(&rows[3], "39.5"), high);
    }

    #[test]
    fn chart_shows_axes_and_a_line() {
        let points: Vec<ChartPoint> = [10.0, 15.0, 20.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| ChartPoint { label: format!("h{i}"), value: v })
            .collect();

        let rows = render_chart("Temp (°F)", &points);
        let text = rows.join("\n");

        assert!(rows.len() <= usize::from(CHART_HEIGHT));
        assert!(text.contains("Temp (°F)"));
        assert!(text.contains("20.0"));
        assert!(text.contains("10.0"));
        assert!(text.contains("h0"));
        assert!(text.contains("h2"));
        assert!(text.chars().any(is_braille));
    }

    #[test]
    fn flat_chart_gets_a_visible_range() {
        let points = vec![
            ChartPoint { label: "a".into(), value: 5.0 },
            ChartPoint { label: "b".into(), value: 5.0 },
        ];
        let text = render_chart("t", &points).join("\n");

        assert!(text.contains("4.0"));
        assert!(text.contains("6.0"));
        assert!(text.chars().any(is_braille));
    }

    #[test]
    fn empty_chart() {
        assert_eq!(render_chart("t", &[]), vec!["t: no data"]);
    }

    #[test]
    fn subheader_underline_matches_display_width() {
        let mut surface = TerminalSurface::new();
        surface.subheader("東京: Sunny");

        // Two cells per CJK character.
        assert_eq!(surface.finish(), format!("東京: Sunny\n{}\n", "-".repeat(11)));
    }

    #[test]
    fn expanders_indent_their_content() {
        let mut surface = TerminalSurface::new();
        surface.begin_expander("Active Alerts", false);
        surface.success("No active alerts");
        surface.end_expander();
        surface.text("after");

        assert_eq!(surface.finish(), "> Active Alerts\n  [ok] No active alerts\nafter\n");
    }

    #[test]
    fn error_is_one_line() {
        let mut surface = TerminalSurface::new();
        surface.error("Could not load the forecast: boom");
        assert_eq!(surface.finish(), "[error] Could not load the forecast: boom\n");
    }
}

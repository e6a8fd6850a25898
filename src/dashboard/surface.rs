//! Display surface: the sink the renderer pushes cards, tables, charts and
//! notices into.
//!
//! The renderer never formats text itself. It describes what to show and a
//! [`Surface`] decides how. [`TextSurface`] is the plain-text implementation
//! used by the CLI and the tests.

#![allow(missing_docs)]

use std::fmt::Write as _;

use crate::data::records::{ChartPoint, ChatMessage};

use super::sentiment::{SentimentTier, TierColor};

/// Sparkline glyph ramp for line charts.
pub const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Widest bar drawn for bar and pie charts.
const BAR_WIDTH: usize = 24;

// ──────────────────── primitives ────────────────────

/// Header summary card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: String,
    pub value: String,
    pub caption: String,
}

/// One table cell. A badge cell is drawn with its tier color.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Badge(SentimentTier),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub description: Option<String>,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

/// Full-view status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Loading,
    Error,
}

impl Notice {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Loading => "Loading...",
            Self::Error => "Error loading data. Please try again later.",
        }
    }
}

/// Receives display rows. Every method returns nothing: a surface cannot
/// feed anything back into the model.
pub trait Surface {
    fn heading(&mut self, text: &str);
    fn card(&mut self, card: &Card);
    fn table(&mut self, table: &Table);
    fn chart(&mut self, chart: &Chart);
    fn transcript(&mut self, messages: &[ChatMessage]);
    fn notice(&mut self, notice: Notice);
    /// Freeform line such as a section caption.
    fn line(&mut self, text: &str);
}

// ──────────────────── text surface ────────────────────

/// Decorates a badge label; the CLI installs one that adds terminal colors.
pub type BadgePainter = Box<dyn Fn(&str, TierColor) -> String + Send>;

/// Plain-text surface accumulating into a `String`.
pub struct TextSurface {
    out: String,
    painter: Option<BadgePainter>,
}

impl Default for TextSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSurface")
            .field("len", &self.out.len())
            .field("painted", &self.painter.is_some())
            .finish()
    }
}

impl TextSurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            out: String::new(),
            painter: None,
        }
    }

    #[must_use]
    pub fn with_painter(painter: BadgePainter) -> Self {
        Self {
            out: String::new(),
            painter: Some(painter),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    fn badge(&self, tier: SentimentTier) -> String {
        let label = format!("[{}]", tier.label());
        match &self.painter {
            Some(paint) => paint(&label, tier.color()),
            None => label,
        }
    }

    fn cell(&self, cell: &Cell) -> String {
        match cell {
            Cell::Text(text) => text.clone(),
            Cell::Badge(tier) => self.badge(*tier),
        }
    }
}

impl Surface for TextSurface {
    fn heading(&mut self, text: &str) {
        let _ = writeln!(self.out, "\n== {text} ==");
    }

    fn card(&mut self, card: &Card) {
        let _ = writeln!(self.out, "{}: {}  ({})", card.title, card.value, card.caption);
    }

    fn table(&mut self, table: &Table) {
        let _ = writeln!(self.out, "\n-- {} --", table.title);
        if let Some(desc) = &table.description {
            let _ = writeln!(self.out, "{desc}");
        }

        // Widths come from the undecorated text so color codes don't skew them.
        let plain: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Text(t) => t.clone(),
                        Cell::Badge(tier) => format!("[{}]", tier.label()),
                    })
                    .collect()
            })
            .collect();
        let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
        for row in &plain {
            for (i, text) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(text.chars().count());
                }
            }
        }

        let header: Vec<String> = table
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{h:<w$}"))
            .collect();
        let _ = writeln!(self.out, "{}", header.join("  ").trim_end());

        for (row, plain_row) in table.rows.iter().zip(&plain) {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                let width = widths.get(i).copied().unwrap_or(0);
                let pad = width.saturating_sub(plain_row[i].chars().count());
                line.push_str(&self.cell(cell));
                line.extend(std::iter::repeat_n(' ', pad));
            }
            let _ = writeln!(self.out, "{}", line.trim_end());
        }
    }

    fn chart(&mut self, chart: &Chart) {
        let _ = writeln!(self.out, "\n-- {} --", chart.title);
        match chart.kind {
            ChartKind::Line => {
                let values: Vec<f64> = chart.points.iter().map(|p| p.value).collect();
                let labels: Vec<&str> = chart.points.iter().map(|p| p.name.as_str()).collect();
                let _ = writeln!(self.out, "{}  {}", sparkline(&values), labels.join(" "));
                let first = values.first().copied().unwrap_or(0.0);
                let last = values.last().copied().unwrap_or(0.0);
                let _ = writeln!(self.out, "{first} -> {last}");
            }
            ChartKind::Bar => {
                let max = chart
                    .points
                    .iter()
                    .map(|p| p.value.abs())
                    .fold(0.0_f64, f64::max);
                let name_w = label_width(&chart.points);
                for p in &chart.points {
                    let _ = writeln!(
                        self.out,
                        "{:<name_w$}  {:<BAR_WIDTH$}  {}",
                        p.name,
                        bar(p.value.abs(), max),
                        p.value
                    );
                }
            }
            ChartKind::Pie => {
                let total: f64 = chart.points.iter().map(|p| p.value.max(0.0)).sum();
                let name_w = label_width(&chart.points);
                for p in &chart.points {
                    let share = if total > 0.0 {
                        p.value.max(0.0) / total * 100.0
                    } else {
                        0.0
                    };
                    let _ = writeln!(
                        self.out,
                        "{:<name_w$}  {:<BAR_WIDTH$}  {share:.0}%",
                        p.name,
                        bar(share, 100.0)
                    );
                }
            }
        }
    }

    fn transcript(&mut self, messages: &[ChatMessage]) {
        for msg in messages {
            let _ = writeln!(self.out, "{:>2}> {}", msg.role.avatar(), msg.content);
        }
    }

    fn notice(&mut self, notice: Notice) {
        let _ = writeln!(self.out, "{}", notice.message());
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }
}

// ──────────────────── helpers ────────────────────

/// Sparkline scaled between the series minimum and maximum.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|v| {
            let norm = if span > 0.0 { (v - min) / span } else { 0.5 };
            let idx = (norm.clamp(0.0, 1.0) * 7.0).round() as usize;
            SPARK_CHARS[idx.min(7)]
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max).clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len)
}

fn label_width(points: &[ChartPoint]) -> usize {
    points.iter().map(|p| p.name.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(pairs: &[(&str, f64)]) -> Vec<ChartPoint> {
        pairs.iter().map(|(n, v)| ChartPoint::new(n, *v)).collect()
    }

    #[test]
    fn sparkline_spans_full_ramp() {
        let line = sparkline(&[1000.0, 1800.0, 1400.0]);
        assert_eq!(line.chars().collect::<Vec<_>>(), vec!['▁', '█', '▅']);
        assert_eq!(sparkline(&[3.0, 3.0]), "▅▅");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn table_aligns_columns_and_badges() {
        let mut s = TextSurface::new();
        s.table(&Table {
            title: "Sector Sentiments".to_string(),
            description: None,
            headers: vec!["Sector", "Sentiment", "Comments"],
            rows: vec![
                vec![
                    Cell::text("Technology"),
                    Cell::Badge(SentimentTier::VeryPositive),
                    Cell::text("1500"),
                ],
                vec![
                    Cell::text("Finance"),
                    Cell::Badge(SentimentTier::Negative),
                    Cell::text("1000"),
                ],
            ],
        });
        let out = s.into_string();
        assert!(out.contains("Technology  [Very Positive]  1500"));
        assert!(out.contains("Finance     [Negative]       1000"));
    }

    #[test]
    fn painter_decorates_badges_only() {
        let mut s = TextSurface::with_painter(Box::new(|label: &str, color: TierColor| {
            format!("<{}>{label}</>", color.as_str())
        }));
        s.table(&Table {
            title: "T".to_string(),
            description: None,
            headers: vec!["Name", "Sentiment"],
            rows: vec![vec![Cell::text("AAPL"), Cell::Badge(SentimentTier::Positive)]],
        });
        assert!(s.as_str().contains("AAPL  <lime>[Positive]</>"));
        assert!(!s.as_str().contains("<lime>AAPL"));
    }

    #[test]
    fn pie_shows_shares() {
        let mut s = TextSurface::new();
        s.chart(&Chart {
            title: "Mix".to_string(),
            kind: ChartKind::Pie,
            points: points(&[("Institutional", 70.0), ("Retail", 30.0)]),
        });
        let out = s.into_string();
        assert!(out.contains("70%"));
        assert!(out.contains("30%"));
    }

    #[test]
    fn bar_chart_scales_to_largest_magnitude() {
        let mut s = TextSurface::new();
        s.chart(&Chart {
            title: "Sectors".to_string(),
            kind: ChartKind::Bar,
            points: points(&[("Tech", 0.7), ("Fin", -0.35)]),
        });
        let out = s.into_string();
        assert!(out.contains(&"#".repeat(BAR_WIDTH)));
        assert!(out.contains(&format!("{} ", "#".repeat(BAR_WIDTH / 2))));
    }

    #[test]
    fn notices_use_fixed_text() {
        let mut s = TextSurface::new();
        s.notice(Notice::Loading);
        s.notice(Notice::Error);
        assert_eq!(
            s.into_string(),
            "Loading...\nError loading data. Please try again later.\n"
        );
    }

    #[test]
    fn transcript_prefixes_avatars() {
        let mut s = TextSurface::new();
        s.transcript(&[ChatMessage::assistant("hi"), ChatMessage::user("yo")]);
        assert_eq!(s.into_string(), "AI> hi\n U> yo\n");
    }
}

//! Typed view layer shared by the pages.
//!
//! Pages build `Table`/`DetailPanel` values out of typed cells instead of
//! splicing strings, so a renamed field is a compile error rather than a blank
//! column. The renderers here emit plain text.

use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;

/// How long transient messages stay visible before auto-hiding.
pub const MESSAGE_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Money(Decimal),
    Count(i64),
    /// Quantity with its unit of measure, e.g. "12 pcs".
    Quantity(i64, String),
    /// Status badge, e.g. "Low Stock" or "CRITICAL".
    Badge(&'static str),
    /// Action affordances available for the row, already role-filtered.
    Actions(Vec<&'static str>),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Money(d) => write!(f, "${:.2}", d),
            Cell::Count(n) => write!(f, "{}", n),
            Cell::Quantity(n, unit) => write!(f, "{} {}", n, unit),
            Cell::Badge(label) => f.write_str(label),
            Cell::Actions(actions) => f.write_str(&actions.join(" | ")),
            Cell::Empty => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<Row>,
    /// Rendered as the single row when `rows` is empty. Empty results are
    /// informational, not errors.
    pub empty_message: String,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: Vec<&'static str>) -> Self {
        Self {
            title: title.into(),
            headers,
            rows: Vec::new(),
            empty_message: "No data.".to_string(),
        }
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text rendering with padded columns. Never panics, including on
    /// zero rows and on rows shorter than the header.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        let rendered_rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.to_string()).collect())
            .collect();
        for row in &rendered_rows {
            for (i, cell) in row.iter().enumerate() {
                if i >= widths.len() {
                    widths.push(cell.len());
                } else if cell.len() > widths[i] {
                    widths[i] = cell.len();
                }
            }
        }

        let mut out = String::new();
        if !self.title.is_empty() {
            out.push_str(&self.title);
            out.push('\n');
        }
        let header_line: Vec<String> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
            .collect();
        out.push_str(&header_line.join("  "));
        out.push('\n');
        out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
        out.push('\n');

        if rendered_rows.is_empty() {
            out.push_str(&self.empty_message);
            out.push('\n');
            return out;
        }

        for row in &rendered_rows {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let width = widths.get(i).copied().unwrap_or(cell.len());
                    format!("{:<width$}", cell, width = width)
                })
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

/// Read-only label/value panel, used for product details and the profile page.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailPanel {
    pub title: String,
    pub fields: Vec<(&'static str, String)>,
}

impl DetailPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((label, value.into()));
        self
    }

    pub fn render(&self) -> String {
        let label_width = self
            .fields
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0);
        let mut out = String::new();
        if !self.title.is_empty() {
            out.push_str(&self.title);
            out.push('\n');
        }
        for (label, value) in &self.fields {
            out.push_str(&format!("{:<width$}  {}\n", label, value, width = label_width));
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Success,
    Info,
}

/// A transient page message. The web UI auto-hides these after 5 seconds; the
/// TTL travels with the message so embedding views can honor it.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub ttl: Duration,
}

impl Message {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
            ttl: MESSAGE_TTL,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
            ttl: MESSAGE_TTL,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
            ttl: MESSAGE_TTL,
        }
    }
}

//! Table extraction: PDF bytes → raw rows.
//!
//! Pages are first turned into positioned text lines ([`layout`]); a
//! strategy then finds the header line(s) and cuts the following lines into
//! cells. Two strategies are available:
//!
//! - [`Stream`]: cells assigned by horizontal overlap with the header
//!   labels.
//! - [`Lattice`]: fixed column cells bounded midway between header labels.
//!
//! Both fold a line whose first column is empty into the row above, so a
//! wrapped address stays with its sale.

pub mod lattice;
pub mod layout;
pub mod stream;

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::parser::headers::{map_header, Header};
use crate::record::RawRow;

pub use lattice::Lattice;
pub use stream::Stream;

static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+(?: \S+)*").unwrap());

/// A header line needs at least this many recognized labels.
const MIN_HEADER_LABELS: usize = 2;

/// A run of text on one line, with its horizontal extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x0: f64,
    pub x1: f64,
    pub text: String,
}

impl Segment {
    fn center(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    fn overlap(&self, other: &Segment) -> f64 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub segments: Vec<Segment>,
}

impl Line {
    /// Split a layout-preserving text line on gaps of two or more spaces.
    /// Character columns stand in for x positions.
    pub fn from_text(text: &str) -> Line {
        let expanded = text.replace('\t', "    ");
        let segments = SEGMENT_RE
            .find_iter(&expanded)
            .map(|m| {
                let x0 = expanded[..m.start()].chars().count() as f64;
                let x1 = x0 + m.as_str().chars().count() as f64;
                Segment {
                    x0,
                    x1,
                    text: m.as_str().to_string(),
                }
            })
            .collect();
        Line { segments }
    }

    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| s.text.trim().is_empty())
    }

    /// True when enough segments are known column headers.
    pub fn is_header(&self) -> bool {
        self.segments
            .iter()
            .filter(|s| map_header(&s.text) != Header::Unknown)
            .count()
            >= MIN_HEADER_LABELS
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub number: u32,
    pub lines: Vec<Line>,
}

impl Page {
    pub fn from_text(number: u32, text: &str) -> Page {
        Page {
            number,
            lines: text.lines().map(Line::from_text).collect(),
        }
    }

    /// Pages that repeat the header start a fresh column set; pages without
    /// one continue with the previous page's columns.
    pub fn has_header(&self) -> bool {
        self.lines.iter().any(Line::is_header)
    }
}

/// Pluggable table detection over PDF pages.
pub trait TableExtractor {
    fn name(&self) -> &'static str;

    /// Rows from already laid-out pages, in page then line order.
    fn rows(&self, pages: &[Page]) -> Vec<RawRow>;

    fn extract(&self, pdf: &[u8]) -> Result<Vec<RawRow>> {
        let pages = layout::read_pages(pdf)?;
        Ok(self.rows(&pages))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    #[default]
    Stream,
    Lattice,
}

impl Mode {
    pub fn extractor(self) -> Box<dyn TableExtractor> {
        match self {
            Mode::Stream => Box::new(Stream),
            Mode::Lattice => Box::new(Lattice),
        }
    }
}

/// The row being collected. A line with nothing in the first column
/// continues it (wrapped cells); any other line starts the next row.
#[derive(Debug, Default)]
struct PendingRow(Option<Vec<Vec<String>>>);

impl PendingRow {
    fn feed(&mut self, cells: Vec<Vec<String>>, columns: &[Segment], rows: &mut Vec<RawRow>) {
        let continues = cells.first().is_some_and(|c| c.is_empty());
        match self.0.as_mut() {
            Some(current) if continues => {
                for (into, parts) in current.iter_mut().zip(cells) {
                    into.extend(parts);
                }
            }
            _ => {
                if let Some(done) = self.0.replace(cells) {
                    rows.push(to_raw_row(columns, done));
                }
            }
        }
    }

    fn flush(&mut self, columns: &[Segment], rows: &mut Vec<RawRow>) {
        if let Some(done) = self.0.take() {
            rows.push(to_raw_row(columns, done));
        }
    }
}

/// Build a raw row from the active header columns and the collected cell parts.
fn to_raw_row(columns: &[Segment], cells: Vec<Vec<String>>) -> RawRow {
    let mut row = RawRow::default();
    for (column, parts) in columns.iter().zip(cells) {
        let value = if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        };
        row.push(column.text.clone(), value);
    }
    row
}

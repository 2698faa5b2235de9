use tracing::debug;

use super::{Line, Page, PendingRow, Segment, TableExtractor};
use crate::record::RawRow;

/// Fixed column cells: each header label owns the span up to the midpoint
/// of the gap to its neighbours.
pub struct Lattice;

struct Grid {
    columns: Vec<Segment>,
    /// Right edge of column `i` is `bounds[i]`; the last column is open.
    bounds: Vec<f64>,
}

impl Grid {
    fn new(header: &Line) -> Grid {
        let columns = header.segments.clone();
        let bounds = columns
            .windows(2)
            .map(|w| (w[0].x1 + w[1].x0) / 2.0)
            .collect();
        Grid { columns, bounds }
    }

    fn column_for(&self, seg: &Segment) -> usize {
        self.bounds.iter().take_while(|b| **b <= seg.x0).count()
    }

    fn cells(&self, line: &Line) -> Vec<Vec<String>> {
        let mut cells = vec![Vec::new(); self.columns.len()];
        for seg in &line.segments {
            let text = seg.text.trim();
            if !text.is_empty() {
                cells[self.column_for(seg)].push(text.to_string());
            }
        }
        cells
    }
}

impl TableExtractor for Lattice {
    fn name(&self) -> &'static str {
        "lattice"
    }

    fn rows(&self, pages: &[Page]) -> Vec<RawRow> {
        let mut rows = Vec::new();
        let mut grid: Option<Grid> = None;

        for page in pages {
            let before = rows.len();
            if page.has_header() {
                grid = None;
            }
            // Wrapped cells never continue across a page break.
            let mut pending = PendingRow::default();

            for line in &page.lines {
                if line.is_header() {
                    if let Some(g) = &grid {
                        pending.flush(&g.columns, &mut rows);
                    }
                    grid = Some(Grid::new(line));
                    continue;
                }
                let Some(g) = &grid else { continue };
                if line.is_blank() {
                    continue;
                }
                pending.feed(g.cells(line), &g.columns, &mut rows);
            }

            if let Some(g) = &grid {
                pending.flush(&g.columns, &mut rows);
            }
            debug!(page = page.number, rows = rows.len() - before, "lattice page");
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::assemble;

    fn fixture_pages() -> Vec<Page> {
        let text = std::fs::read_to_string("tests/fixtures/bids_page.txt").unwrap();
        text.split('\u{c}')
            .enumerate()
            .map(|(i, t)| Page::from_text(i as u32 + 1, t))
            .collect()
    }

    #[test]
    fn bounds_sit_between_labels() {
        let grid = Grid::new(&Line::from_text("Sale Date   County    Bid"));
        assert_eq!(grid.bounds, vec![10.5, 20.0]);
        let seg = |x0: f64| Segment {
            x0,
            x1: x0 + 1.0,
            text: "x".into(),
        };
        assert_eq!(grid.column_for(&seg(0.0)), 0);
        assert_eq!(grid.column_for(&seg(11.0)), 1);
        assert_eq!(grid.column_for(&seg(40.0)), 2);
    }

    #[test]
    fn wrapped_lines_merge_into_row_above() {
        let text = "\
Sale Date   County      Property Address
7/15/2025   Clay        77 Pine Rd
                        Liberty, MO 64068
7/16/2025   Platte      1 Main St";
        let rows = Lattice.rows(&[Page::from_text(1, text)]);
        assert_eq!(rows.len(), 2);
        let first = assemble(&rows[0]);
        assert_eq!(first.property_address.as_deref(), Some("77 Pine Rd Liberty, MO 64068"));
        assert_eq!(assemble(&rows[1]).county.as_deref(), Some("Platte"));
    }

    #[test]
    fn fixture_rows() {
        let records: Vec<_> = Lattice.rows(&fixture_pages()).iter().map(assemble).collect();
        let sales: Vec<_> = records.iter().filter(|r| r.ms_file.is_some()).collect();
        assert_eq!(sales.len(), 4, "{:#?}", records);
        assert_eq!(
            sales[0].property_address.as_deref(),
            Some("123 Main St St. Louis, MO 63101")
        );
        assert_eq!(sales[1].auction_vendor.as_deref(), Some("Auction.com"));
        assert_eq!(sales[2].bid, None);
        assert_eq!(sales[3].property_address.as_deref(), Some("77 Pine Rd Liberty, MO 64068"));
        // Only the page footers come out without a file number.
        assert!(records
            .iter()
            .filter(|r| r.ms_file.is_none())
            .all(|r| r.county.is_none() && r.property_address.is_none()));
    }
}

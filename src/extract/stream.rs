use tracing::debug;

use super::{Page, PendingRow, Segment, TableExtractor};
use crate::record::RawRow;

/// One row per text line, plus any continuation lines below it. Each
/// segment goes to the header column it overlaps most, or the nearest one
/// when it overlaps none.
pub struct Stream;

impl TableExtractor for Stream {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn rows(&self, pages: &[Page]) -> Vec<RawRow> {
        let mut rows = Vec::new();
        let mut columns: Option<Vec<Segment>> = None;

        for page in pages {
            let before = rows.len();
            if page.has_header() {
                columns = None;
            }
            let mut pending = PendingRow::default();
            for line in &page.lines {
                if line.is_header() {
                    if let Some(cols) = &columns {
                        pending.flush(cols, &mut rows);
                    }
                    columns = Some(line.segments.clone());
                    continue;
                }
                let Some(cols) = &columns else { continue };
                if line.is_blank() {
                    continue;
                }

                let mut cells: Vec<Vec<String>> = vec![Vec::new(); cols.len()];
                for seg in &line.segments {
                    cells[column_for(cols, seg)].push(seg.text.trim().to_string());
                }
                pending.feed(cells, cols, &mut rows);
            }
            if let Some(cols) = &columns {
                pending.flush(cols, &mut rows);
            }
            debug!(page = page.number, rows = rows.len() - before, "stream page");
        }

        rows
    }
}

fn column_for(columns: &[Segment], seg: &Segment) -> usize {
    let best_overlap = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.overlap(seg)))
        .filter(|(_, o)| *o > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((i, _)) = best_overlap {
        return i;
    }
    columns
        .iter()
        .enumerate()
        .min_by(|a, b| {
            let da = (a.1.center() - seg.center()).abs();
            let db = (b.1.center() - seg.center()).abs();
            da.total_cmp(&db)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
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
    fn lines_before_header_are_ignored() {
        let pages = vec![Page::from_text(1, "Bids Online\n\nSale Date   County\n7/15/2025   Clay")];
        let rows = Stream.rows(&pages);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            RawRow::from_pairs([("Sale Date", "7/15/2025"), ("County", "Clay")])
        );
    }

    #[test]
    fn cells_follow_header_positions() {
        let text = "\
Sale Date    Sale Time    County        Bid
7/15/2025    2:00 PM                    $1,200.00
7/16/2025                 Jackson";
        let rows = Stream.rows(&[Page::from_text(1, text)]);
        assert_eq!(rows.len(), 2);

        let first = assemble(&rows[0]);
        assert_eq!(first.sale_time.as_deref(), Some("2:00 PM"));
        assert_eq!(first.county, None);
        assert_eq!(first.bid.as_deref(), Some("1200.00"));

        let second = assemble(&rows[1]);
        assert_eq!(second.sale_time, None);
        assert_eq!(second.county.as_deref(), Some("Jackson"));
    }

    #[test]
    fn continuation_lines_join_the_row_above() {
        let text = "\
Sale Date   County      Property Address
7/15/2025   Clay        77 Pine Rd
                        Liberty, MO 64068
7/16/2025   Platte      1 Main St";
        let rows = Stream.rows(&[Page::from_text(1, text)]);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            assemble(&rows[0]).property_address.as_deref(),
            Some("77 Pine Rd Liberty, MO 64068")
        );
        assert_eq!(assemble(&rows[1]).county.as_deref(), Some("Platte"));
    }

    #[test]
    fn fixture_rows() {
        let rows = Stream.rows(&fixture_pages());
        let records: Vec<_> = rows.iter().map(assemble).collect();
        let with_file: Vec<_> = records.iter().filter(|r| r.ms_file.is_some()).collect();
        assert_eq!(with_file.len(), 4, "{:#?}", records);
        assert_eq!(with_file[0].ms_file.as_deref(), Some("225571.071525.453192"));
        assert_eq!(with_file[0].county.as_deref(), Some("St. Louis County"));
        assert_eq!(with_file[0].bid.as_deref(), Some("146881.95"));
        assert_eq!(
            with_file[0].property_address.as_deref(),
            Some("123 Main St St. Louis, MO 63101")
        );
        assert_eq!(with_file[3].continued_date.as_deref(), Some("8/19/2025"));
    }
}

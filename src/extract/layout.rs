//! Positioned text from PDF pages.
//!
//! `pdf-extract` interprets the content streams and fonts (encodings,
//! ToUnicode maps, CID fonts, glyph widths) and hands over one decoded
//! glyph at a time with its rendering matrix. Glyphs are collected per page,
//! grouped into lines and merged into [`Segment`]s wherever the gap between
//! them is narrower than a column gap.

use std::panic::{self, AssertUnwindSafe};

use indicatif::{ProgressBar, ProgressStyle};
use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};
use tracing::info;

use super::{Line, Page, Segment};
use crate::error::{Error, Result};

type Matrix = [f64; 6];

/// Horizontal gap, in font sizes, that separates two segments.
const SEGMENT_GAP: f64 = 1.0;
/// Smallest gap, in font sizes, that becomes a space inside a segment.
const WORD_GAP: f64 = 0.15;

/// Text shown at one position.
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    x: f64,
    y: f64,
    end: f64,
    size: f64,
    text: String,
}

/// Load the PDF and lay out every page, in page order.
pub fn read_pages(pdf: &[u8]) -> Result<Vec<Page>> {
    let doc = Document::load_mem(pdf)
        .map_err(|e| Error::Extraction(format!("unreadable PDF: {}", e)))?;
    let page_count = doc.get_pages().len();
    info!("Laying out {} pages", page_count);

    let pb = ProgressBar::new(page_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")
            .map_err(|e| Error::Extraction(e.to_string()))?
            .progress_chars("=> "),
    );

    let mut collector = RunCollector::new(pb.clone());
    // Malformed fonts can panic inside the interpreter; that is a bad PDF,
    // not a crash.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::output_doc(&doc, &mut collector)
    }));
    pb.finish_and_clear();

    match outcome {
        Ok(Ok(())) => Ok(collector.pages),
        Ok(Err(e)) => Err(Error::Extraction(format!("text extraction failed: {}", e))),
        Err(_) => Err(Error::Extraction("text extraction aborted on a malformed page".into())),
    }
}

/// Receives decoded glyphs from `pdf-extract`, one page at a time.
struct RunCollector {
    pages: Vec<Page>,
    number: u32,
    runs: Vec<TextRun>,
    pb: ProgressBar,
}

impl RunCollector {
    fn new(pb: ProgressBar) -> Self {
        RunCollector {
            pages: Vec::new(),
            number: 0,
            runs: Vec::new(),
            pb,
        }
    }
}

impl OutputDev for RunCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.number = page_num;
        self.runs.clear();
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        let runs = std::mem::take(&mut self.runs);
        self.pages.push(Page {
            number: self.number,
            lines: group_lines(runs),
        });
        self.pb.inc(1);
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        text: &str,
    ) -> std::result::Result<(), OutputError> {
        let m = [trm.m11, trm.m12, trm.m21, trm.m22, trm.m31, trm.m32];
        if let Some(run) = glyph_run(m, width, font_size, text) {
            self.runs.push(run);
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }
}

/// One glyph in device space. `width` is the advance in text space units
/// (thousandths already divided out), so it scales by the font size.
/// Whitespace glyphs only leave a gap behind.
fn glyph_run(m: Matrix, width: f64, font_size: f64, text: &str) -> Option<TextRun> {
    if text.trim().is_empty() {
        return None;
    }
    let scale_x = m[0].hypot(m[1]);
    let scale_y = m[2].hypot(m[3]);
    Some(TextRun {
        x: m[4],
        y: m[5],
        end: m[4] + width * font_size * scale_x,
        size: (font_size * (scale_x * scale_y).sqrt()).abs().max(1.0),
        text: text.to_string(),
    })
}

// ── Line grouping ──

/// Group runs into lines top to bottom, then merge close runs into segments.
fn group_lines(mut runs: Vec<TextRun>) -> Vec<Line> {
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<TextRun>> = Vec::new();
    for run in runs {
        match lines.last_mut() {
            Some(line) if (line[0].y - run.y).abs() <= line[0].size.min(run.size) * 0.4 => {
                line.push(run)
            }
            _ => lines.push(vec![run]),
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            Line {
                segments: merge_runs(line),
            }
        })
        .collect()
}

fn merge_runs(runs: Vec<TextRun>) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut last_size: f64 = 0.0;

    for run in runs {
        match segments.last_mut() {
            Some(seg) if run.x - seg.x1 < last_size.max(run.size) * SEGMENT_GAP => {
                if run.x - seg.x1 > run.size * WORD_GAP {
                    seg.text.push(' ');
                }
                seg.text.push_str(&run.text);
                seg.x1 = seg.x1.max(run.end);
            }
            _ => segments.push(Segment {
                x0: run.x,
                x1: run.end,
                text: run.text,
            }),
        }
        last_size = run.size;
    }

    segments
}

/// Small in-memory PDFs for exercising the whole text layer.
#[cfg(test)]
pub(crate) mod sample {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

    /// A Helvetica cell, positioned in points from the bottom left.
    pub type Cell<'a> = (i64, i64, &'a str);

    /// One page showing every cell in 10pt Helvetica.
    pub fn helvetica_page(cells: &[Cell]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let shown = cells
            .iter()
            .map(|(x, y, text)| (*x, *y, Object::string_literal(*text)))
            .collect::<Vec<_>>();
        one_page(doc, font_id, &shown)
    }

    /// One page in a two-byte Identity-H font whose glyph ids are the
    /// character codes minus 29, as a subsetted TrueType font lays them out.
    /// Only the ToUnicode map says what the glyphs mean.
    pub fn identity_h_page(cells: &[Cell]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let cmap = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
1 beginbfrange
<0003> <0061> <0020>
endbfrange
endcmap
CMapName currentdict /CIDInit /ProcSet findresource pop end
end
"
        .to_vec();
        let to_unicode = doc.add_object(Stream::new(dictionary! {}, cmap));
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => "ArialMT",
            "Flags" => Object::Integer(32),
            "FontBBox" => vec![
                Object::Integer(-665),
                Object::Integer(-325),
                Object::Integer(2000),
                Object::Integer(1040),
            ],
            "ItalicAngle" => Object::Integer(0),
            "Ascent" => Object::Integer(905),
            "Descent" => Object::Integer(-212),
            "CapHeight" => Object::Integer(716),
            "StemV" => Object::Integer(80),
        });
        let descendant = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "ArialMT",
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => Object::Integer(0),
            },
            "FontDescriptor" => descriptor,
            "DW" => Object::Integer(500),
        });
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "ArialMT",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant)],
            "ToUnicode" => to_unicode,
        });
        let shown = cells
            .iter()
            .map(|(x, y, text)| {
                let codes = text
                    .chars()
                    .flat_map(|c| (c as u16 - 29).to_be_bytes())
                    .collect();
                (*x, *y, Object::String(codes, StringFormat::Hexadecimal))
            })
            .collect::<Vec<_>>();
        one_page(doc, font_id, &shown)
    }

    fn one_page(mut doc: Document, font_id: ObjectId, shown: &[(i64, i64, Object)]) -> Vec<u8> {
        let mut operations = Vec::new();
        for (x, y, text) in shown {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), Object::Integer(10)]));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(*x), Object::Integer(*y)],
            ));
            operations.push(Operation::new("Tj", vec![text.clone()]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations }.encode().unwrap();

        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

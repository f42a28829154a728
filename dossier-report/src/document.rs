//! A4 PDF rendering of the laid-out report.
//!
//! Text uses the built-in Helvetica faces, so it is reduced to what
//! WinAnsi can encode before drawing. Line breaking estimates glyph width
//! from the font size; pages break whenever the next line would cross the
//! bottom margin.

use crate::RenderError;
use crate::layout::{Block, layout};
use dossier_common::SourceResult;
use printpdf::{
    Actions, BuiltinFont, Color, IndirectFontRef, LinkAnnotation, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rect, Rgb,
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 25.4;
const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;
const BULLET_INDENT: f32 = 6.0;

struct TextStyle {
    size: f32,
    leading: f32,
    bold: bool,
}

const TITLE: TextStyle = TextStyle {
    size: 18.0,
    leading: 22.0,
    bold: true,
};
const HEADING: TextStyle = TextStyle {
    size: 14.0,
    leading: 18.0,
    bold: true,
};
const BODY: TextStyle = TextStyle {
    size: 10.0,
    leading: 12.0,
    bold: false,
};

/// Render the report as PDF bytes.
pub fn render_document(query: &str, sources: &[SourceResult]) -> Result<Vec<u8>, RenderError> {
    render_paginated(query, sources).map(|(bytes, _)| bytes)
}

fn render_paginated(
    query: &str,
    sources: &[SourceResult],
) -> Result<(Vec<u8>, usize), RenderError> {
    let blocks = layout(query, sources);
    let (doc, page, layer) = PdfDocument::new(
        sanitize(&format!("Research Report on: {query}")),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Font(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Font(e.to_string()))?;

    let mut pen = Pen {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        y: PAGE_HEIGHT - MARGIN,
        regular,
        bold,
        pages: 1,
    };
    for block in &blocks {
        pen.draw(block);
    }
    let pages = pen.pages;

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| RenderError::Document(e.to_string()))?;
    tracing::debug!(
        target: "report.pdf",
        sources = sources.len(),
        blocks = blocks.len(),
        pages,
        bytes = bytes.len(),
        "report.pdf.rendered"
    );
    Ok((bytes, pages))
}

/// Drawing cursor; `y` is the baseline position in mm from the page bottom.
struct Pen<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl Pen<'_> {
    fn draw(&mut self, block: &Block) {
        match block {
            Block::Title(text) => self.text(text, &TITLE, 0.0),
            Block::Heading(text) => {
                self.gap(6.0);
                self.text(text, &HEADING, 0.0);
            }
            Block::Link(url) => self.link(url),
            Block::Paragraph(text) => {
                self.text(text, &BODY, 0.0);
                self.gap(3.0);
            }
            Block::BulletList(items) => {
                for item in items {
                    self.bullet(item);
                }
            }
            Block::Spacer(pt) => self.gap(*pt),
        }
    }

    fn text(&mut self, text: &str, style: &TextStyle, indent: f32) {
        for line in wrap_lines(text, style.size, indent) {
            self.line(&line, style, indent);
        }
    }

    fn bullet(&mut self, item: &str) {
        let lines = wrap_lines(item, BODY.size, BULLET_INDENT);
        if lines.is_empty() {
            self.line("\u{2022}", &BODY, 0.0);
            return;
        }
        for (idx, line) in lines.iter().enumerate() {
            self.advance(BODY.leading);
            if idx == 0 {
                self.put("\u{2022}", &BODY, 0.0);
            }
            self.put(line, &BODY, BULLET_INDENT);
        }
    }

    fn link(&mut self, url: &str) {
        let lines = wrap_lines(url, BODY.size, 0.0);
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.8, None)));
        for line in &lines {
            self.line(line, &BODY, 0.0);
            if !url.is_empty() {
                let width = estimated_width(line, BODY.size);
                let descent = BODY.size * 0.25 * PT_TO_MM;
                let ascent = BODY.size * PT_TO_MM;
                self.layer.add_link_annotation(LinkAnnotation::new(
                    Rect::new(
                        Mm(MARGIN),
                        Mm(self.y - descent),
                        Mm(MARGIN + width),
                        Mm(self.y + ascent),
                    ),
                    None,
                    None,
                    Actions::uri(url.to_string()),
                    None,
                ));
            }
        }
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    fn line(&mut self, text: &str, style: &TextStyle, indent: f32) {
        self.advance(style.leading);
        self.put(text, style, indent);
    }

    fn put(&self, text: &str, style: &TextStyle, indent: f32) {
        let font = if style.bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(sanitize(text), style.size, Mm(MARGIN + indent), Mm(self.y), font);
    }

    /// Move the baseline down one line, starting a new page when needed.
    fn advance(&mut self, leading_pt: f32) {
        let step = leading_pt * PT_TO_MM;
        if self.y - step < MARGIN {
            self.new_page();
        }
        self.y -= step;
    }

    fn gap(&mut self, pt: f32) {
        self.y = (self.y - pt * PT_TO_MM).max(MARGIN);
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }
}

fn chars_per_line(size_pt: f32, indent_mm: f32) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN - indent_mm;
    let glyph = size_pt * AVG_GLYPH_EM * PT_TO_MM;
    ((usable / glyph) as usize).max(10)
}

fn estimated_width(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * AVG_GLYPH_EM * PT_TO_MM
}

fn wrap_lines(text: &str, size_pt: f32, indent_mm: f32) -> Vec<String> {
    textwrap::wrap(text, chars_per_line(size_pt, indent_mm))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Map text onto characters the built-in fonts can show.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            '\u{2022}' | '\u{2026}' | '\u{20AC}' | '\u{2122}' => c,
            '\t' => ' ',
            c if c.is_ascii_graphic() || c == ' ' => c,
            c if ('\u{A0}'..='\u{FF}').contains(&c) => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_common::{Candidate, ExtractionError, SourceFailure};

    fn sample_sources(n: usize) -> Vec<SourceResult> {
        (0..n)
            .map(|i| {
                SourceResult::new(
                    Candidate::new(format!("Source {i}"), format!("https://s{i}.example/a")),
                    Ok(format!(
                        "Overview of source {i}.\n- first point\n- second point that is long enough to wrap {}\nClosing remark.",
                        "word ".repeat(40)
                    )),
                )
            })
            .collect()
    }

    #[test]
    fn produces_a_pdf() {
        let bytes = render_document("test topic", &sample_sources(2)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_reports_paginate() {
        let (bytes, pages) = render_paginated("many", &sample_sources(40)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(pages > 1, "expected several pages, got {pages}");
    }

    #[test]
    fn failures_and_odd_characters_still_render() {
        let sources = vec![
            SourceResult::new(
                Candidate::new("Déjà vu \u{1F980}", ""),
                Err(SourceFailure::Extraction(ExtractionError::InvalidUrl {
                    url: String::new(),
                    reason: "empty link".into(),
                })),
            ),
            SourceResult::new(
                Candidate::new("Quotes", "https://q.example"),
                Ok("\u{201C}smart\u{201D} \u{2014} dashes\n* \u{4E2D}\u{6587}".into()),
            ),
        ];
        let bytes = render_document("edge \u{2013} cases", &sources).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn sanitize_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(sanitize("caf\u{E9} \u{2019}s"), "caf\u{E9} 's");
        assert_eq!(sanitize("\u{4E2D}\tx"), "? x");
        assert_eq!(sanitize("a \u{2022} b"), "a \u{2022} b");
    }

    #[test]
    fn wrapping_respects_the_estimated_width() {
        let text = "word ".repeat(100);
        let limit = chars_per_line(BODY.size, 0.0);
        let lines = wrap_lines(&text, BODY.size, 0.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= limit));
    }
}

//! Format-neutral page content for the paginated report.

use dossier_common::SourceResult;

/// One flowable unit of the paginated report, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    /// Rendered as its own URL text and made clickable.
    Link(String),
    Paragraph(String),
    BulletList(Vec<String>),
    /// Vertical gap in points.
    Spacer(f32),
}

/// Split a summary into plain paragraph lines and bullet items.
///
/// A trimmed line starting with `-` or `*` is a bullet; its item text has
/// every leading `-`, `*` and space removed. Other non-blank lines are
/// paragraphs. Both lists keep their original relative order.
///
/// ```
/// use dossier_report::split_summary;
///
/// let (text, bullets) = split_summary("Intro.\n- a\n* b\nOutro.");
/// assert_eq!(text, ["Intro.", "Outro."]);
/// assert_eq!(bullets, ["a", "b"]);
/// ```
pub fn split_summary(summary: &str) -> (Vec<String>, Vec<String>) {
    let mut paragraphs = Vec::new();
    let mut bullets = Vec::new();
    for line in summary.lines() {
        let line = line.trim();
        if line.starts_with(['-', '*']) {
            bullets.push(
                line.trim_start_matches(['-', '*', ' '])
                    .trim()
                    .to_string(),
            );
        } else if !line.is_empty() {
            paragraphs.push(line.to_string());
        }
    }
    (paragraphs, bullets)
}

/// Lay out the whole report: title, then per source its heading, link,
/// paragraphs and a single trailing bullet list.
pub fn layout(query: &str, sources: &[SourceResult]) -> Vec<Block> {
    let mut blocks = vec![
        Block::Title(format!("Research Report on: {query}")),
        Block::Spacer(20.0),
    ];
    for source in sources {
        blocks.push(Block::Heading(source.title.clone()));
        blocks.push(Block::Link(source.link.clone()));
        blocks.push(Block::Spacer(6.0));

        let (paragraphs, bullets) = split_summary(&source.summary_text());
        blocks.extend(paragraphs.into_iter().map(Block::Paragraph));
        if !bullets.is_empty() {
            blocks.push(Block::BulletList(bullets));
        }
        blocks.push(Block::Spacer(12.0));
    }
    blocks
}

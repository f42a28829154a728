use dossier_common::SourceResult;
use std::fmt::Write;

/// Markdown report: query heading, then title, summary and link per source.
///
/// ```
/// use dossier_common::{Candidate, SourceResult};
/// use dossier_report::render_markup;
///
/// let sources = vec![SourceResult::new(
///     Candidate::new("Ferris", "https://rust-lang.org"),
///     Ok("- crabs".into()),
/// )];
/// let md = render_markup("rust", &sources);
/// assert!(md.starts_with("# Research Report on rust\n\n## Ferris\n\n- crabs"));
/// ```
pub fn render_markup(query: &str, sources: &[SourceResult]) -> String {
    let mut out = format!("# Research Report on {query}\n\n");
    for source in sources {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "## {}\n\n{}\n\nSource: {}\n\n",
            source.title,
            source.summary_text(),
            source.link
        );
    }
    out
}

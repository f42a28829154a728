use anyhow::{Context, Result};
use dossier_common::SourceResult;
use dossier_report::{render_document, render_markup};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const MARKUP_FILE: &str = "report.md";
pub const DOCUMENT_FILE: &str = "report.pdf";

/// Terminal view of a run: heading, link and summary per source.
pub fn render_console(sources: &[SourceResult]) -> String {
    let mut out = String::new();
    for source in sources {
        let _ = write!(
            out,
            "### {}\n[Source link]({})\n\n{}\n\n---\n\n",
            source.title,
            source.link,
            source.summary_text()
        );
    }
    out
}

#[derive(Debug, Default)]
pub struct Exports {
    pub markup: Option<PathBuf>,
    pub document: Option<PathBuf>,
}

/// Write both reports into `dir`. A PDF failure is logged and leaves the
/// Markdown report in place.
pub fn export_reports(dir: &Path, query: &str, sources: &[SourceResult]) -> Result<Exports> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    let mut exports = Exports::default();
    let markup = render_markup(query, sources);
    exports.markup = Some(write_atomic(dir, MARKUP_FILE, markup.as_bytes())?);

    match render_document(query, sources) {
        Ok(bytes) => exports.document = Some(write_atomic(dir, DOCUMENT_FILE, &bytes)?),
        Err(e) => tracing::error!(target: "app", error = %e, "app.export.pdf_failed"),
    }
    Ok(exports)
}

/// Stage in a temp file beside the target, then rename over it.
fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let target = dir.join(name);
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(&target)
        .with_context(|| format!("writing {}", target.display()))?;
    tracing::info!(target: "app", path = %target.display(), bytes = bytes.len(), "app.export.written");
    Ok(target)
}

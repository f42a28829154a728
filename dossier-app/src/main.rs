use anyhow::Result;
use clap::Parser;
use cli::Cli;
use dossier_common::ReportRequest;
use dossier_common::observability::init_logging;
use output::{export_reports, render_console};
use tokio_util::sync::CancellationToken;
use wiring::{build_pipeline, load_config};

mod cli;
mod output;
mod wiring;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config: file, then env, then flags
    let cfg = load_config(&cli)?;
    let log_path = init_logging(cfg.logging.to_log_config("dossier"))?;
    tracing::info!(target: "app", log = %log_path.display(), "app.start");

    // 2) Components
    let pipeline = build_pipeline(&cfg)?;

    // 3) Run; Ctrl-C abandons in-flight requests
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });
    let sources = pipeline
        .run_with_cancel(&cli.query, cfg.search.results, &cancel)
        .await?;
    let report = ReportRequest::new(cli.query.clone(), sources);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_console(&report.sources));
    }

    // 4) Reports
    if !cli.no_export {
        let exports = export_reports(&cli.out_dir, &report.query, &report.sources)?;
        for path in [exports.markup, exports.document].into_iter().flatten() {
            eprintln!("wrote {}", path.display());
        }
    }
    tracing::info!(target: "app", sources = report.sources.len(), "app.done");
    Ok(())
}

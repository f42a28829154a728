//! Builds the pipeline from a loaded [`DossierConfig`].

use crate::cli::Cli;
use dossier_common::{DossierError, Result};
use dossier_config::{DossierConfig, DossierConfigLoader, default_config_path};
use dossier_llm::ensure_llm_ready;
use dossier_pipeline::{AggregationPipeline, SourceSummarizer};
use dossier_web::{HttpContentExtractor, SerpApiLocator};
use std::sync::Arc;

/// Load configuration: explicit `--config` file (required) or the default
/// path (optional), then env, then command-line overrides.
pub fn load_config(cli: &Cli) -> Result<DossierConfig> {
    let loader = DossierConfigLoader::new();
    let loader = match (&cli.config, default_config_path()) {
        (Some(path), _) => loader.with_file(path),
        (None, Some(default)) => loader.with_optional_file(default),
        (None, None) => loader,
    };
    let mut cfg = loader
        .load()
        .map_err(|e| DossierError::Config(e.to_string()))?;
    apply_overrides(&mut cfg, cli);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut DossierConfig, cli: &Cli) {
    if let Some(n) = cli.results {
        cfg.search.results = n;
    }
    if let Some(tone) = cli.tone {
        cfg.pipeline.tone = Some(tone.into());
    }
    if let Some(c) = cli.concurrency {
        cfg.pipeline.concurrency = c as usize;
    }
    // Flags and their env fallbacks only fill credentials the file left empty.
    if cfg.search.api_key.trim().is_empty() {
        if let Some(key) = &cli.serpapi_key {
            cfg.search.api_key = key.clone();
        }
    }
    if cfg.llm.auth_token.trim().is_empty() {
        if let Some(key) = &cli.openai_key {
            cfg.llm.auth_token = key.clone();
        }
    }
}

pub fn build_pipeline(cfg: &DossierConfig) -> Result<AggregationPipeline> {
    let locator = SerpApiLocator::from_config(&cfg.search)
        .map_err(|e| DossierError::Config(format!("{e} (export SERPAPI_KEY or set search.api_key)")))?;
    let extractor =
        HttpContentExtractor::new(&cfg.extract).map_err(|e| DossierError::Config(e.to_string()))?;
    let llm = ensure_llm_ready(&cfg.llm)?;
    let summarizer = SourceSummarizer::new(llm, &cfg.llm, cfg.pipeline.tone);

    tracing::info!(
        target: "app",
        model = %cfg.llm.model,
        results = cfg.search.results,
        concurrency = cfg.pipeline.concurrency,
        tone = ?cfg.pipeline.tone,
        "app.pipeline.ready"
    );
    Ok(
        AggregationPipeline::new(Arc::new(locator), Arc::new(extractor), summarizer)
            .with_concurrency(cfg.pipeline.concurrency),
    )
}

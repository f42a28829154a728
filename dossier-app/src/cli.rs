use clap::{Parser, ValueEnum};
use dossier_config::{MAX_RESULTS, MIN_RESULTS, SummaryTone};
use std::path::PathBuf;

/// Dossier: search the web for a topic and summarize each source.
#[derive(Parser, Debug)]
#[command(name = "dossier", version, about)]
pub struct Cli {
    /// Research query.
    pub query: String,

    /// Number of sources to gather (3-10). Defaults to `search.results`.
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(i64::from(MIN_RESULTS)..=i64::from(MAX_RESULTS)))]
    pub results: Option<u32>,

    /// Path to a YAML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory receiving report.md and report.pdf.
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Tone requested from the summarizer.
    #[arg(long, value_enum)]
    pub tone: Option<ToneArg>,

    /// Sources processed at once.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=16))]
    pub concurrency: Option<u64>,

    /// Print results as JSON instead of Markdown.
    #[arg(long)]
    pub json: bool,

    /// Skip writing report files.
    #[arg(long)]
    pub no_export: bool,

    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    pub serpapi_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ToneArg {
    Academic,
    Simplified,
    Conversational,
}

impl From<ToneArg> for SummaryTone {
    fn from(t: ToneArg) -> Self {
        match t {
            ToneArg::Academic => SummaryTone::Academic,
            ToneArg::Simplified => SummaryTone::Simplified,
            ToneArg::Conversational => SummaryTone::Conversational,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "dossier",
            "solid state batteries",
            "-n",
            "7",
            "--tone",
            "simplified",
            "--concurrency",
            "3",
            "--out-dir",
            "/tmp/out",
            "--serpapi-key",
            "k",
        ])
        .unwrap();
        assert_eq!(cli.query, "solid state batteries");
        assert_eq!(cli.results, Some(7));
        assert_eq!(cli.tone, Some(ToneArg::Simplified));
        assert_eq!(cli.concurrency, Some(3));
        assert_eq!(cli.out_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cli.serpapi_key.as_deref(), Some("k"));
    }

    #[test]
    fn result_count_is_bounded() {
        assert!(Cli::try_parse_from(["dossier", "q", "-n", "2"]).is_err());
        assert!(Cli::try_parse_from(["dossier", "q", "-n", "11"]).is_err());
        assert!(Cli::try_parse_from(["dossier", "q", "-n", "10"]).is_ok());
    }

    #[test]
    fn query_is_required() {
        assert!(Cli::try_parse_from(["dossier"]).is_err());
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use filefinder::{CliOverrides, Finder, Matches, OsTree, SearchConfig};
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Find files whose content contains a word, printing matches as they are found
#[derive(Parser)]
#[command(name = "ffind", author, version, about, long_about = None)]
struct Cli {
    /// Literal text to look for (case-sensitive, matched per line)
    word: Option<String>,

    /// Root directory to search in
    root: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Show only statistics, not matches
    #[arg(short, long)]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            word: self.word.clone(),
            root_path: self.root.clone(),
            thread_count: self.threads,
            log_level: self.log_level.clone(),
            stats_only: self.stats,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SearchConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.overrides());

    init_tracing(&config.log_level);
    debug!("Using configuration: {:?}", config);

    if config.word.is_empty() {
        anyhow::bail!("no search word given (pass WORD or set `word` in the config file)");
    }
    config.validate()?;

    let finder = Finder::from_config(&config)?;
    let matches = finder
        .find(OsTree::new(&config.root_path), &config.word)
        .with_context(|| format!("cannot search {}", config.root_path.display()))?;

    print_matches(matches, config.stats_only)?;
    debug!("Search finished");
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_matches(mut matches: Matches, stats_only: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut count = 0usize;
    for path in matches.by_ref() {
        count += 1;
        if !stats_only {
            writeln!(out, "{}", path.display())?;
        }
    }

    if stats_only {
        let stats = matches.stats();
        writeln!(
            out,
            "Found {} matching files ({} scanned, {} unreadable, {} skipped directories)",
            count.to_string().green(),
            stats.files_scanned,
            stats.files_failed(),
            stats.subtree_failures
        )?;
    }
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::RangedU64ValueParser;
use dgrep::config::{Config, DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_LINES_PER_FILE};
use dgrep::tui;
use dgrep::utils::{collect_candidates, WalkOptions, DEFAULT_IGNORE_PATTERNS};
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dgrep")]
#[command(about = "Interactive grep that searches as you type")]
struct Cli {
    /// Quiet period after the last keystroke before searching, in milliseconds
    #[arg(long, env = "DGREP_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE_MS,
          value_parser = RangedU64ValueParser::<u64>::new().range(1..))]
    debounce_ms: u64,

    /// Matched lines shown under an open file
    #[arg(long = "lines", env = "DGREP_MAX_LINES_PER_FILE", default_value_t = DEFAULT_MAX_LINES_PER_FILE,
          value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_lines_per_file: usize,

    /// Wrap long lines instead of truncating them around the match
    #[arg(long, env = "DGREP_WHOLE_LINES")]
    whole_lines: bool,

    /// Directory to search (repeatable)
    #[arg(long = "dir", env = "DGREP_DIRS", value_delimiter = ':', default_value = ".")]
    dirs: Vec<PathBuf>,

    /// Only search files whose first line is this shebang (repeatable)
    #[arg(long = "shebang", env = "DGREP_SHEBANGS", value_delimiter = ',')]
    shebangs: Vec<String>,

    /// Glob of files and directories to skip (repeatable, replaces the defaults)
    #[arg(long = "ignore", env = "DGREP_IGNORE", value_delimiter = ',')]
    ignore: Vec<String>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long, env = "DGREP_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            debounce_ms: self.debounce_ms,
            max_lines_per_file: self.max_lines_per_file,
            truncate_lines: !self.whole_lines,
        }
    }

    fn walk_options(&self) -> WalkOptions {
        let ignore = if self.ignore.is_empty() {
            DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect()
        } else {
            self.ignore.clone()
        };

        WalkOptions {
            dirs: self.dirs.clone(),
            shebangs: self.shebangs.clone(),
            ignore,
        }
    }
}

/// Log to `path` when given; otherwise events are dropped
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let candidates = collect_candidates(&cli.walk_options(), io::stderr().is_terminal())?;
    tui::run(candidates, cli.config())
}

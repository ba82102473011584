use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use closest::accuracy::{accuracy_mutating_letters, accuracy_mutating_words, AccuracyOptions};
use closest::utils::{progress, read_word_list, AppConfig};
use closest::{output, ClosestMatch, MatchConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "closest")]
#[command(about = "Fuzzy-match text against a fixed dictionary")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a word list and save it
    Index {
        /// Word list: one key per line, optional tab-separated payload
        wordlist: PathBuf,

        /// Snapshot to write (defaults to the configured snapshot)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// N-gram sizes, comma separated
        #[arg(long, value_delimiter = ',')]
        sizes: Option<Vec<usize>>,

        /// Scoring worker threads (0 = one per CPU)
        #[arg(long)]
        workers: Option<usize>,

        /// No progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Find the closest keys to a query
    Query {
        /// Query text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Snapshot to query
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Number of matches to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Show index statistics
    Stats {
        /// Snapshot to inspect
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Measure how often mutated keys are matched back to themselves
    Accuracy {
        /// Snapshot to test
        #[arg(short, long)]
        index: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Mode::Letters)]
        mode: Mode,

        /// Number of trials
        #[arg(long, default_value_t = 200)]
        trials: usize,

        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Substitute, delete or insert one letter
    Letters,
    /// Drop, reorder and misspell words
    Words,
    Both,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::load()?;

    match cli.command {
        Commands::Index {
            wordlist,
            output,
            sizes,
            workers,
            quiet,
        } => {
            let mut matching = config.matching.clone();
            if let Some(sizes) = sizes {
                matching.substring_sizes = sizes;
            }
            if let Some(workers) = workers {
                matching.workers = workers;
            }
            let output = match output {
                Some(path) => path,
                None => config.effective_snapshot_path()?,
            };
            build_index(&wordlist, &output, &matching, quiet)?;
        }
        Commands::Query {
            query,
            index,
            limit,
            json,
            no_color,
        } => {
            let index = load_index(index, &config)?;
            let query = query.join(" ");
            let matches = index.closest_n(&query, limit.unwrap_or(config.default_limit));
            if json {
                output::print_json(&matches)?;
            } else {
                output::print_matches(&matches, !no_color)?;
            }
        }
        Commands::Stats { index, json } => {
            let path = snapshot_path(index, &config)?;
            // Stats never score, so one worker is enough
            let loaded = ClosestMatch::<String>::load_with_workers(&path, 1)
                .with_context(|| format!("Failed to load index {}", path.display()))?;
            let stats = loaded.stats();
            if json {
                output::print_json(&stats)?;
            } else {
                let bytes = std::fs::metadata(&path).map(|m| m.len()).ok();
                output::print_stats(&stats, bytes);
            }
        }
        Commands::Accuracy {
            index,
            mode,
            trials,
            seed,
        } => {
            let index = load_index(index, &config)?;
            let options = AccuracyOptions { trials, seed };
            if matches!(mode, Mode::Letters | Mode::Both) {
                output::print_accuracy("letters", &accuracy_mutating_letters(&index, &options));
            }
            if matches!(mode, Mode::Words | Mode::Both) {
                output::print_accuracy("words", &accuracy_mutating_words(&index, &options));
            }
        }
    }

    Ok(())
}

fn build_index(
    wordlist: &std::path::Path,
    output: &std::path::Path,
    matching: &MatchConfig,
    quiet: bool,
) -> Result<()> {
    let spinner = progress::spinner("Reading word list...", quiet);
    let words = read_word_list(wordlist)?;
    progress::finish(spinner, format!("Read {} keys", words.entries.len()));
    if words.duplicates > 0 {
        warn!(duplicates = words.duplicates, "skipped repeated keys");
    }

    let spinner = progress::spinner("Building index...", quiet);
    let index = ClosestMatch::with_config(words.entries, matching)
        .context("Failed to build index")?;
    progress::finish(
        spinner,
        format!("Indexed {} substrings", index.stats().substrings),
    );

    index
        .save(output)
        .with_context(|| format!("Failed to save index to {}", output.display()))?;
    info!(path = %output.display(), candidates = index.len(), "index saved");

    if !quiet {
        println!("Index stored at: {}", output.display());
    }
    Ok(())
}

fn snapshot_path(explicit: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => config.effective_snapshot_path(),
    }
}

fn load_index(explicit: Option<PathBuf>, config: &AppConfig) -> Result<ClosestMatch<String>> {
    let path = snapshot_path(explicit, config)?;
    ClosestMatch::<String>::load_with_workers(&path, config.matching.workers)
        .with_context(|| format!("Failed to load index {}", path.display()))
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_flags_after_words() {
        let cli = Cli::try_parse_from(["closest", "query", "new", "york", "-n", "2", "-i", "x.gz"])
            .unwrap();
        match cli.command {
            Commands::Query {
                query,
                index,
                limit,
                ..
            } => {
                assert_eq!(query, vec!["new", "york"]);
                assert_eq!(limit, Some(2));
                assert_eq!(index, Some(PathBuf::from("x.gz")));
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_query_flags_before_words() {
        let cli = Cli::try_parse_from(["closest", "query", "-n", "1", "--json", "pari"]).unwrap();
        match cli.command {
            Commands::Query {
                query, limit, json, ..
            } => {
                assert_eq!(query, vec!["pari"]);
                assert_eq!(limit, Some(1));
                assert!(json);
            }
            _ => panic!("expected query command"),
        }
    }

    #[test]
    fn test_query_requires_text() {
        assert!(Cli::try_parse_from(["closest", "query", "-n", "3"]).is_err());
    }

    #[test]
    fn test_index_sizes_are_comma_separated() {
        let cli = Cli::try_parse_from(["closest", "index", "words.txt", "--sizes", "2,3,4"]).unwrap();
        match cli.command {
            Commands::Index { sizes, .. } => assert_eq!(sizes, Some(vec![2, 3, 4])),
            _ => panic!("expected index command"),
        }
    }
}

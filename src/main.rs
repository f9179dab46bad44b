//! # Comic Archive CLI (`comics`)
//!
//! Browse, search, and analyze a date-indexed comic strip archive.
//!
//! ## Usage
//!
//! ```bash
//! comics --config ./config/comics.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `comics first` / `comics last` | Earliest / latest strip |
//! | `comics get <date>` | Strip for an exact date |
//! | `comics prev <date>` / `comics next <date>` | Nearest strip before / after a date |
//! | `comics random` | A uniformly random strip |
//! | `comics search "<query>"` | Case-insensitive substring search |
//! | `comics stats` | Archive statistics |
//! | `comics analyze` | Yearly sentiment table, chart, and failure report |
//! | `comics serve` | JSON HTTP API for navigation and search |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comic_archive::navigate::Direction;
use comic_archive::progress::ProgressMode;
use comic_archive::{analyze, config, dataset, navigate, search, server, stats};

const DEFAULT_CONFIG: &str = "./config/comics.toml";

/// Comic Archive CLI: browse, search, and analyze a daily comic strip archive.
#[derive(Parser)]
#[command(
    name = "comics",
    about = "Comic Archive: browse, search, and analyze a daily comic strip archive",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/comics.toml`; built-in defaults are used when
    /// that file does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Dataset path, overriding `[dataset].path`.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the earliest comic.
    First,

    /// Show the latest comic.
    Last,

    /// Show the comic for an exact date (YYYY-MM-DD).
    Get { date: String },

    /// Show the nearest comic before a date.
    ///
    /// The date need not exist in the archive. Nothing wraps around:
    /// before the first comic, a boundary message is printed.
    Prev { date: String },

    /// Show the nearest comic after a date.
    Next { date: String },

    /// Show a random comic.
    Random,

    /// Search titles and transcripts.
    Search {
        /// Case-insensitive substring to look for.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// List oldest matches first instead of newest first.
        #[arg(long)]
        oldest_first: bool,
    },

    /// Show archive statistics.
    Stats,

    /// Score every comic's sentiment and aggregate by year.
    ///
    /// Writes the yearly table (CSV), a trend chart (SVG), and a report of
    /// comics that could not be scored. Ctrl-C stops after the current comic
    /// and still writes what was scored.
    Analyze {
        /// Output directory, overriding `[output].dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Score at most this many comics (oldest first).
        #[arg(long)]
        limit: Option<usize>,

        /// Progress output on stderr. Defaults to `human` on a TTY, else `off`.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Start the JSON HTTP API.
    Serve,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "comic_archive=info".into()),
    );

    // Logs go to stderr so stdout stays clean for command output.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let is_default = cli.config == PathBuf::from(DEFAULT_CONFIG);
    let mut cfg = config::load_or_default(&cli.config, is_default)?;
    if let Some(path) = cli.dataset {
        cfg.dataset.path = path;
    }

    let archive = dataset::load_archive(&cfg.dataset.path)?;
    let json = cli.json;

    match cli.command {
        Commands::First => navigate::run_first(&archive, json)?,
        Commands::Last => navigate::run_last(&archive, json)?,
        Commands::Get { date } => navigate::run_get(&archive, &date, json)?,
        Commands::Prev { date } => {
            navigate::run_neighbor(&archive, &date, Direction::Previous, json)?
        }
        Commands::Next { date } => navigate::run_neighbor(&archive, &date, Direction::Next, json)?,
        Commands::Random => navigate::run_random(&archive, json)?,
        Commands::Search {
            query,
            limit,
            oldest_first,
        } => {
            search::run_search(&archive, &cfg, &query, limit, oldest_first, json)?;
        }
        Commands::Stats => stats::run_stats(&archive, &cfg, json)?,
        Commands::Analyze {
            output_dir,
            limit,
            progress,
        } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            analyze::run_analyze(&archive, &cfg, output_dir, limit, mode).await?;
        }
        Commands::Serve => server::run_server(&cfg, archive).await?,
    }

    Ok(())
}

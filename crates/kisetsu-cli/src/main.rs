mod output;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kisetsu_api::traits::Quarter;
use kisetsu_core::config::AppConfig;
use kisetsu_runtime::{AppSession, DbHandle, RuntimeError};

#[derive(Parser)]
#[command(name = "kisetsu")]
#[command(about = "Search AniList and file anime into season buckets", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Indices of search results to add to the collection.
#[derive(Args, Clone)]
struct AddArgs {
    /// Comma-separated result numbers as printed (e.g. 1,3)
    #[arg(short, long, value_delimiter = ',')]
    add: Vec<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search by title
    Search {
        title: String,

        #[command(flatten)]
        add: AddArgs,
    },

    /// Browse what aired in a season
    Season {
        year: u32,

        /// WINTER, SPRING, SUMMER, FALL or 冬/春/夏/秋 (defaults to the current one)
        quarter: Option<Quarter>,

        #[command(flatten)]
        add: AddArgs,
    },

    /// Show the local collection
    List {
        /// Show items of collapsed seasons too
        #[arg(short, long)]
        all: bool,
    },

    /// Show the signed-in user's remote watchlist
    Watchlist,

    /// Print the config file location
    ConfigPath {
        /// Write the default config there if no file exists yet
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "kisetsu=debug" } else { "kisetsu=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands) -> Result<ExitCode, RuntimeError> {
    if let Commands::ConfigPath { init } = command {
        let path = AppConfig::config_path();
        if init && !path.exists() {
            AppConfig::default()
                .save()
                .map_err(|e| RuntimeError::Config(e.to_string()))?;
            tracing::info!(path = %path.display(), "Wrote default config");
        }
        println!("{}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = AppConfig::load().map_err(|e| RuntimeError::Config(e.to_string()))?;
    let db_path = AppConfig::ensure_db_path().map_err(|e| RuntimeError::Database(e.to_string()))?;
    let db = DbHandle::open(&db_path)?;
    let mut session = AppSession::from_config(&config)?.with_db(db).await?;

    match command {
        Commands::Search { title, add } => {
            let results = session.search_title(&title).await;
            output::print_results(results);
            Ok(submit(&mut session, &add).await)
        }
        Commands::Season { year, quarter, add } => {
            let quarter = quarter.unwrap_or_else(Quarter::current);
            let results = session.search_season(quarter, year).await;
            output::print_results(results);
            Ok(submit(&mut session, &add).await)
        }
        Commands::List { all } => {
            output::print_collection(session.collection(), session.expanded(), all);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Watchlist => {
            let rows = session.fetch_watchlist().await?;
            output::print_watchlist(&rows);
            Ok(ExitCode::SUCCESS)
        }
        Commands::ConfigPath { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Add the chosen results. A failed sync is reported and gives a non-zero
/// exit code, but the local merge has already been kept.
async fn submit(session: &mut AppSession, add: &AddArgs) -> ExitCode {
    if add.add.is_empty() {
        return ExitCode::SUCCESS;
    }
    let selection = to_selection(&add.add);
    let submission = session.submit(&selection).await;
    output::print_submission(&submission);

    let mut code = ExitCode::SUCCESS;
    if let Err(e) = submission.sync.into_result() {
        eprintln!("{e}");
        code = ExitCode::FAILURE;
    }
    if let Some(err) = &submission.persist_error {
        eprintln!("Could not save collection: {err}");
        code = ExitCode::FAILURE;
    }
    code
}

/// Convert printed result numbers (starting at 1) to indices.
fn to_selection(numbers: &[usize]) -> Vec<usize> {
    numbers
        .iter()
        .filter_map(|&n| {
            let index = n.checked_sub(1);
            if index.is_none() {
                tracing::warn!(number = n, "Result numbers start at 1, skipping");
            }
            index
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_zero_based() {
        assert_eq!(to_selection(&[1, 3, 3]), vec![0, 2, 2]);
    }

    #[test]
    fn test_selection_skips_zero() {
        assert_eq!(to_selection(&[0, 2]), vec![1]);
        assert!(to_selection(&[0]).is_empty());
    }

    #[test]
    fn test_config_path_init_flag() {
        let cli = Cli::try_parse_from(["kisetsu", "config-path", "--init"]).unwrap();
        assert!(matches!(cli.command, Commands::ConfigPath { init: true }));
    }

    #[test]
    fn test_add_list_parses() {
        let cli = Cli::try_parse_from(["kisetsu", "season", "2024", "夏", "--add", "1,2"]).unwrap();
        match cli.command {
            Commands::Season { year, quarter, add } => {
                assert_eq!(year, 2024);
                assert_eq!(quarter, Some(Quarter::Summer));
                assert_eq!(add.add, vec![1, 2]);
            }
            _ => panic!("expected season command"),
        }
    }
}

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use capa_score::ledger::{items_for, save_ledger, LedgerFile};
use capa_score::output::{self, OutputFormat};
use capa_score::records::{load_snapshot, parse_date, RawRecord, RecordFilter, StatusScope};
use capa_score::{compute_scorecard, EngineOptions, Scorecard};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Action snapshot (JSON array of records)
    #[arg(long)]
    actions: PathBuf,

    /// Analysis snapshot (JSON array of records)
    #[arg(long)]
    analyses: Option<PathBuf>,

    /// Reference date for lateness and aging (defaults to today)
    #[arg(long, value_parser = parse_date_arg)]
    as_of: Option<NaiveDate>,

    /// Only score records created on or after this date
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Only score records created on or before this date
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,

    /// Status scope: all, open, closed
    #[arg(long, default_value = "all")]
    scope: String,

    /// Drop records without a champion from the leaderboard
    #[arg(long)]
    no_unassigned: bool,

    /// Score actions only
    #[arg(long)]
    no_analyses: bool,

    /// Output format: table, tsv, json
    #[arg(long, default_value = "table")]
    format: String,

    /// Write an audit copy of the ledger to this file
    #[arg(long)]
    ledger_out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the champion leaderboard
    Rank(InputArgs),
    /// Print every score event of the run
    Ledger(InputArgs),
    /// Print one champion's per-item breakdown
    Champion {
        /// Champion id, label, or identity key (e.g. "id:7")
        key: String,

        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Parser, Debug)]
#[command(name = "capa-score")]
#[command(about = "CAPA champion scoring and leaderboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/capa-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("CAPA_SCORE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Logs go to stderr, results to stdout.
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn load_rows(path: &Path) -> Vec<RawRecord> {
    match load_snapshot(path) {
        Ok(rows) => {
            tracing::debug!(path = %path.display(), rows = rows.len(), "loaded snapshot");
            rows
        }
        Err(e) => {
            eprintln!("Input error: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start_time = Instant::now();

    // Load and validate config
    let config_path = cli.config.map(PathBuf::from);
    let config = match capa_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    let mut options = match EngineOptions::from_config(&config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let (input, champion_key) = match &cli.command {
        Commands::Rank(input) | Commands::Ledger(input) => (input, None),
        Commands::Champion { key, input } => (input, Some(key.as_str())),
    };

    let format: OutputFormat = match input.format.parse() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Input error: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    };
    let scope: StatusScope = match input.scope.parse() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Input error: {}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    // Command-line flags narrow what the config allows
    options.filter = RecordFilter {
        created_from: input.from,
        created_to: input.to,
        scope,
    };
    if input.no_unassigned {
        options.aggregate.include_unassigned = false;
    }
    if input.no_analyses {
        options.rules.analyses_enabled = false;
    }

    let action_rows = load_rows(&input.actions);
    let analysis_rows = match (&input.analyses, options.rules.analyses_enabled) {
        (Some(path), true) => load_rows(path),
        _ => Vec::new(),
    };

    // The only wall-clock read; the engine itself takes the date as input.
    let as_of = input
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let card = compute_scorecard(&action_rows, &analysis_rows, as_of, &options);
    for warning in &card.warnings {
        tracing::warn!("{}", warning);
    }

    if let Some(ref path) = input.ledger_out {
        let file = LedgerFile::new(as_of, card.ledger.clone());
        if let Err(e) = save_ledger(path, &file) {
            eprintln!("Failed to write ledger: {}", e);
            std::process::exit(EXIT_INPUT);
        }
        tracing::info!(path = %path.display(), events = card.ledger.len(), "wrote ledger");
    }

    let use_colors = output::should_use_colors();
    let rendered = match &cli.command {
        Commands::Rank(_) => render_ranking(&card, format, use_colors),
        Commands::Ledger(_) => render_ledger(&card, format, use_colors),
        Commands::Champion { .. } => {
            render_champion(&card, champion_key.unwrap_or_default(), format, use_colors)
        }
    };
    match rendered {
        Ok(text) => {
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(EXIT_INPUT);
        }
    }

    tracing::debug!(
        champions = card.ranking.len(),
        events = card.ledger.len(),
        elapsed = ?start_time.elapsed(),
        "done"
    );
    std::process::exit(EXIT_SUCCESS);
}

fn render_ranking(card: &Scorecard, format: OutputFormat, use_colors: bool) -> Result<String, String> {
    match format {
        OutputFormat::Table => Ok(output::format_ranking_table(&card.ranking, use_colors)),
        OutputFormat::Tsv => Ok(output::format_ranking_tsv(&card.ranking)),
        OutputFormat::Json => output::format_json(&card.ranking).map_err(|e| e.to_string()),
    }
}

fn render_ledger(card: &Scorecard, format: OutputFormat, use_colors: bool) -> Result<String, String> {
    match format {
        OutputFormat::Table => Ok(output::format_ledger_table(&card.ledger, use_colors)),
        OutputFormat::Tsv => Ok(output::format_ledger_tsv(&card.ledger)),
        OutputFormat::Json => output::format_json(&card.ledger).map_err(|e| e.to_string()),
    }
}

fn render_champion(
    card: &Scorecard,
    key: &str,
    format: OutputFormat,
    use_colors: bool,
) -> Result<String, String> {
    let Some(ranked) = capa_score::leaderboard::find_champion(&card.ranking, key) else {
        return Err(format!("No champion matching '{}'.", key));
    };
    let items = items_for(&card.items, &ranked.summary.champion.key);

    match format {
        OutputFormat::Table | OutputFormat::Tsv => {
            Ok(output::format_champion_detail(ranked, &items, use_colors))
        }
        OutputFormat::Json => {
            let detail = serde_json::json!({
                "champion": ranked,
                "items": items,
            });
            output::format_json(&detail).map_err(|e| e.to_string())
        }
    }
}

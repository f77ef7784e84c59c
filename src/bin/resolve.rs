//! Resolve a single action against a board snapshot
//!
//! Reads a board and an action request as JSON, resolves the action with a
//! seeded roller and prints the result as JSON. Diffs are not applied unless
//! `--apply` is given, in which case the updated board is printed as well.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tabletop_rules::{ActionRequest, BoardSnapshot, ResolutionResult, Result, RulesConfig, RulesEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "resolve")]
#[command(about = "Resolve one action against a board snapshot and print the result as JSON")]
struct Args {
    /// Board snapshot JSON file
    #[arg(long)]
    board: PathBuf,

    /// Action request JSON file
    #[arg(long)]
    action: PathBuf,

    /// Dice seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Rules config TOML file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also print the board with the diffs applied
    #[arg(long)]
    apply: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Output {
    seed: u64,
    result: ResolutionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    board: Option<BoardSnapshot>,
}

fn run(args: &Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => RulesConfig::load(path)?,
        None => RulesConfig::default(),
    };
    let engine = RulesEngine::new(config)?;

    let board = BoardSnapshot::from_json(&std::fs::read_to_string(&args.board)?)?;
    let request: ActionRequest = serde_json::from_str(&std::fs::read_to_string(&args.action)?)?;

    tracing::info!(action = request.name(), seed = args.seed, "resolving");
    let result = engine.resolve_seeded(&board, &request, args.seed);

    let updated = if args.apply && result.success {
        Some(board.apply_diffs(&result.diffs)?)
    } else {
        None
    };

    let output = Output { seed: args.seed, result, board: updated };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    Ok(json)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabletop_rules=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

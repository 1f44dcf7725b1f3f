//! CLI argument parsing for query validation, rendering and surveys.
//!
//! The CLI stays thin: each command loads the query file, hands it to the
//! library modules and prints what they return.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "qsurvey",
    version,
    about = "Template-driven survey queries for election evaluations",
    after_help = "Examples:\n  qsurvey validate --queries evals.json\n  qsurvey render --player \"Alex Smith\" --prompt\n  qsurvey survey --player Alex --player Sam --responder 'ollama run llama3' --out returns.jsonl\n  qsurvey stub > evals.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug-level logs on stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Validate(ValidateArgs),
    Render(RenderArgs),
    Survey(SurveyArgs),
    Stub(StubArgs),
}

/// Validate command inputs.
#[derive(Parser, Debug)]
#[command(about = "Load a query file and check templates and queries")]
pub struct ValidateArgs {
    /// Query file (defaults to the bundled election queries)
    #[arg(long, value_name = "FILE")]
    pub queries: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Render command inputs for previewing resolved queries.
#[derive(Parser, Debug)]
#[command(about = "Resolve every query for one player")]
pub struct RenderArgs {
    /// Query file (defaults to the bundled election queries)
    #[arg(long, value_name = "FILE")]
    pub queries: Option<PathBuf>,

    /// Player name bound to the `playername` label
    #[arg(long, value_name = "NAME")]
    pub player: String,

    /// Extra dynamic label values
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Print the full framed prompt sent to subjects
    #[arg(long)]
    pub prompt: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Survey command inputs.
#[derive(Parser, Debug)]
#[command(about = "Ask every query of every player through a responder command")]
pub struct SurveyArgs {
    /// Query file (defaults to the bundled election queries)
    #[arg(long, value_name = "FILE")]
    pub queries: Option<PathBuf>,

    /// Player to survey (repeatable)
    #[arg(long = "player", value_name = "NAME", required = true)]
    pub players: Vec<String>,

    /// Extra dynamic label values shared by all players
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Responder command; reads the prompt on stdin, replies on stdout
    #[arg(long, value_name = "CMD")]
    pub responder: Option<String>,

    /// Maximum players surveyed at once (defaults to the CPU count)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Output path for JSONL records (stdout when omitted)
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

/// Stub command inputs.
#[derive(Parser, Debug)]
#[command(about = "Print the bundled election query file")]
pub struct StubArgs {
    /// Write to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE (got {raw:?})"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

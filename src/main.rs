use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::fmt::Write as _;
use tracing_subscriber::EnvFilter;

mod answer;
mod cli;
mod config;
mod error;
mod output;
mod query;
mod registry;
mod resolve;
mod responder;
mod schema;
mod survey;
mod template;
mod templates;
mod util;

use cli::{Command, RenderArgs, RootArgs, StubArgs, SurveyArgs, ValidateArgs};
use config::{load_config, EvaluationConfig};
use registry::BraceStyleWarning;
use resolve::{ResolvedQuery, RuntimeContext};
use responder::CommandResponder;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Validate(args) => cmd_validate(args),
        Command::Render(args) => cmd_render(args),
        Command::Survey(args) => cmd_survey(args),
        Command::Stub(args) => cmd_stub(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[derive(Serialize)]
struct ValidationSummary {
    templates: Vec<TemplateSummary>,
    queries: Vec<QuerySummary>,
    warnings: Vec<BraceStyleWarning>,
}

#[derive(Serialize)]
struct TemplateSummary {
    name: String,
    static_labels: Vec<String>,
    dynamic_labels: Vec<String>,
}

#[derive(Serialize)]
struct QuerySummary {
    index: String,
    query_type: String,
}

fn validation_summary(config: &EvaluationConfig) -> ValidationSummary {
    ValidationSummary {
        templates: config
            .registry()
            .iter()
            .map(|template| TemplateSummary {
                name: template.name.clone(),
                static_labels: template.static_labels.iter().cloned().collect(),
                dynamic_labels: template.dynamic_labels.iter().cloned().collect(),
            })
            .collect(),
        queries: config
            .queries()
            .iter()
            .map(|query| QuerySummary {
                index: query.index.clone(),
                query_type: query.query_type.clone(),
            })
            .collect(),
        warnings: config.brace_style_warnings(),
    }
}

fn cmd_validate(args: ValidateArgs) -> Result<()> {
    let config = load_config(args.queries.as_deref())?;
    let summary = validation_summary(&config);
    if args.json {
        return output::emit_json(None, &summary);
    }

    let mut text = String::new();
    writeln!(
        text,
        "OK: {} templates, {} queries",
        summary.templates.len(),
        summary.queries.len()
    )?;
    for query in &summary.queries {
        writeln!(text, "  {:>4}  {}", query.index, query.query_type)?;
    }
    for warning in &summary.warnings {
        writeln!(
            text,
            "warning: template {:?} writes {:?} label {:?} with {:?} braces",
            warning.template, warning.declared, warning.label, warning.style
        )?;
    }
    output::emit(None, &text)
}

fn runtime_context(player: Option<&str>, vars: &[(String, String)]) -> RuntimeContext {
    let base: RuntimeContext = vars.iter().cloned().collect();
    match player {
        Some(player) => base.with(resolve::PLAYER_NAME_LABEL, player),
        None => base,
    }
}

#[derive(Serialize)]
struct RenderedQuery {
    #[serde(flatten)]
    resolved: ResolvedQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<String>,
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let config = load_config(args.queries.as_deref())?;
    let context = runtime_context(Some(args.player.as_str()), &args.vars);
    let mut rendered = Vec::new();
    for resolved in config.resolve_all(&context)? {
        let prompt = if args.prompt {
            Some(resolved.prompt(&context)?)
        } else {
            None
        };
        rendered.push(RenderedQuery { resolved, prompt });
    }
    if args.json {
        return output::emit_json(None, &rendered);
    }

    let mut text = String::new();
    for item in &rendered {
        writeln!(
            text,
            "## {} ({})",
            item.resolved.index, item.resolved.query_type
        )?;
        match &item.prompt {
            Some(prompt) => text.push_str(prompt),
            None => {
                text.push_str(&item.resolved.premise);
                text.push_str(&item.resolved.question);
            }
        }
        if !text.ends_with('\n') {
            text.push('\n');
        }
    }
    output::emit(None, &text)
}

fn cmd_survey(args: SurveyArgs) -> Result<()> {
    let config = load_config(args.queries.as_deref())?;
    let responder = CommandResponder::resolve(args.responder.as_deref())?;
    let context = runtime_context(None, &args.vars);
    let jobs = args.jobs.map(usize::from);
    let records = survey::run_survey(&config, &args.players, &context, &responder, jobs)?;
    let text = output::to_json_lines(&records)?;
    output::emit(args.out.as_deref(), &text)?;
    if let Some(out) = &args.out {
        tracing::info!(records = records.len(), path = %out.display(), "survey records written");
    }
    Ok(())
}

fn cmd_stub(args: StubArgs) -> Result<()> {
    output::emit(args.out.as_deref(), templates::ELECTION_QUERIES_JSON)
}

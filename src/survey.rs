//! Survey runner: every query, for every player, through a responder.
//!
//! Players are surveyed concurrently on a bounded rayon pool. The config is
//! shared read-only; each player's queries run in config order and the
//! records come back grouped by player in argument order.
use crate::answer::{parse_answer, strip_speaker, Answer};
use crate::config::EvaluationConfig;
use crate::query::QueryInstance;
use crate::resolve::{RuntimeContext, PLAYER_NAME_LABEL};
use crate::responder::Responder;
use crate::util::truncate_string;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

const RESPONSE_PREVIEW_BYTES: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyRecord {
    pub player: String,
    /// Query type, used as the record label by downstream dashboards.
    pub label: String,
    pub index: String,
    pub data: SurveyData,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyData {
    pub query_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub interaction_premise_template: BTreeMap<String, String>,
    pub query_return: Option<Answer>,
}

/// Run every query for every player and collect one record per pair.
///
/// At most `jobs` players are in flight at once; `None` sizes the pool to the
/// available CPUs.
pub fn run_survey(
    config: &EvaluationConfig,
    players: &[String],
    base_context: &RuntimeContext,
    responder: &dyn Responder,
    jobs: Option<usize>,
) -> Result<Vec<SurveyRecord>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .thread_name(|i| format!("qsurvey-survey-{i}"))
        .build()
        .context("build survey thread pool")?;
    tracing::debug!(
        players = players.len(),
        threads = pool.current_num_threads(),
        "survey pool ready"
    );

    let per_player: Vec<Result<Vec<SurveyRecord>>> = pool.install(|| {
        players
            .par_iter()
            .map(|player| survey_player(config, player, base_context, responder))
            .collect()
    });

    let mut records = Vec::new();
    for result in per_player {
        records.extend(result?);
    }
    Ok(records)
}

fn survey_player(
    config: &EvaluationConfig,
    player: &str,
    base_context: &RuntimeContext,
    responder: &dyn Responder,
) -> Result<Vec<SurveyRecord>> {
    let context = base_context.clone().with(PLAYER_NAME_LABEL, player);
    let resolver = config.resolver();
    let mut records = Vec::with_capacity(config.queries().len());
    for query in config.queries() {
        let resolved = resolver
            .resolve(query, &context)
            .with_context(|| format!("resolve query {} for {player}", query.index))?;
        let prompt = resolved.prompt(&context)?;
        let response = responder
            .respond(player, query, &prompt)
            .with_context(|| format!("ask {player} query {}", query.index))?;
        records.push(record(player, query, response));
    }
    let answered = records
        .iter()
        .filter(|record| record.data.query_return.is_some())
        .count();
    tracing::info!(
        player,
        queries = records.len(),
        answered,
        "player survey complete"
    );
    Ok(records)
}

fn record(player: &str, query: &QueryInstance, response: String) -> SurveyRecord {
    let query_return = parse_answer(query, strip_speaker(player, &response));
    tracing::debug!(
        player,
        index = %query.index,
        response = %truncate_string(response.trim(), RESPONSE_PREVIEW_BYTES),
        parsed = query_return.is_some(),
        "response parsed"
    );
    SurveyRecord {
        player: player.to_string(),
        label: query.query_type.clone(),
        index: query.index.clone(),
        data: SurveyData {
            query_type: query.query_type.clone(),
            interaction_premise_template: query.static_values.clone(),
            query_return,
        },
        response,
    }
}

#[cfg(test)]
#[path = "survey_tests.rs"]
mod tests;

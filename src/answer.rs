//! Response parsing for the election query types.
//!
//! Parsing is keyword based: it looks for a candidate name, a score or a
//! yes/no token in the free-form reply and gives up otherwise.
use crate::query::QueryInstance;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// First name of the chosen candidate.
    Candidate(String),
    /// Favorability score in 1..=10.
    Score(u8),
    /// Whether the subject intends to vote.
    Intent(bool),
}

impl Answer {
    pub fn as_label(&self) -> String {
        match self {
            Self::Candidate(name) => name.clone(),
            Self::Score(score) => score.to_string(),
            Self::Intent(true) => "Yes".to_string(),
            Self::Intent(false) => "No".to_string(),
        }
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_label())
    }
}

fn score_regex() -> &'static Regex {
    static SCORE: OnceLock<Regex> = OnceLock::new();
    SCORE.get_or_init(|| Regex::new(r"\b([1-9]|10)\b").expect("regex for favorability score"))
}

/// Drop the `{player} --` speaker tag the call-to-speech asks subjects to
/// lead with, so a player's own name is never read as part of the answer.
pub fn strip_speaker<'r>(player: &str, response: &'r str) -> &'r str {
    let trimmed = response.trim_start();
    trimmed
        .strip_prefix(player)
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix("--"))
        .map(str::trim_start)
        .unwrap_or(response)
}

/// Parse a free-form response for the given query.
pub fn parse_answer(query: &QueryInstance, response: &str) -> Option<Answer> {
    match query.query_type.as_str() {
        "vote_pref" => parse_vote_pref(query, response),
        "favorability" => parse_score(response),
        "vote_intent" => parse_intent(response),
        other => {
            tracing::warn!(query_type = other, index = %query.index, "no answer parser for query type");
            None
        }
    }
}

fn parse_vote_pref(query: &QueryInstance, response: &str) -> Option<Answer> {
    ["candidate1", "candidate2"]
        .iter()
        .filter_map(|label| query.static_value(label))
        .find_map(|candidate| {
            let tokens: Vec<&str> = candidate.split_whitespace().take(2).collect();
            let first = tokens.first()?;
            tokens
                .iter()
                .any(|token| response.contains(token))
                .then(|| Answer::Candidate(first.to_string()))
        })
}

fn parse_score(response: &str) -> Option<Answer> {
    let found = score_regex().find(response)?;
    found.as_str().parse().ok().map(Answer::Score)
}

fn parse_intent(response: &str) -> Option<Answer> {
    let lower = response.to_lowercase();
    if lower.contains("yes") {
        Some(Answer::Intent(true))
    } else if lower.contains("no") {
        Some(Answer::Intent(false))
    } else {
        None
    }
}

use super::run_survey;
use crate::answer::Answer;
use crate::config::EvaluationConfig;
use crate::query::QueryInstance;
use crate::resolve::RuntimeContext;
use crate::responder::Responder;
use crate::templates;
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Replies by query type and remembers every prompt it was shown.
struct ScriptedResponder {
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedResponder {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl Responder for ScriptedResponder {
    fn respond(&self, player: &str, query: &QueryInstance, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push((player.to_string(), prompt.to_string()));
        let reply = match query.query_type.as_str() {
            "vote_pref" if player == "Alex" => "Bill, no doubt",
            "vote_pref" => "Carter",
            "favorability" => "8",
            _ => "yes",
        };
        Ok(format!("{player} -- \"{reply}\""))
    }
}

/// Replies with text no parser can read.
struct MumblingResponder;

impl Responder for MumblingResponder {
    fn respond(&self, player: &str, _query: &QueryInstance, _prompt: &str) -> Result<String> {
        Ok(format!("{player} -- \"hmm, hard to say\""))
    }
}

/// Tracks how many calls are in flight at once.
#[derive(Default)]
struct CountingResponder {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Responder for CountingResponder {
    fn respond(&self, _player: &str, _query: &QueryInstance, _prompt: &str) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(2));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok("yes".to_string())
    }
}

struct FailingResponder;

impl Responder for FailingResponder {
    fn respond(&self, _player: &str, query: &QueryInstance, _prompt: &str) -> Result<String> {
        if query.query_type == "favorability" {
            return Err(anyhow!("subject unavailable"));
        }
        Ok("yes".to_string())
    }
}

fn election_config() -> EvaluationConfig {
    EvaluationConfig::from_json(templates::ELECTION_QUERIES_JSON).expect("bundled config")
}

#[test]
fn survey_records_follow_player_then_query_order() {
    let config = election_config();
    let players = vec!["Alex".to_string(), "Sam".to_string()];
    let responder = ScriptedResponder::new();
    let records = run_survey(&config, &players, &RuntimeContext::default(), &responder, None)
        .expect("survey runs");

    let order: Vec<(&str, &str)> = records
        .iter()
        .map(|record| (record.player.as_str(), record.index.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Alex", "0"),
            ("Alex", "1"),
            ("Alex", "2"),
            ("Alex", "3"),
            ("Sam", "0"),
            ("Sam", "1"),
            ("Sam", "2"),
            ("Sam", "3"),
        ]
    );
    assert_eq!(
        records[0].data.query_return,
        Some(Answer::Candidate("Bill".to_string()))
    );
    assert_eq!(
        records[4].data.query_return,
        Some(Answer::Candidate("Bradley".to_string()))
    );
    assert_eq!(records[1].data.query_return, Some(Answer::Score(8)));
    assert_eq!(records[3].data.query_return, Some(Answer::Intent(true)));
    assert_eq!(records[2].label, "favorability");
    assert_eq!(
        records[2].data.interaction_premise_template.get("candidate"),
        Some(&"Bradley Carter".to_string())
    );
}

#[test]
fn each_player_sees_their_own_name_in_prompts() {
    let config = election_config();
    let players = vec!["Alex".to_string(), "Sam".to_string()];
    let responder = ScriptedResponder::new();
    run_survey(&config, &players, &RuntimeContext::default(), &responder, None).expect("survey runs");

    let prompts = responder.prompts.lock().expect("prompt log lock");
    assert_eq!(prompts.len(), 8);
    for (player, prompt) in prompts.iter() {
        assert!(prompt.starts_with("Context: "), "{prompt}");
        assert!(
            prompt.contains(&format!("what is {player} likely to say next?")),
            "{prompt}"
        );
    }
}

#[test]
fn record_serializes_parsed_answers_as_labels() {
    let config = election_config();
    let players = vec!["Alex".to_string()];
    let records = run_survey(&config, &players, &RuntimeContext::default(), &ScriptedResponder::new(), None)
        .expect("survey runs");
    let json = serde_json::to_value(&records[3]).expect("serialize record");
    assert_eq!(json["label"], "vote_intent");
    assert_eq!(json["data"]["query_return"], "Yes");
    assert!(json["data"].get("interaction_premise_template").is_none());

    let vote = serde_json::to_value(&records[0]).expect("serialize record");
    assert_eq!(
        vote["data"]["interaction_premise_template"]["candidate2"],
        "Bradley Carter"
    );
}

#[test]
fn record_serializes_with_null_for_unparsed_answers() {
    let config = election_config();
    let players = vec!["Alex".to_string()];
    let records = run_survey(&config, &players, &RuntimeContext::default(), &MumblingResponder, None)
        .expect("survey runs");
    assert_eq!(records.len(), 4);
    for record in &records {
        assert_eq!(record.data.query_return, None, "query {}", record.index);
        let json = serde_json::to_value(record).expect("serialize record");
        assert!(
            json["data"]["query_return"].is_null(),
            "{} query_return: {}",
            record.label,
            json["data"]["query_return"]
        );
        assert_eq!(json["response"], "Alex -- \"hmm, hard to say\"");
    }
}

#[test]
fn concurrent_players_stay_within_job_limit() {
    let config = election_config();
    let players: Vec<String> = (0..24).map(|i| format!("Player{i}")).collect();
    let responder = CountingResponder::default();
    let records = run_survey(&config, &players, &RuntimeContext::default(), &responder, Some(3))
        .expect("survey runs");
    assert_eq!(records.len(), 24 * 4);
    assert_eq!(records[4].player, "Player1");
    assert_eq!(records[95].player, "Player23");
    let peak = responder.peak.load(Ordering::SeqCst);
    assert!((1..=3).contains(&peak), "peak concurrent calls {peak}");
}

#[test]
fn responder_failure_names_player_and_query() {
    let config = election_config();
    let players = vec!["Alex".to_string()];
    let err = run_survey(&config, &players, &RuntimeContext::default(), &FailingResponder, None)
        .expect_err("favorability fails");
    let message = format!("{err:#}");
    assert!(message.contains("ask Alex query 1"), "{message}");
    assert!(message.contains("subject unavailable"), "{message}");
}

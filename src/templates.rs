pub const ELECTION_QUERIES_JSON: &str = include_str!("../data/election_queries.json");
/// Closing instruction appended to every survey prompt.
pub const CALL_TO_SPEECH: &str = include_str!("../data/call_to_speech.txt");

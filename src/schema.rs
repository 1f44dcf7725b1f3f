//! Document types for the query file format.
//!
//! These mirror the JSON layout one-to-one; validation and ordering happen in
//! `config` once the document is parsed.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryFile {
    pub query_lib: BTreeMap<String, QueryTemplateDoc>,
    #[serde(default)]
    pub queries_data: BTreeMap<String, QueryDataDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryTemplateDoc {
    pub question_template: QuestionTemplateDoc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_premise_template: Option<PremiseTemplateDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTemplateDoc {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiseTemplateDoc {
    pub text: String,
    #[serde(default)]
    pub static_labels: Vec<String>,
    #[serde(default)]
    pub dynamic_labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDataDoc {
    pub query_type: String,
    /// Static label values keyed by label name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_premise_template: Option<BTreeMap<String, String>>,
}

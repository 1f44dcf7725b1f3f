//! Error taxonomy for query files.
//!
//! Every variant is a configuration fault surfaced at load or resolve time.
//! None of them are transient, so callers never retry.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Template text and declared labels disagree, or the labels themselves
    /// are inconsistent.
    #[error("malformed template {template:?}: {reason}")]
    MalformedTemplate { template: String, reason: String },

    /// A query references a template name missing from `query_lib`.
    #[error("query {query:?} references unknown template {query_type:?}")]
    UnknownTemplate { query: String, query_type: String },

    #[error("query {query:?} is missing static value {label:?}")]
    MissingStaticValue { query: String, label: String },

    #[error("query {query:?} supplies unexpected static value {label:?}")]
    UnexpectedStaticValue { query: String, label: String },

    /// The runtime context lacks a value for a dynamic label.
    #[error("runtime context is missing dynamic value {label:?}")]
    MissingDynamicValue { label: String },

    #[error("parse query file JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl QueryError {
    pub(crate) fn malformed(template: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

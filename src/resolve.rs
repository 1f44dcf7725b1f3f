//! Query resolution against a runtime context.
//!
//! Resolution is a pure function of the query, its template and the context;
//! nothing is retained between calls, so one resolver can be shared freely
//! across threads.
use crate::error::QueryError;
use crate::query::QueryInstance;
use crate::registry::{LabelKind, TemplateRegistry};
use crate::template::TemplateText;
use crate::templates;
use serde::Serialize;
use std::collections::BTreeMap;

/// Dynamic label the survey runner always provides.
pub const PLAYER_NAME_LABEL: &str = "playername";

/// Values for dynamic labels, supplied at resolution time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeContext {
    values: BTreeMap<String, String>,
}

impl RuntimeContext {
    pub fn with(mut self, label: &str, value: &str) -> Self {
        self.values.insert(label.to_string(), value.to_string());
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    fn require(&self, label: &str) -> Result<String, QueryError> {
        self.get(label)
            .map(str::to_string)
            .ok_or_else(|| QueryError::MissingDynamicValue {
                label: label.to_string(),
            })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuntimeContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Fully substituted text for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
    pub index: String,
    pub query_type: String,
    /// Empty when the template has no interaction premise.
    pub premise: String,
    pub question: String,
}

impl ResolvedQuery {
    /// Frame the resolved text the way it is presented to a subject:
    /// `Context: ` + premise + question + the call-to-speech instruction.
    pub fn prompt(&self, context: &RuntimeContext) -> Result<String, QueryError> {
        let call_to_speech = TemplateText::compile(templates::CALL_TO_SPEECH)
            .render(|label| context.require(label))?;
        Ok(format!(
            "Context: {}{}{}",
            self.premise, self.question, call_to_speech
        ))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a TemplateRegistry,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(
        &self,
        query: &QueryInstance,
        context: &RuntimeContext,
    ) -> Result<ResolvedQuery, QueryError> {
        let template = query.template(self.registry)?;
        let lookup = |label: &str| -> Result<String, QueryError> {
            match template.label_kind(label) {
                Some(LabelKind::Static) => query
                    .static_value(label)
                    .map(str::to_string)
                    .ok_or_else(|| QueryError::MissingStaticValue {
                        query: query.index.clone(),
                        label: label.to_string(),
                    }),
                Some(LabelKind::Dynamic) => context.require(label),
                None => Err(QueryError::malformed(
                    &template.name,
                    format!("placeholder {{{label}}} is not a declared static or dynamic label"),
                )),
            }
        };
        let premise = match &template.premise {
            Some(premise) => premise.render(lookup)?,
            None => String::new(),
        };
        let question = template.question.render(lookup)?;
        tracing::debug!(
            index = %query.index,
            query_type = %query.query_type,
            "query resolved"
        );
        Ok(ResolvedQuery {
            index: query.index.clone(),
            query_type: query.query_type.clone(),
            premise,
            question,
        })
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;

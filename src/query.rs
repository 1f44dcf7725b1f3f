//! Query instances and static-value validation.
use crate::error::QueryError;
use crate::registry::{QueryTemplate, TemplateRegistry};
use crate::schema::QueryDataDoc;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One concrete use of a template within the ordered evaluation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryInstance {
    pub index: String,
    pub query_type: String,
    pub static_values: BTreeMap<String, String>,
}

impl QueryInstance {
    pub fn from_doc(index: &str, doc: &QueryDataDoc) -> Self {
        Self {
            index: index.to_string(),
            query_type: doc.query_type.clone(),
            static_values: doc.interaction_premise_template.clone().unwrap_or_default(),
        }
    }

    /// Check that the supplied static values cover exactly the template's
    /// static labels.
    pub fn validate_against(&self, template: &QueryTemplate) -> Result<(), QueryError> {
        if let Some(label) = template
            .static_labels
            .iter()
            .find(|label| !self.static_values.contains_key(*label))
        {
            return Err(QueryError::MissingStaticValue {
                query: self.index.clone(),
                label: label.clone(),
            });
        }
        if let Some(label) = self
            .static_values
            .keys()
            .find(|label| !template.static_labels.contains(*label))
        {
            return Err(QueryError::UnexpectedStaticValue {
                query: self.index.clone(),
                label: label.clone(),
            });
        }
        Ok(())
    }

    /// Resolve the referenced template and validate against it.
    pub fn template<'r>(
        &self,
        registry: &'r TemplateRegistry,
    ) -> Result<&'r QueryTemplate, QueryError> {
        let template = registry.get(&self.index, &self.query_type)?;
        self.validate_against(template)?;
        Ok(template)
    }

    pub fn static_value(&self, label: &str) -> Option<&str> {
        self.static_values.get(label).map(String::as_str)
    }
}

/// Presentation order for `queries_data` keys: integer keys ascending, then
/// any other keys lexicographically.
pub fn compare_indices(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;

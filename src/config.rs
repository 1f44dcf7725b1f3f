//! Evaluation config loading.
//!
//! The query file is parsed and validated as a whole: either every template
//! and every query checks out, or the first problem is returned.
use crate::error::QueryError;
use crate::query::{compare_indices, QueryInstance};
use crate::registry::{BraceStyleWarning, QueryTemplate, TemplateRegistry};
use crate::resolve::{ResolvedQuery, Resolver, RuntimeContext};
use crate::schema::QueryFile;
use crate::templates;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Templates plus the ordered query sequence. Immutable after load.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    registry: TemplateRegistry,
    queries: Vec<QueryInstance>,
}

impl EvaluationConfig {
    pub fn from_json(text: &str) -> Result<Self, QueryError> {
        let file: QueryFile = serde_json::from_str(text)?;
        Self::from_file(&file)
    }

    pub fn from_file(file: &QueryFile) -> Result<Self, QueryError> {
        let registry = TemplateRegistry::from_docs(&file.query_lib)?;
        let mut entries: Vec<_> = file.queries_data.iter().collect();
        entries.sort_by(|(a, _), (b, _)| compare_indices(a, b));

        let mut queries = Vec::with_capacity(entries.len());
        for (index, doc) in entries {
            let query = QueryInstance::from_doc(index, doc);
            query.template(&registry)?;
            queries.push(query);
        }
        Ok(Self { registry, queries })
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Queries in presentation order.
    pub fn queries(&self) -> &[QueryInstance] {
        &self.queries
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry)
    }

    /// Resolve every query, in order, against one context.
    pub fn resolve_all(&self, context: &RuntimeContext) -> Result<Vec<ResolvedQuery>, QueryError> {
        let resolver = self.resolver();
        self.queries
            .iter()
            .map(|query| resolver.resolve(query, context))
            .collect()
    }

    pub fn brace_style_warnings(&self) -> Vec<BraceStyleWarning> {
        self.registry
            .iter()
            .flat_map(QueryTemplate::brace_style_warnings)
            .collect()
    }
}

/// Load the query file at `path`, or the bundled election queries when no
/// path is given.
pub fn load_config(path: Option<&Path>) -> Result<EvaluationConfig> {
    let config = match path {
        Some(path) => {
            let text =
                fs::read_to_string(path).with_context(|| format!("read queries {}", path.display()))?;
            EvaluationConfig::from_json(&text)
                .with_context(|| format!("load queries {}", path.display()))?
        }
        None => EvaluationConfig::from_json(templates::ELECTION_QUERIES_JSON)
            .context("load bundled election queries")?,
    };
    tracing::info!(
        templates = config.registry().len(),
        queries = config.queries().len(),
        "query config loaded"
    );
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Named query templates and load-time template validation.
use crate::error::QueryError;
use crate::schema::QueryTemplateDoc;
use crate::template::{BraceStyle, TemplateText};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct QueryTemplate {
    pub name: String,
    pub question: TemplateText,
    pub premise: Option<TemplateText>,
    pub static_labels: BTreeSet<String>,
    pub dynamic_labels: BTreeSet<String>,
}

/// A placeholder whose brace style differs from the usual authoring
/// convention (static labels single, dynamic labels double).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BraceStyleWarning {
    pub template: String,
    pub label: String,
    pub style: BraceStyle,
    pub declared: LabelKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Static,
    Dynamic,
}

impl QueryTemplate {
    /// Build a template from its document form, checking that the declared
    /// labels and the placeholders in the text agree in both directions.
    pub fn from_doc(name: &str, doc: &QueryTemplateDoc) -> Result<Self, QueryError> {
        let question = TemplateText::compile(&doc.question_template.text);
        let (premise, static_labels, dynamic_labels) = match &doc.interaction_premise_template {
            Some(premise) => (
                Some(TemplateText::compile(&premise.text)),
                declared_set(name, "static", &premise.static_labels)?,
                declared_set(name, "dynamic", &premise.dynamic_labels)?,
            ),
            None => (None, BTreeSet::new(), BTreeSet::new()),
        };

        if let Some(label) = static_labels.intersection(&dynamic_labels).next() {
            return Err(QueryError::malformed(
                name,
                format!("label {label:?} is declared both static and dynamic"),
            ));
        }

        let template = Self {
            name: name.to_string(),
            question,
            premise,
            static_labels,
            dynamic_labels,
        };
        let referenced = template.referenced_labels();
        for label in &referenced {
            if !template.is_declared(label) {
                return Err(QueryError::malformed(
                    name,
                    format!("placeholder {{{label}}} is not a declared static or dynamic label"),
                ));
            }
        }
        for label in template.static_labels.iter().chain(&template.dynamic_labels) {
            if !referenced.contains(label.as_str()) {
                return Err(QueryError::malformed(
                    name,
                    format!("declared label {label:?} does not appear in the template text"),
                ));
            }
        }
        Ok(template)
    }

    /// Labels referenced anywhere in the premise or question text.
    pub fn referenced_labels(&self) -> BTreeSet<&str> {
        let mut labels = self.question.labels();
        if let Some(premise) = &self.premise {
            labels.extend(premise.labels());
        }
        labels
    }

    pub fn is_declared(&self, label: &str) -> bool {
        self.static_labels.contains(label) || self.dynamic_labels.contains(label)
    }

    pub fn label_kind(&self, label: &str) -> Option<LabelKind> {
        if self.static_labels.contains(label) {
            Some(LabelKind::Static)
        } else if self.dynamic_labels.contains(label) {
            Some(LabelKind::Dynamic)
        } else {
            None
        }
    }

    pub fn brace_style_warnings(&self) -> Vec<BraceStyleWarning> {
        let texts = self.premise.iter().chain(std::iter::once(&self.question));
        let mut seen = BTreeSet::new();
        let mut warnings = Vec::new();
        for (label, style) in texts.flat_map(|text| text.placeholders()) {
            let Some(declared) = self.label_kind(label) else {
                continue;
            };
            let expected = match declared {
                LabelKind::Static => BraceStyle::Single,
                LabelKind::Dynamic => BraceStyle::Double,
            };
            if style != expected && seen.insert(label) {
                warnings.push(BraceStyleWarning {
                    template: self.name.clone(),
                    label: label.to_string(),
                    style,
                    declared,
                });
            }
        }
        warnings
    }
}

fn declared_set(
    template: &str,
    kind: &str,
    labels: &[String],
) -> Result<BTreeSet<String>, QueryError> {
    let mut set = BTreeSet::new();
    for label in labels {
        if !set.insert(label.clone()) {
            return Err(QueryError::malformed(
                template,
                format!("{kind} label {label:?} is declared more than once"),
            ));
        }
    }
    Ok(set)
}

/// Read-only lookup of templates by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, QueryTemplate>,
}

impl TemplateRegistry {
    pub fn from_docs(docs: &BTreeMap<String, QueryTemplateDoc>) -> Result<Self, QueryError> {
        let mut templates = BTreeMap::new();
        for (name, doc) in docs {
            templates.insert(name.clone(), QueryTemplate::from_doc(name, doc)?);
        }
        Ok(Self { templates })
    }

    /// Look up a template; `query` names the referencing query in the error.
    pub fn get(&self, query: &str, name: &str) -> Result<&QueryTemplate, QueryError> {
        self.templates
            .get(name)
            .ok_or_else(|| QueryError::UnknownTemplate {
                query: query.to_string(),
                query_type: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryTemplate> {
        self.templates.values()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

//! Placeholder grammar for query template text.
//!
//! A placeholder is an identifier wrapped in single (`{candidate}`) or double
//! (`{{playername}}`) braces. Both forms substitute the same way; the brace
//! style is kept only so `validate` can point out inconsistent authoring.
//! Anything else containing braces is literal text.
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BraceStyle {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Label { name: String, style: BraceStyle },
}

/// Template text compiled once into literal and label segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateText {
    source: String,
    segments: Vec<Segment>,
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z_][A-Za-z0-9_]*)\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .expect("regex for template placeholders")
    })
}

impl TemplateText {
    pub fn compile(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut cursor = 0;
        for cap in placeholder_regex().captures_iter(source) {
            let Some(whole) = cap.get(0) else {
                continue;
            };
            if whole.start() > cursor {
                segments.push(Segment::Literal(source[cursor..whole.start()].to_string()));
            }
            let (name, style) = match (cap.get(1), cap.get(2)) {
                (Some(name), _) => (name.as_str(), BraceStyle::Double),
                (None, Some(name)) => (name.as_str(), BraceStyle::Single),
                (None, None) => continue,
            };
            segments.push(Segment::Label {
                name: name.to_string(),
                style,
            });
            cursor = whole.end();
        }
        if cursor < source.len() {
            segments.push(Segment::Literal(source[cursor..].to_string()));
        }
        Self {
            source: source.to_string(),
            segments,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Distinct label names referenced by the text.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.placeholders().map(|(name, _)| name).collect()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = (&str, BraceStyle)> + '_ {
        self.segments().iter().filter_map(|segment| match segment {
            Segment::Label { name, style } => Some((name.as_str(), *style)),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every label in one left-to-right pass.
    ///
    /// Substituted values are appended verbatim and never re-scanned, so a
    /// value containing `{label}` text stays literal.
    pub fn render<E>(
        &self,
        mut lookup: impl FnMut(&str) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Label { name, .. } => out.push_str(&lookup(name)?),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;

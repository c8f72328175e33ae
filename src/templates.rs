//! Prompt templates served by `GET /templates`.

#[cfg(test)]
#[path = "templates_test.rs"]
mod templates_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GenerationError;

pub const TEMPLATES_PATH: &str = "/templates";

/// Placeholder replaced by [`Template::apply`].
pub const SUBJECT_PLACEHOLDER: &str = "[SUBJECT]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl Template {
    /// Fill the subject placeholder. Templates without one are returned as-is.
    #[must_use]
    pub fn apply(&self, subject: &str) -> String {
        self.content.replace(SUBJECT_PLACEHOLDER, subject.trim())
    }
}

/// Templates in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    #[must_use]
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Decode a `GET /templates` body.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidResult`] unless the body is a list of templates.
    pub fn parse(body: Value) -> Result<Self, GenerationError> {
        let templates: Vec<Template> =
            serde_json::from_value(body).map_err(|e| GenerationError::InvalidResult(format!("templates: {e}")))?;
        Ok(Self { templates })
    }

    /// First template with this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Template> {
        self.templates
            .iter()
            .filter(move |t| t.category.as_deref() == Some(category))
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for category in self.templates.iter().filter_map(|t| t.category.as_deref()) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

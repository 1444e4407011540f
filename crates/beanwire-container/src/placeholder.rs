//! `${...}` placeholder evaluation for bean definition strings

use std::collections::BTreeMap;

use beanwire_core::{BeansError, BeansResult, Value};
use tracing::warn;

use crate::config::ContainerSettings;

/// Whole-text expression that evaluates to null
pub const NULL_EXPRESSION: &str = "#{null}";

/// Replaces placeholders with values from the settings' property table
#[derive(Debug, Clone)]
pub struct PlaceholderResolver {
    prefix: String,
    suffix: String,
    separator: Option<String>,
    ignore_unresolvable: bool,
    properties: BTreeMap<String, String>,
}

impl PlaceholderResolver {
    /// Create a resolver using the delimiters and properties of `settings`
    pub fn new(settings: &ContainerSettings) -> Self {
        Self {
            prefix: settings.placeholder_prefix.clone(),
            suffix: settings.placeholder_suffix.clone(),
            separator: Some(settings.value_separator.clone()).filter(|s| !s.is_empty()),
            ignore_unresolvable: settings.ignore_unresolvable_placeholders,
            properties: settings.properties.clone(),
        }
    }

    /// Evaluate a definition string: null expression, static text, or text
    /// with placeholders
    pub fn evaluate(&self, text: &str) -> BeansResult<Value> {
        if text.trim() == NULL_EXPRESSION {
            return Ok(Value::Null);
        }
        if !text.contains(self.prefix.as_str()) {
            return Ok(Value::text(text));
        }
        self.resolve_placeholders(text).map(Value::Text)
    }

    /// Replace every placeholder in `text`
    pub fn resolve_placeholders(&self, text: &str) -> BeansResult<String> {
        let mut visiting = Vec::new();
        self.parse(text, text, &mut visiting)
    }

    fn parse(&self, expression: &str, text: &str, visiting: &mut Vec<String>) -> BeansResult<String> {
        let mut result = String::with_capacity(text.len());
        let mut cursor = 0;

        while let Some(offset) = text[cursor..].find(self.prefix.as_str()) {
            let start = cursor + offset;
            result.push_str(&text[cursor..start]);

            let Some(end) = self.find_placeholder_end(text, start) else {
                cursor = start;
                break;
            };
            let placeholder = self.parse(expression, &text[start + self.prefix.len()..end], visiting)?;
            if visiting.contains(&placeholder) {
                return Err(BeansError::Evaluation {
                    expression: expression.to_string(),
                    message: format!("Circular placeholder reference '{}'", placeholder),
                });
            }

            visiting.push(placeholder.clone());
            match self.lookup(&placeholder) {
                Some(value) => {
                    let resolved = self.parse(expression, &value, visiting)?;
                    result.push_str(&resolved);
                }
                None if self.ignore_unresolvable => {
                    warn!(placeholder = %placeholder, "Leaving unresolvable placeholder in place");
                    result.push_str(&text[start..end + self.suffix.len()]);
                }
                None => {
                    return Err(BeansError::Evaluation {
                        expression: expression.to_string(),
                        message: format!("Could not resolve placeholder '{}'", placeholder),
                    })
                }
            }
            visiting.pop();

            cursor = end + self.suffix.len();
        }

        result.push_str(&text[cursor..]);
        Ok(result)
    }

    /// Value for a placeholder, falling back to its inline default
    fn lookup(&self, placeholder: &str) -> Option<String> {
        if let Some(value) = self.properties.get(placeholder) {
            return Some(value.clone());
        }
        let separator = self.separator.as_deref()?;
        let (key, default) = placeholder.split_once(separator)?;
        Some(
            self.properties
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string()),
        )
    }

    /// Index of the suffix closing the placeholder opened at `start`
    fn find_placeholder_end(&self, text: &str, start: usize) -> Option<usize> {
        let mut index = start + self.prefix.len();
        let mut depth = 0usize;
        while index < text.len() {
            let rest = &text[index..];
            if rest.starts_with(self.suffix.as_str()) {
                if depth == 0 {
                    return Some(index);
                }
                depth -= 1;
                index += self.suffix.len();
            } else if rest.starts_with(self.prefix.as_str()) {
                depth += 1;
                index += self.prefix.len();
            } else {
                index += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        None
    }
}

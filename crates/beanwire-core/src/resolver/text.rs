//! Typed string evaluation and managed properties

use indexmap::IndexMap;

use super::ValueResolver;
use crate::error::{BeansError, BeansResult};
use crate::path::ArgumentPath;
use crate::raw::{PropertyText, TargetType, TypedStringValue};
use crate::types::TypeHandle;
use crate::value::Value;

impl ValueResolver<'_> {
    pub(super) fn resolve_typed_string(
        &self,
        path: &ArgumentPath<'_>,
        typed: &TypedStringValue,
    ) -> BeansResult<Value> {
        let value = self.evaluate_typed(typed).map_err(|cause| {
            BeansError::creation(
                self.resource_description(),
                self.bean_name,
                format!("Error evaluating typed String value for {}", path),
                cause,
            )
        })?;

        let converted = match self.resolve_target_type(typed) {
            Ok(Some(target)) => self.converter.convert_if_necessary(value, &target),
            Ok(None) => Ok(value),
            Err(cause) => Err(cause),
        };
        converted.map_err(|cause| {
            BeansError::creation(
                self.resource_description(),
                self.bean_name,
                format!("Error converting typed String value for {}", path),
                cause,
            )
        })
    }

    pub(super) fn resolve_managed_properties(
        &self,
        path: &ArgumentPath<'_>,
        entries: &[(PropertyText, PropertyText)],
    ) -> BeansResult<Value> {
        let mut copy = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let key = self.evaluate_property_text(path, key)?;
            let value = self.evaluate_property_text(path, value)?;
            match (key, value) {
                (Some(key), Some(value)) => {
                    copy.insert(key, value);
                }
                _ => {
                    return Err(BeansError::creation_without_cause(
                        self.resource_description(),
                        self.bean_name,
                        format!(
                            "Error converting Properties key/value pair for {}: resolved to null",
                            path
                        ),
                    ))
                }
            }
        }
        Ok(Value::Properties(copy))
    }

    /// Evaluate the text of a typed value, flagging it dynamic when the
    /// result differs from its source
    pub(super) fn evaluate_typed(&self, typed: &TypedStringValue) -> BeansResult<Value> {
        let Some(text) = typed.value() else {
            return Ok(Value::Null);
        };
        let result = self.evaluate_text(text)?;
        if result.as_text() != Some(text) {
            typed.set_dynamic();
        }
        Ok(result)
    }

    fn evaluate_property_text(
        &self,
        path: &ArgumentPath<'_>,
        text: &PropertyText,
    ) -> BeansResult<Option<String>> {
        match text {
            PropertyText::Plain(plain) => Ok(Some(plain.clone())),
            PropertyText::Typed(typed) => {
                let value = self.evaluate_typed(typed).map_err(|cause| {
                    BeansError::creation(
                        self.resource_description(),
                        self.bean_name,
                        format!("Error converting Properties key/value pair for {}", path),
                        cause,
                    )
                })?;
                Ok(match value {
                    Value::Null => None,
                    Value::Text(text) => Some(text),
                    other => Some(other.to_string()),
                })
            }
        }
    }

    fn resolve_target_type(&self, typed: &TypedStringValue) -> BeansResult<Option<TypeHandle>> {
        if let Some(resolved) = typed.resolved_target_type() {
            return Ok(Some(resolved.clone()));
        }
        match typed.target_type() {
            Some(TargetType::Named(type_name)) => {
                let handle = self.container.resolve_type(type_name)?;
                Ok(Some(typed.cache_target_type(handle).clone()))
            }
            Some(TargetType::Resolved(handle)) => Ok(Some(handle.clone())),
            None => Ok(None),
        }
    }
}

//! Value resolution
//!
//! [`ValueResolver`] turns the [`RawValue`]s of one bean definition into the
//! concrete [`Value`]s to assign. It is created per construction attempt for
//! a single (bean name, definition) pair and discarded afterwards.
//!
//! Resolution is depth-first and reentrant: references, prerequisites and
//! autowired dependencies call back into the container, which may build
//! other beans with their own resolvers. Cycle detection is the container's
//! job.

mod collection;
mod inner;
mod naming;
mod reference;
mod text;

pub use naming::{generate_inner_bean_name, unique_inner_bean_name};

use tracing::debug;

use crate::container::BeanContainer;
use crate::convert::TypeConverter;
use crate::definition::BeanDefinition;
use crate::error::{BeansError, BeansResult};
use crate::path::ArgumentPath;
use crate::raw::{BeanNameReference, DependencyDescriptor, RawValue};
use crate::types::TypeHandle;
use crate::value::{ArrayValue, Value};

/// Prefix of names synthesized for anonymous inner beans
pub const INNER_BEAN_NAME_PREFIX: &str = "(inner object)";

/// Separator between a generated name and its suffix
pub const GENERATED_BEAN_NAME_SEPARATOR: &str = "#";

/// Resolves raw definition values for one bean under construction
pub struct ValueResolver<'a> {
    container: &'a dyn BeanContainer,
    bean_name: &'a str,
    definition: &'a BeanDefinition,
    converter: &'a dyn TypeConverter,
}

impl<'a> ValueResolver<'a> {
    /// Resolver for the bean `bean_name` built from `definition`
    pub fn new(
        container: &'a dyn BeanContainer,
        bean_name: &'a str,
        definition: &'a BeanDefinition,
        converter: &'a dyn TypeConverter,
    ) -> Self {
        Self {
            container,
            bean_name,
            definition,
            converter,
        }
    }

    /// Name of the bean whose values are resolved
    pub fn bean_name(&self) -> &str {
        self.bean_name
    }

    /// Resolve `value` for the argument at `path`
    ///
    /// Literals pass through untouched except text and text arrays, which are
    /// evaluated as expressions. Every other shape is realized through the
    /// container.
    pub fn resolve_value_if_necessary(
        &self,
        path: &ArgumentPath<'_>,
        value: &RawValue,
    ) -> BeansResult<Value> {
        match value {
            RawValue::Reference(reference) => self.resolve_reference(path, reference),
            RawValue::NameReference(reference) => self.resolve_name_reference(path, reference),
            RawValue::InnerBeanHolder(holder) => {
                self.resolve_inner_bean(path, Some(holder.name()), holder.definition())
            }
            RawValue::InnerBean(definition) => self.resolve_inner_bean(path, None, definition),
            RawValue::Dependency(descriptor) => self.resolve_dependency(descriptor),
            RawValue::Array(array) => {
                let element_type = self.resolve_element_type(path, array)?;
                self.resolve_managed_array(path, element_type, array.elements())
            }
            RawValue::List(list) => self.resolve_managed_list(path, list.elements()),
            RawValue::Set(set) => self.resolve_managed_set(path, set.elements()),
            RawValue::Map(map) => self.resolve_managed_map(path, map.entries()),
            RawValue::Properties(properties) => {
                self.resolve_managed_properties(path, properties.entries())
            }
            RawValue::TypedString(typed) => self.resolve_typed_string(path, typed),
            RawValue::Null => Ok(Value::Null),
            RawValue::Literal(literal) => self.evaluate_literal(literal),
        }
    }

    fn resolve_name_reference(
        &self,
        path: &ArgumentPath<'_>,
        reference: &BeanNameReference,
    ) -> BeansResult<Value> {
        let resolved_name = self.evaluate_name(reference.bean_name())?;
        if !self.container.contains_bean(&resolved_name) {
            return Err(BeansError::BeanDefinitionStore {
                resource_description: self.resource_description().map(str::to_string),
                bean_name: Some(self.bean_name.to_string()),
                message: format!(
                    "Invalid bean name '{}' in bean reference for {}",
                    resolved_name,
                    path
                ),
            });
        }
        Ok(Value::Text(resolved_name))
    }

    fn resolve_dependency(&self, descriptor: &DependencyDescriptor) -> BeansResult<Value> {
        let mut autowired_bean_names = Vec::new();
        let result = self.container.resolve_dependency(
            descriptor,
            self.bean_name,
            &mut autowired_bean_names,
            self.converter,
        )?;
        for autowired in &autowired_bean_names {
            if self.container.contains_bean(autowired) {
                self.container.register_dependent_bean(autowired, self.bean_name);
            }
        }
        debug!(
            bean = self.bean_name,
            candidates = ?autowired_bean_names,
            "Resolved autowired dependency"
        );
        Ok(result)
    }

    /// Evaluate a literal: text and arrays of text may hold expressions
    fn evaluate_literal(&self, literal: &Value) -> BeansResult<Value> {
        match literal {
            Value::Text(text) => self.evaluate_text(text),
            Value::Array(array) if *array.element_type() == TypeHandle::Text => {
                let mut actually_resolved = false;
                let mut resolved = Vec::with_capacity(array.len());
                for original in array.items() {
                    let value = match original {
                        Value::Text(text) => self.evaluate_text(text)?,
                        other => other.clone(),
                    };
                    if value != *original {
                        actually_resolved = true;
                    }
                    resolved.push(value);
                }
                if actually_resolved {
                    Ok(Value::Array(ArrayValue::new(TypeHandle::Any, resolved)))
                } else {
                    Ok(literal.clone())
                }
            }
            other => Ok(other.clone()),
        }
    }

    fn evaluate_text(&self, text: &str) -> BeansResult<Value> {
        self.container
            .evaluate_bean_definition_string(text, Some(self.definition))
    }

    /// Evaluate a bean name, which may itself be an expression
    fn evaluate_name(&self, name: &str) -> BeansResult<String> {
        Ok(match self.evaluate_text(name)? {
            Value::Text(text) => text,
            other => other.to_string(),
        })
    }

    fn resource_description(&self) -> Option<&str> {
        self.definition.resource_description()
    }
}

/// Replace the container's explicit-null marker with a real null
fn translate_null_bean(value: Value) -> Value {
    match value {
        Value::Instance(bean) if bean.is_null_bean() => Value::Null,
        other => other,
    }
}

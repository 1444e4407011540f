//! Flattening of parent/child bean definitions

use std::sync::Arc;

use beanwire_core::{BeanDefinition, BeansError, BeansResult};
use tracing::debug;

use crate::registry::BeanRegistry;

/// Overlay `child` on an already merged `parent`
///
/// The child wins for class, scope, constructor arguments, property values
/// and flags it sets. Depends-on names accumulate.
pub fn merge_with_parent(parent: &BeanDefinition, child: &BeanDefinition) -> BeanDefinition {
    let mut merged = parent.clone().without_parent();

    if let Some(class_name) = child.class_name() {
        merged = merged.with_class_name(class_name);
    }
    if let Some(scope) = child.declared_scope() {
        merged = merged.with_scope(scope);
    }

    let mut depends_on = parent.depends_on_names().to_vec();
    for name in child.depends_on_names() {
        if !depends_on.contains(name) {
            depends_on.push(name.clone());
        }
    }
    merged = merged.with_depends_on(depends_on);

    if !child.constructor_arguments().is_empty() {
        merged = merged.with_constructor_arguments(child.constructor_arguments().to_vec());
    }
    for property in child.property_values() {
        merged = merged.with_property(property.name.clone(), property.value.clone());
    }
    if let Some(description) = child.resource_description() {
        merged = merged.with_resource_description(description);
    }

    merged
        .primary(child.is_primary())
        .lazy_init(child.is_lazy_init())
        .synthetic(child.is_synthetic())
}

impl BeanRegistry {
    /// Merged definition of a top-level bean, cached until definitions change
    pub fn get_merged_bean_definition(&self, name: &str) -> BeansResult<Arc<BeanDefinition>> {
        let mut visiting = Vec::new();
        self.merged_tracked(&self.canonical_name(name), &mut visiting)
    }

    /// Merge a definition that may be nested inside `containing`
    ///
    /// An inner singleton declared inside a non-singleton bean takes the
    /// containing bean's scope.
    pub(crate) fn merge_definition(
        &self,
        bean_name: &str,
        definition: &BeanDefinition,
        containing: Option<&BeanDefinition>,
    ) -> BeansResult<Arc<BeanDefinition>> {
        let mut visiting = Vec::new();
        self.merge_tracked(bean_name, definition, containing, &mut visiting)
    }

    fn merged_tracked(
        &self,
        name: &str,
        visiting: &mut Vec<String>,
    ) -> BeansResult<Arc<BeanDefinition>> {
        if let Some(cached) = self.merged.read().get(name) {
            return Ok(Arc::clone(cached));
        }

        let Some(definition) = self.definitions.read().get(name).cloned() else {
            return match &self.parent {
                Some(parent) => parent.get_merged_bean_definition(name),
                None => Err(BeansError::NoSuchBean {
                    name: name.to_string(),
                }),
            };
        };

        if visiting.iter().any(|seen| seen == name) {
            return Err(BeansError::BeanDefinitionStore {
                resource_description: definition.resource_description().map(str::to_string),
                bean_name: Some(name.to_string()),
                message: format!(
                    "Circular parent relationship involving bean definition '{}'",
                    name
                ),
            });
        }

        visiting.push(name.to_string());
        let merged = self.merge_tracked(name, &definition, None, visiting);
        visiting.pop();
        let merged = merged?;

        Ok(Arc::clone(
            self.merged
                .write()
                .entry(name.to_string())
                .or_insert(merged),
        ))
    }

    fn merge_tracked(
        &self,
        bean_name: &str,
        definition: &BeanDefinition,
        containing: Option<&BeanDefinition>,
        visiting: &mut Vec<String>,
    ) -> BeansResult<Arc<BeanDefinition>> {
        let mut merged = match definition.parent_name() {
            None => definition.clone(),
            Some(parent_name) => {
                let parent = self
                    .parent_definition(bean_name, parent_name, visiting)
                    .map_err(|cause| BeansError::BeanDefinitionStore {
                        resource_description: definition.resource_description().map(str::to_string),
                        bean_name: Some(bean_name.to_string()),
                        message: format!(
                            "Could not resolve parent bean definition '{}': {}",
                            parent_name, cause
                        ),
                    })?;
                debug!(bean = %bean_name, parent = %parent_name, "Merging child bean definition");
                merge_with_parent(&parent, definition)
            }
        };

        if let Some(containing) = containing {
            if !containing.is_singleton() && merged.is_singleton() {
                merged = merged.with_scope(containing.scope());
            }
        }

        Ok(Arc::new(merged))
    }

    /// A parent named like the child itself must live in the parent registry
    fn parent_definition(
        &self,
        bean_name: &str,
        parent_name: &str,
        visiting: &mut Vec<String>,
    ) -> BeansResult<Arc<BeanDefinition>> {
        let parent_name = self.canonical_name(parent_name);
        if parent_name != bean_name {
            return self.merged_tracked(&parent_name, visiting);
        }
        match &self.parent {
            Some(parent) => parent.get_merged_bean_definition(&parent_name),
            None => Err(BeansError::NoSuchBean { name: parent_name }),
        }
    }
}

//! Inner beans: nested definitions materialized on demand

use std::sync::Arc;

use tracing::debug;

use super::naming::generate_inner_bean_name;
use super::{translate_null_bean, ValueResolver};
use crate::definition::BeanDefinition;
use crate::error::{BeansError, BeansResult};
use crate::path::ArgumentPath;
use crate::value::Value;

impl ValueResolver<'_> {
    pub(super) fn resolve_inner_bean(
        &self,
        path: &ArgumentPath<'_>,
        inner_bean_name: Option<&str>,
        inner_definition: &Arc<BeanDefinition>,
    ) -> BeansResult<Value> {
        let inner_bean_name = match inner_bean_name {
            Some(name) => name.to_string(),
            None => generate_inner_bean_name(inner_definition),
        };

        let mut merged: Option<Arc<BeanDefinition>> = None;
        let result = self.build_inner_bean(&inner_bean_name, inner_definition, &mut merged);

        result.map(translate_null_bean).map_err(|cause| {
            let class_name = merged
                .as_deref()
                .and_then(BeanDefinition::class_name)
                .or_else(|| inner_definition.class_name());
            let type_part = match class_name {
                Some(class_name) => format!("of type [{}] ", class_name),
                None => String::new(),
            };
            BeansError::creation(
                self.resource_description(),
                self.bean_name,
                format!(
                    "Cannot create inner bean '{}' {}while setting {}",
                    inner_bean_name, type_part, path
                ),
                cause,
            )
        })
    }

    fn build_inner_bean(
        &self,
        inner_bean_name: &str,
        inner_definition: &BeanDefinition,
        merged_slot: &mut Option<Arc<BeanDefinition>>,
    ) -> BeansResult<Value> {
        let merged = self.container.merged_bean_definition(
            inner_bean_name,
            inner_definition,
            Some(self.definition),
        )?;
        *merged_slot = Some(Arc::clone(&merged));

        // Prototype inner beans are never cached, so their names need no
        // disambiguation.
        let actual_name = if merged.is_singleton() {
            self.adapt_inner_bean_name(inner_bean_name)
        } else {
            inner_bean_name.to_string()
        };
        debug!(
            bean = self.bean_name,
            inner_bean = %actual_name,
            "Creating inner bean"
        );

        self.container
            .register_contained_bean(&actual_name, self.bean_name);

        for prerequisite in merged.depends_on_names() {
            self.container
                .register_dependent_bean(prerequisite, &actual_name);
            self.container.get_bean(prerequisite)?;
        }

        let inner = self.container.create_bean(&actual_name, &merged)?;
        match inner.as_bean().and_then(|bean| bean.as_factory()) {
            Some(factory) => self.container.object_from_factory_bean(
                factory,
                &actual_name,
                !merged.is_synthetic(),
            ),
            None => Ok(inner),
        }
    }
}

//! Bean references, local or in the parent container

use tracing::debug;

use super::{translate_null_bean, ValueResolver};
use crate::error::{BeansError, BeansResult};
use crate::path::ArgumentPath;
use crate::raw::BeanReference;
use crate::value::Value;

impl ValueResolver<'_> {
    pub(super) fn resolve_reference(
        &self,
        path: &ArgumentPath<'_>,
        reference: &BeanReference,
    ) -> BeansResult<Value> {
        let lookup = if reference.is_to_parent() {
            self.lookup_in_parent(reference)
        } else {
            self.lookup_locally(reference)
        };
        lookup.map(translate_null_bean).map_err(|cause| {
            BeansError::creation(
                self.resource_description(),
                self.bean_name,
                format!(
                    "Cannot resolve reference to bean '{}' while setting {}",
                    reference.target(),
                    path
                ),
                cause,
            )
        })
    }

    fn lookup_in_parent(&self, reference: &BeanReference) -> BeansResult<Value> {
        let parent = self.container.parent_bean_factory().ok_or_else(|| {
            BeansError::creation_without_cause(
                self.resource_description(),
                self.bean_name,
                format!(
                    "Cannot resolve reference to bean {} in parent factory: no parent factory available",
                    reference
                ),
            )
        })?;

        match reference.bean_type() {
            Some(bean_type) => {
                if let Some(name) = reference.bean_name() {
                    let resolved_name = self.evaluate_name(name)?;
                    if parent.contains_bean(&resolved_name) {
                        return parent.get_bean_of_type(&resolved_name, bean_type);
                    }
                }
                parent.get_bean_by_type(bean_type)
            }
            None => {
                let resolved_name = self.evaluate_name(reference.target())?;
                parent.get_bean(&resolved_name)
            }
        }
    }

    fn lookup_locally(&self, reference: &BeanReference) -> BeansResult<Value> {
        let resolved_name = reference
            .bean_name()
            .map(|name| self.evaluate_name(name))
            .transpose()?;

        let (selected_name, bean) = match (reference.bean_type(), resolved_name) {
            (Some(bean_type), Some(name)) if self.container.contains_bean(&name) => {
                let bean = self.container.get_bean_of_type(&name, bean_type)?;
                (name, bean)
            }
            (Some(bean_type), _) => {
                let named = self.container.resolve_named_bean(bean_type)?;
                (named.name, named.instance)
            }
            (None, Some(name)) => {
                let bean = self.container.get_bean(&name)?;
                (name, bean)
            }
            (None, None) => {
                return Err(BeansError::NoSuchBean {
                    name: reference.target().to_string(),
                })
            }
        };

        self.container
            .register_dependent_bean(&selected_name, self.bean_name);
        debug!(
            bean = self.bean_name,
            reference = %selected_name,
            "Resolved bean reference"
        );
        Ok(bean)
    }
}

//! Factory bean unwrapping and product caching

use std::sync::Arc;

use beanwire_core::{BeansError, BeansResult, FactoryBean, Value};
use tracing::debug;

use crate::registry::{is_factory_dereference, BeanRegistry};

impl BeanRegistry {
    /// The object to expose for `instance` when requested as `name`
    ///
    /// A factory bean yields its product unless `name` carries the `&`
    /// prefix, which asks for the factory itself.
    pub(crate) fn object_for_instance(
        &self,
        instance: Value,
        name: &str,
        bean_name: &str,
        should_post_process: bool,
    ) -> BeansResult<Value> {
        let factory = instance
            .as_bean()
            .and_then(|bean| bean.as_factory())
            .cloned();

        if is_factory_dereference(name) {
            let is_null = instance.as_bean().map_or(false, |bean| bean.is_null_bean());
            if factory.is_none() && !is_null {
                return Err(BeansError::BeanNotOfRequiredType {
                    name: bean_name.to_string(),
                    required_type: "FactoryBean".to_string(),
                    actual_type: instance.kind().to_string(),
                });
            }
            return Ok(instance);
        }

        match factory {
            Some(factory) => self.product_of(&factory, bean_name, should_post_process),
            None => Ok(instance),
        }
    }

    /// Product of `factory`, cached when both the factory and its product
    /// are singletons
    pub(crate) fn product_of(
        &self,
        factory: &Arc<dyn FactoryBean>,
        bean_name: &str,
        should_post_process: bool,
    ) -> BeansResult<Value> {
        let cacheable = factory.is_singleton() && self.contains_singleton(bean_name);
        if cacheable {
            if let Some(product) = self.factory_products.lock().get(bean_name) {
                return Ok(product.clone());
            }
        }

        let mut product = factory.get_object().map_err(|cause| {
            BeansError::creation(
                None,
                bean_name,
                "FactoryBean threw exception on object creation",
                cause,
            )
        })?;
        if should_post_process {
            if let Some(post_processor) = &self.post_processor {
                product = post_processor(bean_name, product).map_err(|cause| {
                    BeansError::creation(
                        None,
                        bean_name,
                        "Post-processing of FactoryBean's object failed",
                        cause,
                    )
                })?;
            }
        }
        debug!(bean = bean_name, cached = cacheable, "Obtained object from factory bean");

        if cacheable {
            product = self
                .factory_products
                .lock()
                .entry(bean_name.to_string())
                .or_insert(product)
                .clone();
        }
        Ok(product)
    }
}

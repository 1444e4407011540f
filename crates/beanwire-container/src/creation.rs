//! Bean creation, depends-on handling and cycle detection

use std::sync::Arc;
use std::thread;

use beanwire_core::{
    ArgumentPath, Bean, BeanDefinition, BeanFactory, BeansError, BeansResult, Value, ValueResolver,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::class::BeanProperties;
use crate::registry::BeanRegistry;

impl BeanRegistry {
    /// Realize every depends-on prerequisite of `bean_name` before it is built
    pub(crate) fn realize_depends_on(
        &self,
        bean_name: &str,
        merged: &BeanDefinition,
    ) -> BeansResult<()> {
        for prerequisite in merged.depends_on_names() {
            if self.is_dependent(bean_name, prerequisite) {
                return Err(BeansError::creation_without_cause(
                    merged.resource_description(),
                    bean_name,
                    format!(
                        "Circular depends-on relationship between '{}' and '{}'",
                        bean_name, prerequisite
                    ),
                ));
            }
            self.register_dependent(prerequisite, bean_name);
            self.get_bean(prerequisite).map_err(|cause| {
                BeansError::creation(
                    merged.resource_description(),
                    bean_name,
                    format!("'{}' depends on missing bean '{}'", bean_name, prerequisite),
                    cause,
                )
            })?;
        }
        Ok(())
    }

    /// Cached singleton, or a new one created and cached
    ///
    /// Creation is serialized: a second thread asking for the same bean
    /// waits for the first and then finds it cached.
    pub(crate) fn singleton_or_create(
        &self,
        bean_name: &str,
        merged: &Arc<BeanDefinition>,
    ) -> BeansResult<Value> {
        if let Some(existing) = self.singleton(bean_name) {
            return Ok(existing);
        }
        let _creation = self.singleton_creation.lock();
        if let Some(existing) = self.singleton(bean_name) {
            return Ok(existing);
        }
        let instance = self.create_guarded(bean_name, merged)?;
        Ok(self
            .singletons
            .write()
            .entry(bean_name.to_string())
            .or_insert(instance)
            .clone())
    }

    /// Create `bean_name`, failing fast if this thread is already creating
    /// it further up the call stack
    pub(crate) fn create_guarded(
        &self,
        bean_name: &str,
        merged: &Arc<BeanDefinition>,
    ) -> BeansResult<Value> {
        let thread = thread::current().id();
        let entered = self
            .in_creation
            .lock()
            .entry(thread)
            .or_default()
            .insert(bean_name.to_string());
        if !entered {
            return Err(BeansError::CurrentlyInCreation {
                name: bean_name.to_string(),
            });
        }
        let result = self.instantiate(bean_name, merged);
        let mut in_creation = self.in_creation.lock();
        if let Some(names) = in_creation.get_mut(&thread) {
            names.remove(bean_name);
            if names.is_empty() {
                in_creation.remove(&thread);
            }
        }
        result
    }

    /// Resolve all arguments and properties, then run the class constructor
    ///
    /// Nothing is handed to the constructor unless every value resolved.
    pub(crate) fn instantiate(
        &self,
        bean_name: &str,
        definition: &Arc<BeanDefinition>,
    ) -> BeansResult<Value> {
        let resource = definition.resource_description();
        let class_name = definition.class_name().ok_or_else(|| {
            BeansError::creation_without_cause(
                resource,
                bean_name,
                "No bean class specified on bean definition",
            )
        })?;
        let constructor = self.classes.constructor(class_name).ok_or_else(|| {
            BeansError::creation(
                resource,
                bean_name,
                format!("Bean class [{}] not found", class_name),
                BeansError::TypeNotFound {
                    type_name: class_name.to_string(),
                },
            )
        })?;
        debug!(bean = bean_name, class = class_name, "Creating instance of bean");

        let resolver = ValueResolver::new(self, bean_name, definition, self.converter.as_ref());

        let mut arguments = Vec::with_capacity(definition.constructor_arguments().len());
        for (index, raw) in definition.constructor_arguments().iter().enumerate() {
            arguments.push(
                resolver.resolve_value_if_necessary(&ArgumentPath::constructor_argument(index), raw)?,
            );
        }

        let mut properties = IndexMap::with_capacity(definition.property_values().len());
        for property in definition.property_values() {
            let value = resolver
                .resolve_value_if_necessary(&ArgumentPath::property(&property.name), &property.value)?;
            properties.insert(property.name.clone(), value);
        }

        let bean: Bean = constructor(&BeanProperties::new(bean_name, arguments, properties))
            .map_err(|cause| {
                BeansError::creation(resource, bean_name, "Instantiation of bean failed", cause)
            })?;
        Ok(Value::Instance(bean))
    }
}

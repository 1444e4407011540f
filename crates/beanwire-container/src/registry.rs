//! The bean registry: definitions, aliases and the singleton cache

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread::ThreadId;

use beanwire_core::{
    Bean, BeanContainer, BeanDefinition, BeanDefinitionHolder, BeanFactory, BeansError, BeansResult,
    DependencyDescriptor, FactoryBean, NamedBean, SimpleTypeConverter, TypeConverter, TypeHandle,
    Value,
};
use indexmap::{IndexMap, IndexSet};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::{debug, info, warn};

use crate::class::{BeanProperties, ClassRegistry};
use crate::config::{ConfigResult, ContainerSettings};
use crate::placeholder::PlaceholderResolver;

/// Prefix that asks for a factory bean itself rather than its product
pub const FACTORY_BEAN_PREFIX: &str = "&";

/// Hook applied to objects produced by factory beans
pub type PostProcessor = Arc<dyn Fn(&str, Value) -> BeansResult<Value> + Send + Sync>;

/// In-memory bean container
pub struct BeanRegistry {
    pub(crate) settings: ContainerSettings,
    pub(crate) classes: ClassRegistry,
    pub(crate) placeholders: PlaceholderResolver,
    pub(crate) converter: Arc<dyn TypeConverter>,
    pub(crate) parent: Option<Arc<BeanRegistry>>,
    pub(crate) post_processor: Option<PostProcessor>,
    pub(crate) definitions: RwLock<IndexMap<String, Arc<BeanDefinition>>>,
    /// alias -> name
    pub(crate) aliases: RwLock<IndexMap<String, String>>,
    pub(crate) merged: RwLock<HashMap<String, Arc<BeanDefinition>>>,
    pub(crate) singletons: RwLock<IndexMap<String, Value>>,
    /// Beans being created, per creating thread
    pub(crate) in_creation: Mutex<HashMap<ThreadId, HashSet<String>>>,
    /// Held while a singleton is created; re-entered by nested creations
    pub(crate) singleton_creation: ReentrantMutex<()>,
    pub(crate) factory_products: Mutex<HashMap<String, Value>>,
    /// bean -> beans depending on it
    pub(crate) dependents: Mutex<HashMap<String, IndexSet<String>>>,
    /// bean -> beans it depends on
    pub(crate) dependencies: Mutex<HashMap<String, IndexSet<String>>>,
    /// containing bean -> inner beans
    pub(crate) contained: Mutex<HashMap<String, IndexSet<String>>>,
}

impl BeanRegistry {
    /// Registry with default settings and no registered classes
    pub fn new() -> Self {
        Self::assemble(
            ContainerSettings::default(),
            ClassRegistry::new(),
            None,
            None,
            Arc::new(SimpleTypeConverter::new()),
        )
    }

    /// Registry with default settings that falls back to `parent` for
    /// names it does not know
    pub fn with_parent(parent: Arc<BeanRegistry>) -> Self {
        Self::assemble(
            ContainerSettings::default(),
            ClassRegistry::new(),
            Some(parent),
            None,
            Arc::new(SimpleTypeConverter::new()),
        )
    }

    /// Create a builder for a configured registry
    pub fn builder() -> BeanRegistryBuilder {
        BeanRegistryBuilder::default()
    }

    fn assemble(
        settings: ContainerSettings,
        classes: ClassRegistry,
        parent: Option<Arc<BeanRegistry>>,
        post_processor: Option<PostProcessor>,
        converter: Arc<dyn TypeConverter>,
    ) -> Self {
        Self {
            placeholders: PlaceholderResolver::new(&settings),
            settings,
            classes,
            converter,
            parent,
            post_processor,
            definitions: RwLock::new(IndexMap::new()),
            aliases: RwLock::new(IndexMap::new()),
            merged: RwLock::new(HashMap::new()),
            singletons: RwLock::new(IndexMap::new()),
            in_creation: Mutex::new(HashMap::new()),
            singleton_creation: ReentrantMutex::new(()),
            factory_products: Mutex::new(HashMap::new()),
            dependents: Mutex::new(HashMap::new()),
            dependencies: Mutex::new(HashMap::new()),
            contained: Mutex::new(HashMap::new()),
        }
    }

    /// Settings the registry was built with
    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    /// Registered bean classes
    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Parent registry, if any
    pub fn parent(&self) -> Option<&Arc<BeanRegistry>> {
        self.parent.as_ref()
    }

    // -----------------------------------------------------------------------
    // Definitions and aliases
    // -----------------------------------------------------------------------

    /// Register `definition` under `name`, replacing any earlier one if overriding is allowed
    pub fn register_bean_definition(
        &self,
        name: impl Into<String>,
        definition: BeanDefinition,
    ) -> BeansResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(BeansError::BeanDefinitionStore {
                resource_description: definition.resource_description().map(str::to_string),
                bean_name: None,
                message: "Bean name must not be empty".to_string(),
            });
        }

        {
            let mut definitions = self.definitions.write();
            if definitions.contains_key(&name) {
                if !self.settings.allow_definition_overriding {
                    return Err(BeansError::BeanDefinitionStore {
                        resource_description: definition.resource_description().map(str::to_string),
                        bean_name: Some(name.clone()),
                        message: format!(
                            "Cannot register bean definition for bean '{}': there is already a definition bound",
                            name
                        ),
                    });
                }
                warn!(bean = %name, "Overriding bean definition");
            }
            definitions.insert(name.clone(), Arc::new(definition));
        }

        if self.aliases.write().shift_remove(&name).is_some() {
            warn!(bean = %name, "Bean definition replaces an alias of the same name");
        }
        self.reset_bean(&name);
        info!(bean = %name, "Registered bean definition");
        Ok(())
    }

    /// Register a holder's definition under its name and aliases
    pub fn register_holder(&self, holder: &BeanDefinitionHolder) -> BeansResult<()> {
        self.register_bean_definition(holder.name(), holder.definition().as_ref().clone())?;
        for alias in holder.aliases() {
            self.register_alias(holder.name(), alias)?;
        }
        Ok(())
    }

    /// Remove the definition `name` and its cached singleton
    pub fn remove_bean_definition(&self, name: &str) -> BeansResult<()> {
        if self.definitions.write().shift_remove(name).is_none() {
            return Err(BeansError::NoSuchBean {
                name: name.to_string(),
            });
        }
        self.reset_bean(name);
        debug!(bean = %name, "Removed bean definition");
        Ok(())
    }

    /// Drop cached state derived from a definition
    fn reset_bean(&self, name: &str) {
        // Children may have merged the old definition.
        self.merged.write().clear();
        self.singletons.write().shift_remove(name);
        self.factory_products.lock().remove(name);
    }

    /// Register `alias` as another name for `name`
    pub fn register_alias(&self, name: &str, alias: &str) -> BeansResult<()> {
        if alias == name {
            self.aliases.write().shift_remove(alias);
            return Ok(());
        }
        let store_error = |message: String| BeansError::BeanDefinitionStore {
            resource_description: None,
            bean_name: Some(name.to_string()),
            message,
        };
        if self.definitions.read().contains_key(alias) {
            return Err(store_error(format!(
                "Cannot register alias '{}' for name '{}': a bean definition uses that name",
                alias, name
            )));
        }
        if self.canonical_name(name) == alias {
            return Err(store_error(format!(
                "Cannot register alias '{}' for name '{}': circular reference",
                alias, name
            )));
        }

        let mut aliases = self.aliases.write();
        if let Some(existing) = aliases.get(alias) {
            if existing == name {
                return Ok(());
            }
            if !self.settings.allow_definition_overriding {
                return Err(store_error(format!(
                    "Cannot register alias '{}' for name '{}': it is already registered for name '{}'",
                    alias, name, existing
                )));
            }
            warn!(alias = %alias, previous = %existing, "Overriding alias");
        }
        aliases.insert(alias.to_string(), name.to_string());
        debug!(alias = %alias, bean = %name, "Registered alias");
        Ok(())
    }

    /// Aliases registered directly for `name`
    pub fn aliases(&self, name: &str) -> Vec<String> {
        self.aliases
            .read()
            .iter()
            .filter(|(_, target)| target.as_str() == name)
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    /// Follow aliases to the registered name
    pub fn canonical_name(&self, name: &str) -> String {
        let aliases = self.aliases.read();
        let mut canonical = name;
        let mut hops = 0;
        while let Some(target) = aliases.get(canonical) {
            canonical = target.as_str();
            hops += 1;
            if hops > aliases.len() {
                break;
            }
        }
        canonical.to_string()
    }

    /// Whether a definition is registered under exactly `name`
    pub fn contains_bean_definition(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    /// Definition registered for `name` or its alias
    pub fn bean_definition(&self, name: &str) -> Option<Arc<BeanDefinition>> {
        self.definitions
            .read()
            .get(&self.canonical_name(name))
            .cloned()
    }

    /// Registered definition names, in registration order
    pub fn bean_definition_names(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }

    /// Number of registered definitions
    pub fn bean_definition_count(&self) -> usize {
        self.definitions.read().len()
    }

    // -----------------------------------------------------------------------
    // Singletons
    // -----------------------------------------------------------------------

    /// Register a ready-made singleton under `name`
    pub fn register_singleton(&self, name: impl Into<String>, instance: Value) -> BeansResult<()> {
        let name = name.into();
        let mut singletons = self.singletons.write();
        if singletons.contains_key(&name) {
            return Err(BeansError::BeanDefinitionStore {
                resource_description: None,
                bean_name: Some(name.clone()),
                message: format!(
                    "Could not register object under bean name '{}': there is already an object bound",
                    name
                ),
            });
        }
        singletons.insert(name.clone(), instance);
        debug!(bean = %name, "Registered singleton");
        Ok(())
    }

    /// Whether a singleton instance is cached under `name`
    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.read().contains_key(name)
    }

    pub(crate) fn singleton(&self, name: &str) -> Option<Value> {
        self.singletons.read().get(name).cloned()
    }

    /// Names of cached singletons, in creation order
    pub fn singleton_names(&self) -> Vec<String> {
        self.singletons.read().keys().cloned().collect()
    }

    /// Whether `name` is known here, without consulting the parent
    pub fn contains_local_bean(&self, name: &str) -> bool {
        let bean_name = self.canonical_name(transformed_bean_name(name));
        self.contains_singleton(&bean_name) || self.contains_bean_definition(&bean_name)
    }

    /// Whether the calling thread is currently creating `name`
    pub fn is_currently_in_creation(&self, name: &str) -> bool {
        self.in_creation
            .lock()
            .get(&std::thread::current().id())
            .map_or(false, |names| names.contains(name))
    }

    /// Realize every non-lazy singleton definition
    pub fn preinstantiate_singletons(&self) -> BeansResult<()> {
        let mut count = 0usize;
        for name in self.bean_definition_names() {
            let merged = self.get_merged_bean_definition(&name)?;
            if !merged.is_singleton() || merged.is_lazy_init() {
                continue;
            }
            let is_factory_class = merged
                .class_name()
                .map_or(false, |class| self.classes.product_type(class).is_some());
            if is_factory_class {
                self.get_bean(&format!("{}{}", FACTORY_BEAN_PREFIX, name))?;
            } else {
                self.get_bean(&name)?;
            }
            count += 1;
        }
        info!(count, "Pre-instantiated singletons");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bean retrieval
    // -----------------------------------------------------------------------

    fn do_get_bean(&self, name: &str) -> BeansResult<Value> {
        let bean_name = self.canonical_name(transformed_bean_name(name));

        if let Some(shared) = self.singleton(&bean_name) {
            debug!(bean = %bean_name, "Returning cached singleton");
            let synthetic = self
                .bean_definition(&bean_name)
                .map_or(false, |definition| definition.is_synthetic());
            return self.object_for_instance(shared, name, &bean_name, !synthetic);
        }

        if !self.contains_bean_definition(&bean_name) {
            return match &self.parent {
                Some(parent) if is_factory_dereference(name) => {
                    parent.get_bean(&format!("{}{}", FACTORY_BEAN_PREFIX, bean_name))
                }
                Some(parent) => parent.get_bean(&bean_name),
                None => Err(BeansError::NoSuchBean { name: bean_name }),
            };
        }

        let merged = self.get_merged_bean_definition(&bean_name)?;
        self.realize_depends_on(&bean_name, &merged)?;

        let instance = if merged.is_singleton() {
            self.singleton_or_create(&bean_name, &merged)?
        } else {
            self.create_guarded(&bean_name, &merged)?
        };
        self.object_for_instance(instance, name, &bean_name, !merged.is_synthetic())
    }
}

impl Default for BeanRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the factory dereference prefix
pub(crate) fn transformed_bean_name(name: &str) -> &str {
    name.trim_start_matches(FACTORY_BEAN_PREFIX)
}

pub(crate) fn is_factory_dereference(name: &str) -> bool {
    name.starts_with(FACTORY_BEAN_PREFIX)
}

impl BeanFactory for BeanRegistry {
    fn contains_bean(&self, name: &str) -> bool {
        if self.contains_local_bean(name) {
            return true;
        }
        self.parent
            .as_ref()
            .map_or(false, |parent| parent.contains_bean(name))
    }

    fn get_bean(&self, name: &str) -> BeansResult<Value> {
        self.do_get_bean(name)
    }

    fn get_bean_of_type(&self, name: &str, required_type: &TypeHandle) -> BeansResult<Value> {
        let bean = self.do_get_bean(name)?;
        if required_type.is_assignable_from(&bean) {
            return Ok(bean);
        }
        Err(BeansError::BeanNotOfRequiredType {
            name: name.to_string(),
            required_type: required_type.to_string(),
            actual_type: bean.kind().to_string(),
        })
    }

    fn get_bean_by_type(&self, required_type: &TypeHandle) -> BeansResult<Value> {
        self.select_named_bean(required_type).map(|named| named.instance)
    }
}

impl BeanContainer for BeanRegistry {
    fn parent_bean_factory(&self) -> Option<Arc<dyn BeanFactory>> {
        self.parent
            .clone()
            .map(|parent| parent as Arc<dyn BeanFactory>)
    }

    fn resolve_named_bean(&self, required_type: &TypeHandle) -> BeansResult<NamedBean> {
        self.select_named_bean(required_type)
    }

    fn resolve_dependency(
        &self,
        descriptor: &DependencyDescriptor,
        requesting_bean_name: &str,
        autowired_bean_names: &mut Vec<String>,
        converter: &dyn TypeConverter,
    ) -> BeansResult<Value> {
        self.autowire(descriptor, requesting_bean_name, autowired_bean_names, converter)
    }

    fn register_dependent_bean(&self, bean_name: &str, dependent_bean_name: &str) {
        self.register_dependent(bean_name, dependent_bean_name);
    }

    fn register_contained_bean(&self, contained_bean_name: &str, containing_bean_name: &str) {
        self.register_contained(contained_bean_name, containing_bean_name);
    }

    fn is_bean_name_in_use(&self, name: &str) -> bool {
        self.aliases.read().contains_key(name)
            || self.contains_local_bean(name)
            || self.has_dependent_bean(name)
    }

    fn merged_bean_definition(
        &self,
        bean_name: &str,
        definition: &BeanDefinition,
        containing_definition: Option<&BeanDefinition>,
    ) -> BeansResult<Arc<BeanDefinition>> {
        self.merge_definition(bean_name, definition, containing_definition)
    }

    fn create_bean(&self, bean_name: &str, definition: &Arc<BeanDefinition>) -> BeansResult<Value> {
        self.instantiate(bean_name, definition)
    }

    fn object_from_factory_bean(
        &self,
        factory: &Arc<dyn FactoryBean>,
        bean_name: &str,
        should_post_process: bool,
    ) -> BeansResult<Value> {
        self.product_of(factory, bean_name, should_post_process)
    }

    fn evaluate_bean_definition_string(
        &self,
        text: &str,
        _definition: Option<&BeanDefinition>,
    ) -> BeansResult<Value> {
        self.placeholders.evaluate(text)
    }

    fn resolve_type(&self, type_name: &str) -> BeansResult<TypeHandle> {
        self.classes.resolve_type(type_name)
    }
}

/// Builder for a [`BeanRegistry`]
#[derive(Default)]
pub struct BeanRegistryBuilder {
    settings: ContainerSettings,
    classes: ClassRegistry,
    parent: Option<Arc<BeanRegistry>>,
    post_processor: Option<PostProcessor>,
    converter: Option<Arc<dyn TypeConverter>>,
}

impl BeanRegistryBuilder {
    /// Use `settings` instead of the defaults
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Add a placeholder property to the settings
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.properties.insert(key.into(), value.into());
        self
    }

    /// Use a prepared class registry
    pub fn classes(mut self, classes: ClassRegistry) -> Self {
        self.classes = classes;
        self
    }

    /// Register a bean class
    pub fn class<F>(mut self, class_name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&BeanProperties) -> BeansResult<Bean> + Send + Sync + 'static,
    {
        self.classes.register(class_name, constructor);
        self
    }

    /// Register a class whose instances are factory beans producing `product_type`
    pub fn factory_class<F>(
        mut self,
        class_name: impl Into<String>,
        product_type: TypeHandle,
        constructor: F,
    ) -> Self
    where
        F: Fn(&BeanProperties) -> BeansResult<Bean> + Send + Sync + 'static,
    {
        self.classes
            .register_factory(class_name, product_type, constructor);
        self
    }

    /// Fall back to `parent` for unknown names
    pub fn parent(mut self, parent: Arc<BeanRegistry>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Apply `post_processor` to factory bean products
    pub fn post_processor<F>(mut self, post_processor: F) -> Self
    where
        F: Fn(&str, Value) -> BeansResult<Value> + Send + Sync + 'static,
    {
        self.post_processor = Some(Arc::new(post_processor));
        self
    }

    /// Use a custom type converter
    pub fn converter(mut self, converter: Arc<dyn TypeConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Validate the settings and build the registry
    pub fn build(self) -> ConfigResult<BeanRegistry> {
        self.settings.validate()?;
        Ok(BeanRegistry::assemble(
            self.settings,
            self.classes,
            self.parent,
            self.post_processor,
            self.converter
                .unwrap_or_else(|| Arc::new(SimpleTypeConverter::new())),
        ))
    }
}

//! Class registry: bean class names mapped to constructors

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use beanwire_core::{Bean, BeansError, BeansResult, TypeHandle, Value};
use indexmap::IndexMap;

/// Builds an instance from the resolved arguments and properties of a bean
pub type Constructor = Arc<dyn Fn(&BeanProperties) -> BeansResult<Bean> + Send + Sync>;

/// Resolved constructor arguments and property values handed to a constructor
#[derive(Debug, Clone, Default)]
pub struct BeanProperties {
    bean_name: String,
    arguments: Vec<Value>,
    properties: IndexMap<String, Value>,
}

impl BeanProperties {
    /// Resolved inputs for the bean `bean_name`
    pub fn new(
        bean_name: impl Into<String>,
        arguments: Vec<Value>,
        properties: IndexMap<String, Value>,
    ) -> Self {
        Self {
            bean_name: bean_name.into(),
            arguments,
            properties,
        }
    }

    /// Name of the bean being constructed
    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }

    /// Resolved constructor arguments in order
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Resolved constructor argument at `index`
    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    /// Resolved properties in declaration order
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Resolved property `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Property value that must be present
    pub fn require(&self, name: &str) -> BeansResult<&Value> {
        self.properties
            .get(name)
            .ok_or_else(|| BeansError::BeanCreation {
                resource_description: None,
                bean_name: Some(self.bean_name.clone()),
                message: format!("Required property '{}' is not set", name),
                source: None,
            })
    }
}

#[derive(Clone)]
struct ClassEntry {
    constructor: Constructor,
    /// Set for factory classes: the type of the object they produce
    product_type: Option<TypeHandle>,
}

/// Known bean classes
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassEntry>,
}

impl ClassRegistry {
    /// Create an empty class registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `class_name`
    pub fn register<F>(&mut self, class_name: impl Into<String>, constructor: F)
    where
        F: Fn(&BeanProperties) -> BeansResult<Bean> + Send + Sync + 'static,
    {
        self.classes.insert(
            class_name.into(),
            ClassEntry {
                constructor: Arc::new(constructor),
                product_type: None,
            },
        );
    }

    /// Register a class whose instances are factory beans producing `product_type`
    pub fn register_factory<F>(
        &mut self,
        class_name: impl Into<String>,
        product_type: TypeHandle,
        constructor: F,
    ) where
        F: Fn(&BeanProperties) -> BeansResult<Bean> + Send + Sync + 'static,
    {
        self.classes.insert(
            class_name.into(),
            ClassEntry {
                constructor: Arc::new(constructor),
                product_type: Some(product_type),
            },
        );
    }

    /// Whether `class_name` is registered
    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// Constructor registered for `class_name`
    pub fn constructor(&self, class_name: &str) -> Option<Constructor> {
        self.classes
            .get(class_name)
            .map(|entry| Arc::clone(&entry.constructor))
    }

    /// Product type of a factory class
    pub fn product_type(&self, class_name: &str) -> Option<&TypeHandle> {
        self.classes
            .get(class_name)
            .and_then(|entry| entry.product_type.as_ref())
    }

    /// Resolve a type name: built-in names first, then registered classes
    pub fn resolve_type(&self, type_name: &str) -> BeansResult<TypeHandle> {
        if let Some(builtin) = TypeHandle::builtin(type_name) {
            return Ok(builtin);
        }
        if self.contains(type_name) {
            return Ok(TypeHandle::class(type_name));
        }
        Err(BeansError::TypeNotFound {
            type_name: type_name.to_string(),
        })
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.classes.keys().collect();
        names.sort();
        f.debug_struct("ClassRegistry").field("classes", &names).finish()
    }
}

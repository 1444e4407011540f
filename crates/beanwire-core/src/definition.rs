//! Bean definitions: declarative descriptions of how to build a managed object

use std::sync::Arc;

use crate::raw::RawValue;

/// Bean lifecycle scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// One shared instance per container
    #[default]
    Singleton,
    /// A new instance on every request
    Prototype,
}

/// A named property value of a definition
#[derive(Debug, Clone)]
pub struct PropertyValue {
    pub name: String,
    pub value: RawValue,
}

impl PropertyValue {
    /// Create a property value named `name`
    pub fn new(name: impl Into<String>, value: RawValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Descriptor of how to build an object
#[derive(Debug, Clone, Default)]
pub struct BeanDefinition {
    class_name: Option<String>,
    parent_name: Option<String>,
    scope: Option<Scope>,
    depends_on: Vec<String>,
    synthetic: bool,
    primary: bool,
    lazy_init: bool,
    resource_description: Option<String>,
    constructor_arguments: Vec<RawValue>,
    property_values: Vec<PropertyValue>,
}

impl BeanDefinition {
    /// Create a singleton definition for `class_name`
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Self::default()
        }
    }

    /// A definition that inherits everything unset from `parent_name`
    pub fn child_of(parent_name: impl Into<String>) -> Self {
        Self {
            parent_name: Some(parent_name.into()),
            ..Self::default()
        }
    }

    /// Set the bean class
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Set the declared scope
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Declare the prototype scope
    pub fn prototype(self) -> Self {
        self.with_scope(Scope::Prototype)
    }

    /// Add a bean that must be realized before this one
    pub fn depends_on(mut self, bean_name: impl Into<String>) -> Self {
        self.depends_on.push(bean_name.into());
        self
    }

    /// Replace the depends-on list
    pub fn with_depends_on(mut self, bean_names: Vec<String>) -> Self {
        self.depends_on = bean_names;
        self
    }

    /// Mark the definition as synthetic, suppressing post-processing
    pub fn synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }

    /// Prefer this bean when several match a type
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Skip this bean during eager singleton creation
    pub fn lazy_init(mut self, lazy_init: bool) -> Self {
        self.lazy_init = lazy_init;
        self
    }

    /// Describe where the definition came from, for error messages
    pub fn with_resource_description(mut self, description: impl Into<String>) -> Self {
        self.resource_description = Some(description.into());
        self
    }

    /// Append a constructor argument
    pub fn with_constructor_argument(mut self, value: RawValue) -> Self {
        self.constructor_arguments.push(value);
        self
    }

    /// Replace all constructor arguments
    pub fn with_constructor_arguments(mut self, values: Vec<RawValue>) -> Self {
        self.constructor_arguments = values;
        self
    }

    /// Add a property, replacing an existing one of the same name
    pub fn with_property(mut self, name: impl Into<String>, value: RawValue) -> Self {
        let name = name.into();
        match self.property_values.iter_mut().find(|pv| pv.name == name) {
            Some(existing) => existing.value = value,
            None => self.property_values.push(PropertyValue::new(name, value)),
        }
        self
    }

    /// Drop the parent definition name
    pub fn without_parent(mut self) -> Self {
        self.parent_name = None;
        self
    }

    /// Bean class name, if set
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Name of the parent definition, if any
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Explicitly declared scope, if any
    pub fn declared_scope(&self) -> Option<Scope> {
        self.scope
    }

    /// Effective scope; singleton unless declared otherwise
    pub fn scope(&self) -> Scope {
        self.scope.unwrap_or_default()
    }

    /// Whether the effective scope is singleton
    pub fn is_singleton(&self) -> bool {
        self.scope() == Scope::Singleton
    }

    /// Whether the effective scope is prototype
    pub fn is_prototype(&self) -> bool {
        self.scope() == Scope::Prototype
    }

    /// Names of beans that must be realized before this one
    pub fn depends_on_names(&self) -> &[String] {
        &self.depends_on
    }

    /// Whether the definition is synthetic
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Whether the bean is the primary candidate for its type
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Whether eager singleton creation skips this bean
    pub fn is_lazy_init(&self) -> bool {
        self.lazy_init
    }

    /// Where the definition came from
    pub fn resource_description(&self) -> Option<&str> {
        self.resource_description.as_deref()
    }

    /// Constructor arguments in order
    pub fn constructor_arguments(&self) -> &[RawValue] {
        &self.constructor_arguments
    }

    /// Property values in declaration order
    pub fn property_values(&self) -> &[PropertyValue] {
        &self.property_values
    }

    /// Raw value of the property `name`
    pub fn property_value(&self, name: &str) -> Option<&RawValue> {
        self.property_values
            .iter()
            .find(|pv| pv.name == name)
            .map(|pv| &pv.value)
    }
}

/// A definition paired with the name (and aliases) it should be known under
#[derive(Debug, Clone)]
pub struct BeanDefinitionHolder {
    name: String,
    aliases: Vec<String>,
    definition: Arc<BeanDefinition>,
}

impl BeanDefinitionHolder {
    /// Create a holder binding `definition` to `name`
    pub fn new(name: impl Into<String>, definition: BeanDefinition) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            definition: Arc::new(definition),
        }
    }

    /// Set the aliases registered alongside the name
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Bean name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases for the bean name
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The held definition
    pub fn definition(&self) -> &Arc<BeanDefinition> {
        &self.definition
    }
}

//! Raw values: the declarative input to value resolution

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::definition::{BeanDefinition, BeanDefinitionHolder};
use crate::types::TypeHandle;
use crate::value::Value;

/// A declarative property or constructor-argument value
#[derive(Debug, Clone)]
pub enum RawValue {
    /// Reference to another managed bean by name and/or type
    Reference(BeanReference),
    /// A bean name that must exist; resolves to the name itself
    NameReference(BeanNameReference),
    /// An anonymous nested bean definition
    InnerBean(Arc<BeanDefinition>),
    /// A nested bean definition with an explicit name
    InnerBeanHolder(BeanDefinitionHolder),
    /// A request for autowiring by type
    Dependency(DependencyDescriptor),
    Array(ManagedArray),
    List(ManagedList),
    Set(ManagedSet),
    Map(ManagedMap),
    Properties(ManagedProperties),
    TypedString(TypedStringValue),
    /// An explicit null, distinct from an absent value
    Null,
    /// Anything else; text and text arrays still go through expression evaluation
    Literal(Value),
}

impl RawValue {
    /// Reference to the bean named `bean_name`
    pub fn reference(bean_name: impl Into<String>) -> Self {
        RawValue::Reference(BeanReference::named(bean_name))
    }

    /// Typed string without a target type
    pub fn typed(value: impl Into<String>) -> Self {
        RawValue::TypedString(TypedStringValue::new(value))
    }

    /// Anonymous inner bean built from `definition`
    pub fn inner_bean(definition: BeanDefinition) -> Self {
        RawValue::InnerBean(Arc::new(definition))
    }

    /// Literal value, evaluated if it is text
    pub fn literal(value: impl Into<Value>) -> Self {
        RawValue::Literal(value.into())
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Literal(value)
    }
}

/// Reference to another bean, optionally in the parent container
#[derive(Debug, Clone, PartialEq)]
pub struct BeanReference {
    bean_name: Option<String>,
    bean_type: Option<TypeHandle>,
    to_parent: bool,
}

impl BeanReference {
    /// Reference by name only
    pub fn named(bean_name: impl Into<String>) -> Self {
        Self {
            bean_name: Some(bean_name.into()),
            bean_type: None,
            to_parent: false,
        }
    }

    /// Reference by type only
    pub fn of_type(bean_type: TypeHandle) -> Self {
        Self {
            bean_name: None,
            bean_type: Some(bean_type),
            to_parent: false,
        }
    }

    /// Reference by name, checked against a type
    pub fn named_of_type(bean_name: impl Into<String>, bean_type: TypeHandle) -> Self {
        Self {
            bean_name: Some(bean_name.into()),
            bean_type: Some(bean_type),
            to_parent: false,
        }
    }

    /// Look the target up in the parent container instead
    pub fn in_parent(mut self) -> Self {
        self.to_parent = true;
        self
    }

    /// Target bean name, possibly an expression
    pub fn bean_name(&self) -> Option<&str> {
        self.bean_name.as_deref()
    }

    /// Required bean type, if any
    pub fn bean_type(&self) -> Option<&TypeHandle> {
        self.bean_type.as_ref()
    }

    /// Whether the lookup goes to the parent container
    pub fn is_to_parent(&self) -> bool {
        self.to_parent
    }

    /// The unevaluated target, as reported in errors
    pub fn target(&self) -> &str {
        match (&self.bean_name, &self.bean_type) {
            (Some(name), _) => name,
            (None, Some(bean_type)) => bean_type.name(),
            (None, None) => "",
        }
    }
}

impl fmt::Display for BeanReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.target())
    }
}

/// A reference by name only: checked for existence, never instantiated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanNameReference {
    bean_name: String,
}

impl BeanNameReference {
    /// Name reference to `bean_name`
    pub fn new(bean_name: impl Into<String>) -> Self {
        Self {
            bean_name: bean_name.into(),
        }
    }

    /// Referenced bean name, possibly an expression
    pub fn bean_name(&self) -> &str {
        &self.bean_name
    }
}

/// Result shape requested by a dependency descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependencyShape {
    #[default]
    Single,
    List,
    Map,
}

/// A request to let the container pick candidates by type
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyDescriptor {
    required_type: TypeHandle,
    shape: DependencyShape,
    required: bool,
    qualifier: Option<String>,
    dependency_name: Option<String>,
}

impl DependencyDescriptor {
    /// Required single dependency of `required_type`
    pub fn new(required_type: TypeHandle) -> Self {
        Self {
            required_type,
            shape: DependencyShape::Single,
            required: true,
            qualifier: None,
            dependency_name: None,
        }
    }

    /// Set whether one bean, a list or a map is injected
    pub fn with_shape(mut self, shape: DependencyShape) -> Self {
        self.shape = shape;
        self
    }

    /// Allow the dependency to resolve to null
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restrict candidates to the bean with this name
    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Name of the field or parameter, used as a fallback tie-break
    pub fn with_dependency_name(mut self, name: impl Into<String>) -> Self {
        self.dependency_name = Some(name.into());
        self
    }

    /// Type candidates must match
    pub fn required_type(&self) -> &TypeHandle {
        &self.required_type
    }

    /// Injected shape
    pub fn shape(&self) -> DependencyShape {
        self.shape
    }

    /// Whether a missing candidate is an error
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Qualifying bean name, if any
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Name of the injection point, used to break ties
    pub fn dependency_name(&self) -> Option<&str> {
        self.dependency_name.as_deref()
    }
}

/// Declared conversion target of a typed string
#[derive(Debug, Clone, PartialEq)]
pub enum TargetType {
    Resolved(TypeHandle),
    /// Resolved lazily through the container
    Named(String),
}

/// Text with an optional conversion target; may contain an expression
#[derive(Debug)]
pub struct TypedStringValue {
    value: Option<String>,
    target_type: Option<TargetType>,
    resolved_target_type: OnceLock<TypeHandle>,
    dynamic: AtomicBool,
}

impl TypedStringValue {
    /// Typed string holding `value`
    pub fn new(value: impl Into<String>) -> Self {
        Self::from_option(Some(value.into()))
    }

    /// A typed value whose text is null
    pub fn null() -> Self {
        Self::from_option(None)
    }

    fn from_option(value: Option<String>) -> Self {
        Self {
            value,
            target_type: None,
            resolved_target_type: OnceLock::new(),
            dynamic: AtomicBool::new(false),
        }
    }

    /// Convert the evaluated value to `target_type`
    pub fn with_target_type(mut self, target_type: TypeHandle) -> Self {
        self.target_type = Some(TargetType::Resolved(target_type));
        self
    }

    /// Convert to the type named `type_name`, resolved on first use
    pub fn with_target_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.target_type = Some(TargetType::Named(type_name.into()));
        self
    }

    /// Raw text, `None` for a null typed string
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Declared target type, resolved or by name
    pub fn target_type(&self) -> Option<&TargetType> {
        self.target_type.as_ref()
    }

    /// Target type resolved earlier, or declared as a handle
    pub fn resolved_target_type(&self) -> Option<&TypeHandle> {
        match &self.target_type {
            Some(TargetType::Resolved(handle)) => Some(handle),
            Some(TargetType::Named(_)) => self.resolved_target_type.get(),
            None => None,
        }
    }

    /// Remember a resolved target type; returns whichever handle is cached
    pub fn cache_target_type(&self, handle: TypeHandle) -> &TypeHandle {
        self.resolved_target_type.get_or_init(|| handle)
    }

    /// Whether evaluation has shown this value to contain an expression
    pub fn is_dynamic(&self) -> bool {
        self.dynamic.load(Ordering::Relaxed)
    }

    /// Flag the value as evaluating to something other than its text
    pub fn set_dynamic(&self) {
        self.dynamic.store(true, Ordering::Relaxed);
    }
}

impl Clone for TypedStringValue {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            target_type: self.target_type.clone(),
            resolved_target_type: self.resolved_target_type.clone(),
            dynamic: AtomicBool::new(self.is_dynamic()),
        }
    }
}

/// Array of raw values with a lazily resolved element type
#[derive(Debug, Clone, Default)]
pub struct ManagedArray {
    element_type_name: Option<String>,
    resolved_element_type: OnceLock<TypeHandle>,
    elements: Vec<RawValue>,
}

impl ManagedArray {
    /// Managed array with an optional element type name
    pub fn new(element_type_name: Option<String>, elements: Vec<RawValue>) -> Self {
        Self {
            element_type_name,
            resolved_element_type: OnceLock::new(),
            elements,
        }
    }

    /// Declared element type name
    pub fn element_type_name(&self) -> Option<&str> {
        self.element_type_name.as_deref()
    }

    /// Element type, once resolved
    pub fn resolved_element_type(&self) -> Option<&TypeHandle> {
        self.resolved_element_type.get()
    }

    /// Cache the element type. Recomputing yields the same handle, so
    /// losing a race to another writer is harmless.
    pub fn cache_element_type(&self, handle: TypeHandle) -> &TypeHandle {
        self.resolved_element_type.get_or_init(|| handle)
    }

    /// Elements in declaration order
    pub fn elements(&self) -> &[RawValue] {
        &self.elements
    }
}

/// Ordered list of raw values
#[derive(Debug, Clone, Default)]
pub struct ManagedList {
    elements: Vec<RawValue>,
}

impl ManagedList {
    /// Managed collection from elements in order
    pub fn new(elements: Vec<RawValue>) -> Self {
        Self { elements }
    }

    /// Append an element
    pub fn push(&mut self, value: RawValue) {
        self.elements.push(value);
    }

    /// Elements in declaration order
    pub fn elements(&self) -> &[RawValue] {
        &self.elements
    }
}

impl FromIterator<RawValue> for ManagedList {
    fn from_iter<I: IntoIterator<Item = RawValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Insertion-ordered set of raw values
#[derive(Debug, Clone, Default)]
pub struct ManagedSet {
    elements: Vec<RawValue>,
}

impl ManagedSet {
    /// Managed collection from elements in order
    pub fn new(elements: Vec<RawValue>) -> Self {
        Self { elements }
    }

    /// Append an element
    pub fn push(&mut self, value: RawValue) {
        self.elements.push(value);
    }

    /// Elements in declaration order
    pub fn elements(&self) -> &[RawValue] {
        &self.elements
    }
}

impl FromIterator<RawValue> for ManagedSet {
    fn from_iter<I: IntoIterator<Item = RawValue>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ordered key/value pairs, keys and values both resolvable
#[derive(Debug, Clone, Default)]
pub struct ManagedMap {
    entries: Vec<(RawValue, RawValue)>,
}

impl ManagedMap {
    /// Managed map from entries in order
    pub fn new(entries: Vec<(RawValue, RawValue)>) -> Self {
        Self { entries }
    }

    /// Append an entry
    pub fn insert(&mut self, key: RawValue, value: RawValue) {
        self.entries.push((key, value));
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[(RawValue, RawValue)] {
        &self.entries
    }
}

impl FromIterator<(RawValue, RawValue)> for ManagedMap {
    fn from_iter<I: IntoIterator<Item = (RawValue, RawValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Key or value of a managed properties table
#[derive(Debug, Clone)]
pub enum PropertyText {
    Plain(String),
    Typed(TypedStringValue),
}

impl From<&str> for PropertyText {
    fn from(value: &str) -> Self {
        PropertyText::Plain(value.to_string())
    }
}

impl From<TypedStringValue> for PropertyText {
    fn from(value: TypedStringValue) -> Self {
        PropertyText::Typed(value)
    }
}

/// Flat string-keyed text table
#[derive(Debug, Clone, Default)]
pub struct ManagedProperties {
    entries: Vec<(PropertyText, PropertyText)>,
}

impl ManagedProperties {
    /// Empty properties table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key/value pair
    pub fn insert(&mut self, key: impl Into<PropertyText>, value: impl Into<PropertyText>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Pairs in declaration order
    pub fn entries(&self) -> &[(PropertyText, PropertyText)] {
        &self.entries
    }
}

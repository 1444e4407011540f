//! Resolved runtime values
//!
//! A [`Value`] is what resolution hands back to the container for assignment:
//! scalars, text, bean instances, and the concrete collection shapes produced
//! from managed collections.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::error::BeansResult;
use crate::types::TypeHandle;

/// A bean that produces another object instead of being the object itself
pub trait FactoryBean: Send + Sync {
    /// Produce the exposed object
    fn get_object(&self) -> BeansResult<Value>;

    /// Type of the produced object, when known up front
    fn object_type(&self) -> Option<TypeHandle> {
        None
    }

    /// Whether the produced object may be cached and shared
    fn is_singleton(&self) -> bool {
        true
    }
}

/// Payload of a bean instance
#[derive(Clone)]
pub enum BeanObject {
    Plain(Arc<dyn Any + Send + Sync>),
    Factory(Arc<dyn FactoryBean>),
    /// The container's explicit-null marker
    Null,
}

/// A managed object instance together with its class name
#[derive(Clone)]
pub struct Bean {
    type_name: Arc<str>,
    object: BeanObject,
}

impl Bean {
    /// Wrap `object` as an instance of `type_name`
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, object: T) -> Self {
        Self::from_arc(type_name, Arc::new(object))
    }

    /// Wrap an already shared object
    pub fn from_arc(type_name: impl Into<Arc<str>>, object: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            type_name: type_name.into(),
            object: BeanObject::Plain(object),
        }
    }

    /// Wrap a factory bean
    pub fn factory(type_name: impl Into<Arc<str>>, factory: Arc<dyn FactoryBean>) -> Self {
        Self {
            type_name: type_name.into(),
            object: BeanObject::Factory(factory),
        }
    }

    /// The marker a container hands out for a bean that is explicitly null
    pub fn null() -> Self {
        Self {
            type_name: Arc::from("null"),
            object: BeanObject::Null,
        }
    }

    /// Name of the bean's class
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The wrapped object
    pub fn object(&self) -> &BeanObject {
        &self.object
    }

    /// Whether this is the explicit-null marker
    pub fn is_null_bean(&self) -> bool {
        matches!(self.object, BeanObject::Null)
    }

    /// The factory, if this bean is one
    pub fn as_factory(&self) -> Option<&Arc<dyn FactoryBean>> {
        match &self.object {
            BeanObject::Factory(factory) => Some(factory),
            _ => None,
        }
    }

    /// Downcast a plain instance to its concrete type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match &self.object {
            BeanObject::Plain(object) => object.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Bean) -> bool {
        match (&self.object, &other.object) {
            (BeanObject::Null, BeanObject::Null) => true,
            _ => self.address() != 0 && self.address() == other.address(),
        }
    }

    fn address(&self) -> usize {
        match &self.object {
            BeanObject::Plain(object) => Arc::as_ptr(object) as *const () as usize,
            BeanObject::Factory(factory) => Arc::as_ptr(factory) as *const () as usize,
            BeanObject::Null => 0,
        }
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("type_name", &self.type_name)
            .field("address", &format_args!("{:#x}", self.address()))
            .field("factory", &self.as_factory().is_some())
            .finish()
    }
}

impl PartialEq for Bean {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Bean {}

impl Hash for Bean {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

/// A fixed-size array with a declared element type
///
/// Items sit behind an `Arc` so an unchanged array can be handed back
/// without copying; [`ArrayValue::ptr_eq`] observes that.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    element_type: TypeHandle,
    items: Arc<[Value]>,
}

impl ArrayValue {
    /// Array of `element_type` holding `items`
    pub fn new(element_type: TypeHandle, items: Vec<Value>) -> Self {
        Self {
            element_type,
            items: items.into(),
        }
    }

    /// An array of text with element type `string`
    pub fn of_text<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            TypeHandle::Text,
            items.into_iter().map(|s| Value::Text(s.into())).collect(),
        )
    }

    /// Declared element type
    pub fn element_type(&self) -> &TypeHandle {
        &self.element_type
    }

    /// Elements in order
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether both arrays share the same storage
    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        self.element_type == other.element_type && self.items == other.items
    }
}

/// A resolved value
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Text(String),
    Instance(Bean),
    Array(ArrayValue),
    List(Vec<Value>),
    Set(IndexSet<Value>),
    Map(IndexMap<Value, Value>),
    Properties(IndexMap<String, String>),
}

impl Value {
    /// Text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Whether this is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text content, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer content, if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Bean, if this is an instance
    pub fn as_bean(&self) -> Option<&Bean> {
        match self {
            Value::Instance(bean) => Some(bean),
            _ => None,
        }
    }

    /// Elements, if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Array, if this is an array
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Short description of the value's kind, for diagnostics
    pub fn kind(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Text(_) => "string",
            Value::Instance(bean) => bean.type_name(),
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Properties(_) => "properties",
        }
    }
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a Value>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Char(value) => write!(f, "{}", value),
            Value::Text(value) => f.write_str(value),
            Value::Instance(bean) => write!(f, "{}@{:x}", bean.type_name(), bean.address()),
            Value::Array(array) => {
                f.write_str("[")?;
                write_joined(f, array.items())?;
                f.write_str("]")
            }
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Value::Set(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Properties(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // bitwise so that equality agrees with `Hash`
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Instance(a), Value::Instance(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Properties(a), Value::Properties(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(value) => value.hash(state),
            Value::Int(value) => value.hash(state),
            Value::Float(value) => value.to_bits().hash(state),
            Value::Char(value) => value.hash(state),
            Value::Text(value) => value.hash(state),
            Value::Instance(bean) => bean.hash(state),
            Value::Array(array) => array.items().hash(state),
            Value::List(items) => items.hash(state),
            // set and map equality ignore order
            Value::Set(items) => items.len().hash(state),
            Value::Map(entries) => entries.len().hash(state),
            Value::Properties(entries) => entries.len().hash(state),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Bean> for Value {
    fn from(bean: Bean) -> Self {
        Value::Instance(bean)
    }
}

impl From<ArrayValue> for Value {
    fn from(array: ArrayValue) -> Self {
        Value::Array(array)
    }
}

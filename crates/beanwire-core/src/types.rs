//! Runtime type handles used for conversion targets and by-type lookups

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A resolved type: one of the built-in scalar kinds or a named bean class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHandle {
    /// The universal "any object" type
    Any,
    Bool,
    Int,
    Float,
    Char,
    Text,
    /// A bean class known to the container
    Class(Arc<str>),
}

impl TypeHandle {
    /// Handle for the bean class `name`
    pub fn class(name: impl Into<Arc<str>>) -> Self {
        TypeHandle::Class(name.into())
    }

    /// Look up a built-in type by one of its accepted names
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "object" | "Object" | "any" => Some(TypeHandle::Any),
            "bool" | "boolean" | "Boolean" => Some(TypeHandle::Bool),
            "int" | "integer" | "Integer" | "long" | "Long" | "i32" | "i64" => Some(TypeHandle::Int),
            "float" | "Float" | "double" | "Double" | "f32" | "f64" => Some(TypeHandle::Float),
            "char" | "Character" => Some(TypeHandle::Char),
            "string" | "String" | "str" => Some(TypeHandle::Text),
            _ => None,
        }
    }

    /// Display name of the type
    pub fn name(&self) -> &str {
        match self {
            TypeHandle::Any => "object",
            TypeHandle::Bool => "bool",
            TypeHandle::Int => "int",
            TypeHandle::Float => "float",
            TypeHandle::Char => "char",
            TypeHandle::Text => "string",
            TypeHandle::Class(name) => name,
        }
    }

    /// Whether `value` can be assigned to this type without conversion
    pub fn is_assignable_from(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeHandle::Any, _) => true,
            (TypeHandle::Bool, Value::Bool(_))
            | (TypeHandle::Int, Value::Int(_))
            | (TypeHandle::Float, Value::Float(_))
            | (TypeHandle::Char, Value::Char(_))
            | (TypeHandle::Text, Value::Text(_)) => true,
            (TypeHandle::Text | TypeHandle::Class(_), Value::Null) => true,
            (TypeHandle::Class(name), Value::Instance(bean)) => {
                bean.is_null_bean() || bean.type_name() == name.as_ref()
            }
            _ => false,
        }
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! Argument paths for diagnostics
//!
//! An [`ArgumentPath`] names the property or constructor argument being
//! resolved and, for collection elements, the index or key within it. Child
//! segments borrow their parent, so extending a path costs nothing; text is
//! only produced when an error message is formatted.

use std::fmt;

use crate::value::Value;

/// Position inside a collection
#[derive(Debug, Clone, Copy)]
pub enum KeySegment<'a> {
    /// Position in a list, array or set
    Index(usize),
    /// Resolved key of a map entry
    Key(&'a Value),
}

/// Chain identifying which argument, and where inside it, is being resolved
#[derive(Debug, Clone, Copy)]
pub enum ArgumentPath<'a> {
    Property(&'a str),
    ConstructorArgument(usize),
    Keyed {
        parent: &'a ArgumentPath<'a>,
        key: KeySegment<'a>,
    },
}

impl<'a> ArgumentPath<'a> {
    /// Path of a named bean property
    pub fn property(name: &'a str) -> Self {
        ArgumentPath::Property(name)
    }

    /// Path of the constructor argument at `index`
    pub fn constructor_argument(index: usize) -> Self {
        ArgumentPath::ConstructorArgument(index)
    }

    /// Child path for the element at `index`
    pub fn with_index<'b>(&'b self, index: usize) -> ArgumentPath<'b> {
        ArgumentPath::Keyed {
            parent: self,
            key: KeySegment::Index(index),
        }
    }

    /// Child path for the map entry under `key`
    pub fn with_key<'b>(&'b self, key: &'b Value) -> ArgumentPath<'b> {
        ArgumentPath::Keyed {
            parent: self,
            key: KeySegment::Key(key),
        }
    }
}

impl fmt::Display for ArgumentPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentPath::Property(name) => write!(f, "bean property '{}'", name),
            ArgumentPath::ConstructorArgument(index) => {
                write!(f, "constructor argument with index {}", index)
            }
            ArgumentPath::Keyed { parent, key } => match key {
                KeySegment::Index(index) => write!(f, "{} with key [{}]", parent, index),
                KeySegment::Key(key) => write!(f, "{} with key [{}]", parent, key),
            },
        }
    }
}

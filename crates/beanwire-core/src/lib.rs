//! Value resolution engine for the beanwire container
//!
//! Bean definitions describe property and constructor values declaratively:
//! literals, references to other beans, nested anonymous beans, managed
//! collections of any of these, and text that may contain expressions. This
//! crate turns those [`RawValue`]s into the concrete [`Value`]s to assign,
//! asking a [`BeanContainer`] to realize whatever they point at.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use beanwire_core::{ArgumentPath, RawValue, SimpleTypeConverter, ValueResolver};
//!
//! let converter = SimpleTypeConverter::new();
//! let resolver = ValueResolver::new(&container, "orderService", &definition, &converter);
//! let repository = resolver.resolve_value_if_necessary(
//!     &ArgumentPath::property("repository"),
//!     &RawValue::reference("repository"),
//! )?;
//! ```
//!
//! The container side of the contract lives in [`container`]; the
//! `beanwire-container` crate provides an in-memory implementation.

pub mod container;
pub mod convert;
pub mod definition;
pub mod error;
pub mod path;
pub mod raw;
pub mod resolver;
pub mod types;
pub mod value;

pub use container::{BeanContainer, BeanFactory, NamedBean};
pub use convert::{SimpleTypeConverter, TypeConverter};
pub use definition::{BeanDefinition, BeanDefinitionHolder, PropertyValue, Scope};
pub use error::{BeansError, BeansResult};
pub use path::{ArgumentPath, KeySegment};
pub use raw::{
    BeanNameReference, BeanReference, DependencyDescriptor, DependencyShape, ManagedArray,
    ManagedList, ManagedMap, ManagedProperties, ManagedSet, PropertyText, RawValue, TargetType,
    TypedStringValue,
};
pub use resolver::{
    generate_inner_bean_name, unique_inner_bean_name, ValueResolver,
    GENERATED_BEAN_NAME_SEPARATOR, INNER_BEAN_NAME_PREFIX,
};
pub use types::TypeHandle;
pub use value::{ArrayValue, Bean, BeanObject, FactoryBean, Value};

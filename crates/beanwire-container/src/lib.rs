//! In-memory bean container for beanwire
//!
//! [`BeanRegistry`] implements the container side of the value resolver's
//! contract: it keeps bean definitions and aliases, caches singletons,
//! flattens parent/child definitions, records which beans depend on which,
//! selects beans by type, unwraps factory beans and evaluates `${...}`
//! placeholders from its [`ContainerSettings`].
//!
//! ## Quick Start
//!
//! ```rust
//! use beanwire_container::BeanRegistry;
//! use beanwire_core::{Bean, BeanDefinition, BeanFactory, RawValue};
//!
//! let registry = BeanRegistry::builder()
//!     .property("greeting", "hello")
//!     .class("Greeter", |props| {
//!         let text = props.require("text")?.to_string();
//!         Ok(Bean::new("Greeter", text))
//!     })
//!     .build()
//!     .unwrap();
//!
//! registry
//!     .register_bean_definition(
//!         "greeter",
//!         BeanDefinition::new("Greeter").with_property("text", RawValue::literal("${greeting}")),
//!     )
//!     .unwrap();
//!
//! let greeter = registry.get_bean("greeter").unwrap();
//! let text = greeter.as_bean().and_then(|bean| bean.downcast::<String>()).unwrap();
//! assert_eq!(text.as_str(), "hello");
//! ```

pub mod class;
pub mod config;
mod creation;
mod dependency;
mod factory;
pub mod merge;
pub mod placeholder;
pub mod registry;

pub use class::{BeanProperties, ClassRegistry, Constructor};
pub use config::{ConfigError, ConfigResult, ContainerSettings};
pub use merge::merge_with_parent;
pub use placeholder::{PlaceholderResolver, NULL_EXPRESSION};
pub use registry::{BeanRegistry, BeanRegistryBuilder, PostProcessor, FACTORY_BEAN_PREFIX};

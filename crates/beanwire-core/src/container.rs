//! Container capabilities consumed by the value resolver
//!
//! The resolver never sees a concrete container. Everything it needs to
//! realize references, nested beans and prerequisites goes through these
//! traits, and implementations are free to call back into a fresh resolver
//! while serving a request.

use std::sync::Arc;

use crate::convert::TypeConverter;
use crate::definition::BeanDefinition;
use crate::error::BeansResult;
use crate::raw::DependencyDescriptor;
use crate::types::TypeHandle;
use crate::value::{FactoryBean, Value};

/// Lookup operations, also offered by parent containers
pub trait BeanFactory: Send + Sync {
    /// Whether a definition or instance is known under `name`
    fn contains_bean(&self, name: &str) -> bool;

    /// Realize the bean registered under `name`
    fn get_bean(&self, name: &str) -> BeansResult<Value>;

    /// Realize the bean under `name`, checking it against `required_type`
    fn get_bean_of_type(&self, name: &str, required_type: &TypeHandle) -> BeansResult<Value>;

    /// Realize the single bean matching `required_type`
    fn get_bean_by_type(&self, required_type: &TypeHandle) -> BeansResult<Value>;
}

/// A bean instance together with the name it was selected under
#[derive(Debug, Clone)]
pub struct NamedBean {
    pub name: String,
    pub instance: Value,
}

/// Everything the resolver asks of the container building the current bean
pub trait BeanContainer: BeanFactory {
    fn parent_bean_factory(&self) -> Option<Arc<dyn BeanFactory>>;

    /// By-type lookup that also reports which candidate was chosen
    fn resolve_named_bean(&self, required_type: &TypeHandle) -> BeansResult<NamedBean>;

    /// Autowiring candidate selection; pushes every chosen bean name onto
    /// `autowired_bean_names`
    fn resolve_dependency(
        &self,
        descriptor: &DependencyDescriptor,
        requesting_bean_name: &str,
        autowired_bean_names: &mut Vec<String>,
        converter: &dyn TypeConverter,
    ) -> BeansResult<Value>;

    /// Record that `dependent_bean_name` depends on `bean_name`
    fn register_dependent_bean(&self, bean_name: &str, dependent_bean_name: &str);

    /// Record that `contained_bean_name` is nested inside `containing_bean_name`
    fn register_contained_bean(&self, contained_bean_name: &str, containing_bean_name: &str);

    /// Whether `name` is taken by a definition, alias or instance
    fn is_bean_name_in_use(&self, name: &str) -> bool;

    /// Flatten parent/child inheritance for `definition`
    fn merged_bean_definition(
        &self,
        bean_name: &str,
        definition: &BeanDefinition,
        containing_definition: Option<&BeanDefinition>,
    ) -> BeansResult<Arc<BeanDefinition>>;

    /// Construct a new instance for a merged definition
    fn create_bean(&self, bean_name: &str, definition: &Arc<BeanDefinition>) -> BeansResult<Value>;

    /// Unwrap a factory bean into the object it exposes
    fn object_from_factory_bean(
        &self,
        factory: &Arc<dyn FactoryBean>,
        bean_name: &str,
        should_post_process: bool,
    ) -> BeansResult<Value>;

    /// Evaluate expressions in definition text; static text comes back unchanged
    fn evaluate_bean_definition_string(
        &self,
        text: &str,
        definition: Option<&BeanDefinition>,
    ) -> BeansResult<Value>;

    /// Resolve a type by name
    fn resolve_type(&self, type_name: &str) -> BeansResult<TypeHandle>;
}

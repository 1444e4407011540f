//! Names for inner beans

use std::sync::Arc;

use super::{ValueResolver, GENERATED_BEAN_NAME_SEPARATOR, INNER_BEAN_NAME_PREFIX};
use crate::container::BeanContainer;
use crate::definition::BeanDefinition;

/// Synthesize a name for an anonymous inner bean from the identity of its
/// definition
pub fn generate_inner_bean_name(definition: &Arc<BeanDefinition>) -> String {
    format!(
        "{}{}{:x}",
        INNER_BEAN_NAME_PREFIX,
        GENERATED_BEAN_NAME_SEPARATOR,
        Arc::as_ptr(definition) as usize
    )
}

/// First name of the sequence `name`, `name#1`, `name#2`, ... not in use
///
/// Only queries the container; the name is not reserved.
pub fn unique_inner_bean_name(container: &dyn BeanContainer, name: &str) -> String {
    let mut candidate = name.to_string();
    let mut counter = 0usize;
    while container.is_bean_name_in_use(&candidate) {
        counter += 1;
        candidate = format!("{}{}{}", name, GENERATED_BEAN_NAME_SEPARATOR, counter);
    }
    candidate
}

impl ValueResolver<'_> {
    pub(super) fn adapt_inner_bean_name(&self, inner_bean_name: &str) -> String {
        unique_inner_bean_name(self.container, inner_bean_name)
    }
}

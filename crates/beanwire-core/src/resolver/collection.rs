//! Managed collections: arrays, lists, sets and maps

use indexmap::{IndexMap, IndexSet};

use super::ValueResolver;
use crate::error::{BeansError, BeansResult};
use crate::path::ArgumentPath;
use crate::raw::{ManagedArray, RawValue};
use crate::types::TypeHandle;
use crate::value::{ArrayValue, Value};

impl ValueResolver<'_> {
    /// Element type of a managed array, resolved once and cached on the array
    pub(super) fn resolve_element_type(
        &self,
        path: &ArgumentPath<'_>,
        array: &ManagedArray,
    ) -> BeansResult<TypeHandle> {
        if let Some(cached) = array.resolved_element_type() {
            return Ok(cached.clone());
        }
        let resolved = match array.element_type_name() {
            Some(type_name) => self.container.resolve_type(type_name).map_err(|cause| {
                BeansError::creation(
                    self.resource_description(),
                    self.bean_name,
                    format!("Error resolving array type for {}", path),
                    cause,
                )
            })?,
            None => TypeHandle::Any,
        };
        Ok(array.cache_element_type(resolved).clone())
    }

    pub(super) fn resolve_managed_array(
        &self,
        path: &ArgumentPath<'_>,
        element_type: TypeHandle,
        elements: &[RawValue],
    ) -> BeansResult<Value> {
        let items = self.resolve_elements(path, elements)?;
        Ok(Value::Array(ArrayValue::new(element_type, items)))
    }

    pub(super) fn resolve_managed_list(
        &self,
        path: &ArgumentPath<'_>,
        elements: &[RawValue],
    ) -> BeansResult<Value> {
        Ok(Value::List(self.resolve_elements(path, elements)?))
    }

    pub(super) fn resolve_managed_set(
        &self,
        path: &ArgumentPath<'_>,
        elements: &[RawValue],
    ) -> BeansResult<Value> {
        let mut resolved = IndexSet::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            let element_path = path.with_index(position);
            resolved.insert(self.resolve_value_if_necessary(&element_path, element)?);
        }
        Ok(Value::Set(resolved))
    }

    pub(super) fn resolve_managed_map(
        &self,
        path: &ArgumentPath<'_>,
        entries: &[(RawValue, RawValue)],
    ) -> BeansResult<Value> {
        let mut resolved = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let resolved_key = self.resolve_value_if_necessary(path, key)?;
            let value_path = path.with_key(&resolved_key);
            let resolved_value = self.resolve_value_if_necessary(&value_path, value)?;
            resolved.insert(resolved_key, resolved_value);
        }
        Ok(Value::Map(resolved))
    }

    fn resolve_elements(
        &self,
        path: &ArgumentPath<'_>,
        elements: &[RawValue],
    ) -> BeansResult<Vec<Value>> {
        elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                self.resolve_value_if_necessary(&path.with_index(index), element)
            })
            .collect()
    }
}

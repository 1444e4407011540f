//! Dependency bookkeeping, by-type lookup and autowiring

use std::collections::HashSet;

use beanwire_core::{
    BeanContainer, BeanFactory, BeansError, BeansResult, DependencyDescriptor,
    DependencyShape, NamedBean, TypeConverter, TypeHandle, Value,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::registry::BeanRegistry;

impl BeanRegistry {
    /// Record that `dependent_bean_name` depends on `bean_name`
    pub fn register_dependent(&self, bean_name: &str, dependent_bean_name: &str) {
        let bean_name = self.canonical_name(bean_name);
        let inserted = self
            .dependents
            .lock()
            .entry(bean_name.clone())
            .or_default()
            .insert(dependent_bean_name.to_string());
        if !inserted {
            return;
        }
        self.dependencies
            .lock()
            .entry(dependent_bean_name.to_string())
            .or_default()
            .insert(bean_name.clone());
        debug!(bean = %bean_name, dependent = %dependent_bean_name, "Registered dependent bean");
    }

    /// Record an inner bean; the containing bean also becomes its dependent
    pub fn register_contained(&self, contained_bean_name: &str, containing_bean_name: &str) {
        let inserted = self
            .contained
            .lock()
            .entry(containing_bean_name.to_string())
            .or_default()
            .insert(contained_bean_name.to_string());
        if !inserted {
            return;
        }
        self.register_dependent(contained_bean_name, containing_bean_name);
    }

    /// Beans that depend on `bean_name`
    pub fn dependent_beans(&self, bean_name: &str) -> Vec<String> {
        let bean_name = self.canonical_name(bean_name);
        self.dependents
            .lock()
            .get(&bean_name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Beans that `bean_name` depends on
    pub fn dependencies_for_bean(&self, bean_name: &str) -> Vec<String> {
        self.dependencies
            .lock()
            .get(bean_name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Inner beans created for `bean_name`
    pub fn contained_beans(&self, bean_name: &str) -> Vec<String> {
        self.contained
            .lock()
            .get(bean_name)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether any bean depends on `bean_name`
    pub fn has_dependent_bean(&self, bean_name: &str) -> bool {
        self.dependents
            .lock()
            .get(bean_name)
            .map_or(false, |set| !set.is_empty())
    }

    /// Whether `dependent_bean_name` depends on `bean_name`, directly or
    /// transitively
    pub fn is_dependent(&self, bean_name: &str, dependent_bean_name: &str) -> bool {
        let mut visited = HashSet::new();
        self.is_dependent_tracked(&self.canonical_name(bean_name), dependent_bean_name, &mut visited)
    }

    fn is_dependent_tracked(
        &self,
        bean_name: &str,
        dependent_bean_name: &str,
        visited: &mut HashSet<String>,
    ) -> bool {
        if !visited.insert(bean_name.to_string()) {
            return false;
        }
        let direct: Vec<String> = match self.dependents.lock().get(bean_name) {
            Some(set) => set.iter().cloned().collect(),
            None => return false,
        };
        if direct.iter().any(|name| name == dependent_bean_name) {
            return true;
        }
        direct
            .iter()
            .any(|transitive| self.is_dependent_tracked(transitive, dependent_bean_name, visited))
    }

    // -----------------------------------------------------------------------
    // By-type lookup
    // -----------------------------------------------------------------------

    /// Local bean names whose type matches `required_type`, definitions first
    pub fn bean_names_for_type(&self, required_type: &TypeHandle) -> Vec<String> {
        let mut names: Vec<String> = self
            .bean_definition_names()
            .into_iter()
            .filter(|name| self.matches_type(name, required_type))
            .collect();
        for name in self.singleton_names() {
            if !self.contains_bean_definition(&name) && self.matches_type(&name, required_type) {
                names.push(name);
            }
        }
        names
    }

    /// Type check without creating the bean where the definition suffices
    fn matches_type(&self, bean_name: &str, required_type: &TypeHandle) -> bool {
        if *required_type == TypeHandle::Any {
            return true;
        }

        if let Some(instance) = self.singleton(bean_name) {
            return match instance.as_bean() {
                Some(bean) if bean.is_null_bean() => false,
                Some(bean) => match bean.as_factory() {
                    Some(factory) => factory
                        .object_type()
                        .or_else(|| self.classes.product_type(bean.type_name()).cloned())
                        .map_or(false, |product| product == *required_type),
                    None => required_type.is_assignable_from(&instance),
                },
                None => required_type.is_assignable_from(&instance),
            };
        }

        let Ok(merged) = self.get_merged_bean_definition(bean_name) else {
            return false;
        };
        let Some(class_name) = merged.class_name() else {
            return false;
        };
        match self.classes.product_type(class_name) {
            Some(product) => product == required_type,
            None => matches!(required_type, TypeHandle::Class(name) if name.as_ref() == class_name),
        }
    }

    fn is_primary(&self, bean_name: &str) -> bool {
        self.bean_definition(bean_name)
            .map_or(false, |definition| definition.is_primary())
    }

    /// Pick among several candidates: a unique primary bean, else the one
    /// named like the dependency
    fn determine_candidate(
        &self,
        candidates: &[String],
        dependency_name: Option<&str>,
    ) -> Option<String> {
        let primaries: Vec<&String> = candidates
            .iter()
            .filter(|name| self.is_primary(name))
            .collect();
        if let [primary] = primaries.as_slice() {
            return Some((*primary).clone());
        }
        let dependency_name = dependency_name?;
        candidates
            .iter()
            .find(|candidate| {
                candidate.as_str() == dependency_name
                    || self.aliases(candidate).iter().any(|alias| alias == dependency_name)
            })
            .cloned()
    }

    pub(crate) fn select_named_bean(&self, required_type: &TypeHandle) -> BeansResult<NamedBean> {
        let candidates = self.bean_names_for_type(required_type);
        let chosen = match candidates.as_slice() {
            [] => {
                return match &self.parent {
                    Some(parent) => parent.resolve_named_bean(required_type),
                    None => Err(BeansError::NoSuchBeanOfType {
                        type_name: required_type.to_string(),
                    }),
                }
            }
            [only] => only.clone(),
            many => self
                .determine_candidate(many, None)
                .ok_or_else(|| BeansError::NoUniqueBean {
                    type_name: required_type.to_string(),
                    candidates: many.to_vec(),
                })?,
        };
        let instance = self.get_bean(&chosen)?;
        debug!(bean = %chosen, required_type = %required_type, "Selected bean by type");
        Ok(NamedBean {
            name: chosen,
            instance,
        })
    }

    // -----------------------------------------------------------------------
    // Autowiring
    // -----------------------------------------------------------------------

    pub(crate) fn autowire(
        &self,
        descriptor: &DependencyDescriptor,
        requesting_bean_name: &str,
        autowired_bean_names: &mut Vec<String>,
        converter: &dyn TypeConverter,
    ) -> BeansResult<Value> {
        let required_type = descriptor.required_type();
        let mut candidates: Vec<String> = self
            .bean_names_for_type(required_type)
            .into_iter()
            .filter(|name| name != requesting_bean_name)
            .collect();
        if let Some(qualifier) = descriptor.qualifier() {
            let qualifier = self.canonical_name(qualifier);
            candidates.retain(|name| *name == qualifier);
        }

        if candidates.is_empty() {
            if let Some(parent) = &self.parent {
                return parent.resolve_dependency(
                    descriptor,
                    requesting_bean_name,
                    autowired_bean_names,
                    converter,
                );
            }
            if descriptor.is_required() {
                return Err(BeansError::NoSuchBeanOfType {
                    type_name: required_type.to_string(),
                });
            }
            return Ok(Value::Null);
        }

        match descriptor.shape() {
            DependencyShape::Single => {
                let chosen = match candidates.as_slice() {
                    [only] => only.clone(),
                    many => self
                        .determine_candidate(many, descriptor.dependency_name())
                        .ok_or_else(|| BeansError::NoUniqueBean {
                            type_name: required_type.to_string(),
                            candidates: many.to_vec(),
                        })?,
                };
                let value = self.get_bean(&chosen)?;
                autowired_bean_names.push(chosen);
                converter.convert_if_necessary(value, required_type)
            }
            DependencyShape::List => {
                let mut values = Vec::with_capacity(candidates.len());
                for name in candidates {
                    values.push(self.get_bean(&name)?);
                    autowired_bean_names.push(name);
                }
                Ok(Value::List(values))
            }
            DependencyShape::Map => {
                let mut entries = IndexMap::with_capacity(candidates.len());
                for name in candidates {
                    let value = self.get_bean(&name)?;
                    entries.insert(Value::text(name.clone()), value);
                    autowired_bean_names.push(name);
                }
                Ok(Value::Map(entries))
            }
        }
    }
}

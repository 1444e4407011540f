//! In-memory stand-in for a container, recording every call the resolver makes
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use beanwire_core::*;
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Factory bean whose product is fixed up front
pub struct FixedFactory {
    pub product: Value,
}

impl FactoryBean for FixedFactory {
    fn get_object(&self) -> BeansResult<Value> {
        Ok(self.product.clone())
    }
}

#[derive(Default)]
pub struct StubContainer {
    beans: Mutex<IndexMap<String, Value>>,
    classes: HashSet<String>,
    properties: HashMap<String, String>,
    parent: Option<Arc<StubContainer>>,
    reserved_names: Mutex<HashSet<String>>,
    autowire_result: Mutex<Option<(Value, Vec<String>)>>,
    dependents: Mutex<Vec<(String, String)>>,
    contained: Mutex<Vec<(String, String)>>,
    events: Mutex<Vec<String>>,
    post_process_flags: Mutex<Vec<bool>>,
    name_in_use_queries: AtomicUsize,
}

impl StubContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bean(self, name: &str, value: Value) -> Self {
        self.beans.lock().insert(name.to_string(), value);
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.classes.insert(class_name.to_string());
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_parent(mut self, parent: Arc<StubContainer>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_autowire_result(self, value: Value, names: &[&str]) -> Self {
        *self.autowire_result.lock() =
            Some((value, names.iter().map(|n| n.to_string()).collect()));
        self
    }

    pub fn reserve_name(&self, name: &str) {
        self.reserved_names.lock().insert(name.to_string());
    }

    pub fn bean(&self, name: &str) -> Value {
        self.beans.lock().get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn dependents(&self) -> Vec<(String, String)> {
        self.dependents.lock().clone()
    }

    pub fn contained(&self) -> Vec<(String, String)> {
        self.contained.lock().clone()
    }

    /// Ordered log of `get:<name>` and `create:<name>` events
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn post_process_flags(&self) -> Vec<bool> {
        self.post_process_flags.lock().clone()
    }

    pub fn name_in_use_queries(&self) -> usize {
        self.name_in_use_queries.load(Ordering::SeqCst)
    }

    fn replace_placeholders(&self, text: &str) -> BeansResult<String> {
        let mut result = String::new();
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            let Some(end) = rest[start..].find('}') else {
                break;
            };
            let key = &rest[start + 2..start + end];
            let value = self.properties.get(key).ok_or_else(|| BeansError::Evaluation {
                expression: text.to_string(),
                message: format!("Could not resolve placeholder '{}'", key),
            })?;
            result.push_str(&rest[..start]);
            result.push_str(value);
            rest = &rest[start + end + 1..];
        }
        result.push_str(rest);
        Ok(result)
    }
}

impl BeanFactory for StubContainer {
    fn contains_bean(&self, name: &str) -> bool {
        self.beans.lock().contains_key(name)
    }

    fn get_bean(&self, name: &str) -> BeansResult<Value> {
        self.events.lock().push(format!("get:{}", name));
        self.beans
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| BeansError::NoSuchBean {
                name: name.to_string(),
            })
    }

    fn get_bean_of_type(&self, name: &str, required_type: &TypeHandle) -> BeansResult<Value> {
        let bean = self.get_bean(name)?;
        if required_type.is_assignable_from(&bean) {
            Ok(bean)
        } else {
            Err(BeansError::BeanNotOfRequiredType {
                name: name.to_string(),
                required_type: required_type.to_string(),
                actual_type: bean.kind().to_string(),
            })
        }
    }

    fn get_bean_by_type(&self, required_type: &TypeHandle) -> BeansResult<Value> {
        self.resolve_named_bean(required_type).map(|named| named.instance)
    }
}

impl BeanContainer for StubContainer {
    fn parent_bean_factory(&self) -> Option<Arc<dyn BeanFactory>> {
        self.parent
            .clone()
            .map(|parent| parent as Arc<dyn BeanFactory>)
    }

    fn resolve_named_bean(&self, required_type: &TypeHandle) -> BeansResult<NamedBean> {
        let beans = self.beans.lock();
        let candidates: Vec<(&String, &Value)> = beans
            .iter()
            .filter(|(_, value)| {
                matches!(value, Value::Instance(_)) && required_type.is_assignable_from(value)
            })
            .collect();
        match candidates.as_slice() {
            [(name, value)] => Ok(NamedBean {
                name: name.to_string(),
                instance: (*value).clone(),
            }),
            [] => Err(BeansError::NoSuchBeanOfType {
                type_name: required_type.to_string(),
            }),
            many => Err(BeansError::NoUniqueBean {
                type_name: required_type.to_string(),
                candidates: many.iter().map(|(name, _)| name.to_string()).collect(),
            }),
        }
    }

    fn resolve_dependency(
        &self,
        descriptor: &DependencyDescriptor,
        _requesting_bean_name: &str,
        autowired_bean_names: &mut Vec<String>,
        _converter: &dyn TypeConverter,
    ) -> BeansResult<Value> {
        match self.autowire_result.lock().clone() {
            Some((value, names)) => {
                autowired_bean_names.extend(names);
                Ok(value)
            }
            None => Err(BeansError::NoSuchBeanOfType {
                type_name: descriptor.required_type().to_string(),
            }),
        }
    }

    fn register_dependent_bean(&self, bean_name: &str, dependent_bean_name: &str) {
        self.dependents
            .lock()
            .push((bean_name.to_string(), dependent_bean_name.to_string()));
    }

    fn register_contained_bean(&self, contained_bean_name: &str, containing_bean_name: &str) {
        self.contained.lock().push((
            contained_bean_name.to_string(),
            containing_bean_name.to_string(),
        ));
        self.register_dependent_bean(contained_bean_name, containing_bean_name);
    }

    fn is_bean_name_in_use(&self, name: &str) -> bool {
        self.name_in_use_queries.fetch_add(1, Ordering::SeqCst);
        self.reserved_names.lock().contains(name)
            || self.contains_bean(name)
            || self.dependents.lock().iter().any(|(bean, _)| bean == name)
    }

    fn merged_bean_definition(
        &self,
        _bean_name: &str,
        definition: &BeanDefinition,
        containing_definition: Option<&BeanDefinition>,
    ) -> BeansResult<Arc<BeanDefinition>> {
        let mut merged = definition.clone();
        if let Some(containing) = containing_definition {
            if containing.is_prototype() && merged.is_singleton() {
                merged = merged.with_scope(containing.scope());
            }
        }
        Ok(Arc::new(merged))
    }

    fn create_bean(&self, bean_name: &str, definition: &Arc<BeanDefinition>) -> BeansResult<Value> {
        self.events.lock().push(format!("create:{}", bean_name));
        let class_name = definition.class_name().unwrap_or("object");
        match class_name {
            "Failing" => Err(BeansError::TypeNotFound {
                type_name: "Failing".to_string(),
            }),
            "NullProducer" => Ok(Value::Instance(Bean::null())),
            "ConnectionFactoryBean" => Ok(Value::Instance(Bean::factory(
                class_name,
                Arc::new(FixedFactory {
                    product: Value::text(format!("connection from {}", bean_name)),
                }),
            ))),
            _ => Ok(Value::Instance(Bean::new(class_name, bean_name.to_string()))),
        }
    }

    fn object_from_factory_bean(
        &self,
        factory: &Arc<dyn FactoryBean>,
        _bean_name: &str,
        should_post_process: bool,
    ) -> BeansResult<Value> {
        self.post_process_flags.lock().push(should_post_process);
        factory.get_object()
    }

    fn evaluate_bean_definition_string(
        &self,
        text: &str,
        _definition: Option<&BeanDefinition>,
    ) -> BeansResult<Value> {
        if text == "#{null}" {
            return Ok(Value::Null);
        }
        self.replace_placeholders(text).map(Value::Text)
    }

    fn resolve_type(&self, type_name: &str) -> BeansResult<TypeHandle> {
        if let Some(builtin) = TypeHandle::builtin(type_name) {
            return Ok(builtin);
        }
        if self.classes.contains(type_name) {
            return Ok(TypeHandle::class(type_name));
        }
        Err(BeansError::TypeNotFound {
            type_name: type_name.to_string(),
        })
    }
}

/// Instance of `type_name` whose payload is its own bean name
pub fn instance(type_name: &str, name: &str) -> Value {
    Value::Instance(Bean::new(type_name, name.to_string()))
}

/// Payload of an instance created by [`instance`] or the stub's `create_bean`
pub fn payload(value: &Value) -> String {
    value
        .as_bean()
        .and_then(|bean| bean.downcast::<String>())
        .map(|name| name.as_str().to_string())
        .unwrap_or_default()
}

//! End-to-end value resolution through a real registry
//!
//! These tests wire definitions loaded alongside a settings file and check
//! the resolved objects, the bookkeeping left behind and the error paths.

use std::fs;
use std::sync::Arc;

use beanwire_container::{BeanProperties, BeanRegistry, ContainerSettings};
use beanwire_core::{
    Bean, BeanDefinition, BeanFactory, BeanNameReference, BeansError, FactoryBean, ManagedList,
    ManagedMap, ManagedSet, RawValue, Value, INNER_BEAN_NAME_PREFIX,
};
use tempfile::TempDir;

fn component(class: &'static str) -> impl Fn(&BeanProperties) -> beanwire_core::BeansResult<Bean> {
    move |props| Ok(Bean::new(class, props.clone()))
}

fn registry_with(settings: ContainerSettings) -> BeanRegistry {
    BeanRegistry::builder()
        .settings(settings)
        .class("Repository", component("Repository"))
        .class("AuditLogger", component("AuditLogger"))
        .class("OrderService", component("OrderService"))
        .build()
        .unwrap()
}

fn property(bean: &Value, name: &str) -> Value {
    bean.as_bean()
        .and_then(|bean| bean.downcast::<BeanProperties>())
        .and_then(|props| props.get(name).cloned())
        .unwrap_or(Value::Null)
}

#[test]
fn test_order_service_wires_reference_and_anonymous_logger() {
    let registry = registry_with(ContainerSettings::default());
    registry
        .register_bean_definition("repository", BeanDefinition::new("Repository"))
        .unwrap();
    registry
        .register_bean_definition(
            "orderService",
            BeanDefinition::new("OrderService").with_property(
                "collaborators",
                RawValue::List(ManagedList::new(vec![
                    RawValue::reference("repository"),
                    RawValue::inner_bean(BeanDefinition::new("AuditLogger")),
                ])),
            ),
        )
        .unwrap();

    let service = registry.get_bean("orderService").unwrap();

    let collaborators = property(&service, "collaborators");
    let collaborators = collaborators.as_list().unwrap();
    assert_eq!(collaborators.len(), 2);
    assert_eq!(collaborators[0], registry.get_bean("repository").unwrap());
    assert_eq!(collaborators[1].kind(), "AuditLogger");

    assert_eq!(registry.dependent_beans("repository"), vec!["orderService"]);

    let contained = registry.contained_beans("orderService");
    assert_eq!(contained.len(), 1);
    assert!(contained[0].starts_with(&format!("{}#", INNER_BEAN_NAME_PREFIX)));
    assert!(contained[0].len() > INNER_BEAN_NAME_PREFIX.len() + 1);
}

#[test]
fn test_mapping_keys_and_values_come_from_settings_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("beans.toml");
    fs::write(
        &path,
        r#"
        [properties]
        "env.key" = "region"
        "env.value" = "eu-west"
        "#,
    )
    .unwrap();
    let registry = registry_with(ContainerSettings::from_file(&path).unwrap());
    registry
        .register_bean_definition(
            "repository",
            BeanDefinition::new("Repository").with_property(
                "labels",
                RawValue::Map(ManagedMap::new(vec![(
                    RawValue::literal("${env.key}"),
                    RawValue::literal("${env.value}"),
                )])),
            ),
        )
        .unwrap();

    let repository = registry.get_bean("repository").unwrap();

    let Value::Map(labels) = property(&repository, "labels") else {
        panic!("expected a resolved map");
    };
    assert_eq!(labels.len(), 1);
    assert_eq!(labels.get(&Value::text("region")), Some(&Value::text("eu-west")));
}

#[test]
fn test_reference_cycle_fails_without_caching() {
    let registry = registry_with(ContainerSettings::default());
    registry
        .register_bean_definition(
            "orderService",
            BeanDefinition::new("OrderService").with_property("repository", RawValue::reference("repository")),
        )
        .unwrap();
    registry
        .register_bean_definition(
            "repository",
            BeanDefinition::new("Repository").with_property("owner", RawValue::reference("orderService")),
        )
        .unwrap();

    let error = registry.get_bean("orderService").unwrap_err();

    assert!(error.is_creation());
    assert!(matches!(
        error.root_cause(),
        BeansError::CurrentlyInCreation { name } if name == "orderService"
    ));
    assert!(registry.singleton_names().is_empty());
    assert!(!registry.is_currently_in_creation("orderService"));
    assert!(!registry.is_currently_in_creation("repository"));
}

struct NullProducer;

impl FactoryBean for NullProducer {
    fn get_object(&self) -> beanwire_core::BeansResult<Value> {
        Ok(Value::Instance(Bean::null()))
    }
}

#[test]
fn test_explicit_null_resolves_uniformly() {
    let registry = BeanRegistry::builder()
        .class("Repository", component("Repository"))
        .factory_class("NullFactory", beanwire_core::TypeHandle::Any, |_| {
            Ok(Bean::factory("NullFactory", Arc::new(NullProducer)))
        })
        .build()
        .unwrap();
    registry
        .register_singleton("nothing", Value::Instance(Bean::null()))
        .unwrap();
    registry
        .register_bean_definition(
            "repository",
            BeanDefinition::new("Repository")
                .with_property("direct", RawValue::Null)
                .with_property("expression", RawValue::literal("#{null}"))
                .with_property("listed", RawValue::List(ManagedList::new(vec![RawValue::Null])))
                .with_property("referenced", RawValue::reference("nothing"))
                .with_property("inner", RawValue::inner_bean(BeanDefinition::new("NullFactory"))),
        )
        .unwrap();

    let repository = registry.get_bean("repository").unwrap();

    for name in ["direct", "expression", "referenced", "inner"] {
        assert_eq!(property(&repository, name), Value::Null, "property {}", name);
    }
    assert_eq!(property(&repository, "listed"), Value::List(vec![Value::Null]));
}

#[test]
fn test_name_reference_to_unknown_bean_is_invalid_definition() {
    let registry = registry_with(ContainerSettings::default());
    registry
        .register_bean_definition(
            "orderService",
            BeanDefinition::new("OrderService").with_property(
                "targetName",
                RawValue::NameReference(BeanNameReference::new("ghost")),
            ),
        )
        .unwrap();

    let error = registry.get_bean("orderService").unwrap_err();

    assert!(error.is_definition_store());
    assert!(!error.is_creation());
    assert_eq!(
        error.message(),
        Some("Invalid bean name 'ghost' in bean reference for bean property 'targetName'")
    );
}

#[test]
fn test_set_of_references_collapses_to_one_instance() {
    let registry = registry_with(ContainerSettings::default());
    registry
        .register_holder(
            &beanwire_core::BeanDefinitionHolder::new("repository", BeanDefinition::new("Repository"))
                .with_aliases(vec!["store".to_string()]),
        )
        .unwrap();
    registry
        .register_bean_definition(
            "orderService",
            BeanDefinition::new("OrderService").with_property(
                "stores",
                RawValue::Set(ManagedSet::new(vec![
                    RawValue::reference("repository"),
                    RawValue::reference("store"),
                ])),
            ),
        )
        .unwrap();

    let service = registry.get_bean("orderService").unwrap();

    let Value::Set(stores) = property(&service, "stores") else {
        panic!("expected a resolved set");
    };
    assert_eq!(stores.len(), 1);
}

#[test]
fn test_failure_deep_in_nesting_aborts_whole_bean() {
    let registry = registry_with(ContainerSettings::default());
    registry
        .register_bean_definition(
            "orderService",
            BeanDefinition::new("OrderService").with_property(
                "groups",
                RawValue::List(ManagedList::new(vec![RawValue::List(ManagedList::new(vec![
                    RawValue::inner_bean(
                        BeanDefinition::new("AuditLogger")
                            .with_property("sink", RawValue::reference("missingSink")),
                    ),
                ]))])),
            ),
        )
        .unwrap();

    let error = registry.get_bean("orderService").unwrap_err();

    let message = error.message().unwrap();
    assert!(message.starts_with("Cannot create inner bean"));
    assert!(message.ends_with("while setting bean property 'groups' with key [0] with key [0]"));
    assert!(matches!(
        error.root_cause(),
        BeansError::NoSuchBean { name } if name == "missingSink"
    ));
    assert!(!registry.contains_singleton("orderService"));
}

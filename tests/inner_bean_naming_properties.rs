//! Property-based tests for inner bean naming and collection resolution
//! through a registry

use std::collections::HashSet;
use std::sync::Arc;

use beanwire_container::{BeanProperties, BeanRegistry};
use beanwire_core::{
    generate_inner_bean_name, BeanDefinition, BeanFactory, ManagedList, ManagedSet, RawValue,
    Value,
};
use proptest::prelude::*;

fn registry() -> BeanRegistry {
    BeanRegistry::builder()
        .class("Holder", |props| Ok(beanwire_core::Bean::new("Holder", props.clone())))
        .class("Worker", |props| Ok(beanwire_core::Bean::new("Worker", props.clone())))
        .build()
        .unwrap()
}

fn items(bean: &Value) -> Value {
    bean.as_bean()
        .and_then(|bean| bean.downcast::<BeanProperties>())
        .and_then(|props| props.get("items").cloned())
        .unwrap_or(Value::Null)
}

/// Singleton inner beans nested N times under one owner get N distinct names
proptest! {
    #[test]
    fn prop_nested_singleton_inner_beans_get_distinct_names(count in 1usize..8) {
        let registry = registry();
        let worker = Arc::new(BeanDefinition::new("Worker"));
        registry
            .register_bean_definition(
                "holder",
                BeanDefinition::new("Holder").with_property(
                    "items",
                    RawValue::List(
                        (0..count)
                            .map(|_| RawValue::InnerBean(Arc::clone(&worker)))
                            .collect::<ManagedList>(),
                    ),
                ),
            )
            .unwrap();

        registry.get_bean("holder").unwrap();

        let names = registry.contained_beans("holder");
        let base = generate_inner_bean_name(&worker);
        prop_assert_eq!(names.len(), count);
        prop_assert_eq!(&names[0], &base);
        for (index, name) in names.iter().enumerate().skip(1) {
            prop_assert_eq!(name, &format!("{}#{}", base, index));
        }
        prop_assert_eq!(names.iter().collect::<HashSet<_>>().len(), count);
    }
}

/// Prototype inner beans keep their base name however often they are nested
proptest! {
    #[test]
    fn prop_prototype_inner_beans_share_their_name(count in 1usize..8) {
        let registry = registry();
        let worker = Arc::new(BeanDefinition::new("Worker").prototype());
        registry
            .register_bean_definition(
                "holder",
                BeanDefinition::new("Holder").with_property(
                    "items",
                    RawValue::List(
                        (0..count)
                            .map(|_| RawValue::InnerBean(Arc::clone(&worker)))
                            .collect::<ManagedList>(),
                    ),
                ),
            )
            .unwrap();

        let holder = registry.get_bean("holder").unwrap();

        prop_assert_eq!(
            registry.contained_beans("holder"),
            vec![generate_inner_bean_name(&worker)]
        );
        let resolved = items(&holder);
        let workers = resolved.as_list().unwrap();
        prop_assert_eq!(workers.len(), count);
        // every prototype is its own instance
        let distinct: HashSet<&Value> = workers.iter().collect();
        prop_assert_eq!(distinct.len(), count);
    }
}

/// Lists keep order and duplicates; sets keep first-seen order
proptest! {
    #[test]
    fn prop_collections_survive_registry_round(values in prop::collection::vec(0i64..5, 0..12)) {
        let registry = registry();
        registry
            .register_bean_definition(
                "listed",
                BeanDefinition::new("Holder").with_property(
                    "items",
                    RawValue::List(values.iter().copied().map(RawValue::literal).collect::<ManagedList>()),
                ),
            )
            .unwrap();
        registry
            .register_bean_definition(
                "unique",
                BeanDefinition::new("Holder").with_property(
                    "items",
                    RawValue::Set(values.iter().copied().map(RawValue::literal).collect::<ManagedSet>()),
                ),
            )
            .unwrap();

        let listed = items(&registry.get_bean("listed").unwrap());
        let expected: Vec<Value> = values.iter().copied().map(Value::Int).collect();
        prop_assert_eq!(listed, Value::List(expected));

        let Value::Set(unique) = items(&registry.get_bean("unique").unwrap()) else {
            panic!("expected a set");
        };
        let mut seen = Vec::new();
        for value in &values {
            if !seen.contains(value) {
                seen.push(*value);
            }
        }
        let actual: Vec<i64> = unique.iter().filter_map(Value::as_int).collect();
        prop_assert_eq!(actual, seen);
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vessel::api::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug)]
struct Furniture {
    value: u32,
    furniture_decorated: bool,
    prop_decorated: bool,
}

fn furniture(value: u32) -> Instance {
    instance(Furniture {
        value,
        furniture_decorated: false,
        prop_decorated: false,
    })
}

fn redecorate(
    key: &str,
    inner: Instance,
    apply: impl FnOnce(&mut Furniture),
) -> RegistryResult<Instance> {
    let inner = downcast_instance::<Furniture>(key, inner)?;
    let mut next = Furniture {
        value: inner.value,
        furniture_decorated: inner.furniture_decorated,
        prop_decorated: inner.prop_decorated,
    };
    apply(&mut next);
    Ok(instance(next))
}

struct CountingProvider {
    calls: Arc<AtomicUsize>,
}

impl Provider for CountingProvider {
    fn build(&self, _registry: &Registry) -> RegistryResult<Instance> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(instance(String::from("Epsilon service")))
    }
}

// **SERVICE TESTS**
#[test]
fn test_service_returns_registered_instance() {
    init_logging();
    let mut registry = Registry::new();
    let foo = instance(String::from("Foo service"));
    registry.instance("Foo", foo.clone()).unwrap();

    let first = registry.get("Foo").unwrap();
    let second = registry.get("Foo").unwrap();

    assert!(same_instance(&first, &foo));
    assert!(same_instance(&first, &second));
}

#[test]
fn test_service_over_existing_key_fails() {
    let mut registry = Registry::new();
    registry.service("Foo", 1_u8).unwrap();

    let err = registry.service("Foo", 2_u8).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { ref key } if key == "Foo"));
    assert_eq!(*registry.get_as::<u8>("Foo").unwrap(), 1);
}

// **PROVIDER TESTS**
#[test]
fn test_shared_provider_called_once() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry
        .provider(
            "Epsilon",
            CountingProvider {
                calls: Arc::clone(&calls),
            },
        )
        .unwrap();

    let first = registry.get("Epsilon").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let second = registry.get("Epsilon").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(same_instance(&first, &second));
}

#[test]
fn test_unshared_provider_called_every_time() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry
        .provider(
            "Epsilon",
            CountingProvider {
                calls: Arc::clone(&calls),
            },
        )
        .unwrap();
    registry.set_shared("Epsilon", false).unwrap();

    let first = registry.get("Epsilon").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let second = registry.get("Epsilon").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!same_instance(&first, &second));
}

#[test]
fn test_provider_registered_as_closure() {
    let mut registry = Registry::new();
    registry
        .provider_fn("ProviderName", |_| Ok(instance(String::from("FnProvider"))))
        .unwrap();

    assert!(registry.has("ProviderName"));
    assert_eq!(*registry.get_as::<String>("ProviderName").unwrap(), "FnProvider");
}

#[test]
fn test_provider_on_fresh_key_never_fails() {
    let mut registry = Registry::new();
    for key in ["A", "B", "C"] {
        registry.provider_fn(key, |_| Ok(instance(()))).unwrap();
    }
    assert!(registry.has("A") && registry.has("B") && registry.has("C"));
}

// **DECORATOR TESTS**
#[test]
fn test_decorator_receives_registry_key_and_create() {
    init_logging();
    let mut registry = Registry::new();
    registry
        .service(
            "Labeler",
            Box::new(|label: &str| format!("{label} service"))
                as Box<dyn Fn(&str) -> String + Send + Sync>,
        )
        .unwrap();
    registry
        .provider_fn("Furniture", |_| Ok(instance(8_u32)))
        .unwrap();
    registry
        .decorator_fn("Furniture", |registry, key, create| {
            let value = downcast_instance::<u32>(key, create()?)?;
            let labeler =
                registry.get_as::<Box<dyn Fn(&str) -> String + Send + Sync>>("Labeler")?;
            Ok(instance((*value, (**labeler)(key))))
        })
        .unwrap();

    let result = registry.get_as::<(u32, String)>("Furniture").unwrap();
    assert_eq!(*result, (8, String::from("Furniture service")));
}

#[test]
fn test_terminal_decorators_apply_to_aliases() {
    let mut registry = Registry::new();
    registry
        .provider_fn("Furniture", |_| Ok(furniture(8)))
        .unwrap();
    registry.set_shared("Furniture", false).unwrap();
    registry.alias("Prop", "Furniture").unwrap();
    registry.set_shared("Prop", false).unwrap();

    registry
        .decorator_fn("Furniture", |_, key, create| {
            redecorate(key, create()?, |f| f.furniture_decorated = true)
        })
        .unwrap();
    registry
        .decorator_fn("Prop", |_, key, create| {
            redecorate(key, create()?, |f| f.prop_decorated = true)
        })
        .unwrap();

    let final_key = registry.get_as::<Furniture>("Furniture").unwrap();
    let alias = registry.get_as::<Furniture>("Prop").unwrap();

    assert!(!Arc::ptr_eq(&final_key, &alias));
    assert_eq!(final_key.value, 8);
    assert!(final_key.furniture_decorated);
    assert!(!final_key.prop_decorated);
    assert!(alias.furniture_decorated);
    assert!(!alias.prop_decorated);
}

#[test]
fn test_decorators_apply_in_registration_order() {
    let mut registry = Registry::new();
    registry
        .provider_fn("Doom", |_| Ok(instance(vec![33])))
        .unwrap();

    for pushed in [44, 55] {
        registry
            .decorator_fn("Doom", move |_, key, create| {
                let inner = downcast_instance::<Vec<i32>>(key, create()?)?;
                let mut next = (*inner).clone();
                next.push(pushed);
                Ok(instance(next))
            })
            .unwrap();
    }

    assert_eq!(*registry.get_as::<Vec<i32>>("Doom").unwrap(), vec![33, 44, 55]);
}

#[test]
fn test_last_decorator_is_outermost() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let mut registry = Registry::new();

    let seen = Arc::clone(&trace);
    registry
        .provider_fn("Doom", move |_| {
            seen.lock().unwrap().push("provider");
            Ok(instance(()))
        })
        .unwrap();

    for name in ["D1", "D2"] {
        let seen = Arc::clone(&trace);
        registry
            .decorator_fn("Doom", move |_, _, create| {
                seen.lock().unwrap().push(name);
                create()
            })
            .unwrap();
    }

    registry.get("Doom").unwrap();
    assert_eq!(*trace.lock().unwrap(), vec!["D2", "D1", "provider"]);
}

#[test]
fn test_decorators_configured_in_batches_append() {
    let mut registry = Registry::with_config(
        RegistryConfig::new()
            .with_provider_fn("Doom", |_| Ok(instance(String::from("x"))))
            .with_decorator_fn("Doom", |_, key, create| {
                let inner = downcast_instance::<String>(key, create()?)?;
                Ok(instance(format!("{inner}1")))
            }),
    )
    .unwrap();

    registry
        .configure(RegistryConfig::new().with_decorator_fn("Doom", |_, key, create| {
            let inner = downcast_instance::<String>(key, create()?)?;
            Ok(instance(format!("{inner}2")))
        }))
        .unwrap();

    assert_eq!(*registry.get_as::<String>("Doom").unwrap(), "x12");
}

// **ALIAS TESTS**
#[test]
fn test_alias_resolves_to_target_service() {
    let mut registry = Registry::new();
    registry.service("Qux", String::from("Qux service")).unwrap();
    registry.alias("Realm", "Qux").unwrap();

    let final_key = registry.get("Qux").unwrap();
    let alias = registry.get("Realm").unwrap();
    assert!(same_instance(&final_key, &alias));
}

#[test]
fn test_alias_has_independent_shared_flag() {
    let mut registry = Registry::new();
    registry
        .provider_fn("Craft", |_| Ok(instance(String::from("Craft service"))))
        .unwrap();
    registry.alias("Lure", "Craft").unwrap();
    registry.set_shared("Craft", false).unwrap();
    registry.set_shared("Lure", true).unwrap();

    let final_first = registry.get("Craft").unwrap();
    let alias_first = registry.get("Lure").unwrap();
    let final_second = registry.get("Craft").unwrap();
    let alias_second = registry.get("Lure").unwrap();

    assert!(!same_instance(&final_second, &final_first));
    assert!(same_instance(&alias_second, &alias_first));
    assert!(!same_instance(&alias_first, &final_first));
    assert!(!same_instance(&alias_first, &final_second));
    assert!(!registry.is_shared("Craft"));
}

#[test]
fn test_cyclic_alias_definition_fails() {
    let mut registry = Registry::with_config(
        RegistryConfig::new()
            .with_service("BlackMambo", String::from("Concrete"))
            .with_alias("WallaWalla", "BlackMambo")
            .with_alias("Flip", "WallaWalla"),
    )
    .unwrap();

    let err = registry.alias("WallaWalla", "Flip").unwrap_err();
    assert_eq!(err.to_string(), "Cyclic alias 'WallaWalla'.");
    assert_eq!(err.code(), error_codes::CYCLIC_ALIAS);

    // The rejected edge left no trace.
    assert_eq!(registry.resolve_key("Flip"), "BlackMambo");
    assert!(same_instance(
        &registry.get("Flip").unwrap(),
        &registry.get("BlackMambo").unwrap()
    ));
}

#[test]
fn test_two_step_cycle_names_closing_key() {
    let mut registry = Registry::new();
    registry.alias("A", "B").unwrap();

    let err = registry.alias("B", "A").unwrap_err();
    assert_eq!(err, RegistryError::cyclic_alias("B"));
    assert_eq!(registry.resolve_key("A"), "B");
}

#[test]
fn test_alias_to_missing_target_resolves_later() {
    let mut registry =
        Registry::with_config(RegistryConfig::new().with_alias("Burn", "Defy")).unwrap();

    assert!(!registry.has("Burn"));

    registry.service("Defy", String::from("Not today")).unwrap();

    assert!(registry.has("Burn"));
    let final_key = registry.get("Defy").unwrap();
    let alias = registry.get("Burn").unwrap();
    assert!(same_instance(&alias, &final_key));
}

#[test]
fn test_alias_chain_extended_by_later_batch() {
    let mut registry = Registry::new();
    registry.alias("Top", "Middle").unwrap();
    registry.service("Bottom", 7_u16).unwrap();

    assert!(!registry.has("Top"));
    registry.alias("Middle", "Bottom").unwrap();

    assert_eq!(registry.resolve_key("Top"), "Bottom");
    assert_eq!(*registry.get_as::<u16>("Top").unwrap(), 7);
}

#[test]
fn test_self_chaining_batch() {
    let mut registry = Registry::new();
    registry.alias("A", "B").unwrap();
    registry
        .configure(
            RegistryConfig::new()
                .with_alias("C", "D")
                .with_alias("B", "C"),
        )
        .unwrap();
    registry.service("D", 4_u8).unwrap();

    for key in ["A", "B", "C"] {
        assert_eq!(registry.resolve_key(key), "D");
        assert_eq!(*registry.get_as::<u8>(key).unwrap(), 4);
    }
}

#[test]
fn test_alias_and_terminal_converge_in_either_order() {
    for alias_first in [true, false] {
        let mut registry = Registry::new();
        registry
            .provider_fn("Engine", |_| Ok(instance(String::from("v8"))))
            .unwrap();
        registry.alias("Motor", "Engine").unwrap();

        let (a, b) = if alias_first {
            let a = registry.get("Motor").unwrap();
            (a, registry.get("Engine").unwrap())
        } else {
            let b = registry.get("Engine").unwrap();
            (registry.get("Motor").unwrap(), b)
        };

        assert!(same_instance(&a, &b));
        assert!(same_instance(&registry.get("Motor").unwrap(), &a));
    }
}

// **SHARED TESTS**
#[test]
fn test_shared_defaults_to_true() {
    let registry = Registry::new();
    assert!(registry.shared_by_default());
}

#[test]
fn test_unshared_final_key_with_shared_alias() {
    let mut registry = Registry::new();
    registry
        .provider_fn("A", |_| Ok(instance(String::from("xyz"))))
        .unwrap();
    registry.set_shared("A", false).unwrap();
    registry.alias("B", "A").unwrap();
    registry.set_shared("B", true).unwrap();

    let final_1 = registry.get("A").unwrap();
    let final_2 = registry.get("A").unwrap();
    let alias_1 = registry.get("B").unwrap();
    let alias_2 = registry.get("B").unwrap();

    assert!(!same_instance(&final_1, &final_2));
    assert!(same_instance(&alias_1, &alias_2));
    assert!(!same_instance(&alias_1, &final_1));
}

#[test]
fn test_shared_final_key_with_unshared_alias() {
    let mut registry = Registry::new();
    registry
        .provider_fn("A", |_| Ok(instance(String::from("xyz"))))
        .unwrap();
    registry.set_shared("A", true).unwrap();
    registry.alias("B", "A").unwrap();
    registry.set_shared("B", false).unwrap();

    let final_1 = registry.get("A").unwrap();
    let final_2 = registry.get("A").unwrap();
    let alias_1 = registry.get("B").unwrap();
    let alias_2 = registry.get("B").unwrap();

    assert!(same_instance(&final_1, &final_2));
    assert!(!same_instance(&alias_1, &alias_2));
    assert!(!same_instance(&alias_1, &final_1));
    assert!(same_instance(&registry.get("A").unwrap(), &final_1));
}

#[test]
fn test_set_shared_on_alias_leaves_terminal_flag() {
    let mut registry = Registry::new();
    registry.alias("B", "A").unwrap();
    registry.set_shared("B", false).unwrap();

    assert!(!registry.is_shared("B"));
    assert!(registry.is_shared("A"));
}

// **FACTORY TESTS**
#[test]
fn test_factory_equals_get() {
    let mut registry = Registry::new();
    registry.service("Alpha", 127_u32).unwrap();

    let factory = registry.factory("Alpha");
    assert!(same_instance(&factory().unwrap(), &registry.get("Alpha").unwrap()));
}

#[test]
fn test_factory_of_missing_key() {
    let registry = Registry::new();
    let factory = registry.factory("Ghost");
    assert_eq!(factory().unwrap_err(), RegistryError::not_found("Ghost"));
}

// **DECLARATIVE CONFIGURATION TESTS**
#[test]
fn test_declarative_document_with_code_providers() {
    init_logging();
    let document = DeclarativeConfig::from_json_str(
        r#"{
            "services": { "Host": "localhost", "Port": 8080 },
            "aliases": { "Endpoint": "Url" },
            "shared": { "Url": false }
        }"#,
    )
    .unwrap();

    let mut registry = Registry::with_config(document.into()).unwrap();
    registry
        .provider_fn("Url", |registry| {
            let host = registry.get_as::<serde_json::Value>("Host")?;
            let port = registry.get_as::<serde_json::Value>("Port")?;
            Ok(instance(format!(
                "http://{}:{}",
                host.as_str().unwrap_or_default(),
                port
            )))
        })
        .unwrap();

    assert_eq!(
        *registry.get_as::<String>("Endpoint").unwrap(),
        "http://localhost:8080"
    );
    assert!(!same_instance(
        &registry.get("Url").unwrap(),
        &registry.get("Url").unwrap()
    ));
}

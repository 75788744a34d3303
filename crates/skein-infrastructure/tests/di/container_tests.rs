//! Service container registration and resolution tests

use skein_domain::constants::DEFAULT_QUALIFIER;
use skein_domain::error::{Error, Result};
use skein_domain::{Scope, ServiceKey};
use skein_infrastructure::di::{InjectedArgs, Injectable, Producer, ServiceContainer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

impl Injectable for English {
    fn construct(_args: &mut InjectedArgs) -> Result<Self> {
        Ok(Self)
    }
}

struct French;

impl Greeter for French {
    fn greet(&self) -> String {
        "bonjour".to_string()
    }
}

fn english_greeter(service: Arc<English>) -> Arc<dyn Greeter> {
    service
}

#[derive(Default)]
struct Ticket {
    number: usize,
}

#[test]
fn test_resolve_unregistered_fails() {
    let container = ServiceContainer::new();
    let result = container.resolve::<Ticket>();

    match result {
        Err(Error::NotRegistered { service }) => assert!(service.contains("Ticket")),
        other => panic!("Expected NotRegistered, got {:?}", other.err()),
    }
}

#[test]
fn test_singleton_resolves_same_instance() {
    let container = ServiceContainer::new();
    container
        .register_type::<English>(Scope::Singleton, DEFAULT_QUALIFIER)
        .expect("register");

    let first = container.resolve::<English>().expect("first resolve");
    let second = container.resolve::<English>().expect("second resolve");

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_prototype_resolves_fresh_instances() {
    let container = ServiceContainer::new();
    container
        .register_default::<Ticket>(Scope::Prototype, DEFAULT_QUALIFIER)
        .expect("register");

    let first = container.resolve::<Ticket>().expect("first resolve");
    let second = container.resolve::<Ticket>().expect("second resolve");

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.number, 0);
}

#[test]
fn test_trait_object_registration() {
    let container = ServiceContainer::new();
    container
        .register_type_as::<dyn Greeter, English>(Scope::Singleton, DEFAULT_QUALIFIER, english_greeter)
        .expect("register");

    let greeter = container.resolve::<dyn Greeter>().expect("resolve");
    assert_eq!(greeter.greet(), "hello");
    assert!(!container.contains::<English>());
}

#[test]
fn test_factory_invoked_once_for_singleton() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = ServiceContainer::new();
    let counter = Arc::clone(&calls);
    container
        .register_factory::<Ticket, _>(Scope::Singleton, DEFAULT_QUALIFIER, move |_| {
            let number = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Arc::new(Ticket { number }))
        })
        .expect("register");

    for _ in 0..5 {
        let ticket = container.resolve::<Ticket>().expect("resolve");
        assert_eq!(ticket.number, 1);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_resolves_its_own_dependencies() {
    struct Welcome {
        line: String,
    }

    let container = ServiceContainer::new();
    container
        .register_instance::<dyn Greeter>(Arc::new(French), DEFAULT_QUALIFIER)
        .expect("register greeter");
    container
        .register_factory::<Welcome, _>(Scope::Prototype, DEFAULT_QUALIFIER, |resolver| {
            let greeter = resolver.resolve::<dyn Greeter>()?;
            Ok(Arc::new(Welcome {
                line: format!("{}, world", greeter.greet()),
            }))
        })
        .expect("register welcome");

    let welcome = container.resolve::<Welcome>().expect("resolve");
    assert_eq!(welcome.line, "bonjour, world");
}

#[test]
fn test_factory_error_is_wrapped() {
    let container = ServiceContainer::new();
    container
        .register_factory::<Ticket, _>(Scope::Singleton, DEFAULT_QUALIFIER, |_| {
            Err(Error::internal("printer jammed"))
        })
        .expect("register");

    let err = container.resolve::<Ticket>().err().expect("factory should fail");
    match err {
        Error::ConstructionFailure {
            service, message, ..
        } => {
            assert!(service.contains("Ticket"));
            assert!(message.contains("printer jammed"));
        }
        other => panic!("Expected ConstructionFailure, got {other:?}"),
    }

    // A failed singleton is not cached
    assert_eq!(container.statistics().singletons, 0);
}

#[test]
fn test_factory_nested_not_registered_is_wrapped() {
    let container = ServiceContainer::new();
    container
        .register_factory::<Ticket, _>(Scope::Singleton, DEFAULT_QUALIFIER, |resolver| {
            let greeter = resolver.resolve::<dyn Greeter>()?;
            Ok(Arc::new(Ticket {
                number: greeter.greet().len(),
            }))
        })
        .expect("register");

    let err = container.resolve::<Ticket>().err().expect("should fail");
    assert!(matches!(err, Error::ConstructionFailure { .. }));
    assert!(err.to_string().contains("Greeter"));
}

#[test]
fn test_registered_instance_is_returned() {
    let container = ServiceContainer::new();
    let instance = Arc::new(Ticket { number: 42 });
    container
        .register_instance(Arc::clone(&instance), DEFAULT_QUALIFIER)
        .expect("register");

    let resolved = container.resolve::<Ticket>().expect("resolve");
    assert!(Arc::ptr_eq(&instance, &resolved));
    assert_eq!(container.statistics().singletons, 1);
}

#[test]
fn test_qualified_resolution() {
    let container = ServiceContainer::new();
    container
        .register_instance::<dyn Greeter>(Arc::new(French), "fr")
        .expect("register");

    let greeter = container
        .resolve_qualified::<dyn Greeter>("fr")
        .expect("resolve qualified");
    assert_eq!(greeter.greet(), "bonjour");

    match container.resolve::<dyn Greeter>() {
        Err(Error::QualifierMismatch {
            requested,
            registered,
            ..
        }) => {
            assert_eq!(requested, "");
            assert_eq!(registered, "fr");
        }
        other => panic!("Expected QualifierMismatch, got {:?}", other.err()),
    }
}

#[test]
fn test_reregistration_replaces_descriptor() {
    let container = ServiceContainer::new();
    container
        .register_instance::<dyn Greeter>(Arc::new(French), "fr")
        .expect("register french");
    container
        .register_type_as::<dyn Greeter, English>(Scope::Singleton, "en", english_greeter)
        .expect("register english");

    assert_eq!(container.statistics().descriptors, 1);
    assert!(container.resolve_qualified::<dyn Greeter>("fr").is_err());

    let descriptor = container
        .descriptor(&ServiceKey::of::<dyn Greeter>())
        .expect("descriptor");
    assert_eq!(descriptor.qualifier(), "en");
    assert!(matches!(descriptor.producer(), Producer::Type(_)));
}

#[test]
fn test_contains_never_constructs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = ServiceContainer::new();
    let counter = Arc::clone(&calls);
    container
        .register_factory::<Ticket, _>(Scope::Singleton, DEFAULT_QUALIFIER, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Ticket::default()))
        })
        .expect("register");

    assert!(container.contains::<Ticket>());
    assert!(container.contains_key(&ServiceKey::of::<Ticket>()));
    assert!(!container.contains::<English>());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_descriptor_keys_sorted() {
    let container = ServiceContainer::new();
    container
        .register_default::<Ticket>(Scope::Prototype, DEFAULT_QUALIFIER)
        .expect("register ticket");
    container
        .register_type::<English>(Scope::Singleton, DEFAULT_QUALIFIER)
        .expect("register english");

    let keys = container.descriptor_keys();
    assert_eq!(keys.len(), 2);
    assert!(keys[0].name() <= keys[1].name());
}

#[test]
fn test_statistics_track_descriptors_and_singletons() {
    let container = ServiceContainer::new();
    container
        .register_type::<English>(Scope::Singleton, DEFAULT_QUALIFIER)
        .expect("register english");
    container
        .register_default::<Ticket>(Scope::Prototype, DEFAULT_QUALIFIER)
        .expect("register ticket");

    let before = container.statistics();
    assert_eq!(before.descriptors, 2);
    assert_eq!(before.singletons, 0);

    container.resolve::<English>().expect("resolve english");
    container.resolve::<Ticket>().expect("resolve ticket");

    let after = container.statistics();
    assert_eq!(after.singletons, 1);
    assert_eq!(after.in_flight, 0);
}

#[test]
fn test_clear_all_rebuilds_singletons() {
    let calls = Arc::new(AtomicUsize::new(0));
    let container = ServiceContainer::new();
    let counter = Arc::clone(&calls);
    container
        .register_factory::<Ticket, _>(Scope::Singleton, DEFAULT_QUALIFIER, move |_| {
            let number = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Arc::new(Ticket { number }))
        })
        .expect("register");

    let first = container.resolve::<Ticket>().expect("first");
    container.clear_all();
    assert_eq!(container.statistics().singletons, 0);
    assert_eq!(container.statistics().descriptors, 1);

    let second = container.resolve::<Ticket>().expect("second");
    assert_eq!(first.number, 1);
    assert_eq!(second.number, 2);
}

#[test]
fn test_clear_all_keeps_registered_instances_resolvable() {
    let container = ServiceContainer::new();
    let instance = Arc::new(Ticket { number: 7 });
    container
        .register_instance(Arc::clone(&instance), DEFAULT_QUALIFIER)
        .expect("register");

    container.clear_all();
    let resolved = container.resolve::<Ticket>().expect("resolve");
    assert!(Arc::ptr_eq(&instance, &resolved));
}

//! Circular dependency detection tests

use skein_domain::constants::DEFAULT_QUALIFIER;
use skein_domain::error::{Error, Result};
use skein_domain::Scope;
use skein_infrastructure::di::{InjectedArgs, Injectable, InjectionPlan, ServiceContainer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak, mpsc};
use std::thread;
use std::time::Duration;

struct Alpha {
    _beta: Arc<Beta>,
}

struct Beta {
    _alpha: Arc<Alpha>,
}

impl Injectable for Alpha {
    fn injection_plan() -> InjectionPlan {
        InjectionPlan::new().param::<Beta>()
    }

    fn construct(args: &mut InjectedArgs) -> Result<Self> {
        Ok(Self {
            _beta: args.next_arg()?,
        })
    }
}

impl Injectable for Beta {
    fn injection_plan() -> InjectionPlan {
        InjectionPlan::new().param::<Alpha>()
    }

    fn construct(args: &mut InjectedArgs) -> Result<Self> {
        Ok(Self {
            _alpha: args.next_arg()?,
        })
    }
}

fn cyclic_container(scope: Scope) -> ServiceContainer {
    let container = ServiceContainer::new();
    container
        .register_type::<Alpha>(scope, DEFAULT_QUALIFIER)
        .expect("register alpha");
    container
        .register_type::<Beta>(scope, DEFAULT_QUALIFIER)
        .expect("register beta");
    container
}

#[test]
fn test_two_node_cycle_detected() {
    let container = cyclic_container(Scope::Singleton);

    match container.resolve::<Alpha>() {
        Err(Error::CircularDependency { service, chain }) => {
            assert!(service.contains("Alpha"));
            assert_eq!(chain.len(), 3);
            assert!(chain[0].contains("Alpha"));
            assert!(chain[1].contains("Beta"));
            assert!(chain[2].contains("Alpha"));
        }
        other => panic!("Expected CircularDependency, got {:?}", other.err()),
    }
}

#[test]
fn test_prototype_cycle_detected() {
    let container = cyclic_container(Scope::Prototype);
    let err = container.resolve::<Beta>().err().expect("should fail");
    assert!(err.is_circular());
}

#[test]
fn test_self_dependent_factory_detected() {
    struct Echo;

    let container = ServiceContainer::new();
    container
        .register_factory::<Echo, _>(Scope::Singleton, DEFAULT_QUALIFIER, |resolver| {
            resolver.resolve::<Echo>()
        })
        .expect("register");

    let err = container.resolve::<Echo>().err().expect("should fail");
    assert!(err.is_circular(), "factory wrapping must not hide the cycle: {err}");
}

#[test]
fn test_singleton_reentering_through_container_detected() {
    struct Echo;

    let container = Arc::new(ServiceContainer::new());
    container
        .register_factory::<Echo, _>(Scope::Singleton, DEFAULT_QUALIFIER, |resolver| {
            resolver.container().resolve::<Echo>()
        })
        .expect("register");

    // A regression here blocks on the singleton cell, so resolve off-thread
    let (tx, rx) = mpsc::channel();
    let worker = Arc::clone(&container);
    thread::spawn(move || {
        let _ = tx.send(worker.resolve::<Echo>().err());
    });

    let err = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("resolve should return instead of blocking")
        .expect("should fail");
    match err {
        Error::CircularDependency { service, chain } => {
            assert!(service.contains("Echo"));
            assert_eq!(chain.len(), 2);
        }
        other => panic!("Expected CircularDependency, got {other:?}"),
    }
    assert_eq!(container.statistics().in_flight, 0);
}

#[test]
fn test_prototype_reentering_through_captured_container_detected() {
    struct Ping;

    let container = Arc::new(ServiceContainer::new());
    let handle: Weak<ServiceContainer> = Arc::downgrade(&container);
    container
        .register_factory::<Ping, _>(Scope::Prototype, DEFAULT_QUALIFIER, move |_| {
            let container = handle
                .upgrade()
                .ok_or_else(|| Error::internal("container dropped"))?;
            container.resolve::<Ping>()
        })
        .expect("register");

    let err = container.resolve::<Ping>().err().expect("should fail");
    assert!(err.is_circular(), "expected a cycle, got {err}");

    // The per-thread guard is released once the call unwinds
    let err = container.resolve::<Ping>().err().expect("fails again");
    assert!(err.is_circular());
}

#[test]
fn test_nested_container_resolve_of_other_service_is_allowed() {
    struct Leaf;
    struct Branch(Arc<Leaf>);

    let container = ServiceContainer::new();
    container
        .register_factory::<Leaf, _>(Scope::Singleton, DEFAULT_QUALIFIER, |_| Ok(Arc::new(Leaf)))
        .expect("register leaf");
    container
        .register_factory::<Branch, _>(Scope::Prototype, DEFAULT_QUALIFIER, |resolver| {
            Ok(Arc::new(Branch(resolver.container().resolve::<Leaf>()?)))
        })
        .expect("register branch");

    let first = container.resolve::<Branch>().expect("branch");
    let second = container.resolve::<Branch>().expect("branch again");
    assert!(Arc::ptr_eq(&first.0, &second.0));
}

#[test]
fn test_container_usable_after_cycle() {
    let container = cyclic_container(Scope::Singleton);
    container
        .register_default::<String>(Scope::Singleton, DEFAULT_QUALIFIER)
        .expect("register string");

    assert!(container.resolve::<Alpha>().is_err());
    assert!(container.resolve::<Alpha>().is_err(), "a cycle is reported every time");
    assert!(container.resolve::<String>().is_ok());

    let stats = container.statistics();
    assert_eq!(stats.in_flight, 0);
    assert_eq!(stats.singletons, 1);
}

#[test]
fn test_shared_dependency_is_not_a_cycle() {
    let builds = Arc::new(AtomicUsize::new(0));

    struct Base;
    struct Left(Arc<Base>);
    struct Right(Arc<Base>);
    struct Top {
        left: Arc<Left>,
        right: Arc<Right>,
    }

    let container = ServiceContainer::new();
    let counter = Arc::clone(&builds);
    container
        .register_factory::<Base, _>(Scope::Singleton, DEFAULT_QUALIFIER, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Base))
        })
        .expect("register base");
    container
        .register_factory::<Left, _>(Scope::Prototype, DEFAULT_QUALIFIER, |r| {
            Ok(Arc::new(Left(r.resolve()?)))
        })
        .expect("register left");
    container
        .register_factory::<Right, _>(Scope::Prototype, DEFAULT_QUALIFIER, |r| {
            Ok(Arc::new(Right(r.resolve()?)))
        })
        .expect("register right");
    container
        .register_factory::<Top, _>(Scope::Prototype, DEFAULT_QUALIFIER, |r| {
            Ok(Arc::new(Top {
                left: r.resolve()?,
                right: r.resolve()?,
            }))
        })
        .expect("register top");

    let top = container.resolve::<Top>().expect("diamond resolves");
    assert!(Arc::ptr_eq(&top.left.0, &top.right.0));
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

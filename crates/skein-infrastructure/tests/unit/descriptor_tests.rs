//! Injection plan and descriptor tests

use skein_domain::{Scope, ServiceKey};
use skein_infrastructure::di::{
    Dependency, InjectionPlan, Producer, ServiceDescriptor, downcast, erase,
};
use std::sync::Arc;

trait Storage: Send + Sync {}
struct Disk;
impl Storage for Disk {}

#[test]
fn test_empty_plan() {
    let plan = InjectionPlan::new();
    assert!(plan.params().is_empty());
    assert!(plan.fields().is_empty());
}

#[test]
fn test_plan_records_params_and_fields_in_order() {
    let plan = InjectionPlan::new()
        .param::<dyn Storage>()
        .param_qualified::<String>("name")
        .field::<u32>("retries")
        .optional_field::<u64>("budget")
        .field_qualified::<bool>("verbose", "debug", false);

    assert_eq!(
        plan.params(),
        [
            Dependency::on::<dyn Storage>(),
            Dependency::qualified::<String>("name"),
        ]
    );

    let fields = plan.fields();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].name, "retries");
    assert!(fields[0].required);
    assert!(!fields[1].required);
    assert_eq!(fields[2].dependency.qualifier, "debug");
    assert!(!fields[2].required);
}

#[test]
fn test_dependency_default_qualifier() {
    let dependency = Dependency::on::<Disk>();
    assert_eq!(dependency.key, ServiceKey::of::<Disk>());
    assert!(dependency.qualifier.is_empty());
}

#[test]
fn test_erase_and_downcast_trait_object() {
    let storage: Arc<dyn Storage> = Arc::new(Disk);
    let instance = erase(Arc::clone(&storage));

    let back = downcast::<dyn Storage>(&instance).expect("downcast");
    assert!(Arc::ptr_eq(&storage, &back));
    assert!(downcast::<Disk>(&instance).is_err());
}

#[test]
fn test_instance_descriptor_is_singleton() {
    let descriptor = ServiceDescriptor::from_instance(
        ServiceKey::of::<Disk>(),
        erase(Arc::new(Disk)),
        "primary",
    );

    assert_eq!(descriptor.scope(), Scope::Singleton);
    assert_eq!(descriptor.qualifier(), "primary");
    assert!(matches!(descriptor.producer(), Producer::Instance(_)));
    assert!(descriptor.dependencies().is_empty());
    assert_eq!(format!("{:?}", descriptor.producer()), "Instance");
}

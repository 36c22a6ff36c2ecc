//! Strategy registration and policy behavior
//!
//! Covers copy-constructor and factory-method implementors, signature
//! validation at registration time, exclusion policy, and the
//! mutability probe.

use mimic_engine::{
    CloneConfig, CloneDriver, CloneError, FactorySignature, MutabilityProbe, ScalarFieldsProbe,
    UserCloneFn,
};
use mimic_test_utils::{diamond_tree, fixture_registry, person, tree_node};
use mimic_value::{ObjectRef, Value};
use std::sync::Arc;

fn driver() -> CloneDriver {
    CloneDriver::new(fixture_registry())
}

fn object(value: &Value) -> &ObjectRef {
    value.as_object().expect("expected an object value")
}

/// A copy routine that duplicates a `fixture.Person` by hand.
fn person_copier() -> UserCloneFn {
    Arc::new(|source| {
        let source = source.as_object().ok_or("expected an object")?;
        Ok(Value::Object(ObjectRef::new(
            source.type_name(),
            source.fields(),
        )))
    })
}

#[test]
fn test_copy_constructor_strategy_is_used() {
    let driver = driver();
    driver
        .register_copy_constructor("fixture.Person", "fixture.Person", person_copier())
        .unwrap();

    let source = person("Ada", 36);
    let clone = driver.clone_value(&Value::Object(source.clone())).unwrap();
    let clone = object(&clone);

    assert!(!source.ptr_eq(clone));
    assert_eq!(clone.field(1), Some(Value::from("Ada")));
}

#[test]
fn test_copy_constructor_result_is_tracked() {
    // A shared node cloned through a user routine must still come back
    // as one instance.
    let driver = driver();
    driver
        .register_copy_constructor("fixture.Person", "fixture.Person", person_copier())
        .unwrap();

    let shared = person("Ada", 36);
    let root = tree_node(
        "root",
        vec![Value::Object(shared.clone()), Value::Object(shared)],
    );

    let clone = driver.clone_value(&Value::Object(root)).unwrap();
    let children = object(&clone).field(0).unwrap();
    let children = children.as_array().unwrap();
    let first = children.get(0).unwrap();
    let second = children.get(1).unwrap();

    assert!(first.same_ref(&second));
}

#[test]
fn test_copy_constructor_rejects_abstract_bound() {
    let driver = driver();
    let err = driver
        .register_copy_constructor("fixture.Shape", "fixture.Shape", person_copier())
        .unwrap_err();
    assert!(matches!(err, CloneError::Configuration { .. }));
}

#[test]
fn test_copy_constructor_rejects_unrelated_param() {
    let driver = driver();
    let err = driver
        .register_copy_constructor("fixture.Person", "fixture.TreeNode", person_copier())
        .unwrap_err();
    assert!(matches!(err, CloneError::Configuration { .. }));
}

#[test]
fn test_factory_static_signature() {
    let driver = driver();
    driver
        .register_factory(
            "fixture.Person",
            FactorySignature::Static {
                param_type: "fixture.Person".to_string(),
            },
            person_copier(),
        )
        .unwrap();

    let source = person("Ada", 36);
    let clone = driver.clone_value(&Value::Object(source.clone())).unwrap();
    assert!(!source.ptr_eq(object(&clone)));
}

#[test]
fn test_factory_rejects_foreign_declaring_type() {
    let driver = driver();
    let err = driver
        .register_factory(
            "fixture.Person",
            FactorySignature::Instance {
                declared_on: "fixture.TreeNode".to_string(),
            },
            person_copier(),
        )
        .unwrap_err();
    assert!(matches!(err, CloneError::Configuration { .. }));
}

#[test]
fn test_user_routine_error_is_wrapped() {
    let driver = driver();
    driver
        .register_copy_constructor(
            "fixture.Person",
            "fixture.Person",
            Arc::new(|_| Err("constructor blew up".into())),
        )
        .unwrap();

    let err = driver
        .clone_value(&Value::Object(person("Ada", 36)))
        .unwrap_err();
    assert!(matches!(err, CloneError::Implementor { .. }));
}

#[test]
fn test_user_routine_clone_error_passes_through() {
    let driver = driver();
    driver
        .register_copy_constructor(
            "fixture.Person",
            "fixture.Person",
            Arc::new(|_| Err(Box::new(CloneError::DepthExceeded(3)))),
        )
        .unwrap();

    let err = driver
        .clone_value(&Value::Object(person("Ada", 36)))
        .unwrap_err();
    assert!(matches!(err, CloneError::DepthExceeded(3)));
}

#[test]
fn test_user_routine_wrong_result_type_fails() {
    let driver = driver();
    driver
        .register_copy_constructor(
            "fixture.Person",
            "fixture.Person",
            Arc::new(|_| Ok(Value::Object(tree_node("oops", vec![])))),
        )
        .unwrap();

    let err = driver
        .clone_value(&Value::Object(person("Ada", 36)))
        .unwrap_err();
    assert!(matches!(err, CloneError::Implementor { .. }));
}

#[test]
fn test_excluded_type_fails_by_default() {
    let driver = driver();
    driver.exclude_type("fixture.Person").unwrap();

    let err = driver
        .clone_value(&Value::Object(person("Ada", 36)))
        .unwrap_err();
    assert!(matches!(err, CloneError::Policy(name) if &*name == "fixture.Person"));
}

#[test]
fn test_excluded_type_retained_when_configured() {
    let registry = fixture_registry();
    let driver =
        CloneDriver::with_config(registry, CloneConfig::new().with_retain_excluded(true));
    driver.exclude_type("fixture.Person").unwrap();

    let shared = person("Ada", 36);
    let root = tree_node("root", vec![Value::Object(shared.clone())]);

    let clone = driver.clone_value(&Value::Object(root)).unwrap();
    let children = object(&clone).field(0).unwrap();
    let retained = children.as_array().unwrap().get(0).unwrap();

    // Retained, not copied: the clone aliases the source instance.
    assert!(object(&retained).ptr_eq(&shared));
}

#[test]
fn test_excluding_unknown_type_fails() {
    let driver = driver();
    assert!(driver.exclude_type("fixture.Ghost").is_err());
}

#[test]
fn test_scalar_fields_probe_promotes_to_alias() {
    let driver = driver().with_probe(Arc::new(ScalarFieldsProbe));

    // fixture.Person has a scalar-only shape apart from the untyped
    // transient slot, so the probe abstains and it still deep-copies.
    let source = person("Ada", 36);
    let clone = driver.clone_value(&Value::Object(source.clone())).unwrap();
    assert!(!source.ptr_eq(object(&clone)));

    // fixture.Circle flattens to scalar fields only and gets promoted.
    let circle = ObjectRef::new(
        Arc::from("fixture.Circle"),
        vec![Value::Float(2.5), Value::Int(0)],
    );
    let clone = driver.clone_value(&Value::Object(circle.clone())).unwrap();
    assert!(circle.ptr_eq(object(&clone)));
}

#[test]
fn test_failing_probe_changes_nothing() {
    #[derive(Debug)]
    struct PanickyProbe;

    impl MutabilityProbe for PanickyProbe {
        fn deeply_immutable(
            &self,
            _descriptor: &mimic_registry::TypeDescriptor,
            _registry: &mimic_registry::TypeRegistry,
        ) -> Option<bool> {
            None
        }
    }

    let driver = driver().with_probe(Arc::new(PanickyProbe));
    let (root, _) = diamond_tree();

    // Probe abstains on everything; graph still deep-copies.
    let clone = driver.clone_value(&Value::Object(root.clone())).unwrap();
    assert!(!root.ptr_eq(object(&clone)));
}

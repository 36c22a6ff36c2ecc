//! Flattened field access model
//!
//! One [`FieldAccessModel`] per concrete type: the full inheritance
//! chain's instance fields in a stable lexical order, with direct slot
//! get/set against object nodes.

use crate::descriptor::FieldDescriptor;
use crate::error::AccessError;
use mimic_value::{ObjectRef, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered field slots of a concrete type
///
/// Field order is lexical by name, which keeps slot assignment, caches,
/// and diagnostics reproducible across runs. Position in [`fields`]
/// equals the slot index inside instances of the type.
///
/// [`fields`]: FieldAccessModel::fields
#[derive(Debug)]
pub struct FieldAccessModel {
    type_name: Arc<str>,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<Arc<str>, usize>,
}

impl FieldAccessModel {
    /// Build a model from flattened fields
    ///
    /// Callers (the registry) sort and de-duplicate the field list before
    /// handing it over.
    pub(crate) fn new(type_name: Arc<str>, fields: Vec<FieldDescriptor>) -> Self {
        debug_assert!(fields.windows(2).all(|w| w[0].name() < w[1].name()));
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(slot, f)| (f.name().clone(), slot))
            .collect();
        Self {
            type_name,
            fields,
            by_name,
        }
    }

    /// Type this model describes
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &Arc<str> {
        &self.type_name
    }

    /// Number of field slots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the type has no instance fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in slot order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field descriptor at a slot
    #[inline]
    #[must_use]
    pub fn field(&self, slot: usize) -> Option<&FieldDescriptor> {
        self.fields.get(slot)
    }

    /// Slot index for a field name
    #[inline]
    #[must_use]
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Zero-initialized slot vector for a fresh shell
    #[must_use]
    pub fn new_slots(&self) -> Vec<Value> {
        self.fields.iter().map(|f| f.ty().zero_value()).collect()
    }

    /// Read a field slot from an instance
    ///
    /// # Errors
    /// Fails when the instance's type differs from the model's, or the
    /// slot is out of range.
    pub fn get(&self, instance: &ObjectRef, slot: usize) -> Result<Value, AccessError> {
        self.check_type(instance)?;
        instance.field(slot).ok_or_else(|| AccessError::SlotOutOfRange {
            type_name: self.type_name.clone(),
            slot,
        })
    }

    /// Read a field by name
    ///
    /// # Errors
    /// Fails when the field does not exist or access fails.
    pub fn get_named(&self, instance: &ObjectRef, name: &str) -> Result<Value, AccessError> {
        let slot = self.slot_of(name).ok_or_else(|| AccessError::UnknownField {
            type_name: self.type_name.clone(),
            field: name.to_string(),
        })?;
        self.get(instance, slot)
    }

    /// Write a field slot on an instance
    ///
    /// # Errors
    /// Fails when the instance's type differs from the model's, or the
    /// slot is out of range.
    pub fn set(&self, instance: &ObjectRef, slot: usize, value: Value) -> Result<(), AccessError> {
        self.check_type(instance)?;
        if instance.set_field(slot, value) {
            Ok(())
        } else {
            Err(AccessError::SlotOutOfRange {
                type_name: self.type_name.clone(),
                slot,
            })
        }
    }

    /// Write a field by name
    ///
    /// # Errors
    /// Fails when the field does not exist or access fails.
    pub fn set_named(
        &self,
        instance: &ObjectRef,
        name: &str,
        value: Value,
    ) -> Result<(), AccessError> {
        let slot = self.slot_of(name).ok_or_else(|| AccessError::UnknownField {
            type_name: self.type_name.clone(),
            field: name.to_string(),
        })?;
        self.set(instance, slot, value)
    }

    fn check_type(&self, instance: &ObjectRef) -> Result<(), AccessError> {
        let actual = instance.type_name();
        if actual == self.type_name {
            Ok(())
        } else {
            Err(AccessError::TypeMismatch {
                expected: self.type_name.clone(),
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldType;
    use mimic_value::ValueKind;

    fn model() -> FieldAccessModel {
        // Already lexically sorted, as the registry guarantees
        FieldAccessModel::new(
            "test.Person".into(),
            vec![
                FieldDescriptor::new("age".into(), FieldType::Scalar(ValueKind::Int), false),
                FieldDescriptor::new("name".into(), FieldType::Scalar(ValueKind::Text), false),
                FieldDescriptor::new("scratch".into(), FieldType::Any, true),
            ],
        )
    }

    fn instance(m: &FieldAccessModel) -> ObjectRef {
        ObjectRef::new(m.type_name().clone(), m.new_slots())
    }

    #[test]
    fn slots_are_lexical() {
        let m = model();
        assert_eq!(m.slot_of("age"), Some(0));
        assert_eq!(m.slot_of("name"), Some(1));
        assert_eq!(m.slot_of("scratch"), Some(2));
        assert_eq!(m.slot_of("missing"), None);
    }

    #[test]
    fn new_slots_are_zeroed() {
        let m = model();
        let slots = m.new_slots();
        assert_eq!(slots, vec![Value::Int(0), Value::Null, Value::Null]);
    }

    #[test]
    fn get_set_roundtrip() {
        let m = model();
        let obj = instance(&m);

        m.set_named(&obj, "name", Value::from("ada")).unwrap();
        assert_eq!(m.get_named(&obj, "name").unwrap(), Value::from("ada"));
        assert_eq!(m.get(&obj, 0).unwrap(), Value::Int(0));
    }

    #[test]
    fn unknown_field_rejected() {
        let m = model();
        let obj = instance(&m);

        let err = m.get_named(&obj, "salary").unwrap_err();
        assert!(matches!(err, AccessError::UnknownField { .. }));
    }

    #[test]
    fn slot_out_of_range_rejected() {
        let m = model();
        let obj = instance(&m);

        let err = m.get(&obj, 99).unwrap_err();
        assert!(matches!(err, AccessError::SlotOutOfRange { slot: 99, .. }));
    }

    #[test]
    fn type_mismatch_rejected() {
        let m = model();
        let other = ObjectRef::new("test.Other".into(), vec![]);

        let err = m.get(&other, 0).unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));
    }

    #[test]
    fn transient_flag_visible() {
        let m = model();
        assert!(!m.field(0).unwrap().is_transient());
        assert!(m.field(2).unwrap().is_transient());
    }
}

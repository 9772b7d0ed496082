//! Field (spec §3): a named, typed slot within a packet; scalar or repeated.

use crate::annotations::Annotation;
use crate::model::{FieldRef, TypeRef};

/// `offset = (constant_bytes, [intermediate_fields])`: "starting at the
/// packet's first byte, skip `constant_bytes` plus the runtime length of
/// every field listed in `intermediate_fields`" (spec §4.4.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Offset {
    pub constant_bytes: u32,
    pub intermediate_fields: Vec<FieldRef>,
}

/// Absent on a scalar field. Present on an array field with one of three
/// descriptors, or none at all ("implicit": consumes all remaining bytes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatedInfo {
    /// `@size(this_field)` on another field: this field's byte length is
    /// carried there.
    pub size_field: Option<FieldRef>,
    /// `@count(this_field)` on another field: this field's element count is
    /// carried there.
    pub count_field: Option<FieldRef>,
    /// `@repeated(count=N)`: a fixed element count known at generation time.
    pub count: Option<u32>,
}

impl RepeatedInfo {
    /// Case (d) of spec §3 invariant 4: no size, count, nor count-field —
    /// occupies all remaining bytes. Legal only as the last field of a
    /// childless packet.
    pub fn is_implicit(&self) -> bool {
        self.size_field.is_none() && self.count_field.is_none() && self.count.is_none()
    }

    /// Used by the size pass: a repeated field contributes a fixed multiple
    /// to `min_size` only when it has a literal `count`; any other repeated
    /// field (size-field-driven, count-field-driven, or implicit) is
    /// "dynamic-repeated" and contributes nothing fixed.
    pub fn is_dynamic(&self) -> bool {
        self.count.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: TypeRef,
    /// `None` until the offset pass runs.
    pub offset: Option<Offset>,
    pub repeated_info: Option<RepeatedInfo>,
    pub annotations: Vec<Annotation>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            field_type,
            offset: None,
            repeated_info: None,
            annotations: Vec::new(),
        }
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated_info.is_some()
    }

    /// Spec §4.4.1: a repeated field without a fixed count contributes
    /// nothing to `min_size` and is excluded from the offset's constant part.
    pub fn is_dynamic_repeated(&self) -> bool {
        self.repeated_info.as_ref().is_some_and(RepeatedInfo::is_dynamic)
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }
}

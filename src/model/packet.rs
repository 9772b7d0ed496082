//! Packet (spec §3): a named record with optional single inheritance,
//! ordered fields, and packet-level annotations.

use crate::annotations::{Annotation, ParamValue};
use crate::model::{Field, FieldId, FieldRef, PacketId, PacketRef, PomId};

/// Effect of a `@padded(multiple=N, excluded?)` annotation (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    pub multiple: u32,
    pub excluded: bool,
}

/// One `field = value` condition from a `@type_selector(...)` annotation,
/// with `field` already resolved to a field in an ancestor packet.
#[derive(Debug, Clone)]
pub struct SelectorCondition {
    pub field: FieldRef,
    pub value: ParamValue,
}

/// `size_info` detail (spec §3): either the constant byte length (fixed),
/// the size-field reference (dynamic, explicit size field), or absent
/// (dynamic, "custom" — length computed by the generated runtime).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeDetail {
    Constant(u32),
    SizeField(FieldRef),
    Custom,
}

impl SizeDetail {
    pub fn is_dynamic(self) -> bool {
        !matches!(self, SizeDetail::Constant(_))
    }
}

#[derive(Debug, Clone)]
pub struct Packet {
    pub name: String,
    pub pom: PomId,
    /// This packet's own index within `Pom::packets`, assigned once on
    /// insertion so the packet can mint `FieldRef`s pointing at itself.
    pub id: PacketId,
    pub parent: Option<PacketRef>,
    /// Back-edges, populated when a child declares `parent`.
    pub children: Vec<PacketRef>,
    pub fields: Vec<Field>,
    pub annotations: Vec<Annotation>,

    /// Set by the size pass. `None` before analysis runs.
    pub size_info: Option<SizeDetail>,
    /// Set by the size pass. `0` before analysis runs.
    pub min_size: u32,
    /// Set directly to `true` by the `bigendian` annotation at construction
    /// time, then OR'd with ancestor flags by the endianness pass.
    pub big_endian: bool,
    /// Set by the `@padded` annotation at construction time.
    pub padding: Option<Padding>,
    /// Set by the `@type_selector` annotation at construction time, once its
    /// field references have been resolved against the parent chain.
    pub type_selector: Option<Vec<SelectorCondition>>,
}

impl Packet {
    pub fn new(name: impl Into<String>, pom: PomId, id: PacketId) -> Self {
        Self {
            name: name.into(),
            pom,
            id,
            parent: None,
            children: Vec::new(),
            fields: Vec::new(),
            annotations: Vec::new(),
            size_info: None,
            min_size: 0,
            big_endian: false,
            padding: None,
            type_selector: None,
        }
    }

    pub fn self_ref(&self) -> PacketRef {
        PacketRef {
            pom: self.pom,
            packet: self.id,
        }
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    pub fn find_field(&self, name: &str) -> Option<(FieldRef, &Field)> {
        self.fields.iter().enumerate().find_map(|(i, f)| {
            (f.name == name).then(|| {
                (
                    FieldRef {
                        pom: self.pom,
                        packet: self.id,
                        field: FieldId(i),
                    },
                    f,
                )
            })
        })
    }

    /// This packet's own size field, if `@size` (with no parameter) was
    /// applied to one of its fields. Does not look at ancestors.
    pub fn own_size_field(&self) -> Option<FieldRef> {
        if let Some(SizeDetail::SizeField(r)) = self.size_info {
            Some(r)
        } else {
            None
        }
    }

    pub fn is_const_size(&self) -> bool {
        matches!(self.size_info, Some(SizeDetail::Constant(_)))
    }
}

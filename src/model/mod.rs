//! Packet Object Model (POM): the in-memory IR for one parsed `.packet` file
//! (spec §3) plus the indices used to cross-reference packets and fields
//! that may live in a different POM (an import).
//!
//! Packets and fields are stored in per-file arenas (`Pom::packets`,
//! `Packet::fields`) and referred to everywhere else by index, never by
//! pointer or `Rc` (spec §9's design note). A [`PomId`] identifies a POM
//! inside the [`crate::loader::Loader`]'s arena; a [`PacketRef`]/[`FieldRef`]
//! pair an owning `PomId` with an index local to that POM. Two refs compare
//! equal iff they denote the same packet/field in the same POM, which is
//! exactly the identity spec §8 (property 5) requires of cross-file
//! `parent` pointers.

pub mod enum_def;
pub mod expr;
pub mod field;
pub mod packet;
pub mod pom;

pub use enum_def::{Enum, EnumItem};
pub use field::{Field, Offset, RepeatedInfo};
pub use packet::{Packet, SizeDetail};
pub use pom::Pom;

/// Index of a [`Pom`] inside the loader's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PomId(pub usize);

/// Index of a [`Packet`] inside its owning [`Pom::packets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(pub usize);

/// Index of an [`Enum`] inside its owning [`Pom::enums`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub usize);

/// Index of a [`Field`] inside its owning [`Packet::fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

/// A reference to a packet, valid against the loader's global arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketRef {
    pub pom: PomId,
    pub packet: PacketId,
}

/// A reference to a field, valid against the loader's global arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub pom: PomId,
    pub packet: PacketId,
    pub field: FieldId,
}

/// The type of a field: either a builtin scalar or another packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Builtin(crate::types::BuiltinType),
    Packet(PacketRef),
}

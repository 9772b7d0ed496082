//! POM (spec §3): the in-memory representation of one parsed `.packet` file.

use std::path::PathBuf;

use crate::model::{Enum, EnumId, Packet, PacketId, PomId};

#[derive(Debug, Clone)]
pub struct Pom {
    pub path: PathBuf,
    /// Derived from the file basename.
    pub namespace: String,
    /// Target-language name -> emitted package/namespace string, e.g. `cpp` -> `"my::pkg"`.
    pub package_bindings: Vec<(String, String)>,
    /// Declaration-ordered imports: imported namespace -> the imported POM.
    pub imports: Vec<(String, PomId)>,
    pub enums: Vec<Enum>,
    pub packets: Vec<Packet>,
}

impl Pom {
    pub fn new(path: PathBuf, namespace: impl Into<String>) -> Self {
        Self {
            path,
            namespace: namespace.into(),
            package_bindings: Vec::new(),
            imports: Vec::new(),
            enums: Vec::new(),
            packets: Vec::new(),
        }
    }

    pub fn package_for(&self, lang: &str) -> Option<&str> {
        self.package_bindings
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, p)| p.as_str())
    }

    pub fn import(&self, namespace: &str) -> Option<PomId> {
        self.imports.iter().find(|(ns, _)| ns == namespace).map(|(_, id)| *id)
    }

    /// Allocate the next packet id without inserting anything — used by the
    /// builder, which needs a packet's id before the packet itself exists
    /// (to let a field type reference its own still-under-construction packet).
    pub fn next_packet_id(&self) -> PacketId {
        PacketId(self.packets.len())
    }

    pub fn push_packet(&mut self, packet: Packet) -> PacketId {
        let id = PacketId(self.packets.len());
        debug_assert_eq!(packet.id, id, "packet must be constructed with the id `next_packet_id` would hand out");
        self.packets.push(packet);
        id
    }

    pub fn push_enum(&mut self, e: Enum) -> EnumId {
        let id = EnumId(self.enums.len());
        self.enums.push(e);
        id
    }

    /// Find a packet declared directly in this POM by name (does not
    /// search imports — callers resolve `Namespace.Packet` by following
    /// `imports` first).
    pub fn find_packet(&self, name: &str) -> Option<PacketId> {
        self.packets.iter().position(|p| p.name == name).map(PacketId)
    }

    pub fn find_enum(&self, name: &str) -> Option<EnumId> {
        self.enums.iter().position(|e| e.name == name).map(EnumId)
    }
}

//! Emitter interface (spec §4.5): the core hands a fully-analyzed POM to a
//! target-specific emitter. Generated-code style is explicitly out of the
//! core's scope — these two emitters exist to exercise the interface, not
//! to be production code generators.

pub mod cpp;
pub mod go;

use std::path::Path;

use crate::error::PacketError;
use crate::model::{Pom, PomId};

/// A read-only view an emitter is handed: the POM to emit plus every POM
/// already loaded (so cross-file packet references can be rendered).
pub struct EmitContext<'a> {
    pub world: &'a [Pom],
    pub pom_id: PomId,
    pub pom: &'a Pom,
}

pub trait Emitter {
    /// The id matched against `-l/--lang`.
    fn id(&self) -> &'static str;

    /// Renders `ctx.pom` into `out_dir`. Implementations own their own
    /// file-naming and template conventions.
    fn emit(&self, ctx: &EmitContext, out_dir: &Path) -> Result<(), PacketError>;
}

/// Registered emitter ids (spec §9: only `cpp` and `go` are in scope; other
/// language ids were reserved but never implemented upstream).
pub fn lookup(id: &str) -> Option<Box<dyn Emitter>> {
    match id {
        "cpp" => Some(Box::new(cpp::CppEmitter)),
        "go" => Some(Box::new(go::GoEmitter)),
        _ => None,
    }
}

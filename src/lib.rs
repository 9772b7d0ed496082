//! `packetc`: a code generator for a packet-description language. Parses
//! `.packet` files into a validated, layout-complete semantic model (the
//! Packet Object Model) and hands that model to per-target emitters.
//!
//! The crate is organized leaves-first, matching its own internal
//! dependency order: builtin types and the annotation registry at the
//! bottom, the POM data model above that, the loader/parser/builder that
//! produce a POM, the analysis pipeline that completes one, and the
//! emitters that consume one.

pub mod analysis;
pub mod annotations;
pub mod builder;
pub mod conf;
pub mod emit;
pub mod error;
pub mod loader;
pub mod model;
pub mod name_helpers;
pub mod parser;
#[cfg(test)]
mod test_support;
pub mod types;

use std::path::Path;

use error::{Location, PacketError};
use loader::Loader;
use model::PomId;

/// End-to-end entry point: load `input`, run the analysis pipeline over it
/// and its transitive imports, then emit with `lang`.
///
/// `recursive` also emits every transitively imported `.packet`, not just
/// `input` itself (spec §6's `-r/--recursive`).
pub fn generate(
    input: &Path,
    lang: &str,
    packet_path: Option<&str>,
    output_dir: &Path,
    recursive: bool,
) -> Result<(), PacketError> {
    let emitter = emit::lookup(lang).ok_or_else(|| PacketError::ReferenceError {
        location: Location::file(input),
        message: format!("no such emitter: {lang}"),
    })?;

    let mut loader = Loader::new(packet_path);
    let root = loader.load_root(input)?;
    loader.analyze(root)?;

    std::fs::create_dir_all(output_dir).map_err(|source| PacketError::Io {
        location: Location::file(output_dir),
        source,
    })?;

    let targets: Vec<PomId> = if recursive {
        (0..loader.poms().len()).map(PomId).collect()
    } else {
        vec![root]
    };

    for pom_id in targets {
        let ctx = emit::EmitContext { world: loader.poms(), pom_id, pom: loader.pom(pom_id) };
        emitter.emit(&ctx, output_dir)?;
    }

    Ok(())
}

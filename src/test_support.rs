//! Test-only helpers for building a single-file [`Pom`] directly from
//! source text, without touching disk. Used by the passes' own `mod tests`
//! so each can exercise its invariants against a literal `.packet` snippet.
#![cfg(test)]

use crate::error::PacketError;
use crate::model::{Pom, PomId};

/// Parses and builds `source` as a standalone POM with no imports.
pub(crate) fn try_build(source: &str) -> Result<Pom, PacketError> {
    let ast = crate::parser::parse(source).map_err(|message| PacketError::ParseError {
        location: crate::error::Location::file("test.packet"),
        message,
    })?;
    crate::builder::build_pom(&[], PomId(0), "test.packet".into(), "test".into(), ast, Vec::new())
}

pub(crate) fn build(source: &str) -> Pom {
    try_build(source).unwrap_or_else(|e| panic!("build failed: {e}"))
}

/// Builds `source` and runs the full analysis pipeline over it, returning
/// the single-POM world so callers can inspect `min_size`/`offset`/etc.
pub(crate) fn analyze(source: &str) -> Result<Vec<Pom>, PacketError> {
    let pom = build(source);
    let mut world = vec![pom];
    crate::analysis::run(&mut world, PomId(0))?;
    Ok(world)
}

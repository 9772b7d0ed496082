//! Runs the three analysis passes, in order, over a root POM and every POM
//! it transitively imports (spec §4.4, §9's resolution of the "does Size
//! run on imports too" open question: yes, recursively).

use std::collections::HashSet;

use crate::error::PacketError;
use crate::model::{Pom, PomId};

/// Dependency order: every POM appears after all of its imports (post-order
/// DFS), since `min_size`/`size_info` of an imported packet must be known
/// before a dependent packet that embeds it as a field type is processed.
fn dependency_order(world: &[Pom], root: PomId) -> Vec<PomId> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    visit(world, root, &mut seen, &mut order);
    order
}

fn visit(world: &[Pom], id: PomId, seen: &mut HashSet<PomId>, order: &mut Vec<PomId>) {
    if !seen.insert(id) {
        return;
    }
    for &(_, imp) in &world[id.0].imports {
        visit(world, imp, seen, order);
    }
    order.push(id);
}

/// Runs Size, then Offset, then Endianness over `root` and its transitive
/// imports. Every import of a POM is guaranteed (by the loader's load
/// order) to already occupy a lower arena index than that POM, so each
/// pass can split the arena at `id.0` and treat everything before it as
/// already fully processed, read-only context.
pub fn run(world: &mut Vec<Pom>, root: PomId) -> Result<(), PacketError> {
    let order = dependency_order(world, root);

    for &id in &order {
        let (before, rest) = world.split_at_mut(id.0);
        super::size::process_pom(before, &mut rest[0], id)?;
    }
    for &id in &order {
        let (before, rest) = world.split_at_mut(id.0);
        super::offset::process_pom(before, &mut rest[0], id)?;
    }
    for &id in &order {
        let (before, rest) = world.split_at_mut(id.0);
        super::endian::process_pom(before, &mut rest[0], id)?;
    }
    Ok(())
}

//! File loader / resolver (spec §4.3): finds a `.packet` file on a search
//! path, parses and builds it into a POM, and memoizes by absolute path so
//! diamond imports share one POM instance and `Packet::parent` pointers
//! compare equal under identity (spec §8, property 5).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::builder;
use crate::conf;
use crate::error::{Location, PacketError};
use crate::model::{Pom, PomId};
use crate::parser;

pub struct Loader {
    search_path: Vec<PathBuf>,
    poms: Vec<Pom>,
    cache: HashMap<PathBuf, PomId>,
    in_progress: HashSet<PathBuf>,
}

impl Loader {
    /// Assembles the search path: `-p`/explicit argument, else the
    /// `PACKET_PATH` environment variable, else the current directory
    /// (spec §6).
    pub fn new(explicit_packet_path: Option<&str>) -> Self {
        let raw = explicit_packet_path
            .map(str::to_string)
            .or_else(|| std::env::var(conf::PACKET_PATH_ENV_VAR).ok())
            .unwrap_or_else(|| conf::DEFAULT_PACKET_PATH.to_string());

        let search_path = raw
            .split(conf::PACKET_PATH_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();

        Self { search_path, poms: Vec::new(), cache: HashMap::new(), in_progress: HashSet::new() }
    }

    pub fn poms(&self) -> &[Pom] {
        &self.poms
    }

    /// Exposes the arena for the analysis pipeline, which needs `&mut
    /// Vec<Pom>` to split-borrow it per POM. Not exposed outside the crate:
    /// callers should go through `analyze` or `generate`, which preserve the
    /// loader's cache/identity invariants.
    pub(crate) fn poms_mut(&mut self) -> &mut Vec<Pom> {
        &mut self.poms
    }

    /// Runs the Size/Offset/Endianness pipeline over `root` and everything
    /// it transitively imports. Exposed so callers other than `generate`
    /// (tests, alternative front ends) can load and analyze without also
    /// invoking an emitter.
    pub fn analyze(&mut self, root: PomId) -> Result<(), PacketError> {
        crate::analysis::run(self.poms_mut(), root)
    }

    pub fn pom(&self, id: PomId) -> &Pom {
        &self.poms[id.0]
    }

    /// Finds `logical_name` on the search path and returns its absolute
    /// path, or `NotFound`.
    pub fn resolve(&self, logical_name: &str) -> Result<PathBuf, PacketError> {
        for dir in &self.search_path {
            let candidate = dir.join(logical_name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(PacketError::NotFound {
            location: Location::file(logical_name),
            name: logical_name.to_string(),
        })
    }

    /// Loads a root file named directly on the command line: used as given,
    /// not resolved against the search path (includes inside it still are).
    pub fn load_root(&mut self, path: &Path) -> Result<PomId, PacketError> {
        if !path.is_file() {
            return Err(PacketError::NotFound {
                location: Location::file(path),
                name: path.display().to_string(),
            });
        }
        self.load_abs(path.to_path_buf())
    }

    fn load_logical(&mut self, logical_name: &str) -> Result<PomId, PacketError> {
        let abs = self.resolve(logical_name)?;
        self.load_abs(abs)
    }

    fn load_abs(&mut self, abs_path: PathBuf) -> Result<PomId, PacketError> {
        let abs_path = abs_path.canonicalize().unwrap_or(abs_path);

        if let Some(&id) = self.cache.get(&abs_path) {
            return Ok(id);
        }
        if !self.in_progress.insert(abs_path.clone()) {
            return Err(PacketError::ReferenceError {
                location: Location::file(abs_path.clone()),
                message: "include cycle detected".to_string(),
            });
        }

        debug!(path = %abs_path.display(), "loading packet file");

        let source = std::fs::read_to_string(&abs_path).map_err(|source| PacketError::Io {
            location: Location::file(abs_path.clone()),
            source,
        })?;

        let ast = parser::parse(&source).map_err(|message| PacketError::ParseError {
            location: Location::file(abs_path.clone()),
            message,
        })?;

        let namespace = abs_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| abs_path.display().to_string());

        let mut imports = Vec::with_capacity(ast.includes.len());
        for include in &ast.includes {
            let imported_id = self.load_logical(&include.path)?;
            let imported_namespace = self.poms[imported_id.0].namespace.clone();
            imports.push((imported_namespace, imported_id));
        }

        let pom_id = PomId(self.poms.len());
        let pom = builder::build_pom(&self.poms, pom_id, abs_path.clone(), namespace, ast, imports)?;
        self.poms.push(pom);

        self.populate_children(pom_id);

        self.in_progress.remove(&abs_path);
        self.cache.insert(abs_path, pom_id);
        Ok(pom_id)
    }

    /// Back-fills `Packet::children` on whichever POM each newly-built
    /// packet's parent lives in — same file or one already loaded.
    fn populate_children(&mut self, new_pom: PomId) {
        let edges: Vec<_> = self.poms[new_pom.0]
            .packets
            .iter()
            .filter_map(|p| p.parent.map(|parent| (parent, p.self_ref())))
            .collect();

        for (parent, child) in edges {
            self.poms[parent.pom.0].packets[parent.packet.0].children.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn resolve_not_found_names_the_logical_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = Loader::new(Some(dir.path().to_str().unwrap()));
        let err = loader.resolve("missing.packet").unwrap_err();
        assert!(matches!(err, PacketError::NotFound { .. }));
    }

    #[test]
    fn explicit_packet_path_splits_on_colon_and_wins_over_env() {
        let loader = Loader::new(Some("/one:/two"));
        assert_eq!(loader.search_path, vec![PathBuf::from("/one"), PathBuf::from("/two")]);
    }

    /// S6 — loading the same file twice (directly, and transitively via a
    /// second file that also includes it) returns the identical POM, so
    /// `Packet::parent` pointers compare equal under identity.
    #[test]
    fn diamond_imports_share_one_pom_instance() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.packet"), "packet X {\n  uint8 dummy;\n}\n").unwrap();
        fs::write(
            dir.path().join("b.packet"),
            "include <\"a.packet\">;\n\npacket Y : a.X {\n  uint8 extra;\n}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("c.packet"),
            "include <\"a.packet\">;\ninclude <\"b.packet\">;\n\npacket Z {\n  uint8 more;\n}\n",
        )
        .unwrap();

        let mut loader = Loader::new(Some(dir.path().to_str().unwrap()));
        let c = loader.load_root(&dir.path().join("c.packet")).unwrap();

        let a_via_c = loader.pom(c).import("a").unwrap();
        let b_via_c = loader.pom(c).import("b").unwrap();
        let a_via_b = loader.pom(b_via_c).import("a").unwrap();
        assert_eq!(a_via_c, a_via_b);

        let x_id = loader.pom(a_via_c).find_packet("X").unwrap();
        let y = &loader.pom(b_via_c).packets[loader.pom(b_via_c).find_packet("Y").unwrap().0];
        let parent = y.parent.unwrap();
        assert_eq!(parent.pom, a_via_c);
        assert_eq!(parent.packet, x_id);
    }

    #[test]
    fn include_cycle_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.packet"), "include <\"b.packet\">;\npacket A { uint8 x; }\n").unwrap();
        fs::write(dir.path().join("b.packet"), "include <\"a.packet\">;\npacket B { uint8 y; }\n").unwrap();

        let mut loader = Loader::new(Some(dir.path().to_str().unwrap()));
        let err = loader.load_root(&dir.path().join("a.packet")).unwrap_err();
        assert!(matches!(err, PacketError::ReferenceError { .. }));
    }

    #[test]
    fn analyze_runs_the_pipeline_on_a_loaded_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.packet"), "packet A {\n  uint16 x;\n  uint8 y;\n}\n").unwrap();

        let mut loader = Loader::new(Some(dir.path().to_str().unwrap()));
        let root = loader.load_root(&dir.path().join("a.packet")).unwrap();
        loader.analyze(root).unwrap();
        assert_eq!(loader.pom(root).packets[0].min_size, 3);
    }
}

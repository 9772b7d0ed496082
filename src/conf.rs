//! Paths, defaults and constants shared across the loader and the CLI.

/// Environment variable consulted for the search path when `-p` is absent.
pub const PACKET_PATH_ENV_VAR: &str = "PACKET_PATH";
/// Separator between entries of a search path, both in `-p` and `PACKET_PATH`.
pub const PACKET_PATH_SEPARATOR: char = ':';
/// Search path used when neither `-p` nor `PACKET_PATH` is set.
pub const DEFAULT_PACKET_PATH: &str = ".";

//! Error set produced while resolving, loading, building and analyzing packet files.
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Where a diagnostic occurred: always a file, usually a packet, sometimes a field.
///
/// Every error in this crate carries one, per the propagation policy: one
/// diagnostic line per error, naming file + packet/field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    pub packet: Option<String>,
    pub field: Option<String>,
}

impl Location {
    pub fn file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            packet: None,
            field: None,
        }
    }

    pub fn packet(file: impl Into<PathBuf>, packet: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            packet: Some(packet.into()),
            field: None,
        }
    }

    pub fn field(file: impl Into<PathBuf>, packet: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            packet: Some(packet.into()),
            field: Some(field.into()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file.display())?;
        if let Some(packet) = &self.packet {
            write!(f, ":{packet}")?;
            if let Some(field) = &self.field {
                write!(f, ".{field}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
/// Errors that can occur while resolving, loading and analyzing `.packet` files.
pub enum PacketError {
    /// The file could not be found on the search path.
    #[error("[{location}] file not found on search path: {name}")]
    NotFound { location: Location, name: String },

    /// The external lexer/parser reported one or more syntax errors.
    #[error("[{location}] parse error: {message}")]
    ParseError { location: Location, message: String },

    /// Unknown parent packet, field type, annotation, or dangling field reference.
    #[error("[{location}] reference error: {message}")]
    ReferenceError { location: Location, message: String },

    /// Wrong arity, wrong parameter name, or a missing required value.
    #[error("[{location}] annotation shape error: {message}")]
    AnnotationShapeError { location: Location, message: String },

    /// Child/parent size-field mismatch, missing size descriptor, misplaced
    /// implicit array, or a const-size packet with zero minimum size.
    #[error("[{location}] layout error: {message}")]
    LayoutError { location: Location, message: String },

    /// Failed to read a file from disk.
    #[error("[{location}] failed to read file: {source}")]
    Io {
        location: Location,
        #[source]
        source: std::io::Error,
    },
}

impl PacketError {
    pub fn location(&self) -> &Location {
        match self {
            PacketError::NotFound { location, .. }
            | PacketError::ParseError { location, .. }
            | PacketError::ReferenceError { location, .. }
            | PacketError::AnnotationShapeError { location, .. }
            | PacketError::LayoutError { location, .. }
            | PacketError::Io { location, .. } => location,
        }
    }
}

pub type Result<T> = std::result::Result<T, PacketError>;

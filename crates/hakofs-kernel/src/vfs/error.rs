//! VFS error types.

use std::io;
use thiserror::Error;

use super::ids::InodeId;

/// VFS error type.
///
/// Request-time variants (`NotFound`, `NotADirectory`, `IsADirectory`,
/// `ReadOnly`, `InvalidRange`) are recoverable by the caller. Build-time
/// variants abort construction before anything is served.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Name absent from a directory, or identifier not in the tree.
    #[error("not found: {0}")]
    NotFound(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Filesystem is read-only.
    #[error("filesystem is read-only")]
    ReadOnly,

    /// Negative offset or length handed to a ranged read.
    #[error("invalid range: offset {offset}, length {length}")]
    InvalidRange { offset: i64, length: i64 },

    /// Name already present in the parent directory.
    #[error("duplicate name {name:?} in directory {parent}")]
    DuplicateName { parent: InodeId, name: String },

    /// Name cannot be used as a directory entry.
    #[error("invalid name {0:?}")]
    InvalidName(String),

    /// Permission bits outside `0o7777`.
    #[error("invalid mode {0:#o}")]
    InvalidMode(u32),

    /// Two nodes were registered under one identifier.
    #[error("identifier collision: {0}")]
    IdentifierCollision(InodeId),

    /// The identifier space ran out.
    #[error("inode identifiers exhausted")]
    IdentifiersExhausted,

    /// Tree manifest could not be parsed.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(what: impl Into<String>) -> Self {
        Self::NotADirectory(what.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(what: impl Into<String>) -> Self {
        Self::IsADirectory(what.into())
    }

    /// Create an InvalidName error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName(name.into())
    }

    /// Create a Manifest error.
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    /// Returns true for errors that can only come out of tree construction.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            VfsError::DuplicateName { .. }
                | VfsError::InvalidName(_)
                | VfsError::InvalidMode(_)
                | VfsError::IdentifierCollision(_)
                | VfsError::IdentifiersExhausted
                | VfsError::Manifest(_)
        )
    }
}

/// Convert VfsError to std::io::Error for compatibility.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        match e {
            VfsError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            VfsError::NotADirectory(msg) => io::Error::new(io::ErrorKind::NotADirectory, msg),
            VfsError::IsADirectory(msg) => io::Error::new(io::ErrorKind::IsADirectory, msg),
            VfsError::ReadOnly => {
                io::Error::new(io::ErrorKind::ReadOnlyFilesystem, "filesystem is read-only")
            }
            e @ VfsError::InvalidRange { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
            }
            e @ (VfsError::DuplicateName { .. } | VfsError::IdentifierCollision(_)) => {
                io::Error::new(io::ErrorKind::AlreadyExists, e.to_string())
            }
            e @ (VfsError::InvalidName(_) | VfsError::InvalidMode(_)) => {
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
            }
            VfsError::IdentifiersExhausted => io::Error::other("inode identifiers exhausted"),
            VfsError::Manifest(msg) => io::Error::new(io::ErrorKind::InvalidData, msg),
            VfsError::Io(e) => e,
        }
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

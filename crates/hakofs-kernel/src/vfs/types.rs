//! Core VFS types.
//!
//! These mirror what a FUSE bridge needs to fill in its replies, without
//! depending on any particular FUSE binding.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::ids::InodeId;

/// Default permissions for regular files.
pub const DEFAULT_FILE_PERM: u32 = 0o644;

/// Default permissions for directories.
pub const DEFAULT_DIR_PERM: u32 = 0o755;

/// Block size reported in attributes and statfs.
pub const BLOCK_SIZE: u32 = 4096;

/// Longest name accepted in a directory.
pub const MAX_NAME_LEN: usize = 255;

/// `S_IFREG` type bits.
const TYPE_BITS_FILE: u32 = 0o100000;

/// `S_IFDIR` type bits.
const TYPE_BITS_DIR: u32 = 0o040000;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// The `S_IFMT` bits for this kind.
    pub fn type_bits(&self) -> u32 {
        match self {
            FileType::File => TYPE_BITS_FILE,
            FileType::Directory => TYPE_BITS_DIR,
        }
    }

    /// Full `st_mode` value: type bits plus permissions.
    pub fn mode(&self, perm: u32) -> u32 {
        self.type_bits() | (perm & 0o7777)
    }

    /// Single-character tag used in listings.
    pub fn tag(&self) -> char {
        match self {
            FileType::File => '-',
            FileType::Directory => 'd',
        }
    }
}

/// Owner reported for every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
}

/// File attributes (metadata).
///
/// Built once from immutable node data, so two calls for the same node
/// return equal records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttr {
    /// Inode number.
    pub ino: InodeId,
    /// Size in bytes.
    pub size: u64,
    /// Allocated 512-byte blocks.
    pub blocks: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permissions (e.g., 0o644).
    pub perm: u32,
    /// Number of hard links.
    pub nlink: u32,
    /// Owning user and group.
    pub owner: Owner,
    /// Build time of the tree; used for atime, mtime and ctime alike.
    pub mtime: SystemTime,
}

impl FileAttr {
    /// Create attributes for a file.
    pub fn file(ino: InodeId, size: u64, perm: u32, owner: Owner, mtime: SystemTime) -> Self {
        Self {
            ino,
            size,
            blocks: size.div_ceil(512),
            kind: FileType::File,
            perm,
            nlink: 1,
            owner,
            mtime,
        }
    }

    /// Create attributes for a directory with `subdirs` child directories.
    pub fn directory(
        ino: InodeId,
        perm: u32,
        subdirs: u32,
        owner: Owner,
        mtime: SystemTime,
    ) -> Self {
        Self {
            ino,
            size: 0,
            blocks: 0,
            kind: FileType::Directory,
            perm,
            nlink: 2u32.saturating_add(subdirs), // . and .. plus each child's ..
            owner,
            mtime,
        }
    }

    /// Full `st_mode` value.
    pub fn mode(&self) -> u32 {
        self.kind.mode(self.perm)
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Inode of the child.
    pub ino: InodeId,
    /// Entry type.
    pub kind: FileType,
    /// Full `st_mode` of the child.
    pub mode: u32,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, ino: InodeId, kind: FileType, perm: u32) -> Self {
        Self {
            name: name.into(),
            ino,
            kind,
            mode: kind.mode(perm),
        }
    }
}

/// Filesystem statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatFs {
    /// Total blocks.
    pub blocks: u64,
    /// Free blocks.
    pub bfree: u64,
    /// Available blocks (to non-root).
    pub bavail: u64,
    /// Total inodes.
    pub files: u64,
    /// Free inodes.
    pub ffree: u64,
    /// Block size.
    pub bsize: u32,
    /// Maximum name length.
    pub namelen: u32,
    /// Fragment size.
    pub frsize: u32,
}

impl StatFs {
    /// Statistics for a full, read-only volume.
    pub fn read_only(content_bytes: u64, nodes: u64) -> Self {
        Self {
            blocks: content_bytes.div_ceil(BLOCK_SIZE as u64),
            bfree: 0,
            bavail: 0,
            files: nodes,
            ffree: 0,
            bsize: BLOCK_SIZE,
            namelen: MAX_NAME_LEN as u32,
            frsize: BLOCK_SIZE,
        }
    }
}

/// Open file flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    /// Read access requested.
    pub read: bool,
    /// Write access requested.
    pub write: bool,
    /// Append mode.
    pub append: bool,
    /// Truncate on open.
    pub truncate: bool,
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            truncate: false,
        }
    }
}

impl OpenFlags {
    /// Read-only access.
    pub fn read() -> Self {
        Self::default()
    }

    /// Write access (also enables read).
    pub fn write() -> Self {
        Self {
            read: true,
            write: true,
            ..Default::default()
        }
    }

    /// Returns true if opening with these flags would modify the file.
    pub fn mutates(&self) -> bool {
        self.write || self.append || self.truncate
    }
}

/// Access check requested through `access(2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMask {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl AccessMask {
    /// Existence check only (`F_OK`).
    pub fn exists() -> Self {
        Self::default()
    }
}

//! Request dispatch for the FUSE adapter.
//!
//! [`Bridge`] takes requests the way the kernel phrases them (raw inode
//! numbers, `OsStr` names, signed offsets, flag words) and answers with VFS
//! types or an errno. Keeping it free of `fuser` types means the dispatch
//! logic is tested without mounting anything.

use std::ffi::OsStr;
use std::sync::Arc;

use hakofs_kernel::{DirEntry, FileAttr, FileType, InodeId, StatFs, TreeOps, VfsError};
use libc::c_int;

use crate::errno::{access_mask, errno, open_flags};

/// One row of a directory stream, including `.` and `..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    /// Inode of the entry.
    pub ino: u64,
    /// Offset the kernel passes back to resume after this row.
    pub next_offset: i64,
    pub kind: FileType,
    pub name: String,
}

/// Dispatches protocol requests onto a [`TreeOps`] implementation.
pub struct Bridge<T: TreeOps> {
    tree: Arc<T>,
}

impl<T: TreeOps> Clone for Bridge<T> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
        }
    }
}

impl<T: TreeOps> Bridge<T> {
    pub fn new(tree: Arc<T>) -> Self {
        Self { tree }
    }

    fn inode(raw: u64) -> Result<InodeId, c_int> {
        InodeId::new(raw).ok_or(libc::ENOENT)
    }

    fn fail(op: &'static str, raw: u64, err: VfsError) -> c_int {
        let code = errno(&err);
        match err {
            VfsError::NotFound(_) => tracing::trace!(op, ino = raw, %err, "request failed"),
            _ => tracing::debug!(op, ino = raw, code, %err, "request failed"),
        }
        code
    }

    pub fn getattr(&self, raw: u64) -> Result<FileAttr, c_int> {
        let ino = Self::inode(raw)?;
        self.tree.getattr(ino).map_err(|e| Self::fail("getattr", raw, e))
    }

    pub fn lookup(&self, parent: u64, name: &OsStr) -> Result<FileAttr, c_int> {
        let ino = Self::inode(parent)?;
        // Every name in the tree is UTF-8, so anything else cannot match.
        let Some(name) = name.to_str() else {
            return Err(libc::ENOENT);
        };
        tracing::trace!(parent, name, "lookup");
        self.tree
            .lookup(ino, name)
            .map_err(|e| Self::fail("lookup", parent, e))
    }

    /// Directory stream starting after `offset`.
    pub fn readdir(&self, raw: u64, offset: i64) -> Result<Vec<ListingRow>, c_int> {
        let ino = Self::inode(raw)?;
        let entries = self
            .tree
            .readdir(ino)
            .map_err(|e| Self::fail("readdir", raw, e))?;
        let parent = self
            .tree
            .parent(ino)
            .map_err(|e| Self::fail("readdir", raw, e))?;

        let dots = [
            DirEntry::new(".", ino, FileType::Directory, 0),
            DirEntry::new("..", parent, FileType::Directory, 0),
        ];
        let start = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        Ok(dots
            .into_iter()
            .chain(entries)
            .enumerate()
            .skip(start)
            .map(|(idx, entry)| ListingRow {
                ino: entry.ino.get(),
                next_offset: idx as i64 + 1,
                kind: entry.kind,
                name: entry.name,
            })
            .collect())
    }

    pub fn read(&self, raw: u64, offset: i64, size: u32) -> Result<Vec<u8>, c_int> {
        let ino = Self::inode(raw)?;
        tracing::trace!(ino = raw, offset, size, "read");
        self.tree
            .read_checked(ino, offset, i64::from(size))
            .map_err(|e| Self::fail("read", raw, e))
    }

    pub fn open(&self, raw: u64, flags: c_int) -> Result<(), c_int> {
        let ino = Self::inode(raw)?;
        self.tree
            .open(ino, open_flags(flags))
            .map_err(|e| Self::fail("open", raw, e))
    }

    pub fn opendir(&self, raw: u64) -> Result<(), c_int> {
        let ino = Self::inode(raw)?;
        self.tree.opendir(ino).map_err(|e| Self::fail("opendir", raw, e))
    }

    pub fn access(&self, raw: u64, mask: c_int) -> Result<(), c_int> {
        let ino = Self::inode(raw)?;
        self.tree
            .access(ino, access_mask(mask))
            .map_err(|e| Self::fail("access", raw, e))
    }

    pub fn statfs(&self) -> Result<StatFs, c_int> {
        self.tree.statfs().map_err(|e| Self::fail("statfs", 0, e))
    }
}

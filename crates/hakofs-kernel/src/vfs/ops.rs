//! Request façade.
//!
//! [`TreeOps`] is what a protocol bridge calls. Operations are inode-based,
//! the way FUSE addresses nodes, and take explicit offset/size for reads so
//! no handle state is needed.

use super::error::{VfsError, VfsResult};
use super::ids::InodeId;
use super::tree::Tree;
use super::types::{AccessMask, DirEntry, FileAttr, OpenFlags, StatFs};

/// Read-only filesystem operations.
///
/// Implementations must be safe to call from many threads at once.
pub trait TreeOps: Send + Sync {
    // ========================================================================
    // Core
    // ========================================================================

    /// Get attributes of a node.
    fn getattr(&self, ino: InodeId) -> VfsResult<FileAttr>;

    /// Resolve `name` under directory `parent`, returning the child's
    /// attributes.
    fn lookup(&self, parent: InodeId, name: &str) -> VfsResult<FileAttr>;

    /// List every child of a directory (no pagination, no `.`/`..`).
    fn readdir(&self, ino: InodeId) -> VfsResult<Vec<DirEntry>>;

    /// Read up to `size` bytes at `offset`.
    ///
    /// Returns fewer bytes near the end and nothing at or past it.
    fn read(&self, ino: InodeId, offset: u64, size: u32) -> VfsResult<Vec<u8>>;

    // ========================================================================
    // Bridge support
    // ========================================================================

    /// Parent directory. The root is its own parent.
    fn parent(&self, ino: InodeId) -> VfsResult<InodeId>;

    /// Validate an open of a file.
    fn open(&self, ino: InodeId, flags: OpenFlags) -> VfsResult<()>;

    /// Validate an open of a directory.
    fn opendir(&self, ino: InodeId) -> VfsResult<()>;

    /// `access(2)` check. Only write access is ever refused.
    fn access(&self, ino: InodeId, mask: AccessMask) -> VfsResult<()>;

    /// Filesystem statistics.
    fn statfs(&self) -> VfsResult<StatFs>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Read with offsets as the kernel hands them over.
    ///
    /// Negative values are rejected with `InvalidRange` before any node is
    /// touched.
    fn read_checked(&self, ino: InodeId, offset: i64, size: i64) -> VfsResult<Vec<u8>> {
        if offset < 0 || size < 0 {
            return Err(VfsError::InvalidRange {
                offset,
                length: size,
            });
        }
        let size = u32::try_from(size).unwrap_or(u32::MAX);
        self.read(ino, offset as u64, size)
    }

    /// Walk `/`-separated components from the root. Empty components are
    /// skipped, so `""` and `"/"` both name the root.
    fn resolve(&self, path: &str) -> VfsResult<InodeId> {
        let mut current = InodeId::ROOT;
        for component in path.split('/').filter(|c| !c.is_empty()) {
            current = self.lookup(current, component)?.ino;
        }
        Ok(current)
    }

    /// Check if a node exists.
    fn exists(&self, ino: InodeId) -> bool {
        self.getattr(ino).is_ok()
    }

    /// Read an entire file.
    fn read_all(&self, ino: InodeId) -> VfsResult<Vec<u8>> {
        let attr = self.getattr(ino)?;
        if attr.is_dir() {
            return Err(VfsError::is_a_directory(format!("inode {ino}")));
        }
        let mut out = Vec::with_capacity(attr.size as usize);
        let mut offset = 0u64;
        while offset < attr.size {
            let chunk = self.read(ino, offset, u32::MAX)?;
            if chunk.is_empty() {
                break;
            }
            offset += chunk.len() as u64;
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }
}

impl TreeOps for Tree {
    fn getattr(&self, ino: InodeId) -> VfsResult<FileAttr> {
        Ok(self.node(ino)?.attributes())
    }

    fn lookup(&self, parent: InodeId, name: &str) -> VfsResult<FileAttr> {
        let child = self.node(parent)?.as_dir()?.lookup(name)?;
        self.getattr(child)
    }

    fn readdir(&self, ino: InodeId) -> VfsResult<Vec<DirEntry>> {
        Ok(self.node(ino)?.as_dir()?.list_children())
    }

    fn read(&self, ino: InodeId, offset: u64, size: u32) -> VfsResult<Vec<u8>> {
        let file = self.node(ino)?.as_file()?;
        Ok(file.read(offset, u64::from(size)).to_vec())
    }

    fn parent(&self, ino: InodeId) -> VfsResult<InodeId> {
        Ok(self.node(ino)?.parent())
    }

    fn open(&self, ino: InodeId, flags: OpenFlags) -> VfsResult<()> {
        self.node(ino)?.as_file()?;
        if flags.mutates() {
            return Err(VfsError::ReadOnly);
        }
        Ok(())
    }

    fn opendir(&self, ino: InodeId) -> VfsResult<()> {
        self.node(ino)?.as_dir()?;
        Ok(())
    }

    fn access(&self, ino: InodeId, mask: AccessMask) -> VfsResult<()> {
        self.node(ino)?;
        if mask.write {
            return Err(VfsError::ReadOnly);
        }
        Ok(())
    }

    fn statfs(&self) -> VfsResult<StatFs> {
        Ok(StatFs::read_only(
            self.content_bytes(),
            self.node_count() as u64,
        ))
    }
}

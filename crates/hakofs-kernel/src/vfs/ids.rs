//! Inode identifiers.
//!
//! Every node gets an [`InodeId`] when the builder creates it. Ids are handed
//! out in increasing order by [`InodeAllocator`] and never change or get reused
//! while the tree is alive, which is what the kernel's inode cache assumes.
//! `1` is reserved for the root.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable inode number.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InodeId(u64);

impl InodeId {
    /// The root directory.
    pub const ROOT: InodeId = InodeId(1);

    /// Wrap a raw inode number coming from the bridge.
    ///
    /// Returns `None` for `0`, which FUSE never uses for a live node.
    pub fn new(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// The raw inode number.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns true if this is the root directory.
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    /// Position of this node in the tree's registry, or `None` if the
    /// number does not fit the platform's address space.
    pub(crate) fn slot(self) -> Option<usize> {
        usize::try_from(self.0 - 1).ok()
    }
}

impl From<InodeId> for u64 {
    fn from(id: InodeId) -> u64 {
        id.0
    }
}

impl fmt::Display for InodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for InodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InodeId({})", self.0)
    }
}

/// Monotonic inode allocator.
///
/// Starts just above [`InodeId::ROOT`]. Exhaustion is an error rather than a
/// wrap, so a collision can never be produced silently.
#[derive(Debug)]
pub struct InodeAllocator {
    next: Option<u64>,
}

impl Default for InodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeAllocator {
    /// Create an allocator whose first id is `2`.
    pub fn new() -> Self {
        Self::starting_at(InodeId::ROOT.get() + 1)
    }

    /// Create an allocator whose first id is `first`.
    pub(crate) fn starting_at(first: u64) -> Self {
        Self { next: Some(first) }
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> super::VfsResult<InodeId> {
        let id = self.next.ok_or(super::VfsError::IdentifiersExhausted)?;
        self.next = id.checked_add(1);
        Ok(InodeId(id))
    }

    /// Number of the id the next call will hand out, if any remain.
    pub fn peek(&self) -> Option<u64> {
        self.next
    }
}

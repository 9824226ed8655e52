//! Read-only, in-memory virtual filesystem.
//!
//! Key components:
//!
//! - [`InodeId`] / [`InodeAllocator`] - Stable node identity
//! - [`FileNode`] / [`DirNode`] - The two node kinds
//! - [`TreeBuilder`] - Builds the tree once, before serving
//! - [`Tree`] - The built tree and its inode registry
//! - [`TreeOps`] - Request façade called by the protocol bridge
//! - [`TreeManifest`] - TOML description of a tree
//!
//! ## Design Decisions
//!
//! - **Inode-based**: Requests address nodes by inode number, the way FUSE
//!   does. Path resolution is layered on top via [`TreeOps::resolve`].
//! - **Arena registry**: Nodes live in one vector indexed by inode, and
//!   directories hold child inodes, so ownership stays tree-shaped and the
//!   parent link is a plain id.
//! - **Immutable after build**: A built [`Tree`] has no interior mutability,
//!   so it is shared across request threads with no locks.

mod error;
mod ids;
mod manifest;
mod node;
mod ops;
mod tree;
mod types;

pub use error::{VfsError, VfsResult};
pub use ids::{InodeAllocator, InodeId};
pub use manifest::{ManifestEntry, TreeManifest};
pub use node::{DirNode, FileNode, Node};
pub use ops::TreeOps;
pub use tree::{Tree, TreeBuilder, validate_name};
pub use types::{
    AccessMask, BLOCK_SIZE, DEFAULT_DIR_PERM, DEFAULT_FILE_PERM, DirEntry, FileAttr, FileType,
    MAX_NAME_LEN, OpenFlags, Owner, StatFs,
};

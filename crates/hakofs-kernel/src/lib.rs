//! # hakofs-kernel
//!
//! Core of hakofs: an in-memory, read-only filesystem tree meant to be
//! served through a FUSE bridge.
//!
//! The tree is built once with [`TreeBuilder`] (or from a [`TreeManifest`]),
//! then frozen into a [`Tree`]. A bridge answers kernel requests through the
//! [`TreeOps`] façade: attributes, name lookup, directory listing and ranged
//! reads, all by inode number.
//!
//! ```
//! use hakofs_kernel::{InodeId, TreeBuilder, TreeOps};
//!
//! let mut builder = TreeBuilder::new();
//! builder.add_file(builder.root(), "hello.txt", "Hello world").unwrap();
//! let tree = builder.build();
//!
//! let hello = tree.lookup(InodeId::ROOT, "hello.txt").unwrap();
//! assert_eq!(tree.read(hello.ino, 0, 5).unwrap(), b"Hello");
//! ```

pub mod vfs;

pub use vfs::{
    AccessMask, BLOCK_SIZE, DirEntry, DirNode, FileAttr, FileNode, FileType, InodeId,
    ManifestEntry, Node, OpenFlags, Owner, StatFs, Tree, TreeBuilder, TreeManifest, TreeOps,
    VfsError, VfsResult,
};

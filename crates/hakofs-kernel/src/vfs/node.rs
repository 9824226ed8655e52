//! Tree nodes.
//!
//! A node is either a [`FileNode`] or a [`DirNode`]. Both answer
//! `attributes()`; reads only exist on files and lookups/listings only on
//! directories, so asking a file for its children is a type error rather
//! than a runtime branch.

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::SystemTime;

use super::error::{VfsError, VfsResult};
use super::ids::InodeId;
use super::types::{DirEntry, FileAttr, FileType, Owner};

/// Fields shared by every node. Fixed at creation.
#[derive(Debug, Clone)]
pub(crate) struct NodeMeta {
    pub(crate) ino: InodeId,
    pub(crate) parent: InodeId,
    pub(crate) perm: u32,
    pub(crate) owner: Owner,
    pub(crate) mtime: SystemTime,
}

/// A regular file with immutable content.
#[derive(Debug, Clone)]
pub struct FileNode {
    meta: NodeMeta,
    content: Arc<[u8]>,
}

impl FileNode {
    pub(crate) fn new(meta: NodeMeta, content: Arc<[u8]>) -> Self {
        Self { meta, content }
    }

    /// Inode number.
    pub fn ino(&self) -> InodeId {
        self.meta.ino
    }

    /// Size in bytes; always the content length.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Attribute record.
    pub fn attributes(&self) -> FileAttr {
        FileAttr::file(
            self.meta.ino,
            self.size(),
            self.meta.perm,
            self.meta.owner,
            self.meta.mtime,
        )
    }

    /// Read up to `max_len` bytes starting at `offset`.
    ///
    /// Reading at or past the end returns an empty slice. Never returns
    /// bytes outside the content.
    pub fn read(&self, offset: u64, max_len: u64) -> &[u8] {
        let len = self.content.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= len {
            return &[];
        }
        let want = usize::try_from(max_len).unwrap_or(usize::MAX);
        let end = start.saturating_add(want).min(len);
        &self.content[start..end]
    }
}

/// What a directory remembers about each child.
#[derive(Debug, Clone, Copy)]
struct ChildRef {
    ino: InodeId,
    kind: FileType,
    perm: u32,
}

/// A directory: named, insertion-ordered child references.
#[derive(Debug, Clone)]
pub struct DirNode {
    meta: NodeMeta,
    children: IndexMap<String, ChildRef>,
    subdirs: u32,
}

impl DirNode {
    pub(crate) fn new(meta: NodeMeta) -> Self {
        Self {
            meta,
            children: IndexMap::new(),
            subdirs: 0,
        }
    }

    /// Inode number.
    pub fn ino(&self) -> InodeId {
        self.meta.ino
    }

    /// Attribute record.
    pub fn attributes(&self) -> FileAttr {
        FileAttr::directory(
            self.meta.ino,
            self.meta.perm,
            self.subdirs,
            self.meta.owner,
            self.meta.mtime,
        )
    }

    /// Resolve `name` to a child. Exact match, no `.`/`..` handling.
    pub fn lookup(&self, name: &str) -> VfsResult<InodeId> {
        self.children
            .get(name)
            .map(|child| child.ino)
            .ok_or_else(|| VfsError::not_found(name))
    }

    /// Every child exactly once, in insertion order.
    pub fn list_children(&self) -> Vec<DirEntry> {
        self.children
            .iter()
            .map(|(name, child)| DirEntry::new(name.clone(), child.ino, child.kind, child.perm))
            .collect()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if `name` is already taken.
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Attach a child. Only the tree builder calls this.
    pub(crate) fn attach(
        &mut self,
        name: String,
        ino: InodeId,
        kind: FileType,
        perm: u32,
    ) -> VfsResult<()> {
        if self.children.contains_key(&name) {
            return Err(VfsError::DuplicateName {
                parent: self.meta.ino,
                name,
            });
        }
        if kind.is_dir() {
            self.subdirs = self.subdirs.saturating_add(1);
        }
        self.children.insert(name, ChildRef { ino, kind, perm });
        Ok(())
    }
}

/// A tree entry.
#[derive(Debug, Clone)]
pub enum Node {
    File(FileNode),
    Directory(DirNode),
}

impl Node {
    pub(crate) fn meta(&self) -> &NodeMeta {
        match self {
            Node::File(file) => &file.meta,
            Node::Directory(dir) => &dir.meta,
        }
    }

    pub(crate) fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            Node::File(file) => &mut file.meta,
            Node::Directory(dir) => &mut dir.meta,
        }
    }

    /// Inode number.
    pub fn ino(&self) -> InodeId {
        self.meta().ino
    }

    /// Parent inode. The root is its own parent.
    pub fn parent(&self) -> InodeId {
        self.meta().parent
    }

    /// Node kind.
    pub fn kind(&self) -> FileType {
        match self {
            Node::File(_) => FileType::File,
            Node::Directory(_) => FileType::Directory,
        }
    }

    /// Attribute record.
    pub fn attributes(&self) -> FileAttr {
        match self {
            Node::File(file) => file.attributes(),
            Node::Directory(dir) => dir.attributes(),
        }
    }

    /// The file, or `IsADirectory`.
    pub fn as_file(&self) -> VfsResult<&FileNode> {
        match self {
            Node::File(file) => Ok(file),
            Node::Directory(dir) => Err(VfsError::is_a_directory(format!("inode {}", dir.ino()))),
        }
    }

    /// The directory, or `NotADirectory`.
    pub fn as_dir(&self) -> VfsResult<&DirNode> {
        match self {
            Node::Directory(dir) => Ok(dir),
            Node::File(file) => Err(VfsError::not_a_directory(format!("inode {}", file.ino()))),
        }
    }

    pub(crate) fn as_dir_mut(&mut self) -> VfsResult<&mut DirNode> {
        match self {
            Node::Directory(dir) => Ok(dir),
            Node::File(file) => Err(VfsError::not_a_directory(format!("inode {}", file.ino()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(ino: u64) -> NodeMeta {
        NodeMeta {
            ino: InodeId::new(ino).unwrap(),
            parent: InodeId::ROOT,
            perm: 0o644,
            owner: Owner::default(),
            mtime: SystemTime::UNIX_EPOCH,
        }
    }

    fn file(content: &[u8]) -> FileNode {
        FileNode::new(meta(2), Arc::from(content))
    }

    #[test]
    fn test_read_within_bounds() {
        let f = file(b"Hello world");
        assert_eq!(f.read(0, 5), b"Hello");
        assert_eq!(f.read(6, 5), b"world");
        assert_eq!(f.read(0, 11), b"Hello world");
    }

    #[test]
    fn test_read_clamps_to_end() {
        let f = file(b"Hello world");
        assert_eq!(f.read(6, 100), b"world");
        assert_eq!(f.read(10, u64::MAX), b"d");
    }

    #[test]
    fn test_read_past_end_is_empty() {
        let f = file(b"Hello world");
        assert!(f.read(11, 5).is_empty());
        assert!(f.read(12, 0).is_empty());
        assert!(f.read(u64::MAX, u64::MAX).is_empty());
    }

    #[test]
    fn test_read_zero_length() {
        let f = file(b"abc");
        assert!(f.read(1, 0).is_empty());
    }

    #[test]
    fn test_empty_file() {
        let f = file(b"");
        assert_eq!(f.size(), 0);
        assert!(f.read(0, 10).is_empty());
    }

    #[test]
    fn test_every_range_matches_slice() {
        let content = b"1.learn systems programming";
        let f = file(content);
        let len = content.len() as u64;
        for offset in 0..=len + 2 {
            for max_len in 0..=len + 2 {
                let expected: &[u8] = if offset >= len {
                    &[]
                } else {
                    let end = (offset + max_len).min(len);
                    &content[offset as usize..end as usize]
                };
                assert_eq!(f.read(offset, max_len), expected, "offset {offset} len {max_len}");
            }
        }
    }

    #[test]
    fn test_file_attributes_are_stable() {
        let f = file(b"Hello world");
        let a = f.attributes();
        assert_eq!(a, f.attributes());
        assert_eq!(a.size, 11);
        assert_eq!(a.mode(), 0o100644);
    }

    #[test]
    fn test_directory_attach_and_lookup() {
        let mut dir = DirNode::new(NodeMeta { perm: 0o755, ..meta(1) });
        let child = InodeId::new(2).unwrap();
        dir.attach("hello.txt".into(), child, FileType::File, 0o644).unwrap();

        assert_eq!(dir.lookup("hello.txt").unwrap(), child);
        assert_eq!(dir.lookup("hello.txt").unwrap(), child);
        assert!(matches!(dir.lookup("Hello.txt"), Err(VfsError::NotFound(_))));
        assert!(matches!(dir.lookup("."), Err(VfsError::NotFound(_))));
    }

    #[test]
    fn test_directory_rejects_duplicates() {
        let mut dir = DirNode::new(meta(1));
        let a = InodeId::new(2).unwrap();
        let b = InodeId::new(3).unwrap();
        dir.attach("notes".into(), a, FileType::Directory, 0o755).unwrap();
        let err = dir.attach("notes".into(), b, FileType::File, 0o644).unwrap_err();
        assert!(matches!(err, VfsError::DuplicateName { .. }));
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.lookup("notes").unwrap(), a);
    }

    #[test]
    fn test_listing_keeps_insertion_order() {
        let mut dir = DirNode::new(meta(1));
        for (i, name) in ["c", "a", "b"].iter().enumerate() {
            let ino = InodeId::new(i as u64 + 2).unwrap();
            dir.attach(name.to_string(), ino, FileType::File, 0o644).unwrap();
        }
        let names: Vec<_> = dir.list_children().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_nlink_counts_subdirectories() {
        let mut dir = DirNode::new(meta(1));
        dir.attach("a".into(), InodeId::new(2).unwrap(), FileType::Directory, 0o755)
            .unwrap();
        dir.attach("b".into(), InodeId::new(3).unwrap(), FileType::File, 0o644)
            .unwrap();
        assert_eq!(dir.attributes().nlink, 3);
    }

    #[test]
    fn test_kind_specific_access() {
        let node = Node::File(file(b"x"));
        assert!(node.as_file().is_ok());
        assert!(matches!(node.as_dir(), Err(VfsError::NotADirectory(_))));

        let node = Node::Directory(DirNode::new(meta(1)));
        assert!(matches!(node.as_file(), Err(VfsError::IsADirectory(_))));
        assert_eq!(node.kind(), FileType::Directory);
    }
}

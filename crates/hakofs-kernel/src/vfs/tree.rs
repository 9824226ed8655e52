//! Tree construction and the built tree.
//!
//! [`TreeBuilder`] is the only place nodes are created. Each insertion
//! allocates an inode, attaches the child to its parent and registers it by
//! inode in one step, so the parent map and the inode registry cannot drift
//! apart. [`TreeBuilder::build`] hands back an immutable [`Tree`] that can be
//! shared across request threads without locking.

use std::sync::Arc;
use std::time::SystemTime;

use super::error::{VfsError, VfsResult};
use super::ids::{InodeAllocator, InodeId};
use super::node::{DirNode, FileNode, Node, NodeMeta};
use super::types::{DEFAULT_DIR_PERM, DEFAULT_FILE_PERM, FileAttr, FileType, MAX_NAME_LEN, Owner};

/// Check that `name` can be used as a single directory entry.
pub fn validate_name(name: &str) -> VfsResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.len() > MAX_NAME_LEN
        || name.contains(['/', '\0'])
    {
        return Err(VfsError::invalid_name(name));
    }
    Ok(())
}

/// Registry index of the root directory.
const ROOT_SLOT: usize = 0;

fn validate_perm(perm: u32) -> VfsResult<()> {
    if perm & !0o7777 != 0 {
        return Err(VfsError::InvalidMode(perm));
    }
    Ok(())
}

/// Builds a [`Tree`].
#[derive(Debug)]
pub struct TreeBuilder {
    ids: InodeAllocator,
    /// Registry: node with inode `n` lives at index `n - 1`.
    nodes: Vec<Node>,
    content_bytes: u64,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Start a tree containing only the root directory.
    pub fn new() -> Self {
        let root = DirNode::new(NodeMeta {
            ino: InodeId::ROOT,
            parent: InodeId::ROOT,
            perm: DEFAULT_DIR_PERM,
            owner: Owner::default(),
            mtime: SystemTime::now(),
        });
        Self {
            ids: InodeAllocator::new(),
            nodes: vec![Node::Directory(root)],
            content_bytes: 0,
        }
    }

    /// Report `owner` for every node, including ones already added.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        for node in &mut self.nodes {
            node.meta_mut().owner = owner;
        }
        self
    }

    /// Stamp every node with `mtime` instead of the builder's creation time.
    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        for node in &mut self.nodes {
            node.meta_mut().mtime = mtime;
        }
        self
    }

    /// Change the root directory's permissions.
    pub fn set_root_perm(&mut self, perm: u32) -> VfsResult<()> {
        validate_perm(perm)?;
        self.nodes[ROOT_SLOT].meta_mut().perm = perm;
        Ok(())
    }

    /// The root directory.
    pub fn root(&self) -> InodeId {
        InodeId::ROOT
    }

    /// Number of nodes registered so far, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a `0644` file under `parent`.
    pub fn add_file(
        &mut self,
        parent: InodeId,
        name: &str,
        content: impl Into<Vec<u8>>,
    ) -> VfsResult<InodeId> {
        self.add_file_with_perm(parent, name, content, DEFAULT_FILE_PERM)
    }

    /// Add a file with explicit permissions under `parent`.
    pub fn add_file_with_perm(
        &mut self,
        parent: InodeId,
        name: &str,
        content: impl Into<Vec<u8>>,
        perm: u32,
    ) -> VfsResult<InodeId> {
        let content: Arc<[u8]> = Arc::from(content.into());
        let size = content.len() as u64;
        let ino = self.insert(parent, name, FileType::File, perm, |meta| {
            Node::File(FileNode::new(meta, content))
        })?;
        self.content_bytes = self.content_bytes.saturating_add(size);
        Ok(ino)
    }

    /// Add a `0755` directory under `parent`.
    pub fn add_dir(&mut self, parent: InodeId, name: &str) -> VfsResult<InodeId> {
        self.add_dir_with_perm(parent, name, DEFAULT_DIR_PERM)
    }

    /// Add a directory with explicit permissions under `parent`.
    pub fn add_dir_with_perm(
        &mut self,
        parent: InodeId,
        name: &str,
        perm: u32,
    ) -> VfsResult<InodeId> {
        self.insert(parent, name, FileType::Directory, perm, |meta| {
            Node::Directory(DirNode::new(meta))
        })
    }

    fn insert(
        &mut self,
        parent: InodeId,
        name: &str,
        kind: FileType,
        perm: u32,
        make: impl FnOnce(NodeMeta) -> Node,
    ) -> VfsResult<InodeId> {
        validate_name(name)?;
        validate_perm(perm)?;

        let parent_slot = parent
            .slot()
            .filter(|&slot| slot < self.nodes.len())
            .ok_or_else(|| VfsError::not_found(format!("inode {parent}")))?;
        let parent_node = &self.nodes[parent_slot];
        let parent_dir = parent_node.as_dir()?;
        if parent_dir.contains(name) {
            return Err(VfsError::DuplicateName {
                parent,
                name: name.to_string(),
            });
        }
        let (owner, mtime) = {
            let meta = parent_node.meta();
            (meta.owner, meta.mtime)
        };

        let ino = self.ids.next_id()?;
        if ino.slot() != Some(self.nodes.len()) {
            return Err(VfsError::IdentifierCollision(ino));
        }

        self.nodes[parent_slot]
            .as_dir_mut()?
            .attach(name.to_string(), ino, kind, perm)?;
        self.nodes.push(make(NodeMeta {
            ino,
            parent,
            perm,
            owner,
            mtime,
        }));

        tracing::debug!(%ino, %parent, name, ?kind, "registered node");
        Ok(ino)
    }

    /// Finish construction.
    pub fn build(self) -> Tree {
        tracing::info!(
            nodes = self.nodes.len(),
            bytes = self.content_bytes,
            "tree built"
        );
        Tree {
            nodes: self.nodes,
            content_bytes: self.content_bytes,
        }
    }
}

/// An immutable, fully built tree.
///
/// `Tree` is the inode registry: every node is addressable by its
/// [`InodeId`] for the lifetime of the tree.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    content_bytes: u64,
}

impl Tree {
    /// Start building a tree.
    pub fn builder() -> TreeBuilder {
        TreeBuilder::new()
    }

    /// Look up a node by inode.
    pub fn node(&self, ino: InodeId) -> VfsResult<&Node> {
        ino.slot()
            .and_then(|slot| self.nodes.get(slot))
            .ok_or_else(|| VfsError::not_found(format!("inode {ino}")))
    }

    /// The root directory.
    pub fn root(&self) -> &DirNode {
        match &self.nodes[ROOT_SLOT] {
            Node::Directory(dir) => dir,
            Node::File(_) => unreachable!("root is always a directory"),
        }
    }

    /// Total nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total bytes of file content.
    pub fn content_bytes(&self) -> u64 {
        self.content_bytes
    }

    /// Every node with its absolute path, depth first, children in listing
    /// order. The root is `/`.
    pub fn walk(&self) -> Vec<(String, FileAttr)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(InodeId::ROOT, String::from("/"))];
        while let Some((ino, path)) = stack.pop() {
            let Ok(node) = self.node(ino) else {
                continue;
            };
            out.push((path.clone(), node.attributes()));
            if let Node::Directory(dir) = node {
                for entry in dir.list_children().into_iter().rev() {
                    let child_path = if path == "/" {
                        format!("/{}", entry.name)
                    } else {
                        format!("{}/{}", path, entry.name)
                    };
                    stack.push((entry.ino, child_path));
                }
            }
        }
        out
    }
}

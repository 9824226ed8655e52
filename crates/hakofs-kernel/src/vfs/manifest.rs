//! Declarative tree manifests.
//!
//! A manifest is a TOML document describing what to build:
//!
//! ```toml
//! root_mode = 0o755
//!
//! [[entry]]
//! type = "file"
//! name = "hello.txt"
//! content = "Hello world"
//!
//! [[entry]]
//! type = "dir"
//! name = "notes"
//!
//! [[entry.entries]]
//! type = "file"
//! name = "todo.txt"
//! source = "todo.txt"   # loaded at build time, relative to the manifest
//! mode = 0o600
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::{VfsError, VfsResult};
use super::ids::InodeId;
use super::tree::{Tree, TreeBuilder};
use super::types::{DEFAULT_DIR_PERM, DEFAULT_FILE_PERM, Owner};

/// One entry in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ManifestEntry {
    /// A regular file. Exactly one of `content` and `source` must be set.
    File {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<u32>,
    },
    /// A directory.
    Dir {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<u32>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        entries: Vec<ManifestEntry>,
    },
}

impl ManifestEntry {
    /// A file with inline text content.
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::File {
            name: name.into(),
            content: Some(content.into()),
            source: None,
            mode: None,
        }
    }

    /// A directory with the given children.
    pub fn dir(name: impl Into<String>, entries: Vec<ManifestEntry>) -> Self {
        Self::Dir {
            name: name.into(),
            mode: None,
            entries,
        }
    }

    /// Entry name.
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Dir { name, .. } => name,
        }
    }
}

/// A whole tree description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeManifest {
    /// Root directory permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_mode: Option<u32>,

    /// Children of the root.
    #[serde(default, rename = "entry", skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<ManifestEntry>,

    /// Directory `source` paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl TreeManifest {
    /// The built-in sample tree: `/hello.txt` and `/notes/todo.txt`.
    pub fn demo() -> Self {
        Self {
            root_mode: None,
            entries: vec![
                ManifestEntry::file("hello.txt", "Hello world"),
                ManifestEntry::dir(
                    "notes",
                    vec![ManifestEntry::file("todo.txt", "1.learn systems programming")],
                ),
            ],
            base_dir: None,
        }
    }

    /// Parse a manifest from TOML text.
    pub fn parse(text: &str) -> VfsResult<Self> {
        toml::from_str(text).map_err(|e| VfsError::manifest(e.to_string()))
    }

    /// Load a manifest file. `source` paths resolve relative to its directory.
    pub fn load(path: &Path) -> VfsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut manifest = Self::parse(&text)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!(path = %path.display(), entries = manifest.entries.len(), "loaded manifest");
        Ok(manifest)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> VfsResult<String> {
        toml::to_string(self).map_err(|e| VfsError::manifest(e.to_string()))
    }

    /// Build a tree owned by `Owner::default()`.
    pub fn build(&self) -> VfsResult<Tree> {
        self.build_with(TreeBuilder::new())
    }

    /// Build a tree owned by `owner`.
    pub fn build_for(&self, owner: Owner) -> VfsResult<Tree> {
        self.build_with(TreeBuilder::new().with_owner(owner))
    }

    fn build_with(&self, mut builder: TreeBuilder) -> VfsResult<Tree> {
        if let Some(mode) = self.root_mode {
            builder.set_root_perm(mode)?;
        }
        let root = builder.root();
        for entry in &self.entries {
            self.add_entry(&mut builder, root, entry)?;
        }
        Ok(builder.build())
    }

    fn add_entry(
        &self,
        builder: &mut TreeBuilder,
        parent: InodeId,
        entry: &ManifestEntry,
    ) -> VfsResult<()> {
        match entry {
            ManifestEntry::File {
                name,
                content,
                source,
                mode,
            } => {
                let bytes = match (content, source) {
                    (Some(text), None) => text.clone().into_bytes(),
                    (None, Some(source)) => self.read_source(source)?,
                    (Some(_), Some(_)) => {
                        return Err(VfsError::manifest(format!(
                            "{name}: set either content or source, not both"
                        )));
                    }
                    (None, None) => Vec::new(),
                };
                builder.add_file_with_perm(parent, name, bytes, mode.unwrap_or(DEFAULT_FILE_PERM))?;
            }
            ManifestEntry::Dir {
                name,
                mode,
                entries,
            } => {
                let dir = builder.add_dir_with_perm(parent, name, mode.unwrap_or(DEFAULT_DIR_PERM))?;
                for child in entries {
                    self.add_entry(builder, dir, child)?;
                }
            }
        }
        Ok(())
    }

    fn read_source(&self, source: &Path) -> VfsResult<Vec<u8>> {
        let path = match &self.base_dir {
            Some(base) if source.is_relative() => base.join(source),
            _ => source.to_path_buf(),
        };
        std::fs::read(&path).map_err(|e| {
            VfsError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })
    }
}

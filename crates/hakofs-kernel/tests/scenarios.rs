//! End-to-end tests against the request façade.
//!
//! Each test builds a tree the way the server does at startup and then drives
//! it only through [`TreeOps`], as the FUSE bridge would.

use std::collections::HashSet;
use std::sync::Arc;

use hakofs_kernel::{
    BLOCK_SIZE, FileType, InodeId, Tree, TreeBuilder, TreeManifest, TreeOps, VfsError,
};

// ============================================================================
// Shared setup
// ============================================================================

fn reference_tree() -> Tree {
    let mut b = TreeBuilder::new();
    b.add_file(b.root(), "hello.txt", "Hello world").unwrap();
    let notes = b.add_dir(b.root(), "notes").unwrap();
    b.add_file(notes, "todo.txt", "1.learn systems programming").unwrap();
    b.build()
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn hello_file_ranged_reads() {
    let tree = reference_tree();
    let hello = tree.lookup(InodeId::ROOT, "hello.txt").unwrap();
    assert_eq!(hello.kind, FileType::File);
    assert_eq!(hello.size, 11);

    assert_eq!(tree.read(hello.ino, 0, 5).unwrap(), b"Hello");
    assert!(tree.read(hello.ino, 11, 5).unwrap().is_empty());
    assert!(tree.read(hello.ino, 400, 5).unwrap().is_empty());
}

#[test]
fn nested_directory_lookup_and_full_read() {
    let tree = reference_tree();
    let notes = tree.lookup(InodeId::ROOT, "notes").unwrap();
    assert!(notes.is_dir());
    assert_eq!(notes.mode(), 0o040755);

    let todo = tree.lookup(notes.ino, "todo.txt").unwrap();
    assert!(todo.is_file());
    assert_eq!(todo.mode(), 0o100644);

    let content = tree.read(todo.ino, 0, todo.size as u32).unwrap();
    assert_eq!(content, b"1.learn systems programming");
    assert_eq!(content.len() as u64, todo.size);
}

#[test]
fn missing_name_is_not_found() {
    let tree = reference_tree();
    for _ in 0..3 {
        assert!(matches!(
            tree.lookup(InodeId::ROOT, "missing.txt"),
            Err(VfsError::NotFound(_))
        ));
    }
}

#[test]
fn root_listing_has_both_children_once() {
    let tree = reference_tree();
    let entries = tree.readdir(InodeId::ROOT).unwrap();
    assert_eq!(entries.len(), 2);

    let hello = entries.iter().filter(|e| e.name == "hello.txt").collect::<Vec<_>>();
    let notes = entries.iter().filter(|e| e.name == "notes").collect::<Vec<_>>();
    assert_eq!(hello.len(), 1);
    assert_eq!(notes.len(), 1);
    assert_eq!(hello[0].kind, FileType::File);
    assert_eq!(notes[0].kind, FileType::Directory);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn lookup_is_idempotent_and_attributes_stable() {
    let tree = reference_tree();
    let first = tree.lookup(InodeId::ROOT, "notes").unwrap();
    for _ in 0..10 {
        let again = tree.lookup(InodeId::ROOT, "notes").unwrap();
        assert_eq!(again, first);
        assert_eq!(tree.getattr(first.ino).unwrap(), first);
    }
}

#[test]
fn identifiers_are_unique_across_the_tree() {
    let mut b = TreeBuilder::new();
    let mut parent = b.root();
    for depth in 0..5 {
        for i in 0..5 {
            b.add_file(parent, &format!("f{depth}-{i}"), vec![i as u8; i]).unwrap();
        }
        parent = b.add_dir(parent, &format!("d{depth}")).unwrap();
    }
    let tree = b.build();

    let walked = tree.walk();
    assert_eq!(walked.len(), tree.node_count());
    let ids: HashSet<_> = walked.iter().map(|(_, attr)| attr.ino).collect();
    assert_eq!(ids.len(), walked.len());
    for (path, attr) in &walked {
        assert_eq!(tree.resolve(path).unwrap(), attr.ino, "{path}");
    }
}

#[test]
fn listing_and_lookup_agree_under_concurrency() {
    let mut b = TreeBuilder::new();
    for name in ["a", "b", "c"] {
        b.add_file(b.root(), name, name).unwrap();
    }
    let tree = Arc::new(b.build());

    std::thread::scope(|s| {
        for t in 0..8 {
            let tree = Arc::clone(&tree);
            s.spawn(move || {
                for i in 0..200 {
                    if (t + i) % 2 == 0 {
                        let mut names: Vec<_> = tree
                            .readdir(InodeId::ROOT)
                            .unwrap()
                            .into_iter()
                            .map(|e| e.name)
                            .collect();
                        names.sort();
                        assert_eq!(names, ["a", "b", "c"]);
                    } else {
                        let attr = tree.lookup(InodeId::ROOT, "b").unwrap();
                        assert_eq!(tree.read(attr.ino, 0, 16).unwrap(), b"b");
                    }
                }
            });
        }
    });
}

#[test]
fn listing_entries_point_at_real_nodes() {
    let tree = reference_tree();
    for entry in tree.readdir(InodeId::ROOT).unwrap() {
        let attr = tree.getattr(entry.ino).unwrap();
        assert_eq!(attr.kind, entry.kind);
        assert_eq!(attr.mode(), entry.mode);
        assert_eq!(tree.parent(entry.ino).unwrap(), InodeId::ROOT);
    }
}

#[test]
fn statfs_reports_a_full_read_only_volume() {
    let tree = reference_tree();
    let stat = tree.statfs().unwrap();
    assert_eq!(stat.bsize, BLOCK_SIZE);
    assert_eq!(stat.frsize, BLOCK_SIZE);
    assert_eq!(stat.blocks, 1);
    assert_eq!(stat.files, 4);
    assert_eq!((stat.bfree, stat.bavail, stat.ffree), (0, 0, 0));
}

// ============================================================================
// Manifests on disk
// ============================================================================

#[test]
fn manifest_sources_resolve_next_to_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("todo.txt"), "1.learn systems programming").unwrap();
    let manifest_path = dir.path().join("tree.toml");
    std::fs::write(
        &manifest_path,
        r#"
[[entry]]
type = "file"
name = "hello.txt"
content = "Hello world"

[[entry]]
type = "dir"
name = "notes"

[[entry.entries]]
type = "file"
name = "todo.txt"
source = "todo.txt"
"#,
    )
    .unwrap();

    let tree = TreeManifest::load(&manifest_path).unwrap().build().unwrap();
    let todo = tree.resolve("/notes/todo.txt").unwrap();
    assert_eq!(tree.read_all(todo).unwrap(), b"1.learn systems programming");

    let demo = TreeManifest::demo().build().unwrap();
    let shape = |t: &Tree| {
        t.walk()
            .into_iter()
            .map(|(path, attr)| (path, attr.ino, attr.kind, attr.size))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&tree), shape(&demo));
}

#[test]
fn missing_source_aborts_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("tree.toml");
    std::fs::write(
        &manifest_path,
        r#"
[[entry]]
type = "file"
name = "gone.txt"
source = "does-not-exist.txt"
"#,
    )
    .unwrap();

    let err = TreeManifest::load(&manifest_path).unwrap().build().unwrap_err();
    assert!(matches!(err, VfsError::Io(_)));
}

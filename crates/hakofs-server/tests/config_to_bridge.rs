//! Startup path without a mount: config file → manifest → tree → bridge.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use hakofs_kernel::{Owner, TreeManifest};
use hakofs_server::{Args, Bridge, ServerConfig};

fn write(dir: &Path, name: &str, text: &str) {
    std::fs::write(dir.join(name), text).unwrap();
}

fn bridge_for(config: &ServerConfig) -> Bridge<hakofs_kernel::Tree> {
    let manifest = TreeManifest::load(config.manifest.as_deref().unwrap()).unwrap();
    Bridge::new(Arc::new(manifest.build_for(config.owner()).unwrap()))
}

#[test]
fn config_file_drives_the_served_tree() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "motd", "welcome\n");
    write(
        dir.path(),
        "tree.toml",
        r#"
root_mode = 0o750

[[entry]]
type = "file"
name = "motd"
source = "motd"
mode = 0o600

[[entry]]
type = "dir"
name = "etc"

[[entry.entries]]
type = "file"
name = "hostname"
content = "hako\n"
"#,
    );
    write(
        dir.path(),
        "hakofs.toml",
        "manifest = \"tree.toml\"\nuid = 4242\ngid = 4343\n",
    );

    let config_path = dir.path().join("hakofs.toml");
    let args = Args::parse_from([
        "hakofs-server",
        "--check",
        "--config",
        config_path.to_str().unwrap(),
    ]);
    let config = ServerConfig::from_args(&args).unwrap();
    let bridge = bridge_for(&config);

    let root = bridge.getattr(1).unwrap();
    assert_eq!(root.perm, 0o750);
    assert_eq!(root.owner, Owner { uid: 4242, gid: 4343 });

    let motd = bridge.lookup(1, OsStr::new("motd")).unwrap();
    assert_eq!(motd.perm, 0o600);
    assert_eq!(bridge.read(motd.ino.get(), 0, 4096).unwrap(), b"welcome\n");

    let etc = bridge.lookup(1, OsStr::new("etc")).unwrap();
    let hostname = bridge.lookup(etc.ino.get(), OsStr::new("hostname")).unwrap();
    assert_eq!(bridge.read(hostname.ino.get(), 2, 100).unwrap(), b"ko\n");

    let names: Vec<_> = bridge
        .readdir(1, 0)
        .unwrap()
        .into_iter()
        .map(|row| row.name)
        .collect();
    assert_eq!(names, [".", "..", "motd", "etc"]);
}

#[test]
fn broken_manifest_fails_before_mounting() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tree.toml",
        r#"
[[entry]]
type = "file"
name = "a"
content = "one"

[[entry]]
type = "file"
name = "a"
content = "two"
"#,
    );
    let manifest = TreeManifest::load(&dir.path().join("tree.toml")).unwrap();
    let err = manifest.build().unwrap_err();
    assert!(err.is_build_error(), "{err}");
}

//! hakofs server binary
//!
//! ## Usage
//!
//! ```bash
//! # Serve the built-in demo tree
//! hakofs-server /mnt/hako
//!
//! # Serve a manifest, keeping the mount private and verbose
//! hakofs-server /mnt/hako --manifest tree.toml --debug --auto-unmount
//!
//! # Build and print the tree without mounting
//! hakofs-server --check --manifest tree.toml
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use hakofs_kernel::{Tree, TreeManifest};
use hakofs_server::{Args, ServerConfig, logging};

fn build_tree(config: &ServerConfig) -> Result<Tree> {
    let manifest = match &config.manifest {
        Some(path) => TreeManifest::load(path)
            .with_context(|| format!("load manifest {}", path.display()))?,
        None => {
            tracing::info!("no manifest given, serving the demo tree");
            TreeManifest::demo()
        }
    };
    manifest
        .build_for(config.owner())
        .context("build filesystem tree")
}

fn print_tree(tree: &Tree) {
    for (path, attr) in tree.walk() {
        println!(
            "{} {:04o} {:>6} {:>8} {}",
            attr.kind.tag(),
            attr.perm,
            attr.ino.get(),
            attr.size,
            path
        );
    }
}

#[cfg(feature = "fuse")]
fn serve(tree: Tree, config: &ServerConfig) -> Result<()> {
    let mountpoint = config
        .mountpoint
        .as_deref()
        .context("no mountpoint configured")?;
    hakofs_server::mount(std::sync::Arc::new(tree), mountpoint, config)
}

#[cfg(not(feature = "fuse"))]
fn serve(_tree: Tree, _config: &ServerConfig) -> Result<()> {
    anyhow::bail!("built without the `fuse` feature; only --check is available")
}

fn run(args: &Args, config: &ServerConfig) -> Result<()> {
    let tree = build_tree(config)?;
    if args.check {
        print_tree(&tree);
        return Ok(());
    }
    serve(tree, config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match ServerConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("hakofs-server: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = logging::init(config.debug, config.log_dir.as_deref());

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

//! Server configuration.
//!
//! Settings come from an optional TOML file (`--config`) and are then
//! overridden by command-line flags.
//!
//! ```toml
//! mountpoint = "/mnt/hakofs"
//! manifest = "tree.toml"
//! fs_name = "hakofs"
//! ttl_secs = 1
//! allow_other = false
//! auto_unmount = true
//! log_dir = "/tmp"
//! uid = 1000
//! gid = 1000
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hakofs_kernel::Owner;

use crate::constants::{DEFAULT_FS_NAME, DEFAULT_TTL};

/// Serve an in-memory, read-only filesystem over FUSE.
#[derive(Parser, Debug, Default)]
#[command(name = "hakofs-server")]
#[command(about = "Mount an in-memory read-only filesystem")]
pub struct Args {
    /// Directory to mount on
    pub mountpoint: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// TOML tree manifest (default: built-in demo tree)
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Filesystem name shown by mount(8)
    #[arg(long)]
    pub fs_name: Option<String>,

    /// Attribute and entry cache TTL in seconds
    #[arg(long)]
    pub ttl_secs: Option<u64>,

    /// Let other users access the mount
    #[arg(long)]
    pub allow_other: bool,

    /// Unmount automatically when the process exits
    #[arg(long)]
    pub auto_unmount: bool,

    /// Verbose protocol logging
    #[arg(short, long)]
    pub debug: bool,

    /// Also write logs to hakofs-server.log in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Owner uid reported for every node (default: current user)
    #[arg(long)]
    pub uid: Option<u32>,

    /// Owner gid reported for every node (default: current group)
    #[arg(long)]
    pub gid: Option<u32>,

    /// Build the tree, print it and exit without mounting
    #[arg(long)]
    pub check: bool,
}

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub mountpoint: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub fs_name: String,
    pub ttl_secs: u64,
    pub allow_other: bool,
    pub auto_unmount: bool,
    pub debug: bool,
    pub log_dir: Option<PathBuf>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mountpoint: None,
            manifest: None,
            fs_name: DEFAULT_FS_NAME.to_string(),
            ttl_secs: DEFAULT_TTL.as_secs(),
            allow_other: false,
            auto_unmount: false,
            debug: false,
            log_dir: None,
            uid: None,
            gid: None,
        }
    }
}

impl ServerConfig {
    /// Parse a config file. Relative `manifest` and `log_dir` paths resolve
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config: Self =
            toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.manifest = config.manifest.map(|p| rebase(base, p));
            config.log_dir = config.log_dir.map(|p| rebase(base, p));
        }
        Ok(config)
    }

    /// Load `--config` if given, then apply the remaining flags on top.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(args);
        config.validate(args.check)?;
        Ok(config)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(mountpoint) = &args.mountpoint {
            self.mountpoint = Some(mountpoint.clone());
        }
        if let Some(manifest) = &args.manifest {
            self.manifest = Some(manifest.clone());
        }
        if let Some(fs_name) = &args.fs_name {
            self.fs_name = fs_name.clone();
        }
        if let Some(ttl) = args.ttl_secs {
            self.ttl_secs = ttl;
        }
        if let Some(log_dir) = &args.log_dir {
            self.log_dir = Some(log_dir.clone());
        }
        if args.uid.is_some() {
            self.uid = args.uid;
        }
        if args.gid.is_some() {
            self.gid = args.gid;
        }
        self.allow_other |= args.allow_other;
        self.auto_unmount |= args.auto_unmount;
        self.debug |= args.debug;
    }

    fn validate(&self, check_only: bool) -> Result<()> {
        if self.fs_name.is_empty() {
            bail!("fs_name must not be empty");
        }
        if !check_only && self.mountpoint.is_none() {
            bail!("no mountpoint given (pass one on the command line or set `mountpoint`)");
        }
        Ok(())
    }

    /// Kernel cache TTL.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Owner to report, falling back to the serving process's ids.
    pub fn owner(&self) -> Owner {
        let uid = self
            .uid
            .unwrap_or_else(|| rustix::process::getuid().as_raw());
        let gid = self
            .gid
            .unwrap_or_else(|| rustix::process::getgid().as_raw());
        Owner { uid, gid }
    }
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}

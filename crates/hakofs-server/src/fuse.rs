//! `fuser` adapter.
//!
//! Each callback forwards to [`Bridge`] and turns the answer into a reply.
//! The tree is immutable, so there are no file handles to track and every
//! open returns handle 0.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fuser::{
    Filesystem, MountOption, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyOpen, ReplyStatfs, Request,
};
use hakofs_kernel::{BLOCK_SIZE, FileAttr, FileType, TreeOps};

use crate::bridge::Bridge;
use crate::config::ServerConfig;
use crate::constants::FS_SUBTYPE;

/// A [`TreeOps`] implementation served to the kernel.
pub struct HakoFs<T: TreeOps> {
    bridge: Bridge<T>,
    ttl: Duration,
}

impl<T: TreeOps> HakoFs<T> {
    pub fn new(tree: Arc<T>, ttl: Duration) -> Self {
        Self {
            bridge: Bridge::new(tree),
            ttl,
        }
    }
}

fn kind(kind: FileType) -> fuser::FileType {
    match kind {
        FileType::File => fuser::FileType::RegularFile,
        FileType::Directory => fuser::FileType::Directory,
    }
}

fn attr(attr: &FileAttr) -> fuser::FileAttr {
    fuser::FileAttr {
        ino: attr.ino.get(),
        size: attr.size,
        blocks: attr.blocks,
        atime: attr.mtime,
        mtime: attr.mtime,
        ctime: attr.mtime,
        crtime: attr.mtime,
        kind: kind(attr.kind),
        // Validated to fit in 0o7777 at build time.
        perm: (attr.perm & 0o7777) as u16,
        nlink: attr.nlink,
        uid: attr.owner.uid,
        gid: attr.owner.gid,
        rdev: 0,
        blksize: BLOCK_SIZE,
        flags: 0,
    }
}

impl<T: TreeOps> Filesystem for HakoFs<T> {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match self.bridge.lookup(parent, name) {
            Ok(a) => reply.entry(&self.ttl, &attr(&a), 0),
            Err(code) => reply.error(code),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        match self.bridge.getattr(ino) {
            Ok(a) => reply.attr(&self.ttl, &attr(&a)),
            Err(code) => reply.error(code),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        match self.bridge.open(ino, flags) {
            Ok(()) => reply.opened(0, 0),
            Err(code) => reply.error(code),
        }
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        match self.bridge.opendir(ino) {
            Ok(()) => reply.opened(0, 0),
            Err(code) => reply.error(code),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        match self.bridge.read(ino, offset, size) {
            Ok(data) => reply.data(&data),
            Err(code) => reply.error(code),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let rows = match self.bridge.readdir(ino, offset) {
            Ok(rows) => rows,
            Err(code) => return reply.error(code),
        };
        for row in rows {
            if reply.add(row.ino, row.next_offset, kind(row.kind), &row.name) {
                break;
            }
        }
        reply.ok();
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn releasedir(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        match self.bridge.statfs() {
            Ok(s) => reply.statfs(
                s.blocks, s.bfree, s.bavail, s.files, s.ffree, s.bsize, s.namelen, s.frsize,
            ),
            Err(code) => reply.error(code),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, mask: i32, reply: ReplyEmpty) {
        match self.bridge.access(ino, mask) {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }
}

/// Mount options for `config`. Always read-only.
pub fn mount_options(config: &ServerConfig) -> Vec<MountOption> {
    let mut options = vec![
        MountOption::FSName(config.fs_name.clone()),
        MountOption::Subtype(FS_SUBTYPE.to_string()),
        MountOption::RO,
        MountOption::DefaultPermissions,
    ];
    if config.allow_other {
        options.push(MountOption::AllowOther);
    }
    if config.auto_unmount {
        options.push(MountOption::AutoUnmount);
    }
    options
}

/// Serve `tree` on `mountpoint` until it is unmounted.
pub fn mount<T: TreeOps + 'static>(
    tree: Arc<T>,
    mountpoint: &Path,
    config: &ServerConfig,
) -> Result<()> {
    let options = mount_options(config);
    tracing::info!(
        mountpoint = %mountpoint.display(),
        fs_name = %config.fs_name,
        ttl_secs = config.ttl_secs,
        "mounting"
    );
    fuser::mount2(HakoFs::new(tree, config.ttl()), mountpoint, &options)
        .with_context(|| format!("mount on {}", mountpoint.display()))?;
    tracing::info!(mountpoint = %mountpoint.display(), "unmounted");
    Ok(())
}

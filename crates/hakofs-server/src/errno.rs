//! Translation between kernel-side integers and VFS types.

use hakofs_kernel::{AccessMask, OpenFlags, VfsError};
use libc::c_int;

/// errno to send back for a failed request.
pub fn errno(err: &VfsError) -> c_int {
    match err {
        VfsError::NotFound(_) => libc::ENOENT,
        VfsError::NotADirectory(_) => libc::ENOTDIR,
        VfsError::IsADirectory(_) => libc::EISDIR,
        VfsError::ReadOnly => libc::EROFS,
        VfsError::InvalidRange { .. } => libc::EINVAL,
        VfsError::InvalidName(_) => libc::EINVAL,
        VfsError::DuplicateName { .. } => libc::EEXIST,
        VfsError::Io(e) => e.raw_os_error().unwrap_or(libc::EIO),
        VfsError::InvalidMode(_)
        | VfsError::IdentifierCollision(_)
        | VfsError::IdentifiersExhausted
        | VfsError::Manifest(_) => libc::EIO,
    }
}

/// Decode `open(2)` flags.
pub fn open_flags(flags: c_int) -> OpenFlags {
    let access = flags & libc::O_ACCMODE;
    OpenFlags {
        read: access == libc::O_RDONLY || access == libc::O_RDWR,
        write: access == libc::O_WRONLY || access == libc::O_RDWR,
        append: flags & libc::O_APPEND != 0,
        truncate: flags & libc::O_TRUNC != 0,
    }
}

/// Decode an `access(2)` mask.
pub fn access_mask(mask: c_int) -> AccessMask {
    AccessMask {
        read: mask & libc::R_OK != 0,
        write: mask & libc::W_OK != 0,
        execute: mask & libc::X_OK != 0,
    }
}

//! Server configuration constants.
//!
//! Centralizes defaults so the CLI help, config file and mount code agree.

use std::time::Duration;

/// Filesystem name shown in `mount` output.
pub const DEFAULT_FS_NAME: &str = "hakofs";

/// FUSE subtype (`fuse.hakofs`).
pub const FS_SUBTYPE: &str = "hakofs";

/// How long the kernel may cache attributes and entries. The tree never
/// changes, so this only bounds how stale a view can be across remounts.
pub const DEFAULT_TTL: Duration = Duration::from_secs(1);

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log filter used with `--debug`.
pub const DEBUG_LOG_FILTER: &str = "hakofs_kernel=debug,hakofs_server=trace,fuser=debug,info";

/// File name for the optional log file.
pub const LOG_FILE_NAME: &str = "hakofs-server.log";

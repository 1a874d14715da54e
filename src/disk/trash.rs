// Recycle bin access

use std::io;
use std::path::Path;

/// Moves a file or a whole directory to a recoverable trash.
pub trait Trash: Send + Sync {
    fn delete(&self, path: &Path) -> io::Result<()>;
}

/// The operating system's own trash (Recycle Bin, freedesktop trash, Finder trash).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn delete(&self, path: &Path) -> io::Result<()> {
        ::trash::delete(path).map_err(into_io_error)
    }
}

// Keep the OS error so the sweep report can still tell denied from busy or missing.
fn into_io_error(err: ::trash::Error) -> io::Error {
    match err {
        #[cfg(all(unix, not(target_os = "macos"), not(target_os = "ios"), not(target_os = "android")))]
        ::trash::Error::FileSystem { source, .. } => source,
        ::trash::Error::Os { code, .. } => io::Error::from_raw_os_error(code),
        err @ ::trash::Error::CanonicalizePath { .. } => io::Error::new(io::ErrorKind::NotFound, err.to_string()),
        other => io::Error::other(other.to_string()),
    }
}

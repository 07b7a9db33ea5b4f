//! The single primitive every read-only filesystem provides.

use std::sync::Arc;

use crate::{FsError, Handle};

/// Open a path for reading.
///
/// Everything else a reader needs (stat, whole-file reads, listings, globbing,
/// sub-trees) is derived from this one method by [`FsExt`](crate::FsExt).
///
/// # Path Syntax
///
/// Paths are `/`-separated and unrooted; the root is `.`.
/// See [`path::is_valid`](crate::path::is_valid).
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. `open` takes `&self`; backends
/// use interior mutability for any state they keep.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn OpenFs`.
pub trait OpenFs: Send + Sync {
    /// Open the file or directory at `path`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `path` is malformed
    /// - [`FsError::NotFound`] if nothing lives at `path`
    /// - [`FsError::Encoding`] / [`FsError::Generator`] if content cannot be produced
    fn open(&self, path: &str) -> Result<Handle, FsError>;
}

impl<F: OpenFs + ?Sized> OpenFs for &F {
    fn open(&self, path: &str) -> Result<Handle, FsError> {
        (**self).open(path)
    }
}

impl<F: OpenFs + ?Sized> OpenFs for Arc<F> {
    fn open(&self, path: &str) -> Result<Handle, FsError> {
        (**self).open(path)
    }
}

impl<F: OpenFs + ?Sized> OpenFs for Box<F> {
    fn open(&self, path: &str) -> Result<Handle, FsError> {
        (**self).open(path)
    }
}

//! # Sub-tree views
//!
//! [`SubFs`] wraps any [`OpenFs`] and re-roots it at a directory:
//!
//! ```text
//! SubFs { inner, dir: "etc" }.open("app.json") ──▶ inner.open("etc/app.json")
//! ```
//!
//! The wrapper implements `OpenFs` itself, so views nest and every
//! [`FsExt`](crate::FsExt) helper works on them.

use crate::path::{self, ROOT};
use crate::{FsError, Handle, OpenFs};

/// A filesystem view rooted at a directory of another filesystem.
///
/// Handles and errors carry the full path in the underlying filesystem.
///
/// # Example
///
/// ```rust
/// use marshalfs::{FileSpec, FsExt, MarshalFs};
///
/// let fs = MarshalFs::new(|s: &&'static str| Ok(s.as_bytes().to_vec()))
///     .with_file("etc/app/config.toml", FileSpec::object("port = 80"))
///     .unwrap();
///
/// let etc = fs.sub("etc").unwrap();
/// assert_eq!(etc.read_to_string("app/config.toml").unwrap(), "port = 80");
/// assert_eq!(etc.walk(".").unwrap(), vec![".", "app", "app/config.toml"]);
/// ```
#[derive(Debug, Clone)]
pub struct SubFs<F> {
    inner: F,
    dir: String,
}

impl<F: OpenFs> SubFs<F> {
    /// Root a view of `inner` at `dir`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `dir` is malformed
    pub fn new(inner: F, dir: &str) -> Result<Self, FsError> {
        if !path::is_valid(dir) {
            return Err(FsError::invalid_path("sub", dir));
        }
        Ok(Self {
            inner,
            dir: dir.to_string(),
        })
    }

    /// The directory this view is rooted at.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// The wrapped filesystem.
    pub fn into_inner(self) -> F {
        self.inner
    }

    fn full_path(&self, name: &str) -> String {
        if name == ROOT {
            self.dir.clone()
        } else {
            path::join(&self.dir, name)
        }
    }
}

impl<F: OpenFs> OpenFs for SubFs<F> {
    fn open(&self, name: &str) -> Result<Handle, FsError> {
        if !path::is_valid(name) {
            return Err(FsError::invalid_path("open", name));
        }
        self.inner.open(&self.full_path(name))
    }
}

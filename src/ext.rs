//! # Extension Traits
//!
//! Convenience methods derived purely from [`OpenFs::open`].
//!
//! ## Overview
//!
//! [`FsExt`] has a blanket implementation, so any `OpenFs` (including
//! `&dyn OpenFs` and [`SubFs`]) gets these for free. None of them keep state
//! of their own.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`open_file`](FsExt::open_file) / [`open_dir`](FsExt::open_dir) | Open expecting a kind |
//! | [`stat`](FsExt::stat) | Metadata of a path |
//! | [`exists`](FsExt::exists), [`is_file`](FsExt::is_file), [`is_dir`](FsExt::is_dir) | Existence checks |
//! | [`read_file`](FsExt::read_file), [`read_to_string`](FsExt::read_to_string) | Whole-file reads |
//! | [`read_dir`](FsExt::read_dir) | Sorted listing |
//! | [`walk`](FsExt::walk) | Depth-first, lexically ordered traversal |
//! | [`glob`](FsExt::glob) | Listed paths matching a pattern |
//! | [`sub`](FsExt::sub) | View rooted at a directory |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, `FsExtJson::read_json` deserializes a
//! file's content.

use wax::{Glob, Pattern};

use crate::path::{self, ROOT};
use crate::{DirEntry, DirHandle, FileHandle, FsError, Metadata, OpenFs, SubFs};

/// Extension methods for any read-only filesystem.
///
/// # Example
///
/// ```rust
/// use marshalfs::{FileSpec, FsExt, MarshalFs};
///
/// let fs = MarshalFs::new(|s: &&'static str| Ok(s.as_bytes().to_vec()))
///     .with_file("docs/a.md", FileSpec::object("# A"))
///     .unwrap()
///     .with_file("docs/b.md", FileSpec::object("# B"))
///     .unwrap();
///
/// assert!(fs.is_dir("docs").unwrap());
/// assert_eq!(fs.read_to_string("docs/b.md").unwrap(), "# B");
/// assert_eq!(fs.glob("docs/*.md").unwrap(), vec!["docs/a.md", "docs/b.md"]);
/// ```
pub trait FsExt: OpenFs {
    /// Open a path that must be a regular file.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] if the path is a directory
    fn open_file(&self, path: &str) -> Result<FileHandle, FsError> {
        self.open(path)?.into_file("read")
    }

    /// Open a path that must be a directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if the path is a regular file
    fn open_dir(&self, path: &str) -> Result<DirHandle, FsError> {
        self.open(path)?.into_dir("readdir")
    }

    /// Metadata for a path.
    ///
    /// For files this materializes the content to learn its size.
    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        let mut handle = self.open(path)?;
        let info = handle.stat();
        handle.close()?;
        Ok(info)
    }

    /// Check whether a path exists.
    ///
    /// Returns `Ok(false)` for missing or malformed paths; other failures
    /// (encoding, generators) are errors.
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check whether a path is a regular file. Missing paths are `Ok(false)`.
    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(m) => Ok(m.is_file()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check whether a path is a directory. Missing paths are `Ok(false)`.
    fn is_dir(&self, path: &str) -> Result<bool, FsError> {
        match self.stat(path) {
            Ok(m) => Ok(m.is_dir()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read a whole file.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        Ok(self.open_file(path)?.into_bytes())
    }

    /// Read a whole file as UTF-8.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidData`] if the content is not valid UTF-8
    fn read_to_string(&self, path: &str) -> Result<String, FsError> {
        String::from_utf8(self.read_file(path)?).map_err(|e| FsError::InvalidData {
            path: path.to_string(),
            details: e.to_string(),
        })
    }

    /// List a directory, sorted by name.
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let mut dir = self.open_dir(path)?;
        let mut entries = dir.read_dir(0);
        dir.close()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Every path under `root` (inclusive), depth-first in lexical order.
    ///
    /// Directories are listed before their contents.
    fn walk(&self, root: &str) -> Result<Vec<String>, FsError> {
        fn visit<F: OpenFs + ?Sized>(
            fs: &F,
            dir: &str,
            out: &mut Vec<String>,
        ) -> Result<(), FsError> {
            for entry in fs.read_dir(dir)? {
                let child = path::join(dir, &entry.name);
                out.push(child.clone());
                if entry.is_dir() {
                    visit(fs, &child, out)?;
                }
            }
            Ok(())
        }

        let mut out = vec![root.to_string()];
        if self.stat(root)?.is_dir() {
            visit(self, root, &mut out)?;
        }
        Ok(out)
    }

    /// Listed paths matching `pattern`, sorted.
    ///
    /// Generator-backed files are never listed, so they never match.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPattern`] if `pattern` does not compile
    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError> {
        let glob = Glob::new(pattern).map_err(|e| FsError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        let mut matches: Vec<String> = self
            .walk(ROOT)?
            .into_iter()
            .filter(|p| p != ROOT && glob.is_match(p.as_str()))
            .collect();
        matches.sort();
        Ok(matches)
    }

    /// A view of the directory `dir`.
    ///
    /// `dir` must be a well-formed path; whether it exists is only checked
    /// when the view is used.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `dir` is malformed
    fn sub(&self, dir: &str) -> Result<SubFs<&Self>, FsError> {
        SubFs::new(self, dir)
    }
}

// Blanket implementation - any OpenFs gets FsExt for free
impl<F: OpenFs + ?Sized> FsExt for F {}

// =============================================================================
// JSON Support (Feature-Gated)
// =============================================================================

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::de::DeserializeOwned;

    /// JSON deserialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait FsExtJson: OpenFs {
        /// Read a file and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - `FsError::NotFound` if the file doesn't exist
        /// - `FsError::Deserialization` if JSON parsing failed
        fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FsError> {
            let data = self.read_file(path)?;
            serde_json::from_slice(&data).map_err(|e| FsError::Deserialization(e.to_string()))
        }
    }

    // Blanket implementation
    impl<F: OpenFs + ?Sized> FsExtJson for F {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;

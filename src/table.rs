//! The flat path table and its conflict validation.

use std::collections::HashSet;

use indexmap::IndexMap;
use wax::Glob;

use crate::path::{self, SEPARATOR};
use crate::{FileSpec, FsError};

/// Flat mapping from logical path (or generator pattern) to [`FileSpec`].
///
/// Object and directory specs are keyed by path. Generator specs are keyed
/// by a glob pattern (`*`, `?`, `[a-z]`, ...) and never appear in listings.
/// Paths and patterns are separate key spaces: a literal path and a pattern
/// spelled the same way coexist. Generators are tried in registration order;
/// replacing a pattern keeps its slot.
///
/// # Example
///
/// ```rust
/// use marshalfs::{FileSpec, PathTable};
///
/// let mut table = PathTable::new();
/// table.insert("etc/app.json", FileSpec::object(1u32)).unwrap();
/// table.insert("*.json", FileSpec::generator(|_| Ok(Some(2u32)))).unwrap();
/// assert_eq!(table.len(), 2);
/// assert!(table.validate().is_ok());
///
/// table.insert("etc/app.json/extra", FileSpec::object(3u32)).unwrap();
/// assert!(table.validate().is_err());
/// ```
pub struct PathTable<V> {
    files: IndexMap<String, FileSpec<V>>,
    patterns: IndexMap<String, (Glob<'static>, FileSpec<V>)>,
}

impl<V> PathTable<V> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            files: IndexMap::new(),
            patterns: IndexMap::new(),
        }
    }

    /// Build a table from `(key, spec)` pairs and validate it.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] / [`FsError::InvalidPattern`] for a bad key
    /// - [`FsError::PathConflict`] if a file is also an ancestor of another path
    pub fn from_specs<K, I>(specs: I) -> Result<Self, FsError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FileSpec<V>)>,
    {
        let mut table = Self::new();
        for (key, spec) in specs {
            table.insert(key, spec)?;
        }
        table.validate()?;
        Ok(table)
    }

    /// Insert or replace one entry, returning the previous spec of the same
    /// kind under `key`.
    ///
    /// Generators go to the pattern space, everything else to the path
    /// space. Only the key is checked here; cross-entry conflicts are left to
    /// [`validate`](Self::validate) or to resolution time.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if a path key is malformed or is the root
    ///   for anything but a directory
    /// - [`FsError::InvalidPattern`] if a generator pattern does not compile
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        spec: FileSpec<V>,
    ) -> Result<Option<FileSpec<V>>, FsError> {
        let key = key.into();
        if spec.is_generator() {
            let glob = Glob::new(&key)
                .map_err(|e| FsError::InvalidPattern {
                    pattern: key.clone(),
                    reason: e.to_string(),
                })?
                .into_owned();
            return Ok(self.patterns.insert(key, (glob, spec)).map(|(_, old)| old));
        }
        if !path::is_valid(&key) || (key == path::ROOT && !spec.is_dir()) {
            return Err(FsError::invalid_path("insert", &key));
        }
        Ok(self.files.insert(key, spec))
    }

    /// Remove the object or directory entry at `path`.
    pub fn remove(&mut self, path: &str) -> Option<FileSpec<V>> {
        self.files.shift_remove(path)
    }

    /// Remove the generator registered under `pattern`, keeping the order of
    /// the rest.
    pub fn remove_pattern(&mut self, pattern: &str) -> Option<FileSpec<V>> {
        self.patterns.shift_remove(pattern).map(|(_, spec)| spec)
    }

    /// Look up an object or directory entry by exact path.
    pub fn get(&self, path: &str) -> Option<&FileSpec<V>> {
        self.files.get(path)
    }

    /// Look up a generator by its exact pattern text.
    pub fn get_pattern(&self, pattern: &str) -> Option<&FileSpec<V>> {
        self.patterns.get(pattern).map(|(_, spec)| spec)
    }

    /// Number of entries, generators included.
    pub fn len(&self) -> usize {
        self.files.len() + self.patterns.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.patterns.is_empty()
    }

    /// Object and directory paths in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Generator patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }

    /// Check that no file is also used as an ancestor directory.
    ///
    /// Explicit directory entries may have descendants; generator patterns
    /// are not paths and take no part.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathConflict`] naming the file and one path beneath it
    pub fn validate(&self) -> Result<(), FsError> {
        let files: HashSet<&str> = self
            .paths()
            .filter(|(_, spec)| !spec.is_dir())
            .map(|(key, _)| key)
            .collect();
        if files.is_empty() {
            return Ok(());
        }
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        for key in keys {
            if let Some(file) = path::ancestors(key).find(|a| files.contains(a)) {
                return Err(FsError::PathConflict {
                    path: file.to_string(),
                    descendant: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Object and directory entries.
    pub(crate) fn paths(&self) -> impl Iterator<Item = (&str, &FileSpec<V>)> {
        self.files.iter().map(|(key, spec)| (key.as_str(), spec))
    }

    /// Generator entries in registration order.
    pub(crate) fn generators(&self) -> impl Iterator<Item = (&str, &Glob<'static>, &FileSpec<V>)> {
        self.patterns
            .iter()
            .map(|(key, (glob, spec))| (key.as_str(), glob, spec))
    }

    /// Some path lying beneath `dir`, if any.
    pub(crate) fn descendant_of(&self, dir: &str) -> Option<&str> {
        self.keys().find(|key| {
            key.len() > dir.len() + 1
                && key.starts_with(dir)
                && key[dir.len()..].starts_with(SEPARATOR)
        })
    }
}

impl<V> Default for PathTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for PathTable<V> {
    fn clone(&self) -> Self {
        Self {
            files: self.files.clone(),
            patterns: self.patterns.clone(),
        }
    }
}

impl<V> std::fmt::Debug for PathTable<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathTable")
            .field("files", &self.files)
            .field(
                "patterns",
                &self
                    .patterns
                    .iter()
                    .map(|(k, (_, spec))| (k, spec))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

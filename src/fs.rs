//! The marshalling filesystem.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;

use crate::error::BoxError;
use crate::handle::{DirHandle, FileHandle, Handle};
use crate::materialize::Materializer;
use crate::path::{self, ROOT};
use crate::resolve::{Resolution, resolve};
use crate::spec::MarshalFn;
use crate::{FileMode, FileSpec, FsError, Metadata, OpenFs, PathTable, synth};

/// A read-only filesystem whose files are in-memory values, marshalled to
/// bytes when opened.
///
/// ## Resolution
///
/// `open` looks for an exact table entry, then for the first generator whose
/// pattern matches, then for any table path beneath the name (which makes it a
/// synthesized directory). The root `.` always exists.
///
/// ## Thread Safety
///
/// The table sits behind an `RwLock`: any number of opens run together, while
/// [`write_file`](Self::write_file), [`remove`](Self::remove) and
/// [`replace_all`](Self::replace_all) wait for them and exclude new ones.
/// Generators run under the read lock. Returned handles own their content and
/// never touch the lock again.
///
/// # Example
///
/// ```rust
/// use marshalfs::{FileSpec, FsExt, MarshalFs};
///
/// let fs = MarshalFs::new(|n: &u32| Ok(n.to_string().into_bytes()))
///     .with_file("counts/apples", FileSpec::object(3))
///     .unwrap()
///     .with_generator("squares/*", |path: &str| {
///         let n: u32 = path.rsplit('/').next().unwrap_or("").parse()?;
///         Ok(Some(n * n))
///     })
///     .unwrap();
///
/// assert_eq!(fs.read_to_string("counts/apples").unwrap(), "3");
/// assert_eq!(fs.read_to_string("squares/12").unwrap(), "144");
/// assert!(fs.is_dir("counts").unwrap());
/// ```
pub struct MarshalFs<V> {
    table: RwLock<PathTable<V>>,
    marshal: MarshalFn<V>,
}

impl<V: Send + Sync + 'static> MarshalFs<V> {
    /// Create an empty filesystem with a default marshal function.
    pub fn new<F>(marshal: F) -> Self
    where
        F: Fn(&V) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        Self {
            table: RwLock::new(PathTable::new()),
            marshal: Arc::new(marshal),
        }
    }

    /// Install `table` after validating it.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathConflict`] if a file is also an ancestor of another path
    pub fn with_table(self, table: PathTable<V>) -> Result<Self, FsError> {
        self.replace_all(table)?;
        Ok(self)
    }

    /// Add one entry and re-validate the whole table.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] / [`FsError::InvalidPattern`] for a bad key
    /// - [`FsError::PathConflict`] if the new entry overlaps an existing file
    pub fn with_file(self, key: impl Into<String>, spec: FileSpec<V>) -> Result<Self, FsError> {
        {
            let mut table = self.write_table();
            table.insert(key, spec)?;
            table.validate()?;
        }
        Ok(self)
    }

    /// Register a generator for every path matching `pattern`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPattern`] if `pattern` does not compile
    pub fn with_generator<F>(self, pattern: impl Into<String>, generate: F) -> Result<Self, FsError>
    where
        F: Fn(&str) -> Result<Option<V>, BoxError> + Send + Sync + 'static,
    {
        self.with_file(pattern, FileSpec::generator(generate))
    }

    /// Add an explicit directory with default metadata.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `path` is malformed
    pub fn with_dir(self, path: impl Into<String>) -> Result<Self, FsError> {
        self.with_file(path, FileSpec::directory())
    }

    /// The filesystem-wide marshal function.
    pub fn marshaller(&self) -> &MarshalFn<V> {
        &self.marshal
    }

    /// Insert or replace one entry, returning the previous spec.
    ///
    /// Conflicts are not checked here: opening a file that also has paths
    /// beneath it fails with [`FsError::PathConflict`] instead.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] / [`FsError::InvalidPattern`] for a bad key
    pub fn write_file(
        &self,
        key: impl Into<String>,
        spec: FileSpec<V>,
    ) -> Result<Option<FileSpec<V>>, FsError> {
        let key = key.into();
        let previous = self.write_table().insert(key.clone(), spec)?;
        debug!("write_file {key}: replaced={}", previous.is_some());
        Ok(previous)
    }

    /// Remove the object or directory entry at `path`, returning its spec
    /// if it existed. Generators are untouched.
    pub fn remove(&self, path: &str) -> Option<FileSpec<V>> {
        let removed = self.write_table().remove(path);
        debug!("remove {path}: existed={}", removed.is_some());
        removed
    }

    /// Unregister the generator under `pattern`, returning its spec if it
    /// existed.
    pub fn remove_generator(&self, pattern: &str) -> Option<FileSpec<V>> {
        let removed = self.write_table().remove_pattern(pattern);
        debug!("remove_generator {pattern:?}: existed={}", removed.is_some());
        removed
    }

    /// Swap in a whole new table atomically.
    ///
    /// Validation happens before the lock is taken; on failure the current
    /// table stays installed.
    ///
    /// # Errors
    ///
    /// - [`FsError::PathConflict`] if a file is also an ancestor of another path
    pub fn replace_all(&self, table: PathTable<V>) -> Result<(), FsError> {
        table.validate()?;
        let len = table.len();
        *self.write_table() = table;
        debug!("replace_all: installed {len} entries");
        Ok(())
    }

    /// A copy of the current table.
    pub fn snapshot(&self) -> PathTable<V> {
        self.read_table().clone()
    }

    /// Open the root directory.
    ///
    /// Shorthand for `open(".")`, which can never fail for lack of entries.
    pub fn root(&self) -> Result<DirHandle, FsError> {
        self.open(ROOT)?.into_dir("open")
    }

    fn read_table(&self) -> RwLockReadGuard<'_, PathTable<V>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, PathTable<V>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Send + Sync + 'static> OpenFs for MarshalFs<V> {
    fn open(&self, path: &str) -> Result<Handle, FsError> {
        let table = self.read_table();
        match resolve(&table, "open", path)? {
            Resolution::File { value, common } => {
                drop(table);
                let materializer = Materializer::new(value, common.marshaller(), &self.marshal);
                let data = materializer.bytes("open", path)?;
                let info = Metadata {
                    name: path::base_name(path).to_string(),
                    mode: common.mode().as_file(),
                    size: 0,
                    modified: common.modified(),
                    sys: common.sys().cloned(),
                };
                Ok(Handle::File(FileHandle::new(path.to_string(), info, data)))
            }
            Resolution::Dir { common } => {
                let entries = synth::list_children(&table, path, &self.marshal);
                drop(table);
                let info = match common {
                    Some(common) => Metadata {
                        name: path::base_name(path).to_string(),
                        mode: common.mode().as_dir(),
                        size: 0,
                        modified: common.modified(),
                        sys: common.sys().cloned(),
                    },
                    None => Metadata {
                        name: path::base_name(path).to_string(),
                        mode: FileMode::synthesized_dir(),
                        ..Metadata::default()
                    },
                };
                debug!("open {path}: directory with {} entries", entries.len());
                Ok(Handle::Dir(DirHandle::new(path.to_string(), info, entries)))
            }
        }
    }
}

impl<V> fmt::Debug for MarshalFs<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table.try_read() {
            Ok(table) => f.debug_struct("MarshalFs").field("table", &*table).finish(),
            Err(_) => f.debug_struct("MarshalFs").finish_non_exhaustive(),
        }
    }
}

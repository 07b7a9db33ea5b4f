//! File specifications: what a table path (or pattern) turns into when opened.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::BoxError;
use crate::{FileMode, Sys};

/// Encodes a value into file content.
pub type MarshalFn<V> = Arc<dyn Fn(&V) -> Result<Vec<u8>, BoxError> + Send + Sync>;

/// Produces a value for a requested path.
///
/// `Ok(None)` means there is no such item and surfaces as
/// [`FsError::NotFound`](crate::FsError::NotFound).
pub type GenerateFn<V> = Arc<dyn Fn(&str) -> Result<Option<V>, BoxError> + Send + Sync>;

/// Metadata shared by every kind of [`FileSpec`].
pub struct FileCommon<V> {
    pub(crate) mode: FileMode,
    pub(crate) modified: SystemTime,
    pub(crate) sys: Option<Sys>,
    pub(crate) marshaller: Option<MarshalFn<V>>,
}

impl<V> FileCommon<V> {
    fn new(mode: FileMode) -> Self {
        Self {
            mode,
            modified: SystemTime::UNIX_EPOCH,
            sys: None,
            marshaller: None,
        }
    }

    /// Mode bits.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Modification time reported by `stat`.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Passthrough metadata.
    pub fn sys(&self) -> Option<&Sys> {
        self.sys.as_ref()
    }

    /// Per-file marshal override, if any.
    pub fn marshaller(&self) -> Option<&MarshalFn<V>> {
        self.marshaller.as_ref()
    }
}

impl<V> Clone for FileCommon<V> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            modified: self.modified,
            sys: self.sys.clone(),
            marshaller: self.marshaller.clone(),
        }
    }
}

/// What a table key resolves to.
///
/// The set of kinds is closed: a fixed value, a generator invoked per open,
/// or an explicit directory whose listing is still synthesized from the table.
///
/// # Example
///
/// ```rust
/// use marshalfs::FileSpec;
///
/// let config = FileSpec::object(String::from("debug = true")).with_mode(0o440);
/// assert!(!config.is_dir());
/// assert_eq!(config.mode().perm(), 0o440);
///
/// let dir: FileSpec<String> = FileSpec::directory();
/// assert!(dir.is_dir());
/// ```
pub enum FileSpec<V> {
    /// Content is the marshalled form of one fixed value.
    Object {
        /// The value to marshal.
        value: Arc<V>,
        /// Shared metadata.
        common: FileCommon<V>,
    },
    /// Content is produced by calling `generate` with the requested path.
    ///
    /// Registered under a glob pattern rather than a path.
    Generator {
        /// The generator function.
        generate: GenerateFn<V>,
        /// Shared metadata.
        common: FileCommon<V>,
    },
    /// A directory carrying explicit metadata.
    Directory {
        /// Shared metadata.
        common: FileCommon<V>,
    },
}

impl<V> FileSpec<V> {
    /// A file whose content is `value` run through the marshal function.
    pub fn object(value: V) -> Self {
        Self::shared(Arc::new(value))
    }

    /// Like [`object`](Self::object) for an already shared value.
    pub fn shared(value: Arc<V>) -> Self {
        FileSpec::Object {
            value,
            common: FileCommon::new(FileMode::default_file()),
        }
    }

    /// A file produced on demand for every path matching its pattern.
    pub fn generator<F>(generate: F) -> Self
    where
        F: Fn(&str) -> Result<Option<V>, BoxError> + Send + Sync + 'static,
    {
        FileSpec::Generator {
            generate: Arc::new(generate),
            common: FileCommon::new(FileMode::default_file()),
        }
    }

    /// An explicit directory.
    pub fn directory() -> Self {
        FileSpec::Directory {
            common: FileCommon::new(FileMode::default_dir()),
        }
    }

    /// Shared metadata.
    pub fn common(&self) -> &FileCommon<V> {
        match self {
            FileSpec::Object { common, .. }
            | FileSpec::Generator { common, .. }
            | FileSpec::Directory { common } => common,
        }
    }

    fn common_mut(&mut self) -> &mut FileCommon<V> {
        match self {
            FileSpec::Object { common, .. }
            | FileSpec::Generator { common, .. }
            | FileSpec::Directory { common } => common,
        }
    }

    /// Mode bits; the directory bit always agrees with the kind.
    pub fn mode(&self) -> FileMode {
        match self {
            FileSpec::Directory { common } => common.mode.as_dir(),
            _ => self.common().mode.as_file(),
        }
    }

    /// Returns `true` for [`FileSpec::Directory`].
    pub fn is_dir(&self) -> bool {
        matches!(self, FileSpec::Directory { .. })
    }

    /// Returns `true` for [`FileSpec::Generator`].
    pub fn is_generator(&self) -> bool {
        matches!(self, FileSpec::Generator { .. })
    }

    /// The value this entry yields for `path`.
    ///
    /// Objects always yield their value and generators are called with
    /// `path`. Directories yield `None`.
    ///
    /// # Errors
    ///
    /// Whatever the generator returns.
    pub fn resolve_value(&self, path: &str) -> Result<Option<Arc<V>>, BoxError> {
        match self {
            FileSpec::Object { value, .. } => Ok(Some(Arc::clone(value))),
            FileSpec::Generator { generate, .. } => Ok(generate(path)?.map(Arc::new)),
            FileSpec::Directory { .. } => Ok(None),
        }
    }

    /// Set permission bits. The directory bit is ignored.
    pub fn with_mode(mut self, bits: u32) -> Self {
        self.common_mut().mode = FileMode::from_bits(bits).as_file();
        self
    }

    /// Set the modification time.
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.common_mut().modified = modified;
        self
    }

    /// Attach passthrough metadata returned by [`Metadata::sys`](crate::Metadata::sys).
    pub fn with_sys<S: Any + Send + Sync>(mut self, sys: S) -> Self {
        self.common_mut().sys = Some(Arc::new(sys));
        self
    }

    /// Marshal this file with `marshal` instead of the filesystem default.
    pub fn with_marshaller<F>(mut self, marshal: F) -> Self
    where
        F: Fn(&V) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        self.common_mut().marshaller = Some(Arc::new(marshal));
        self
    }
}

impl<V> Clone for FileSpec<V> {
    fn clone(&self) -> Self {
        match self {
            FileSpec::Object { value, common } => FileSpec::Object {
                value: Arc::clone(value),
                common: common.clone(),
            },
            FileSpec::Generator { generate, common } => FileSpec::Generator {
                generate: Arc::clone(generate),
                common: common.clone(),
            },
            FileSpec::Directory { common } => FileSpec::Directory {
                common: common.clone(),
            },
        }
    }
}

impl<V> fmt::Debug for FileSpec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            FileSpec::Object { .. } => "Object",
            FileSpec::Generator { .. } => "Generator",
            FileSpec::Directory { .. } => "Directory",
        };
        f.debug_struct(kind)
            .field("mode", &self.mode())
            .field("modified", &self.common().modified)
            .field("marshaller", &self.common().marshaller.is_some())
            .finish_non_exhaustive()
    }
}

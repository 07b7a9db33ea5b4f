//! Core types for the marshalling filesystem.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::FsError;

/// Opaque implementation-specific metadata passed through to [`Metadata::sys`].
pub type Sys = Arc<dyn Any + Send + Sync>;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// File mode: Unix permission bits plus a directory bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileMode(u32);

impl FileMode {
    /// Directory bit (same position as `S_IFDIR`).
    pub const DIR: u32 = 0o040000;

    /// Create a mode from raw bits. Bits outside `DIR | 0o7777` are dropped.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & (Self::DIR | 0o7777))
    }

    /// Get the raw mode value.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Permission bits only.
    #[inline]
    pub const fn perm(&self) -> u32 {
        self.0 & 0o7777
    }

    /// Returns `true` if the directory bit is set.
    #[inline]
    pub const fn is_dir(&self) -> bool {
        self.0 & Self::DIR != 0
    }

    /// The same permissions with the directory bit set.
    #[inline]
    pub const fn as_dir(self) -> Self {
        Self(self.0 | Self::DIR)
    }

    /// The same permissions with the directory bit cleared.
    #[inline]
    pub const fn as_file(self) -> Self {
        Self(self.0 & !Self::DIR)
    }

    /// Entry type implied by the directory bit.
    #[inline]
    pub const fn file_type(&self) -> FileType {
        if self.is_dir() {
            FileType::Directory
        } else {
            FileType::File
        }
    }

    /// Default mode for a file (0o444 = r--r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o444)
    }

    /// Default mode for a directory (0o555 with the directory bit).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(Self::DIR | 0o555)
    }
}

impl FileMode {
    /// Mode of a directory inferred from deeper paths: the directory bit and
    /// no permission bits.
    #[inline]
    pub const fn synthesized_dir() -> Self {
        Self(Self::DIR)
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::default_file()
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir() { 'd' } else { '-' };
        write!(f, "{kind}")?;
        for shift in [6, 3, 0] {
            let bits = (self.0 >> shift) & 0o7;
            let r = if bits & 0o4 != 0 { 'r' } else { '-' };
            let w = if bits & 0o2 != 0 { 'w' } else { '-' };
            let x = if bits & 0o1 != 0 { 'x' } else { '-' };
            write!(f, "{r}{w}{x}")?;
        }
        Ok(())
    }
}

/// Metadata for an opened file or directory.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Base name of the entry (`.` for the root).
    pub name: String,
    /// Mode bits, including the directory bit.
    pub mode: FileMode,
    /// Size in bytes: the materialized length for files, zero for directories.
    pub size: u64,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Opaque passthrough metadata.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub sys: Option<Sys>,
}

impl Metadata {
    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        !self.mode.is_dir()
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    /// Type of the entry.
    #[inline]
    pub fn file_type(&self) -> FileType {
        self.mode.file_type()
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            mode: FileMode::default_file(),
            size: 0,
            modified: SystemTime::UNIX_EPOCH,
            sys: None,
        }
    }
}

/// Deferred size computation for a listed file.
pub(crate) type SizeFn = Arc<dyn Fn() -> Result<u64, FsError> + Send + Sync>;

/// A directory entry returned from a directory listing.
///
/// Listing a directory never materializes file content. The size of a file
/// entry is computed on demand by [`DirEntry::metadata`].
#[derive(Clone)]
pub struct DirEntry {
    /// Name of the entry (last path segment only).
    pub name: String,
    /// Full path to the entry.
    pub path: String,
    /// Mode bits, including the directory bit.
    pub mode: FileMode,
    /// Last modification time.
    pub modified: SystemTime,
    /// Opaque passthrough metadata.
    pub sys: Option<Sys>,
    size: Option<SizeFn>,
}

impl DirEntry {
    pub(crate) fn file(
        name: String,
        path: String,
        mode: FileMode,
        modified: SystemTime,
        sys: Option<Sys>,
        size: SizeFn,
    ) -> Self {
        Self {
            name,
            path,
            mode,
            modified,
            sys,
            size: Some(size),
        }
    }

    pub(crate) fn dir(
        name: String,
        path: String,
        mode: FileMode,
        modified: SystemTime,
        sys: Option<Sys>,
    ) -> Self {
        Self {
            name,
            path,
            mode: mode.as_dir(),
            modified,
            sys,
            size: None,
        }
    }

    /// Type of the entry.
    #[inline]
    pub fn file_type(&self) -> FileType {
        self.mode.file_type()
    }

    /// Returns `true` if this entry is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    /// Full metadata for the entry.
    ///
    /// For files this runs the marshal function to learn the size.
    ///
    /// # Errors
    ///
    /// - [`FsError::Encoding`] if marshalling the value fails
    pub fn metadata(&self) -> Result<Metadata, FsError> {
        let size = match &self.size {
            Some(size) => size()?,
            None => 0,
        };
        Ok(Metadata {
            name: self.name.clone(),
            mode: self.mode,
            size,
            modified: self.modified,
            sys: self.sys.clone(),
        })
    }
}

impl fmt::Debug for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirEntry")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn file_mode_masks_extra_bits() {
        let m = FileMode::from_bits(0o1_000_755);
        assert_eq!(m.bits(), 0o755);
        assert!(!m.is_dir());
    }

    #[test]
    fn file_mode_dir_bit() {
        let m = FileMode::from_bits(0o644).as_dir();
        assert!(m.is_dir());
        assert_eq!(m.perm(), 0o644);
        assert_eq!(m.file_type(), FileType::Directory);
        assert!(!m.as_file().is_dir());
    }

    #[test]
    fn file_mode_defaults() {
        assert_eq!(FileMode::default_file().bits(), 0o444);
        assert!(FileMode::default_dir().is_dir());
        assert_eq!(FileMode::default_dir().perm(), 0o555);
        assert_eq!(FileMode::synthesized_dir().bits(), FileMode::DIR);
        assert_eq!(FileMode::synthesized_dir().to_string(), "d---------");
    }

    #[test]
    fn file_mode_display() {
        assert_eq!(FileMode::default_file().to_string(), "-r--r--r--");
        assert_eq!(FileMode::default_dir().to_string(), "dr-xr-xr-x");
        assert_eq!(FileMode::from_bits(0o750).to_string(), "-rwxr-x---");
    }

    #[test]
    fn metadata_is_dir() {
        let m = Metadata {
            mode: FileMode::default_dir(),
            ..Default::default()
        };
        assert!(m.is_dir());
        assert!(!m.is_file());
    }

    #[test]
    fn dir_entry_size_is_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let entry = DirEntry::file(
            "f".into(),
            "d/f".into(),
            FileMode::default_file(),
            SystemTime::UNIX_EPOCH,
            None,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            }),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(entry.metadata().unwrap().size, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dir_entry_directory_has_zero_size() {
        let entry = DirEntry::dir(
            "d".into(),
            "d".into(),
            FileMode::default_file(),
            SystemTime::UNIX_EPOCH,
            None,
        );
        assert!(entry.is_dir());
        assert_eq!(entry.metadata().unwrap().size, 0);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<FileMode>();
        assert_send_sync::<Metadata>();
        assert_send_sync::<DirEntry>();
    }
}

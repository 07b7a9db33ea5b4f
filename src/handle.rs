//! Open file and directory handles.
//!
//! Handles own everything they serve: file content is materialized when the
//! handle is created and directory listings are computed up front, so no
//! handle refers back to the filesystem that produced it.

use std::io::{self, Read, Seek, SeekFrom};

use crate::{DirEntry, FsError, Metadata};

/// An open regular file: a cursor over content encoded at open time.
///
/// # Example
///
/// ```rust
/// use marshalfs::{FileSpec, FsExt, MarshalFs};
/// use std::io::{Read, Seek, SeekFrom};
///
/// let fs = MarshalFs::new(|s: &String| Ok(s.clone().into_bytes()))
///     .with_file("greeting", FileSpec::object("hello".to_string()))
///     .unwrap();
///
/// let mut file = fs.open_file("greeting").unwrap();
/// file.seek(SeekFrom::End(-2)).unwrap();
/// let mut tail = String::new();
/// file.read_to_string(&mut tail).unwrap();
/// assert_eq!(tail, "lo");
/// ```
#[derive(Debug)]
pub struct FileHandle {
    path: String,
    info: Metadata,
    data: Vec<u8>,
    offset: u64,
}

impl FileHandle {
    pub(crate) fn new(path: String, mut info: Metadata, data: Vec<u8>) -> Self {
        info.size = data.len() as u64;
        Self {
            path,
            info,
            data,
            offset: 0,
        }
    }

    /// Path the handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Metadata captured at open; `size` is the materialized length.
    pub fn stat(&self) -> Metadata {
        self.info.clone()
    }

    /// The whole materialized content.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the handle, returning its content.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.offset
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Copy from the cursor into `buf` and advance.
    ///
    /// Returns `Ok(0)` once the cursor is at the end of the content.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        if self.offset >= self.len() {
            return Ok(0);
        }
        let start = self.offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.offset += n as u64;
        Ok(n)
    }

    /// Move the cursor; the result must lie within `0..=len`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] if the target is before the start or past the end.
    ///   The cursor is left unchanged.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, FsError> {
        let (base, delta) = match pos {
            SeekFrom::Start(n) => (0i128, i128::from(n)),
            SeekFrom::Current(d) => (i128::from(self.offset), i128::from(d)),
            SeekFrom::End(d) => (i128::from(self.len()), i128::from(d)),
        };
        let target = base + delta;
        if target < 0 || target > i128::from(self.len()) {
            return Err(FsError::invalid_argument("seek", &self.path));
        }
        self.offset = target as u64;
        Ok(self.offset)
    }

    /// Positioned read that leaves the cursor alone.
    ///
    /// A count shorter than `buf` means the end of the content was reached.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] if `offset` is past the end
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, FsError> {
        if offset > self.len() {
            return Err(FsError::invalid_argument("read", &self.path));
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    /// Release the handle. Holds no external resource, so this always succeeds.
    pub fn close(&mut self) -> Result<(), FsError> {
        Ok(())
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        FileHandle::read(self, buf).map_err(io::Error::from)
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        FileHandle::seek(self, pos).map_err(io::Error::from)
    }
}

/// An open directory: a paginated cursor over a sorted listing.
#[derive(Debug)]
pub struct DirHandle {
    path: String,
    info: Metadata,
    entries: Vec<DirEntry>,
    offset: usize,
}

impl DirHandle {
    pub(crate) fn new(path: String, info: Metadata, entries: Vec<DirEntry>) -> Self {
        Self {
            path,
            info,
            entries,
            offset: 0,
        }
    }

    /// Path the handle was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory metadata.
    pub fn stat(&self) -> Metadata {
        self.info.clone()
    }

    /// Read the next batch of entries.
    ///
    /// `n == 0` returns every remaining entry. With `n > 0` at most `n`
    /// entries are returned, and an empty batch marks the end.
    pub fn read_dir(&mut self, n: usize) -> Vec<DirEntry> {
        let remaining = self.entries.len() - self.offset;
        let take = if n == 0 { remaining } else { n.min(remaining) };
        let batch = self.entries[self.offset..self.offset + take].to_vec();
        self.offset += take;
        batch
    }

    /// Returns `true` once every entry has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.offset == self.entries.len()
    }

    /// Release the handle. Always succeeds.
    pub fn close(&mut self) -> Result<(), FsError> {
        Ok(())
    }
}

impl Iterator for DirHandle {
    type Item = DirEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.offset).cloned()?;
        self.offset += 1;
        Some(entry)
    }
}

/// Result of a successful open.
#[derive(Debug)]
pub enum Handle {
    /// A regular file.
    File(FileHandle),
    /// A directory.
    Dir(DirHandle),
}

impl Handle {
    /// Path the handle was opened with.
    pub fn path(&self) -> &str {
        match self {
            Handle::File(f) => f.path(),
            Handle::Dir(d) => d.path(),
        }
    }

    /// Metadata of the opened entry.
    pub fn stat(&self) -> Metadata {
        match self {
            Handle::File(f) => f.stat(),
            Handle::Dir(d) => d.stat(),
        }
    }

    /// Returns `true` for a directory handle.
    pub fn is_dir(&self) -> bool {
        matches!(self, Handle::Dir(_))
    }

    /// Read file content.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] on a directory handle
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        match self {
            Handle::File(f) => f.read(buf),
            Handle::Dir(d) => Err(FsError::invalid_argument("read", &d.path)),
        }
    }

    /// Read directory entries; see [`DirHandle::read_dir`].
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] on a file handle
    pub fn read_dir(&mut self, n: usize) -> Result<Vec<DirEntry>, FsError> {
        match self {
            Handle::File(f) => Err(FsError::NotADirectory {
                path: f.path.clone(),
                operation: "readdir",
            }),
            Handle::Dir(d) => Ok(d.read_dir(n)),
        }
    }

    /// Release the handle. Always succeeds.
    pub fn close(&mut self) -> Result<(), FsError> {
        match self {
            Handle::File(f) => f.close(),
            Handle::Dir(d) => d.close(),
        }
    }

    /// The file handle, or an error naming `operation`.
    pub fn into_file(self, operation: &'static str) -> Result<FileHandle, FsError> {
        match self {
            Handle::File(f) => Ok(f),
            Handle::Dir(d) => Err(FsError::invalid_argument(operation, &d.path)),
        }
    }

    /// The directory handle, or an error naming `operation`.
    pub fn into_dir(self, operation: &'static str) -> Result<DirHandle, FsError> {
        match self {
            Handle::File(f) => Err(FsError::NotADirectory {
                path: f.path,
                operation,
            }),
            Handle::Dir(d) => Ok(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileMode;
    use std::time::SystemTime;

    fn file(content: &str) -> FileHandle {
        FileHandle::new("f".into(), Metadata::default(), content.as_bytes().to_vec())
    }

    fn dir(names: &[&str]) -> DirHandle {
        let entries = names
            .iter()
            .map(|n| {
                DirEntry::dir(
                    n.to_string(),
                    n.to_string(),
                    FileMode::default_dir(),
                    SystemTime::UNIX_EPOCH,
                    None,
                )
            })
            .collect();
        let info = Metadata {
            name: ".".into(),
            mode: FileMode::default_dir(),
            ..Default::default()
        };
        DirHandle::new(".".into(), info, entries)
    }

    #[test]
    fn stat_size_is_content_length() {
        assert_eq!(file("12345").stat().size, 5);
    }

    #[test]
    fn sequential_read_then_eof() {
        let mut f = file("abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(f.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(f.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(f.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn seek_bounds() {
        let mut f = file("abc");
        assert!(matches!(
            f.seek(SeekFrom::Current(-1)),
            Err(FsError::InvalidArgument { operation: "seek", .. })
        ));
        assert!(f.seek(SeekFrom::Start(4)).is_err());
        assert!(f.seek(SeekFrom::End(1)).is_err());
        assert_eq!(f.seek(SeekFrom::End(0)).unwrap(), 3);
        let mut buf = [0u8; 2];
        assert_eq!(f.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn failed_seek_keeps_position() {
        let mut f = file("abc");
        f.seek(SeekFrom::Start(2)).unwrap();
        assert!(f.seek(SeekFrom::Current(5)).is_err());
        assert_eq!(f.position(), 2);
    }

    #[test]
    fn relative_seek() {
        let mut f = file("abcdef");
        f.seek(SeekFrom::Start(1)).unwrap();
        assert_eq!(f.seek(SeekFrom::Current(2)).unwrap(), 3);
        assert_eq!(f.seek(SeekFrom::End(-6)).unwrap(), 0);
    }

    #[test]
    fn read_at_is_stateless() {
        let f = file("abcdef");
        let mut buf = [0u8; 3];
        assert_eq!(f.read_at(&mut buf, 2).unwrap(), 3);
        assert_eq!(&buf, b"cde");
        assert_eq!(f.position(), 0);
    }

    #[test]
    fn read_at_short_count_and_bounds() {
        let f = file("abc");
        let mut buf = [0u8; 8];
        assert_eq!(f.read_at(&mut buf, 1).unwrap(), 2);
        assert_eq!(f.read_at(&mut buf, 3).unwrap(), 0);
        assert!(matches!(
            f.read_at(&mut buf, 4),
            Err(FsError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn io_traits_work() {
        let mut f = file("hello");
        let mut s = String::new();
        Read::read_to_string(&mut f, &mut s).unwrap();
        assert_eq!(s, "hello");
        let err = Seek::seek(&mut f, SeekFrom::Current(-10)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn close_is_idempotent() {
        let mut f = file("x");
        assert!(f.close().is_ok());
        assert!(f.close().is_ok());
    }

    #[test]
    fn read_dir_paginates() {
        let mut d = dir(&["a", "b", "c"]);
        let names = |v: Vec<DirEntry>| v.into_iter().map(|e| e.name).collect::<Vec<_>>();
        assert_eq!(names(d.read_dir(2)), vec!["a", "b"]);
        assert_eq!(names(d.read_dir(2)), vec!["c"]);
        assert!(d.read_dir(2).is_empty());
        assert!(d.is_exhausted());
        assert!(d.read_dir(0).is_empty());
    }

    #[test]
    fn read_dir_zero_returns_rest() {
        let mut d = dir(&["a", "b", "c"]);
        d.read_dir(1);
        assert_eq!(d.read_dir(0).len(), 2);
    }

    #[test]
    fn read_on_directory_is_invalid() {
        let mut h = Handle::Dir(dir(&["a"]));
        let mut buf = [0u8; 1];
        assert!(matches!(
            h.read(&mut buf),
            Err(FsError::InvalidArgument { operation: "read", .. })
        ));
    }

    #[test]
    fn read_dir_on_file_is_not_a_directory() {
        let mut h = Handle::File(file("x"));
        assert!(matches!(h.read_dir(0), Err(FsError::NotADirectory { .. })));
    }
}

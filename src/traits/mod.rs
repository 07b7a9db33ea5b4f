//! # Filesystem Traits
//!
//! The read-only interface is deliberately small:
//!
//! ```text
//! OpenFs::open ──▶ Handle::File / Handle::Dir
//!        │
//!        └──▶ FsExt (blanket): stat, read_file, read_dir, walk, glob, sub
//! ```
//!
//! Implement [`OpenFs`] and every helper in [`FsExt`](crate::FsExt) comes for
//! free. Wrappers such as [`SubFs`](crate::SubFs) implement `OpenFs` too, so
//! they compose.
//!
//! ## Object Safety
//!
//! ```rust
//! use marshalfs::OpenFs;
//!
//! fn has_root(fs: &dyn OpenFs) -> bool {
//!     fs.open(".").is_ok()
//! }
//! ```

mod fs_open;

pub use fs_open::OpenFs;

//! # marshalfs
//!
//! A **read-only virtual filesystem** whose files are in-memory values,
//! serialized to bytes only when they are opened.
//!
//! Code written against a filesystem abstraction can be exercised in tests
//! (or fed from a database, a config object, an API) without touching disk.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use marshalfs::{FileSpec, FsExt, MarshalFs};
//!
//! // Code under test only knows about filesystems.
//! fn load_greeting<F: FsExt>(fs: &F) -> Result<String, marshalfs::FsError> {
//!     fs.read_to_string("config/greeting.txt")
//! }
//!
//! let fs = MarshalFs::new(|s: &String| Ok(s.clone().into_bytes()))
//!     .with_file("config/greeting.txt", FileSpec::object("hi".to_string()))
//!     .unwrap();
//!
//! assert_eq!(load_greeting(&fs).unwrap(), "hi");
//! // Parent directories exist without being declared.
//! assert!(fs.is_dir("config").unwrap());
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`MarshalFs`] | The filesystem: a locked [`PathTable`] plus a default marshal function |
//! | [`FileSpec`] | What a path is: a fixed value, a generator, or an explicit directory |
//! | [`PathTable`] | Flat mapping from path (or glob pattern) to [`FileSpec`] |
//! | [`OpenFs`] | The one primitive: `open(path)` |
//! | [`FsExt`] | Everything derived from `open`: stat, read, list, walk, glob, sub |
//! | [`FileHandle`] / [`DirHandle`] | Open cursors over content and listings |
//! | [`FsError`] | Error type with operation and path context |
//!
//! ---
//!
//! ## Paths
//!
//! Paths are `/`-separated and unrooted (`dir/file.json`); the root is `.`.
//! Malformed paths (`/abs`, `a//b`, `a/../b`, `dir/`) never resolve.
//! Directories need not be declared: any prefix of a table path is one.
//!
//! ## Generators
//!
//! A [`FileSpec::Generator`] is registered under a glob pattern and called
//! with the requested path on every open. `Ok(None)` means "no such file";
//! the path may still be a directory implied by deeper table paths.
//! When several patterns match, the first registered wins.
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`MarshalFs`] is `Send + Sync`. Opens share a read lock on the table;
//! [`write_file`](MarshalFs::write_file), [`remove`](MarshalFs::remove) and
//! [`replace_all`](MarshalFs::replace_all) take the write lock.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | JSON marshal functions in [`marshal`], `FsExtJson::read_json`, serde derives on [`Metadata`] |

// Private modules
mod error;
mod ext;
mod fs;
mod handle;
mod materialize;
mod resolve;
mod spec;
mod sub;
mod synth;
mod table;
mod traits;
mod types;

// Public modules
#[cfg(feature = "serde")]
pub mod marshal;
pub mod path;

// Public re-exports - error types
pub use error::{BoxError, FsError};

// Public re-exports - core types
pub use types::{DirEntry, FileMode, FileType, Metadata, Sys};

// Public re-exports - table and specs
pub use spec::{FileCommon, FileSpec, GenerateFn, MarshalFn};
pub use table::PathTable;

// Public re-exports - filesystem and handles
pub use fs::MarshalFs;
pub use handle::{DirHandle, FileHandle, Handle};

// Public re-exports - traits
pub use ext::FsExt;
pub use sub::SubFs;
pub use traits::OpenFs;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FsExtJson;

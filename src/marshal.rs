//! Ready-made marshal functions.
//!
//! Available when the `serde` feature is enabled.
//!
//! ```rust
//! use marshalfs::{marshal, FileSpec, FsExt, MarshalFs};
//!
//! let fs = MarshalFs::new(marshal::json)
//!     .with_file("list.json", FileSpec::object(vec![1, 2, 3]))
//!     .unwrap();
//! assert_eq!(fs.read_to_string("list.json").unwrap(), "[1,2,3]");
//! ```

use serde::Serialize;

use crate::error::BoxError;

/// Compact JSON.
pub fn json<V: Serialize>(value: &V) -> Result<Vec<u8>, BoxError> {
    Ok(serde_json::to_vec(value)?)
}

/// Pretty-printed JSON with 2-space indentation.
pub fn json_pretty<V: Serialize>(value: &V) -> Result<Vec<u8>, BoxError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

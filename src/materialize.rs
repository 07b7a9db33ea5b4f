//! Turning resolved values into bytes.

use std::sync::Arc;

use crate::spec::MarshalFn;
use crate::types::SizeFn;
use crate::FsError;

/// A resolved value paired with the marshal function that applies to it.
///
/// Nothing is encoded until [`bytes`](Self::bytes) is called.
pub(crate) struct Materializer<V> {
    value: Arc<V>,
    marshal: MarshalFn<V>,
}

impl<V: Send + Sync + 'static> Materializer<V> {
    /// Pick the per-file override if present, else the filesystem default.
    pub(crate) fn new(value: Arc<V>, file: Option<&MarshalFn<V>>, default: &MarshalFn<V>) -> Self {
        let marshal = Arc::clone(file.unwrap_or(default));
        Self { value, marshal }
    }

    /// Encode the value once.
    pub(crate) fn bytes(&self, operation: &'static str, path: &str) -> Result<Vec<u8>, FsError> {
        (self.marshal)(&self.value).map_err(|source| FsError::Encoding {
            operation,
            path: path.to_string(),
            source,
        })
    }

    /// A deferred size query that encodes on every call.
    pub(crate) fn into_size_fn(self, path: String) -> SizeFn {
        Arc::new(move || Ok(self.bytes("stat", &path)?.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;

    fn upper() -> MarshalFn<String> {
        Arc::new(|v: &String| Ok(v.to_uppercase().into_bytes()))
    }

    fn lower() -> MarshalFn<String> {
        Arc::new(|v: &String| Ok(v.to_lowercase().into_bytes()))
    }

    #[test]
    fn default_is_used_without_override() {
        let m = Materializer::new(Arc::new("Mixed".to_string()), None, &upper());
        assert_eq!(m.bytes("open", "f").unwrap(), b"MIXED");
    }

    #[test]
    fn override_wins() {
        let file = lower();
        let m = Materializer::new(Arc::new("Mixed".to_string()), Some(&file), &upper());
        assert_eq!(m.bytes("open", "f").unwrap(), b"mixed");
    }

    #[test]
    fn failure_is_wrapped_with_context() {
        let failing: MarshalFn<String> =
            Arc::new(|_: &String| -> Result<Vec<u8>, BoxError> { Err("cannot encode".into()) });
        let m = Materializer::new(Arc::new(String::new()), None, &failing);
        match m.bytes("open", "dir/f") {
            Err(FsError::Encoding {
                operation, path, ..
            }) => {
                assert_eq!(operation, "open");
                assert_eq!(path, "dir/f");
            }
            other => panic!("expected encoding error, got {other:?}"),
        }
    }

    #[test]
    fn size_fn_reports_encoded_length() {
        let m = Materializer::new(Arc::new("four".to_string()), None, &upper());
        let size = m.into_size_fn("f".into());
        assert_eq!(size().unwrap(), 4);
    }
}

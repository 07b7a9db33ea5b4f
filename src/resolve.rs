//! Path resolution against the table and its generator patterns.
//!
//! Order of precedence:
//!
//! 1. malformed paths are rejected outright
//! 2. an exact object or directory entry
//! 3. the first generator, in registration order, whose pattern matches
//! 4. a synthesized directory, if any table path lies beneath the name
//!
//! A generator that declines (`Ok(None)` or a not-found error) falls through
//! to step 4.
//!
//! The root is never handed to generators and always resolves to a directory.

use std::io;
use std::sync::Arc;

use log::{debug, warn};
use wax::Pattern;

use crate::error::BoxError;
use crate::path::{self, ROOT};
use crate::spec::FileCommon;
use crate::{FileSpec, FsError, PathTable};

/// What a path turned into.
pub(crate) enum Resolution<V> {
    /// A regular file backed by a value.
    File {
        value: Arc<V>,
        common: FileCommon<V>,
    },
    /// A directory, with explicit metadata when the table has an entry for it.
    Dir { common: Option<FileCommon<V>> },
}

/// Resolve `path` for `operation`.
///
/// Generators run here, under whatever lock the caller holds on `table`.
pub(crate) fn resolve<V>(
    table: &PathTable<V>,
    operation: &'static str,
    path: &str,
) -> Result<Resolution<V>, FsError> {
    if !path::is_valid(path) {
        return Err(FsError::invalid_path(operation, path));
    }

    match table.get(path) {
        Some(FileSpec::Object { value, common }) => {
            if let Some(descendant) = table.descendant_of(path) {
                warn!("{operation} {path}: file also has descendant {descendant}");
                return Err(FsError::PathConflict {
                    path: path.to_string(),
                    descendant: descendant.to_string(),
                });
            }
            return Ok(Resolution::File {
                value: Arc::clone(value),
                common: common.clone(),
            });
        }
        Some(FileSpec::Directory { common }) => {
            return Ok(Resolution::Dir {
                common: Some(common.clone()),
            });
        }
        // Generators live in their own key space.
        Some(FileSpec::Generator { .. }) | None => {}
    }

    if path != ROOT {
        let matched = table
            .generators()
            .find(|(_, glob, _)| glob.is_match(path));
        if let Some((pattern, _, spec)) = matched {
            debug!("{operation} {path}: generator {pattern:?} matched");
            match spec.resolve_value(path) {
                Ok(Some(value)) => {
                    return Ok(Resolution::File {
                        value,
                        common: spec.common().clone(),
                    });
                }
                // No such item: the path may still be a directory below.
                Ok(None) => {}
                Err(source) if is_not_found(&source) => {}
                Err(source) => {
                    return Err(FsError::Generator {
                        operation,
                        path: path.to_string(),
                        source,
                    });
                }
            }
        }
    }

    if path == ROOT || table.descendant_of(path).is_some() {
        debug!("{operation} {path}: synthesized directory");
        return Ok(Resolution::Dir { common: None });
    }
    Err(FsError::not_found(operation, path))
}

/// Generators may report a missing item with an `io::ErrorKind::NotFound`
/// error instead of `Ok(None)`.
fn is_not_found(err: &BoxError) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
        || err
            .downcast_ref::<FsError>()
            .is_some_and(FsError::is_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(v: &str) -> FileSpec<String> {
        FileSpec::object(v.to_string())
    }

    fn kind(r: Result<Resolution<String>, FsError>) -> &'static str {
        match r {
            Ok(Resolution::File { .. }) => "file",
            Ok(Resolution::Dir { common: Some(_) }) => "dir",
            Ok(Resolution::Dir { common: None }) => "synth",
            Err(FsError::NotFound { .. }) => "not-found",
            Err(FsError::InvalidPath { .. }) => "invalid",
            Err(FsError::Generator { .. }) => "generator-error",
            Err(FsError::PathConflict { .. }) => "conflict",
            Err(_) => "other",
        }
    }

    fn table() -> PathTable<String> {
        PathTable::from_specs([
            ("my/file", obj("v1")),
            ("your/file", obj("v2")),
            ("explicit", FileSpec::directory()),
        ])
        .unwrap()
    }

    #[test]
    fn malformed_paths_never_resolve() {
        let t = table();
        for p in ["", "/my/file", "my/file/", "my//file", "./my", "my/../your"] {
            assert_eq!(kind(resolve(&t, "open", p)), "invalid", "{p:?}");
        }
    }

    #[test]
    fn exact_file_and_synthesized_dirs() {
        let t = table();
        assert_eq!(kind(resolve(&t, "open", "my/file")), "file");
        assert_eq!(kind(resolve(&t, "open", "my")), "synth");
        assert_eq!(kind(resolve(&t, "open", ".")), "synth");
        assert_eq!(kind(resolve(&t, "open", "explicit")), "dir");
        assert_eq!(kind(resolve(&t, "open", "m")), "not-found");
        assert_eq!(kind(resolve(&t, "open", "my/file/x")), "not-found");
    }

    #[test]
    fn root_exists_for_empty_table() {
        let t: PathTable<String> = PathTable::new();
        assert_eq!(kind(resolve(&t, "open", ".")), "synth");
    }

    #[test]
    fn generator_outcomes() {
        let mut t: PathTable<String> = PathTable::new();
        t.insert(
            "*.json",
            FileSpec::generator(|p: &str| match p {
                "b.json" => Ok(Some("bananas".to_string())),
                "broken.json" => Err("backend down".into()),
                "gone.json" => Err(io::Error::from(io::ErrorKind::NotFound).into()),
                _ => Ok(None),
            }),
        )
        .unwrap();
        assert_eq!(kind(resolve(&t, "open", "b.json")), "file");
        assert_eq!(kind(resolve(&t, "open", "z.json")), "not-found");
        assert_eq!(kind(resolve(&t, "open", "gone.json")), "not-found");
        assert_eq!(kind(resolve(&t, "open", "broken.json")), "generator-error");
        assert_eq!(kind(resolve(&t, "open", "dir/b.json")), "not-found");
    }

    #[test]
    fn exact_entry_beats_generator() {
        let mut t = PathTable::new();
        t.insert("*", FileSpec::generator(|_| Ok(None))).unwrap();
        t.insert("a", obj("a")).unwrap();
        assert_eq!(kind(resolve(&t, "open", "a")), "file");
        assert_eq!(kind(resolve(&t, "open", "b")), "not-found");
    }

    #[test]
    fn first_registered_generator_wins() {
        let mut t = PathTable::new();
        t.insert("*.txt", FileSpec::generator(|_| Ok(Some("first".to_string()))))
            .unwrap();
        t.insert("a.*", FileSpec::generator(|_| Ok(Some("second".to_string()))))
            .unwrap();
        match resolve(&t, "open", "a.txt") {
            Ok(Resolution::File { value, .. }) => assert_eq!(*value, "first"),
            _ => panic!("expected a file"),
        }
    }

    #[test]
    fn declined_generator_falls_back_to_synthesized_dir() {
        let mut t = PathTable::new();
        t.insert("my/file", obj("v1")).unwrap();
        t.insert(
            "*",
            FileSpec::generator(|p: &str| match p {
                "gen" => Ok(Some("g".to_string())),
                "gone" => Err(io::Error::from(io::ErrorKind::NotFound).into()),
                _ => Ok(None),
            }),
        )
        .unwrap();
        assert_eq!(kind(resolve(&t, "open", "my")), "synth");
        assert_eq!(kind(resolve(&t, "open", "gen")), "file");
        assert_eq!(kind(resolve(&t, "open", "gone")), "not-found");
        assert_eq!(kind(resolve(&t, "open", "other")), "not-found");
    }

    #[test]
    fn generated_file_beats_synthesized_dir() {
        let mut t = PathTable::new();
        t.insert("d/f", obj("f")).unwrap();
        t.insert("*", FileSpec::generator(|_| Ok(Some("g".to_string()))))
            .unwrap();
        assert_eq!(kind(resolve(&t, "open", "d")), "file");
    }

    #[test]
    fn root_is_never_generated() {
        let mut t = PathTable::new();
        t.insert("*", FileSpec::generator(|_| Ok(Some("x".to_string()))))
            .unwrap();
        assert_eq!(kind(resolve(&t, "open", ".")), "synth");
    }

    #[test]
    fn deferred_conflict_surfaces_on_open() {
        let mut t = PathTable::new();
        t.insert("a/b", obj("b")).unwrap();
        t.insert("a/b/c", obj("c")).unwrap();
        assert_eq!(kind(resolve(&t, "open", "a/b")), "conflict");
        assert_eq!(kind(resolve(&t, "open", "a/b/c")), "file");
    }
}

//! Directory listings built from path prefixes.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::SystemTime;

use crate::materialize::Materializer;
use crate::path::{self, ROOT, SEPARATOR};
use crate::spec::MarshalFn;
use crate::{DirEntry, FileMode, FileSpec, PathTable};

/// Sorted children of `dir`.
///
/// Table paths directly under `dir` become entries carrying their own
/// metadata. Deeper paths collapse into one synthesized directory per
/// distinct next segment. A direct child shadows a synthesized directory of
/// the same name. Synthesized directories carry zero-value metadata: the
/// directory bit with no permissions and the Unix epoch as modification time.
/// Nothing is marshalled here: file sizes stay lazy.
pub(crate) fn list_children<V: Send + Sync + 'static>(
    table: &PathTable<V>,
    dir: &str,
    default_marshal: &MarshalFn<V>,
) -> Vec<DirEntry> {
    let mut list = Vec::new();
    let mut need = BTreeSet::new();

    for (key, spec) in table.paths() {
        let rest = if dir == ROOT {
            if key == ROOT {
                continue;
            }
            key
        } else {
            match key
                .strip_prefix(dir)
                .and_then(|r| r.strip_prefix(SEPARATOR))
            {
                Some(rest) => rest,
                None => continue,
            }
        };

        match rest.find(SEPARATOR) {
            Some(i) => {
                need.insert(&rest[..i]);
            }
            None => list.push(child_entry(key, rest, spec, default_marshal)),
        }
    }

    for entry in &list {
        need.remove(entry.name.as_str());
    }
    for name in need {
        list.push(DirEntry::dir(
            name.to_string(),
            path::join(dir, name),
            FileMode::synthesized_dir(),
            SystemTime::UNIX_EPOCH,
            None,
        ));
    }

    list.sort_by(|a, b| a.name.cmp(&b.name));
    list
}

fn child_entry<V: Send + Sync + 'static>(
    key: &str,
    name: &str,
    spec: &FileSpec<V>,
    default_marshal: &MarshalFn<V>,
) -> DirEntry {
    let common = spec.common();
    match spec {
        FileSpec::Object { value, .. } => {
            let materializer =
                Materializer::new(Arc::clone(value), common.marshaller(), default_marshal);
            DirEntry::file(
                name.to_string(),
                key.to_string(),
                spec.mode(),
                common.modified(),
                common.sys().cloned(),
                materializer.into_size_fn(key.to_string()),
            )
        }
        _ => DirEntry::dir(
            name.to_string(),
            key.to_string(),
            spec.mode(),
            common.modified(),
            common.sys().cloned(),
        ),
    }
}

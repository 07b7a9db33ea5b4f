//! Path syntax for the virtual tree.
//!
//! Paths are `/`-separated, relative, and unrooted: `dir/file.json`.
//! The root is spelled [`ROOT`]. Empty segments, `.` and `..` segments,
//! leading slashes and trailing slashes are all rejected.

/// The root directory.
pub const ROOT: &str = ".";

/// Path separator.
pub const SEPARATOR: char = '/';

/// Returns `true` if `path` is a well-formed path name.
///
/// # Example
///
/// ```rust
/// use marshalfs::path::is_valid;
///
/// assert!(is_valid("."));
/// assert!(is_valid("config/app.json"));
/// assert!(!is_valid("/etc/passwd"));
/// assert!(!is_valid("a/../b"));
/// assert!(!is_valid("dir/"));
/// ```
pub fn is_valid(path: &str) -> bool {
    if path == ROOT {
        return true;
    }
    !path.is_empty()
        && path
            .split(SEPARATOR)
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Last segment of `path` (`.` for the root).
pub fn base_name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Join a directory and a child name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        name.to_string()
    } else {
        format!("{dir}{SEPARATOR}{name}")
    }
}

/// Every strict ancestor of `path`, nearest first, excluding the root.
pub(crate) fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.char_indices()
        .rev()
        .filter(|&(_, c)| c == SEPARATOR)
        .map(move |(i, _)| &path[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_paths() {
        for p in [".", "a", "a/b", "a/b/c.json", "..a", "a.b/c", "a/.hidden"] {
            assert!(is_valid(p), "{p} should be valid");
        }
    }

    #[test]
    fn invalid_paths() {
        for p in ["", "/", "/a", "a/", "a//b", "./a", "a/.", "a/..", "../a", "a/./b"] {
            assert!(!is_valid(p), "{p:?} should be invalid");
        }
    }

    #[test]
    fn base_name_of_paths() {
        assert_eq!(base_name("."), ".");
        assert_eq!(base_name("file"), "file");
        assert_eq!(base_name("a/b/file.json"), "file.json");
    }

    #[test]
    fn join_handles_root() {
        assert_eq!(join(".", "a"), "a");
        assert_eq!(join("a/b", "c"), "a/b/c");
    }

    #[test]
    fn ancestors_nearest_first() {
        let got: Vec<_> = ancestors("a/b/c").collect();
        assert_eq!(got, vec!["a/b", "a"]);
        assert_eq!(ancestors("top").count(), 0);
    }
}

//! Implementation-file extension handling and logical name derivation.

use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;

/// Append `extension` unless the identifier already carries it.
pub fn with_extension(id: &str, extension: &str) -> String {
    if extension.is_empty() || id.ends_with(extension) {
        id.to_string()
    } else {
        format!("{id}{extension}")
    }
}

/// Drop a trailing `extension` from a name.
pub fn strip_extension<'a>(name: &'a str, extension: &str) -> &'a str {
    if extension.is_empty() {
        return name;
    }
    name.strip_suffix(extension).unwrap_or(name)
}

/// Logical module name for a resolved file: its root-relative path with
/// `/` separators and without the implementation extension.
///
/// Files outside `root` have no root-relative name; `None` is returned and
/// the caller falls back to the rewritten identifier.
pub fn module_name(path: &Path, root: &Path, extension: &str) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<&str> = relative
        .components()
        .map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if segments.is_empty() {
        return None;
    }
    let joined = segments.join("/");
    Some(strip_extension(&joined, extension).to_string())
}

/// Join a base-relative identifier (with extension) under `base`.
pub fn file_under(base: &Path, id: &str) -> PathBuf {
    base.join(id.trim_start_matches('/')).clean()
}

//! Identifier classification and URL-style identifier arithmetic.

/// Separator between a plugin name and its resource.
pub const PLUGIN_SEPARATOR: char = '!';

/// Syntactic category of a module identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `//host/...` or `scheme:...`; never a local file.
    External,
    /// `/...`, resolved against the project root.
    Absolute,
    /// `./...` or `../...`, resolved against the requester.
    Relative,
    /// Anything else: resolved against `baseUrl` or the entry document.
    Bare,
}

/// Split `plugin!resource` into its halves.
///
/// Identifiers without a plugin prefix come back as `(None, specifier)`.
pub fn split_plugin(specifier: &str) -> (Option<&str>, &str) {
    match specifier.split_once(PLUGIN_SEPARATOR) {
        Some((plugin, resource)) if !plugin.is_empty() => (Some(plugin), resource),
        _ => (None, specifier),
    }
}

/// Check whether an identifier points outside the local project.
pub fn is_external(specifier: &str) -> bool {
    if specifier.starts_with("//") {
        return true;
    }
    // Single-letter schemes are Windows drive letters, not URLs
    match specifier.split_once(':') {
        Some((scheme, _)) => {
            scheme.len() > 1
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Bare identifiers carry no path syntax and are not URLs.
pub fn is_bare(specifier: &str) -> bool {
    !specifier.starts_with('/') && !specifier.starts_with('.') && !is_external(specifier)
}

pub fn classify(specifier: &str) -> SpecifierKind {
    if is_external(specifier) {
        SpecifierKind::External
    } else if specifier.starts_with('/') {
        SpecifierKind::Absolute
    } else if specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
    {
        SpecifierKind::Relative
    } else {
        SpecifierKind::Bare
    }
}

/// Push path segments onto `out`, folding `.` and `..`.
///
/// A `..` that would climb above the start is kept when the identifier is
/// not rooted, mirroring how loaders treat `../x` relative to a bare base.
fn push_segments<'a>(out: &mut Vec<&'a str>, rooted: bool, segments: impl Iterator<Item = &'a str>) {
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ if rooted => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
}

/// Resolve `relative` against the module id `base`, URL style: the last
/// segment of `base` is dropped before joining.
///
/// `url_join("app/main", "./util")` is `"app/util"`.
pub fn url_join(base: &str, relative: &str) -> String {
    let rooted = base.starts_with('/');
    let mut segments = Vec::new();
    let mut base_segments: Vec<&str> = base.split('/').collect();
    base_segments.pop();
    push_segments(&mut segments, rooted, base_segments.into_iter());
    push_segments(&mut segments, rooted, relative.split('/'));

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Prefix `id` with the directory-like `base` (a `baseUrl`), folding dot
/// segments. `join_ids("public", "src/app")` is `"public/src/app"`.
pub fn join_ids(base: &str, id: &str) -> String {
    if is_external(base) {
        return format!("{}/{}", base.trim_end_matches('/'), id);
    }
    let rooted = base.starts_with('/');
    let mut segments = Vec::new();
    push_segments(&mut segments, rooted, base.split('/'));
    push_segments(&mut segments, rooted, id.split('/'));

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plugin() {
        assert_eq!(split_plugin("text!tpl/a.html"), (Some("text"), "tpl/a.html"));
        assert_eq!(split_plugin("test!module"), (Some("test"), "module"));
        assert_eq!(split_plugin("app/main"), (None, "app/main"));
        assert_eq!(split_plugin("!odd"), (None, "!odd"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("//cdn.example.com/x.js"), SpecifierKind::External);
        assert_eq!(classify("https://cdn.example.com/x.js"), SpecifierKind::External);
        assert_eq!(classify("/js/app"), SpecifierKind::Absolute);
        assert_eq!(classify("./lib/module1"), SpecifierKind::Relative);
        assert_eq!(classify("../common"), SpecifierKind::Relative);
        assert_eq!(classify("app/widget"), SpecifierKind::Bare);
        assert_eq!(classify("jquery"), SpecifierKind::Bare);
        assert_eq!(classify("C:/js/app"), SpecifierKind::Bare);
    }

    #[test]
    fn test_is_bare() {
        assert!(is_bare("app/widget"));
        assert!(!is_bare("./widget"));
        assert!(!is_bare("/widget"));
        assert!(!is_bare("http://x/widget"));
    }

    #[test]
    fn test_url_join() {
        assert_eq!(url_join("app/main", "./util"), "app/util");
        assert_eq!(url_join("app/views/main", "../models/user"), "app/models/user");
        assert_eq!(url_join("main", "./util"), "util");
        assert_eq!(url_join("main", "../util"), "../util");
        assert_eq!(url_join("/abs/main", "../../util"), "/util");
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids("public", "src/app/widget"), "public/src/app/widget");
        assert_eq!(join_ids("public/", "src/app/widget"), "public/src/app/widget");
        assert_eq!(join_ids("js/lib", "../app/main"), "js/app/main");
        assert_eq!(join_ids("/js", "app"), "/js/app");
        assert_eq!(join_ids("./js", "app"), "js/app");
        assert_eq!(
            join_ids("https://cdn.example.com/js/", "app"),
            "https://cdn.example.com/js/app"
        );
    }
}

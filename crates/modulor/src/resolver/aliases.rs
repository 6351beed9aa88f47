//! `map`, `paths` and `baseUrl` rewriting of module identifiers.

use crate::config::{LoaderConfig, MAP_WILDCARD};

use super::algorithm::{is_bare, join_ids};

/// Apply the `map` table: a substitution listed under the requester's own
/// name (or declared id) wins over one listed under the `*` wildcard.
pub fn apply_map(id: &str, contexts: &[&str], config: &LoaderConfig) -> Option<String> {
    contexts
        .iter()
        .copied()
        .chain(std::iter::once(MAP_WILDCARD))
        .filter_map(|context| config.map_for(context))
        .find_map(|table| table.get(id).cloned())
}

/// Apply `paths`: replace the longest alias that equals `id` or prefixes it
/// at a segment boundary.
pub fn apply_paths(id: &str, config: &LoaderConfig) -> Option<String> {
    config.paths().iter().find_map(|(alias, target)| {
        if id == alias {
            Some(target.clone())
        } else {
            id.strip_prefix(alias.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| format!("{}/{}", target.trim_end_matches('/'), rest))
        }
    })
}

/// Apply `baseUrl` to an identifier that should be base-relative.
///
/// Bare identifiers always are; identifiers produced by a `paths` alias are
/// too, even when the alias target starts with `../`.
pub fn apply_base_url(id: &str, config: &LoaderConfig, from_paths: bool) -> Option<String> {
    let base = config.base_url()?;
    if is_bare(id) || (from_paths && id.starts_with('.')) {
        Some(join_ids(base, id))
    } else {
        None
    }
}

/// Run `paths` then `baseUrl` over an identifier.
pub fn rewrite_base_relative(id: &str, config: &LoaderConfig) -> String {
    let aliased = apply_paths(id, config);
    let from_paths = aliased.is_some();
    let id = aliased.unwrap_or_else(|| id.to_string());
    apply_base_url(&id, config, from_paths).unwrap_or(id)
}

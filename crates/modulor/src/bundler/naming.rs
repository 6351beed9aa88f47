//! Name rewriting for the loader optimizer shape.

use crate::config::LoaderConfig;
use crate::resolver::strip_extension;

/// Express `name` relative to `base`, both `/`-separated module ids.
///
/// `relative_id("js", "js/app/main")` is `"app/main"`;
/// `relative_id("js/lib", "js/app/main")` is `"../app/main"`.
pub(crate) fn relative_id(base: &str, name: &str) -> String {
    let base: Vec<&str> = segments(base);
    let target: Vec<&str> = segments(name);
    let common = base
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = std::iter::repeat_n("..", base.len() - common).collect();
    out.extend(&target[common..]);
    out.join("/")
}

fn segments(id: &str) -> Vec<&str> {
    id.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// Rewrite a graph name into the id the loader optimizer expects: without
/// extension, relative to `baseUrl`, and through a reverse `paths` lookup.
pub(crate) fn loader_module_id(name: &str, config: Option<&LoaderConfig>, extension: &str) -> String {
    let name = strip_extension(name, extension);
    let Some(config) = config else {
        return name.to_string();
    };

    let id = match config.base_url() {
        Some(base) => relative_id(base, name),
        None => name.to_string(),
    };
    // Longest `paths` target that equals the id or prefixes it at a
    // segment boundary is folded back into its alias.
    config
        .paths()
        .iter()
        .filter_map(|(alias, target)| {
            let target = target.trim_end_matches('/');
            if id == target {
                return Some((target.len(), alias.clone()));
            }
            id.strip_prefix(target)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|rest| (target.len(), format!("{alias}/{rest}")))
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, aliased)| aliased)
        .unwrap_or(id)
}

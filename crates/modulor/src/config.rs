//! Configuration types: the run-wide loader configuration captured from
//! source, and the options that drive a collection run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default file extension appended to resolved module identifiers.
pub const DEFAULT_EXTENSION: &str = ".js";

/// Default maximum number of graph nodes (DoS protection).
pub const DEFAULT_MAX_MODULES: usize = 100_000;

/// Maximum file size in bytes (10 MB).
///
/// Larger files are reported as unreadable instead of being parsed.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Wildcard context in a `map` table, applied to every requester.
pub const MAP_WILDCARD: &str = "*";

/// Loader configuration reflected from a `require.config({...})` call.
///
/// Captured once per run from the first file where it is statically found
/// and immutable afterwards. The raw reflected object is kept verbatim so
/// the named-loader manifest can echo every literal option; `map`, `paths`
/// and `baseUrl` get typed views for resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoaderConfig {
    raw: Map<String, Value>,
    map: BTreeMap<String, BTreeMap<String, String>>,
    /// Path aliases sorted by descending key length (longest prefix wins).
    paths: Vec<(String, String)>,
    base_url: Option<String>,
}

impl LoaderConfig {
    pub fn from_object(raw: Map<String, Value>) -> Self {
        let map = raw
            .get("map")
            .and_then(Value::as_object)
            .map(|contexts| {
                contexts
                    .iter()
                    .filter_map(|(context, table)| {
                        let table = table.as_object()?;
                        let table = table
                            .iter()
                            .filter_map(|(from, to)| Some((from.clone(), to.as_str()?.to_string())))
                            .collect();
                        Some((context.clone(), table))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut paths: Vec<(String, String)> = raw
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|(alias, target)| {
                        // Fallback lists use their first entry
                        let target = match target {
                            Value::String(s) => s.clone(),
                            Value::Array(items) => items.iter().find_map(Value::as_str)?.to_string(),
                            _ => return None,
                        };
                        Some((alias.clone(), target))
                    })
                    .collect()
            })
            .unwrap_or_default();
        paths.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let base_url = raw
            .get("baseUrl")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            raw,
            map,
            paths,
            base_url,
        }
    }

    /// The reflected object exactly as captured.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Path aliases, longest alias first.
    pub fn paths(&self) -> &[(String, String)] {
        &self.paths
    }

    /// Substitution table for a requester context.
    pub fn map_for(&self, context: &str) -> Option<&BTreeMap<String, String>> {
        self.map.get(context)
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Options that drive a collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectorOptions {
    /// Extension appended to resolved identifiers.
    pub extension: String,

    /// Globals that name the loader (`require`, `requirejs`).
    pub loader_globals: Vec<String>,

    /// Module declaration function name.
    pub define_name: String,

    /// Whether to collect dependency identifiers from nested calls.
    pub find_nested_dependencies: bool,

    /// Maximum number of nodes in the registry (DoS protection).
    pub max_modules: usize,

    /// Files larger than this are treated as unreadable.
    pub max_file_size: u64,

    /// Project root for descriptors that carry an empty root.
    pub cwd: Option<PathBuf>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            loader_globals: vec!["require".to_string(), "requirejs".to_string()],
            define_name: "define".to_string(),
            find_nested_dependencies: true,
            max_modules: DEFAULT_MAX_MODULES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            cwd: None,
        }
    }
}

impl CollectorOptions {
    pub fn is_loader_global(&self, name: &str) -> bool {
        self.loader_globals.iter().any(|g| g == name)
    }
}

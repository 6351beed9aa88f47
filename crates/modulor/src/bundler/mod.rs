//! Bundle inference over a settled file graph.
//!
//! Runs once, after collection, and never mutates the graph:
//!
//! 1. **Common bundle**: scripts with more than one parent whose first
//!    parent is a script are merged into one shared bundle, named after the
//!    one whose earliest parent was registered first.
//! 2. **Entry bundles**: scripts with exactly one parent, a markup entry,
//!    each get a bundle holding their transitive closure minus the common
//!    bundle's modules.
//! 3. **Exclusion**: every bundle after the first excludes the common one.
//! 4. **Shape**: plain `{ bundles, paths }`, or the loader's optimizer
//!    configuration when a loader library was detected.

mod manifest;
mod naming;

pub use manifest::{Bundle, LoaderManifest, LoaderModule, Manifest, PlainManifest};

use indexmap::IndexMap;
use tracing::debug;

use crate::collector::ModuleSystem;
use crate::config::{DEFAULT_EXTENSION, LoaderConfig};
use crate::graph::{FileGraph, FileId, FileNode};

/// Common bundle plus entry bundles, before shaping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundlePlan {
    pub common: Option<Bundle>,
    pub entries: Vec<Bundle>,
}

impl BundlePlan {
    /// Emission order: common first, then entries.
    pub fn into_bundles(self) -> Vec<Bundle> {
        self.common.into_iter().chain(self.entries).collect()
    }
}

/// Infers bundles from a settled graph.
#[derive(Debug, Clone)]
pub struct BundleInferencer {
    extension: String,
}

impl Default for BundleInferencer {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl BundleInferencer {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Split the graph into a common bundle and one bundle per entry
    /// script. Entry bundles follow registry order.
    ///
    /// `loader_file` is left out of the entry bundles.
    pub fn plan(&self, graph: &FileGraph, loader_file: Option<FileId>) -> BundlePlan {
        let nodes = graph.nodes();
        let is_script = |id: FileId| nodes.get(id.index()).is_some_and(FileNode::is_script);
        let is_markup = |id: FileId| nodes.get(id.index()).is_some_and(FileNode::is_markup);

        // Earliest parent first, then registration order
        let mut shared: Vec<(usize, &FileNode)> = nodes
            .iter()
            .filter(|node| node.is_script())
            .filter_map(|node| {
                let parents = graph.parents(node.id);
                if parents.len() > 1 && is_script(parents[0]) {
                    let earliest = parents.iter().map(|parent| parent.index()).min()?;
                    Some((earliest, node))
                } else {
                    None
                }
            })
            .collect();
        shared.sort_by_key(|(earliest, node)| (*earliest, node.id.index()));
        let shared: Vec<&FileNode> = shared.into_iter().map(|(_, node)| node).collect();

        let common = shared.split_first().map(|(first, rest)| {
            let mut bundle = Bundle::new(first.name.clone());
            for node in rest {
                push_unique(&mut bundle.include, &node.name, &first.name);
            }
            bundle
        });

        let mut entries = Vec::new();
        for node in &nodes {
            if !node.is_script() || Some(node.id) == loader_file {
                continue;
            }
            let parents = graph.parents(node.id);
            if parents.len() != 1 || !is_markup(parents[0]) {
                continue;
            }

            let mut bundle = Bundle::new(node.name.clone());
            for name in graph.names(&graph.flatten_dependencies(node.id)) {
                if common.as_ref().is_some_and(|c| c.contains(&name)) {
                    continue;
                }
                push_unique(&mut bundle.include, &name, &node.name);
            }
            bundle.exclude = common.as_ref().map(|c| c.name.clone());
            entries.push(bundle);
        }

        debug!(
            entries = entries.len(),
            common = common.as_ref().map(|c| c.name.as_str()),
            "planned bundles"
        );
        BundlePlan { common, entries }
    }

    /// Plan bundles and shape them for `system`.
    pub fn infer(
        &self,
        graph: &FileGraph,
        system: ModuleSystem,
        loader_file: Option<FileId>,
        configuration: Option<&LoaderConfig>,
    ) -> Manifest {
        let loader_file = match system {
            ModuleSystem::NamedLoader => loader_file,
            ModuleSystem::Plain => None,
        };
        let plan = self.plan(graph, loader_file);
        match system {
            ModuleSystem::Plain => Manifest::Plain(plain_manifest(plan)),
            ModuleSystem::NamedLoader => {
                Manifest::NamedLoader(self.loader_manifest(plan.into_bundles(), configuration))
            }
        }
    }

    fn loader_manifest(
        &self,
        bundles: Vec<Bundle>,
        configuration: Option<&LoaderConfig>,
    ) -> LoaderManifest {
        let rename = |name: &str| naming::loader_module_id(name, configuration, &self.extension);

        let mut raw = configuration.map(|c| c.raw().clone()).unwrap_or_default();
        raw.remove("modules");

        let modules = bundles
            .iter()
            .map(|bundle| LoaderModule {
                name: rename(&bundle.name),
                include: bundle.include.iter().map(|n| rename(n)).collect(),
                exclude: bundle.exclude.iter().map(|n| rename(n)).collect(),
            })
            .collect();

        LoaderManifest {
            configuration: raw,
            modules,
        }
    }
}

/// Every module shipped inside an entry bundle points at that bundle.
fn plain_manifest(plan: BundlePlan) -> PlainManifest {
    let mut paths = IndexMap::new();
    for bundle in &plan.entries {
        for member in &bundle.include {
            paths
                .entry(member.clone())
                .or_insert_with(|| bundle.name.clone());
        }
    }
    PlainManifest {
        bundles: plan.into_bundles(),
        paths,
    }
}

fn push_unique(list: &mut Vec<String>, name: &str, owner: &str) {
    if name != owner && !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use crate::bundler::Manifest;
use crate::collector::ModuleSystem;
use crate::config::LoaderConfig;
use crate::diagnostics::Diagnostic;
use crate::graph::{FileGraph, FileNode, GraphStatistics};

#[derive(Debug)]
pub struct AnalysisResult {
    pub manifest: Manifest,
    pub graph: FileGraph,
    pub module_system: ModuleSystem,
    /// Run-wide loader configuration, if one was found in source.
    pub configuration: Option<Arc<LoaderConfig>>,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: GraphStatistics,
}

impl AnalysisResult {
    /// Check whether the run finished without any diagnostic.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Node with the given logical name.
    pub fn node(&self, name: &str) -> Option<FileNode> {
        self.graph.nodes().into_iter().find(|node| node.name == name)
    }

    /// Logical names of the dependencies of `name`, in discovery order.
    pub fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.node(name)
            .map(|node| self.graph.names(&self.graph.dependencies(node.id)))
            .unwrap_or_default()
    }

    /// Logical names of the parents of `name`, in discovery order.
    pub fn parents_of(&self, name: &str) -> Vec<String> {
        self.node(name)
            .map(|node| self.graph.names(&self.graph.parents(node.id)))
            .unwrap_or_default()
    }

    /// Dependency cycles as module names; each starts and ends with the same
    /// module.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        self.graph
            .find_cycles()
            .iter()
            .map(|cycle| self.graph.names(cycle))
            .collect()
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Result")?;
        writeln!(f, "================")?;
        writeln!(f, "Module system: {:?}", self.module_system)?;
        writeln!(
            f,
            "Files: {} ({} scripts, {} documents)",
            self.stats.nodes, self.stats.scripts, self.stats.markup
        )?;
        writeln!(f, "Dependencies: {}", self.stats.edges)?;
        writeln!(
            f,
            "Plugins: {} ({} loaders)",
            self.stats.plugins, self.stats.loader_plugins
        )?;
        writeln!(f, "Bundles: {}", self.manifest.len())?;
        for name in self.manifest.bundle_names() {
            writeln!(f, "  - {}", name)?;
        }
        writeln!(f, "Diagnostics: {}", self.diagnostics.len())?;

        if !self.diagnostics.is_empty() {
            writeln!(f, "\nDiagnostics:")?;
            for diagnostic in &self.diagnostics {
                writeln!(f, "  - {}", diagnostic)?;
            }
        }

        Ok(())
    }
}

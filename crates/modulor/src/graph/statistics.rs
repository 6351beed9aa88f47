//! Graph-level statistics.

use serde::Serialize;

use super::FileGraph;

/// Summary counts over a settled graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub nodes: usize,
    pub scripts: usize,
    pub markup: usize,
    pub edges: usize,
    pub plugins: usize,
    pub loader_plugins: usize,
    pub settled: usize,
}

impl FileGraph {
    pub fn statistics(&self) -> GraphStatistics {
        let inner = self.inner.read();
        let mut stats = GraphStatistics {
            nodes: inner.nodes.len(),
            edges: inner.dependencies.iter().map(Vec::len).sum(),
            ..Default::default()
        };

        for node in &inner.nodes {
            if node.is_script() {
                stats.scripts += 1;
            } else {
                stats.markup += 1;
            }
            if node.plugin.is_plugin {
                stats.plugins += 1;
            }
            if node.plugin.is_loader_plugin {
                stats.loader_plugins += 1;
            }
            if node.state.is_settled() {
                stats.settled += 1;
            }
        }

        stats
    }
}

//! Traversal methods for FileGraph.

use std::collections::VecDeque;

use rustc_hash::FxHashSet as HashSet;

use super::{FileGraph, FileId};

impl FileGraph {
    /// Nearest markup ancestor of `id`, walking back references breadth-first.
    ///
    /// A markup node is its own entry ancestor.
    pub fn entry_ancestor(&self, id: FileId) -> Option<FileId> {
        let inner = self.inner.read();
        let mut visited = HashSet::default();
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let node = inner.nodes.get(current.index())?;
            if node.is_markup() {
                return Some(current);
            }
            queue.extend(inner.parents[current.index()].iter().copied());
        }

        None
    }

    /// Transitive dependency closure of `id` in depth-first discovery order.
    ///
    /// Each node appears once; `id` itself is never part of its own closure,
    /// even when reachable through a cycle.
    pub fn flatten_dependencies(&self, id: FileId) -> Vec<FileId> {
        let inner = self.inner.read();
        let mut visited = HashSet::default();
        visited.insert(id);
        let mut closure = Vec::new();
        let mut stack: Vec<FileId> = inner.dependencies[id.index()].iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            closure.push(current);
            stack.extend(inner.dependencies[current.index()].iter().rev().copied());
        }

        closure
    }

    /// Returns true if `from` depends on `to` (directly or transitively).
    pub fn depends_on(&self, from: FileId, to: FileId) -> bool {
        from == to || self.flatten_dependencies(from).contains(&to)
    }

    /// Elementary cycles reachable in the graph, one per back edge found by
    /// a depth-first search. Each cycle starts and ends with the same node.
    pub fn find_cycles(&self) -> Vec<Vec<FileId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let inner = self.inner.read();
        let mut marks = vec![Mark::Unvisited; inner.nodes.len()];
        let mut cycles = Vec::new();

        for start in 0..inner.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            // (node, next dependency index to explore)
            let mut stack: Vec<(FileId, usize)> = vec![(FileId(start as u32), 0)];
            marks[start] = Mark::OnStack;

            while let Some((node, next)) = stack.last().copied() {
                let deps = &inner.dependencies[node.index()];
                if next == deps.len() {
                    marks[node.index()] = Mark::Done;
                    stack.pop();
                    continue;
                }
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let dep = deps[next];
                match marks[dep.index()] {
                    Mark::Unvisited => {
                        marks[dep.index()] = Mark::OnStack;
                        stack.push((dep, 0));
                    }
                    Mark::OnStack => {
                        let from = stack.iter().position(|(n, _)| *n == dep).unwrap_or(0);
                        let mut cycle: Vec<FileId> = stack[from..].iter().map(|(n, _)| *n).collect();
                        cycle.push(dep);
                        cycles.push(cycle);
                    }
                    Mark::Done => {}
                }
            }
        }

        cycles
    }

    /// Module names for a list of ids, in order.
    pub fn names(&self, ids: &[FileId]) -> Vec<String> {
        let inner = self.inner.read();
        ids.iter()
            .filter_map(|id| inner.nodes.get(id.index()).map(|n| n.name.clone()))
            .collect()
    }
}

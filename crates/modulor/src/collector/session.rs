//! Per-run session context shared by every collector task.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::config::{CollectorOptions, LoaderConfig};
use crate::diagnostics::Diagnostic;
use crate::graph::{FileGraph, FileId, NodeState};
use crate::resolver::ModuleResolver;
use crate::runtime::Runtime;

/// Module system detected for the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleSystem {
    /// No loader library seen; emit the plain bundle shape.
    #[default]
    Plain,
    /// A loader library (require.js) was seen; emit the loader's own
    /// optimizer configuration shape.
    NamedLoader,
}

#[derive(Debug, Default)]
struct SystemSlot {
    kind: ModuleSystem,
    loader_file: Option<FileId>,
}

/// Run-wide mutable state.
///
/// The registry (inside [`FileGraph`]) and the configuration slot are the
/// only state tasks race on; each is a short critical section that is never
/// held across an await.
#[derive(Debug)]
pub(crate) struct Session {
    pub runtime: Arc<dyn Runtime>,
    pub options: CollectorOptions,
    pub resolver: ModuleResolver,
    pub graph: FileGraph,
    /// Root used for descriptors that carry an empty root.
    pub default_root: PathBuf,
    config: RwLock<Option<Arc<LoaderConfig>>>,
    system: RwLock<SystemSlot>,
    diagnostics: Mutex<Vec<Diagnostic>>,
    limit_reported: AtomicBool,
    progress: Mutex<HashMap<FileId, watch::Sender<NodeState>>>,
}

impl Session {
    pub fn new(runtime: Arc<dyn Runtime>, options: CollectorOptions) -> Self {
        let default_root = options
            .cwd
            .clone()
            .or_else(|| runtime.get_cwd().ok())
            .unwrap_or_default();
        Self {
            resolver: ModuleResolver::new(options.extension.clone()),
            runtime,
            options,
            graph: FileGraph::new(),
            default_root,
            config: RwLock::new(None),
            system: RwLock::new(SystemSlot::default()),
            diagnostics: Mutex::new(Vec::new()),
            limit_reported: AtomicBool::new(false),
            progress: Mutex::new(HashMap::default()),
        }
    }

    pub fn config(&self) -> Option<Arc<LoaderConfig>> {
        self.config.read().clone()
    }

    /// Store the run-wide configuration unless one was already captured.
    ///
    /// Returns true when `raw` became the run's configuration.
    pub fn capture_config(&self, id: FileId, raw: Map<String, Value>) -> bool {
        let mut slot = self.config.write();
        if slot.is_some() {
            return false;
        }
        let config = Arc::new(LoaderConfig::from_object(raw));
        self.graph.attach_configuration(id, Arc::clone(&config));
        *slot = Some(config);
        true
    }

    /// Record `id` as the loader library. The first one wins.
    pub fn detect_loader(&self, id: FileId) -> bool {
        let mut system = self.system.write();
        if system.loader_file.is_some() {
            return false;
        }
        system.kind = ModuleSystem::NamedLoader;
        system.loader_file = Some(id);
        true
    }

    pub fn module_system(&self) -> ModuleSystem {
        self.system.read().kind
    }

    pub fn loader_file(&self) -> Option<FileId> {
        self.system.read().loader_file
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "collector diagnostic");
        self.diagnostics.lock().push(diagnostic);
    }

    /// Report the registry limit, once per run.
    pub fn report_limit(&self) {
        if !self.limit_reported.swap(true, Ordering::Relaxed) {
            self.report(Diagnostic::TooManyModules {
                max: self.options.max_modules,
            });
        }
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    /// Move `id` to `state` and wake anyone waiting on it.
    pub fn advance(&self, id: FileId, state: NodeState) {
        let mut progress = self.progress.lock();
        self.graph.set_state(id, state);
        progress
            .entry(id)
            .or_insert_with(|| watch::channel(state).0)
            .send_replace(state);
        tracing::trace!(node = %id, ?state, "state transition");
    }

    /// Wait until `id` has reached at least `state`.
    pub async fn reached(&self, id: FileId, state: NodeState) {
        let mut rx = {
            let mut progress = self.progress.lock();
            let current = self.graph.state(id).unwrap_or(NodeState::Settled);
            progress
                .entry(id)
                .or_insert_with(|| watch::channel(current).0)
                .subscribe()
        };
        // A closed channel means the run is being torn down; nothing to wait for.
        let _ = rx.wait_for(|current| *current >= state).await;
    }
}

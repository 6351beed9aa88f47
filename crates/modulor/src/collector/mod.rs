//! Dependency collector: grows the file graph from script descriptors.
//!
//! Each newly registered script is settled by its own task, which walks the
//! node through
//! `Discovered → Reading → Parsed → ResolvingDirect → ResolvingNested →
//! ResolvingPlugins → Settled`.
//!
//! Within a wave, identifiers are resolved and registered synchronously in
//! syntactic order, so edges and registry order are deterministic. Only the
//! first discoverer of a node spawns a task for it; everyone else merges a
//! parent edge and moves on. Each wave joins all of its tasks, and waits for
//! every module it merely linked to be parsed, before the next wave starts.

mod session;

pub use session::ModuleSystem;
pub(crate) use session::Session;

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::config::{CollectorOptions, LoaderConfig};
use crate::detector::{self, Detection, PluginKind};
use crate::diagnostics::Diagnostic;
use crate::file::{ContentKind, FileDescriptor};
use crate::graph::{Discovery, FileGraph, FileId, FileNode, NewNode, NodeState};
use crate::resolver::{
    RequestContext, Resolution, SpecifierKind, classify, file_under, split_plugin, url_join,
};
use crate::runtime::Runtime;
use crate::{Error, Result};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type Tasks = JoinSet<Result<()>>;

/// Outcome of scheduling one wave.
#[derive(Debug, Default)]
struct Wave {
    /// Every module the wave linked to, new or already registered.
    reached: Vec<FileId>,
    /// `plugin!resource` references, for the plugin wave.
    plugins: Vec<PluginRef>,
}

/// A `plugin!resource` reference found among direct dependencies.
#[derive(Debug, Clone)]
struct PluginRef {
    plugin: FileId,
    /// File that wrote the reference; the resource resolves in its context.
    requester: FileId,
    resource: String,
}

/// Everything the collector produced once all tasks have settled.
#[derive(Debug)]
pub struct Collected {
    pub graph: FileGraph,
    pub configuration: Option<Arc<LoaderConfig>>,
    pub module_system: ModuleSystem,
    pub loader_file: Option<FileId>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Feeds file descriptors into a shared session and settles them.
pub struct DependencyCollector {
    session: Arc<Session>,
    tasks: Tasks,
}

impl DependencyCollector {
    pub fn new(runtime: Arc<dyn Runtime>, options: CollectorOptions) -> Self {
        Self {
            session: Arc::new(Session::new(runtime, options)),
            tasks: JoinSet::new(),
        }
    }

    /// Register one descriptor and start settling it.
    pub fn add(&mut self, descriptor: &FileDescriptor) {
        for id in self.register(descriptor) {
            self.tasks.spawn(settle(Arc::clone(&self.session), id));
        }
    }

    /// Register every descriptor before any of them starts settling, so
    /// input order alone fixes the registry order of entry scripts.
    pub fn add_all<'d>(&mut self, descriptors: impl IntoIterator<Item = &'d FileDescriptor>) {
        let ids: Vec<FileId> = descriptors
            .into_iter()
            .flat_map(|descriptor| self.register(descriptor))
            .collect();
        for id in ids {
            self.tasks.spawn(settle(Arc::clone(&self.session), id));
        }
    }

    /// Wait for every node to settle.
    pub async fn finish(mut self) -> Result<Collected> {
        join_wave(&mut self.tasks).await?;
        let session = &self.session;
        debug!(nodes = session.graph.len(), "collection finished");
        Ok(Collected {
            graph: session.graph.clone(),
            configuration: session.config(),
            module_system: session.module_system(),
            loader_file: session.loader_file(),
            diagnostics: session.take_diagnostics(),
        })
    }

    /// Register a top-level descriptor, returning newly seen scripts.
    fn register(&self, descriptor: &FileDescriptor) -> Vec<FileId> {
        let mut spawn = Vec::new();
        if descriptor.kind.is_script() {
            register_descriptor(&self.session, descriptor, &mut spawn);
        } else {
            self.session.report(Diagnostic::NonScriptInput {
                path: descriptor.full_path.clone(),
            });
        }
        spawn
    }
}

/// Register `descriptor` after its parents and link them to it.
///
/// Markup nodes settle on the spot; newly seen scripts are pushed onto
/// `spawn` for the caller to settle.
fn register_descriptor(
    session: &Session,
    descriptor: &FileDescriptor,
    spawn: &mut Vec<FileId>,
) -> Option<FileId> {
    let parents: Vec<FileId> = descriptor
        .parents
        .iter()
        .filter_map(|parent| register_descriptor(session, parent, spawn))
        .collect();

    let root = if descriptor.root.as_os_str().is_empty() {
        session.default_root.clone()
    } else {
        descriptor.root.clone()
    };
    let path = if descriptor.full_path.is_absolute() {
        descriptor.full_path.clone()
    } else {
        file_under(&root, &descriptor.full_path.to_string_lossy())
    };

    let discovery = session.graph.discover(
        NewNode {
            path,
            name: descriptor.name.clone(),
            root,
            kind: descriptor.kind,
        },
        parents.first().copied(),
        session.options.max_modules,
    );
    let id = match discovery {
        Discovery::Inserted(id) => {
            debug!(node = %id, name = %descriptor.name, kind = ?descriptor.kind, "registered input");
            if descriptor.kind.is_script() {
                spawn.push(id);
            } else {
                session.advance(id, NodeState::Settled);
            }
            id
        }
        Discovery::Existing(id) => id,
        Discovery::Rejected => {
            session.report_limit();
            return None;
        }
    };

    for parent in parents.iter().skip(1) {
        session.graph.link(*parent, id);
    }
    Some(id)
}

/// Walk one node through its state machine.
fn settle(session: Arc<Session>, id: FileId) -> BoxFuture<Result<()>> {
    Box::pin(async move {
        session.advance(id, NodeState::Reading);
        let Some(node) = session.graph.node(id) else {
            return Ok(());
        };

        let Some(source) = read_source(&session, &node).await else {
            session.advance(id, NodeState::Settled);
            return Ok(());
        };
        let detection = match detector::detect(&source, &session.options) {
            Ok(detection) => detection,
            Err(err) => {
                session.report(Diagnostic::UnparsableSource {
                    path: node.path.clone(),
                    reason: err.to_string(),
                });
                session.advance(id, NodeState::Settled);
                return Ok(());
            }
        };
        drop(source);
        absorb(&session, id, &detection);
        session.advance(id, NodeState::Parsed);

        let mut tasks = JoinSet::new();

        session.advance(id, NodeState::ResolvingDirect);
        let direct = resolve_wave(&session, id, &detection.direct, &mut tasks);
        close_wave(&session, &mut tasks, &direct.reached).await?;

        session.advance(id, NodeState::ResolvingNested);
        let nested = resolve_wave(&session, id, &detection.nested, &mut tasks);
        close_wave(&session, &mut tasks, &nested.reached).await?;

        session.advance(id, NodeState::ResolvingPlugins);
        for plugin in direct.plugins {
            resolve_plugin_target(&session, plugin, &mut tasks).await;
        }
        join_wave(&mut tasks).await?;

        session.advance(id, NodeState::Settled);
        debug!(
            node = %id,
            name = %node.name,
            dependencies = session.graph.dependencies(id).len(),
            "settled"
        );
        Ok(())
    })
}

async fn join_wave(tasks: &mut Tasks) -> Result<()> {
    while let Some(joined) = tasks.join_next().await {
        joined.map_err(|e| Error::Operation(format!("collector task failed: {e}")))??;
    }
    Ok(())
}

/// Join a wave's own tasks, then wait until every module it reached is at
/// least parsed.
///
/// Modules first discovered by another requester are not in `tasks`; their
/// configuration and named modules still have to be visible before the next
/// wave. Parsing never waits on anything, so this cannot deadlock on cycles.
async fn close_wave(session: &Session, tasks: &mut Tasks, reached: &[FileId]) -> Result<()> {
    join_wave(tasks).await?;
    for &id in reached {
        session.reached(id, NodeState::Parsed).await;
    }
    Ok(())
}

async fn read_source(session: &Session, node: &FileNode) -> Option<String> {
    let unreadable = |reason: String| Diagnostic::UnreadableFile {
        path: node.path.clone(),
        reason,
    };

    if !session.runtime.exists(&node.path) {
        session.report(unreadable("file not found".to_string()));
        return None;
    }
    let max = session.options.max_file_size;
    match session.runtime.metadata(&node.path).await {
        Ok(meta) if meta.size > max => {
            session.report(Diagnostic::FileTooLarge {
                path: node.path.clone(),
                size: meta.size,
                max,
            });
            return None;
        }
        Ok(_) => {}
        Err(err) => {
            session.report(unreadable(err.to_string()));
            return None;
        }
    }

    match session.runtime.read_file(&node.path).await {
        Ok(bytes) => {
            trace!(path = %node.path.display(), bytes = bytes.len(), "read source");
            match String::from_utf8(bytes) {
                Ok(source) => Some(source),
                Err(err) => {
                    session.report(Diagnostic::UnparsableSource {
                        path: node.path.clone(),
                        reason: format!("invalid UTF-8: {}", err.utf8_error()),
                    });
                    None
                }
            }
        }
        Err(err) => {
            session.report(unreadable(err.to_string()));
            None
        }
    }
}

/// Fold a detection into run-wide state: configuration, loader library,
/// named modules and plugin classification.
fn absorb(session: &Session, id: FileId, detection: &Detection) {
    if let Some(raw) = &detection.config {
        if session.capture_config(id, raw.clone()) {
            debug!(node = %id, "captured loader configuration");
        }
    }
    if detection.is_loader_library && session.detect_loader(id) {
        debug!(node = %id, "detected loader library");
    }
    for name in &detection.named_modules {
        if !session.graph.declare_name(name, id) {
            trace!(node = %id, name = %name, "named module already registered");
        }
    }
    session.graph.set_plugin_kind(id, detection.plugin_kind);
}

fn entry_dir(session: &Session, id: FileId) -> Option<PathBuf> {
    let entry = session.graph.entry_ancestor(id)?;
    session.graph.node(entry).map(|node| node.dir().to_path_buf())
}

/// Resolve and register one wave of identifiers requested by `id`.
fn resolve_wave(
    session: &Arc<Session>,
    id: FileId,
    specifiers: &[String],
    tasks: &mut Tasks,
) -> Wave {
    let mut wave = Wave::default();
    if specifiers.is_empty() {
        return wave;
    }
    let Some(node) = session.graph.node(id) else {
        return wave;
    };
    let entry_dir = entry_dir(session, id);
    let config = session.config();
    let ctx = RequestContext::for_node(&node, entry_dir.as_deref());

    for specifier in specifiers {
        let (plugin, resource) = split_plugin(specifier);
        let target = plugin.unwrap_or(specifier.as_str());
        let Some(target_id) =
            resolve_dependency(session, id, &ctx, target, config.as_deref(), tasks)
        else {
            continue;
        };
        wave.reached.push(target_id);
        if plugin.is_some() {
            session.graph.mark_plugin(target_id);
            wave.plugins.push(PluginRef {
                plugin: target_id,
                requester: id,
                resource: resource.to_string(),
            });
        }
    }
    wave
}

/// Identity registered through a named `define`, tried before the
/// filesystem.
fn named_module(session: &Session, ctx: &RequestContext<'_>, specifier: &str) -> Option<FileId> {
    match classify(specifier) {
        SpecifierKind::Bare => session.graph.lookup_name(specifier),
        SpecifierKind::Relative => {
            let declared = ctx.declared_id?;
            session.graph.lookup_name(&url_join(declared, specifier))
        }
        _ => None,
    }
}

/// Resolve `specifier` for `parent`, link the edge and spawn a settle task
/// when the target is new.
fn resolve_dependency(
    session: &Arc<Session>,
    parent: FileId,
    ctx: &RequestContext<'_>,
    specifier: &str,
    config: Option<&LoaderConfig>,
    tasks: &mut Tasks,
) -> Option<FileId> {
    if let Some(id) = named_module(session, ctx, specifier) {
        session.graph.link(parent, id);
        trace!(specifier, node = %id, "resolved named module");
        return Some(id);
    }

    match session.resolver.resolve(ctx, specifier, config) {
        Resolution::Local(module) => {
            let discovery = session.graph.discover(
                NewNode {
                    path: module.path,
                    name: module.name,
                    root: ctx.root.to_path_buf(),
                    kind: ContentKind::Script,
                },
                Some(parent),
                session.options.max_modules,
            );
            match discovery {
                Discovery::Inserted(id) => {
                    trace!(specifier, node = %id, "discovered module");
                    tasks.spawn(settle(Arc::clone(session), id));
                    Some(id)
                }
                Discovery::Existing(id) => {
                    trace!(specifier, node = %id, "module already registered");
                    Some(id)
                }
                Discovery::Rejected => {
                    session.report_limit();
                    None
                }
            }
        }
        Resolution::External(url) => {
            session.report(Diagnostic::UnresolvableModule {
                specifier: specifier.to_string(),
                from: ctx.path.to_path_buf(),
                reason: format!("external URL {url}"),
            });
            None
        }
        Resolution::Unresolved { specifier, reason } => {
            session.report(Diagnostic::UnresolvableModule {
                specifier,
                from: ctx.path.to_path_buf(),
                reason,
            });
            None
        }
    }
}

/// Add the load-time dependency of a loader plugin: its resource, resolved
/// as the requester would resolve it but parented to the plugin file.
async fn resolve_plugin_target(session: &Arc<Session>, plugin: PluginRef, tasks: &mut Tasks) {
    // Classification is known once the plugin itself is parsed
    session.reached(plugin.plugin, NodeState::Parsed).await;

    let Some(node) = session.graph.node(plugin.plugin) else {
        return;
    };
    if node.plugin_kind != PluginKind::Loader {
        trace!(plugin = %node.name, kind = %node.plugin_kind, "plugin adds no dependency");
        return;
    }
    if plugin.resource.is_empty() {
        return;
    }
    let Some(requester) = session.graph.node(plugin.requester) else {
        return;
    };

    let entry_dir = entry_dir(session, requester.id);
    let config = session.config();
    let ctx = RequestContext::for_node(&requester, entry_dir.as_deref());
    if let Some(target) =
        resolve_dependency(session, node.id, &ctx, &plugin.resource, config.as_deref(), tasks)
    {
        debug!(plugin = %node.name, resource = %plugin.resource, node = %target, "loader plugin target");
    }
}

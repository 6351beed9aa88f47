//! Entry API: collect a module graph from file descriptors and infer its
//! bundle manifest in one call.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::bundler::BundleInferencer;
use crate::collector::{Collected, DependencyCollector};
use crate::config::CollectorOptions;
use crate::file::FileDescriptor;
use crate::result::AnalysisResult;
use crate::runtime::{NativeRuntime, Runtime};
use crate::{Error, Result};

/// Typestate marker for an analyzer with no input yet.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured;

/// Typestate marker for an analyzer with at least one input descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Configured;

/// Module graph analyzer.
///
/// `analyze()` is only available once an input has been added; a stream of
/// descriptors can be analyzed from either state.
///
/// # Example
///
/// ```rust,no_run
/// use modulor::{Analyzer, FileDescriptor};
///
/// # async fn example() -> modulor::Result<()> {
/// let index = FileDescriptor::markup("www", "index.html");
/// let result = Analyzer::new()
///     .input(FileDescriptor::script("www", "main.js").with_parent(index))
///     .extension(".js")
///     .analyze()
///     .await?;
///
/// println!("{result}");
/// # Ok(())
/// # }
/// ```
pub struct Analyzer<State = Unconfigured> {
    inputs: Vec<FileDescriptor>,
    options: CollectorOptions,
    runtime: Option<Arc<dyn Runtime>>,
    _state: PhantomData<State>,
}

impl Analyzer<Unconfigured> {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            options: CollectorOptions::default(),
            runtime: None,
            _state: PhantomData,
        }
    }
}

impl Default for Analyzer<Unconfigured> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State> Analyzer<State> {
    fn transition<Next>(self) -> Analyzer<Next> {
        Analyzer {
            inputs: self.inputs,
            options: self.options,
            runtime: self.runtime,
            _state: PhantomData,
        }
    }

    /// Add one input descriptor.
    pub fn input(mut self, descriptor: FileDescriptor) -> Analyzer<Configured> {
        self.inputs.push(descriptor);
        self.transition()
    }

    /// Add several input descriptors, in order.
    pub fn inputs(
        mut self,
        descriptors: impl IntoIterator<Item = FileDescriptor>,
    ) -> Analyzer<Configured> {
        self.inputs.extend(descriptors);
        self.transition()
    }

    /// Replace every collector option at once.
    pub fn options(mut self, options: CollectorOptions) -> Self {
        self.options = options;
        self
    }

    /// Extension appended to resolved identifiers (default: `.js`).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.options.extension = extension.into();
        self
    }

    /// Globals that name the loader (default: `require`, `requirejs`).
    pub fn loader_globals(mut self, globals: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options.loader_globals = globals.into_iter().map(Into::into).collect();
        self
    }

    /// Module declaration function name (default: `define`).
    pub fn define_name(mut self, name: impl Into<String>) -> Self {
        self.options.define_name = name.into();
        self
    }

    /// Whether loader calls inside function bodies are followed (default: true).
    pub fn find_nested_dependencies(mut self, enabled: bool) -> Self {
        self.options.find_nested_dependencies = enabled;
        self
    }

    /// Set maximum number of files in the registry (DoS protection).
    ///
    /// Default: 100,000
    pub fn max_modules(mut self, max: usize) -> Self {
        self.options.max_modules = max;
        self
    }

    /// Files larger than this many bytes are reported and skipped.
    pub fn max_file_size(mut self, max: u64) -> Self {
        self.options.max_file_size = max;
        self
    }

    /// Set the runtime for filesystem operations.
    ///
    /// Defaults to [`NativeRuntime`].
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Project root for descriptors that carry an empty root.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(cwd.into());
        self
    }

    /// Analyze the configured inputs followed by every descriptor received
    /// on `descriptors`, until the sending side closes.
    pub async fn analyze_stream(
        self,
        mut descriptors: mpsc::Receiver<FileDescriptor>,
    ) -> Result<AnalysisResult> {
        let mut collector = self.collector()?;
        collector.add_all(&self.inputs);
        while let Some(descriptor) = descriptors.recv().await {
            collector.add(&descriptor);
        }
        let collected = collector.finish().await?;
        Ok(conclude(collected, &self.options))
    }

    fn collector(&self) -> Result<DependencyCollector> {
        validate(&self.options)?;
        let runtime = match &self.runtime {
            Some(runtime) => Arc::clone(runtime),
            None => Arc::new(NativeRuntime::new()),
        };
        Ok(DependencyCollector::new(runtime, self.options.clone()))
    }
}

impl Analyzer<Configured> {
    /// Collect the graph from the configured inputs and infer the manifest.
    pub async fn analyze(self) -> Result<AnalysisResult> {
        let mut collector = self.collector()?;
        collector.add_all(&self.inputs);
        let collected = collector.finish().await?;
        Ok(conclude(collected, &self.options))
    }
}

fn validate(options: &CollectorOptions) -> Result<()> {
    if options.extension.is_empty() {
        return Err(Error::InvalidConfig("extension must not be empty".into()));
    }
    if options.define_name.is_empty() {
        return Err(Error::InvalidConfig("define name must not be empty".into()));
    }
    if options.loader_globals.iter().any(String::is_empty) {
        return Err(Error::InvalidConfig("loader globals must not be empty".into()));
    }
    if options.max_modules == 0 {
        return Err(Error::InvalidConfig("max_modules must be at least 1".into()));
    }
    Ok(())
}

fn conclude(collected: Collected, options: &CollectorOptions) -> AnalysisResult {
    let Collected {
        graph,
        configuration,
        module_system,
        loader_file,
        diagnostics,
    } = collected;

    let manifest = BundleInferencer::new(options.extension.as_str()).infer(
        &graph,
        module_system,
        loader_file,
        configuration.as_deref(),
    );
    let stats = graph.statistics();
    info!(
        files = stats.nodes,
        bundles = manifest.len(),
        diagnostics = diagnostics.len(),
        system = ?module_system,
        "analysis complete"
    );

    AnalysisResult {
        manifest,
        graph,
        module_system,
        configuration,
        diagnostics,
        stats,
    }
}

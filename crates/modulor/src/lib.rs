#![cfg_attr(docsrs, feature(doc_cfg))]

//! # modulor
//!
//! Static AMD module graph discovery and bundle manifest inference.
//!
//! Given the scripts an external traversal stage found linked from entry
//! documents, modulor parses each script, follows every `define`/`require`
//! dependency through the loader's resolution rules, and derives a bundle
//! manifest from the finished graph: one shared bundle for modules reached
//! from several scripts, plus one bundle per entry script.
//!
//! Nothing is executed. Loader configuration (`require.config({...})`),
//! named modules and loader plugins are all recognised from the syntax tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Analyzer                           │
//! │   (typestate entry API, descriptors in, result out)      │
//! └────────────────────────┬─────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                 DependencyCollector                      │
//! │   (one settle task per file, direct → nested → plugin)   │
//! └──────┬──────────────────┬──────────────────┬─────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!  ┌───────────┐     ┌─────────────┐     ┌───────────┐
//!  │ detector  │     │  resolver   │     │ FileGraph │
//!  │ (oxc AST) │     │ (map/paths/ │     │ (arena +  │
//!  │           │     │  baseUrl)   │     │ registry) │
//!  └───────────┘     └─────────────┘     └─────┬─────┘
//!                                              │ settled
//!                                              ▼
//!                                   ┌────────────────────┐
//!                                   │  BundleInferencer  │
//!                                   │  (Manifest)        │
//!                                   └────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modulor::{Analyzer, FileDescriptor, Manifest};
//!
//! # async fn example() -> modulor::Result<()> {
//! let index = FileDescriptor::markup("www", "index.html");
//! let result = Analyzer::new()
//!     .input(FileDescriptor::script("www", "js/main.js").with_parent(index))
//!     .analyze()
//!     .await?;
//!
//! match &result.manifest {
//!     Manifest::Plain(plain) => println!("{} bundles", plain.bundles.len()),
//!     Manifest::NamedLoader(loader) => println!("{} modules", loader.modules.len()),
//! }
//! for diagnostic in &result.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `logging`: [`logging::init_logging`] and friends, backed by
//!   `tracing-subscriber`. Without it the crate only emits `tracing` events.
//! - `test-utils`: the in-memory [`test_utils::MemoryRuntime`].

pub mod analyzer;
pub mod bundler;
pub mod collector;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod file;
pub mod graph;
pub mod resolver;
pub mod result;
pub mod runtime;

#[cfg(feature = "logging")]
pub mod logging;

// Test utilities (available in test builds and when test-utils feature is enabled)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analyzer::{Analyzer, Configured, Unconfigured};
pub use bundler::{Bundle, BundleInferencer, LoaderManifest, LoaderModule, Manifest, PlainManifest};
pub use collector::{Collected, DependencyCollector, ModuleSystem};
pub use config::{CollectorOptions, LoaderConfig};
pub use detector::PluginKind;
pub use diagnostics::Diagnostic;
pub use file::{ContentKind, FileDescriptor};
pub use graph::{FileGraph, FileId, FileNode, GraphStatistics, NodeState};
pub use resolver::{ModuleResolver, Resolution};
pub use result::AnalysisResult;
pub use runtime::{FileMetadata, NativeRuntime, Runtime, RuntimeError, RuntimeResult};

#[cfg(feature = "logging")]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

/// Error types for modulor operations.
///
/// Problems with individual files are never errors; they surface as
/// [`Diagnostic`]s on the result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A collector task failed to complete.
    #[error("Operation error: {0}")]
    Operation(String),
}

/// Result type alias for modulor operations.
pub type Result<T> = std::result::Result<T, Error>;

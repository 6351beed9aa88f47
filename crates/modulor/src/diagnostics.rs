//! Non-fatal conditions reported during a run.
//!
//! Nothing in here aborts analysis: the affected node settles with zero
//! dependencies (or the edge is dropped) and the run carries on. Every
//! diagnostic is logged at `warn` when it is reported and returned with the
//! [`AnalysisResult`](crate::AnalysisResult).

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// File content could not be read.
    #[error("unreadable file {}: {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    /// File content is not valid script syntax.
    #[error("unparsable source {}: {reason}", path.display())]
    UnparsableSource { path: PathBuf, reason: String },

    /// Identifier has no local file: a bare id without an entry document,
    /// or an external URL.
    #[error("unresolvable module '{specifier}' from {}: {reason}", from.display())]
    UnresolvableModule {
        specifier: String,
        from: PathBuf,
        reason: String,
    },

    /// A non-script descriptor was fed to the collector.
    #[error("non-script input {} ignored", path.display())]
    NonScriptInput { path: PathBuf },

    /// Registry limit reached; further modules were dropped.
    #[error("too many modules: registry limit of {max} reached")]
    TooManyModules { max: usize },

    /// File exceeds the configured size limit and was not parsed.
    #[error("file {} is {size} bytes, limit is {max}", path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },
}

impl Diagnostic {
    /// Path of the file the diagnostic is about, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Diagnostic::UnreadableFile { path, .. }
            | Diagnostic::UnparsableSource { path, .. }
            | Diagnostic::NonScriptInput { path }
            | Diagnostic::FileTooLarge { path, .. } => Some(path),
            Diagnostic::UnresolvableModule { from, .. } => Some(from),
            Diagnostic::TooManyModules { .. } => None,
        }
    }
}

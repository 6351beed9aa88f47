//! Module resolution for AMD-style identifiers.
//!
//! Resolution is a pure function of the requesting file, the raw identifier
//! and the run-wide [`LoaderConfig`]. It never touches the filesystem: the
//! collector decides what to do with the resulting path (read it, or record
//! an unreadable node).
//!
//! Steps, in order:
//! 1. split `plugin!resource` and keep resolving the resource
//! 2. `map` substitution keyed by the requester's module id
//! 3. `paths` prefix aliasing
//! 4. `baseUrl` for bare identifiers
//! 5. classify (external / absolute / relative / bare) and join a path
//! 6. append the implementation extension

mod algorithm;
mod aliases;
mod extensions;

pub use algorithm::{
    PLUGIN_SEPARATOR, SpecifierKind, classify, is_bare, is_external, join_ids, split_plugin,
    url_join,
};
pub use aliases::{apply_base_url, apply_map, apply_paths, rewrite_base_relative};
pub use extensions::{file_under, module_name, strip_extension, with_extension};

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::LoaderConfig;
use crate::graph::FileNode;

/// Everything the resolver needs to know about the requesting file.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Requester's canonical path.
    pub path: &'a Path,
    /// Requester's logical name.
    pub name: &'a str,
    /// Module id from a named `define` in the requester, if any.
    pub declared_id: Option<&'a str>,
    /// Project root (target of `/...` identifiers).
    pub root: &'a Path,
    /// Directory of the nearest markup-entry ancestor.
    pub entry_dir: Option<&'a Path>,
}

impl<'a> RequestContext<'a> {
    pub fn for_node(node: &'a FileNode, entry_dir: Option<&'a Path>) -> Self {
        Self {
            path: &node.path,
            name: &node.name,
            declared_id: node.declared_id(),
            root: &node.root,
            entry_dir,
        }
    }

    fn dir(&self) -> &'a Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// A module identifier resolved to a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    /// Canonical full path, extension included.
    pub path: PathBuf,
    /// Logical name for the node created from this path.
    pub name: String,
    /// The identifier after `map`/`paths`/`baseUrl` rewriting.
    pub id: String,
}

/// Result of module resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Module resolved to a local file path.
    Local(ResolvedModule),

    /// Module lives outside the project (URL); skipped.
    External(String),

    /// Module could not be resolved to any path.
    Unresolved { specifier: String, reason: String },
}

impl Resolution {
    pub fn is_local(&self) -> bool {
        matches!(self, Resolution::Local(_))
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Resolution::External(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved { .. })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Local(module) => write!(f, "Local({})", module.path.display()),
            Resolution::External(url) => write!(f, "External({})", url),
            Resolution::Unresolved { specifier, .. } => write!(f, "Unresolved({})", specifier),
        }
    }
}

/// Module resolver for AMD identifiers.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    extension: String,
}

impl ModuleResolver {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Resolve `specifier` as requested from `ctx`.
    pub fn resolve(
        &self,
        ctx: &RequestContext<'_>,
        specifier: &str,
        config: Option<&LoaderConfig>,
    ) -> Resolution {
        let (_, resource) = split_plugin(specifier);

        let mut id = resource.to_string();
        if let Some(config) = config {
            let module_id = self.module_id(ctx, config);
            let contexts: Vec<&str> = module_id
                .as_deref()
                .into_iter()
                .chain(std::iter::once(ctx.name))
                .chain(ctx.declared_id)
                .collect();
            if let Some(mapped) = apply_map(&id, &contexts, config) {
                tracing::trace!(from = %id, to = %mapped, "map substitution");
                id = mapped;
            }
            id = rewrite_base_relative(&id, config);
        }

        // Relative ids inside a named module are relative to its module id,
        // which makes the joined result base-relative again.
        if classify(&id) == SpecifierKind::Relative {
            if let Some(declared) = ctx.declared_id.filter(|d| is_bare(d)) {
                let joined = url_join(declared, &id);
                id = match config {
                    Some(config) => rewrite_base_relative(&joined, config),
                    None => joined,
                };
            }
        }

        let file = with_extension(&id, &self.extension);
        let path = match classify(&id) {
            SpecifierKind::External => return Resolution::External(id),
            SpecifierKind::Absolute => file_under(ctx.root, &file),
            SpecifierKind::Relative => file_under(ctx.dir(), &file),
            SpecifierKind::Bare => match ctx.entry_dir {
                Some(entry_dir) => file_under(entry_dir, &file),
                None => {
                    return Resolution::Unresolved {
                        specifier: specifier.to_string(),
                        reason: format!(
                            "bare module '{}' has no entry document ancestor of {}",
                            id,
                            ctx.path.display()
                        ),
                    };
                }
            },
        };

        let name = module_name(&path, ctx.root, &self.extension)
            .unwrap_or_else(|| strip_extension(&id, &self.extension).to_string());
        tracing::trace!(specifier, path = %path.display(), "resolved module");

        Resolution::Local(ResolvedModule { path, name, id })
    }

    /// The requester's id relative to `baseUrl`, which is how `map` keys
    /// name modules. `None` when the requester lies outside the base
    /// directory or the base is a URL.
    fn module_id(&self, ctx: &RequestContext<'_>, config: &LoaderConfig) -> Option<String> {
        let base_dir = match config.base_url() {
            Some(base) if is_external(base) => return None,
            Some(base) if base.starts_with('/') => file_under(ctx.root, base),
            Some(base) => file_under(ctx.entry_dir?, base),
            None => ctx.entry_dir?.to_path_buf(),
        };
        module_name(ctx.path, &base_dir, &self.extension)
    }
}

impl Default for ModuleResolver {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EXTENSION)
    }
}

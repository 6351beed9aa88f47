//! Configuration and AST detection for AMD sources.
//!
//! [`detect`] parses one script with oxc and answers every question the
//! collector asks about a file in a single pass over the source:
//!
//! - is this the loader library itself?
//! - does it carry a static `require.config({...})`?
//! - which named modules does it declare?
//! - which dependencies are direct, which are nested?
//! - if it is used as a plugin, does it load or inline?
//!
//! Detection is synchronous and returns owned data; the allocator and AST
//! never outlive the call.

mod config;
mod loader;
mod plugin;
mod reflect;
mod visitor;

pub use plugin::PluginKind;

use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::CollectorOptions;

use visitor::AmdVisitor;

/// Pseudo-dependencies provided by the loader, never files.
pub const PSEUDO_DEPENDENCIES: [&str; 3] = ["require", "module", "exports"];

/// Everything detected in one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    /// Literal object passed to `<loaderGlobal>.config(...)`, if any.
    pub config: Option<Map<String, Value>>,
    /// Explicit ids from `define('id', ...)`, in source order.
    pub named_modules: Vec<String>,
    /// Dependency arrays of top-level `define`/`require` calls.
    pub direct: Vec<String>,
    /// Every other statically known dependency, minus `direct`.
    pub nested: Vec<String>,
    /// The file declares the loader's global bindings.
    pub is_loader_library: bool,
    /// Shape of the module's export when used as a plugin.
    pub plugin_kind: PluginKind,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetectError {
    #[error("{count} syntax error(s), first: {message}")]
    Parse { count: usize, message: String },
}

/// Parse `source` and run every detector over it.
pub fn detect(source: &str, options: &CollectorOptions) -> Result<Detection, DetectError> {
    let allocator = Allocator::default();
    let ParserReturn {
        program,
        errors,
        panicked,
        ..
    } = Parser::new(&allocator, source, SourceType::cjs()).parse();

    if panicked || !errors.is_empty() {
        let message = errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(DetectError::Parse {
            count: errors.len().max(1),
            message,
        });
    }

    let mut visitor = AmdVisitor::new(options);
    visitor.visit_program(&program);

    let direct = filter_dependencies(visitor.direct, &[]);
    let nested = if options.find_nested_dependencies {
        filter_dependencies(visitor.nested, &direct)
    } else {
        Vec::new()
    };

    Ok(Detection {
        config: config::find_config(&program, options),
        named_modules: dedup(visitor.names),
        direct,
        nested,
        is_loader_library: loader::declares_loader_globals(&program, options),
        plugin_kind: plugin::classify(&program, options),
    })
}

/// Drop pseudo-dependencies, duplicates and anything in `exclude`,
/// keeping first-seen order.
fn filter_dependencies(ids: Vec<String>, exclude: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if id.is_empty()
            || PSEUDO_DEPENDENCIES.contains(&id.as_str())
            || exclude.contains(&id)
            || out.contains(&id)
        {
            continue;
        }
        out.push(id);
    }
    out
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests;

//! Loader-library detection.

use oxc_ast::ast::{Program, Statement};

use crate::config::CollectorOptions;

/// A top-level declaration that introduces every loader global plus the
/// define function (`var requirejs, require, define;`) marks the loader
/// implementation itself.
pub(super) fn declares_loader_globals(program: &Program<'_>, options: &CollectorOptions) -> bool {
    program.body.iter().any(|stmt| {
        let Statement::VariableDeclaration(decl) = stmt else {
            return false;
        };
        let declared: Vec<&str> = decl
            .declarations
            .iter()
            .filter_map(|d| d.id.get_binding_identifier())
            .map(|ident| ident.name.as_str())
            .collect();
        declared.contains(&options.define_name.as_str())
            && options
                .loader_globals
                .iter()
                .all(|global| declared.contains(&global.as_str()))
    })
}

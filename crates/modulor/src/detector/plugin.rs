//! Loader plugin classification from a module's export shape.

use std::fmt;

use oxc_ast::ast::{
    AssignmentTarget, Expression, ObjectExpression, ObjectPropertyKind, Program, Statement,
};
use serde::{Deserialize, Serialize};

use crate::config::CollectorOptions;

use super::reflect::property_key;

/// What a module can do when referenced as `plugin!resource`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Exports neither `load` nor `write`.
    #[default]
    None,
    /// Exports `load`: resolves its resource at load time, which adds one
    /// dependency edge from the plugin to the resource.
    Loader,
    /// Exports `write`: inlines its resource at build time. Flagged only.
    Inliner,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PluginKind::None => "none",
            PluginKind::Loader => "loader",
            PluginKind::Inliner => "inliner",
        };
        f.write_str(s)
    }
}

/// Classify the object exported by the file's top-level `define` factory.
/// `write` wins over `load`.
pub(super) fn classify(program: &Program<'_>, options: &CollectorOptions) -> PluginKind {
    let Some(keys) = program.body.iter().find_map(|stmt| define_export(stmt, options)) else {
        return PluginKind::None;
    };

    if keys.iter().any(|k| k == "write") {
        PluginKind::Inliner
    } else if keys.iter().any(|k| k == "load") {
        PluginKind::Loader
    } else {
        PluginKind::None
    }
}

fn define_export(stmt: &Statement<'_>, options: &CollectorOptions) -> Option<Vec<String>> {
    let Statement::ExpressionStatement(stmt) = stmt else {
        return None;
    };
    let Expression::CallExpression(call) = stmt.expression.without_parentheses() else {
        return None;
    };
    match call.callee.without_parentheses() {
        Expression::Identifier(callee) if callee.name.as_str() == options.define_name => {}
        _ => return None,
    }
    let factory = call.arguments.last()?.as_expression()?;
    export_keys(factory.without_parentheses())
}

/// Property names of the value a factory exports: the factory itself when it
/// is an object literal, or what a function factory returns.
fn export_keys(expr: &Expression<'_>) -> Option<Vec<String>> {
    match expr {
        Expression::ObjectExpression(object) => Some(object_keys(object)),
        Expression::FunctionExpression(func) => returned_keys(&func.body.as_ref()?.statements),
        Expression::ArrowFunctionExpression(arrow) if arrow.expression => {
            match arrow.body.statements.first()? {
                Statement::ExpressionStatement(stmt) => match stmt.expression.without_parentheses() {
                    Expression::ObjectExpression(object) => Some(object_keys(object)),
                    _ => None,
                },
                _ => None,
            }
        }
        Expression::ArrowFunctionExpression(arrow) => returned_keys(&arrow.body.statements),
        _ => None,
    }
}

/// Keys of the first top-level `return` in a factory body. A returned
/// identifier is followed to its object-literal declaration and to
/// `name.key = ...` assignments in the same body.
fn returned_keys(statements: &[Statement<'_>]) -> Option<Vec<String>> {
    let returned = statements.iter().find_map(|stmt| match stmt {
        Statement::ReturnStatement(ret) => ret.argument.as_ref(),
        _ => None,
    })?;
    match returned.without_parentheses() {
        Expression::ObjectExpression(object) => Some(object_keys(object)),
        Expression::Identifier(ident) => Some(binding_keys(statements, ident.name.as_str())),
        _ => None,
    }
}

fn binding_keys(statements: &[Statement<'_>], name: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for stmt in statements {
        match stmt {
            Statement::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    let binds_name = declarator
                        .id
                        .get_binding_identifier()
                        .is_some_and(|id| id.name.as_str() == name);
                    if !binds_name {
                        continue;
                    }
                    if let Some(Expression::ObjectExpression(object)) =
                        declarator.init.as_ref().map(Expression::without_parentheses)
                    {
                        keys.extend(object_keys(object));
                    }
                }
            }
            Statement::ExpressionStatement(stmt) => {
                let Expression::AssignmentExpression(assign) = stmt.expression.without_parentheses()
                else {
                    continue;
                };
                if let AssignmentTarget::StaticMemberExpression(member) = &assign.left {
                    if matches!(&member.object, Expression::Identifier(object) if object.name.as_str() == name)
                    {
                        keys.push(member.property.name.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    keys
}

fn object_keys(object: &ObjectExpression<'_>) -> Vec<String> {
    object
        .properties
        .iter()
        .filter_map(|property| match property {
            ObjectPropertyKind::ObjectProperty(property) if !property.computed => {
                property_key(&property.key)
            }
            _ => None,
        })
        .collect()
}

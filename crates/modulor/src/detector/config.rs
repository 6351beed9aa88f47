//! Embedded `<loaderGlobal>.config({...})` extraction.

use oxc_ast::ast::{CallExpression, Expression, Program, Statement};
use oxc_ast_visit::{Visit, walk};
use serde_json::{Map, Value};

use crate::config::CollectorOptions;

use super::reflect::reflect_object;

/// Walk signal: once a configuration is found the rest of the tree is
/// skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct ConfigFinder<'o> {
    options: &'o CollectorOptions,
    flow: Flow,
    found: Option<Map<String, Value>>,
}

impl ConfigFinder<'_> {
    fn inspect(&self, call: &CallExpression<'_>) -> Option<Map<String, Value>> {
        let Expression::StaticMemberExpression(member) = call.callee.without_parentheses() else {
            return None;
        };
        let Expression::Identifier(object) = member.object.without_parentheses() else {
            return None;
        };
        if member.property.name.as_str() != "config"
            || !self.options.is_loader_global(object.name.as_str())
            || call.arguments.len() != 1
        {
            return None;
        }
        match call.arguments.first()?.as_expression()?.without_parentheses() {
            Expression::ObjectExpression(object) => Some(reflect_object(object)),
            _ => None,
        }
    }
}

impl<'a> Visit<'a> for ConfigFinder<'_> {
    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        if self.flow == Flow::Continue {
            walk::walk_statement(self, stmt);
        }
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if self.flow == Flow::Stop {
            return;
        }
        if let Some(config) = self.inspect(call) {
            self.found = Some(config);
            self.flow = Flow::Stop;
            return;
        }
        walk::walk_call_expression(self, call);
    }
}

/// First statically reflectable loader configuration in the program.
pub(super) fn find_config(
    program: &Program<'_>,
    options: &CollectorOptions,
) -> Option<Map<String, Value>> {
    let mut finder = ConfigFinder {
        options,
        flow: Flow::Continue,
        found: None,
    };
    finder.visit_program(program);
    finder.found
}

//! Deep call-expression walk collecting module declarations and
//! dependency identifiers.

use oxc_ast::ast::{
    Argument, ArrayExpression, ArrowFunctionExpression, CallExpression, Expression, Function,
};
use oxc_ast_visit::{Visit, walk};
use oxc_semantic::ScopeFlags;

use crate::config::CollectorOptions;

/// Collects define/require dependencies, splitting them by function depth.
///
/// Array dependencies of `define`/`require` calls outside any function are
/// direct. Everything else (calls inside factories, synchronous
/// `require('x')`) is nested.
pub(super) struct AmdVisitor<'o> {
    options: &'o CollectorOptions,
    depth: u32,
    pub names: Vec<String>,
    pub direct: Vec<String>,
    pub nested: Vec<String>,
}

impl<'o> AmdVisitor<'o> {
    pub fn new(options: &'o CollectorOptions) -> Self {
        Self {
            options,
            depth: 0,
            names: Vec::new(),
            direct: Vec::new(),
            nested: Vec::new(),
        }
    }

    fn record(&mut self, ids: Vec<String>, direct: bool) {
        if direct && self.depth == 0 {
            self.direct.extend(ids);
        } else {
            self.nested.extend(ids);
        }
    }

    fn inspect(&mut self, call: &CallExpression<'_>) {
        let Expression::Identifier(callee) = call.callee.without_parentheses() else {
            return;
        };
        let callee = callee.name.as_str();
        let args: Vec<&Expression<'_>> = call
            .arguments
            .iter()
            .filter_map(Argument::as_expression)
            .map(Expression::without_parentheses)
            .collect();

        if callee == self.options.define_name {
            // define(id?, deps?, factory)
            let mut rest = args.as_slice();
            if let Some((Expression::StringLiteral(id), tail)) = rest.split_first() {
                self.names.push(id.value.to_string());
                rest = tail;
            }
            if let Some(Expression::ArrayExpression(deps)) = rest.first() {
                self.record(string_elements(deps), true);
            }
        } else if self.options.is_loader_global(callee) {
            match args.first() {
                Some(Expression::ArrayExpression(deps)) => self.record(string_elements(deps), true),
                Some(Expression::StringLiteral(id)) => self.record(vec![id.value.to_string()], false),
                _ => {}
            }
        }
    }
}

/// String literal elements of an array; anything dynamic is skipped.
fn string_elements(array: &ArrayExpression<'_>) -> Vec<String> {
    array
        .elements
        .iter()
        .filter_map(|element| match element.as_expression()?.without_parentheses() {
            Expression::StringLiteral(lit) => Some(lit.value.to_string()),
            _ => None,
        })
        .collect()
}

impl<'a> Visit<'a> for AmdVisitor<'_> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        self.inspect(call);
        walk::walk_call_expression(self, call);
    }

    fn visit_function(&mut self, func: &Function<'a>, flags: ScopeFlags) {
        self.depth += 1;
        walk::walk_function(self, func, flags);
        self.depth -= 1;
    }

    fn visit_arrow_function_expression(&mut self, expr: &ArrowFunctionExpression<'a>) {
        self.depth += 1;
        walk::walk_arrow_function_expression(self, expr);
        self.depth -= 1;
    }
}

//! Reflect literal syntax into JSON values.
//!
//! Only literal keys and values survive. Computed keys, spreads, methods,
//! identifiers and calls are omitted rather than guessed.

use oxc_ast::ast::{Expression, ObjectExpression, ObjectPropertyKind, PropertyKey, PropertyKind};
use serde_json::{Map, Number, Value};

pub(super) fn reflect_object(object: &ObjectExpression<'_>) -> Map<String, Value> {
    let mut out = Map::new();
    for property in &object.properties {
        let ObjectPropertyKind::ObjectProperty(property) = property else {
            continue;
        };
        if property.computed || property.method || property.kind != PropertyKind::Init {
            continue;
        }
        let Some(key) = property_key(&property.key) else {
            continue;
        };
        if let Some(value) = reflect_value(&property.value) {
            out.insert(key, value);
        }
    }
    out
}

pub(super) fn property_key(key: &PropertyKey<'_>) -> Option<String> {
    match key {
        PropertyKey::StaticIdentifier(ident) => Some(ident.name.to_string()),
        PropertyKey::StringLiteral(lit) => Some(lit.value.to_string()),
        PropertyKey::NumericLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

pub(super) fn reflect_value(expr: &Expression<'_>) -> Option<Value> {
    match expr.without_parentheses() {
        Expression::StringLiteral(lit) => Some(Value::String(lit.value.to_string())),
        Expression::NumericLiteral(lit) => Some(number(lit.value)),
        Expression::BooleanLiteral(lit) => Some(Value::Bool(lit.value)),
        Expression::NullLiteral(_) => Some(Value::Null),
        Expression::ObjectExpression(object) => Some(Value::Object(reflect_object(object))),
        Expression::ArrayExpression(array) => Some(Value::Array(
            array
                .elements
                .iter()
                .filter_map(|element| reflect_value(element.as_expression()?))
                .collect(),
        )),
        _ => None,
    }
}

fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

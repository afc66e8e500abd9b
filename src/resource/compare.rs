//! Partial-match comparison
//!
//! `like` asks whether local data satisfies every field a template declares.
//! Extra local fields are ignored; scalars compare by their plain string form
//! so `1` matches `"1"`.

use super::query::plain_string;
use serde_json::{Map, Value};

/// The closed set of shapes a JSON value can take for matching purposes
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    Scalar(&'a Value),
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
}

impl<'a> Shape<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => Shape::Sequence(items),
            Value::Object(map) => Shape::Mapping(map),
            scalar => Shape::Scalar(scalar),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::Scalar(_) => "a scalar",
            Shape::Sequence(_) => "a sequence",
            Shape::Mapping(_) => "a mapping",
        }
    }
}

/// Does `data` satisfy every field declared in `template`?
pub fn recursive_like(template: &Map<String, Value>, data: &Map<String, Value>) -> bool {
    template
        .iter()
        .all(|(key, expected)| field_like(expected, data.get(key)))
}

fn field_like(expected: &Value, actual: Option<&Value>) -> bool {
    match Shape::of(expected) {
        Shape::Mapping(nested) => match actual.map(Shape::of) {
            Some(Shape::Mapping(local)) => recursive_like(nested, local),
            // An empty template mapping declares nothing to check
            _ => nested.is_empty(),
        },
        // Each template element needs some local element that matches it;
        // several template elements may be satisfied by the same local one.
        Shape::Sequence(items) if items.first().is_some_and(Value::is_object) => {
            match actual.map(Shape::of) {
                Some(Shape::Sequence(local)) => items
                    .iter()
                    .all(|item| local.iter().any(|candidate| element_like(item, candidate))),
                _ => false,
            }
        }
        _ => plain_string(expected) == actual.map(plain_string).unwrap_or_default(),
    }
}

fn element_like(expected: &Value, candidate: &Value) -> bool {
    match (Shape::of(expected), Shape::of(candidate)) {
        (Shape::Mapping(template), Shape::Mapping(local)) => recursive_like(template, local),
        (Shape::Mapping(_), _) => false,
        _ => plain_string(expected) == plain_string(candidate),
    }
}

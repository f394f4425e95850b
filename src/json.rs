//! Path-based accessors over untyped `serde_json::Value` trees.
//!
//! The DCC API embeds deeply nested, optional, and inconsistently shaped
//! substructures. Optional fields collapse any failure (absent key, explicit
//! null, wrong kind) to a caller-supplied default; required fields surface a
//! `FieldMissing` error carrying the dotted path.

use serde_json::Value;

use crate::error::MetaError;

#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

pub fn key(name: &str) -> Step<'_> {
    Step::Key(name)
}

pub fn idx(index: usize) -> Step<'static> {
    Step::Index(index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'v> {
    Found(&'v Value),
    Missing,
    WrongType,
}

impl<'v> Lookup<'v> {
    pub fn value(self) -> Option<&'v Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing | Lookup::WrongType => None,
        }
    }
}

/// Walks `path` from `node`. A null anywhere along the way counts as missing;
/// indexing into a non-array or keying into a non-object is a type mismatch.
pub fn lookup<'v>(node: &'v Value, path: &[Step<'_>]) -> Lookup<'v> {
    let mut current = node;
    for step in path {
        if current.is_null() {
            return Lookup::Missing;
        }
        match step {
            Step::Key(name) => match current.as_object() {
                Some(map) => match map.get(*name) {
                    Some(next) => current = next,
                    None => return Lookup::Missing,
                },
                None => return Lookup::WrongType,
            },
            Step::Index(index) => match current.as_array() {
                Some(items) => match items.get(*index) {
                    Some(next) => current = next,
                    None => return Lookup::Missing,
                },
                None => return Lookup::WrongType,
            },
        }
    }
    if current.is_null() {
        return Lookup::Missing;
    }
    Lookup::Found(current)
}

pub fn opt_str<'v>(node: &'v Value, path: &[Step<'_>]) -> Option<&'v str> {
    lookup(node, path).value().and_then(Value::as_str)
}

pub fn get_str(node: &Value, path: &[Step<'_>], default: &str) -> String {
    opt_str(node, path).unwrap_or(default).to_string()
}

pub fn opt_i64(node: &Value, path: &[Step<'_>]) -> Option<i64> {
    lookup(node, path).value().and_then(Value::as_i64)
}

pub fn get_i64(node: &Value, path: &[Step<'_>], default: i64) -> i64 {
    opt_i64(node, path).unwrap_or(default)
}

pub fn get_u64(node: &Value, path: &[Step<'_>], default: u64) -> u64 {
    lookup(node, path)
        .value()
        .and_then(Value::as_u64)
        .unwrap_or(default)
}

pub fn opt_array<'v>(node: &'v Value, path: &[Step<'_>]) -> Option<&'v [Value]> {
    lookup(node, path)
        .value()
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

pub fn require_str<'v>(node: &'v Value, path: &[Step<'_>]) -> Result<&'v str, MetaError> {
    opt_str(node, path).ok_or_else(|| MetaError::FieldMissing {
        path: dotted(path),
    })
}

pub fn require_array<'v>(node: &'v Value, path: &[Step<'_>]) -> Result<&'v [Value], MetaError> {
    opt_array(node, path).ok_or_else(|| MetaError::FieldMissing {
        path: dotted(path),
    })
}

pub fn dotted(path: &[Step<'_>]) -> String {
    let mut out = String::new();
    for step in path {
        match step {
            Step::Key(name) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
            }
            Step::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

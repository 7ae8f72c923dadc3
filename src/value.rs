//! The small tagged union of values a matched node can produce, and the merge rules used when
//! a pattern repeats or an `Either` branch goes unmatched.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A single bound value.
///
/// `Null` is the "nothing matched" state for a scalar (as opposed to `List(vec![])`, which is the
/// "nothing matched, but this name is plural" state).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
    Null,
}

impl Value {
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Bool(b) => !*b,
            Value::Int(n) => *n == 0,
            Value::Str(_) => false,
            Value::List(items) => items.is_empty(),
            Value::Null => true,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
            Value::Null => write!(f, "null"),
        }
    }
}

/// The final name -> value mapping produced by the value extractor.
///
/// A `BTreeMap` keeps key order stable (and thus extraction deterministic) without requiring
/// callers to care about hashing; option/command/argument name sets in a usage description are
/// small, so the O(log n) lookups are not a concern.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ValueMap(pub BTreeMap<String, Value>);

impl ValueMap {
    pub fn new() -> Self {
        ValueMap(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Merge `other` into `self` using the same key-collision rules the matcher applies when a
    /// `Unit`'s children (or an `Either`'s matched branch and its unmatched siblings) share a
    /// name. Ported from docpie's `Unit.get_value`/`Either.get_value` collision handling.
    pub fn merge_in(&mut self, other: ValueMap) {
        for (key, new_value) in other.0 {
            match self.0.remove(&key) {
                Some(old_value) => {
                    self.0.insert(key, merge_pair(old_value, new_value));
                }
                None => {
                    self.0.insert(key, new_value);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Merge two colliding values for the same name, following docpie's `Unit.get_value` rule: ints
/// sum, a `None`/int pairing sums treating `None` as zero, and everything else falls back to a
/// flattened list (dropping nulls, extending lists, appending scalars).
fn merge_pair(old: Value, new: Value) -> Value {
    match (&old, &new) {
        (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
        (Value::Int(a), Value::Null) => Value::Int(*a),
        (Value::Null, Value::Int(b)) => Value::Int(*b),
        (Value::Bool(a), Value::Bool(b)) => Value::Bool(*a || *b),
        _ => {
            let mut out = Vec::new();
            for v in [old, new] {
                flatten_into(v, &mut out);
            }
            Value::List(out)
        }
    }
}

fn flatten_into(v: Value, out: &mut Vec<String>) {
    match v {
        Value::Null => {}
        Value::List(items) => out.extend(items),
        Value::Str(s) => out.push(s),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Int(n) => out.push(n.to_string()),
    }
}

use std::fmt::{Display, Formatter};
use strum_macros::Display;

/// Type tag of a [`ScriptValue`], used in argument errors and log output.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Display)]
pub enum ValueKind {
    #[strum(serialize = "nil")]
    Nil,
    #[strum(serialize = "int")]
    Int,
    #[strum(serialize = "float")]
    Float,
    #[strum(serialize = "string")]
    Str,
    #[strum(serialize = "table")]
    Table,
    #[strum(serialize = "closure")]
    Closure,
}

/// A dynamically typed value living on the interpreter heap.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Nil,
    Int(i64),
    Float(f64),
    Str(String),
    Table(Table),
    /// Reference to a registered native closure by its global name.
    Closure(String),
}

impl ScriptValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ScriptValue::Nil => ValueKind::Nil,
            ScriptValue::Int(_) => ValueKind::Int,
            ScriptValue::Float(_) => ValueKind::Float,
            ScriptValue::Str(_) => ValueKind::Str,
            ScriptValue::Table(_) => ValueKind::Table,
            ScriptValue::Closure(_) => ValueKind::Closure,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        if let ScriptValue::Float(v) = self { Some(*v) } else { None }
    }

    pub fn as_int(&self) -> Option<i64> {
        if let ScriptValue::Int(v) = self { Some(*v) } else { None }
    }

    pub fn as_table(&self) -> Option<&Table> {
        if let ScriptValue::Table(t) = self { Some(t) } else { None }
    }

    /// Number of heap cells this value occupies: one for the value itself plus one per
    /// table slot, recursively.
    pub fn cells(&self) -> usize {
        match self {
            ScriptValue::Table(t) => 1 + t.iter().map(|(_, v)| 1 + v.cells()).sum::<usize>(),
            _ => 1,
        }
    }
}

impl Display for ScriptValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptValue::Nil => write!(f, "[nil]"),
            ScriptValue::Int(v) => write!(f, "{v}"),
            ScriptValue::Float(v) => write!(f, "{v:.6}"),
            ScriptValue::Str(v) => write!(f, "{v}"),
            ScriptValue::Table(t) if t.is_empty() => write!(f, "[empty table]"),
            ScriptValue::Table(t) => write!(f, "[table with {} elems]", t.len()),
            ScriptValue::Closure(name) => write!(f, "[n-closure @{name}]"),
        }
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self { ScriptValue::Float(value) }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self { ScriptValue::Int(value) }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self { ScriptValue::Int(i64::from(value)) }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self { ScriptValue::Str(value.to_string()) }
}

impl From<Table> for ScriptValue {
    fn from(value: Table) -> Self { ScriptValue::Table(value) }
}

/// String-keyed table preserving insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    entries: Vec<(String, ScriptValue)>,
}

impl Table {
    pub fn new() -> Self { Self::default() }

    /// Stores `value` under `key`, replacing an existing entry in place.
    pub fn put(&mut self, key: &str, value: ScriptValue) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.entries.iter().map(|(k, _)| k.as_str()) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScriptValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

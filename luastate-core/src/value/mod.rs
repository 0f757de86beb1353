//! Value models on both sides of the boundary
//!
//! [`RuntimeValue`] is an engine-independent snapshot of a Lua value.
//! [`HostValue`] is what the embedding application sees.

mod host;

pub use host::{HostArray, HostObject, HostValue, PropertyKey};

use std::fmt;

/// Deepest table nesting either side will convert
pub const MAX_NESTING_DEPTH: usize = 200;

/// Key/value pairs of a Lua table, in engine iteration order
pub type TableEntries = Vec<(RuntimeValue, RuntimeValue)>;

/// Snapshot of a Lua value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuntimeValue {
    /// `nil`
    #[default]
    Nil,

    /// Boolean value
    Boolean(bool),

    /// Integer subtype of number
    Integer(i64),

    /// Float subtype of number
    Number(f64),

    /// Byte string, not necessarily UTF-8
    String(Vec<u8>),

    /// Table with unique keys
    Table(TableEntries),

    /// Lua or native function
    Function,

    /// Userdata, light userdata or coroutine
    UserData,
}

impl RuntimeValue {
    /// Build a string value
    pub fn string(s: impl AsRef<[u8]>) -> Self {
        RuntimeValue::String(s.as_ref().to_vec())
    }

    /// Build a table from key/value pairs
    pub fn table<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<RuntimeValue>,
        V: Into<RuntimeValue>,
    {
        RuntimeValue::Table(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence table keyed `1..=n`
    pub fn sequence<V: Into<RuntimeValue>>(values: impl IntoIterator<Item = V>) -> Self {
        RuntimeValue::Table(
            values
                .into_iter()
                .zip(1i64..)
                .map(|(v, i)| (RuntimeValue::Integer(i), v.into()))
                .collect(),
        )
    }

    /// Lua type name
    pub fn type_name(&self) -> &'static str {
        match self {
            RuntimeValue::Nil => "nil",
            RuntimeValue::Boolean(_) => "boolean",
            RuntimeValue::Integer(_) | RuntimeValue::Number(_) => "number",
            RuntimeValue::String(_) => "string",
            RuntimeValue::Table(_) => "table",
            RuntimeValue::Function => "function",
            RuntimeValue::UserData => "userdata",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, RuntimeValue::Nil)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, RuntimeValue::Integer(_) | RuntimeValue::Number(_))
    }

    /// Whether the value may be used as a key on the host side
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            RuntimeValue::Boolean(_)
                | RuntimeValue::Integer(_)
                | RuntimeValue::Number(_)
                | RuntimeValue::String(_)
        )
    }

    /// Numeric value as a double, ignoring the integer subtype
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RuntimeValue::Integer(i) => Some(*i as f64),
            RuntimeValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer value of a number with no fractional part
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RuntimeValue::Integer(i) => Some(*i),
            RuntimeValue::Number(n)
                if n.is_finite()
                    && n.fract() == 0.0
                    && *n >= i64::MIN as f64
                    && *n < i64::MAX as f64 =>
            {
                Some(*n as i64)
            }
            _ => None,
        }
    }

    /// Entries of a table value
    pub fn as_table(&self) -> Option<&TableEntries> {
        match self {
            RuntimeValue::Table(entries) => Some(entries),
            _ => None,
        }
    }
}

impl From<bool> for RuntimeValue {
    fn from(b: bool) -> Self {
        RuntimeValue::Boolean(b)
    }
}

impl From<i64> for RuntimeValue {
    fn from(i: i64) -> Self {
        RuntimeValue::Integer(i)
    }
}

impl From<i32> for RuntimeValue {
    fn from(i: i32) -> Self {
        RuntimeValue::Integer(i64::from(i))
    }
}

impl From<f64> for RuntimeValue {
    fn from(n: f64) -> Self {
        RuntimeValue::Number(n)
    }
}

impl From<&str> for RuntimeValue {
    fn from(s: &str) -> Self {
        RuntimeValue::string(s)
    }
}

impl From<String> for RuntimeValue {
    fn from(s: String) -> Self {
        RuntimeValue::String(s.into_bytes())
    }
}

impl fmt::Display for RuntimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeValue::Nil => write!(f, "nil"),
            RuntimeValue::Boolean(b) => write!(f, "{}", b),
            RuntimeValue::Integer(i) => write!(f, "{}", i),
            RuntimeValue::Number(n) => write!(f, "{}", n),
            RuntimeValue::String(bytes) => write!(f, "{:?}", String::from_utf8_lossy(bytes)),
            RuntimeValue::Table(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "[{}] = {}", k, v)?;
                }
                write!(f, "}}")
            }
            RuntimeValue::Function => write!(f, "function"),
            RuntimeValue::UserData => write!(f, "userdata"),
        }
    }
}

#[cfg(test)]
#[path = "../value_tests.rs"]
mod tests;

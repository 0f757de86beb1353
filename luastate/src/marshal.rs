//! Conversion between Lua values and host values
//!
//! Tables become host arrays when they have at least one integer key in
//! `1..=2^32`. The array's length is the largest such key, positions
//! without a key are holes, and every other key becomes a named property:
//!
//! | Lua key                          | Property          |
//! |----------------------------------|-------------------|
//! | `0`                              | zero-index slot   |
//! | other integer (`-1`, `2^32 + 1`) | `"-1"`            |
//! | float (`1.5`)                    | `"1.5"`           |
//! | infinite float (`math.huge`)     | `"inf"`, `"-inf"` |
//! | integer-looking string (`"1"`)   | `"'1'"`           |
//! | other string, boolean            | the text itself   |
//! | table, function, userdata        | conversion error  |
//!
//! Quoting integer-looking strings keeps them apart from array positions
//! and from numeric keys with the same text.
//!
//! Both directions fail with a conversion error once tables nest deeper
//! than [`MAX_NESTING_DEPTH`].

use luastate_core::{
    Error, HostArray, HostObject, HostValue, PropertyKey, Result, RuntimeValue, TableEntries,
    MAX_NESTING_DEPTH,
};

/// Largest Lua key that still lands in the array part
pub const MAX_ARRAY_INDEX: i64 = 1 << 32;

/// Convert a Lua value for the host
pub fn from_runtime(value: RuntimeValue) -> Result<HostValue> {
    from_runtime_nested(value, 0)
}

fn from_runtime_nested(value: RuntimeValue, depth: usize) -> Result<HostValue> {
    Ok(match value {
        RuntimeValue::Nil => HostValue::Undefined,
        RuntimeValue::Boolean(b) => HostValue::Boolean(b),
        RuntimeValue::Integer(i) => HostValue::Number(i as f64),
        RuntimeValue::Number(n) => HostValue::Number(n),
        RuntimeValue::String(bytes) => match String::from_utf8(bytes) {
            Ok(s) => HostValue::String(s),
            Err(err) => HostValue::Bytes(err.into_bytes()),
        },
        RuntimeValue::Table(entries) => table_from_runtime(entries, depth)?,
        RuntimeValue::Function | RuntimeValue::UserData => HostValue::FunctionMarker,
    })
}

/// Convert every value of a multi-return, keeping order
pub fn from_runtime_multi(values: Vec<RuntimeValue>) -> Result<Vec<HostValue>> {
    values.into_iter().map(from_runtime).collect()
}

/// Convert a host value for Lua
pub fn to_runtime(value: HostValue) -> Result<RuntimeValue> {
    to_runtime_nested(value, 0)
}

fn to_runtime_nested(value: HostValue, depth: usize) -> Result<RuntimeValue> {
    Ok(match value {
        HostValue::Undefined | HostValue::Null => RuntimeValue::Nil,
        HostValue::Boolean(b) => RuntimeValue::Boolean(b),
        HostValue::Number(n) => RuntimeValue::Number(n),
        HostValue::String(s) => RuntimeValue::String(s.into_bytes()),
        HostValue::Bytes(bytes) => RuntimeValue::String(bytes),
        HostValue::Array(array) => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(Error::nesting_too_deep());
            }
            let (_, elements, properties) = array.into_parts();
            let mut entries = TableEntries::with_capacity(elements.len() + properties.len());
            for (index, element) in elements {
                if element.is_nullish() {
                    continue;
                }
                let key = i64::try_from(index)
                    .ok()
                    .and_then(|i| i.checked_add(1))
                    .ok_or_else(|| Error::conversion(format!("array index {} is too large", index)))?;
                let element = to_runtime_nested(element, depth + 1)?;
                entries.push((RuntimeValue::Integer(key), element));
            }
            push_properties(&mut entries, properties, depth)?;
            RuntimeValue::Table(entries)
        }
        HostValue::Object(object) => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(Error::nesting_too_deep());
            }
            let mut entries = TableEntries::with_capacity(object.len());
            push_properties(&mut entries, object, depth)?;
            RuntimeValue::Table(entries)
        }
        HostValue::FunctionMarker => {
            return Err(Error::conversion(
                "host functions cannot be passed to Lua; register them as event listeners",
            ))
        }
    })
}

/// Convert every value of an argument list, keeping order
pub fn to_runtime_multi(values: Vec<HostValue>) -> Result<Vec<RuntimeValue>> {
    values.into_iter().map(to_runtime).collect()
}

/// `depth` is the nesting level of the table that owns `properties`
fn push_properties(
    entries: &mut TableEntries,
    properties: HostObject,
    depth: usize,
) -> Result<()> {
    for (key, value) in properties {
        if value.is_nullish() {
            continue;
        }
        let key = match key {
            PropertyKey::Name(name) => RuntimeValue::String(name.into_bytes()),
            PropertyKey::ZeroIndex => RuntimeValue::Integer(0),
        };
        entries.push((key, to_runtime_nested(value, depth + 1)?));
    }
    Ok(())
}

fn table_from_runtime(entries: TableEntries, depth: usize) -> Result<HostValue> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(Error::nesting_too_deep());
    }
    let max_index = entries.iter().filter_map(|(key, _)| array_index(key)).max();

    let mut array = max_index.map(HostArray::with_len);
    let mut properties = HostObject::new();

    for (key, value) in entries {
        match (array_index(&key), array.as_mut()) {
            (Some(index), Some(array)) => {
                array.set(index - 1, from_runtime_nested(value, depth + 1)?)
            }
            _ => {
                let key = property_key(key)?;
                properties.insert(key, from_runtime_nested(value, depth + 1)?);
            }
        }
    }

    Ok(match array {
        Some(mut array) => {
            *array.properties_mut() = properties;
            HostValue::Array(array)
        }
        None => HostValue::Object(properties),
    })
}

/// One-based array position of a key, if it falls in the array range
fn array_index(key: &RuntimeValue) -> Option<u64> {
    match key.as_integer() {
        Some(n) if (1..=MAX_ARRAY_INDEX).contains(&n) => u64::try_from(n).ok(),
        _ => None,
    }
}

fn property_key(key: RuntimeValue) -> Result<PropertyKey> {
    if let Some(n) = key.as_integer() {
        return Ok(if n == 0 {
            PropertyKey::ZeroIndex
        } else {
            PropertyKey::Name(n.to_string())
        });
    }

    match key {
        RuntimeValue::Number(n) => Ok(PropertyKey::Name(n.to_string())),
        RuntimeValue::Boolean(b) => Ok(PropertyKey::Name(b.to_string())),
        RuntimeValue::String(bytes) => {
            let name = String::from_utf8(bytes).map_err(|_| {
                Error::conversion("table key is not valid UTF-8 and cannot name a property")
            })?;
            Ok(PropertyKey::Name(if is_integer_text(&name) {
                format!("'{}'", name)
            } else {
                name
            }))
        }
        other => Err(Error::conversion(format!(
            "cannot use a Lua {} as a property key",
            other.type_name()
        ))),
    }
}

/// Canonical integer text: optional minus, no leading zeros
fn is_integer_text(s: &str) -> bool {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, s),
    };
    match digits.as_bytes() {
        [] => false,
        [b'0'] => !negative,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

#[cfg(test)]
#[path = "marshal_tests.rs"]
mod tests;

//! Conversions between Rust types and host values

use luastate_core::{Error, HostArray, HostObject, HostValue, PropertyKey, Result};
use std::collections::{BTreeMap, HashMap};

/// Trait for converting Rust values to host values
pub trait IntoHostValue {
    fn into_host_value(self) -> HostValue;
}

/// Trait for converting host values to Rust values
pub trait FromHostValue: Sized {
    fn from_host_value(value: &HostValue) -> Result<Self>;
}

fn type_error(expected: &str, value: &HostValue) -> Error {
    Error::conversion(format!("expected {}, got {}", expected, value.type_name()))
}

// IntoHostValue implementations

impl IntoHostValue for HostValue {
    fn into_host_value(self) -> HostValue {
        self
    }
}

impl IntoHostValue for HostArray {
    fn into_host_value(self) -> HostValue {
        HostValue::Array(self)
    }
}

impl IntoHostValue for HostObject {
    fn into_host_value(self) -> HostValue {
        HostValue::Object(self)
    }
}

impl IntoHostValue for bool {
    fn into_host_value(self) -> HostValue {
        HostValue::Boolean(self)
    }
}

impl IntoHostValue for i32 {
    fn into_host_value(self) -> HostValue {
        HostValue::Number(f64::from(self))
    }
}

impl IntoHostValue for u32 {
    fn into_host_value(self) -> HostValue {
        HostValue::Number(f64::from(self))
    }
}

impl IntoHostValue for i64 {
    fn into_host_value(self) -> HostValue {
        HostValue::Number(self as f64)
    }
}

impl IntoHostValue for f64 {
    fn into_host_value(self) -> HostValue {
        HostValue::Number(self)
    }
}

impl IntoHostValue for String {
    fn into_host_value(self) -> HostValue {
        HostValue::String(self)
    }
}

impl IntoHostValue for &str {
    fn into_host_value(self) -> HostValue {
        HostValue::String(self.to_string())
    }
}

impl<T: IntoHostValue> IntoHostValue for Vec<T> {
    fn into_host_value(self) -> HostValue {
        HostValue::Array(self.into_iter().map(IntoHostValue::into_host_value).collect())
    }
}

impl<T: IntoHostValue> IntoHostValue for Option<T> {
    fn into_host_value(self) -> HostValue {
        match self {
            Some(v) => v.into_host_value(),
            None => HostValue::Undefined,
        }
    }
}

impl<T: IntoHostValue> IntoHostValue for HashMap<String, T> {
    fn into_host_value(self) -> HostValue {
        HostValue::Object(
            self.into_iter()
                .map(|(k, v)| (k, v.into_host_value()))
                .collect(),
        )
    }
}

impl<T: IntoHostValue> IntoHostValue for BTreeMap<String, T> {
    fn into_host_value(self) -> HostValue {
        HostValue::Object(
            self.into_iter()
                .map(|(k, v)| (k, v.into_host_value()))
                .collect(),
        )
    }
}

// FromHostValue implementations

impl FromHostValue for HostValue {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromHostValue for bool {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        value.as_bool().ok_or_else(|| type_error("boolean", value))
    }
}

impl FromHostValue for f64 {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        value.as_number().ok_or_else(|| type_error("number", value))
    }
}

impl FromHostValue for i64 {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        let n = f64::from_host_value(value)?;
        if n.fract() != 0.0 || !(i64::MIN as f64..i64::MAX as f64).contains(&n) {
            return Err(Error::conversion(format!("{} is not an integer", n)));
        }
        Ok(n as i64)
    }
}

impl FromHostValue for i32 {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        let n = i64::from_host_value(value)?;
        i32::try_from(n).map_err(|_| Error::conversion(format!("{} does not fit in i32", n)))
    }
}

impl FromHostValue for String {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::String(s) => Ok(s.clone()),
            _ => Err(type_error("string", value)),
        }
    }
}

impl<T: FromHostValue> FromHostValue for Option<T> {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        if value.is_nullish() {
            Ok(None)
        } else {
            T::from_host_value(value).map(Some)
        }
    }
}

impl<T: FromHostValue> FromHostValue for Vec<T> {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        match value {
            HostValue::Array(array) => array
                .to_vec()
                .iter()
                .map(T::from_host_value)
                .collect(),
            _ => Err(type_error("array", value)),
        }
    }
}

impl<T: FromHostValue> FromHostValue for HashMap<String, T> {
    fn from_host_value(value: &HostValue) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| type_error("object", value))?;
        object
            .iter()
            .map(|(key, v)| match key {
                PropertyKey::Name(name) => Ok((name.clone(), T::from_host_value(v)?)),
                PropertyKey::ZeroIndex => Err(Error::conversion(
                    "the zero-index slot has no string name",
                )),
            })
            .collect()
    }
}

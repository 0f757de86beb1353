//! Host-side value model

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Text the host sees in place of a Lua function
pub const FUNCTION_MARKER_TEXT: &str = "[LuaFunction]";

static UNDEFINED: HostValue = HostValue::Undefined;

/// A value as seen by the embedding application
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    /// Absent value
    #[default]
    Undefined,

    /// Explicit null
    Null,

    /// Boolean value
    Boolean(bool),

    /// Double-precision number
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Lua string that is not valid UTF-8
    Bytes(Vec<u8>),

    /// Possibly sparse array with named properties
    Array(HostArray),

    /// Property map
    Object(HostObject),

    /// Stand-in for a Lua function, shown as `[LuaFunction]`
    FunctionMarker,
}

impl HostValue {
    /// Build an array value
    pub fn array<V: Into<HostValue>>(values: impl IntoIterator<Item = V>) -> Self {
        HostValue::Array(values.into_iter().map(Into::into).collect())
    }

    /// Build an object value
    pub fn object<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<HostValue>,
    {
        HostValue::Object(properties.into_iter().collect())
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Boolean(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Bytes(_) => "bytes",
            HostValue::Array(_) => "array",
            HostValue::Object(_) => "object",
            HostValue::FunctionMarker => "function",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, HostValue::Undefined)
    }

    /// Undefined or null
    pub fn is_nullish(&self) -> bool {
        matches!(self, HostValue::Undefined | HostValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// String contents. A function marker reads as its fixed text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            HostValue::FunctionMarker => Some(FUNCTION_MARKER_TEXT),
            _ => None,
        }
    }

    /// Raw bytes of a string or byte string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HostValue::String(s) => Some(s.as_bytes()),
            HostValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&HostArray> {
        match self {
            HostValue::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            HostValue::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Named property of an object, or of an array's property part
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        match self {
            HostValue::Object(object) => object.get(name),
            HostValue::Array(array) => array.properties().get(name),
            _ => None,
        }
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Boolean(b)
    }
}

impl From<f64> for HostValue {
    fn from(n: f64) -> Self {
        HostValue::Number(n)
    }
}

impl From<i32> for HostValue {
    fn from(n: i32) -> Self {
        HostValue::Number(f64::from(n))
    }
}

impl From<u32> for HostValue {
    fn from(n: u32) -> Self {
        HostValue::Number(f64::from(n))
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::String(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::String(s)
    }
}

impl From<Vec<HostValue>> for HostValue {
    fn from(values: Vec<HostValue>) -> Self {
        HostValue::Array(values.into_iter().collect())
    }
}

impl From<HostArray> for HostValue {
    fn from(array: HostArray) -> Self {
        HostValue::Array(array)
    }
}

impl From<HostObject> for HostValue {
    fn from(object: HostObject) -> Self {
        HostValue::Object(object)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(HostValue::Undefined, Into::into)
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "undefined"),
            HostValue::Null => write!(f, "null"),
            HostValue::Boolean(b) => write!(f, "{}", b),
            HostValue::Number(n) => write!(f, "{}", n),
            HostValue::String(s) => write!(f, "{:?}", s),
            HostValue::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            HostValue::Array(array) => write!(f, "{}", array),
            HostValue::Object(object) => write!(f, "{}", object),
            HostValue::FunctionMarker => f.write_str(FUNCTION_MARKER_TEXT),
        }
    }
}

/// Property name of an object or array
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    /// Ordinary string-named property
    Name(String),
    /// Reserved slot holding a Lua table's `[0]` entry
    ZeroIndex,
}

impl PropertyKey {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Name(name) => Some(name),
            PropertyKey::ZeroIndex => None,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Name(name)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => f.write_str(name),
            PropertyKey::ZeroIndex => f.write_str("[ZeroIndex]"),
        }
    }
}

/// Mapping from property key to value; order is not significant
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostObject {
    properties: BTreeMap<PropertyKey, HostValue>,
}

impl HostObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value
    pub fn insert(
        &mut self,
        key: impl Into<PropertyKey>,
        value: impl Into<HostValue>,
    ) -> Option<HostValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Chaining form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<PropertyKey>, value: impl Into<HostValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a named property
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.properties.get(&PropertyKey::from(name))
    }

    pub fn get_key(&self, key: &PropertyKey) -> Option<&HostValue> {
        self.properties.get(key)
    }

    /// Value stored in the reserved zero-index slot
    pub fn zero_index(&self) -> Option<&HostValue> {
        self.properties.get(&PropertyKey::ZeroIndex)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<HostValue> {
        self.properties.remove(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PropertyKey, HostValue> {
        self.properties.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.properties.keys()
    }
}

impl<K: Into<PropertyKey>, V: Into<HostValue>> FromIterator<(K, V)> for HostObject {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for HostObject {
    type Item = (PropertyKey, HostValue);
    type IntoIter = btree_map::IntoIter<PropertyKey, HostValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}

impl<'a> IntoIterator for &'a HostObject {
    type Item = (&'a PropertyKey, &'a HostValue);
    type IntoIter = btree_map::Iter<'a, PropertyKey, HostValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

impl fmt::Display for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{ ")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, " }}")
    }
}

/// Array with an explicit length where missing positions are holes
///
/// Only present elements are stored, so a length near `2^32` costs nothing
/// until positions are filled. Storing [`HostValue::Undefined`] at a
/// position is the same as leaving a hole there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostArray {
    len: u64,
    elements: BTreeMap<u64, HostValue>,
    properties: HostObject,
}

impl HostArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Array of `len` holes
    pub fn with_len(len: u64) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element at a zero-based position; holes and out-of-range positions are undefined
    pub fn get(&self, index: u64) -> &HostValue {
        self.elements.get(&index).unwrap_or(&UNDEFINED)
    }

    /// Store an element, growing the array when `index` is past the end
    pub fn set(&mut self, index: u64, value: impl Into<HostValue>) {
        if index >= self.len {
            self.len = index.saturating_add(1);
        }
        match value.into() {
            HostValue::Undefined => {
                self.elements.remove(&index);
            }
            value => {
                self.elements.insert(index, value);
            }
        }
    }

    pub fn push(&mut self, value: impl Into<HostValue>) {
        self.set(self.len, value);
    }

    /// Whether `index` is inside the array but holds no element
    pub fn is_hole(&self, index: u64) -> bool {
        index < self.len && !self.elements.contains_key(&index)
    }

    /// Present elements with their positions, in ascending order
    pub fn elements(&self) -> impl Iterator<Item = (u64, &HostValue)> {
        self.elements.iter().map(|(i, v)| (*i, v))
    }

    /// Dense copy with holes as undefined. Allocates `len` slots.
    pub fn to_vec(&self) -> Vec<HostValue> {
        (0..self.len).map(|i| self.get(i).clone()).collect()
    }

    pub fn properties(&self) -> &HostObject {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut HostObject {
        &mut self.properties
    }

    /// Chaining form for attaching a named property
    pub fn with_property(mut self, key: impl Into<PropertyKey>, value: impl Into<HostValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Split into length, present elements and properties
    pub fn into_parts(self) -> (u64, BTreeMap<u64, HostValue>, HostObject) {
        (self.len, self.elements, self.properties)
    }
}

impl<V: Into<HostValue>> FromIterator<V> for HostArray {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut array = HostArray::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl fmt::Display for HostArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn holes(f: &mut fmt::Formatter<'_>, count: u64, first: &mut bool) -> fmt::Result {
            if count == 0 {
                return Ok(());
            }
            if !std::mem::take(first) {
                write!(f, ", ")?;
            }
            let plural = if count == 1 { "" } else { "s" };
            write!(f, "<{} empty item{}>", count, plural)
        }

        let mut first = true;
        let mut next = 0;
        write!(f, "[")?;
        for (index, value) in self.elements() {
            holes(f, index - next, &mut first)?;
            if !std::mem::take(&mut first) {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
            next = index + 1;
        }
        holes(f, self.len - next, &mut first)?;
        for (key, value) in self.properties.iter() {
            if !std::mem::take(&mut first) {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "]")
    }
}

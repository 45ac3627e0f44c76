// Option Domain Model
//
// Raw option values as handed to the builder by the embedding runtime or an
// options file. Values are loosely typed; the validator narrows them.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Opaque identifier resolvable to a registered component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityRef(Cow<'static, str>);

impl CapabilityRef {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Cow::Owned(s.into()))
    }

    /// Reference usable in `const` position (well-known built-ins)
    pub const fn from_static(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for CapabilityRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

type CallableFn = dyn Fn(&[OptionValue]) -> OptionValue + Send + Sync;

/// Function value carried in an option set (e.g. a dynamic backend resolver)
///
/// Equality is identity: two callables are equal only if they share the
/// same underlying closure.
#[derive(Clone)]
pub struct Callable {
    arity: usize,
    func: Arc<CallableFn>,
}

impl Callable {
    pub fn new(
        arity: usize,
        func: impl Fn(&[OptionValue]) -> OptionValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            arity,
            func: Arc::new(func),
        }
    }

    /// Zero-argument callable
    pub fn thunk(func: impl Fn() -> OptionValue + Send + Sync + 'static) -> Self {
        Self::new(0, move |_| func())
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[OptionValue]) -> OptionValue {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Serialize for Callable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("#Function<{}>", self.arity))
    }
}

/// A single option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Symbolic constant (severity names, `infinity`, instance names)
    Symbol(String),
    List(Vec<OptionValue>),
    /// Fixed-size grouping, e.g. `(capability, options)`
    Tuple(Vec<OptionValue>),
    Pairs(OptionSet),
    Capability(CapabilityRef),
    Callable(Callable),
}

impl OptionValue {
    pub fn str(s: impl Into<String>) -> Self {
        OptionValue::Str(s.into())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        OptionValue::Symbol(s.into())
    }

    pub fn capability(s: impl Into<String>) -> Self {
        OptionValue::Capability(CapabilityRef::new(s))
    }

    pub fn pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, OptionValue)>) -> Self {
        OptionValue::Pairs(pairs.into_iter().collect())
    }

    /// `(capability, options)` extension entry
    pub fn extension(capability: CapabilityRef, options: OptionSet) -> Self {
        OptionValue::Tuple(vec![
            OptionValue::Capability(capability),
            OptionValue::Pairs(options),
        ])
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            OptionValue::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_false(&self) -> bool {
        matches!(self, OptionValue::Bool(false))
    }

    /// Short type label used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Nil => "nil",
            OptionValue::Bool(_) => "boolean",
            OptionValue::Int(_) => "integer",
            OptionValue::Float(_) => "float",
            OptionValue::Str(_) => "string",
            OptionValue::Symbol(_) => "symbol",
            OptionValue::List(_) => "list",
            OptionValue::Tuple(_) => "tuple",
            OptionValue::Pairs(_) => "option set",
            OptionValue::Capability(_) => "capability",
            OptionValue::Callable(_) => "callable",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(i64::from(n))
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<OptionSet> for OptionValue {
    fn from(set: OptionSet) -> Self {
        OptionValue::Pairs(set)
    }
}

impl From<CapabilityRef> for OptionValue {
    fn from(capability: CapabilityRef) -> Self {
        OptionValue::Capability(capability)
    }
}

impl From<Callable> for OptionValue {
    fn from(callable: Callable) -> Self {
        OptionValue::Callable(callable)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[OptionValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Nil => f.write_str("nil"),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Float(x) => write!(f, "{:?}", x),
            OptionValue::Str(s) => write!(f, "{:?}", s),
            OptionValue::Symbol(s) => f.write_str(s),
            OptionValue::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            OptionValue::Tuple(items) => {
                f.write_str("{")?;
                write_joined(f, items)?;
                f.write_str("}")
            }
            OptionValue::Pairs(set) => write!(f, "{}", set),
            OptionValue::Capability(c) => write!(f, "{}", c),
            OptionValue::Callable(c) => write!(f, "#Function<{}>", c.arity()),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Nil => serializer.serialize_none(),
            OptionValue::Bool(b) => serializer.serialize_bool(*b),
            OptionValue::Int(n) => serializer.serialize_i64(*n),
            OptionValue::Float(x) => serializer.serialize_f64(*x),
            OptionValue::Str(s) | OptionValue::Symbol(s) => serializer.serialize_str(s),
            OptionValue::List(items) | OptionValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            OptionValue::Pairs(set) => set.serialize(serializer),
            OptionValue::Capability(c) => c.serialize(serializer),
            OptionValue::Callable(c) => c.serialize(serializer),
        }
    }
}

/// Ordered collection of (key, value) pairs
///
/// Duplicate keys are representable so raw input can be carried as given;
/// [`OptionSet::has_unique_keys`] tells whether the set is a valid option-set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionSet(Vec<(String, OptionValue)>);

impl OptionSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a pair without touching existing entries
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.push((key.into(), value.into()));
    }

    /// Chainable [`OptionSet::push`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Replace every entry for `key` with a single one at the end
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        self.0.retain(|(k, _)| *k != key);
        self.0.push((key, value.into()));
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove every entry for `key`, returning the first value
    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        let position = self.0.iter().position(|(k, _)| k == key)?;
        let (_, value) = self.0.remove(position);
        self.0.retain(|(k, _)| k != key);
        Some(value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn has_unique_keys(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.0.len());
        self.0.iter().all(|(k, _)| seen.insert(k.as_str()))
    }
}

impl<K: Into<String>> FromIterator<(K, OptionValue)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for OptionSet {
    type Item = (String, OptionValue);
    type IntoIter = std::vec::IntoIter<(String, OptionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("]")
    }
}

impl Serialize for OptionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

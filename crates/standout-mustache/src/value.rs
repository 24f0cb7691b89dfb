//! Dynamic values that templates are rendered against.
//!
//! Host data reaches the engine as a [`Value`]. Plain data (strings, numbers,
//! lists, maps) converts through `From` impls or through
//! [`Value::from_serialize`] for any `serde::Serialize` type. Records that
//! need method-like access implement [`Object`], which exposes the two
//! capabilities the lookup rules rely on: zero-argument calls and field
//! access.
//!
//! # Nullable Wrappers
//!
//! The only indirection the engine understands is nullability: `Option<T>`
//! becomes [`Value::Null`] or the converted `T`, and `Box<T>` / `Arc<T>`
//! convert through their target. Once converted there is nothing left to
//! unwrap, so truthiness checks look at the value itself.
//!
//! # Example
//!
//! ```rust
//! use standout_mustache::{Object, Value};
//!
//! #[derive(Debug)]
//! struct User {
//!     first: String,
//!     last: String,
//! }
//!
//! impl Object for User {
//!     fn call(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "full_name" => Some(format!("{} {}", self.first, self.last).into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn field(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "first" => Some(self.first.as_str().into()),
//!             "last" => Some(self.last.as_str().into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let user = Value::from_object(User { first: "Ada".into(), last: "Lovelace".into() });
//! assert!(!user.is_empty());
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::SerializeError;
use crate::ser::ValueSerializer;

/// A record-like host value with fields and zero-argument methods.
///
/// Lookups try [`call`](Object::call) before [`field`](Object::field), so a
/// method shadows a field of the same name.
pub trait Object: fmt::Debug + Send + Sync {
    /// Invokes the zero-argument method `name`, if the object has one.
    fn call(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Returns the field `name`, if the object has one.
    ///
    /// Returning `Some(Value::Null)` still counts as having the field: the
    /// lookup stops here instead of searching outer contexts.
    fn field(&self, name: &str) -> Option<Value>;

    /// Whether a section over this object should be skipped.
    fn is_empty(&self) -> bool {
        false
    }

    /// Writes the text emitted when the object is used as a variable.
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Numeric value, kept in the widest form of its source type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Returns `true` for any representation of zero.
    pub fn is_zero(self) -> bool {
        match self {
            Number::I64(n) => n == 0,
            Number::U64(n) => n == 0,
            Number::F64(n) => n == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

/// A dynamic value in a context chain.
///
/// Compound payloads are reference counted, so cloning a value during
/// lookup never copies host data.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent or null.
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    /// A list; sections iterate it.
    List(Arc<Vec<Value>>),
    /// An associative mapping; names resolve by key.
    Map(Arc<BTreeMap<String, Value>>),
    /// A record; names resolve through [`Object`].
    Object(Arc<dyn Object>),
}

impl Value {
    /// Wraps a host record.
    pub fn from_object<T: Object + 'static>(object: T) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Converts any serializable host value.
    ///
    /// Structs become records whose fields resolve like keys and which are
    /// empty when every field is empty. Maps stay maps. Types that need
    /// methods should implement [`Object`] instead.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self, SerializeError> {
        data.serialize(ValueSerializer)
    }

    /// Returns `true` if a section over this value should be skipped.
    ///
    /// Empty values: null, `false`, zero, strings that are blank after
    /// trimming, and empty lists. Maps are never empty; objects decide
    /// through [`Object::is_empty`], and records built by
    /// [`from_serialize`](Self::from_serialize) are empty when all their
    /// fields are.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.is_zero(),
            Value::String(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(_) => false,
            Value::Object(object) => object.is_empty(),
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    /// Returns the items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(&**map),
            _ => None,
        }
    }

    /// Returns the object, if this is an object or a serialized struct.
    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Value::Object(object) => Some(&**object),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                f.write_str("]")
            }
            Value::Object(object) => object.render(f),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Objects have no structural equality.
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(n: $source) -> Self {
                    Value::Number(Number::$variant(n as $target))
                }
            }
        )+
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(Arc::from(s.as_str()))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Box<T>> for Value {
    fn from(boxed: Box<T>) -> Self {
        (*boxed).into()
    }
}

impl<T: Into<Value> + Clone> From<Arc<T>> for Value {
    fn from(shared: Arc<T>) -> Self {
        T::clone(&shared).into()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(Arc::new(items.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Value::List(Arc::new(items.iter().cloned().map(Into::into).collect()))
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(Arc::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Number::U64(u))
                } else {
                    Value::Number(Number::F64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => Value::from(items),
            serde_json::Value::Object(map) => map.into_iter().collect(),
        }
    }
}

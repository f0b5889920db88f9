//! Capability traits for watchable targets
//!
//! A watch target is anything whose named properties can be read. Targets
//! that behave like a document additionally expose [`Queryable`], which
//! switches the watcher from property lookup to selector queries.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use watch_target::WatchTarget;
//!
//! let value = json!({ "ready": true });
//! assert!(value.is_object());
//! assert_eq!(value.property("ready"), Some(json!(true)));
//! assert_eq!(value.property("missing"), None);
//! assert!(value.as_queryable().is_none());
//! ```

use std::fmt::Debug;
use std::sync::Arc;

use serde_json::Value;

use crate::document::NodeList;
use crate::error::SelectorError;

/// A value that can be observed by the watcher
///
/// Targets must be:
/// - Send + Sync: sessions read them from runtime tasks
/// - Debug: the context record is included in diagnostic logs
pub trait WatchTarget: Send + Sync + Debug {
    /// Whether this target is object-typed
    ///
    /// Scalars are rejected before any polling starts.
    fn is_object(&self) -> bool {
        true
    }

    /// Read a named property
    ///
    /// `None` is the absent sentinel. A present JSON `null` is `Some(Value::Null)`.
    fn property(&self, key: &str) -> Option<Value>;

    /// Selector-query capability, if this target behaves like a document
    fn as_queryable(&self) -> Option<&dyn Queryable> {
        None
    }
}

/// Selector-query capability of a document-like target
pub trait Queryable: Send + Sync {
    /// Return every element matching `selector`, in document order
    fn query_selector_all(&self, selector: &str) -> Result<NodeList, SelectorError>;
}

impl<T: WatchTarget + ?Sized> WatchTarget for Arc<T> {
    fn is_object(&self) -> bool {
        (**self).is_object()
    }

    fn property(&self, key: &str) -> Option<Value> {
        (**self).property(key)
    }

    fn as_queryable(&self) -> Option<&dyn Queryable> {
        (**self).as_queryable()
    }
}

impl<T: WatchTarget + ?Sized> WatchTarget for Box<T> {
    fn is_object(&self) -> bool {
        (**self).is_object()
    }

    fn property(&self, key: &str) -> Option<Value> {
        (**self).property(key)
    }

    fn as_queryable(&self) -> Option<&dyn Queryable> {
        (**self).as_queryable()
    }
}

/// A JSON value is a static snapshot target
///
/// Objects expose their keys, arrays expose indices and `length`.
/// Scalars and `null` are not objects.
impl WatchTarget for Value {
    fn is_object(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Array(_))
    }

    fn property(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.get(key).cloned(),
            Value::Array(items) if key == "length" => Some(Value::from(items.len())),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
            _ => None,
        }
    }
}

/// Human-readable name of a JSON value's kind
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Shared, concurrently mutable property object
//!
//! `ObjectTarget` is the plain-object target: a map of named JSON values
//! that one side watches while another side fills it in.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::error::TargetError;
use crate::target::{json_kind, WatchTarget};

/// Property object whose clones share the same storage
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use watch_target::{ObjectTarget, WatchTarget};
///
/// let target = ObjectTarget::new();
/// let writer = target.clone();
///
/// assert_eq!(target.property("ready"), None);
/// writer.set("ready", true);
/// assert_eq!(target.property("ready"), Some(json!(true)));
/// ```
#[derive(Clone, Default)]
pub struct ObjectTarget {
    props: Arc<DashMap<String, Value>>,
}

impl ObjectTarget {
    /// Create a new empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.props.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get(&self, key: &str) -> Option<Value> {
        self.props.get(key).map(|entry| entry.value().clone())
    }

    /// Remove a property, returning its value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.props.remove(key).map(|(_, value)| value)
    }

    /// Check if a property exists
    pub fn contains(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    /// Get the number of properties
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Check if the object has no properties
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Get all property keys (unordered)
    pub fn keys(&self) -> Vec<String> {
        self.props.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Remove every property
    pub fn clear(&self) {
        self.props.clear();
    }

    /// Snapshot the current properties as a JSON object
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .props
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        Value::Object(map)
    }
}

impl WatchTarget for ObjectTarget {
    fn property(&self, key: &str) -> Option<Value> {
        self.get(key)
    }
}

impl From<Map<String, Value>> for ObjectTarget {
    fn from(map: Map<String, Value>) -> Self {
        let target = Self::new();
        for (key, value) in map {
            target.set(key, value);
        }
        target
    }
}

impl TryFrom<Value> for ObjectTarget {
    type Error = TargetError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(TargetError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }
}

impl fmt::Debug for ObjectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectTarget")
            .field("props", &self.to_value())
            .finish()
    }
}

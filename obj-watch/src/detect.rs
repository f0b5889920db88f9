//! Detection strategies
//!
//! Each tick inspects the target's capabilities and picks one of two
//! strategies: a selector query for document-like targets, or a property
//! lookup for everything else.

use serde::Serialize;
use serde_json::Value;
use watch_target::{NodeList, WatchTarget};

/// Which lookup applies to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Treat the selector as a query; succeed on one or more matches
    Query,
    /// Treat the selector as a property key; succeed when present
    Property,
}

impl DetectionMode {
    /// Pick the mode for `target` from its current capabilities
    pub fn of(target: &dyn WatchTarget) -> Self {
        if target.as_queryable().is_some() {
            DetectionMode::Query
        } else {
            DetectionMode::Property
        }
    }
}

/// What a successful tick found
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Detected {
    /// The property's value (may be JSON `null`)
    Value(Value),
    /// Every element matched by the query, in document order
    Elements(NodeList),
}

impl Detected {
    pub fn mode(&self) -> DetectionMode {
        match self {
            Detected::Value(_) => DetectionMode::Property,
            Detected::Elements(_) => DetectionMode::Query,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Detected::Value(value) => Some(value),
            Detected::Elements(_) => None,
        }
    }

    pub fn as_elements(&self) -> Option<&NodeList> {
        match self {
            Detected::Elements(elements) => Some(elements),
            Detected::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Detected::Value(value) => Some(value),
            Detected::Elements(_) => None,
        }
    }

    pub fn into_elements(self) -> Option<NodeList> {
        match self {
            Detected::Elements(elements) => Some(elements),
            Detected::Value(_) => None,
        }
    }
}

/// Run one detection against `target`
///
/// A malformed selector on a queryable target counts as no match.
pub(crate) fn detect(target: &dyn WatchTarget, selector: &str) -> Option<Detected> {
    match target.as_queryable() {
        Some(queryable) => match queryable.query_selector_all(selector) {
            Ok(elements) if !elements.is_empty() => Some(Detected::Elements(elements)),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(selector, error = %e, "obj_watch selector query failed");
                None
            }
        },
        None => target.property(selector).map(Detected::Value),
    }
}

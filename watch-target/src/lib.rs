//! Watchable targets
//!
//! Targets observed by `obj-watch`. A target either exposes named
//! properties or, when it behaves like a document, answers selector queries.
//!
//! # Features
//!
//! - **Capability traits**: `WatchTarget` for property lookup, `Queryable`
//!   for selector queries
//! - **Shared objects**: `ObjectTarget` clones share one concurrent map
//! - **DOM-like documents**: `Document`, `Element` and `NodeList`
//! - **Selector engine**: type, id, class and attribute selectors with
//!   descendant and child combinators
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use watch_target::{Document, Element, ObjectTarget, WatchTarget};
//!
//! // Property lookup
//! let object = ObjectTarget::new();
//! object.set("ready", true);
//! assert_eq!(object.property("ready"), Some(json!(true)));
//!
//! // Selector queries
//! let doc = Document::new();
//! doc.append_child(Element::new("div").with_id("app"));
//! let queryable = doc.as_queryable().unwrap();
//! assert_eq!(queryable.query_selector_all("#app").unwrap().len(), 1);
//! ```
//!
//! # Architecture
//!
//! ```text
//! WatchTarget ──── property(key) -> Option<Value>
//!     │
//!     ├── ObjectTarget: Arc<DashMap<String, Value>>
//!     ├── serde_json::Value (static snapshot)
//!     │
//!     └── as_queryable() -> Option<&dyn Queryable>
//!             │
//!             ├── Document: Arc<RwLock<Vec<Element>>>
//!             └── Element
//! ```

pub mod document;
pub mod error;
pub mod object;
pub mod selector;
pub mod target;

pub use document::{Document, Element, NodeList};
pub use error::{SelectorError, TargetError};
pub use object::ObjectTarget;
pub use selector::SelectorList;
pub use target::{json_kind, Queryable, WatchTarget};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::document::{Document, Element, NodeList};
    pub use crate::object::ObjectTarget;
    pub use crate::target::{Queryable, WatchTarget};
}

//! DOM-like document targets
//!
//! This module provides the queryable side of watching:
//! - `Element`: a node with a tag, id, classes, attributes and children
//! - `NodeList`: the ordered result of a selector query
//! - `Document`: a shared, mutable container of element trees

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SelectorError;
use crate::selector::SelectorList;
use crate::target::{Queryable, WatchTarget};

// ============================================================================
// Element
// ============================================================================

/// A single element in a document tree
///
/// # Example
///
/// ```rust
/// use watch_target::Element;
///
/// let list = Element::new("ul")
///     .with_id("menu")
///     .with_child(Element::new("li").with_class("item").with_text("Home"))
///     .with_child(Element::new("li").with_class("item").with_text("About"));
///
/// assert_eq!(list.children().len(), 2);
/// assert_eq!(list.attribute("id").as_deref(), Some("menu"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    classes: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Element>,
}

impl Element {
    /// Create an element with the given tag name (stored lowercase)
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set an attribute
    ///
    /// `id` and `class` are routed to the element's id and class list.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match name.as_str() {
            "id" => self.id = Some(value),
            "class" => {
                for class in value.split_whitespace() {
                    self = self.with_class(class);
                }
            }
            _ => {
                self.attributes.insert(name, value);
            }
        }
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child in place
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Look up an attribute by (case-insensitive) name
    ///
    /// `id` and `class` reflect the element's id and class list.
    pub fn attribute(&self, name: &str) -> Option<Cow<'_, str>> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "id" => self.id.as_deref().map(Cow::Borrowed),
            "class" if self.classes.is_empty() => None,
            "class" => Some(Cow::Owned(self.classes.join(" "))),
            _ => self.attributes.get(&name).map(|v| Cow::Borrowed(v.as_str())),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Query the element's descendants (the element itself is never matched)
    pub fn query_selector_all(&self, selector: &str) -> Result<NodeList, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(NodeList::from(list.select(&self.children, &[self])))
    }
}

impl Queryable for Element {
    fn query_selector_all(&self, selector: &str) -> Result<NodeList, SelectorError> {
        Element::query_selector_all(self, selector)
    }
}

impl WatchTarget for Element {
    fn property(&self, key: &str) -> Option<Value> {
        self.attribute(key).map(|v| Value::String(v.into_owned()))
    }

    fn as_queryable(&self) -> Option<&dyn Queryable> {
        Some(self)
    }
}

// ============================================================================
// NodeList
// ============================================================================

/// Ordered collection of elements returned by a selector query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeList(Vec<Element>);

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&Element> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Element> {
        self.0
    }
}

impl From<Vec<Element>> for NodeList {
    fn from(elements: Vec<Element>) -> Self {
        Self(elements)
    }
}

impl FromIterator<Element> for NodeList {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for NodeList {
    type Item = Element;
    type IntoIter = std::vec::IntoIter<Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Document
// ============================================================================

/// Shared container of element trees
///
/// Clones share the same tree, so one side can watch for elements while
/// another side appends them.
///
/// # Example
///
/// ```rust
/// use watch_target::{Document, Element};
///
/// let doc = Document::new();
/// assert!(doc.query_selector_all(".ready").unwrap().is_empty());
///
/// doc.append_child(Element::new("div").with_class("ready"));
/// assert_eq!(doc.query_selector_all(".ready").unwrap().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Document {
    children: Arc<RwLock<Vec<Element>>>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from top-level elements
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            children: Arc::new(RwLock::new(elements)),
        }
    }

    /// Append a top-level element
    pub fn append_child(&self, element: Element) {
        if let Ok(mut children) = self.children.write() {
            children.push(element);
        }
    }

    /// Append `element` as the last child of the element with `parent_id`
    ///
    /// Returns `false` if no such parent exists.
    pub fn append_to(&self, parent_id: &str, element: Element) -> bool {
        let mut children = match self.children.write() {
            Ok(c) => c,
            Err(_) => return false,
        };

        match find_by_id_mut(&mut children, parent_id) {
            Some(parent) => {
                parent.push_child(element);
                true
            }
            None => false,
        }
    }

    /// Remove the first element (in document order) with the given id
    pub fn remove_by_id(&self, id: &str) -> Option<Element> {
        let mut children = self.children.write().ok()?;
        take_by_id(&mut children, id)
    }

    /// Remove every element
    pub fn clear(&self) {
        if let Ok(mut children) = self.children.write() {
            children.clear();
        }
    }

    /// Get the number of top-level elements
    pub fn child_count(&self) -> usize {
        self.children.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Clone the current top-level elements
    pub fn snapshot(&self) -> Vec<Element> {
        self.children.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Return every element matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<NodeList, SelectorError> {
        let list = SelectorList::parse(selector)?;
        let matched = self
            .children
            .read()
            .map(|children| list.select(&children, &[]))
            .unwrap_or_default();
        Ok(NodeList::from(matched))
    }

    /// Return the first element matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<Element>, SelectorError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }
}

impl Queryable for Document {
    fn query_selector_all(&self, selector: &str) -> Result<NodeList, SelectorError> {
        Document::query_selector_all(self, selector)
    }
}

impl WatchTarget for Document {
    fn property(&self, _key: &str) -> Option<Value> {
        None
    }

    fn as_queryable(&self) -> Option<&dyn Queryable> {
        Some(self)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("child_count", &self.child_count())
            .finish()
    }
}

fn find_by_id_mut<'a>(elements: &'a mut [Element], id: &str) -> Option<&'a mut Element> {
    for element in elements.iter_mut() {
        if element.id() == Some(id) {
            return Some(element);
        }
        if let Some(found) = find_by_id_mut(&mut element.children, id) {
            return Some(found);
        }
    }
    None
}

fn take_by_id(elements: &mut Vec<Element>, id: &str) -> Option<Element> {
    if let Some(index) = elements.iter().position(|e| e.id() == Some(id)) {
        return Some(elements.remove(index));
    }
    elements
        .iter_mut()
        .find_map(|element| take_by_id(&mut element.children, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::from_elements(vec![
            Element::new("header").with_id("top"),
            Element::new("main").with_id("content").with_child(
                Element::new("ul")
                    .with_id("list")
                    .with_child(Element::new("li").with_class("item").with_text("one"))
                    .with_child(Element::new("li").with_class("item").with_text("two")),
            ),
        ])
    }

    #[test]
    fn test_with_attr_routes_id_and_class() {
        let el = Element::new("DIV").with_attr("ID", "x").with_attr("class", "a b a");
        assert_eq!(el.tag(), "div");
        assert_eq!(el.id(), Some("x"));
        assert_eq!(el.classes(), &["a".to_string(), "b".to_string()]);
        assert_eq!(el.attribute("class").as_deref(), Some("a b"));
        assert_eq!(el.attribute("data-x"), None);
    }

    #[test]
    fn test_query_in_document_order() {
        let doc = sample();
        let items = doc.query_selector_all("li.item").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items.get(0).and_then(|e| e.text()), Some("one"));
        assert_eq!(items.get(1).and_then(|e| e.text()), Some("two"));
    }

    #[test]
    fn test_query_selector_returns_first() {
        let doc = sample();
        let first = doc.query_selector("#content li").unwrap();
        assert_eq!(first.and_then(|e| e.text().map(String::from)), Some("one".to_string()));
        assert_eq!(doc.query_selector("table").unwrap(), None);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let doc = sample();
        assert!(doc.query_selector_all("li[").is_err());
    }

    #[test]
    fn test_append_to_and_remove_by_id() {
        let doc = sample();
        assert!(doc.append_to("list", Element::new("li").with_class("item")));
        assert_eq!(doc.query_selector_all(".item").unwrap().len(), 3);
        assert!(!doc.append_to("missing", Element::new("li")));

        let removed = doc.remove_by_id("list").unwrap();
        assert_eq!(removed.children().len(), 3);
        assert!(doc.query_selector_all(".item").unwrap().is_empty());
        assert_eq!(doc.child_count(), 2);
    }

    #[test]
    fn test_clone_shares_tree() {
        let doc = Document::new();
        let writer = doc.clone();
        writer.append_child(Element::new("p"));
        assert_eq!(doc.child_count(), 1);

        writer.clear();
        assert_eq!(doc.child_count(), 0);
    }

    #[test]
    fn test_element_query_excludes_self() {
        let list = Element::new("ul")
            .with_class("item")
            .with_child(Element::new("li").with_class("item"));
        assert_eq!(list.query_selector_all(".item").unwrap().len(), 1);
        assert_eq!(list.query_selector_all("ul > li").unwrap().len(), 1);
    }

    #[test]
    fn test_document_is_queryable_target() {
        let doc = sample();
        assert!(doc.is_object());
        assert!(doc.as_queryable().is_some());
        assert_eq!(doc.property("title"), None);
    }
}

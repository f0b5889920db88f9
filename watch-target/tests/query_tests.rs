//! Integration tests for document queries and shared targets.

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use serde_json::json;
use watch_target::{Document, Element, ObjectTarget, SelectorList, WatchTarget};

fn page() -> Document {
    Document::from_elements(vec![Element::new("html").with_child(
        Element::new("body")
            .with_child(
                Element::new("form")
                    .with_id("login")
                    .with_child(Element::new("input").with_attr("name", "user").with_attr("type", "text"))
                    .with_child(
                        Element::new("input")
                            .with_attr("name", "pass")
                            .with_attr("type", "password"),
                    )
                    .with_child(Element::new("button").with_class("primary").with_text("Sign in")),
            )
            .with_child(Element::new("div").with_class("banner").with_class("cookie")),
    )])
}

#[test]
fn test_queryable_capability_through_trait_object() {
    let target: Arc<dyn WatchTarget> = Arc::new(page());
    let queryable = target.as_queryable().expect("document should be queryable");

    let inputs = queryable.query_selector_all("form#login > input").unwrap();
    assert_eq!(inputs.len(), 2);

    let password = queryable.query_selector_all("input[type=\"password\"]").unwrap();
    assert_eq!(password.len(), 1);
    assert_eq!(password.first().and_then(|e| e.attribute("name")).as_deref(), Some("pass"));
}

#[test]
fn test_selector_list_unions_in_document_order() {
    let doc = page();
    let found = doc.query_selector_all(".cookie, button.primary").unwrap();
    let tags: Vec<&str> = found.iter().map(|e| e.tag()).collect();
    assert_eq!(tags, vec!["button", "div"]);
}

#[test]
fn test_single_match_is_still_a_collection() {
    let doc = page();
    let found = doc.query_selector_all("body > .banner").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.into_vec().len(), 1);
}

#[test]
fn test_concurrent_writer_is_visible_to_reader() {
    let doc = Document::new();
    let writer = doc.clone();

    let handle = thread::spawn(move || {
        for i in 0..10 {
            writer.append_child(Element::new("p").with_attr("data-index", i.to_string()));
        }
    });
    handle.join().unwrap();

    assert_eq!(doc.query_selector_all("p[data-index]").unwrap().len(), 10);
    assert_eq!(doc.query_selector_all("p[data-index=\"7\"]").unwrap().len(), 1);
}

#[test]
fn test_object_target_across_threads() {
    let target = ObjectTarget::new();
    let writer = target.clone();

    thread::spawn(move || {
        writer.set("ready", json!({ "at": 3 }));
    })
    .join()
    .unwrap();

    assert_eq!(target.property("ready"), Some(json!({ "at": 3 })));
}

#[test]
fn test_element_serializes_without_empty_fields() {
    let el = Element::new("span").with_id("x");
    let value = serde_json::to_value(&el).unwrap();
    assert_eq!(value, json!({ "tag": "span", "id": "x" }));
}

proptest! {
    #[test]
    fn prop_type_selector_matches_its_tag(tag in "[a-z][a-z0-9-]{0,12}") {
        let list = SelectorList::parse(&tag).unwrap();
        let upper = Element::new(tag.to_ascii_uppercase());
        prop_assert!(list.matches(&upper, &[]));
    }

    #[test]
    fn prop_class_selector_requires_class(class in "[a-z_][a-z0-9_-]{0,12}") {
        let list = SelectorList::parse(&format!(".{}", class)).unwrap();
        prop_assert!(list.matches(&Element::new("div").with_class(class.clone()), &[]));
        prop_assert!(!list.matches(&Element::new("div"), &[]));
    }

    #[test]
    fn prop_parse_never_panics(input in "\\PC{0,24}") {
        let _ = SelectorList::parse(&input);
    }
}

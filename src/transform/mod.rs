//! HTML transformation passes
//!
//! Every page goes through the same passes on a mutable DOM:
//! - `sanitize`: strip site chrome and normalize layout
//! - `assets`: find images and math formulas and point them at local copies
//! - `links`: rewrite anchors to local files or absolute URLs
//! - `document`: wrap the content into a standalone HTML document
//!
//! The passes never fail as a whole. Problems with single elements are
//! reported as [`TransformError`] values and the element is left untouched.

pub mod assets;
pub mod document;
pub mod links;
pub mod sanitize;

pub use assets::{collect_assets, AssetKind, AssetRef};
pub use document::{assemble, serialize};
pub use links::{rewrite_links, LinkRewrite};
pub use sanitize::{sanitize, SanitizeReport};

use crate::TransformError;
use kuchiki::traits::*;
use kuchiki::{ElementData, NodeDataRef, NodeRef};

/// Parses page markup into a mutable document
pub fn parse_document(markup: &str) -> NodeRef {
    kuchiki::parse_html().one(markup)
}

/// Collects every element matching `selector` below `node`
///
/// The matches are collected up front so callers can detach nodes while
/// iterating.
pub(crate) fn select_all(
    node: &NodeRef,
    selector: &str,
) -> Result<Vec<NodeDataRef<ElementData>>, TransformError> {
    node.select(selector)
        .map(|matches| matches.collect())
        .map_err(|()| TransformError::Malformed {
            element: selector.to_string(),
            message: "invalid selector".to_string(),
        })
}

/// Replaces an element with its own children
pub(crate) fn unwrap_node(node: &NodeRef) {
    while let Some(child) = node.first_child() {
        node.insert_before(child);
    }
    node.detach();
}

/// Lowercase tag name of an element
pub(crate) fn tag_name(element: &ElementData) -> String {
    element.name.local.to_string()
}

/// Class tokens of an element, or the typed "absent" error
pub(crate) fn class_list(element: &ElementData) -> Result<Vec<String>, TransformError> {
    let attributes = element.attributes.borrow();
    let class = attributes
        .get("class")
        .ok_or_else(|| TransformError::MissingAttribute {
            element: tag_name(element),
            attribute: "class",
        })?;

    Ok(class.split_whitespace().map(str::to_string).collect())
}

/// Parses a snippet and returns its first `tag` element, detached
pub(crate) fn build_element(snippet: &str, tag: &str) -> Option<NodeRef> {
    let fragment = parse_document(snippet);
    let element = fragment.select_first(tag).ok()?;
    let node = element.as_node().clone();
    node.detach();
    Some(node)
}

//! Markup parsing and read-only queries over the parsed tree.
//!
//! Parsing goes through html5ever, so fragments get the same error recovery a
//! browser applies: implicit `<html>`/`<body>`, unclosed tags, void elements.

use html5ever::{parse_document, tendril::TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::path::Path;

use crate::error::{Error, Result};

/// A parsed HTML document. Read-only once built.
pub struct ParsedTree {
    dom: RcDom,
}

impl ParsedTree {
    /// Parse raw bytes. `path` is only used for error reporting.
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Self> {
        let parse_error = |message: String| Error::Parse {
            path: path.to_path_buf(),
            message,
        };

        let mut input = std::str::from_utf8(bytes)
            .map_err(|e| parse_error(format!("invalid UTF-8: {e}")))?
            .as_bytes();

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut input)
            .map_err(|e| parse_error(e.to_string()))?;

        Ok(Self { dom })
    }

    /// The document node.
    pub fn root(&self) -> &Handle {
        &self.dom.document
    }
}

/// First element named `name`, in document order.
pub fn find_first_by_tag_name(node: &Handle, name: &str) -> Option<Handle> {
    find_first(node, &|n: &Handle| match &n.data {
        NodeData::Element { name: qual, .. } => &*qual.local == name,
        _ => false,
    })
}

/// First element whose attribute `key` equals `value`, in document order.
pub fn find_first_by_attribute(node: &Handle, key: &str, value: &str) -> Option<Handle> {
    find_first(node, &|n: &Handle| match &n.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .any(|a| &*a.name.local == key && &*a.value == value),
        _ => false,
    })
}

/// Pre-order depth-first search. Returns as soon as `pred` matches, without
/// visiting the rest of the tree.
fn find_first(node: &Handle, pred: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    if pred(node) {
        return Some(node.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_first(child, pred) {
            return Some(found);
        }
    }
    None
}

/// Value of attribute `key` on an element.
pub fn attribute(node: &Handle, key: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Concatenated text of all descendant text nodes. Entities are already
/// decoded by the parser.
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

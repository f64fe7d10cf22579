//! DOM adapter and tree utilities.
//!
//! Thin wrappers over the `kuchikiki` rc-linked tree plus the structural
//! predicates and mutation-safe traversal the extraction pipeline relies on.
//! The traversal helpers obtain the next pointer *before* a node is detached,
//! so removing the current node can never invalidate the walk.

use html5ever::{namespace_url, ns, LocalName, QualName};
use kuchikiki::traits::TendrilSink;

// Re-export the node handle so downstream code can hold and inspect the
// trees this crate produces.
pub use kuchikiki::NodeRef;

use crate::patterns::{DIV_TO_P_ELEMS, PHRASING_ELEMS, WHITESPACE};

// === Parsing and serialization ===

/// Parse a complete HTML document. Implicit `<html>`/`<head>`/`<body>` are
/// synthesized when missing.
#[must_use]
pub fn parse_html(html: &str) -> NodeRef {
    kuchikiki::parse_html().one(html)
}

/// Serialize a node and its subtree to HTML.
#[must_use]
pub fn outer_html(node: &NodeRef) -> String {
    let mut buf = Vec::new();
    let _ = node.serialize(&mut buf);
    String::from_utf8(buf).unwrap_or_default()
}

/// Serialize only the children of a node.
#[must_use]
pub fn inner_html(node: &NodeRef) -> String {
    let mut out = String::new();
    for child in node.children() {
        out.push_str(&outer_html(&child));
    }
    out
}

// === Element basics ===

/// Create a detached HTML element with the given tag name.
#[must_use]
pub fn new_element(tag: &str) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, ns!(html), LocalName::from(tag)),
        vec![],
    )
}

/// Lowercase tag name, `None` for non-element nodes.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.as_element().map(|el| el.name.local.as_ref().to_string())
}

/// Whether the node is an element with the given tag name.
#[must_use]
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element()
        .is_some_and(|el| el.name.local.as_ref() == tag)
}

/// Whether the node is an element whose tag is in `tags`.
#[must_use]
pub fn is_one_of(node: &NodeRef, tags: &[&str]) -> bool {
    node.as_element()
        .is_some_and(|el| tags.contains(&el.name.local.as_ref()))
}

/// Get an attribute value.
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|el| el.attributes.borrow().get(name).map(str::to_string))
}

/// Set an attribute value.
pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().insert(name, value.to_string());
    }
}

/// Remove an attribute if present.
pub fn remove_attr(node: &NodeRef, name: &str) {
    if let Some(el) = node.as_element() {
        el.attributes.borrow_mut().remove(name);
    }
}

/// Whether the element carries the attribute.
#[must_use]
pub fn has_attr(node: &NodeRef, name: &str) -> bool {
    node.as_element()
        .is_some_and(|el| el.attributes.borrow().contains(name))
}

/// All attributes as owned `(name, value)` pairs.
#[must_use]
pub fn attr_pairs(node: &NodeRef) -> Vec<(String, String)> {
    node.as_element().map_or_else(Vec::new, |el| {
        el.attributes
            .borrow()
            .map
            .iter()
            .map(|(name, attr)| (name.local.as_ref().to_string(), attr.value.clone()))
            .collect()
    })
}

/// `class + " " + id`, the match string the heuristics test against.
#[must_use]
pub fn match_string(node: &NodeRef) -> String {
    let class = attr(node, "class").unwrap_or_default();
    let id = attr(node, "id").unwrap_or_default();
    format!("{class} {id}")
}

// === Navigation ===

/// Direct element children.
#[must_use]
pub fn element_children(node: &NodeRef) -> Vec<NodeRef> {
    node.children().filter(|c| c.as_element().is_some()).collect()
}

/// First element child, if any.
#[must_use]
pub fn first_element_child(node: &NodeRef) -> Option<NodeRef> {
    node.children().find(|c| c.as_element().is_some())
}

/// Next sibling that is an element.
#[must_use]
pub fn next_element_sibling(node: &NodeRef) -> Option<NodeRef> {
    let mut cur = node.next_sibling();
    while let Some(n) = cur {
        if n.as_element().is_some() {
            return Some(n);
        }
        cur = n.next_sibling();
    }
    None
}

/// Next sibling, skipping text nodes that are entirely whitespace.
#[must_use]
pub fn next_non_whitespace_sibling(node: &NodeRef) -> Option<NodeRef> {
    let mut cur = node.next_sibling();
    while let Some(n) = cur {
        let skip = n
            .as_text()
            .is_some_and(|t| WHITESPACE.is_match(&t.borrow()));
        if !skip {
            return Some(n);
        }
        cur = n.next_sibling();
    }
    None
}

/// Element ancestors, closest first, up to `max_depth` (`0` = unlimited).
#[must_use]
pub fn ancestors(node: &NodeRef, max_depth: usize) -> Vec<NodeRef> {
    let mut out = Vec::new();
    let mut cur = node.parent();
    while let Some(parent) = cur {
        if parent.as_element().is_none() {
            break;
        }
        out.push(parent.clone());
        if max_depth != 0 && out.len() >= max_depth {
            break;
        }
        cur = parent.parent();
    }
    out
}

/// Whether any ancestor within `max_depth` (negative = unlimited) has the
/// tag and satisfies the filter.
#[must_use]
pub fn has_ancestor_tag(
    node: &NodeRef,
    tag: &str,
    max_depth: i32,
    filter: Option<&dyn Fn(&NodeRef) -> bool>,
) -> bool {
    let mut depth = 0;
    let mut cur = node.parent();
    while let Some(parent) = cur {
        if max_depth > 0 && depth > max_depth {
            return false;
        }
        if is_tag(&parent, tag) && filter.map_or(true, |f| f(&parent)) {
            return true;
        }
        depth += 1;
        cur = parent.parent();
    }
    false
}

/// All element descendants with one of the given tag names, in tree order.
///
/// Collected eagerly so callers can mutate while iterating; removal loops
/// run over the collection in reverse.
#[must_use]
pub fn elements_by_tag(root: &NodeRef, tags: &[&str]) -> Vec<NodeRef> {
    root.descendants()
        .filter(|n| is_one_of(n, tags))
        .collect()
}

/// Count of element nodes in the subtree, root excluded.
#[must_use]
pub fn element_count(root: &NodeRef) -> usize {
    root.descendants().filter(|n| n.as_element().is_some()).count()
}

// === Mutation-safe traversal ===

/// Depth-first successor: first element child, else next sibling, else the
/// nearest ancestor's next sibling. With `ignore_self_and_kids`, the
/// subtree under `node` is skipped.
#[must_use]
pub fn next_in_tree(node: &NodeRef, ignore_self_and_kids: bool) -> Option<NodeRef> {
    if !ignore_self_and_kids {
        if let Some(child) = first_element_child(node) {
            return Some(child);
        }
    }
    if let Some(sibling) = next_element_sibling(node) {
        return Some(sibling);
    }
    let mut cur = node.parent();
    while let Some(parent) = cur {
        if let Some(sibling) = next_element_sibling(&parent) {
            return Some(sibling);
        }
        cur = parent.parent();
    }
    None
}

/// Detach `node` and return its depth-first successor outside the removed
/// subtree. The successor is computed before detaching.
#[must_use]
pub fn remove_and_get_next(node: &NodeRef) -> Option<NodeRef> {
    let next = next_in_tree(node, true);
    node.detach();
    next
}

/// Rename an element in place: a new element takes over the attributes,
/// children, and tree position of the old one. Returns the replacement.
pub fn set_node_tag(node: &NodeRef, tag: &str) -> NodeRef {
    let replacement = new_element(tag);
    if let (Some(old), Some(new)) = (node.as_element(), replacement.as_element()) {
        let old_attrs = old.attributes.borrow();
        let mut new_attrs = new.attributes.borrow_mut();
        new_attrs.map.clone_from(&old_attrs.map);
    }
    node.insert_before(replacement.clone());
    while let Some(child) = node.first_child() {
        replacement.append(child);
    }
    node.detach();
    replacement
}

/// Remove every node in the collection; iterates in reverse so earlier
/// entries stay valid while later ones detach.
pub fn remove_nodes(nodes: &[NodeRef], filter: impl Fn(&NodeRef) -> bool) {
    for node in nodes.iter().rev() {
        if filter(node) {
            node.detach();
        }
    }
}

// === Structural predicates ===

/// Whether a text node contains only whitespace.
#[must_use]
pub fn is_whitespace_text(node: &NodeRef) -> bool {
    node.as_text()
        .is_some_and(|t| WHITESPACE.is_match(&t.borrow()))
}

/// Whitespace for flow purposes: an all-whitespace text node or a `<br>`.
#[must_use]
pub fn is_whitespace(node: &NodeRef) -> bool {
    is_whitespace_text(node) || is_tag(node, "br")
}

/// An element with no text and no children other than `<br>`/`<hr>`.
#[must_use]
pub fn is_element_without_content(node: &NodeRef) -> bool {
    if node.as_element().is_none() {
        return false;
    }
    if !node.text_contents().trim().is_empty() {
        return false;
    }
    let children = element_children(node);
    children.is_empty()
        || children
            .iter()
            .all(|c| is_tag(c, "br") || is_tag(c, "hr"))
}

/// Inline-level content: text, a fixed set of inline tags, or an
/// `a`/`del`/`ins` whose every child is itself phrasing.
#[must_use]
pub fn is_phrasing_content(node: &NodeRef) -> bool {
    if node.as_text().is_some() {
        return true;
    }
    let Some(el) = node.as_element() else {
        return false;
    };
    let tag = el.name.local.as_ref();
    if PHRASING_ELEMS.contains(&tag) {
        return true;
    }
    matches!(tag, "a" | "del" | "ins") && node.children().all(|c| is_phrasing_content(&c))
}

/// Exactly one element child with the given tag, and no meaningful text
/// outside it.
#[must_use]
pub fn has_single_tag_inside(node: &NodeRef, tag: &str) -> bool {
    let children = element_children(node);
    if children.len() != 1 || !is_tag(&children[0], tag) {
        return false;
    }
    !node.children().any(|c| {
        c.as_text()
            .is_some_and(|t| !WHITESPACE.is_match(&t.borrow()))
    })
}

/// Whether the node has any block-level descendant.
#[must_use]
pub fn has_child_block_element(node: &NodeRef) -> bool {
    node.children().any(|child| {
        is_one_of(&child, DIV_TO_P_ELEMS) || has_child_block_element(&child)
    })
}

/// A node containing a single `<img>`, possibly nested in childless
/// wrappers with no text.
#[must_use]
pub fn is_single_image(node: &NodeRef) -> bool {
    let mut cur = node.clone();
    loop {
        if is_tag(&cur, "img") {
            return true;
        }
        let children = element_children(&cur);
        if children.len() != 1 || !cur.text_contents().trim().is_empty() {
            return false;
        }
        cur = children[0].clone();
    }
}

/// Heuristic visibility check: hidden/aria-hidden markers, inline
/// `display:none`/`visibility:hidden`, and modal dialogs all count as
/// invisible.
#[must_use]
pub fn is_probably_visible(node: &NodeRef) -> bool {
    if let Some(style) = attr(node, "style") {
        let style = style.to_lowercase();
        let hidden = style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .any(|(prop, value)| {
                let prop = prop.trim();
                let value = value.trim();
                (prop == "display" && value == "none")
                    || (prop == "visibility" && value == "hidden")
            });
        if hidden {
            return false;
        }
    }
    if has_attr(node, "hidden") {
        return false;
    }
    if attr(node, "aria-modal").as_deref() == Some("true")
        || attr(node, "role").as_deref() == Some("dialog")
    {
        return false;
    }
    if attr(node, "aria-hidden").as_deref() == Some("true") {
        let fallback_image = attr(node, "class")
            .is_some_and(|c| c.contains("fallback-image"));
        if !fallback_image {
            return false;
        }
    }
    true
}

//! Candidate scoring support: class/id weighting, per-tag score
//! initialization, and the side table that carries scores without touching
//! the DOM.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use kuchikiki::NodeRef;

use crate::dom;
use crate::patterns::{NEGATIVE_CLASS, POSITIVE_CLASS};

/// Stable identity for a live node: the address of its rc allocation.
/// Valid as long as the node is kept alive, which the scorer guarantees by
/// holding a reference to every candidate it registers.
#[must_use]
pub(crate) fn node_key(node: &NodeRef) -> usize {
    Rc::as_ptr(&node.0) as usize
}

/// Transient per-attempt annotations: content scores and data-table marks.
/// Scores never live on the tree itself, so a restored snapshot starts
/// clean by construction.
#[derive(Debug, Default)]
pub(crate) struct ScoreStore {
    scores: HashMap<usize, f64>,
    data_tables: HashSet<usize>,
}

impl ScoreStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, node: &NodeRef) -> Option<f64> {
        self.scores.get(&node_key(node)).copied()
    }

    pub(crate) fn set(&mut self, node: &NodeRef, score: f64) {
        self.scores.insert(node_key(node), score);
    }

    pub(crate) fn add(&mut self, node: &NodeRef, delta: f64) {
        *self.scores.entry(node_key(node)).or_insert(0.0) += delta;
    }

    pub(crate) fn has(&self, node: &NodeRef) -> bool {
        self.scores.contains_key(&node_key(node))
    }

    pub(crate) fn mark_data_table(&mut self, node: &NodeRef, is_data: bool) {
        if is_data {
            self.data_tables.insert(node_key(node));
        } else {
            self.data_tables.remove(&node_key(node));
        }
    }

    pub(crate) fn is_data_table(&self, node: &NodeRef) -> bool {
        self.data_tables.contains(&node_key(node))
    }
}

/// Class/id weight: ±25 per attribute matching the positive or negative
/// pattern. Zero when class weighting is disabled for this attempt.
#[must_use]
pub(crate) fn class_weight(node: &NodeRef, weigh_classes: bool) -> f64 {
    if !weigh_classes {
        return 0.0;
    }
    let mut weight = 0.0;
    for name in ["class", "id"] {
        if let Some(value) = dom::attr(node, name).filter(|v| !v.is_empty()) {
            if NEGATIVE_CLASS.is_match(&value) {
                weight -= 25.0;
            }
            if POSITIVE_CLASS.is_match(&value) {
                weight += 25.0;
            }
        }
    }
    weight
}

/// Starting score for a freshly registered candidate, by tag plus class
/// weight.
#[must_use]
pub(crate) fn initial_score(node: &NodeRef, weigh_classes: bool) -> f64 {
    let base = match dom::tag_name(node).as_deref() {
        Some("div") => 5.0,
        Some("pre" | "td" | "blockquote") => 3.0,
        Some("address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" | "form") => -3.0,
        Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th") => -5.0,
        _ => 0.0,
    };
    base + class_weight(node, weigh_classes)
}

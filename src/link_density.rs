//! Link density measurement.
//!
//! The fraction of an element's text that sits inside anchors. Link-heavy
//! blocks are usually navigation or related-content widgets rather than
//! article prose; several cleaning passes compare this ratio against their
//! cutoffs. Fragment-only anchors (`href="#…"`) weigh less since they
//! usually point within the article itself.

use kuchikiki::NodeRef;

use crate::dom;
use crate::patterns::HASH_URL;
use crate::text::inner_text;

/// Weight applied to anchors that only target a fragment.
const HASH_LINK_COEFFICIENT: f64 = 0.3;

/// Ratio of anchor text length to total text length, in `[0, 1]`-ish range.
/// `0.0` when the element has no text.
#[must_use]
pub fn link_density(node: &NodeRef) -> f64 {
    let text_length = inner_text(node, true).chars().count();
    if text_length == 0 {
        return 0.0;
    }

    let mut link_length = 0.0;
    for anchor in dom::elements_by_tag(node, &["a"]) {
        let coefficient = dom::attr(&anchor, "href")
            .filter(|href| HASH_URL.is_match(href))
            .map_or(1.0, |_| HASH_LINK_COEFFICIENT);
        link_length += inner_text(&anchor, true).chars().count() as f64 * coefficient;
    }

    link_length / text_length as f64
}

//! Document title cleanup.
//!
//! Page `<title>` text usually carries site branding around the real
//! headline. This pass strips the branding side of separator-delimited
//! titles, falls back to a lone `<h1>` for degenerate lengths, and reverts
//! whenever stripping leaves too little behind.

use kuchikiki::NodeRef;

use crate::dom;
use crate::patterns::{
    NORMALIZE, TITLE_FIRST_SEGMENT, TITLE_HIERARCHY_SEPARATOR, TITLE_SEPARATOR,
    TITLE_SEPARATOR_CHARS,
};
use crate::text::word_count;

/// Derive the article title from the document.
#[must_use]
pub(crate) fn article_title(doc: &NodeRef) -> Option<String> {
    let orig_title = doc
        .select_first("title")
        .ok()
        .map(|t| t.as_node().text_contents().trim().to_string())
        .filter(|t| !t.is_empty())?;

    let mut cur_title = orig_title.clone();
    let mut had_hierarchical_separators = false;

    if TITLE_SEPARATOR.is_match(&cur_title) {
        had_hierarchical_separators = TITLE_HIERARCHY_SEPARATOR.is_match(&cur_title);

        // Keep the side before the last separator; when that side is too
        // short the branding is probably in front, so drop it instead.
        if let Some(last) = TITLE_SEPARATOR.find_iter(&orig_title).last() {
            cur_title = orig_title[..last.start()].to_string();
            if word_count(&cur_title) < 3 {
                cur_title = TITLE_FIRST_SEGMENT.replace(&orig_title, "").into_owned();
            }
        }
    } else if cur_title.contains(": ") {
        let trimmed = cur_title.trim().to_string();
        let heading_matches = dom::elements_by_tag(doc, &["h1", "h2"])
            .iter()
            .any(|h| h.text_contents().trim() == trimmed);

        if !heading_matches {
            if let Some(last_colon) = cur_title.rfind(':') {
                let after_last = cur_title[last_colon + 1..].trim().to_string();
                let first_colon = cur_title.find(':');
                if word_count(&after_last) < 3 {
                    // Too little after the last colon; take everything
                    // after the first one instead.
                    if let Some(first) = first_colon {
                        let after_first = cur_title[first + 1..].trim().to_string();
                        cur_title = after_first;
                    }
                } else if first_colon
                    .is_some_and(|first| word_count(&cur_title[..first]) > 5)
                {
                    // A long clause before the colon means this is not a
                    // branding prefix; keep the whole title.
                    cur_title = orig_title.clone();
                } else {
                    cur_title = after_last;
                }
            }
        }
    } else if cur_title.chars().count() > 150 || cur_title.chars().count() < 15 {
        let h1s = dom::elements_by_tag(doc, &["h1"]);
        if h1s.len() == 1 {
            cur_title = h1s[0].text_contents().trim().to_string();
        }
    }

    cur_title = NORMALIZE.replace_all(cur_title.trim(), " ").into_owned();

    // A very short result only stands when it clearly came from splitting
    // off exactly one branding word.
    let cur_words = word_count(&cur_title);
    if cur_words <= 4 {
        let orig_without_separators = TITLE_SEPARATOR_CHARS.replace_all(&orig_title, "");
        let orig_words = word_count(&orig_without_separators);
        if !had_hierarchical_separators || cur_words != orig_words.saturating_sub(1) {
            cur_title = orig_title;
        }
    }

    Some(cur_title)
}

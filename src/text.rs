//! Text utilities: normalization, word counting, similarity, and the
//! minimal HTML-entity unescape used on metadata fields.

use kuchikiki::NodeRef;

use crate::patterns::{COMMAS, NORMALIZE, TOKENIZE};

/// Concatenated descendant text, trimmed. With `normalize`, interior runs
/// of whitespace collapse to single spaces.
#[must_use]
pub fn inner_text(node: &NodeRef, normalize: bool) -> String {
    let text = node.text_contents();
    let text = text.trim();
    if normalize {
        NORMALIZE.replace_all(text, " ").into_owned()
    } else {
        text.to_string()
    }
}

/// Number of whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of comma-like characters (ASCII comma plus its lookalikes).
#[must_use]
pub fn comma_count(text: &str) -> usize {
    COMMAS.find_iter(text).count()
}

/// One-directional token overlap: `1 - len(tokens of b not in a) / len(tokens of b)`,
/// over lowercase `\W+`-separated tokens. `0.0` when either side is empty.
#[must_use]
pub fn text_similarity(text_a: &str, text_b: &str) -> f64 {
    let tokens_a: Vec<String> = TOKENIZE
        .split(&text_a.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    let tokens_b: Vec<String> = TOKENIZE
        .split(&text_b.to_lowercase())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let unique: Vec<&str> = tokens_b
        .iter()
        .filter(|t| !tokens_a.contains(t))
        .map(String::as_str)
        .collect();
    let b_len = tokens_b.join(" ").chars().count() as f64;
    let unique_len = unique.join(" ").chars().count() as f64;
    1.0 - unique_len / b_len
}

/// A plausible author line: non-empty and under 100 characters once trimmed.
#[must_use]
pub fn is_valid_byline(text: &str) -> bool {
    let len = text.trim().chars().count();
    len > 0 && len < 100
}

/// Unescape the HTML entities that survive in metadata strings: the five
/// named entities and numeric character references. Invalid code points
/// become U+FFFD.
#[must_use]
pub fn unescape_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest.find(';') else {
            out.push_str(rest);
            return out;
        };
        let entity = &rest[1..end];
        match decode_entity(entity) {
            Some(decoded) => {
                out.push_str(&decoded);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    match entity {
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "quot" => return Some("\"".to_string()),
        "apos" => return Some("'".to_string()),
        _ => {}
    }
    let digits = entity.strip_prefix('#')?;
    let value = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    Some(char::from_u32(value).unwrap_or('\u{FFFD}').to_string())
}

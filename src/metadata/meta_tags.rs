//! `<meta>` tag scanning.
//!
//! Collects metadata values keyed by their normalized property/name:
//! lowercased, spaces removed, dots converted to colons. Both the
//! `property` attribute (OpenGraph style, possibly space-separated) and
//! the `name` attribute (Dublin Core, parsely, weibo, twitter, bare) are
//! consulted.

use std::collections::HashMap;

use kuchikiki::NodeRef;

use crate::patterns::{META_NAME, META_PROPERTY};

/// Scan every `<meta>` tag into a normalized key → content map.
pub(crate) fn collect_meta_values(doc: &NodeRef) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let Ok(metas) = doc.select("meta") else {
        return values;
    };

    for meta in metas {
        let attributes = meta.attributes.borrow();
        let Some(content) = attributes.get("content").filter(|c| !c.is_empty()) else {
            continue;
        };
        let name_attr = attributes.get("name");
        let property_attr = attributes.get("property");

        let mut matched = false;
        if let Some(property) = property_attr {
            for found in META_PROPERTY.find_iter(property) {
                let key: String = found
                    .as_str()
                    .to_lowercase()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                values.insert(key, content.trim().to_string());
                matched = true;
            }
        }

        if !matched {
            if let Some(name) = name_attr {
                if META_NAME.is_match(name) {
                    let key: String = name
                        .to_lowercase()
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect::<String>()
                        .replace('.', ":");
                    values.insert(key, content.trim().to_string());
                }
            }
        }
    }

    values
}

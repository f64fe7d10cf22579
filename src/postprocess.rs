//! Post-processing of the grabbed article.
//!
//! Runs after a successful grab: URL resolution against the base URI,
//! `javascript:` link flattening, nested container simplification, and
//! class attribute cleanup.

use kuchikiki::NodeRef;
use url::Url;

use crate::dom;
use crate::options::Options;
use crate::patterns::SRCSET_URL;

/// Apply every post-grab transform to the article subtree.
pub(crate) fn post_process(article: &NodeRef, options: &Options) {
    fix_relative_uris(article, options.base_uri.as_deref());
    simplify_nested_elements(article);
    if !options.keep_classes {
        clean_classes(article, &options.classes_to_preserve);
    }
}

fn resolve(uri: &str, base: Option<&Url>) -> String {
    // Fragment links keep pointing within the page.
    if uri.starts_with('#') {
        return uri.to_string();
    }
    match base {
        Some(base) => base
            .join(uri)
            .map_or_else(|_| uri.to_string(), |u| u.to_string()),
        None => uri.to_string(),
    }
}

/// Make link and media URLs absolute; flatten `javascript:` pseudo-links
/// into their text.
fn fix_relative_uris(article: &NodeRef, base_uri: Option<&str>) {
    let base = base_uri.and_then(|b| Url::parse(b).ok());

    for link in dom::elements_by_tag(article, &["a"]) {
        let Some(href) = dom::attr(&link, "href") else {
            continue;
        };
        if href.starts_with("javascript:") {
            let children: Vec<NodeRef> = link.children().collect();
            if children.len() == 1 && children[0].as_text().is_some() {
                // A text-only pseudo-link becomes plain text.
                let text = NodeRef::new_text(link.text_contents());
                link.insert_before(text);
            } else {
                let container = dom::new_element("span");
                while let Some(child) = link.first_child() {
                    container.append(child);
                }
                link.insert_before(container);
            }
            link.detach();
        } else {
            dom::set_attr(&link, "href", &resolve(&href, base.as_ref()));
        }
    }

    for media in dom::elements_by_tag(article, &["img", "picture", "figure", "video", "audio", "source"])
    {
        if let Some(src) = dom::attr(&media, "src") {
            dom::set_attr(&media, "src", &resolve(&src, base.as_ref()));
        }
        if let Some(poster) = dom::attr(&media, "poster") {
            dom::set_attr(&media, "poster", &resolve(&poster, base.as_ref()));
        }
        if let Some(srcset) = dom::attr(&media, "srcset") {
            let rewritten = SRCSET_URL.replace_all(&srcset, |caps: &regex::Captures| {
                let url = resolve(&caps[1], base.as_ref());
                let descriptor = caps.get(2).map_or("", |m| m.as_str());
                let separator = caps.get(3).map_or("", |m| m.as_str());
                format!("{url}{descriptor}{separator}")
            });
            dom::set_attr(&media, "srcset", &rewritten);
        }
    }
}

/// Collapse pointless wrapper chains: empty `div`/`section` nodes are
/// dropped, and one that only holds another `div`/`section` is replaced by
/// its child (which inherits the attributes).
fn simplify_nested_elements(article: &NodeRef) {
    let mut node = Some(article.clone());
    while let Some(current) = node {
        let is_container = dom::is_one_of(&current, &["div", "section"]);
        let reader_managed = dom::attr(&current, "id")
            .is_some_and(|id| id.starts_with("readability"));

        if current.parent().is_some() && is_container && !reader_managed {
            if dom::is_element_without_content(&current) {
                node = dom::remove_and_get_next(&current);
                continue;
            }
            if dom::has_single_tag_inside(&current, "div")
                || dom::has_single_tag_inside(&current, "section")
            {
                if let Some(child) = dom::first_element_child(&current) {
                    for (name, value) in dom::attr_pairs(&current) {
                        dom::set_attr(&child, &name, &value);
                    }
                    current.insert_before(child.clone());
                    current.detach();
                    node = Some(child);
                    continue;
                }
            }
        }

        node = dom::next_in_tree(&current, false);
    }
}

/// Drop every class not in the preserve list; the article wrapper's own
/// `page` class is always kept.
fn clean_classes(node: &NodeRef, classes_to_preserve: &[String]) {
    if let Some(class) = dom::attr(node, "class") {
        let kept: Vec<&str> = class
            .split_whitespace()
            .filter(|c| *c == "page" || classes_to_preserve.iter().any(|p| p == c))
            .collect();
        if kept.is_empty() {
            dom::remove_attr(node, "class");
        } else {
            dom::set_attr(node, "class", &kept.join(" "));
        }
    }
    for child in dom::element_children(node) {
        clean_classes(&child, classes_to_preserve);
    }
}

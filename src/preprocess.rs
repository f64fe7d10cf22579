//! Document preparation passes that run before scoring.
//!
//! These transforms normalize the messy constructs that would otherwise
//! confuse the scorer: `<br><br>` paragraph breaks, `<font>` markup,
//! scripts and styles, comment/doctype noise, and lazy images hidden
//! behind `<noscript>` fallbacks.

use kuchikiki::{NodeData, NodeRef};

use crate::dom;
use crate::patterns::IMG_EXTENSIONS;

/// Remove every comment, doctype, and processing-instruction node.
pub fn remove_comments(root: &NodeRef) {
    let noise: Vec<NodeRef> = root
        .inclusive_descendants()
        .filter(|n| {
            matches!(
                n.data(),
                NodeData::Comment(_) | NodeData::Doctype(_) | NodeData::ProcessingInstruction(_)
            )
        })
        .collect();
    for node in noise.iter().rev() {
        node.detach();
    }
}

/// Remove `<script>` and `<noscript>` elements. Must run after JSON-LD
/// extraction, which reads `<script type="application/ld+json">` blocks.
pub fn remove_scripts(root: &NodeRef) {
    dom::remove_nodes(&dom::elements_by_tag(root, &["script", "noscript"]), |_| true);
}

/// Remove `<style>` elements, convert `<br><br>` runs into paragraphs, and
/// rename `<font>` to `<span>`.
pub fn prep_document(doc: &NodeRef) {
    dom::remove_nodes(&dom::elements_by_tag(doc, &["style"]), |_| true);

    if let Ok(body) = doc.select_first("body") {
        replace_brs(body.as_node());
    }

    for font in dom::elements_by_tag(doc, &["font"]) {
        dom::set_node_tag(&font, "span");
    }
}

/// Replace two or more consecutive `<br>`s with a paragraph, then pull the
/// following phrasing run into it. Whitespace between the breaks does not
/// interrupt the chain.
pub fn replace_brs(root: &NodeRef) {
    for br in dom::elements_by_tag(root, &["br"]) {
        if br.parent().is_none() {
            continue;
        }
        let mut next = br.next_sibling();

        // Drop every <br> that follows, keeping track of whether any were
        // found: a lone <br> stays untouched.
        let mut replaced = false;
        while let Some(sibling) = next_skipping_whitespace(next.as_ref()) {
            if !dom::is_tag(&sibling, "br") {
                break;
            }
            replaced = true;
            next = sibling.next_sibling();
            sibling.detach();
        }

        if !replaced {
            continue;
        }

        let p = dom::new_element("p");
        br.insert_before(p.clone());
        br.detach();

        // Move the phrasing run after the new paragraph into it, stopping
        // at another <br><br> chain or the first non-phrasing node.
        let mut cursor = p.next_sibling();
        while let Some(node) = cursor {
            if dom::is_tag(&node, "br") {
                if let Some(after) = next_skipping_whitespace(node.next_sibling().as_ref()) {
                    if dom::is_tag(&after, "br") {
                        break;
                    }
                }
            }
            if !dom::is_phrasing_content(&node) {
                break;
            }
            cursor = node.next_sibling();
            p.append(node);
        }

        while let Some(last) = p.last_child() {
            if dom::is_whitespace(&last) {
                last.detach();
            } else {
                break;
            }
        }

        if let Some(parent) = p.parent() {
            if dom::is_tag(&parent, "p") {
                dom::set_node_tag(&parent, "div");
            }
        }
    }
}

fn next_skipping_whitespace(node: Option<&NodeRef>) -> Option<NodeRef> {
    let mut cur = node.cloned();
    while let Some(n) = cur {
        if !dom::is_whitespace_text(&n) {
            return Some(n);
        }
        cur = n.next_sibling();
    }
    None
}

/// Recover images hidden behind `<noscript>` fallbacks.
///
/// Images with no meaningful source attribute are dropped; a `<noscript>`
/// holding a single image replaces a preceding single-image sibling,
/// inheriting source-ish attributes the fallback lacks.
pub fn unwrap_noscript_images(doc: &NodeRef) {
    dom::remove_nodes(&dom::elements_by_tag(doc, &["img"]), |img| {
        !dom::attr_pairs(img).iter().any(|(name, value)| {
            matches!(name.as_str(), "src" | "srcset" | "data-src" | "data-srcset")
                || IMG_EXTENSIONS.is_match(value)
        })
    });

    for noscript in dom::elements_by_tag(doc, &["noscript"]) {
        // The noscript payload is unparsed in some trees; reparse it to
        // inspect its structure.
        let inner = dom::parse_html(&dom::inner_html(&noscript));
        let Ok(inner_body) = inner.select_first("body") else {
            continue;
        };
        let inner_body = inner_body.as_node().clone();
        if !dom::is_single_image(&inner_body) {
            continue;
        }
        let Some(prev) = prev_element_sibling(&noscript) else {
            continue;
        };
        if !dom::is_single_image(&prev) {
            continue;
        }

        let prev_img = if dom::is_tag(&prev, "img") {
            prev.clone()
        } else {
            match dom::elements_by_tag(&prev, &["img"]).into_iter().next() {
                Some(img) => img,
                None => continue,
            }
        };
        let Some(new_img) = dom::elements_by_tag(&inner_body, &["img"]).into_iter().next()
        else {
            continue;
        };

        // Carry over source attributes the fallback image is missing;
        // conflicting ones are preserved under a data-old- prefix.
        for (name, value) in dom::attr_pairs(&prev_img) {
            if value.is_empty() {
                continue;
            }
            if name == "src" || name == "srcset" || IMG_EXTENSIONS.is_match(&value) {
                if dom::attr(&new_img, &name).as_deref() == Some(value.as_str()) {
                    continue;
                }
                let target = if dom::has_attr(&new_img, &name) {
                    format!("data-old-{name}")
                } else {
                    name
                };
                dom::set_attr(&new_img, &target, &value);
            }
        }

        if let Some(replacement) = dom::first_element_child(&inner_body) {
            prev.insert_before(replacement);
            prev.detach();
        }
    }
}

fn prev_element_sibling(node: &NodeRef) -> Option<NodeRef> {
    let mut cur = node.previous_sibling();
    while let Some(n) = cur {
        if n.as_element().is_some() {
            return Some(n);
        }
        cur = n.previous_sibling();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_double_br_becomes_paragraph() {
        let doc = parse_html("<div>foo<br>bar<br> <br><br>abc</div>");
        let div = doc.select_first("div").unwrap().as_node().clone();
        replace_brs(&div);
        // One lone <br> survives, the chain is replaced by a paragraph.
        assert_eq!(dom::elements_by_tag(&div, &["br"]).len(), 1);
        let ps = dom::elements_by_tag(&div, &["p"]);
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].text_contents().trim(), "abc");
    }

    #[test]
    fn test_phrasing_run_moves_into_paragraph() {
        let doc = parse_html("<div>a<br><br>b<em>c</em><div>block</div></div>");
        let div = doc.select_first("div").unwrap().as_node().clone();
        replace_brs(&div);
        let p = doc.select_first("p").unwrap().as_node().clone();
        assert_eq!(p.text_contents(), "bc");
        assert!(doc.select_first("p em").is_ok());
    }

    #[test]
    fn test_fonts_become_spans() {
        let doc = parse_html("<body><p><font face=\"arial\">styled</font></p></body>");
        prep_document(&doc);
        assert!(doc.select_first("font").is_err());
        let span = doc.select_first("span").unwrap().as_node().clone();
        assert_eq!(dom::attr(&span, "face"), Some("arial".to_string()));
    }

    #[test]
    fn test_styles_and_comments_removed() {
        let doc = parse_html("<body><!-- note --><style>p{}</style><p>keep</p></body>");
        remove_comments(&doc);
        prep_document(&doc);
        assert!(doc.select_first("style").is_err());
        assert!(!dom::outer_html(&doc).contains("note"));
        assert!(doc.select_first("p").is_ok());
    }

    #[test]
    fn test_scripts_removed() {
        let doc = parse_html("<body><script>var x;</script><noscript>fallback</noscript><p>keep</p></body>");
        remove_scripts(&doc);
        assert!(doc.select_first("script").is_err());
        assert!(doc.select_first("noscript").is_err());
    }

    #[test]
    fn test_noscript_image_recovered() {
        let doc = parse_html(
            "<body><div><img src=\"data:image/gif;base64,R0lGOD\" data-src=\"real.jpg\"></div>\
             <noscript><img src=\"real.jpg\" class=\"loaded\"></noscript></body>",
        );
        unwrap_noscript_images(&doc);
        remove_scripts(&doc);
        let imgs = dom::elements_by_tag(&doc, &["img"]);
        assert_eq!(imgs.len(), 1);
        assert_eq!(dom::attr(&imgs[0], "src"), Some("real.jpg".to_string()));
        assert_eq!(dom::attr(&imgs[0], "class"), Some("loaded".to_string()));
    }
}

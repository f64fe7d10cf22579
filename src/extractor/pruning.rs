//! Cleaning of the collected article subtree.
//!
//! Runs after sibling collection and strips everything that is not article
//! prose: presentational attributes, forms, share widgets, link farms,
//! layout tables, and empty paragraphs. Tables that actually hold data are
//! classified first so the conditional cleaner spares them, and lazily
//! loaded images are repaired before the cleaner judges image counts.

use kuchikiki::NodeRef;
use regex::Regex;

use crate::dom;
use crate::link_density::link_density;
use crate::options::Options;
use crate::patterns::{
    AD_WORDS, DATA_TABLE_DESCENDANTS, DEPRECATED_SIZE_ATTRIBUTE_ELEMS, DIV_TO_P_ELEMS,
    IMG_EXTENSIONS, IMG_EXT_WITH_DESCRIPTOR, LOADING_WORDS, B64_DATA_URL,
    PRESENTATIONAL_ATTRIBUTES, SHARE_ELEMENTS, SINGLE_IMG_URL, VIDEOS,
};
use crate::scoring::{class_weight, ScoreStore};
use crate::text::{comma_count, inner_text};

use super::state::Flags;

/// Clean the grabbed article subtree in place.
pub(crate) fn prep_article(
    article: &NodeRef,
    flags: Flags,
    options: &Options,
    store: &mut ScoreStore,
) {
    clean_styles(article);

    mark_data_tables(article, store);
    fix_lazy_images(article);

    clean_conditionally(article, "form", flags, options, store);
    clean_conditionally(article, "fieldset", flags, options, store);
    clean(article, "object", options);
    clean(article, "embed", options);
    clean(article, "footer", options);
    clean(article, "link", options);
    clean(article, "aside", options);

    // Share widgets wedged between paragraphs of the main body.
    let share_threshold = options.char_threshold;
    for child in dom::element_children(article) {
        clean_matched_nodes(&child, |node, match_string| {
            SHARE_ELEMENTS.is_match(match_string)
                && node.text_contents().chars().count() < share_threshold
        });
    }

    clean(article, "iframe", options);
    clean(article, "input", options);
    clean(article, "textarea", options);
    clean(article, "select", options);
    clean(article, "button", options);
    clean_headers(article, flags);

    clean_conditionally(article, "table", flags, options, store);
    clean_conditionally(article, "ul", flags, options, store);
    clean_conditionally(article, "div", flags, options, store);

    for h1 in dom::elements_by_tag(article, &["h1"]) {
        dom::set_node_tag(&h1, "h2");
    }

    dom::remove_nodes(&dom::elements_by_tag(article, &["p"]), |p| {
        let media = dom::elements_by_tag(p, &["img", "embed", "object", "iframe"]).len();
        media == 0 && inner_text(p, false).is_empty()
    });

    for br in dom::elements_by_tag(article, &["br"]) {
        if let Some(next) = dom::next_non_whitespace_sibling(&br) {
            if dom::is_tag(&next, "p") {
                br.detach();
            }
        }
    }

    collapse_single_cell_tables(article);
}

/// The pattern deciding which embeds are kept as videos.
fn video_regex(options: &Options) -> &Regex {
    options.allowed_video_regex.as_ref().unwrap_or(&VIDEOS)
}

/// Strip presentational attributes recursively; `width`/`height` survive
/// only on the table-layout tags. `<svg>` subtrees are left alone.
fn clean_styles(node: &NodeRef) {
    if node.as_element().is_none() || dom::is_tag(node, "svg") {
        return;
    }

    for attr in PRESENTATIONAL_ATTRIBUTES {
        dom::remove_attr(node, attr);
    }
    if !dom::is_one_of(node, DEPRECATED_SIZE_ATTRIBUTE_ELEMS) {
        dom::remove_attr(node, "width");
        dom::remove_attr(node, "height");
    }

    for child in dom::element_children(node) {
        clean_styles(&child);
    }
}

/// Classify every `<table>` as data or layout.
pub(crate) fn mark_data_tables(root: &NodeRef, store: &mut ScoreStore) {
    for table in dom::elements_by_tag(root, &["table"]) {
        if dom::attr(&table, "role").as_deref() == Some("presentation") {
            store.mark_data_table(&table, false);
            continue;
        }
        if dom::attr(&table, "datatable").as_deref() == Some("0") {
            store.mark_data_table(&table, false);
            continue;
        }
        if dom::has_attr(&table, "summary") {
            store.mark_data_table(&table, true);
            continue;
        }

        let caption_with_children = dom::elements_by_tag(&table, &["caption"])
            .iter()
            .any(|caption| !dom::element_children(caption).is_empty());
        if caption_with_children {
            store.mark_data_table(&table, true);
            continue;
        }

        if !dom::elements_by_tag(&table, DATA_TABLE_DESCENDANTS).is_empty() {
            store.mark_data_table(&table, true);
            continue;
        }

        if !dom::elements_by_tag(&table, &["table"]).is_empty() {
            store.mark_data_table(&table, false);
            continue;
        }

        let (rows, columns) = row_and_column_count(&table);
        if rows == 1 || columns == 1 {
            store.mark_data_table(&table, false);
            continue;
        }
        if rows >= 10 || columns > 4 {
            store.mark_data_table(&table, true);
            continue;
        }
        store.mark_data_table(&table, rows * columns > 10);
    }
}

fn span_attr(node: &NodeRef, name: &str) -> usize {
    dom::attr(node, name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

fn row_and_column_count(table: &NodeRef) -> (usize, usize) {
    let mut rows = 0;
    let mut columns = 0;
    for tr in dom::elements_by_tag(table, &["tr"]) {
        rows += span_attr(&tr, "rowspan");
        let row_columns: usize = dom::elements_by_tag(&tr, &["td"])
            .iter()
            .map(|td| span_attr(td, "colspan"))
            .sum();
        columns = columns.max(row_columns);
    }
    (rows, columns)
}

/// Repair lazily loaded images: drop tiny base64 placeholders when a real
/// URL hides in another attribute, and surface those URLs as `src`/`srcset`.
pub(crate) fn fix_lazy_images(root: &NodeRef) {
    for elem in dom::elements_by_tag(root, &["img", "picture", "figure"]) {
        if let Some(src) = dom::attr(&elem, "src") {
            if let Some(caps) = B64_DATA_URL.captures(&src) {
                if &caps[1] != "image/svg+xml" {
                    let has_real_image = dom::attr_pairs(&elem)
                        .iter()
                        .any(|(name, value)| name != "src" && IMG_EXTENSIONS.is_match(value));
                    if has_real_image {
                        let payload_start = caps.get(0).map_or(0, |m| m.end());
                        if src.len() - payload_start < 133 {
                            dom::remove_attr(&elem, "src");
                        }
                    }
                }
            }
        }

        let has_src = dom::has_attr(&elem, "src");
        let has_srcset = dom::attr(&elem, "srcset").is_some_and(|v| v != "null");
        let lazy_class = dom::attr(&elem, "class")
            .is_some_and(|c| c.to_lowercase().contains("lazy"));
        if (has_src || has_srcset) && !lazy_class {
            continue;
        }

        for (name, value) in dom::attr_pairs(&elem) {
            if matches!(name.as_str(), "src" | "srcset" | "alt") {
                continue;
            }
            let copy_to = if IMG_EXT_WITH_DESCRIPTOR.is_match(&value) {
                Some("srcset")
            } else if SINGLE_IMG_URL.is_match(&value) {
                Some("src")
            } else {
                None
            };
            let Some(copy_to) = copy_to else { continue };

            if dom::is_tag(&elem, "img") || dom::is_tag(&elem, "picture") {
                dom::set_attr(&elem, copy_to, &value);
            } else if dom::is_tag(&elem, "figure")
                && dom::elements_by_tag(&elem, &["img", "picture"]).is_empty()
            {
                let img = dom::new_element("img");
                dom::set_attr(&img, copy_to, &value);
                elem.append(img);
            }
        }
    }
}

/// Whether an embed element is an allowed video and must survive cleaning.
fn is_allowed_video(node: &NodeRef, videos: &Regex) -> bool {
    if dom::attr_pairs(node).iter().any(|(_, v)| videos.is_match(v)) {
        return true;
    }
    dom::is_tag(node, "object") && videos.is_match(&dom::inner_html(node))
}

/// Remove every element with the given tag, keeping allowed video embeds.
fn clean(article: &NodeRef, tag: &str, options: &Options) {
    let is_embed = matches!(tag, "object" | "embed" | "iframe");
    let videos = video_regex(options);
    dom::remove_nodes(&dom::elements_by_tag(article, &[tag]), |node| {
        !(is_embed && is_allowed_video(node, videos))
    });
}

/// Walk a subtree and remove every node the filter matches, continuing
/// past removed subtrees.
fn clean_matched_nodes(root: &NodeRef, filter: impl Fn(&NodeRef, &str) -> bool) {
    let end_of_search = dom::next_in_tree(root, true);
    let mut next = dom::next_in_tree(root, false);
    while let Some(node) = next {
        if end_of_search.as_ref() == Some(&node) {
            break;
        }
        if filter(&node, &dom::match_string(&node)) {
            next = dom::remove_and_get_next(&node);
        } else {
            next = dom::next_in_tree(&node, false);
        }
    }
}

/// Remove `<h1>`/`<h2>` headers whose class weight is negative.
fn clean_headers(article: &NodeRef, flags: Flags) {
    let weigh = flags.is_active(Flags::WEIGHT_CLASSES);
    dom::remove_nodes(&dom::elements_by_tag(article, &["h1", "h2"]), |header| {
        class_weight(header, weigh) < 0.0
    });
}

/// Fraction of a node's text contributed by descendants with the given
/// tags. `0.0` when the node has no text.
fn text_density(node: &NodeRef, tags: &[&str]) -> f64 {
    let total = inner_text(node, true).chars().count();
    if total == 0 {
        return 0.0;
    }
    let children_length: usize = dom::elements_by_tag(node, tags)
        .iter()
        .map(|child| inner_text(child, true).chars().count())
        .sum();
    children_length as f64 / total as f64
}

/// Remove elements of the given tag that fail the content heuristics.
/// Data tables, code blocks, and allowed video embeds always survive.
fn clean_conditionally(
    article: &NodeRef,
    tag: &str,
    flags: Flags,
    options: &Options,
    store: &ScoreStore,
) {
    if !flags.is_active(Flags::CLEAN_CONDITIONALLY) {
        return;
    }
    let weigh = flags.is_active(Flags::WEIGHT_CLASSES);
    let videos = video_regex(options);
    let modifier = options.link_density_modifier;

    dom::remove_nodes(&dom::elements_by_tag(article, &[tag]), |node| {
        should_clean_node(node, tag, weigh, videos, modifier, store)
    });
}

#[allow(clippy::too_many_lines)]
fn should_clean_node(
    node: &NodeRef,
    tag: &str,
    weigh_classes: bool,
    videos: &Regex,
    link_density_modifier: f64,
    store: &ScoreStore,
) -> bool {
    let is_data = |n: &NodeRef| store.is_data_table(n);

    if tag == "table" {
        let has_data = store.is_data_table(node)
            || dom::elements_by_tag(node, &["table"]).iter().any(|t| is_data(t));
        if has_data {
            return false;
        }
    }
    if dom::has_ancestor_tag(node, "table", -1, Some(&is_data)) {
        return false;
    }
    if dom::has_ancestor_tag(node, "code", 3, None) {
        return false;
    }

    let node_text = inner_text(node, true);
    if comma_count(&node_text) > 10 {
        return false;
    }

    let weight = class_weight(node, weigh_classes);
    if weight < 0.0 {
        return true;
    }

    let mut is_list = tag == "ul" || tag == "ol";
    if !is_list {
        let list_length: usize = dom::elements_by_tag(node, &["ul", "ol"])
            .iter()
            .map(|list| inner_text(list, true).chars().count())
            .sum();
        let total = node_text.chars().count();
        is_list = total > 0 && list_length as f64 / total as f64 > 0.9;
    }

    let p_count = dom::elements_by_tag(node, &["p"]).len();
    let img_count = dom::elements_by_tag(node, &["img"]).len();
    let li_count = dom::elements_by_tag(node, &["li"]).len() as i64 - 100;
    let input_count = dom::elements_by_tag(node, &["input"]).len();
    let heading_density = text_density(node, &["h1", "h2", "h3", "h4", "h5", "h6"]);

    let mut embed_count = 0;
    for embed in dom::elements_by_tag(node, &["object", "embed", "iframe"]) {
        if is_allowed_video(&embed, videos) {
            return false;
        }
        embed_count += 1;
    }

    if AD_WORDS.is_match(&node_text) || LOADING_WORDS.is_match(&node_text) {
        return true;
    }

    let content_length = node_text.chars().count();
    let density = link_density(node);
    let textish_tags: Vec<&str> = ["span", "li", "td"]
        .iter()
        .chain(DIV_TO_P_ELEMS.iter())
        .copied()
        .collect();
    let text_density_value = text_density(node, &textish_tags);
    let is_figure_child = dom::has_ancestor_tag(node, "figure", 3, None);

    let have_to_remove = (!is_figure_child
        && img_count > 1
        && (p_count as f64 / img_count as f64) < 0.5)
        || (!is_list && li_count > p_count as i64)
        || (input_count as i64 > (p_count / 3) as i64)
        || (!is_list
            && !is_figure_child
            && heading_density < 0.9
            && content_length < 25
            && (img_count == 0 || img_count > 2)
            && density > 0.0)
        || (!is_list && weight < 25.0 && density > 0.2 + link_density_modifier)
        || (weight >= 25.0 && density > 0.5 + link_density_modifier)
        || ((embed_count == 1 && content_length < 75) || embed_count > 1)
        || (img_count == 0 && text_density_value == 0.0);

    if is_list && have_to_remove {
        // Image galleries marked up as lists survive: one node per item and
        // exactly one image per <li>.
        for child in dom::element_children(node) {
            if dom::element_children(&child).len() > 1 {
                return true;
            }
        }
        let li_total = dom::elements_by_tag(node, &["li"]).len();
        if img_count == li_total {
            return false;
        }
    }

    have_to_remove
}

/// Replace tables holding a single cell with the cell's contents.
fn collapse_single_cell_tables(article: &NodeRef) {
    for table in dom::elements_by_tag(article, &["table"]) {
        let tbody = if dom::has_single_tag_inside(&table, "tbody") {
            match dom::first_element_child(&table) {
                Some(t) => t,
                None => continue,
            }
        } else {
            table.clone()
        };
        if !dom::has_single_tag_inside(&tbody, "tr") {
            continue;
        }
        let Some(row) = dom::first_element_child(&tbody) else {
            continue;
        };
        if !dom::has_single_tag_inside(&row, "td") {
            continue;
        }
        let Some(cell) = dom::first_element_child(&row) else {
            continue;
        };
        let all_phrasing = cell.children().all(|c| dom::is_phrasing_content(&c));
        let cell = dom::set_node_tag(&cell, if all_phrasing { "p" } else { "div" });
        table.insert_before(cell);
        table.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn prep(html: &str) -> NodeRef {
        let doc = parse_html(html);
        let article = doc.select_first("#article").unwrap().as_node().clone();
        let mut store = ScoreStore::new();
        prep_article(&article, Flags::all(), &Options::default(), &mut store);
        article
    }

    #[test]
    fn test_presentational_attributes_stripped() {
        let article = prep(
            "<div id=\"article\"><p style=\"color:red\" align=\"center\" width=\"10\">Text with enough words to stay around.</p>\
             <table width=\"100\"><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table></div>",
        );
        let p = dom::elements_by_tag(&article, &["p"]).remove(0);
        assert!(!dom::has_attr(&p, "style"));
        assert!(!dom::has_attr(&p, "align"));
        assert!(!dom::has_attr(&p, "width"));
    }

    #[test]
    fn test_data_table_classification() {
        let doc = parse_html(
            "<div>\
             <table id=\"layout\" role=\"presentation\"><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>\
             <table id=\"summary\" summary=\"quarterly numbers\"><tr><td>a</td></tr></table>\
             <table id=\"caption\"><caption><span>t</span></caption><tr><td>a</td></tr></table>\
             <table id=\"narrow\"><tr><td>1</td></tr><tr><td>2</td></tr><tr><td>3</td></tr><tr><td>4</td></tr>\
             <tr><td>5</td></tr><tr><td>6</td></tr><tr><td>7</td></tr><tr><td>8</td></tr>\
             <tr><td>9</td></tr><tr><td>10</td></tr><tr><td>11</td></tr><tr><td>12</td></tr></table>\
             <table id=\"wide\"><tr><td>a</td><td>b</td><td>c</td><td>d</td><td>e</td></tr>\
             <tr><td>a</td><td>b</td><td>c</td><td>d</td><td>e</td></tr></table>\
             </div>",
        );
        let mut store = ScoreStore::new();
        let root = doc.select_first("div").unwrap().as_node().clone();
        mark_data_tables(&root, &mut store);

        let get = |sel: &str| doc.select_first(sel).unwrap().as_node().clone();
        assert!(!store.is_data_table(&get("#layout")));
        assert!(store.is_data_table(&get("#summary")));
        assert!(store.is_data_table(&get("#caption")));
        // Twelve rows but a single column stays layout.
        assert!(!store.is_data_table(&get("#narrow")));
        // More than four columns is data.
        assert!(store.is_data_table(&get("#wide")));
    }

    #[test]
    fn test_lazy_image_repair() {
        let doc = parse_html(
            "<div><img class=\"lazy\" src=\"data:image/gif;base64,R0lGODlhAQABAAAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==\" data-lazy-src=\"https://cdn.example.com/photo.jpg\"></div>",
        );
        let root = doc.select_first("div").unwrap().as_node().clone();
        fix_lazy_images(&root);
        let img = dom::elements_by_tag(&root, &["img"]).remove(0);
        assert_eq!(
            dom::attr(&img, "src").as_deref(),
            Some("https://cdn.example.com/photo.jpg")
        );
    }

    #[test]
    fn test_figure_without_image_gets_one() {
        let doc = parse_html(
            "<div><figure data-src=\"https://cdn.example.com/photo.png\"><figcaption>cap</figcaption></figure></div>",
        );
        let root = doc.select_first("div").unwrap().as_node().clone();
        fix_lazy_images(&root);
        assert_eq!(dom::elements_by_tag(&root, &["img"]).len(), 1);
    }

    #[test]
    fn test_allowed_video_iframe_survives() {
        let article = prep(
            "<div id=\"article\"><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit sed do.</p>\
             <iframe src=\"https://www.youtube.com/embed/abc\"></iframe>\
             <iframe src=\"https://tracker.example.com/pixel\"></iframe></div>",
        );
        let iframes = dom::elements_by_tag(&article, &["iframe"]);
        assert_eq!(iframes.len(), 1);
        assert!(dom::attr(&iframes[0], "src").unwrap().contains("youtube"));
    }

    #[test]
    fn test_forms_and_inputs_removed() {
        let article = prep(
            "<div id=\"article\"><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit sed do.</p>\
             <form action=\"/subscribe\"><input type=\"email\"><button>Go</button></form>\
             <select><option>x</option></select></div>",
        );
        assert!(dom::elements_by_tag(&article, &["form"]).is_empty());
        assert!(dom::elements_by_tag(&article, &["input"]).is_empty());
        assert!(dom::elements_by_tag(&article, &["select"]).is_empty());
        assert!(dom::elements_by_tag(&article, &["button"]).is_empty());
    }

    #[test]
    fn test_h1_renamed_to_h2() {
        let article = prep(
            "<div id=\"article\"><h1>Heading</h1><p>Lorem ipsum dolor sit amet, consectetur adipiscing.</p></div>",
        );
        assert!(dom::elements_by_tag(&article, &["h1"]).is_empty());
        assert_eq!(dom::elements_by_tag(&article, &["h2"]).len(), 1);
    }

    #[test]
    fn test_empty_paragraphs_removed() {
        let article = prep(
            "<div id=\"article\"><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p>\
             <p>   </p><p><img src=\"x.jpg\"></p></div>",
        );
        // The blank paragraph goes, the image-only paragraph stays.
        assert_eq!(dom::elements_by_tag(&article, &["p"]).len(), 2);
    }

    #[test]
    fn test_single_cell_table_collapses() {
        let article = prep(
            "<div id=\"article\"><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p>\
             <table><tbody><tr><td>just one cell of text</td></tr></tbody></table></div>",
        );
        assert!(dom::elements_by_tag(&article, &["table"]).is_empty());
        let texts: Vec<String> = dom::elements_by_tag(&article, &["p"])
            .iter()
            .map(|p| p.text_contents())
            .collect();
        assert!(texts.iter().any(|t| t.contains("just one cell")));
    }

    #[test]
    fn test_share_widget_removed() {
        let article = prep(
            "<div id=\"article\"><div><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p>\
             <div class=\"share-buttons\">Share on social</div></div></div>",
        );
        assert!(!dom::outer_html(&article).contains("share-buttons"));
    }

    #[test]
    fn test_comma_rich_block_kept_despite_negative_class() {
        let article = prep(
            "<div id=\"article\"><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p>\
             <div class=\"sidebar\">One, two, three, four, five, six, seven, eight, nine, ten, \
             eleven, twelve clauses of genuine comma-heavy prose worth keeping.</div></div>",
        );
        assert!(dom::outer_html(&article).contains("comma-heavy prose"));
    }

    #[test]
    fn test_link_heavy_div_removed() {
        let article = prep(
            "<div id=\"article\"><div><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p>\
             <div id=\"nav\"><a href=\"/a\">one</a> <a href=\"/b\">two</a> <a href=\"/c\">three</a></div></div></div>",
        );
        assert!(dom::elements_by_tag(&article, &["a"]).is_empty());
    }
}

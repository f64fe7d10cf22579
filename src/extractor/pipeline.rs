//! The article grab pass.
//!
//! Walks the prepared document, prunes noise, scores paragraph containers,
//! promotes the best-scoring subtree, pulls in related siblings, and hands
//! the collection to the pruning stage. A whole-document HTML snapshot is
//! re-parsed for every attempt, so each retry starts from a clean slate
//! with one more flag cleared.

use kuchikiki::NodeRef;
use tracing::debug;

use crate::dom;
use crate::link_density::link_density;
use crate::options::Options;
use crate::patterns::{
    ALTER_TO_DIV_EXCEPTIONS, BYLINE, EMPTIABLE_TAGS, OK_MAYBE_CANDIDATE, SENTENCE_END,
    TAGS_TO_SCORE, UNLIKELY_CANDIDATES, UNLIKELY_ROLES,
};
use crate::scoring::{initial_score, ScoreStore};
use crate::text::{comma_count, inner_text, is_valid_byline, text_similarity};

use super::pruning::prep_article;
use super::state::Flags;

/// Minimum text length before a paragraph contributes a score.
const MIN_PARAGRAPH_LENGTH: usize = 25;
/// How many ancestors receive a share of a paragraph's score.
const SCORE_ANCESTOR_DEPTH: usize = 5;
/// Ancestor chains that must agree before an alternative parent wins.
const MINIMUM_TOP_CANDIDATES: usize = 3;

/// Outcome of a successful grab: the article container plus the document
/// attributes discovered along the way.
pub(crate) struct GrabResult {
    /// Container whose children form the article (a single
    /// `div#readability-page-1.page` wrapper).
    pub article: NodeRef,
    /// Normalized text length of the grabbed article.
    pub text_length: usize,
    /// First `dir` attribute found on the candidate ancestry.
    pub dir: Option<String>,
    /// `lang` attribute of the `<html>` element.
    pub lang: Option<String>,
    /// Byline discovered while pruning, if any.
    pub byline: Option<String>,
}

/// State that survives flag relaxation: discoveries from earlier attempts
/// are not re-made against the restored snapshot.
#[derive(Default)]
struct PersistentState {
    byline: Option<String>,
    lang: Option<String>,
    title_header_removed: bool,
}

struct Attempt {
    article: NodeRef,
    text_length: usize,
    dir: Option<String>,
}

/// Run the grab loop over the snapshot, relaxing one flag per failed
/// attempt. Returns `None` when even the longest attempt produced nothing.
pub(crate) fn grab_article(
    page_html: &str,
    article_title: &str,
    options: &Options,
) -> Option<GrabResult> {
    let mut flags = Flags::all();
    let mut state = PersistentState::default();
    let mut attempts: Vec<Attempt> = Vec::new();

    loop {
        let doc = dom::parse_html(page_html);
        let attempt = grab_attempt(&doc, flags, options, article_title, &mut state)?;

        if attempt.text_length >= options.char_threshold {
            return Some(GrabResult {
                article: attempt.article,
                text_length: attempt.text_length,
                dir: attempt.dir,
                lang: state.lang,
                byline: state.byline,
            });
        }

        if options.debug {
            debug!(
                text_length = attempt.text_length,
                threshold = options.char_threshold,
                "grabbed article too short, relaxing flags"
            );
        }
        attempts.push(attempt);

        if !flags.relax() {
            // Out of flags to clear; fall back to the longest attempt.
            attempts.sort_by(|a, b| b.text_length.cmp(&a.text_length));
            let best = attempts.into_iter().next()?;
            if best.text_length == 0 {
                return None;
            }
            return Some(GrabResult {
                article: best.article,
                text_length: best.text_length,
                dir: best.dir,
                lang: state.lang,
                byline: state.byline,
            });
        }
    }
}

#[allow(clippy::too_many_lines)]
fn grab_attempt(
    doc: &NodeRef,
    flags: Flags,
    options: &Options,
    article_title: &str,
    state: &mut PersistentState,
) -> Option<Attempt> {
    let body = doc.select_first("body").ok()?.as_node().clone();
    let strip_unlikelys = flags.is_active(Flags::STRIP_UNLIKELYS);
    let weigh_classes = flags.is_active(Flags::WEIGHT_CLASSES);

    // First pass: prune noise and collect the elements worth scoring.
    let mut elements_to_score: Vec<NodeRef> = Vec::new();
    let mut node = doc.select_first("html").ok().map(|n| n.as_node().clone());

    while let Some(current) = node {
        if dom::is_tag(&current, "html") {
            if let Some(lang) = dom::attr(&current, "lang") {
                state.lang = Some(lang);
            }
        }

        let match_string = dom::match_string(&current);

        if !dom::is_probably_visible(&current) {
            node = dom::remove_and_get_next(&current);
            continue;
        }

        if check_byline(&current, &match_string, state) {
            node = dom::remove_and_get_next(&current);
            continue;
        }

        if !state.title_header_removed && header_duplicates_title(&current, article_title) {
            state.title_header_removed = true;
            node = dom::remove_and_get_next(&current);
            continue;
        }

        if strip_unlikelys {
            if UNLIKELY_CANDIDATES.is_match(&match_string)
                && !OK_MAYBE_CANDIDATE.is_match(&match_string)
                && !dom::has_ancestor_tag(&current, "table", 3, None)
                && !dom::has_ancestor_tag(&current, "code", 3, None)
                && !dom::is_tag(&current, "body")
                && !dom::is_tag(&current, "a")
            {
                node = dom::remove_and_get_next(&current);
                continue;
            }
            let role = dom::attr(&current, "role");
            if role.is_some_and(|r| UNLIKELY_ROLES.contains(&r.as_str())) {
                node = dom::remove_and_get_next(&current);
                continue;
            }
        }

        if dom::is_one_of(&current, EMPTIABLE_TAGS) && dom::is_element_without_content(&current) {
            node = dom::remove_and_get_next(&current);
            continue;
        }

        if dom::is_one_of(&current, TAGS_TO_SCORE) {
            elements_to_score.push(current.clone());
        }

        if dom::is_tag(&current, "div") {
            wrap_phrasing_runs(&current);

            if dom::has_single_tag_inside(&current, "p") && link_density(&current) < 0.25 {
                // A div that only wraps one paragraph dissolves into it.
                if let Some(p) = dom::first_element_child(&current) {
                    current.insert_before(p.clone());
                    current.detach();
                    elements_to_score.push(p.clone());
                    node = dom::next_in_tree(&p, false);
                    continue;
                }
            } else if !dom::has_child_block_element(&current) {
                let p = dom::set_node_tag(&current, "p");
                elements_to_score.push(p.clone());
                node = dom::next_in_tree(&p, false);
                continue;
            }
        }

        node = dom::next_in_tree(&current, false);
    }

    // Second pass: score paragraphs and propagate into their ancestry.
    let mut store = ScoreStore::new();
    let mut candidates: Vec<NodeRef> = Vec::new();
    for element in &elements_to_score {
        let has_element_parent = element
            .parent()
            .is_some_and(|p| p.as_element().is_some());
        if !has_element_parent {
            continue;
        }
        let text = inner_text(element, true);
        if text.chars().count() < MIN_PARAGRAPH_LENGTH {
            continue;
        }
        let ancestors = dom::ancestors(element, SCORE_ANCESTOR_DEPTH);
        if ancestors.is_empty() {
            continue;
        }

        let content_score = 1.0
            + (comma_count(&text) + 1) as f64
            + (text.chars().count() / 100).min(3) as f64;

        for (level, ancestor) in ancestors.iter().enumerate() {
            let has_element_grandparent = ancestor
                .parent()
                .is_some_and(|p| p.as_element().is_some());
            if dom::tag_name(ancestor).is_none() || !has_element_grandparent {
                continue;
            }
            if !store.has(ancestor) {
                store.set(ancestor, initial_score(ancestor, weigh_classes));
                candidates.push(ancestor.clone());
            }
            let divider = match level {
                0 => 1.0,
                1 => 2.0,
                _ => (level * 3) as f64,
            };
            store.add(ancestor, content_score / divider);
        }
    }

    // Scale by link density and keep the best few.
    let mut top_candidates: Vec<NodeRef> = Vec::new();
    for candidate in &candidates {
        let scaled = store.get(candidate).unwrap_or(0.0) * (1.0 - link_density(candidate));
        store.set(candidate, scaled);
        for slot in 0..options.nb_top_candidates {
            let beats_slot = top_candidates
                .get(slot)
                .map_or(true, |holder| scaled > store.get(holder).unwrap_or(0.0));
            if beats_slot {
                top_candidates.insert(slot, candidate.clone());
                if top_candidates.len() > options.nb_top_candidates {
                    top_candidates.pop();
                }
                break;
            }
        }
    }

    let mut needed_to_create = false;
    let mut top_candidate = top_candidates.first().cloned();

    if top_candidate.is_none() || top_candidate.as_ref().is_some_and(|tc| dom::is_tag(tc, "body"))
    {
        // Nothing scored: treat the whole body as the article.
        let synthetic = dom::new_element("div");
        while let Some(child) = body.first_child() {
            synthetic.append(child);
        }
        body.append(synthetic.clone());
        store.set(&synthetic, initial_score(&synthetic, weigh_classes));
        needed_to_create = true;
        top_candidate = Some(synthetic);
    } else if let Some(tc0) = top_candidate.clone() {
        let tc0_score = store.get(&tc0).unwrap_or(0.0);

        // When several strong candidates share an ancestor, that ancestor
        // is more likely the real article container.
        let alternative_ancestors: Vec<Vec<NodeRef>> = top_candidates
            .iter()
            .skip(1)
            .filter(|c| tc0_score > 0.0 && store.get(c).unwrap_or(0.0) / tc0_score >= 0.75)
            .map(|c| dom::ancestors(c, 0))
            .collect();

        let mut tc = tc0;
        if alternative_ancestors.len() >= MINIMUM_TOP_CANDIDATES {
            let mut parent = tc.parent();
            while let Some(p) = parent {
                if p.as_element().is_none() || dom::is_tag(&p, "body") {
                    break;
                }
                let agreeing = alternative_ancestors
                    .iter()
                    .filter(|chain| chain.contains(&p))
                    .count();
                if agreeing >= MINIMUM_TOP_CANDIDATES {
                    tc = p;
                    break;
                }
                parent = p.parent();
            }
        }
        if !store.has(&tc) {
            store.set(&tc, initial_score(&tc, weigh_classes));
        }

        // Walk up while parents score comparably; a parent that outscores
        // the child takes its place.
        let mut last_score = store.get(&tc).unwrap_or(0.0);
        let score_threshold = last_score / 3.0;
        let mut parent = tc.parent();
        while let Some(p) = parent {
            if p.as_element().is_none() || dom::is_tag(&p, "body") {
                break;
            }
            let Some(parent_score) = store.get(&p) else {
                parent = p.parent();
                continue;
            };
            if parent_score < score_threshold {
                break;
            }
            if parent_score > last_score {
                tc = p;
                break;
            }
            last_score = parent_score;
            parent = p.parent();
        }

        // An only child means the parent is the same content block.
        let mut parent = tc.parent();
        while let Some(p) = parent {
            if p.as_element().is_none() || dom::is_tag(&p, "body") {
                break;
            }
            if dom::element_children(&p).len() != 1 {
                break;
            }
            tc = p.clone();
            parent = p.parent();
        }
        if !store.has(&tc) {
            store.set(&tc, initial_score(&tc, weigh_classes));
        }
        top_candidate = Some(tc);
    }

    let top_candidate = top_candidate?;
    let parent_of_top = top_candidate.parent().unwrap_or_else(|| body.clone());

    // Pull in siblings that look like continuations of the article.
    let article_content = dom::new_element("div");
    let top_score = store.get(&top_candidate).unwrap_or(0.0);
    let sibling_threshold = 10.0_f64.max(top_score * 0.2);
    let top_class = dom::attr(&top_candidate, "class").unwrap_or_default();

    let siblings: Vec<NodeRef> = parent_of_top
        .children()
        .filter(|c| c.as_element().is_some())
        .collect();
    for sibling in siblings {
        let mut append = sibling == top_candidate;

        if !append {
            let mut bonus = 0.0;
            let sibling_class = dom::attr(&sibling, "class").unwrap_or_default();
            if !top_class.is_empty() && sibling_class == top_class {
                bonus = top_score * 0.2;
            }
            if store.has(&sibling)
                && store.get(&sibling).unwrap_or(0.0) + bonus >= sibling_threshold
            {
                append = true;
            } else if dom::is_tag(&sibling, "p") {
                let density = link_density(&sibling);
                let content = inner_text(&sibling, true);
                let length = content.chars().count();
                if (length > 80 && density < 0.25)
                    || (length < 80
                        && length > 0
                        && density == 0.0
                        && SENTENCE_END.is_match(&content))
                {
                    append = true;
                }
            }
        }

        if append {
            let to_append = if dom::is_one_of(&sibling, ALTER_TO_DIV_EXCEPTIONS) {
                sibling
            } else {
                dom::set_node_tag(&sibling, "div")
            };
            article_content.append(to_append);
        }
    }

    prep_article(&article_content, flags, options, &mut store);

    if needed_to_create {
        dom::set_attr(&top_candidate, "id", "readability-page-1");
        dom::set_attr(&top_candidate, "class", "page");
    } else {
        let wrapper = dom::new_element("div");
        dom::set_attr(&wrapper, "id", "readability-page-1");
        dom::set_attr(&wrapper, "class", "page");
        while let Some(child) = article_content.first_child() {
            wrapper.append(child);
        }
        article_content.append(wrapper);
    }

    // Direction comes from the candidate's ancestry, nearest first.
    let mut dir_sources = vec![parent_of_top.clone(), top_candidate.clone()];
    dir_sources.extend(dom::ancestors(&parent_of_top, 0));
    let dir = dir_sources
        .iter()
        .find_map(|ancestor| dom::attr(ancestor, "dir").filter(|d| !d.is_empty()));

    let text_length = inner_text(&article_content, true).chars().count();

    Some(Attempt {
        article: article_content,
        text_length,
        dir,
    })
}

/// Record the first plausible byline and signal its removal.
fn check_byline(node: &NodeRef, match_string: &str, state: &mut PersistentState) -> bool {
    if state.byline.is_some() {
        return false;
    }
    let rel_author = dom::attr(node, "rel").as_deref() == Some("author");
    let itemprop_author = dom::attr(node, "itemprop").is_some_and(|v| v.contains("author"));
    if !(rel_author || itemprop_author || BYLINE.is_match(match_string)) {
        return false;
    }
    let text = node.text_contents();
    if is_valid_byline(&text) {
        state.byline = Some(text.trim().to_string());
        return true;
    }
    false
}

/// An `<h1>`/`<h2>` restating the page title adds nothing to the article.
fn header_duplicates_title(node: &NodeRef, article_title: &str) -> bool {
    if !dom::is_tag(node, "h1") && !dom::is_tag(node, "h2") {
        return false;
    }
    if article_title.is_empty() {
        return false;
    }
    let heading = inner_text(node, false);
    text_similarity(article_title, &heading) > 0.75
}

/// Wrap contiguous runs of phrasing children of a div into paragraphs.
/// Leading whitespace never opens a paragraph, and trailing whitespace is
/// trimmed when a run closes.
fn wrap_phrasing_runs(div: &NodeRef) {
    let mut paragraph: Option<NodeRef> = None;
    let mut child = div.first_child();
    while let Some(node) = child {
        let next = node.next_sibling();
        if dom::is_phrasing_content(&node) {
            if let Some(p) = &paragraph {
                p.append(node);
            } else if !dom::is_whitespace(&node) {
                let p = dom::new_element("p");
                node.insert_before(p.clone());
                p.append(node);
                paragraph = Some(p);
            }
        } else if let Some(p) = paragraph.take() {
            while let Some(last) = p.last_child() {
                if dom::is_whitespace(&last) {
                    last.detach();
                } else {
                    break;
                }
            }
        }
        child = next;
    }
    if let Some(p) = paragraph {
        while let Some(last) = p.last_child() {
            if dom::is_whitespace(&last) {
                last.detach();
            } else {
                break;
            }
        }
    }
}

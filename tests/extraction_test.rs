//! End-to-end extraction tests: the full pipeline from raw HTML to the
//! result record.

use readview::{dom, parse, parse_with_options, text, Options, Readability};

/// Compare two HTML fragments structurally: pre-order walk, whitespace-only
/// text nodes skipped, interior whitespace collapsed, tag names and
/// attribute sets asserted equal.
fn assert_same_tree(actual_html: &str, expected_html: &str) {
    let actual = dom::parse_html(actual_html);
    let actual_body = actual.select_first("body").unwrap().as_node().clone();
    let expected = dom::parse_html(expected_html);
    let expected_body = expected.select_first("body").unwrap().as_node().clone();
    assert_node_eq(&actual_body, &expected_body, "body");
}

fn meaningful_children(node: &dom::NodeRef) -> Vec<dom::NodeRef> {
    node.children()
        .filter(|c| {
            if c.as_element().is_some() {
                return true;
            }
            c.as_text()
                .is_some_and(|t| !t.borrow().trim().is_empty())
        })
        .collect()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn assert_node_eq(actual: &dom::NodeRef, expected: &dom::NodeRef, path: &str) {
    match (actual.as_element(), expected.as_element()) {
        (Some(_), Some(_)) => {
            assert_eq!(
                dom::tag_name(actual),
                dom::tag_name(expected),
                "tag mismatch at {path}"
            );
            let mut actual_attrs = dom::attr_pairs(actual);
            let mut expected_attrs = dom::attr_pairs(expected);
            actual_attrs.sort();
            expected_attrs.sort();
            assert_eq!(actual_attrs, expected_attrs, "attribute mismatch at {path}");
        }
        (None, None) => {
            let actual_text = actual.as_text().map(|t| collapse(&t.borrow()));
            let expected_text = expected.as_text().map(|t| collapse(&t.borrow()));
            assert_eq!(actual_text, expected_text, "text mismatch at {path}");
            return;
        }
        _ => panic!("node kind mismatch at {path}"),
    }

    let actual_children = meaningful_children(actual);
    let expected_children = meaningful_children(expected);
    assert_eq!(
        actual_children.len(),
        expected_children.len(),
        "child count mismatch at {path} (actual: {actual_children:?})",
    );
    for (i, (a, e)) in actual_children.iter().zip(&expected_children).enumerate() {
        let child_path = format!(
            "{path}/{}[{i}]",
            dom::tag_name(a).unwrap_or_else(|| "#text".to_string())
        );
        assert_node_eq(a, e, &child_path);
    }
}

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Nunc mollis leo lacus, vitae semper nisl ullamcorper ut.";

#[test]
fn custom_video_host_survives_every_cleaning_pass() {
    let html = format!(
        "<html><body><p>{LOREM}</p>\
         <iframe src=\"https://mycustomdomain.com/some-embeds\"></iframe></body></html>"
    );
    let options = Options {
        char_threshold: 20,
        allowed_video_regex: Some(regex::Regex::new(r".*mycustomdomain.com.*").unwrap()),
        ..Options::default()
    };
    let article = parse_with_options(&html, options).unwrap();

    let expected = format!(
        "<div id=\"readability-page-1\" class=\"page\"><p>{LOREM}</p>\
         <iframe src=\"https://mycustomdomain.com/some-embeds\"></iframe></div>"
    );
    assert_same_tree(article.content.as_deref().unwrap(), &expected);
}

#[test]
fn disallowed_iframe_is_removed() {
    let html = format!(
        "<html><body><p>{LOREM}</p>\
         <iframe src=\"https://ads.example.net/slot\"></iframe></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 20,
            ..Options::default()
        },
    )
    .unwrap();
    assert!(!article.content.unwrap().contains("iframe"));
}

#[test]
fn extraction_is_idempotent_on_text_content() {
    let html = format!(
        "<html><body><div class=\"article-body\">\
         <p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere, urna mi semper sapien, nec feugiat metus nulla in mi.</p>\
         </div></body></html>"
    );
    let options = Options {
        char_threshold: 50,
        ..Options::default()
    };
    let first = parse_with_options(&html, options.clone()).unwrap();
    let second = parse_with_options(first.content.as_deref().unwrap(), options).unwrap();

    let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(
        normalize(first.text_content.as_deref().unwrap()),
        normalize(second.text_content.as_deref().unwrap())
    );
}

#[test]
fn returned_article_carries_no_presentational_attributes() {
    let html = format!(
        "<html><body><div class=\"content\">\
         <p style=\"color: red\" align=\"center\" bgcolor=\"white\">{LOREM}</p>\
         <p valign=\"top\" border=\"1\">Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p>\
         </div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    let content = article.content.unwrap();
    for attr in ["style=", "align=", "bgcolor=", "valign=", "border="] {
        assert!(!content.contains(attr), "found {attr} in {content}");
    }
}

#[test]
fn returned_article_contains_no_h1() {
    let html = format!(
        "<html><body><div class=\"content\">\
         <h1>A Heading That Is Not The Page Title</h1>\
         <p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p>\
         </div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    let content = article.content.unwrap();
    assert!(!content.contains("<h1"));
    assert!(content.contains("<h2"));
}

#[test]
fn wrapper_div_has_reader_id_and_page_class() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p></div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();

    let node = article.content_node.unwrap();
    let wrapper = dom::first_element_child(&node).unwrap();
    assert_eq!(dom::attr(&wrapper, "id").as_deref(), Some("readability-page-1"));
    assert_eq!(dom::attr(&wrapper, "class").as_deref(), Some("page"));
}

#[test]
fn retry_ladder_recovers_content_hidden_by_strict_flags() {
    // The only real content sits in a container whose class would be
    // stripped as unlikely; relaxation must bring it back.
    let body = "Sentence with quite a few ordinary words in it, repeated to look like prose. ";
    let html = format!(
        "<html><body><div class=\"sidebar\"><p>{}</p></div></body></html>",
        body.repeat(8)
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 200,
            ..Options::default()
        },
    )
    .unwrap();
    let text = article.text_content.unwrap();
    assert!(text.contains("ordinary words"), "text was {text}");
}

#[test]
fn longest_attempt_wins_when_all_flags_fail() {
    let html = "<html><body><div class=\"content\"><p>Just a short sentence here.</p></div></body></html>";
    let article = parse(html).unwrap();
    // Too short for the default threshold, still returned as best effort.
    assert!(article
        .text_content
        .unwrap()
        .contains("Just a short sentence"));
}

#[test]
fn empty_document_yields_null_content() {
    let article = parse("<html><body></body></html>").unwrap();
    assert!(article.content.is_none());
    assert!(article.text_content.is_none());
    assert!(article.length.is_none());
    assert!(article.title.is_none());
}

#[test]
fn byline_is_removed_from_content_and_reported() {
    let html = format!(
        "<html><body><div class=\"content\">\
         <div class=\"byline\">By Jane Doe</div>\
         <p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p>\
         </div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    assert_eq!(article.byline.as_deref(), Some("By Jane Doe"));
    assert!(!article.content.unwrap().contains("Jane Doe"));
}

#[test]
fn text_direction_is_reported() {
    let html = format!(
        "<html><body dir=\"rtl\"><div class=\"content\"><p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p></div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    assert_eq!(article.dir.as_deref(), Some("rtl"));
}

#[test]
fn excerpt_falls_back_to_first_paragraph() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p></div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    assert_eq!(article.excerpt.as_deref(), Some(LOREM));
}

#[test]
fn custom_serializer_is_used() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p></div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            serializer: Some(|node| format!("custom:{}", node.text_contents().len())),
            ..Options::default()
        },
    )
    .unwrap();
    assert!(article.content.unwrap().starts_with("custom:"));
}

#[test]
fn double_br_runs_become_paragraphs() {
    let text_a = "First block of prose that is comfortably longer than the minimum scoring length.";
    let text_b = "Second block of prose, also long enough to contribute its own paragraph score.";
    let html = format!("<html><body><div class=\"content\">{text_a}<br> <br>{text_b}</div></body></html>");
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    let content = article.content.unwrap();
    assert!(!content.contains("<br"), "content was {content}");
    assert!(content.contains(text_a));
    assert!(content.contains(text_b));
}

#[test]
fn hidden_blocks_are_dropped() {
    let html = format!(
        "<html><body><div class=\"content\">\
         <div style=\"display:none\"><p>Invisible text that must never appear.</p></div>\
         <p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p>\
         </div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    assert!(!article.content.unwrap().contains("Invisible text"));
}

#[test]
fn content_length_matches_text_content() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p></div></body></html>"
    );
    let article = parse_with_options(
        &html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap();
    assert_eq!(
        article.length.unwrap(),
        article.text_content.unwrap().chars().count()
    );
}

#[test]
fn construction_from_parsed_document() {
    let doc = dom::parse_html(&format!(
        "<html><body><div class=\"content\"><p>{LOREM}</p>\
         <p>Suspendisse potenti. Vivamus dignissim, odio in condimentum posuere urna.</p></div></body></html>"
    ));
    let article = Readability::from_document(
        doc,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .parse()
    .unwrap();
    assert!(article.content.is_some());
}

#[test]
fn similarity_helper_matches_documented_behavior() {
    // One-directional containment: every token of the shorter string
    // appears in the longer one.
    let sim = text::text_similarity("Breaking News: Foo Wins", "Foo Wins");
    assert!(sim > 0.99);
}

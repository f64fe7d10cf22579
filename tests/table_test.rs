//! Table handling through the full pipeline: data tables survive cleaning,
//! layout tables do not.

use readview::{parse_with_options, Options};

const PROSE: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Nunc mollis leo lacus, vitae semper nisl ullamcorper ut.";

fn extract(html: &str) -> String {
    parse_with_options(
        html,
        Options {
            char_threshold: 50,
            ..Options::default()
        },
    )
    .unwrap()
    .content
    .unwrap()
}

#[test]
fn data_table_with_headers_is_kept() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{PROSE}</p><p>{PROSE}</p>\
         <table><thead><tr><th>Year</th><th>Value</th></tr></thead>\
         <tbody><tr><td>2023</td><td>10</td></tr><tr><td>2024</td><td>12</td></tr></tbody></table>\
         </div></body></html>"
    );
    let content = extract(&html);
    assert!(content.contains("<table"), "content was {content}");
    assert!(content.contains("2024"));
}

#[test]
fn presentation_table_is_unwound_or_dropped() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{PROSE}</p><p>{PROSE}</p>\
         <table role=\"presentation\"><tr><td><a href=\"/a\">Home</a> <a href=\"/b\">About</a> <a href=\"/c\">More</a></td></tr></table>\
         </div></body></html>"
    );
    let content = extract(&html);
    assert!(!content.contains("Home"), "content was {content}");
}

#[test]
fn summary_attribute_marks_data_table() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{PROSE}</p><p>{PROSE}</p>\
         <table summary=\"Results by quarter\"><tr><td>Q1</td><td>Q2</td></tr></table>\
         </div></body></html>"
    );
    let content = extract(&html);
    assert!(content.contains("<table"), "content was {content}");
    assert!(content.contains("Q1"));
}

#[test]
fn table_sizes_keep_width_and_height() {
    let html = format!(
        "<html><body><div class=\"content\"><p>{PROSE}</p><p>{PROSE}</p>\
         <table width=\"400\"><thead><tr><th>A</th><th>B</th></tr></thead>\
         <tbody><tr><td>1</td><td>2</td></tr></tbody></table>\
         </div></body></html>"
    );
    let content = extract(&html);
    assert!(content.contains("width=\"400\""), "content was {content}");
}

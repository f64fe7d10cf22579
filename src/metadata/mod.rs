//! Metadata extraction (JSON-LD, meta tags, document title).
//!
//! JSON-LD values win; `<meta>` values fill the gaps in a fixed source
//! order; the cleaned document `<title>` is the title of last resort.
//! Every string field is HTML-entity-unescaped before it is returned.

pub(crate) mod json_ld;
pub(crate) mod meta_tags;
pub(crate) mod title;

use kuchikiki::NodeRef;

use crate::options::Options;
use crate::text::unescape_html_entities;

/// Candidate metadata gathered before extraction.
#[derive(Debug, Clone, Default)]
pub(crate) struct Metadata {
    pub title: Option<String>,
    pub byline: Option<String>,
    pub excerpt: Option<String>,
    pub site_name: Option<String>,
    pub published_time: Option<String>,
}

/// Gather document metadata. Must run before scripts are removed, since
/// JSON-LD lives in `<script>` blocks.
pub(crate) fn extract(doc: &NodeRef, options: &Options) -> Metadata {
    let document_title = title::article_title(doc).unwrap_or_default();

    let json_ld = if options.disable_json_ld {
        Metadata::default()
    } else {
        json_ld::extract(doc, &document_title, options.debug)
    };

    let values = meta_tags::collect_meta_values(doc);
    let get = |keys: &[&str]| -> Option<String> {
        keys.iter().find_map(|k| values.get(*k).cloned())
    };

    let mut metadata = Metadata {
        title: json_ld.title.or_else(|| {
            get(&[
                "dc:title",
                "dcterm:title",
                "og:title",
                "weibo:article:title",
                "weibo:webpage:title",
                "title",
                "twitter:title",
                "parsely-title",
            ])
        }),
        byline: json_ld.byline.or_else(|| {
            get(&[
                "dc:creator",
                "dcterm:creator",
                "author",
                "parsely-author",
            ])
        }),
        excerpt: json_ld.excerpt.or_else(|| {
            get(&[
                "dc:description",
                "dcterm:description",
                "og:description",
                "weibo:article:description",
                "weibo:webpage:description",
                "description",
                "twitter:description",
            ])
        }),
        site_name: json_ld.site_name.or_else(|| get(&["og:site_name"])),
        published_time: json_ld
            .published_time
            .or_else(|| get(&["article:published_time", "parsely-pub-date"])),
    };

    if metadata.title.as_deref().map_or(true, str::is_empty) {
        metadata.title = (!document_title.is_empty()).then_some(document_title);
    }

    metadata.title = metadata.title.map(|v| unescape_html_entities(&v));
    metadata.byline = metadata.byline.map(|v| unescape_html_entities(&v));
    metadata.excerpt = metadata.excerpt.map(|v| unescape_html_entities(&v));
    metadata.site_name = metadata.site_name.map(|v| unescape_html_entities(&v));
    metadata.published_time = metadata.published_time.map(|v| unescape_html_entities(&v));

    metadata
}

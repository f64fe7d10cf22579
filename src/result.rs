//! The extraction result record.

use kuchikiki::NodeRef;
use serde::Serialize;

/// The result of a successful `parse()` call.
///
/// Every field is optional: a document with no recognizable article yields
/// a record whose content fields are `None` while metadata fields may still
/// be populated from `<meta>` tags or JSON-LD.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Article {
    /// Article title.
    pub title: Option<String>,

    /// Author line, from metadata or the in-page byline heuristic.
    pub byline: Option<String>,

    /// Text direction (`ltr`/`rtl`), read from the content ancestry.
    pub dir: Option<String>,

    /// Content language, from the `<html lang>` attribute.
    pub lang: Option<String>,

    /// Cleaned article HTML, produced by the configured serializer.
    pub content: Option<String>,

    /// Flattened text content of the article.
    pub text_content: Option<String>,

    /// Length of `text_content` in characters.
    pub length: Option<usize>,

    /// Short description, from metadata or the first paragraph.
    pub excerpt: Option<String>,

    /// Name of the publishing site.
    pub site_name: Option<String>,

    /// Publication time, passed through verbatim from metadata.
    pub published_time: Option<String>,

    /// The live article subtree (the `<div id="readability-page-1">`
    /// wrapper). For consumers that post-process the DOM instead of the
    /// serialized string.
    #[serde(skip)]
    pub content_node: Option<NodeRef>,
}

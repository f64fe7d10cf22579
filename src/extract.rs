//! The extraction orchestrator.
//!
//! `Readability` owns the parsed document and runs the full pipeline:
//! element budget check, metadata extraction (JSON-LD before scripts are
//! removed), document preparation, the snapshot-backed grab loop, and
//! post-processing into the final [`Article`] record.

use kuchikiki::NodeRef;
use tracing::debug;

use crate::dom;
use crate::error::{Error, Result};
use crate::extractor::pipeline::grab_article;
use crate::metadata;
use crate::options::Options;
use crate::patterns::{OK_MAYBE_CANDIDATE, UNLIKELY_CANDIDATES};
use crate::postprocess::post_process;
use crate::preprocess;
use crate::result::Article;
use crate::text::inner_text;

/// The article extractor.
///
/// Construct with [`Readability::new`], then call
/// [`parse`](Readability::parse) to run the pipeline.
///
/// # Example
///
/// ```rust
/// use readview::{Readability, Options};
///
/// let html = "<html><head><title>T</title></head>\
///             <body><article><p>Body text...</p></article></body></html>";
/// let article = Readability::new(html, Options::default())?.parse()?;
/// println!("{:?}", article.title);
/// # Ok::<(), readview::Error>(())
/// ```
pub struct Readability {
    doc: NodeRef,
    options: Options,
}

impl Readability {
    /// Parse the HTML and set up an extractor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDocument`] when the input contains nothing but
    /// whitespace.
    pub fn new(html: &str, options: Options) -> Result<Self> {
        if html.trim().is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(Self {
            doc: dom::parse_html(html),
            options,
        })
    }

    /// Wrap an already-parsed document.
    #[must_use]
    pub fn from_document(doc: NodeRef, options: Options) -> Self {
        Self { doc, options }
    }

    /// Run the extraction pipeline and produce the result record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyElements`] when the document exceeds
    /// `max_elems_to_parse`. Extraction failures do not raise: a document
    /// with no recognizable article yields a record whose content fields
    /// are `None`.
    pub fn parse(self) -> Result<Article> {
        let Self { doc, options } = self;

        if options.max_elems_to_parse > 0 {
            let count = dom::element_count(&doc);
            if count > options.max_elems_to_parse {
                return Err(Error::TooManyElements(count));
            }
        }

        preprocess::unwrap_noscript_images(&doc);
        let meta = metadata::extract(&doc, &options);
        if options.debug {
            debug!(title = ?meta.title, byline = ?meta.byline, "metadata extracted");
        }

        if !options.extraction {
            let lang = doc
                .select_first("html")
                .ok()
                .and_then(|html| dom::attr(html.as_node(), "lang"));
            return Ok(Article {
                title: meta.title,
                byline: meta.byline,
                lang,
                site_name: meta.site_name,
                published_time: meta.published_time,
                ..Article::default()
            });
        }

        preprocess::remove_scripts(&doc);
        preprocess::remove_comments(&doc);
        preprocess::prep_document(&doc);

        // Every grab attempt re-parses this snapshot, so retries see the
        // document exactly as it was after preparation.
        let snapshot = dom::outer_html(&doc);
        let article_title = meta.title.clone().unwrap_or_default();

        let Some(grabbed) = grab_article(&snapshot, &article_title, &options) else {
            if options.debug {
                debug!("no article content found");
            }
            return Ok(Article {
                title: meta.title,
                byline: meta.byline,
                site_name: meta.site_name,
                published_time: meta.published_time,
                ..Article::default()
            });
        };

        post_process(&grabbed.article, &options);

        let text_content = grabbed.article.text_contents();
        let excerpt = meta.excerpt.clone().or_else(|| {
            // No description anywhere: borrow the first paragraph.
            dom::elements_by_tag(&grabbed.article, &["p"])
                .first()
                .map(|p| p.text_contents().trim().to_string())
                .filter(|t| !t.is_empty())
        });

        let content = match options.serializer {
            Some(serialize) => serialize(&grabbed.article),
            None => dom::inner_html(&grabbed.article),
        };

        Ok(Article {
            title: meta.title,
            byline: meta.byline.or(grabbed.byline),
            dir: grabbed.dir,
            lang: grabbed.lang,
            length: Some(text_content.chars().count()),
            content: Some(content),
            text_content: Some(text_content),
            excerpt,
            site_name: meta.site_name,
            published_time: meta.published_time,
            content_node: Some(grabbed.article),
        })
    }
}

/// Tuning for [`is_probably_readerable`].
pub struct ReaderableOptions {
    /// Cumulative score a document must reach.
    pub min_score: f64,
    /// Minimum visible text length before a node counts at all.
    pub min_content_length: usize,
    /// Override for the visibility check.
    pub visibility_checker: Option<fn(&NodeRef) -> bool>,
}

impl Default for ReaderableOptions {
    fn default() -> Self {
        Self {
            min_score: 20.0,
            min_content_length: 140,
            visibility_checker: None,
        }
    }
}

/// Quick pre-flight estimate of whether a document holds an extractable
/// article, without running the full pipeline.
#[must_use]
pub fn is_probably_readerable(html: &str, options: &ReaderableOptions) -> bool {
    let doc = dom::parse_html(html);

    let mut nodes: Vec<NodeRef> = doc
        .select("p, pre, article")
        .map(|sel| sel.map(|n| n.as_node().clone()).collect())
        .unwrap_or_default();

    // A div wrapping a <br> is paragraph-ish markup in disguise.
    if let Ok(br_nodes) = doc.select("div > br") {
        for br in br_nodes {
            if let Some(parent) = br.as_node().parent() {
                if !nodes.contains(&parent) {
                    nodes.push(parent);
                }
            }
        }
    }

    let visible = |node: &NodeRef| match options.visibility_checker {
        Some(checker) => checker(node),
        None => dom::is_probably_visible(node),
    };

    let mut score = 0.0;
    for node in &nodes {
        if !visible(node) {
            continue;
        }
        let match_string = dom::match_string(node);
        if UNLIKELY_CANDIDATES.is_match(&match_string)
            && !OK_MAYBE_CANDIDATE.is_match(&match_string)
        {
            continue;
        }
        if dom::is_tag(node, "p") && dom::has_ancestor_tag(node, "li", -1, None) {
            continue;
        }
        let text_length = inner_text(node, false).chars().count();
        if text_length < options.min_content_length {
            continue;
        }
        score += ((text_length - options.min_content_length) as f64).sqrt();
        if score > options.min_score {
            return true;
        }
    }
    false
}

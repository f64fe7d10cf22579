//! # readview
//!
//! Reader-mode article extraction: given an arbitrary, often messy, HTML
//! document, find the subtree most likely to contain the main article,
//! clean it, and emit both HTML and plain-text forms alongside document
//! metadata (title, byline, excerpt, site name, language, direction, and
//! published time).
//!
//! ## Quick Start
//!
//! ```rust
//! use readview::parse;
//!
//! let html = r#"<html><head><title>My Article</title></head>
//! <body><article>
//! <p>Long enough article prose goes here, sentence after sentence, until the
//! extractor is satisfied that this page really carries a readable body.</p>
//! </article></body></html>"#;
//!
//! let article = parse(html)?;
//! println!("Title: {:?}", article.title);
//! println!("Text: {:?}", article.text_content);
//! # Ok::<(), readview::Error>(())
//! ```
//!
//! ## How it works
//!
//! - **Prepare**: noscript image recovery, script/style/comment removal,
//!   `<br><br>` paragraph repair, `<font>` normalization.
//! - **Score**: paragraphs and paragraph-like blocks feed scores into
//!   their ancestors; class/id names, commas, and text length all weigh in.
//! - **Select**: the best-scoring ancestor is promoted and related
//!   siblings are pulled in next to it.
//! - **Clean**: presentational attributes, forms, share widgets, link
//!   farms, and layout tables are stripped; data tables survive.
//! - **Retry**: when the result is below `char_threshold`, the document
//!   snapshot is restored and the pipeline re-runs with one heuristic
//!   relaxed, up to three times, keeping the longest attempt.
//!
//! Metadata comes from JSON-LD blocks, `<meta>` tags, and the `<title>`
//! heuristic, in that order of preference.

mod error;
mod extract;
mod options;
mod postprocess;
mod preprocess;
mod result;

/// DOM adapter and tree utilities over the `kuchikiki` node tree.
pub mod dom;

/// Link density measurement.
pub mod link_density;

/// Text normalization, similarity, and entity helpers.
pub mod text;

/// Compiled heuristic patterns and tag-set constants.
pub mod patterns;

pub(crate) mod extractor;
pub(crate) mod metadata;
pub(crate) mod scoring;

pub use error::{Error, Result};
pub use extract::{is_probably_readerable, Readability, ReaderableOptions};
pub use options::Options;
pub use result::Article;

/// Extract the main article from an HTML document using default options.
///
/// # Errors
///
/// Fails on empty input; otherwise extraction failure yields an [`Article`]
/// with `None` content fields rather than an error.
pub fn parse(html: &str) -> Result<Article> {
    parse_with_options(html, Options::default())
}

/// Extract the main article from an HTML document with custom options.
///
/// # Errors
///
/// Fails on empty input or when the document exceeds
/// [`Options::max_elems_to_parse`].
///
/// # Example
///
/// ```rust
/// use readview::{parse_with_options, Options};
///
/// let html = "<html><body><article><p>Some body text for the reader, long
/// enough that the extraction threshold configured below accepts it.</p>
/// </article></body></html>";
/// let options = Options {
///     char_threshold: 50,
///     ..Options::default()
/// };
/// let article = parse_with_options(html, options)?;
/// assert!(article.content.is_some());
/// # Ok::<(), readview::Error>(())
/// ```
pub fn parse_with_options(html: &str, options: Options) -> Result<Article> {
    Readability::new(html, options)?.parse()
}

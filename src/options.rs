//! Configuration options for article extraction.
//!
//! The `Options` struct controls extraction behavior: scoring limits,
//! success thresholds, class handling, metadata sources, and output shape.

use kuchikiki::NodeRef;
use regex::Regex;

/// Configuration options for article extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use readview::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     char_threshold: 300,
///     keep_classes: true,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Emit diagnostic `tracing` events while extracting.
    ///
    /// Disabling this has no effect on extraction behavior, only on
    /// observability.
    ///
    /// Default: `false`
    pub debug: bool,

    /// Maximum number of elements the document may contain.
    ///
    /// When the document holds more elements than this, `parse()` fails
    /// with [`Error::TooManyElements`](crate::Error::TooManyElements).
    /// `0` disables the limit.
    ///
    /// Default: `0` (no limit)
    pub max_elems_to_parse: usize,

    /// Size of the top-candidate list kept during scoring.
    ///
    /// Default: `5`
    pub nb_top_candidates: usize,

    /// Minimum text length (characters) of a successful extraction.
    ///
    /// When the grabbed article falls short, extraction retries with a
    /// relaxed flag set. The same value is reused as the text cutoff when
    /// removing share widgets during article preparation.
    ///
    /// Default: `500`
    pub char_threshold: usize,

    /// Keep all `class` attributes on the returned article.
    ///
    /// When `false`, classes are removed except those listed in
    /// [`classes_to_preserve`](Self::classes_to_preserve).
    ///
    /// Default: `false`
    pub keep_classes: bool,

    /// Classes kept when [`keep_classes`](Self::keep_classes) is off.
    ///
    /// The `page` class carried by the article wrapper is always
    /// preserved in addition to this list.
    ///
    /// Default: `["page"]`
    pub classes_to_preserve: Vec<String>,

    /// Skip JSON-LD parsing during metadata extraction.
    ///
    /// Default: `false`
    pub disable_json_ld: bool,

    /// Produce the final HTML string from the article subtree.
    ///
    /// `None` uses the built-in serializer. Consumers that want the live
    /// subtree instead of a string can read
    /// [`Article::content_node`](crate::Article::content_node), which is
    /// always populated on success.
    ///
    /// Default: `None`
    pub serializer: Option<fn(&NodeRef) -> String>,

    /// Pattern deciding which embedded frames/objects survive cleaning.
    ///
    /// An `<iframe>`, `<embed>` or `<object>` whose attributes match is
    /// retained by every cleaning pass. `None` uses the built-in list of
    /// common video hosts.
    ///
    /// Default: `None`
    pub allowed_video_regex: Option<Regex>,

    /// Added to the link-density cutoffs used by conditional cleaning.
    ///
    /// Positive values make cleaning more lenient toward link-heavy
    /// blocks. Only conditional cleaning consults this; the base
    /// link-density computation never does.
    ///
    /// Default: `0.0`
    pub link_density_modifier: f64,

    /// Run content extraction.
    ///
    /// When `false`, only metadata is produced: `content`,
    /// `text_content`, `length`, and `excerpt` are `None`.
    ///
    /// Default: `true`
    pub extraction: bool,

    /// Base URI for resolving `href`/`src`/`srcset`/`poster` attributes
    /// to absolute URLs.
    ///
    /// Default: `None` (URLs are left as-is)
    pub base_uri: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debug: false,
            max_elems_to_parse: 0,
            nb_top_candidates: 5,
            char_threshold: 500,
            keep_classes: false,
            classes_to_preserve: vec!["page".to_string()],
            disable_json_ld: false,
            serializer: None,
            allowed_video_regex: None,
            link_density_modifier: 0.0,
            extraction: true,
            base_uri: None,
        }
    }
}

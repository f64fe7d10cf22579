//! Compiled regex patterns and tag-set constants for article extraction.
//!
//! All patterns are compiled once at startup using `LazyLock`. Patterns are
//! organized by their purpose in the extraction pipeline; tag sets are plain
//! slices matched against lowercase tag names.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Candidate filtering
// =============================================================================

/// Class/id fragments that mark a node as unlikely article content.
pub static UNLIKELY_CANDIDATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|ai2html|banner|breadcrumbs|combx|comment|community|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|related|remark|replies|rss|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|ad-break|agegate|pagination|pager|popup|yom-remote",
    )
    .expect("UNLIKELY_CANDIDATES regex")
});

/// Class/id fragments that rescue a node from the unlikely filter.
pub static OK_MAYBE_CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)and|article|body|column|content|main|mathjax|shadow")
        .expect("OK_MAYBE_CANDIDATE regex")
});

/// Class/id fragments that raise an element's class weight.
pub static POSITIVE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|h-entry|main|page|pagination|post|text|blog|story")
        .expect("POSITIVE_CLASS regex")
});

/// Class/id fragments that lower an element's class weight.
pub static NEGATIVE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)-ad-|hidden|^hid$| hid$| hid |^hid |banner|combx|comment|com-|contact|footer|gdpr|masthead|media|meta|outbrain|promo|related|scroll|share|shoutbox|sidebar|skyscraper|sponsor|shopping|tags|widget",
    )
    .expect("NEGATIVE_CLASS regex")
});

/// ARIA roles that disqualify a node outright.
pub const UNLIKELY_ROLES: &[&str] = &[
    "menu",
    "menubar",
    "complementary",
    "navigation",
    "alert",
    "alertdialog",
    "dialog",
];

// =============================================================================
// Byline and title detection
// =============================================================================

/// Class/id fragments marking an author line.
pub static BYLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)byline|author|dateline|writtenby|p-author").expect("BYLINE regex")
});

/// Spaced title separators (`|`, `-`, `\`, `/`, `>`, `»`).
pub static TITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[\|\-\\/>»]\s").expect("TITLE_SEPARATOR regex"));

/// Hierarchical title separators (`\`, `/`, `>`, `»`).
pub static TITLE_HIERARCHY_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[\\/>»]\s").expect("TITLE_HIERARCHY_SEPARATOR regex"));

/// Leading segment up to and including the first title separator.
pub static TITLE_FIRST_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^\|\-\\/>»]*[\|\-\\/>»]").expect("TITLE_FIRST_SEGMENT regex")
});

/// Any run of title-separator characters, for word-count comparison.
pub static TITLE_SEPARATOR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\|\-\\/>»]+").expect("TITLE_SEPARATOR_CHARS regex"));

// =============================================================================
// Media and embeds
// =============================================================================

/// Default allow-list of embedded video hosts.
pub static VIDEOS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)//(www\.)?((dailymotion|youtube|youtube-nocookie|player\.vimeo|v\.qq)\.com|(archive|upload\.wikimedia)\.org|player\.twitch\.tv)",
    )
    .expect("VIDEOS regex")
});

/// Share widgets embedded between article paragraphs.
pub static SHARE_ELEMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\b|_)(share|sharedaddy)(\b|_)").expect("SHARE_ELEMENTS regex")
});

/// Whole-text advertisement placeholders, multiple locales.
pub static AD_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?iu)^(ad(vertising|vertisement)?|pub(licité)?|werb(ung)?|广告|Реклама|Anzeige)$")
        .expect("AD_WORDS regex")
});

/// Whole-text loading placeholders, multiple locales.
pub static LOADING_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?iu)^((loading|正在加载|Загрузка|chargement|cargando)(…|\.\.\.)?)$")
        .expect("LOADING_WORDS regex")
});

/// Base64 data-URL prefix, capturing the MIME type.
pub static B64_DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^data:\s*([^\s;,]+)\s*;\s*base64\s*,").expect("B64_DATA_URL regex")
});

/// Image file extensions hiding in lazy-loading attributes.
pub static IMG_EXTENSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|webp)").expect("IMG_EXTENSIONS regex"));

/// An image URL followed by a width/density descriptor (srcset shape).
pub static IMG_EXT_WITH_DESCRIPTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|webp)\s+\d").expect("IMG_EXT_WITH_DESCRIPTOR regex")
});

/// A lone image URL (candidate `src` value).
pub static SINGLE_IMG_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\S+\.(jpg|jpeg|png|webp)\S*\s*$").expect("SINGLE_IMG_URL regex")
});

/// One entry of a `srcset` attribute: URL, optional descriptor, separator.
pub static SRCSET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\S+)(\s+[\d.]+[xw])?(\s*(?:,|$))").expect("SRCSET_URL regex")
});

// =============================================================================
// Text utilities
// =============================================================================

/// Runs of two or more whitespace characters.
pub static NORMALIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("NORMALIZE regex"));

/// An entirely-whitespace string.
pub static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*$").expect("WHITESPACE regex"));

/// Non-word token boundaries, for similarity tokenization.
pub static TOKENIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("TOKENIZE regex"));

/// Fragment-only link target.
pub static HASH_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#.+").expect("HASH_URL regex"));

/// Comma and its lookalikes across scripts.
pub static COMMAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{002C}\x{060C}\x{FE50}\x{FE10}\x{FE11}\x{2E41}\x{2E34}\x{2E32}\x{FF0C}]")
        .expect("COMMAS regex")
});

/// Sentence-final period (followed by a space or end of text).
pub static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.( |$)").expect("SENTENCE_END regex"));

// =============================================================================
// Metadata
// =============================================================================

/// Schema.org `@context` values accepted for JSON-LD blocks.
pub static SCHEMA_ORG_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://schema\.org/?$").expect("SCHEMA_ORG_CONTEXT regex"));

/// Schema.org Article family accepted as JSON-LD `@type`.
pub static JSON_LD_ARTICLE_TYPES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Article|AdvertiserContentArticle|NewsArticle|AnalysisNewsArticle|AskPublicNewsArticle|BackgroundNewsArticle|OpinionNewsArticle|ReportageNewsArticle|ReviewNewsArticle|Report|SatiricalArticle|ScholarlyArticle|MedicalScholarlyArticle|SocialMediaPosting|BlogPosting|LiveBlogPosting|DiscussionForumPosting|TechArticle|APIReference$",
    )
    .expect("JSON_LD_ARTICLE_TYPES regex")
});

/// CDATA wrappers around inline JSON-LD payloads.
pub static JSON_LD_CDATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<!\[CDATA\[|\]\]>\s*$").expect("JSON_LD_CDATA regex")
});

/// `<meta property>` values carrying article metadata.
pub static META_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*(article|dc|dcterm|og|twitter)\s*:\s*(author|creator|description|published_time|title|site_name)\s*",
    )
    .expect("META_PROPERTY regex")
});

/// `<meta name>` values carrying article metadata.
pub static META_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(dc|dcterm|og|twitter|parsely|weibo:(article|webpage))\s*[-\.:]\s*)?(author|creator|pub-date|description|title|site_name)\s*$",
    )
    .expect("META_NAME regex")
});

// =============================================================================
// Tag sets
// =============================================================================

/// Tags whose text contributes paragraph scores.
pub const TAGS_TO_SCORE: &[&str] = &["section", "h2", "h3", "h4", "h5", "h6", "p", "td", "pre"];

/// Block-level tags: a div containing any of these stays a div.
pub const DIV_TO_P_ELEMS: &[&str] = &[
    "blockquote", "dl", "div", "img", "ol", "p", "pre", "table", "ul",
];

/// Tags that keep their name when pulled in as article siblings.
pub const ALTER_TO_DIV_EXCEPTIONS: &[&str] = &["div", "article", "section", "p"];

/// Attributes stripped from every article element.
pub const PRESENTATIONAL_ATTRIBUTES: &[&str] = &[
    "align", "background", "bgcolor", "border", "cellpadding", "cellspacing", "frame", "hspace",
    "rules", "style", "valign", "vspace",
];

/// Tags allowed to keep their `width`/`height` attributes.
pub const DEPRECATED_SIZE_ATTRIBUTE_ELEMS: &[&str] = &["table", "th", "td", "hr", "pre"];

/// Inline-level content, for phrasing-run detection.
pub const PHRASING_ELEMS: &[&str] = &[
    "abbr", "audio", "b", "bdo", "br", "button", "cite", "code", "data", "datalist", "dfn", "em",
    "embed", "i", "img", "input", "kbd", "label", "mark", "math", "meter", "noscript", "object",
    "output", "progress", "q", "ruby", "samp", "script", "select", "small", "span", "strong",
    "sub", "sup", "textarea", "time", "var", "wbr",
];

/// Structural tags removed when they carry no content.
pub const EMPTIABLE_TAGS: &[&str] = &[
    "div", "section", "header", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Descendants whose presence marks a `<table>` as tabular data.
pub const DATA_TABLE_DESCENDANTS: &[&str] = &["col", "colgroup", "tfoot", "thead", "th"];

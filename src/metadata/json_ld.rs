//! JSON-LD metadata extraction.
//!
//! Reads `<script type="application/ld+json">` blocks describing a
//! Schema.org Article (or one of its subtypes) and pulls out title, author,
//! description, publisher, and publication date. Parse failures are logged
//! and the offending script skipped; the first article block wins.

use kuchikiki::NodeRef;
use serde_json::Value;
use tracing::debug;

use crate::patterns::{JSON_LD_ARTICLE_TYPES, JSON_LD_CDATA, SCHEMA_ORG_CONTEXT};
use crate::text::text_similarity;

use super::Metadata;

/// Extract metadata from the document's JSON-LD blocks.
///
/// `document_title` is the already-derived page title, used to arbitrate
/// between `name` and `headline` when a block carries both.
pub(crate) fn extract(doc: &NodeRef, document_title: &str, log_failures: bool) -> Metadata {
    let mut metadata = Metadata::default();
    let Ok(scripts) = doc.select("script") else {
        return metadata;
    };

    for script in scripts {
        let is_json_ld = script
            .attributes
            .borrow()
            .get("type")
            .is_some_and(|t| t == "application/ld+json");
        if !is_json_ld {
            continue;
        }

        let raw = script.as_node().text_contents();
        let content = JSON_LD_CDATA.replace_all(&raw, "");
        let parsed: Value = match serde_json::from_str(content.trim()) {
            Ok(value) => value,
            Err(err) => {
                if log_failures {
                    debug!(error = %err, "skipping unparsable JSON-LD block");
                }
                continue;
            }
        };

        let Some(article) = find_article_object(parsed) else {
            continue;
        };

        read_article_fields(&article, document_title, &mut metadata);
        return metadata;
    }

    metadata
}

/// Accept an object with a schema.org context and an Article-family type,
/// looking inside `@graph` when the top level has no type of its own.
fn find_article_object(parsed: Value) -> Option<Value> {
    let context_ok = parsed
        .get("@context")
        .and_then(Value::as_str)
        .is_some_and(|ctx| SCHEMA_ORG_CONTEXT.is_match(ctx));
    if !context_ok {
        return None;
    }

    let mut candidate = parsed.clone();
    if parsed.get("@type").is_none() {
        let graph = parsed.get("@graph").and_then(Value::as_array)?;
        candidate = graph
            .iter()
            .find(|entry| {
                entry
                    .get("@type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| JSON_LD_ARTICLE_TYPES.is_match(t))
            })?
            .clone();
    }

    let type_ok = candidate
        .get("@type")
        .and_then(Value::as_str)
        .is_some_and(|t| JSON_LD_ARTICLE_TYPES.is_match(t));
    type_ok.then_some(candidate)
}

fn read_article_fields(article: &Value, document_title: &str, metadata: &mut Metadata) {
    let name = article.get("name").and_then(Value::as_str);
    let headline = article.get("headline").and_then(Value::as_str);

    metadata.title = match (name, headline) {
        (Some(name), Some(headline)) if name != headline => {
            // Both present and different: prefer whichever resembles the
            // page title; `name` on a tie.
            let name_matches = text_similarity(document_title, name) > 0.75;
            let headline_matches = text_similarity(document_title, headline) > 0.75;
            if headline_matches && !name_matches {
                Some(headline.trim().to_string())
            } else {
                Some(name.trim().to_string())
            }
        }
        (Some(name), _) => Some(name.trim().to_string()),
        (None, Some(headline)) => Some(headline.trim().to_string()),
        (None, None) => None,
    };

    if let Some(author) = article.get("author") {
        metadata.byline = author_names(author);
    }

    metadata.excerpt = article
        .get("description")
        .and_then(Value::as_str)
        .map(|d| d.trim().to_string());

    metadata.site_name = article
        .get("publisher")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(|n| n.trim().to_string());

    metadata.published_time = article
        .get("datePublished")
        .and_then(Value::as_str)
        .map(|d| d.trim().to_string());
}

/// `author` may be an object with a `name`, or an array of them.
fn author_names(author: &Value) -> Option<String> {
    if let Some(name) = author.get("name").and_then(Value::as_str) {
        return Some(name.trim().to_string());
    }
    let authors = author.as_array()?;
    let names: Vec<String> = authors
        .iter()
        .filter_map(|a| a.get("name").and_then(Value::as_str))
        .map(|n| n.trim().to_string())
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

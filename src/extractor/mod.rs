//! The grab-and-prepare stage of extraction.
//!
//! [`pipeline`] walks the document, scores paragraph containers, picks the
//! top candidate and its related siblings, and retries with progressively
//! relaxed flags when the result is too small. [`pruning`] cleans the
//! collected subtree. [`state`] holds the flag ladder both share.

pub(crate) mod pipeline;
pub(crate) mod pruning;
pub(crate) mod state;

//! Content passes. Each pass takes the body produced by the previous one and
//! returns the (possibly) rewritten body plus what it did.
//!
//! Every pass carries its own idempotence guard: run against its own output it
//! reports no changes and returns the body unchanged.

pub mod depth;
pub mod faq;
pub mod headings;
pub mod language;
pub mod links;
pub mod topics;

use std::fmt;

use crate::markup::Markup;
use crate::tables::SeoTables;
use language::Language;

/// A mutation one pass performed on one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord(pub String);

impl ChangeRecord {
    pub fn new(description: impl Into<String>) -> Self {
        ChangeRecord(description.into())
    }
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a pass may read besides the body.
pub struct PassContext<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub language: Language,
    pub base_url: &'a str,
    pub tables: &'a SeoTables,
    pub markup: &'a dyn Markup,
}

#[derive(Debug, Clone, Default)]
pub struct PassOutput {
    pub body: String,
    pub changes: Vec<ChangeRecord>,
    /// Notes for a human editor; never a reason to write.
    pub advisories: Vec<String>,
}

impl PassOutput {
    pub fn unchanged(body: &str) -> Self {
        PassOutput {
            body: body.to_string(),
            ..Default::default()
        }
    }
}

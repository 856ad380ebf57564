//! Typed errors for the store adapter and the static tables.

use std::path::PathBuf;

use thiserror::Error;

use crate::passes::language::Language;

/// Errors from the post store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file does not exist.
    #[error("database not found at {0}")]
    Missing(PathBuf),

    /// The database opened but has no `posts` table.
    #[error("database at {0} has no posts table")]
    NoPostsTable(PathBuf),

    /// An update matched no row.
    #[error("no post with slug '{0}' was updated")]
    NoRowUpdated(String),

    /// The store rejected a write for a reason of its own.
    #[error("write rejected: {0}")]
    Rejected(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Errors raised while loading or validating the SEO tables.
#[derive(Debug, Error)]
pub enum TablesError {
    #[error("failed to read tables file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid tables document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A cluster lists the same slug more than once.
    #[error("cluster '{topic}' lists '{slug}' more than once")]
    DuplicateSlug { topic: String, slug: String },

    /// Boilerplate copy is missing for a supported language.
    #[error("no copy defined for language '{0}'")]
    MissingCopy(Language),

    /// A FAQ template names a topic the ranked topic list cannot resolve.
    #[error("FAQ template for '{0}' has no entry in faq_topics")]
    UnrankedTopic(String),
}

//! Sink traits and record types
//!
//! This module defines the boundary between the crawl engine and the
//! persistence layer: the engine produces `ExtractedRecord`s and hands them
//! to an `ArtifactSink`.

use crate::crawler::Category;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Which extractor produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Link,
    DataFileUrl,
    Email,
    ScriptUrl,
    ApiEndpoint,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::DataFileUrl => "data_file_url",
            Self::Email => "email",
            Self::ScriptUrl => "script_url",
            Self::ApiEndpoint => "api_endpoint",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One extracted artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Extractor that produced the value
    pub kind: ArtifactKind,

    /// The artifact itself (a URL or an email address)
    pub value: String,

    /// Classification, set only for API endpoints
    pub category: Option<Category>,
}

impl ExtractedRecord {
    pub fn new(kind: ArtifactKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            category: None,
        }
    }

    /// Builds a classified API endpoint record
    pub fn api_endpoint(value: impl Into<String>) -> Self {
        let value = value.into();
        let category = Category::of(&value);
        Self {
            kind: ArtifactKind::ApiEndpoint,
            value,
            category: Some(category),
        }
    }
}

/// Trait for persistence sinks
///
/// The engine calls `accept` from a single task, so a sink sees its writes
/// in order and needs no internal locking. Each sink owns one artifact kind
/// and ignores records of other kinds.
pub trait ArtifactSink: Send {
    /// Called once before the first page of a run for `site`
    fn begin(&mut self, _site: &str) -> OutputResult<()> {
        Ok(())
    }

    /// Receives the records extracted from one page
    ///
    /// # Arguments
    ///
    /// * `site` - Site key of the crawl (host without `www.`)
    /// * `records` - Records produced for the page
    fn accept(&mut self, site: &str, records: &[ExtractedRecord]) -> OutputResult<()>;

    /// Flushes anything the sink buffered until the end of the run
    fn finalize(&mut self) -> OutputResult<()>;

    /// Number of records persisted so far
    fn persisted(&self) -> usize;
}

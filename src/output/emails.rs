//! Incremental per-site email files
//!
//! Layout: `<root>/<site>/emails.txt`, one address per line. Each accept
//! reads the file back and appends only addresses it does not hold yet, so
//! re-running the same crawl never duplicates a line.

use crate::output::traits::{ArtifactKind, ArtifactSink, ExtractedRecord, OutputError, OutputResult};
use std::collections::{BTreeSet, HashSet};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const EMAILS_FILE_NAME: &str = "emails.txt";

/// Deduplicating, append-only email sink
pub struct EmailSink {
    root: PathBuf,
    persisted: usize,
}

impl EmailSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            persisted: 0,
        }
    }

    /// Path of the email file for a site
    pub fn file_for(&self, site: &str) -> PathBuf {
        self.root.join(site).join(EMAILS_FILE_NAME)
    }
}

/// Addresses already stored for a site
struct Existing {
    emails: HashSet<String>,
    /// File has content whose last line is not newline-terminated
    needs_newline: bool,
}

/// Reads the addresses already stored in `path`
fn read_existing(path: &Path) -> OutputResult<Existing> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Existing {
            emails: content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            needs_newline: !content.is_empty() && !content.ends_with('\n'),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Existing {
            emails: HashSet::new(),
            needs_newline: false,
        }),
        Err(source) => Err(OutputError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl ArtifactSink for EmailSink {
    fn accept(&mut self, site: &str, records: &[ExtractedRecord]) -> OutputResult<()> {
        let found: BTreeSet<&str> = records
            .iter()
            .filter(|r| r.kind == ArtifactKind::Email)
            .map(|r| r.value.as_str())
            .collect();

        if found.is_empty() {
            return Ok(());
        }

        let path = self.file_for(site);
        let existing = read_existing(&path)?;
        let new: Vec<&str> = found
            .into_iter()
            .filter(|email| !existing.emails.contains(*email))
            .collect();

        if new.is_empty() {
            tracing::debug!("No new emails for {}", site);
            return Ok(());
        }

        let write_err = |source| OutputError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(write_err)?;

        let mut block = String::new();
        if existing.needs_newline {
            block.push('\n');
        }
        for email in &new {
            block.push_str(email);
            block.push('\n');
        }
        file.write_all(block.as_bytes()).map_err(write_err)?;

        self.persisted += new.len();
        tracing::info!("Saved {} new emails in {}", new.len(), path.display());

        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        Ok(())
    }

    fn persisted(&self) -> usize {
        self.persisted
    }
}

//! Session-wide data-file URL list
//!
//! The file is truncated when the sink is created and then receives one URL
//! per line, in discovery order, for the whole crawl session.

use crate::output::traits::{ArtifactKind, ArtifactSink, ExtractedRecord, OutputError, OutputResult};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only sink for data-file URLs
pub struct DataFileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    written: HashSet<String>,
}

impl DataFileSink {
    /// Creates (or truncates) the output file
    pub fn create(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| OutputError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|source| OutputError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: std::io::Error) -> OutputError {
        OutputError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl ArtifactSink for DataFileSink {
    fn accept(&mut self, _site: &str, records: &[ExtractedRecord]) -> OutputResult<()> {
        let mut added = 0;

        for record in records {
            if record.kind != ArtifactKind::DataFileUrl || self.written.contains(&record.value) {
                continue;
            }
            writeln!(self.writer, "{}", record.value).map_err(|e| self.write_err(e))?;
            self.written.insert(record.value.clone());
            added += 1;
        }

        if added > 0 {
            // Flush per page so an interrupted crawl keeps what it found
            self.writer.flush().map_err(|e| self.write_err(e))?;
            tracing::info!("Saved {} URLs to {}", added, self.path.display());
        }

        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        self.writer.flush().map_err(|e| self.write_err(e))
    }

    fn persisted(&self) -> usize {
        self.written.len()
    }
}

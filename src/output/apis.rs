//! Categorized API endpoint files
//!
//! Layout: `<root>/<site>/categorized_api_endpoints.txt`, fully rewritten on
//! every run:
//!
//! ```text
//! Login APIs (1):
//! https://example.com/api/login
//!
//! Admin APIs (0):
//!
//! ...
//! ```

use crate::crawler::{classify, CategorizedEndpoints};
use crate::output::traits::{ArtifactKind, ArtifactSink, ExtractedRecord, OutputError, OutputResult};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub const APIS_FILE_NAME: &str = "categorized_api_endpoints.txt";

/// Overwriting sink for API endpoints
///
/// Endpoints are buffered per site and written once, at `finalize`.
pub struct ApiSink {
    root: PathBuf,
    endpoints: BTreeMap<String, BTreeSet<String>>,
    persisted: usize,
}

impl ApiSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            endpoints: BTreeMap::new(),
            persisted: 0,
        }
    }

    /// Path of the endpoint file for a site
    pub fn file_for(&self, site: &str) -> PathBuf {
        self.root.join(site).join(APIS_FILE_NAME)
    }
}

/// Renders categorized endpoints in the on-disk layout
pub fn render_categorized(categorized: &CategorizedEndpoints) -> String {
    let mut out = String::new();

    for (category, endpoints) in categorized {
        out.push_str(&format!("{} ({}):\n", category.label(), endpoints.len()));
        for endpoint in endpoints {
            out.push_str(endpoint);
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

impl ArtifactSink for ApiSink {
    // The seed site always gets a file, even if its pages cannot be fetched
    fn begin(&mut self, site: &str) -> OutputResult<()> {
        self.endpoints.entry(site.to_string()).or_default();
        Ok(())
    }

    fn accept(&mut self, site: &str, records: &[ExtractedRecord]) -> OutputResult<()> {
        let entry = self.endpoints.entry(site.to_string()).or_default();
        entry.extend(
            records
                .iter()
                .filter(|r| r.kind == ArtifactKind::ApiEndpoint)
                .map(|r| r.value.clone()),
        );
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        for (site, endpoints) in &self.endpoints {
            let path = self.file_for(site);
            let categorized = classify(endpoints);

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| OutputError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            std::fs::write(&path, render_categorized(&categorized)).map_err(|source| {
                OutputError::Write {
                    path: path.clone(),
                    source,
                }
            })?;

            self.persisted += endpoints.len();
            tracing::info!(
                "Saved {} categorized API endpoints in {}",
                endpoints.len(),
                path.display()
            );
        }

        self.endpoints.clear();
        Ok(())
    }

    fn persisted(&self) -> usize {
        self.persisted
    }
}

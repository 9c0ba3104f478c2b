//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with error classification
//! - Link and artifact extraction
//! - API endpoint classification
//! - The frontier queue and the crawl engine

mod classify;
mod engine;
mod extract;
mod fetcher;
mod frontier;

pub use classify::{classify, CategorizedEndpoints, Category};
pub use engine::Engine;
pub use extract::{
    extract_api_endpoints, extract_emails, extract_file_links, extract_links,
    extract_script_urls, FileLinkMatcher,
};
pub use fetcher::{build_http_client, FetchedPage, Fetcher, MAX_REDIRECTS};
pub use frontier::{Frontier, Rejection};

pub use crate::output::CrawlReport;

use crate::config::Config;
use crate::output::{build_sink, ArtifactKind};
use crate::HarvestError;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Which artifacts a crawl harvests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarvestMode {
    /// Data-file URLs (by extension) into one session-wide list
    DataFiles,
    /// Email addresses into incremental per-site files
    Emails,
    /// API endpoints from the site's scripts into categorized per-site files
    Apis,
}

impl HarvestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataFiles => "files",
            Self::Emails => "emails",
            Self::Apis => "apis",
        }
    }

    /// Record kind this mode harvests
    pub fn artifact_kind(&self) -> ArtifactKind {
        match self {
            Self::DataFiles => ArtifactKind::DataFileUrl,
            Self::Emails => ArtifactKind::Email,
            Self::Apis => ArtifactKind::ApiEndpoint,
        }
    }

    /// Plural noun for log messages
    pub fn artifact_name(&self) -> &'static str {
        match self {
            Self::DataFiles => "data-file URLs",
            Self::Emails => "emails",
            Self::Apis => "API endpoints",
        }
    }
}

impl fmt::Display for HarvestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HarvestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "files" | "data-files" => Ok(Self::DataFiles),
            "emails" => Ok(Self::Emails),
            "apis" => Ok(Self::Apis),
            other => Err(format!(
                "unknown mode '{}', expected one of: files, emails, apis",
                other
            )),
        }
    }
}

/// Runs a complete harvest from `seed`
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the sink for `mode` (truncating the data-file list if needed)
/// 2. Build the HTTP client
/// 3. Crawl same-origin pages breadth-first up to the configured depth
/// 4. Hand extracted records to the sink and finalize it
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::Config;
/// use sumi_harvest::crawler::{harvest, HarvestMode};
/// use sumi_harvest::url::parse_seed;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let seed = parse_seed("example.com")?;
/// let report = harvest(&Config::default(), HarvestMode::Emails, &seed).await?;
/// println!("{} pages fetched", report.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(
    config: &Config,
    mode: HarvestMode,
    seed: &Url,
) -> Result<CrawlReport, HarvestError> {
    let sink = build_sink(mode, &config.output)?;
    let mut engine = Engine::new(config, mode, sink)?;
    engine.run(seed).await
}

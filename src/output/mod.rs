//! Output module: persistence sinks and run reporting
//!
//! This module handles:
//! - The session-wide data-file URL list (truncated per session)
//! - Incremental per-site email files (deduplicated across runs)
//! - Categorized per-site API endpoint files (overwritten per run)
//! - The end-of-run report

mod apis;
mod data_files;
mod emails;
pub mod stats;
mod traits;

pub use apis::{render_categorized, ApiSink, APIS_FILE_NAME};
pub use data_files::DataFileSink;
pub use emails::{EmailSink, EMAILS_FILE_NAME};
pub use stats::{print_report, CrawlReport};
pub use traits::{ArtifactKind, ArtifactSink, ExtractedRecord, OutputError, OutputResult};

use crate::config::OutputConfig;
use crate::crawler::HarvestMode;
use std::path::Path;

/// Builds the sink that persists the artifacts of `mode`
///
/// Creating the data-file sink truncates its file, so call this once per
/// session.
pub fn build_sink(mode: HarvestMode, config: &OutputConfig) -> OutputResult<Box<dyn ArtifactSink>> {
    let sink: Box<dyn ArtifactSink> = match mode {
        HarvestMode::DataFiles => Box::new(DataFileSink::create(Path::new(&config.data_files_path))?),
        HarvestMode::Emails => Box::new(EmailSink::new(&config.emails_dir)),
        HarvestMode::Apis => Box::new(ApiSink::new(&config.apis_dir)),
    };
    Ok(sink)
}

//! Run report for a finished crawl
//!
//! This module provides the counters the engine keeps while crawling and a
//! printer for displaying them.

use chrono::{DateTime, Utc};

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Normalized seed URL
    pub seed: String,

    /// When the engine started
    pub started_at: DateTime<Utc>,

    /// When the engine finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    /// Scripts fetched successfully (API mode)
    pub scripts_fetched: u64,

    /// Scripts whose fetch failed (API mode)
    pub scripts_failed: u64,

    /// Tasks dropped because the URL had already been dispatched
    pub skipped_visited: u64,

    /// Links dropped because they would exceed the maximum depth
    pub skipped_depth: u64,

    /// Links dropped because they point off the seed's origin
    pub skipped_external: u64,

    /// Harvested artifacts handed to the sink (script URLs are not counted)
    pub records_emitted: u64,

    /// Records the sink reports as persisted
    pub records_persisted: u64,

    /// Whether the run was cancelled before the frontier drained
    pub cancelled: bool,

    /// Every URL dispatched, sorted
    pub visited: Vec<String>,
}

impl CrawlReport {
    /// Creates an empty report for a run starting now
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            started_at: Utc::now(),
            finished_at: None,
            pages_fetched: 0,
            pages_failed: 0,
            scripts_fetched: 0,
            scripts_failed: 0,
            skipped_visited: 0,
            skipped_depth: 0,
            skipped_external: 0,
            records_emitted: 0,
            records_persisted: 0,
            cancelled: false,
            visited: Vec::new(),
        }
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Returns the success rate of page fetches as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_fetched + self.pages_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_fetched as f64 / attempted as f64) * 100.0
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Harvest Report ===\n");

    println!("Seed: {}", report.seed);
    println!("Started: {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = report.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    if report.cancelled {
        println!("Status: cancelled");
    }
    println!();

    println!("Pages:");
    println!("  Fetched: {}", report.pages_fetched);
    println!("  Failed: {}", report.pages_failed);
    if report.scripts_fetched + report.scripts_failed > 0 {
        println!("  Scripts fetched: {}", report.scripts_fetched);
        println!("  Scripts failed: {}", report.scripts_failed);
    }
    println!();

    println!("Skipped:");
    println!("  Already visited: {}", report.skipped_visited);
    println!("  Beyond max depth: {}", report.skipped_depth);
    println!("  External origin: {}", report.skipped_external);
    println!();

    println!("Records:");
    println!("  Extracted: {}", report.records_emitted);
    println!("  Persisted: {}", report.records_persisted);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        report.success_rate(),
        report.pages_fetched,
        report.pages_fetched + report.pages_failed
    );
}

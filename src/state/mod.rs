//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: Lifecycle of a single crawl task (pending, fetching, extracting, ...)
//! - `CrawlTask`: A URL queued for visiting together with its depth
//! - `VisitedSet`: URLs already dispatched during the current run

mod task_state;
mod visited;

// Re-export main types
pub use task_state::{CrawlTask, TaskState};
pub use visited::VisitedSet;

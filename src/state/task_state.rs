/// Task state definitions for tracking crawl progress
///
/// This module defines the lifecycle of a single crawl task.
use std::fmt;
use url::Url;

/// A page waiting to be visited, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized URL of the page
    pub url: Url,

    /// Number of link hops from the seed (the seed is 0)
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }

    /// Returns the task for a link discovered on this page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// Represents the current state of a task in the crawl process
///
/// ```text
/// Pending ──> Fetching ──> Extracting ──> Done
///    │            └──────> Failed ──────> Done
///    └──────────────────────────────────> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Task is queued and waiting to be dispatched
    Pending,

    /// Page is currently being fetched
    Fetching,

    /// Page body is being scanned for links and artifacts
    Extracting,

    /// Fetch failed; no artifacts and no recursion from this node
    Failed,

    /// Task finished, whether it did any work or not
    Done,
}

impl TaskState {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Pending, Self::Done)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Failed)
                | (Self::Extracting, Self::Done)
                | (Self::Failed, Self::Done)
        )
    }

    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Failed => "failed",
            Self::Done => "done",
        }
    }

    /// Returns all possible task states
    pub fn all_states() -> [Self; 5] {
        [
            Self::Pending,
            Self::Fetching,
            Self::Extracting,
            Self::Failed,
            Self::Done,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

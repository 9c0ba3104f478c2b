//! Frontier queue for the crawl engine
//!
//! The frontier is a FIFO of pending tasks. It applies the scope rules at
//! enqueue time so that nothing out of scope is ever dispatched:
//! - links off the seed's origin are dropped
//! - links deeper than the maximum depth are dropped

use crate::state::CrawlTask;
use crate::url::Origin;
use std::collections::VecDeque;
use url::Url;

/// Why a discovered link was not enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    External,
    TooDeep,
}

/// FIFO of pending crawl tasks bounded by origin and depth
#[derive(Debug)]
pub struct Frontier {
    origin: Origin,
    max_depth: u32,
    queue: VecDeque<CrawlTask>,
}

impl Frontier {
    /// Creates a frontier seeded with `seed` at depth 0
    pub fn new(seed: CrawlTask, origin: Origin, max_depth: u32) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        Self {
            origin,
            max_depth,
            queue,
        }
    }

    /// Enqueues a link discovered on `parent`
    pub fn offer(&mut self, parent: &CrawlTask, link: Url) -> Result<(), Rejection> {
        if !self.origin.contains(&link) {
            return Err(Rejection::External);
        }

        let task = parent.child(link);
        if !self.within_depth(&task) {
            return Err(Rejection::TooDeep);
        }

        self.queue.push_back(task);
        Ok(())
    }

    /// A task is fetched only if `depth <= max_depth`
    pub fn within_depth(&self, task: &CrawlTask) -> bool {
        task.depth <= self.max_depth
    }

    pub fn pop(&mut self) -> Option<CrawlTask> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// URLs already dispatched during one crawl run
///
/// The set only grows. `mark` is the single check-and-insert step: when
/// several workers race on the same URL, exactly one of them wins.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` as visited
    ///
    /// Returns `true` if the URL was not yet in the set, meaning the caller
    /// now owns the visit.
    pub fn mark(&self, url: &Url) -> bool {
        self.lock().insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.lock().contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted copy of every visited URL
    pub fn snapshot(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().iter().cloned().collect();
        urls.sort();
        urls
    }

    // Poisoning is ignored: no operation leaves the set half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

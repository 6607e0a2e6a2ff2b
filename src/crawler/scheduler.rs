//! Scheduler for the crawl worklist
//!
//! This module handles:
//! - The explicit LIFO worklist of pages still to process
//! - The visited set, keyed on canonical (fragment-free) URLs
//! - Configured exclusions, which count as visited from the start

use crate::url::canonical;
use std::collections::HashSet;
use url::Url;

/// Worklist and visited set of one crawl pass
///
/// A URL is marked visited when it is scheduled, before its fetch begins, so
/// a page is never fetched twice in a pass no matter how many pages link to
/// it. Memory is bounded by the number of distinct pages.
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Pages waiting to be processed; the last element is processed next
    worklist: Vec<Url>,

    /// Canonical URLs already scheduled or excluded
    visited: HashSet<Url>,

    /// Canonical URLs that must never be fetched
    excluded: HashSet<Url>,
}

impl Scheduler {
    /// Creates a scheduler with the given pages pre-marked as visited
    pub fn new(excluded: impl IntoIterator<Item = Url>) -> Self {
        let excluded: HashSet<Url> = excluded.into_iter().map(|url| canonical(&url)).collect();

        Self {
            worklist: Vec::new(),
            visited: excluded.clone(),
            excluded,
        }
    }

    /// Schedules a page unless it was seen before
    ///
    /// The check and the insert into the visited set happen together.
    ///
    /// # Returns
    ///
    /// `true` if the page is new and now waits in the worklist
    pub fn schedule(&mut self, url: &Url) -> bool {
        let key = canonical(url);
        if !self.visited.insert(key.clone()) {
            return false;
        }

        self.worklist.push(key);
        true
    }

    /// Schedules the pages discovered on one page
    ///
    /// New pages are pushed in reverse so that the first-discovered page is
    /// processed next.
    ///
    /// # Returns
    ///
    /// The number of pages that were new
    pub fn schedule_all(&mut self, urls: &[Url]) -> usize {
        let fresh: Vec<Url> = urls
            .iter()
            .map(canonical)
            .filter(|key| self.visited.insert(key.clone()))
            .collect();

        let count = fresh.len();
        self.worklist.extend(fresh.into_iter().rev());
        count
    }

    /// Takes the next page to process
    pub fn next(&mut self) -> Option<Url> {
        self.worklist.pop()
    }

    /// Returns true if the page was scheduled or excluded before
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&canonical(url))
    }

    /// Canonical URLs that are never fetched
    pub fn excluded(&self) -> &HashSet<Url> {
        &self.excluded
    }

    /// Number of pages waiting in the worklist
    pub fn frontier_size(&self) -> usize {
        self.worklist.len()
    }

    /// Returns whether the worklist is empty
    pub fn is_empty(&self) -> bool {
        self.worklist.is_empty()
    }

    /// Number of pages scheduled so far, exclusions not counted
    pub fn scheduled_count(&self) -> usize {
        self.visited.len() - self.excluded.len()
    }
}

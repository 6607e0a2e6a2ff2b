//! Per-pass crawl statistics
//!
//! This module provides the counters a crawl pass fills in and their
//! console rendering.

use crate::crawler::Mode;
use crate::state::PageState;
use std::collections::HashMap;

/// Counters of one crawl pass
#[derive(Debug, Clone)]
pub struct PassStatistics {
    /// Which tree the pass produced
    pub mode: Mode,

    /// Final state of every page the pass touched
    pub pages_by_state: HashMap<PageState, u64>,

    /// Images stored in the tree (downloads, not references)
    pub images: u64,

    /// Math formulas stored in the tree
    pub maths: u64,

    /// Asset references left pointing at the remote copy
    pub asset_failures: u64,

    /// Elements a transformation pass had to leave unchanged
    pub transform_issues: u64,

    /// Configured pages skipped on purpose
    pub excluded: u64,

    /// Pages that ended in `Failed`
    pub failed_urls: Vec<String>,
}

impl PassStatistics {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            pages_by_state: HashMap::new(),
            images: 0,
            maths: 0,
            asset_failures: 0,
            transform_issues: 0,
            excluded: 0,
            failed_urls: Vec::new(),
        }
    }

    /// Records the final state of a page
    pub fn record_page(&mut self, url: &str, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
        if state == PageState::Failed {
            self.failed_urls.push(url.to_string());
        }
    }

    /// Pages written to disk
    pub fn pages_written(&self) -> u64 {
        self.count(PageState::Persisted)
    }

    /// Pages that could not be produced
    pub fn pages_failed(&self) -> u64 {
        self.count(PageState::Failed)
    }

    /// All pages the pass attempted
    pub fn pages_attempted(&self) -> u64 {
        self.pages_by_state.values().sum()
    }

    fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }
}

/// Prints pass statistics to stdout in a formatted manner
pub fn print_statistics(stats: &PassStatistics) {
    println!("=== {} pass ===\n", stats.mode);

    println!("Pages:");
    println!("  Written: {}", stats.pages_written());
    println!("  Failed: {}", stats.pages_failed());
    println!("  Excluded: {}", stats.excluded);
    println!();

    println!("Assets:");
    println!("  Images: {}", stats.images);
    println!("  Math formulas: {}", stats.maths);
    println!("  Failed downloads: {}", stats.asset_failures);
    println!();

    if stats.transform_issues > 0 {
        println!("Elements left unchanged: {}", stats.transform_issues);
        println!();
    }

    if !stats.failed_urls.is_empty() {
        println!("Failed Pages ({}):", stats.failed_urls.len());
        for url in &stats.failed_urls {
            println!("  - {}", url);
        }
        println!();
    }

    let attempted = stats.pages_attempted();
    let success_rate = if attempted > 0 {
        (stats.pages_written() as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages written)",
        success_rate,
        stats.pages_written(),
        attempted
    );
}

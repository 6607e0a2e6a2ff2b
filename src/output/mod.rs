//! Output module for run summaries
//!
//! This module handles:
//! - Collecting the statistics of the HTML and PDF passes
//! - Recording renderer and packaging results
//! - Printing the final summary

pub mod stats;

pub use stats::{print_statistics, PassStatistics};

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Everything one invocation produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// SHA-256 of the configuration file
    pub config_hash: String,

    /// Statistics of the linked HTML pass
    pub html: Option<PassStatistics>,

    /// Statistics of the PDF staging pass
    pub pdf: Option<PassStatistics>,

    /// PDF files the renderer produced
    pub pdfs_rendered: u64,

    /// Staged pages the renderer failed on
    pub pdfs_failed: Vec<PathBuf>,

    /// Zip files written
    pub archives: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new(config_hash: String) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash,
            html: None,
            pdf: None,
            pdfs_rendered: 0,
            pdfs_failed: Vec::new(),
            archives: Vec::new(),
        }
    }

    /// Marks the run as finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<u64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds().max(0) as u64)
    }

    /// Total failures across passes, renderer included
    pub fn total_failures(&self) -> u64 {
        let pages: u64 = [&self.html, &self.pdf]
            .into_iter()
            .flatten()
            .map(|stats| stats.pages_failed() + stats.asset_failures)
            .sum();
        pages + self.pdfs_failed.len() as u64
    }
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Offline Manual Summary ===\n");
    println!("Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = summary.duration_seconds() {
        println!("Duration: {}s", duration);
    }
    println!("Config hash: {}", summary.config_hash);
    println!();

    for stats in [&summary.html, &summary.pdf].into_iter().flatten() {
        print_statistics(stats);
        println!();
    }

    if summary.pdf.is_some() {
        println!("Renderer:");
        println!("  PDFs written: {}", summary.pdfs_rendered);
        println!("  Failed: {}", summary.pdfs_failed.len());
        for file in &summary.pdfs_failed {
            println!("  - {}", file.display());
        }
        println!();
    }

    for archive in &summary.archives {
        println!("Archive: {}", archive.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Mode;
    use crate::state::PageState;

    #[test]
    fn test_total_failures() {
        let mut summary = RunSummary::new("abc".to_string());

        let mut html = PassStatistics::new(Mode::Html);
        html.record_page("https://host/wiki/M/A", PageState::Failed);
        html.asset_failures = 2;
        summary.html = Some(html);

        summary.pdfs_failed.push(PathBuf::from("docs_pdf/M.html"));

        assert_eq!(summary.total_failures(), 4);
    }

    #[test]
    fn test_duration() {
        let mut summary = RunSummary::new("abc".to_string());
        assert!(summary.duration_seconds().is_none());
        summary.finish();
        assert_eq!(summary.duration_seconds(), Some(0));
    }
}

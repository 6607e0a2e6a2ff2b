//! PDF export
//!
//! The export runs a print-oriented crawl pass over the configured printable
//! pages, gives the staged pages the stylesheet of the HTML tree and renders
//! every staged page to PDF.

pub mod archive;
pub mod pdf;

pub use archive::{zip_dir, HTML_ARCHIVE, PDF_ARCHIVE};
pub use pdf::{render_directory, PdfRenderer, RenderReport};

use crate::config::Config;
use crate::crawler::{Coordinator, CrawlPolicy};
use crate::output::PassStatistics;
use crate::MirrorError;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What the export produced
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Statistics of the staging pass
    pub stats: PassStatistics,
    /// Renderer results
    pub render: RenderReport,
}

/// Runs the staging pass and the renderer
///
/// # Steps
///
/// 1. Crawl every export seed with the PDF policy in a fresh session
/// 2. Replace the staging stylesheet directory with the HTML tree's copy,
///    downloading the stylesheet when the HTML tree has none
/// 3. Render each staged page into the PDF directory
///
/// Page and renderer failures are counted, not returned.
pub async fn run_export(config: &Config) -> Result<ExportReport, MirrorError> {
    let staging_dir = PathBuf::from(&config.output.pdf_staging_dir);
    let policy = CrawlPolicy::pdf(staging_dir.clone(), config.export.rasterize_math);
    let mut coordinator = Coordinator::new(config, policy)?;

    for seed in &config.export.seeds {
        let url = coordinator.resolver().resolve(seed)?;
        if !coordinator.seed(&url) {
            tracing::warn!("Duplicate export seed skipped: {}", url);
        }
    }

    coordinator.run().await?;

    let html_styles = CrawlPolicy::html(PathBuf::from(&config.output.html_dir)).styles_dir();
    let staging_styles = coordinator.policy().styles_dir();
    if html_styles.is_dir() {
        replace_dir(&html_styles, &staging_styles)?;
        tracing::debug!("Copied styles from {}", html_styles.display());
    } else {
        tracing::info!(
            "No stylesheet in {}, downloading it for the PDF pages",
            html_styles.display()
        );
        if let Err(e) = coordinator.download_stylesheet().await {
            tracing::warn!("Stylesheet not downloaded: {}", e);
        }
    }

    let stats = coordinator.into_statistics();

    let renderer = PdfRenderer::new(config.export.renderer.clone(), config.export.options.clone());
    let render = render_directory(&renderer, &staging_dir, Path::new(&config.output.pdf_dir)).await?;

    tracing::info!(
        "Export completed: {} PDFs written, {} failed",
        render.rendered.len(),
        render.failed.len()
    );

    Ok(ExportReport { stats, render })
}

/// Replaces `destination` with a recursive copy of `source`
fn replace_dir(source: &Path, destination: &Path) -> Result<(), MirrorError> {
    if destination.exists() {
        std::fs::remove_dir_all(destination)?;
    }

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

//! Offline-Manual main entry point
//!
//! This is the command-line interface for the Offline-Manual mirror generator.

use clap::Parser;
use offline_manual::config::{load_config_with_hash, Config};
use offline_manual::crawler::run_crawl;
use offline_manual::export::{run_export, zip_dir, HTML_ARCHIVE, PDF_ARCHIVE};
use offline_manual::output::print_summary;
use offline_manual::RunSummary;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Offline-Manual: an offline mirror generator for wiki manuals
///
/// Offline-Manual downloads every page of a wiki manual through the content
/// API, strips the site chrome, stores images and formulas locally and
/// rewrites links so the pages work without a network. The printable
/// version can also be rendered to PDF.
#[derive(Parser, Debug)]
#[command(name = "offline-manual")]
#[command(version = "1.0.0")]
#[command(about = "Generate an offline copy of a wiki manual", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be generated without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Only build the linked HTML tree
    #[arg(long, conflicts_with = "pdf_only")]
    html_only: bool,

    /// Only run the PDF export
    #[arg(long, conflicts_with = "html_only")]
    pdf_only: bool,

    /// Zip the HTML tree and the PDF directory when done
    #[arg(long)]
    archive: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli);
        return Ok(());
    }

    let mut summary = RunSummary::new(config_hash);

    if !cli.pdf_only {
        handle_html(&config, &mut summary).await?;
    }

    if !cli.html_only {
        handle_export(&config, &mut summary).await?;
    }

    if cli.archive {
        handle_archive(&config, &cli, &mut summary)?;
    }

    summary.finish();
    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("offline_manual=info,warn"),
            1 => EnvFilter::new("offline_manual=debug,info"),
            2 => EnvFilter::new("offline_manual=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be generated
fn handle_dry_run(config: &Config, cli: &Cli) {
    println!("=== Offline-Manual Dry Run ===\n");

    println!("Wiki:");
    println!("  Base URL: {}", config.wiki.base_url);
    println!("  Root page: {}", config.wiki.root_page);
    println!(
        "  Manual prefix: {}",
        config.wiki.manual_prefix.as_deref().unwrap_or("(root page path)")
    );
    println!("  Content API: {}", config.wiki.api_url);
    println!("  Stylesheet: {}", config.wiki.stylesheet_url);

    println!("\nUser Agent: {}", config.user_agent.value);

    println!("\nCrawler:");
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!(
        "  Excluded pages ({}):",
        config.crawler.excluded_pages.len()
    );
    for page in &config.crawler.excluded_pages {
        println!("    * {}", page);
    }

    println!("\nOutput:");
    println!("  HTML tree: {}", config.output.html_dir);
    println!("  PDF staging: {}", config.output.pdf_staging_dir);
    println!("  PDFs: {}", config.output.pdf_dir);

    println!("\nExport:");
    println!("  Renderer: {}", config.export.renderer);
    println!("  Rasterize math: {}", config.export.rasterize_math);
    println!("  Seeds ({}):", config.export.seeds.len());
    for seed in &config.export.seeds {
        println!("    * {}", seed);
    }

    println!("\n✓ Configuration is valid");
    if !cli.pdf_only {
        println!("✓ Would mirror the manual starting at {}", config.wiki.root_page);
    }
    if !cli.html_only {
        println!(
            "✓ Would render {} printable page(s) to PDF",
            config.export.seeds.len()
        );
    }
    if cli.archive {
        println!("✓ Would write {} and {}", HTML_ARCHIVE, PDF_ARCHIVE);
    }
}

/// Handles the HTML pass
async fn handle_html(
    config: &Config,
    summary: &mut RunSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Mirroring {} into {}", config.wiki.root_page, config.output.html_dir);

    match run_crawl(config).await {
        Ok(stats) => {
            summary.html = Some(stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("HTML pass failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the PDF export
async fn handle_export(
    config: &Config,
    summary: &mut RunSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.export.seeds.is_empty() {
        tracing::info!("No export seeds configured, skipping PDF export");
        return Ok(());
    }

    match run_export(config).await {
        Ok(report) => {
            summary.pdf = Some(report.stats);
            summary.pdfs_rendered = report.render.rendered.len() as u64;
            summary.pdfs_failed = report.render.failed;
            Ok(())
        }
        Err(e) => {
            tracing::error!("PDF export failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --archive option
fn handle_archive(
    config: &Config,
    cli: &Cli,
    summary: &mut RunSummary,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut targets = Vec::new();
    if !cli.pdf_only {
        targets.push((Path::new(&config.output.html_dir), HTML_ARCHIVE));
    }
    if !cli.html_only && !config.export.seeds.is_empty() {
        targets.push((Path::new(&config.output.pdf_dir), PDF_ARCHIVE));
    }

    for (source, name) in targets {
        let destination = PathBuf::from(name);
        zip_dir(source, &destination)?;
        summary.archives.push(destination);
    }

    Ok(())
}

//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives every page of a pass
//! through the pipeline:
//! - Taking pages from the scheduler
//! - Fetching rendered markup from the content API
//! - Sanitizing, localizing assets and rewriting links
//! - Assembling and writing the page file
//! - Scheduling newly discovered manual pages

use crate::config::Config;
use crate::crawler::assets::{ensure_asset, AssetOutcome};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::{CrawlPolicy, CrawlSession, Mode};
use crate::output::PassStatistics;
use crate::state::PageState;
use crate::transform::{
    assemble, collect_assets, parse_document, rewrite_links, sanitize, serialize, AssetKind,
};
use crate::url::WikiResolver;
use crate::MirrorError;
use kuchiki::NodeRef;
use std::path::PathBuf;
use std::time::Instant;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    resolver: WikiResolver,
    fetcher: Fetcher,
    session: CrawlSession,
    site_name: String,
    stylesheet_url: String,
}

impl Coordinator {
    /// Creates a coordinator for one pass
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `policy` - Behavior of this pass
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to be seeded
    /// * `Err(MirrorError)` - A configured URL is unusable or the HTTP client failed
    pub fn new(config: &Config, policy: CrawlPolicy) -> Result<Self, MirrorError> {
        let resolver = WikiResolver::new(&config.wiki)?;

        let excluded = if policy.honor_exclusions {
            config
                .crawler
                .excluded_pages
                .iter()
                .map(|page| resolver.resolve(page))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        let fetcher = Fetcher::new(&config.user_agent, &config.crawler)?;

        Ok(Self {
            resolver,
            fetcher,
            session: CrawlSession::new(policy, excluded),
            site_name: config.wiki.site_name.clone(),
            stylesheet_url: config.wiki.stylesheet_url.clone(),
        })
    }

    /// Schedules a starting page
    ///
    /// # Returns
    ///
    /// `false` if the page was excluded or already scheduled
    pub fn seed(&mut self, url: &Url) -> bool {
        self.session.scheduler.schedule(url)
    }

    pub fn resolver(&self) -> &WikiResolver {
        &self.resolver
    }

    pub fn policy(&self) -> &CrawlPolicy {
        &self.session.policy
    }

    pub fn statistics(&self) -> &PassStatistics {
        &self.session.stats
    }

    /// Ends the pass and hands over its statistics
    pub fn into_statistics(self) -> PassStatistics {
        self.session.stats
    }

    /// Runs the crawl loop until the worklist is empty
    ///
    /// A page that fails is logged, counted and skipped. In HTML mode a
    /// failure of the manual's root page ends the pass with that error,
    /// since no useful tree can be built without it.
    pub async fn run(&mut self) -> Result<(), MirrorError> {
        tracing::info!(
            "Starting {} pass into {}",
            self.session.policy.mode,
            self.session.policy.output_dir.display()
        );

        tokio::fs::create_dir_all(&self.session.policy.output_dir).await?;

        let mut pages_processed = 0u64;
        let start_time = Instant::now();

        while let Some(url) = self.session.scheduler.next() {
            tracing::debug!("Processing page: {}", url);

            let mut state = PageState::Scheduled;
            let result = self.process_page(&url, &mut state).await;
            pages_processed += 1;

            match result {
                Ok(()) => self.session.stats.record_page(url.as_str(), state),
                Err(e) => {
                    tracing::error!("Failed {} (after {}): {}", url, state, e);
                    self.session
                        .stats
                        .record_page(url.as_str(), PageState::Failed);

                    if self.session.policy.mode == Mode::Html && &url == self.resolver.root_page() {
                        return Err(e);
                    }
                }
            }

            // Progress reporting every 10 pages
            if pages_processed % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = pages_processed as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} pages processed, {} in worklist, {:.2} pages/sec",
                    pages_processed,
                    self.session.scheduler.frontier_size(),
                    rate
                );
            }
        }

        tracing::info!(
            "{} pass completed: {} pages written, {} failed in {:?}",
            self.session.policy.mode,
            self.session.stats.pages_written(),
            self.session.stats.pages_failed(),
            start_time.elapsed()
        );

        Ok(())
    }

    /// Downloads the shared stylesheet into this pass's tree
    pub async fn download_stylesheet(&self) -> Result<PathBuf, MirrorError> {
        let path = self.session.policy.stylesheet_path();
        tokio::fs::create_dir_all(self.session.policy.styles_dir()).await?;

        let css = self.fetcher.fetch_text(&self.stylesheet_url).await?;
        tokio::fs::write(&path, css).await?;

        tracing::info!("Saved stylesheet to {}", path.display());
        Ok(path)
    }

    /// Processes a single page
    ///
    /// `state` follows the page through the pipeline so that a failure can be
    /// reported with the last state reached. Nothing is written unless every
    /// step before persisting succeeded.
    async fn process_page(&mut self, url: &Url, state: &mut PageState) -> Result<(), MirrorError> {
        let api_url = self.resolver.api_url(url);
        let markup = self.fetcher.fetch_page(&api_url).await?;
        advance(state, PageState::Fetched)?;

        let name = self
            .resolver
            .page_name(url, self.session.policy.rename_printable)?;
        let document = parse_document(&markup);

        let report = sanitize(&document, &self.session.policy);
        self.session.stats.transform_issues += report.issues.len() as u64;
        advance(state, PageState::Sanitized)?;

        self.localize_assets(&document).await;

        let links = rewrite_links(
            &document,
            &self.resolver,
            &self.session.policy,
            self.session.scheduler.excluded(),
        );
        if self.session.policy.follow_links {
            let scheduled = self.session.scheduler.schedule_all(&links.discovered);
            tracing::debug!(
                "{}: {} links, {} new pages scheduled",
                name.slug,
                links.discovered.len(),
                scheduled
            );
        }
        advance(state, PageState::Rewritten)?;

        assemble(&document, &name.title, url, &self.site_name)?;
        advance(state, PageState::Assembled)?;

        let path = self.session.policy.page_path(&name.file_name);
        tokio::fs::write(&path, serialize(&document)).await?;
        advance(state, PageState::Persisted)?;

        tracing::info!("Saved {}", path.display());
        Ok(())
    }

    /// Downloads the page's assets and points the document at the local copies
    ///
    /// Asset failures leave the remote reference in place.
    async fn localize_assets(&mut self, document: &NodeRef) {
        let (assets, issues) = collect_assets(document, &self.resolver);

        for issue in issues {
            tracing::warn!("Skipping asset: {}", issue);
            self.session.stats.asset_failures += 1;
        }

        for asset in &assets {
            let outcome = ensure_asset(
                &self.fetcher,
                asset,
                &self.session.policy,
                &mut self.session.assets,
            )
            .await;

            match outcome {
                Ok(outcome) => {
                    asset.apply(outcome.local_name());
                    if let AssetOutcome::Downloaded(_) = outcome {
                        match asset.kind {
                            AssetKind::Image => self.session.stats.images += 1,
                            AssetKind::Math => self.session.stats.maths += 1,
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to store asset {}: {}", asset.source, e);
                    self.session.stats.asset_failures += 1;
                }
            }
        }
    }
}

/// Moves a page to its next state, rejecting out-of-order steps
fn advance(state: &mut PageState, to: PageState) -> Result<(), MirrorError> {
    if !state.can_transition_to(to) {
        return Err(MirrorError::InvalidTransition { from: *state, to });
    }
    *state = to;
    Ok(())
}

/// Runs the HTML pass
///
/// This function orchestrates the linked offline tree:
///
/// 1. Build the coordinator with the HTML policy
/// 2. Download the stylesheet
/// 3. Seed the root page
/// 4. Crawl until no manual page is left
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(PassStatistics)` - The pass completed, possibly with page failures
/// * `Err(MirrorError)` - Setup failed or the root page could not be produced
///
/// # Example
///
/// ```no_run
/// use offline_manual::config::load_config;
/// use offline_manual::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = run_crawl(&config).await?;
/// println!("{} pages", stats.pages_written());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<PassStatistics, MirrorError> {
    let policy = CrawlPolicy::html(PathBuf::from(&config.output.html_dir));
    let mut coordinator = Coordinator::new(config, policy)?;

    if let Err(e) = coordinator.download_stylesheet().await {
        tracing::warn!("Stylesheet not downloaded: {}", e);
    }

    let root = coordinator.resolver().root_page().clone();
    coordinator.seed(&root);
    coordinator.run().await?;

    Ok(coordinator.into_statistics())
}

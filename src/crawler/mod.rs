//! Crawler module for mirroring manual pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Worklist scheduling and page deduplication
//! - Asset download and caching
//! - Overall crawl coordination

pub mod assets;
mod coordinator;
mod fetcher;
mod policy;
mod scheduler;
mod session;

pub use assets::{ensure_asset, rasterize_svg, AssetCache, AssetOutcome};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, extract_page_markup, Fetcher};
pub use policy::{CrawlPolicy, Mode};
pub use scheduler::Scheduler;
pub use session::CrawlSession;

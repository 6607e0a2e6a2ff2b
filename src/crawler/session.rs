//! State owned by one crawl pass

use crate::crawler::assets::AssetCache;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::CrawlPolicy;
use crate::output::PassStatistics;
use url::Url;

/// Everything one pass mutates
///
/// The HTML pass and the PDF pass each own a session, so their visited sets
/// and asset caches never mix.
#[derive(Debug)]
pub struct CrawlSession {
    pub policy: CrawlPolicy,
    pub scheduler: Scheduler,
    pub assets: AssetCache,
    pub stats: PassStatistics,
}

impl CrawlSession {
    /// Starts a session whose `excluded` pages count as already visited
    pub fn new(policy: CrawlPolicy, excluded: impl IntoIterator<Item = Url>) -> Self {
        let scheduler = Scheduler::new(excluded);
        let mut stats = PassStatistics::new(policy.mode);
        stats.excluded = scheduler.excluded().len() as u64;

        Self {
            policy,
            scheduler,
            assets: AssetCache::new(),
            stats,
        }
    }
}

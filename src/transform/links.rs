//! Anchor rewriting and link discovery

use crate::crawler::CrawlPolicy;
use crate::transform::select_all;
use crate::url::{canonical, WikiResolver};
use kuchiki::NodeRef;
use std::collections::HashSet;
use url::Url;

/// Outcome of the link pass over one page
#[derive(Debug, Default, Clone)]
pub struct LinkRewrite {
    /// Manual pages linked from this page, in document order, fragments kept
    pub discovered: Vec<Url>,
    /// Anchors now pointing at a local page file
    pub local: usize,
    /// Anchors now carrying an absolute URL
    pub absolute: usize,
    /// Anchors left untouched because their href could not be resolved
    pub unresolved: usize,
}

/// Rewrites every anchor of the document
///
/// Fragment-only references and links to local files (`./…`, written by the
/// asset pass) are left alone. When the policy keeps links local, links to
/// manual pages that are neither the printable variant nor in `excluded`
/// become `<slug>.html[#fragment]` and are reported as discovered. Every other
/// resolvable href becomes absolute.
pub fn rewrite_links(
    document: &NodeRef,
    resolver: &WikiResolver,
    policy: &CrawlPolicy,
    excluded: &HashSet<Url>,
) -> LinkRewrite {
    let mut result = LinkRewrite::default();

    let anchors = match select_all(document, "a[href]") {
        Ok(anchors) => anchors,
        Err(e) => {
            tracing::warn!("Link pass skipped: {}", e);
            return result;
        }
    };

    for anchor in anchors {
        let href = match anchor.attributes.borrow().get("href") {
            Some(href) => href.trim().to_string(),
            None => continue,
        };

        if href.is_empty() || href.starts_with('#') || href.starts_with("./") {
            continue;
        }

        let url = match resolver.resolve(&href) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Leaving unresolvable link {}: {}", href, e);
                result.unresolved += 1;
                continue;
            }
        };

        let new_href = match local_href(&url, resolver, policy, excluded) {
            Some(local) => {
                result.discovered.push(url);
                result.local += 1;
                local
            }
            None => {
                result.absolute += 1;
                url.to_string()
            }
        };

        anchor.attributes.borrow_mut().insert("href", new_href);
    }

    result
}

/// The local href for a followable manual page, if this link is one
fn local_href(
    url: &Url,
    resolver: &WikiResolver,
    policy: &CrawlPolicy,
    excluded: &HashSet<Url>,
) -> Option<String> {
    if policy.absolutize_links
        || !resolver.is_manual_page(url)
        || resolver.is_printable(url)
        || excluded.contains(&canonical(url))
    {
        return None;
    }

    let name = resolver.page_name(url, false).ok()?;
    Some(name.href(url.fragment()))
}

//! URL handling module for Offline-Manual
//!
//! This module resolves hrefs found in wiki markup, maps page URLs to the
//! content API, decides which URLs belong to the manual, and derives local
//! file names for pages and assets.

mod naming;
mod normalize;

use crate::config::WikiConfig;
use crate::UrlError;
use url::Url;

// Re-export main functions
pub use naming::{asset_file_name, math_file_name, PageName};
pub use normalize::{canonical, resolve_href};

/// Resolver bound to one wiki and one manual namespace
#[derive(Debug, Clone)]
pub struct WikiResolver {
    base: Url,
    base_str: String,
    article_path: String,
    api_url: String,
    manual_prefix: String,
    printable_page: String,
    root_page: Url,
}

impl WikiResolver {
    /// Builds a resolver from the wiki configuration
    ///
    /// # Returns
    ///
    /// * `Ok(WikiResolver)` - Resolver for the configured manual
    /// * `Err(UrlError)` - The base or root URL could not be parsed
    pub fn new(config: &WikiConfig) -> Result<Self, UrlError> {
        let base_str = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_str).map_err(|e| UrlError::Parse(e.to_string()))?;
        let root_page = resolve_href(&config.root_page, &base, &base_str)?;

        let manual_prefix = match &config.manual_prefix {
            Some(prefix) => prefix.trim_end_matches('/').to_string(),
            None => root_page.path().trim_end_matches('/').to_string(),
        };

        Ok(Self {
            base,
            base_str,
            article_path: config.article_path.clone(),
            api_url: config.api_url.clone(),
            manual_prefix,
            printable_page: config.printable_page.clone(),
            root_page: canonical(&root_page),
        })
    }

    /// Resolves an href against the wiki base
    pub fn resolve(&self, href: &str) -> Result<Url, UrlError> {
        resolve_href(href, &self.base, &self.base_str)
    }

    /// Canonical URL of the manual's first page
    pub fn root_page(&self) -> &Url {
        &self.root_page
    }

    /// Maps a page URL to the content-API URL that returns its rendered markup
    ///
    /// The human article prefix (`<base>/wiki/`) is replaced by the API prefix,
    /// so `https://host/wiki/Manual/FAQ` becomes `<api-url>Manual/FAQ`. The
    /// title is encoded for the query string; `/` is left readable.
    pub fn api_url(&self, page: &Url) -> String {
        let page = canonical(page);
        let article_prefix = format!("{}{}", self.base_str, self.article_path);

        let page_path = match page.as_str().strip_prefix(&article_prefix) {
            Some(rest) => rest.to_string(),
            None => page
                .path()
                .strip_prefix(&self.article_path)
                .unwrap_or_else(|| page.path().trim_start_matches('/'))
                .to_string(),
        };

        let title = urlencoding::decode(&page_path)
            .map(|title| title.into_owned())
            .unwrap_or_else(|_| page_path.clone());
        let encoded: String = url::form_urlencoded::byte_serialize(title.as_bytes()).collect();

        format!("{}{}", self.api_url, encoded.replace("%2F", "/"))
    }

    /// Returns true if the URL is a page of the manual namespace
    ///
    /// The URL must be on the wiki host, carry no query, and its path must
    /// start with the manual prefix.
    pub fn is_manual_page(&self, url: &Url) -> bool {
        url.host_str() == self.base.host_str()
            && url.port_or_known_default() == self.base.port_or_known_default()
            && url.query().is_none()
            && url.path().starts_with(&self.manual_prefix)
    }

    /// Returns true if the URL is the single-page printable variant
    pub fn is_printable(&self, url: &Url) -> bool {
        PageName::from_url(url)
            .map(|name| name.slug == self.printable_page)
            .unwrap_or(false)
    }

    /// Local name of a page
    ///
    /// With `rename_printable` the printable variant takes the root page's
    /// name, so the combined print document is named after the manual.
    pub fn page_name(&self, url: &Url, rename_printable: bool) -> Result<PageName, UrlError> {
        if rename_printable && self.is_printable(url) {
            return PageName::from_url(&self.root_page);
        }
        PageName::from_url(url)
    }
}

use crate::UrlError;
use url::Url;

/// Resolves an href found in wiki markup to an absolute URL
///
/// # Resolution Steps
///
/// 1. Protocol-relative references (`//host/path`) get the `https:` scheme
/// 2. References already under the wiki base are parsed as they are
/// 3. Everything else is joined against the wiki base, with one leading `/`
///    stripped first so that root-relative and host-relative forms agree
///
/// Absolute URLs on other hosts pass through the join unchanged.
///
/// # Arguments
///
/// * `href` - The raw attribute value
/// * `base` - The parsed wiki base URL
/// * `base_str` - The wiki base as configured, used for the prefix check
///
/// # Examples
///
/// ```
/// use offline_manual::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://en.wikibooks.org").unwrap();
/// let url = resolve_href("/wiki/Manual", &base, "https://en.wikibooks.org").unwrap();
/// assert_eq!(url.as_str(), "https://en.wikibooks.org/wiki/Manual");
/// ```
pub fn resolve_href(href: &str, base: &Url, base_str: &str) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Malformed("empty reference".to_string()));
    }

    if let Some(rest) = href.strip_prefix("//") {
        return Url::parse(&format!("https://{}", rest)).map_err(|e| UrlError::Parse(e.to_string()));
    }

    if href.starts_with(base_str) {
        return Url::parse(href).map_err(|e| UrlError::Parse(e.to_string()));
    }

    let relative = href.strip_prefix('/').unwrap_or(href);
    base.join(relative)
        .map_err(|e| UrlError::Parse(format!("{} ({})", e, href)))
}

/// Returns the crawl dedup key for a URL: the URL without its fragment
pub fn canonical(url: &Url) -> Url {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    canonical
}

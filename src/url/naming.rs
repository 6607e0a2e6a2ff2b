//! Local names for remote pages and assets

use crate::UrlError;
use url::Url;

/// Local identity of a wiki page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageName {
    /// Percent-decoded trailing path segment (e.g. "String_Functions")
    pub slug: String,
    /// Human title shown in the heading and `<title>`
    pub title: String,
    /// File written into the output directory
    pub file_name: String,
}

impl PageName {
    /// Derives the page name from the trailing segment of a page URL
    ///
    /// # Examples
    ///
    /// ```
    /// use offline_manual::url::PageName;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://en.wikibooks.org/wiki/Manual/String_Functions#str").unwrap();
    /// let name = PageName::from_url(&url).unwrap();
    /// assert_eq!(name.file_name, "String_Functions.html");
    /// assert_eq!(name.title, "String Functions");
    /// ```
    pub fn from_url(url: &Url) -> Result<Self, UrlError> {
        let segment = last_segment(url)?;
        Ok(Self::from_slug(&decode(segment)))
    }

    /// Builds a page name from an already decoded slug
    pub fn from_slug(slug: &str) -> Self {
        let stem: String = slug
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect();

        Self {
            slug: slug.to_string(),
            title: slug.replace('_', " "),
            file_name: format!("{}.html", stem),
        }
    }

    /// The href other local pages use to reach this page
    ///
    /// The fragment, when present, is carried over as `<file>#fragment`.
    pub fn href(&self, fragment: Option<&str>) -> String {
        let encoded = urlencoding::encode(&self.file_name);
        match fragment {
            Some(fragment) if !fragment.is_empty() => format!("{}#{}", encoded, fragment),
            _ => encoded.into_owned(),
        }
    }
}

/// Computes a filesystem-safe file name for an image
///
/// The final path segment is percent-decoded and every character outside
/// letters, digits and `._()-` becomes `_`.
///
/// ```
/// use offline_manual::url::asset_file_name;
/// use url::Url;
///
/// let url = Url::parse("https://upload.wikimedia.org/images/a%20b.png").unwrap();
/// assert_eq!(asset_file_name(&url).unwrap(), "a_b.png");
/// ```
pub fn asset_file_name(url: &Url) -> Result<String, UrlError> {
    let name = sanitize_file_name(&decode(last_segment(url)?));

    if name.trim_matches(|c| c == '.' || c == '_').is_empty() {
        return Err(UrlError::NoPathSegment(url.to_string()));
    }

    Ok(name)
}

/// Computes the file name for a math formula image
///
/// Formula URLs end in a content hash without extension; the renderer serves SVG.
pub fn math_file_name(url: &Url) -> Result<String, UrlError> {
    let segment = last_segment(url)?;
    let segment = segment.rsplit('\\').next().unwrap_or(segment);
    let name = sanitize_file_name(&decode(segment));

    if name.is_empty() {
        return Err(UrlError::NoPathSegment(url.to_string()));
    }

    Ok(format!("{}.svg", name))
}

fn last_segment(url: &Url) -> Result<&str, UrlError> {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| UrlError::NoPathSegment(url.to_string()))
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

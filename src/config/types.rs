use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Offline-Manual
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub wiki: WikiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Where the manual lives on the remote wiki
#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    /// Scheme and host of the wiki (e.g. "https://en.wikibooks.org")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Human-facing path prefix for articles
    #[serde(rename = "article-path", default = "default_article_path")]
    pub article_path: String,

    /// Content API prefix; the page path is appended to it
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// First page of the manual
    #[serde(rename = "root-page")]
    pub root_page: String,

    /// Path prefix that bounds the crawl; defaults to the root page's path
    #[serde(rename = "manual-prefix", default)]
    pub manual_prefix: Option<String>,

    /// Slug of the single-page printable variant
    #[serde(rename = "printable-page", default = "default_printable_page")]
    pub printable_page: String,

    /// Stylesheet shared by every generated page
    #[serde(rename = "stylesheet-url")]
    pub stylesheet_url: String,

    /// Site name used in the attribution footer
    #[serde(rename = "site-name", default = "default_site_name")]
    pub site_name: String,
}

/// User agent sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    pub value: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Extra attempts for transient failures (timeouts, connection errors, 5xx)
    #[serde(rename = "max-retries", default = "default_retries")]
    pub max_retries: u32,

    /// Pause before a retry, multiplied by the attempt number
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Pages that must never be fetched
    #[serde(rename = "excluded-pages", default)]
    pub excluded_pages: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root of the linked HTML tree
    #[serde(rename = "html-dir")]
    pub html_dir: String,

    /// Print-oriented HTML consumed by the PDF renderer
    #[serde(rename = "pdf-staging-dir")]
    pub pdf_staging_dir: String,

    /// Final PDF files
    #[serde(rename = "pdf-dir")]
    pub pdf_dir: String,
}

/// PDF export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Printable root pages rendered to PDF
    #[serde(default)]
    pub seeds: Vec<String>,

    /// HTML-to-PDF executable
    #[serde(default = "default_renderer")]
    pub renderer: String,

    /// Convert math SVGs to PNG for the renderer
    #[serde(rename = "rasterize-math", default = "default_rasterize_math")]
    pub rasterize_math: bool,

    /// Renderer flags; an empty value produces a bare `--key` flag
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
            excluded_pages: Vec::new(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            seeds: Vec::new(),
            renderer: default_renderer(),
            rasterize_math: default_rasterize_math(),
            options: BTreeMap::new(),
        }
    }
}

fn default_article_path() -> String {
    "/wiki/".to_string()
}

fn default_printable_page() -> String {
    "Print_version".to_string()
}

fn default_site_name() -> String {
    "WikiBooks".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    1000
}

fn default_renderer() -> String {
    "wkhtmltopdf".to_string()
}

// WebKit-based renderers size SVG images incorrectly on Linux.
fn default_rasterize_math() -> bool {
    cfg!(target_os = "linux")
}

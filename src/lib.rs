//! Offline-Manual: an offline mirror generator for wiki manuals
//!
//! This crate crawls one namespace of a MediaWiki site through its content API,
//! strips the site chrome from every page, downloads images and math formulas,
//! rewrites inter-page links to local files and writes a self-contained HTML tree.
//! A second pass produces print-oriented HTML that is rendered to PDF.

pub mod config;
pub mod crawler;
pub mod export;
pub mod output;
pub mod state;
pub mod transform;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Offline-Manual operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Content API returned no page markup for {url}")]
    EmptyPage { url: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("Failed to rasterize {path}: {message}")]
    Raster { path: PathBuf, message: String },

    #[error("PDF renderer failed for {file}: {message}")]
    Render { file: PathBuf, message: String },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),

    #[error("URL has no usable path segment: {0}")]
    NoPathSegment(String),
}

/// Errors raised while transforming a single element
///
/// These never abort a page. The sanitizer and the asset pass collect them
/// and log them, keeping "attribute absent" apart from real structural problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("<{element}> has no `{attribute}` attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{element}> is malformed: {message}")]
    Malformed { element: String, message: String },
}

/// Result type alias for Offline-Manual operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlPolicy, CrawlSession, Mode};
pub use output::RunSummary;
pub use state::PageState;
pub use url::WikiResolver;

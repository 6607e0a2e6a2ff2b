use crate::config::types::{Config, CrawlerConfig, ExportConfig, OutputConfig, WikiConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_wiki_config(&config.wiki)?;
    validate_user_agent(&config.user_agent.value)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_export_config(&config.export, &config.wiki.base_url)?;
    Ok(())
}

/// Validates the wiki location settings
fn validate_wiki_config(config: &WikiConfig) -> Result<(), ConfigError> {
    let base = parse_http_url("base_url", &config.base_url)?;
    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    if !config.article_path.starts_with('/') || !config.article_path.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "article_path must start and end with '/', got '{}'",
            config.article_path
        )));
    }

    let root = parse_http_url("root_page", &config.root_page)?;
    if root.host_str() != base.host_str() {
        return Err(ConfigError::Validation(format!(
            "root_page '{}' is not on the wiki at '{}'",
            config.root_page, config.base_url
        )));
    }
    if !root.path().starts_with(&config.article_path) {
        return Err(ConfigError::Validation(format!(
            "root_page '{}' is not below article_path '{}'",
            config.root_page, config.article_path
        )));
    }

    if let Some(prefix) = &config.manual_prefix {
        if !prefix.starts_with(&config.article_path) {
            return Err(ConfigError::Validation(format!(
                "manual_prefix '{}' is not below article_path '{}'",
                prefix, config.article_path
            )));
        }
    }

    parse_http_url("api_url", &config.api_url)?;
    parse_http_url("stylesheet_url", &config.stylesheet_url)?;

    if config.printable_page.is_empty() {
        return Err(ConfigError::Validation(
            "printable_page cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the user agent string
fn validate_user_agent(value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }

    // Must be a valid header value
    if value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user-agent value contains control characters: '{}'",
            value.escape_debug()
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be > 0".to_string(),
        ));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    for page in &config.excluded_pages {
        Url::parse(page).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid excluded page '{}': {}", page, e))
        })?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let dirs = [
        ("html_dir", &config.html_dir),
        ("pdf_staging_dir", &config.pdf_staging_dir),
        ("pdf_dir", &config.pdf_dir),
    ];

    for (name, dir) in dirs {
        if dir.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    // Each pass owns its own tree
    for (i, (name_a, dir_a)) in dirs.iter().enumerate() {
        for (name_b, dir_b) in dirs.iter().skip(i + 1) {
            if dir_a == dir_b {
                return Err(ConfigError::Validation(format!(
                    "{} and {} must differ, both are '{}'",
                    name_a, name_b, dir_a
                )));
            }
        }
    }

    Ok(())
}

/// Validates the PDF export settings
fn validate_export_config(config: &ExportConfig, base_url: &str) -> Result<(), ConfigError> {
    let base = parse_http_url("base_url", base_url)?;

    for seed in &config.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.host_str() != base.host_str() {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' is not on the wiki at '{}'",
                seed, base_url
            )));
        }
    }

    if config.renderer.trim().is_empty() {
        return Err(ConfigError::Validation(
            "renderer cannot be empty".to_string(),
        ));
    }

    for key in config.options.keys() {
        if key.is_empty() || key.starts_with('-') || key.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "Renderer option '{}' must be a bare flag name",
                key
            )));
        }
    }

    Ok(())
}

/// Parses a URL that must use http or https
fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(url)
}

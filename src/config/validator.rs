use crate::config::Config;
use crate::error::{Error, Result};

/// Validates the endpoint URL: non-empty, parseable, `http` or `https`.
pub fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::ConfigInvalid("url must not be empty".to_string()));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| Error::ConfigInvalid(format!("invalid url: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::ConfigInvalid(format!(
            "url scheme must be http or https, got {:?}",
            other
        ))),
    }
}

/// Full configuration validation
pub fn validate_config(config: &Config) -> Result<()> {
    validate_url(&config.url)?;

    if !config.post_path.starts_with('/') {
        return Err(Error::ConfigInvalid(format!(
            "post_path must start with '/', got {:?}",
            config.post_path
        )));
    }

    if config.reconnect_delay_ms == 0 {
        return Err(Error::ConfigInvalid(
            "reconnect_delay_ms must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

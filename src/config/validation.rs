use crate::config::types::{Config, CrawlConfig, EngineConfig, LoadConfig};
use crate::url::{parse_absolute, ExcludeSet};
use crate::{ConfigError, ConfigResult};

const MAX_CONCURRENT_LIMIT: usize = 10_000;
const MAX_REDIRECTS_LIMIT: usize = 50;
const MAX_WORKERS: usize = 1024;
const MIN_RATE_INTERVAL_MS: u64 = 100;

/// Validates the settings common to both modes
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_engine_config(&config.engine)?;
    validate_crawl_config(&config.crawl)?;
    validate_load_config(&config.load)?;
    Ok(())
}

/// Validates a configuration about to run in crawl mode
///
/// On top of [`validate`], a seed URL must be present.
pub fn validate_for_crawl(config: &Config) -> ConfigResult<()> {
    validate(config)?;
    if config.crawl.seed.is_none() {
        return Err(ConfigError::MissingSeed(
            "crawl mode needs a seed URL ([crawl] seed or the URL argument)".to_string(),
        ));
    }
    Ok(())
}

/// Validates a configuration about to run in load mode
///
/// On top of [`validate`], a URL file must be configured.
pub fn validate_for_load(config: &Config) -> ConfigResult<()> {
    validate(config)?;
    if config.load.url_file.is_none() {
        return Err(ConfigError::MissingSeed(
            "load mode needs a URL file ([load] url-file or --url-file)".to_string(),
        ));
    }
    Ok(())
}

/// Validates engine configuration
fn validate_engine_config(config: &EngineConfig) -> ConfigResult<()> {
    if config.max_concurrent < 1 || config.max_concurrent > MAX_CONCURRENT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be between 1 and {}, got {}",
            MAX_CONCURRENT_LIMIT, config.max_concurrent
        )));
    }

    if config.max_redirects > MAX_REDIRECTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be <= {}, got {}",
            MAX_REDIRECTS_LIMIT, config.max_redirects
        )));
    }

    if config.stall_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "stall-seconds must be >= 1, got {}",
            config.stall_seconds
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> ConfigResult<()> {
    if let Some(seed) = &config.seed {
        parse_absolute(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }

    ExcludeSet::new(&config.exclude)?;

    Ok(())
}

/// Validates load configuration
fn validate_load_config(config: &LoadConfig) -> ConfigResult<()> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.rate_interval_ms < MIN_RATE_INTERVAL_MS {
        return Err(ConfigError::Validation(format!(
            "rate-interval-ms must be >= {}ms, got {}ms",
            MIN_RATE_INTERVAL_MS, config.rate_interval_ms
        )));
    }

    if config.duration_secs == Some(0) {
        return Err(ConfigError::Validation(
            "duration-secs must be > 0 when set".to_string(),
        ));
    }

    Ok(())
}

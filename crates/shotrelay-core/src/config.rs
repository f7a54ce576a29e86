//! Configuration module
//!
//! Process-wide configuration, constructed once at startup from the
//! environment and passed by reference into the components that need it.

use std::env;

// Common constants
const DEFAULT_PORT: u16 = 3030;
const FETCH_TIMEOUT_SECS: u64 = 45;
const FETCH_MAX_ATTEMPTS: u32 = 3;
const FETCH_BACKOFF_MS: u64 = 300;
const FETCH_MAX_REDIRECTS: usize = 5;
const FETCH_MAX_IDLE_PER_HOST: usize = 10;
const TRIM_THRESHOLD: u8 = 10;
const PAD_PIXELS: u32 = 8;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    // Relay credentials; absence only matters for non-dry-run deliveries
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    // Fetch behavior
    pub fetch_timeout_secs: u64,
    pub fetch_max_attempts: u32,
    pub fetch_backoff_ms: u64,
    pub fetch_max_redirects: usize,
    pub fetch_max_idle_per_host: usize,
    // Auto-mode transform defaults
    pub trim_threshold: u8,
    pub pad_pixels: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty()),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| FETCH_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(FETCH_TIMEOUT_SECS),
            fetch_max_attempts: env::var("FETCH_MAX_ATTEMPTS")
                .unwrap_or_else(|_| FETCH_MAX_ATTEMPTS.to_string())
                .parse()
                .unwrap_or(FETCH_MAX_ATTEMPTS),
            fetch_backoff_ms: env::var("FETCH_BACKOFF_MS")
                .unwrap_or_else(|_| FETCH_BACKOFF_MS.to_string())
                .parse()
                .unwrap_or(FETCH_BACKOFF_MS),
            fetch_max_redirects: env::var("FETCH_MAX_REDIRECTS")
                .unwrap_or_else(|_| FETCH_MAX_REDIRECTS.to_string())
                .parse()
                .unwrap_or(FETCH_MAX_REDIRECTS),
            fetch_max_idle_per_host: env::var("FETCH_MAX_IDLE_PER_HOST")
                .unwrap_or_else(|_| FETCH_MAX_IDLE_PER_HOST.to_string())
                .parse()
                .unwrap_or(FETCH_MAX_IDLE_PER_HOST),
            trim_threshold: env::var("TRIM_THRESHOLD")
                .unwrap_or_else(|_| TRIM_THRESHOLD.to_string())
                .parse()
                .unwrap_or(TRIM_THRESHOLD),
            pad_pixels: env::var("PAD_PIXELS")
                .unwrap_or_else(|_| PAD_PIXELS.to_string())
                .parse()
                .unwrap_or(PAD_PIXELS),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.fetch_max_attempts == 0 {
            return Err(anyhow::anyhow!("FETCH_MAX_ATTEMPTS must be at least 1"));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(anyhow::anyhow!("FETCH_TIMEOUT_SECS must be at least 1"));
        }

        // Partial relay credentials are a configuration mistake, not a
        // "relay disabled" state; fail fast instead of surfacing it per request.
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(_), None) => {
                return Err(anyhow::anyhow!(
                    "TELEGRAM_BOT_TOKEN is set but TELEGRAM_CHAT_ID is missing"
                ));
            }
            (None, Some(_)) => {
                return Err(anyhow::anyhow!(
                    "TELEGRAM_CHAT_ID is set but TELEGRAM_BOT_TOKEN is missing"
                ));
            }
            _ => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 3030,
            environment: "development".to_string(),
            telegram_bot_token: None,
            telegram_chat_id: None,
            fetch_timeout_secs: 45,
            fetch_max_attempts: 3,
            fetch_backoff_ms: 300,
            fetch_max_redirects: 5,
            fetch_max_idle_per_host: 10,
            trim_threshold: 10,
            pad_pixels: 8,
        }
    }

    #[test]
    fn test_validate_accepts_missing_relay() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_partial_relay_credentials() {
        let mut config = base_config();
        config.telegram_bot_token = Some("123:abc".to_string());
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.telegram_chat_id = Some("42".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = base_config();
        config.fetch_max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut config = base_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
        config.environment = "prod".to_string();
        assert!(config.is_production());
    }
}

//! Runtime configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BOARD_LIST_PATH: &str = "/raiboard";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid RAIBOARD_API_BASE_URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for GatewayTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaiboardConfig {
    /// REST root, without a trailing slash.
    pub api_base_url: String,
    /// Bearer token sent with every gateway request, if set.
    pub api_token: Option<String>,
    pub timeouts: GatewayTimeouts,
    /// Where the editor sends the user when a board cannot be opened.
    pub board_list_path: String,
}

impl RaiboardConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `RAIBOARD_API_BASE_URL`: default `http://127.0.0.1:3000/api`
    /// - `RAIBOARD_API_TOKEN`: bearer token
    /// - `RAIBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `RAIBOARD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `RAIBOARD_BOARD_LIST_PATH`: default `/raiboard`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = std::env::var("RAIBOARD_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        let api_token = std::env::var("RAIBOARD_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        let timeouts = GatewayTimeouts {
            request_secs: env_parse("RAIBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("RAIBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let board_list_path =
            std::env::var("RAIBOARD_BOARD_LIST_PATH").unwrap_or_else(|_| DEFAULT_BOARD_LIST_PATH.to_owned());

        Ok(Self { api_base_url: normalize_base_url(&base)?, api_token, timeouts, board_list_path })
    }

    /// Config pointing at `api_base_url` with every other field defaulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn with_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url)?,
            api_token: None,
            timeouts: GatewayTimeouts::default(),
            board_list_path: DEFAULT_BOARD_LIST_PATH.to_owned(),
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

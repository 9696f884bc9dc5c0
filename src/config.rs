//! Membridge configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main membridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Upstream memory API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Identity and preference configuration
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Upstream memory API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the upstream service
    pub base_url: String,

    /// Path prefix convention used by the deployment
    #[serde(default)]
    pub path_style: PathStyle,

    /// Request timeout in seconds (delegated to the HTTP client)
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_string(),
            path_style: PathStyle::default(),
            request_timeout_secs: 30,
        }
    }
}

/// URL prefix convention for upstream endpoint paths
///
/// Both conventions exist in observed deployments with otherwise identical
/// endpoints; which one applies is a property of the deployment, so it is
/// configuration rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathStyle {
    /// Endpoints mounted at the root: `/memories`, `/search`
    #[default]
    Plain,

    /// Endpoints mounted under `/api/v1`: `/api/v1/memories`, `/api/v1/search`
    ApiV1,
}

impl PathStyle {
    /// The literal prefix prepended to every endpoint path
    pub fn prefix(&self) -> &'static str {
        match self {
            PathStyle::Plain => "",
            PathStyle::ApiV1 => "/api/v1",
        }
    }
}

/// Identity and preference configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity used when no preference has been persisted yet
    pub default_user: String,

    /// Identities offered for quick selection alongside recent ones
    pub common_users: Vec<String>,

    /// Preference file location (None = platform config directory)
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default_user: "user".to_string(),
            common_users: vec![
                "user".to_string(),
                "admin".to_string(),
                "test".to_string(),
                "demo".to_string(),
            ],
            preferences_path: None,
        }
    }
}

//! Environment-specific configuration
//!
//! One YAML file per environment under a config directory, selected by an
//! explicit argument or the `TEST_ENV` variable:
//!
//! ```yaml
//! application:
//!   base_url: https://app.qa.example.com
//! browser:
//!   kind: chromium
//!   headless: true
//!   timeout_ms: 30000
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{HarnessError, HarnessResult};

/// Environment selector variable, shared with the test data manager
pub const ENV_VAR: &str = webharness_testdata::manager::ENV_VAR;

/// Top-level configuration for a test session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestConfig {
    /// Environment this configuration was loaded for
    #[serde(default)]
    pub env: String,

    #[serde(default)]
    pub application: AppConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub reporting: ReportingConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub kind: BrowserKind,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Per-action delay for debugging, 0 disables it
    #[serde(default)]
    pub slow_mo_ms: u64,

    /// Default timeout for element interactions and assertions
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub viewport: Viewport,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::default(),
            headless: true,
            slow_mo_ms: 0,
            timeout_ms: default_timeout_ms(),
            viewport: Viewport::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: String,

    #[serde(default = "default_snapshots_dir")]
    pub snapshots_dir: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            screenshots_dir: default_screenshots_dir(),
            snapshots_dir: default_snapshots_dir(),
        }
    }
}

fn default_screenshots_dir() -> String {
    "reports/screenshots".to_string()
}

fn default_snapshots_dir() -> String {
    "reports/snapshots".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_api_timeout(),
            headers: HashMap::new(),
        }
    }
}

fn default_api_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: String,
}

impl TestConfig {
    /// Load `<config_dir>/<env>.yaml`
    pub fn load(config_dir: &Path, env: &str) -> HarnessResult<Self> {
        let env = env.to_lowercase();
        let path = config_dir.join(format!("{}.yaml", env));
        if !path.exists() {
            return Err(HarnessError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let raw = std::fs::read_to_string(&path)?;
        let mut config: TestConfig = serde_yaml::from_str(&raw)?;
        config.env = env;

        info!(env = %config.env, path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load with the environment taken from `TEST_ENV` (falling back to `dev`)
    pub fn from_env(config_dir: &Path) -> HarnessResult<Self> {
        let env = std::env::var(ENV_VAR)
            .unwrap_or_else(|_| webharness_testdata::manager::DEFAULT_ENV.to_string());
        Self::load(config_dir, &env)
    }
}

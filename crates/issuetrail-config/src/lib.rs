use issuetrail_core::{Error, ReportShape};
use issuetrail_text::DEFAULT_KEYWORDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for issuetrail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub text: TextConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Issue resource base; `{host}/{key}` and `{host}/{key}/comment` are requested
    #[serde(default = "default_tracker_host")]
    pub host: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Unset means requests wait as long as the server takes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_anchor_selector")]
    pub anchor_selector: String,

    #[serde(default = "default_anchor_timeout_ms")]
    pub anchor_timeout_ms: u64,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Chrome binary; found on the PATH when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub shape: ReportShape,

    /// Header of the input column; each shape has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_column: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    #[serde(default = "default_true")]
    pub drop_empty_lines: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Plain-text log file; an empty path disables it
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            host: default_tracker_host(),
            user_agent: default_user_agent(),
            request_timeout_secs: None,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            anchor_selector: default_anchor_selector(),
            anchor_timeout_ms: default_anchor_timeout_ms(),
            headless: true,
            executable: None,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            shape: ReportShape::default(),
            input_column: None,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            drop_empty_lines: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_tracker_host() -> String {
    "https://issues.apache.org/jira/rest/api/2/issue".to_string()
}

fn default_user_agent() -> String {
    format!("issuetrail/{}", env!("CARGO_PKG_VERSION"))
}

fn default_anchor_selector() -> String {
    "a.issue-link".to_string()
}

fn default_anchor_timeout_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("logfile.log"))
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl PipelineConfig {
    /// Configured input column, or the shape's default
    pub fn input_column(&self) -> &str {
        self.input_column
            .as_deref()
            .unwrap_or_else(|| self.shape.default_input_column())
    }
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "issuetrail", "issuetrail") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.issuetrail/config.toml")
        }
    }

    pub fn validate(&self) -> issuetrail_core::Result<()> {
        if self.tracker.host.trim().is_empty() {
            return Err(Error::InvalidConfig("tracker.host must not be empty".into()));
        }
        if self.browser.anchor_selector.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "browser.anchor_selector must not be empty".into(),
            ));
        }
        if self.pipeline.concurrency == 0 {
            return Err(Error::InvalidConfig(
                "pipeline.concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

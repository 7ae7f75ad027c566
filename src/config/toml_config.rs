use crate::config::courts::CourtDirectory;
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{
    validate_court_code, validate_non_empty_string, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

pub const COURT_BASE_URL: &str = "https://www.courtauction.go.kr";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub upstream: UpstreamConfig,
    pub retry: RetryConfig,
    pub logging: LoggingConfig,
    /// 法院名稱 → 代碼，新增或覆蓋內建清單
    pub courts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub session_warmup: bool,
    pub headers: Option<HashMap<String, String>>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: COURT_BASE_URL.to_string(),
            timeout_seconds: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_warmup: true,
            headers: None,
        }
    }
}

/// 呼叫端的重試策略；查詢核心本身從不重試
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 0,
            delay_seconds: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LookupConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LookupError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LookupError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COURT_BASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LookupError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("upstream.base_url", &self.upstream.base_url)?;
        validate_range("upstream.timeout_seconds", self.upstream.timeout_seconds, 1, 120)?;
        validate_non_empty_string("upstream.user_agent", &self.upstream.user_agent)?;
        validate_range("retry.attempts", self.retry.attempts, 0, 10)?;
        validate_range("retry.delay_seconds", self.retry.delay_seconds, 0, 60)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(LookupError::InvalidConfigValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        for (name, code) in &self.courts {
            validate_non_empty_string("courts", name)?;
            validate_court_code(&format!("courts.{}", name), code.trim())?;
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry.delay_seconds)
    }

    pub fn court_directory(&self) -> CourtDirectory {
        CourtDirectory::builtin().with_overrides(&self.courts)
    }
}

impl Validate for LookupConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use crate::core::engine::DEFAULT_FETCH_TIMEOUT;
use crate::core::export::OutputFormat;
use crate::utils::error::{PlannerError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_positive_number,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Where consultant and allocation records come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// A dataset JSON file on disk.
    Json { path: String },
    /// A PostgREST endpoint such as `https://<project>.supabase.co/rest/v1`.
    Rest {
        endpoint: String,
        #[serde(default)]
        api_key: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            path: "planner-data.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Owner used when none is given on the command line.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            owner: None,
            fetch_timeout_seconds: default_fetch_timeout_seconds(),
        }
    }
}

fn default_fetch_timeout_seconds() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_formats: default_output_formats(),
        }
    }
}

fn default_output_path() -> String {
    "./reports".to_string()
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub json_logs: bool,
}

impl PlannerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PlannerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PlannerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        match &self.store {
            StoreConfig::Json { path } => validate_path("store.path", path)?,
            StoreConfig::Rest { endpoint, api_key } => {
                validate_url("store.endpoint", endpoint)?;
                if let Some(key) = api_key {
                    if key.starts_with("${") {
                        return Err(PlannerError::MissingConfigError {
                            field: format!("store.api_key (environment variable {} is not set)", key),
                        });
                    }
                }
            }
        }

        validate_positive_number(
            "forecast.fetch_timeout_seconds",
            self.forecast.fetch_timeout_seconds,
            1,
        )?;
        if let Some(owner) = &self.forecast.owner {
            validate_non_empty_string("forecast.owner", owner)?;
        }

        validate_path("output.output_path", &self.output.output_path)?;
        self.output_formats()?;

        if let Some(level) = &self.monitoring.log_level {
            validate_one_of("monitoring.log_level", level, &LOG_LEVELS)?;
        }

        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.forecast.fetch_timeout_seconds)
    }

    pub fn output_path(&self) -> &str {
        &self.output.output_path
    }

    pub fn output_formats(&self) -> Result<Vec<OutputFormat>> {
        self.output
            .output_formats
            .iter()
            .map(|f| OutputFormat::parse("output.output_formats", f))
            .collect()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.log_level.as_deref()
    }
}

impl Validate for PlannerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

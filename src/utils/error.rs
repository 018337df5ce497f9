use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Store request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid {entity} record ({field}): {reason}")]
    InvalidRecordError {
        entity: &'static str,
        field: String,
        reason: String,
    },

    #[error("Record store error: {message}")]
    StoreError { message: String },

    #[error("Query timeout: {operation} exceeded {seconds}s")]
    TimeoutError { operation: String, seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Store,
    Io,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PlannerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PlannerError::ConfigError { .. }
            | PlannerError::ConfigValidationError { .. }
            | PlannerError::InvalidConfigValueError { .. }
            | PlannerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PlannerError::InvalidRecordError { .. } => ErrorCategory::Validation,
            PlannerError::HttpError(_)
            | PlannerError::StoreError { .. }
            | PlannerError::TimeoutError { .. } => ErrorCategory::Store,
            PlannerError::IoError(_) => ErrorCategory::Io,
            PlannerError::CsvError(_) | PlannerError::SerializationError(_) => {
                ErrorCategory::Data
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 逾時或暫時性的連線錯誤，重試即可
            ErrorCategory::Store => ErrorSeverity::Medium,
            ErrorCategory::Validation | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PlannerError::TimeoutError { .. } => {
                "The record store is slow to respond; retry or raise forecast.fetch_timeout_seconds"
            }
            PlannerError::HttpError(_) | PlannerError::StoreError { .. } => {
                "Check store.endpoint and store.api_key, and that the store is reachable"
            }
            PlannerError::InvalidRecordError { .. } => {
                "Fix the offending record in the dataset and run again"
            }
            PlannerError::IoError(_) => "Check that the file exists and the path is writable",
            PlannerError::CsvError(_) | PlannerError::SerializationError(_) => {
                "Check that the dataset is valid JSON matching the expected record layout"
            }
            _ => "Review the configuration file against the documented [store]/[forecast]/[output] sections",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Validation => format!("Invalid data: {}", self),
            ErrorCategory::Store => format!("Could not load planning data: {}", self),
            ErrorCategory::Io => format!("File access failed: {}", self),
            ErrorCategory::Data => format!("Could not read or write data: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Ephemeris error for {body}: {message}")]
    EphemerisError { body: String, message: String },

    #[error("Quote lookup failed for {symbol}: {message}")]
    QuoteError { symbol: String, message: String },

    #[error("Server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Computation,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashError {
    pub fn invalid_value(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        DashError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::HttpError(_) | DashError::QuoteError { .. } | DashError::ServerError { .. } => {
                ErrorCategory::Network
            }
            DashError::ConfigError { .. }
            | DashError::InvalidConfigValueError { .. }
            | DashError::TomlError(_) => ErrorCategory::Configuration,
            DashError::EphemerisError { .. } => ErrorCategory::Computation,
            DashError::ZipError(_) | DashError::IoError(_) => ErrorCategory::Storage,
            DashError::CsvError(_) | DashError::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 報價與星曆錯誤在掃描內就會被降級處理
            DashError::QuoteError { .. } | DashError::EphemerisError { .. } => ErrorSeverity::Low,
            DashError::HttpError(_) => ErrorSeverity::Medium,
            DashError::ConfigError { .. }
            | DashError::InvalidConfigValueError { .. }
            | DashError::TomlError(_)
            | DashError::CsvError(_)
            | DashError::SerializationError(_) => ErrorSeverity::High,
            DashError::ZipError(_) | DashError::IoError(_) | DashError::ServerError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity and the [market] quote_base_url setting, then retry"
            }
            ErrorCategory::Configuration => {
                "Review astro-dash.toml and the command line flags against the documented ranges"
            }
            ErrorCategory::Computation => {
                "Verify the observer coordinates; planetary readings fall back to neutral values"
            }
            ErrorCategory::Storage => "Make sure the output directory exists and is writable",
            ErrorCategory::Data => "Re-run the scan; the snapshot could not be encoded",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            DashError::ConfigError { message } => format!("Configuration problem: {}", message),
            DashError::TomlError(e) => format!("The configuration file is not valid TOML: {}", e),
            DashError::HttpError(_) | DashError::QuoteError { .. } => {
                "Market data could not be fetched".to_string()
            }
            DashError::ServerError { message } => {
                format!("The dashboard server stopped: {}", message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;

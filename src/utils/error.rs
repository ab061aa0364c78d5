use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreboardError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatusError { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Could not parse {what}: {message}")]
    ParseError { what: String, message: String },

    #[error("Display error: {message}")]
    DisplayError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoreboardError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::ApiStatusError { .. } => ErrorCategory::Network,
            Self::ConfigNotFound { .. }
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) | Self::ParseError { .. } => ErrorCategory::Data,
            Self::IoError(_) | Self::DisplayError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // A single bad event or feed does not stop the board.
            Self::ParseError { .. } => ErrorSeverity::Low,
            Self::ApiError(_) | Self::ApiStatusError { .. } | Self::SerializationError(_) => {
                ErrorSeverity::Medium
            }
            Self::ConfigNotFound { .. }
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::DisplayError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError(e) => e.is_timeout() || e.is_connect(),
            Self::ApiStatusError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) => {
                "Check the network connection; the scoreboard will retry on the next refresh"
                    .to_string()
            }
            Self::ApiStatusError { status, .. } if *status == 401 => {
                "Check the API key in the configuration or environment".to_string()
            }
            Self::ApiStatusError { status, .. } if *status == 404 => {
                "Check the sport and league ids in the configuration".to_string()
            }
            Self::ApiStatusError { .. } => {
                "The remote service is unavailable, try again later".to_string()
            }
            Self::ConfigNotFound { .. } => {
                "Run `nexus-setup init` to create a configuration file".to_string()
            }
            Self::ConfigError { .. } | Self::SerializationError(_) => {
                "Fix the configuration file or re-create it with `nexus-setup init`".to_string()
            }
            Self::MissingConfigError { field } => format!("Add `{}` to the configuration", field),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of `{}` in the configuration", field)
            }
            Self::ParseError { .. } => {
                "The data source returned an unexpected payload; it will be skipped".to_string()
            }
            Self::IoError(_) => "Check file permissions and free disk space".to_string(),
            Self::DisplayError { .. } => "Check the display connection".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the data service: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Data => format!("Received data could not be read: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code for a binary that stops on this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoreboardError>;

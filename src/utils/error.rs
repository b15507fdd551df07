use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Message too long: {len} characters (max {max})")]
    MessageTooLong { len: usize, max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BookingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BookingError::ApiError(_) => ErrorCategory::Network,
            BookingError::IoError(_) | BookingError::SerializationError(_) => {
                ErrorCategory::System
            }
            BookingError::UrlError(_)
            | BookingError::ConfigError { .. }
            | BookingError::MissingConfigError { .. }
            | BookingError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BookingError::ValidationError { .. } | BookingError::MessageTooLong { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            BookingError::ApiError(_) => "Unable to prepare the mail delivery client".to_string(),
            BookingError::IoError(e) => format!("File access failed: {}", e),
            BookingError::SerializationError(_) => "Booking data could not be encoded".to_string(),
            BookingError::UrlError(e) => format!("A configured address is not a valid URL: {}", e),
            BookingError::ConfigError { message } => format!("Configuration problem: {}", message),
            BookingError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            BookingError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            BookingError::ValidationError { message } => message.clone(),
            BookingError::MessageTooLong { max, .. } => {
                format!("The message may not exceed {} characters", max)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration file and the BOOKING_API_URL environment variable"
            }
            ErrorCategory::Network => "Check TLS support and network access, then retry",
            ErrorCategory::Input => "Correct the form fields and submit again",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_category() {
        let too_long = BookingError::MessageTooLong { len: 501, max: 500 };
        assert_eq!(too_long.category(), ErrorCategory::Input);
        assert_eq!(too_long.severity(), ErrorSeverity::Low);

        let missing = BookingError::MissingConfigError {
            field: "handoff.destination".to_string(),
        };
        assert_eq!(missing.severity(), ErrorSeverity::High);
        assert!(missing.user_friendly_message().contains("handoff.destination"));
    }
}

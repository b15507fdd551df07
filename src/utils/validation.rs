use crate::utils::error::{BookingError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(BookingError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 端點可以是完整 URL，或相對於頁面來源的路徑
pub fn validate_endpoint(field_name: &str, value: &str) -> Result<()> {
    if value.starts_with('/') && !value.starts_with("//") {
        return Ok(());
    }
    validate_url(field_name, value)
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(BookingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BookingError::ValidationError {
            message: format!("{} cannot be empty or whitespace-only", field_name),
        });
    }
    Ok(())
}

/// 以字元（code point）計算長度，而非位元組
pub fn validate_max_chars(value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(BookingError::MessageTooLong { len, max });
    }
    Ok(())
}

/// 只檢查基本形狀：local@domain，且不含空白
pub fn validate_email_shape(field_name: &str, value: &str) -> Result<()> {
    let invalid = || BookingError::ValidationError {
        message: format!("{} is not a valid email address", field_name),
    };

    if value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint.url", "https://example.com").is_ok());
        assert!(validate_url("endpoint.url", "http://localhost:3001/api").is_ok());
        assert!(validate_url("endpoint.url", "").is_err());
        assert!(validate_url("endpoint.url", "invalid-url").is_err());
        assert!(validate_url("endpoint.url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_endpoint_accepts_relative_path() {
        assert!(validate_endpoint("endpoint.remote_default", "/api/send-email").is_ok());
        assert!(validate_endpoint("endpoint.remote_default", "//evil.example").is_err());
        assert!(validate_endpoint("endpoint.remote_default", "api/send-email").is_err());
    }

    #[test]
    fn test_validate_max_chars_counts_code_points() {
        let accented = "é".repeat(500);
        assert!(accented.len() > 500);
        assert!(validate_max_chars(&accented, 500).is_ok());

        let err = validate_max_chars(&"a".repeat(501), 500).unwrap_err();
        assert!(matches!(err, BookingError::MessageTooLong { len: 501, max: 500 }));
    }

    #[test]
    fn test_validate_email_shape() {
        assert!(validate_email_shape("email", "jean@x.com").is_ok());
        assert!(validate_email_shape("email", "jean").is_err());
        assert!(validate_email_shape("email", "@x.com").is_err());
        assert!(validate_email_shape("email", "jean@").is_err());
        assert!(validate_email_shape("email", "je an@x.com").is_err());
        assert!(validate_email_shape("email", "a@b@c").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("name", "Jean").is_ok());
        assert!(validate_non_empty_string("name", "   ").is_err());
    }
}

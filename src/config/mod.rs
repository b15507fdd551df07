#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::catalog::Catalog;
use crate::core::controller::{ControllerSettings, Timing};
use crate::core::handoff::ChannelHandoff;
use crate::utils::error::{BookingError, Result};
use crate::utils::validation::{
    validate_endpoint, validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::{Host, Url};

/// 覆寫寄信端點的環境變數
pub const ENDPOINT_ENV_VAR: &str = "BOOKING_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub handoff: HandoffConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    /// Translation overrides merged over the built-in French catalog.
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub local_default: String,
    pub remote_default: String,
    /// Unset keeps the request unbounded.
    pub request_timeout_seconds: Option<u64>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: None,
            local_default: "http://localhost:3001/api/send-email".to_string(),
            remote_default: "/api/send-email".to_string(),
            request_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    pub base_url: String,
    pub destination: String,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wa.me".to_string(),
            destination: "212762728706".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub validation_return_ms: u64,
    pub handoff_delay_ms: u64,
    pub success_return_ms: u64,
    pub error_return_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            validation_return_ms: 3000,
            handoff_delay_ms: 2000,
            success_return_ms: 5000,
            error_return_ms: 5000,
        }
    }
}

/// 解析後的端點，以及頁面是否在本機開發環境
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: Url,
    pub local_dev: bool,
}

impl FormConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BookingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BookingError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_HOST})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BookingError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// `BOOKING_API_URL` takes precedence over the file's `endpoint.url`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_endpoint_override(std::env::var(ENDPOINT_ENV_VAR).ok());
    }

    pub fn apply_endpoint_override(&mut self, value: Option<String>) {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Endpoint overridden: {}", value);
            self.endpoint.url = Some(value);
        }
    }

    /// 決定寄信端點：覆寫值 → 本機預設 → 相對於頁面來源的部署路徑
    pub fn resolve_endpoint(&self, page_url: &Url) -> Result<ResolvedEndpoint> {
        let local_dev = is_loopback_host(page_url);

        let target = match self.endpoint.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ if local_dev => self.endpoint.local_default.as_str(),
            _ => self.endpoint.remote_default.as_str(),
        };

        Ok(ResolvedEndpoint {
            url: page_url.join(target)?,
            local_dev,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.endpoint.request_timeout_seconds.map(Duration::from_secs)
    }

    pub fn timing(&self) -> Timing {
        Timing {
            validation_return: Duration::from_millis(self.timing.validation_return_ms),
            handoff_delay: Duration::from_millis(self.timing.handoff_delay_ms),
            success_return: Duration::from_millis(self.timing.success_return_ms),
            error_return: Duration::from_millis(self.timing.error_return_ms),
        }
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::french().with_overrides(self.messages.clone())
    }

    pub fn controller_settings(&self, endpoint: &ResolvedEndpoint) -> Result<ControllerSettings> {
        Ok(ControllerSettings {
            handoff: ChannelHandoff::new(&self.handoff.base_url, &self.handoff.destination)?,
            timing: self.timing(),
            local_dev: endpoint.local_dev,
        })
    }
}

pub fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => addr.is_loopback(),
        Some(Host::Ipv6(addr)) => addr.is_loopback(),
        None => false,
    }
}

impl Validate for FormConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.endpoint.url {
            validate_endpoint("endpoint.url", url)?;
        }
        validate_url("endpoint.local_default", &self.endpoint.local_default)?;
        validate_endpoint("endpoint.remote_default", &self.endpoint.remote_default)?;
        if let Some(timeout) = self.endpoint.request_timeout_seconds {
            validate_positive_number("endpoint.request_timeout_seconds", timeout, 1)?;
        }

        validate_url("handoff.base_url", &self.handoff.base_url)?;
        validate_non_empty_string("handoff.destination", &self.handoff.destination).map_err(
            |_| BookingError::MissingConfigError {
                field: "handoff.destination".to_string(),
            },
        )?;

        validate_positive_number("timing.validation_return_ms", self.timing.validation_return_ms, 1)?;
        validate_positive_number("timing.handoff_delay_ms", self.timing.handoff_delay_ms, 1)?;
        validate_positive_number("timing.success_return_ms", self.timing.success_return_ms, 1)?;
        validate_positive_number("timing.error_return_ms", self.timing.error_return_ms, 1)?;

        // 交接必須在成功畫面收起之前觸發
        if self.timing.handoff_delay_ms >= self.timing.success_return_ms {
            return Err(BookingError::InvalidConfigValueError {
                field: "timing.handoff_delay_ms".to_string(),
                value: self.timing.handoff_delay_ms.to_string(),
                reason: format!(
                    "must be below timing.success_return_ms ({})",
                    self.timing.success_return_ms
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn test_defaults_validate() {
        let config = FormConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing(), Timing::default());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_loopback_page_uses_local_default() {
        let config = FormConfig::default();
        for url in [
            "http://localhost:5173/#contact",
            "http://127.0.0.1:5173/",
            "http://[::1]:5173/",
        ] {
            let resolved = config.resolve_endpoint(&page(url)).unwrap();
            assert!(resolved.local_dev, "{} should be local", url);
            assert_eq!(resolved.url.as_str(), "http://localhost:3001/api/send-email");
        }
    }

    #[test]
    fn test_deployed_page_uses_relative_path() {
        let config = FormConfig::default();
        let resolved = config
            .resolve_endpoint(&page("https://emtaxi.fr/tarifs#contact"))
            .unwrap();

        assert!(!resolved.local_dev);
        assert_eq!(resolved.url.as_str(), "https://emtaxi.fr/api/send-email");
    }

    #[test]
    fn test_override_wins_over_defaults() {
        let mut config = FormConfig::default();
        config.apply_endpoint_override(Some("https://mail.example.com/send".to_string()));

        let resolved = config.resolve_endpoint(&page("http://localhost:5173/")).unwrap();
        assert_eq!(resolved.url.as_str(), "https://mail.example.com/send");
        assert!(resolved.local_dev);
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = FormConfig::default();
        config.apply_endpoint_override(Some("   ".to_string()));
        assert!(config.endpoint.url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FormConfig::from_toml_str(
            r#"
[endpoint]
request_timeout_seconds = 15

[timing]
handoff_delay_ms = 500

[messages]
"contact.form.success" = "Merci !"
"#,
        )
        .unwrap();

        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.timing().handoff_delay, Duration::from_millis(500));
        assert_eq!(config.timing().error_return, Duration::from_secs(5));
        assert_eq!(config.handoff.destination, "212762728706");

        use crate::domain::ports::Translator;
        assert_eq!(config.catalog().t("contact.form.success"), "Merci !");
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[handoff]\ndestination = \"33600000000\"\n\n[endpoint]\nremote_default = \"/mail\""
        )
        .unwrap();

        let config = FormConfig::from_file(file.path()).unwrap();
        assert_eq!(config.handoff.destination, "33600000000");
        assert_eq!(config.handoff.base_url, "https://wa.me");

        let resolved = config.resolve_endpoint(&page("https://emtaxi.fr/")).unwrap();
        assert_eq!(resolved.url.as_str(), "https://emtaxi.fr/mail");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FormConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, BookingError::IoError(_)));
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("EM_BOOKING_TEST_MAIL_HOST", "mail.internal");
        let config = FormConfig::from_toml_str(
            r#"
[endpoint]
url = "https://${EM_BOOKING_TEST_MAIL_HOST}/send"
"#,
        )
        .unwrap();

        assert_eq!(
            config.endpoint.url.as_deref(),
            Some("https://mail.internal/send")
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = FormConfig::default();
        config.handoff.destination = " ".to_string();
        assert!(matches!(
            config.validate(),
            Err(BookingError::MissingConfigError { .. })
        ));

        let mut config = FormConfig::default();
        config.timing.error_return_ms = 0;
        assert!(config.validate().is_err());

        let mut config = FormConfig::default();
        config.endpoint.url = Some("ftp://mail".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_handoff_must_fire_before_success_return() {
        let config = FormConfig::from_toml_str(
            "[timing]\nhandoff_delay_ms = 6000\nsuccess_return_ms = 5000",
        )
        .unwrap();
        match config.validate() {
            Err(BookingError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "timing.handoff_delay_ms")
            }
            other => panic!("expected handoff ordering error, got {:?}", other),
        }

        let equal = FormConfig::from_toml_str(
            "[timing]\nhandoff_delay_ms = 5000\nsuccess_return_ms = 5000",
        )
        .unwrap();
        assert!(equal.validate().is_err());

        let ordered = FormConfig::from_toml_str(
            "[timing]\nhandoff_delay_ms = 4999\nsuccess_return_ms = 5000",
        )
        .unwrap();
        assert!(ordered.validate().is_ok());
    }

    #[test]
    fn test_controller_settings_carry_environment() {
        let config = FormConfig::default();
        let endpoint = config.resolve_endpoint(&page("http://localhost:5173/")).unwrap();
        let settings = config.controller_settings(&endpoint).unwrap();

        assert!(settings.local_dev);
        assert_eq!(settings.handoff.base().as_str(), "https://wa.me/212762728706");
    }
}

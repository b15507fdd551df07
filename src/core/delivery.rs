use crate::domain::model::{BookingDraft, DeliveryResponse, NetworkCause, SubmissionOutcome};
use crate::domain::ports::Mailer;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// 透過 HTTP POST 把草稿交給寄信端點
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
}

impl HttpMailer {
    /// `timeout = None` keeps the request unbounded: a hanging endpoint holds the form in `Submitting`.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn transport_cause(error: &reqwest::Error) -> NetworkCause {
    if error.is_timeout() {
        NetworkCause::TimedOut
    } else {
        NetworkCause::Offline
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn deliver(&self, draft: &BookingDraft) -> SubmissionOutcome {
        tracing::debug!(
            "Posting booking request to {} (service: {}, message: {} chars)",
            self.endpoint,
            draft.service_type,
            draft.message_len()
        );

        // 判斷順序：傳輸失敗 → HTTP 狀態 → 本文解析 → success 旗標
        let response = match self.client.post(self.endpoint.clone()).json(draft).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Mail endpoint unreachable: {}", e);
                return SubmissionOutcome::Unreachable(transport_cause(&e));
            }
        };

        let status = response.status();
        tracing::debug!("Mail endpoint response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Mail endpoint returned HTTP {}: {}", status, body);
            return SubmissionOutcome::Unreachable(NetworkCause::HttpStatus(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read mail endpoint response: {}", e);
                return SubmissionOutcome::Unreachable(if e.is_timeout() {
                    NetworkCause::TimedOut
                } else {
                    NetworkCause::MalformedResponse
                });
            }
        };

        match serde_json::from_str::<DeliveryResponse>(&body) {
            Ok(DeliveryResponse { success: true, .. }) => SubmissionOutcome::Delivered,
            Ok(DeliveryResponse { message, .. }) => SubmissionOutcome::Rejected { reason: message },
            Err(e) => {
                tracing::warn!("Mail endpoint sent an unparseable body ({}): {}", e, body);
                SubmissionOutcome::Unreachable(NetworkCause::MalformedResponse)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn draft() -> BookingDraft {
        BookingDraft {
            name: "Jean".to_string(),
            email: "jean@x.com".to_string(),
            phone: String::new(),
            service_type: "Standard".to_string(),
            message: "Bonjour".to_string(),
        }
    }

    fn mailer(server: &MockServer, timeout: Option<Duration>) -> HttpMailer {
        let endpoint = Url::parse(&server.url("/api/send-email")).unwrap();
        HttpMailer::new(endpoint, timeout).unwrap()
    }

    #[tokio::test]
    async fn test_deliver_posts_json_draft() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/send-email")
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "name": "Jean",
                    "email": "jean@x.com",
                    "phone": "",
                    "serviceType": "Standard",
                    "message": "Bonjour"
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"success": true}));
        });

        let outcome = mailer(&server, None).deliver(&draft()).await;

        api_mock.assert();
        assert_eq!(outcome, SubmissionOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_deliver_reports_server_rejection() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/send-email");
            then.status(200)
                .json_body(serde_json::json!({"success": false, "message": "quota"}));
        });

        let outcome = mailer(&server, None).deliver(&draft()).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected {
                reason: Some("quota".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_status_check_precedes_body_parsing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/send-email");
            then.status(500).body("<html>Internal Server Error</html>");
        });

        let outcome = mailer(&server, None).deliver(&draft()).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Unreachable(NetworkCause::HttpStatus(500))
        );
    }

    #[tokio::test]
    async fn test_error_status_with_json_body_is_still_unreachable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/send-email");
            then.status(502)
                .json_body(serde_json::json!({"success": false, "message": "upstream"}));
        });

        let outcome = mailer(&server, None).deliver(&draft()).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Unreachable(NetworkCause::HttpStatus(502))
        );
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/send-email");
            then.status(200).body("OK");
        });

        let outcome = mailer(&server, None).deliver(&draft()).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Unreachable(NetworkCause::MalformedResponse)
        );
    }

    #[tokio::test]
    async fn test_json_without_success_flag_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/send-email");
            then.status(200).json_body(serde_json::json!({"sent": true}));
        });

        let outcome = mailer(&server, None).deliver(&draft()).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Unreachable(NetworkCause::MalformedResponse)
        );
    }

    #[tokio::test]
    async fn test_connection_refused_is_offline() {
        // bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoint = Url::parse(&format!("http://127.0.0.1:{}/api/send-email", port)).unwrap();

        let outcome = HttpMailer::new(endpoint, None)
            .unwrap()
            .deliver(&draft())
            .await;

        assert_eq!(outcome, SubmissionOutcome::Unreachable(NetworkCause::Offline));
    }

    #[tokio::test]
    async fn test_configured_timeout_bounds_a_hanging_endpoint() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/send-email");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(serde_json::json!({"success": true}));
        });

        let outcome = mailer(&server, Some(Duration::from_millis(100)))
            .deliver(&draft())
            .await;

        assert_eq!(outcome, SubmissionOutcome::Unreachable(NetworkCause::TimedOut));
    }
}

use crate::domain::model::BookingDraft;
use crate::domain::ports::BrowserHost;
use crate::utils::error::{BookingError, Result};
use url::Url;

const MESSAGE_HEADER: &str = "Nouvelle demande de réservation - EM Taxi Touristique";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffResult {
    Opened,
    /// 瀏覽器沒有給視窗，或視窗一開就被關閉
    Blocked,
}

/// Second channel after a confirmed delivery: a messaging link prefilled with the booking.
#[derive(Debug, Clone)]
pub struct ChannelHandoff {
    base: Url,
}

impl ChannelHandoff {
    pub fn new(base_url: &str, destination: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        base.path_segments_mut()
            .map_err(|_| BookingError::InvalidConfigValueError {
                field: "handoff.base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .push(destination);
        base.set_query(None);

        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn build_deep_link(&self, draft: &BookingDraft) -> Url {
        let text = render_message(draft);
        let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();

        let mut link = self.base.clone();
        // byte_serialize escapes a literal '+' as %2B, so any '+' left is a space
        link.set_query(Some(&format!("text={}", encoded.replace('+', "%20"))));
        link
    }

    /// 嘗試開啟一次，不重試
    pub fn open<H: BrowserHost + ?Sized>(host: &H, link: &Url) -> HandoffResult {
        match host.open_window(link) {
            Some(window) if !window.is_closed() => {
                tracing::info!("💬 Messaging handoff opened");
                HandoffResult::Opened
            }
            _ => {
                tracing::warn!("Messaging handoff blocked by the browser");
                HandoffResult::Blocked
            }
        }
    }
}

/// Fixed template: name, email, phone when present, service, message.
pub fn render_message(draft: &BookingDraft) -> String {
    let mut lines = vec![
        MESSAGE_HEADER.to_string(),
        String::new(),
        format!("Nom : {}", draft.name),
        format!("Email : {}", draft.email),
    ];
    if !draft.phone.trim().is_empty() {
        lines.push(format!("Téléphone : {}", draft.phone));
    }
    lines.push(format!("Service : {}", draft.service_type));
    lines.push(format!("Message : {}", draft.message));

    lines.join("\n")
}

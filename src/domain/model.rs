use serde::{Deserialize, Serialize};
use std::fmt;

/// 訊息欄位上限（以字元計）
pub const MESSAGE_MAX_CHARS: usize = 500;

/// 進行中的預約草稿。序列化後即為寄信端點的 JSON 請求本文。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service_type: String,
    pub message: String,
}

impl BookingDraft {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::ServiceType => &self.service_type,
            FormField::Message => &self.message,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::ServiceType => &mut self.service_type,
            FormField::Message => &mut self.message,
        }
    }

    /// Live counter value for the "n/500" display.
    pub fn message_len(&self) -> usize {
        self.message.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Phone,
    ServiceType,
    Message,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::ServiceType,
        FormField::Message,
    ];

    /// 與 JSON 鍵名相同
    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::ServiceType => "serviceType",
            FormField::Message => "message",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, FormField::Phone)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionStatus {
    /// A displayed result that the next edit dismisses.
    pub fn is_settled(self) -> bool {
        matches!(self, SubmissionStatus::Success | SubmissionStatus::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCause {
    /// 連線失敗、DNS 失敗或離線
    Offline,
    /// Only produced when a request timeout is configured.
    TimedOut,
    HttpStatus(u16),
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Delivered,
    Rejected { reason: Option<String> },
    Unreachable(NetworkCause),
}

/// 寄信端點回傳的 JSON 本文
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Known service labels, in the order the booking form lists them.
pub struct ServiceType;

impl ServiceType {
    pub const KNOWN: [&'static str; 8] = [
        "Standard",
        "Affaires",
        "Premium",
        "Transfert Aéroport",
        "Professionnel & Entreprise",
        "Événements & Occasions Spéciales",
        "Service à la Demande",
        "Autre",
    ];

    pub fn is_known(label: &str) -> bool {
        Self::KNOWN.contains(&label)
    }

    /// 價目面板連到表單時使用的片段，例如 `#contact?service=Premium`
    pub fn contact_fragment(label: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(label.as_bytes()).collect();
        format!("#contact?service={}", encoded.replace('+', "%20"))
    }
}

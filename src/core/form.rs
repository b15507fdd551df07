use crate::domain::model::{BookingDraft, FormField, MESSAGE_MAX_CHARS};
use crate::utils::error::Result;
use crate::utils::validation::validate_max_chars;

const SERVICE_TOKEN: &str = "service=";

/// 表單草稿的持有者。只負責儲存與長度限制，格式驗證留給送出時處理。
#[derive(Debug, Clone, Default)]
pub struct FormState {
    draft: BookingDraft,
    seeded: bool,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    /// 從頁面 hash 讀取預選的服務類型，每次掛載只執行一次
    ///
    /// Returns `true` when the draft's service type was changed.
    pub fn seed_service_type_from_location(&mut self, hash: &str) -> bool {
        if self.seeded {
            return false;
        }
        self.seeded = true;

        match service_from_fragment(hash) {
            Some(service) => {
                tracing::debug!("Seeding service type from location: {}", service);
                self.draft.service_type = service;
                true
            }
            None => false,
        }
    }

    pub fn update_field(&mut self, field: FormField, value: impl Into<String>) -> Result<&BookingDraft> {
        self.draft = apply_field(&self.draft, field, value.into())?;
        Ok(&self.draft)
    }

    pub fn reset_draft(&mut self) {
        self.draft = BookingDraft::default();
    }
}

/// Pure field update. An over-length message is refused outright, never truncated.
pub fn apply_field(draft: &BookingDraft, field: FormField, value: String) -> Result<BookingDraft> {
    if field == FormField::Message {
        validate_max_chars(&value, MESSAGE_MAX_CHARS)?;
    }

    let mut next = draft.clone();
    *next.slot_mut(field) = value;
    Ok(next)
}

/// 解析 `#contact?service=<value>`，值經過百分比解碼。缺少或格式錯誤時回傳 `None`。
///
/// 值在下一個 `&` 或 `#` 截止，後面的參數不會混進服務名稱；
/// 這與直接取 `service=` 之後整段字串的解析方式不同。
pub fn service_from_fragment(hash: &str) -> Option<String> {
    let start = hash.find(SERVICE_TOKEN)? + SERVICE_TOKEN.len();
    let raw = &hash[start..];
    let raw = raw.split(['&', '#']).next().unwrap_or_default();

    let decoded = decode_component(raw)?;
    if decoded.is_empty() {
        return None;
    }
    Some(decoded)
}

// '+' stays literal, matching decodeURIComponent
fn decode_component(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

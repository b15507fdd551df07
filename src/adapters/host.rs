use crate::domain::ports::{BrowserHost, WindowHandle};
use url::Url;

/// 終端機環境：沒有真正的視窗，交接連結直接印出給使用者點擊
#[derive(Debug, Clone, Default)]
pub struct ConsoleHost {
    hash: String,
}

impl ConsoleHost {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
}

struct PrintedLink;

impl WindowHandle for PrintedLink {
    fn is_closed(&self) -> bool {
        false
    }
}

impl BrowserHost for ConsoleHost {
    fn location_hash(&self) -> String {
        self.hash.clone()
    }

    fn open_window(&self, url: &Url) -> Option<Box<dyn WindowHandle>> {
        println!("💬 Continue on WhatsApp: {}", url);
        Some(Box::new(PrintedLink))
    }
}

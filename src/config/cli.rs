use crate::domain::model::FormField;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "em-booking")]
#[command(about = "Submit a chauffeur booking request and hand it off to WhatsApp")]
pub struct CliConfig {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Service label, e.g. "Premium" or "Transfert Aéroport"
    #[arg(long)]
    pub service: Option<String>,

    #[arg(long)]
    pub message: Option<String>,

    /// Page fragment used to pre-select a service, e.g. "#contact?service=Premium"
    #[arg(long, default_value = "")]
    pub hash: String,

    /// URL of the page hosting the form; a loopback host selects the local endpoint
    #[arg(long, default_value = "http://localhost:5173/")]
    pub page_url: String,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// 依表單順序列出要套用的編輯
    pub fn edits(&self) -> Vec<(FormField, String)> {
        [
            (FormField::Name, &self.name),
            (FormField::Email, &self.email),
            (FormField::Phone, &self.phone),
            (FormField::ServiceType, &self.service),
            (FormField::Message, &self.message),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_skip_absent_flags() {
        let config = CliConfig::parse_from([
            "em-booking",
            "--name",
            "Jean",
            "--message",
            "Bonjour",
            "--hash",
            "#contact?service=Premium",
        ]);

        assert_eq!(
            config.edits(),
            vec![
                (FormField::Name, "Jean".to_string()),
                (FormField::Message, "Bonjour".to_string()),
            ]
        );
        assert_eq!(config.hash, "#contact?service=Premium");
        assert_eq!(config.page_url, "http://localhost:5173/");
    }
}

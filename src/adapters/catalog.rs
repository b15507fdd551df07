use crate::core::classify::keys;
use crate::domain::ports::Translator;
use crate::utils::error::{BookingError, Result};
use std::collections::HashMap;

const FRENCH: [(&str, &str); 10] = [
    (keys::REQUIRED_FIELDS, "Veuillez remplir tous les champs obligatoires."),
    (keys::INVALID_EMAIL, "Veuillez saisir une adresse email valide."),
    (
        keys::SUCCESS,
        "Votre demande a bien été envoyée ! WhatsApp va s'ouvrir pour confirmer votre réservation.",
    ),
    (
        keys::REJECTED_FALLBACK,
        "L'envoi a échoué. Veuillez réessayer ou nous contacter directement sur WhatsApp.",
    ),
    (
        keys::NETWORK_LOCAL,
        "Impossible de joindre le service d'envoi local. Vérifiez qu'il est démarré sur le port 3001.",
    ),
    (
        keys::NETWORK_REMOTE,
        "Impossible de joindre le serveur. Vérifiez votre connexion internet et réessayez.",
    ),
    (
        keys::TIMED_OUT,
        "Le serveur met trop de temps à répondre. Veuillez réessayer dans quelques instants.",
    ),
    (keys::HTTP_STATUS, "Erreur du serveur. Veuillez réessayer plus tard."),
    (
        keys::INVALID_RESPONSE,
        "Réponse du serveur invalide. Veuillez réessayer plus tard.",
    ),
    (
        keys::POPUP_BLOCKED,
        "Votre demande a bien été envoyée, mais la fenêtre WhatsApp a été bloquée. Ouvrez WhatsApp manuellement pour nous écrire.",
    ),
];

/// 翻譯字串表。找不到的鍵直接回傳鍵名。
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn french() -> Self {
        Self {
            entries: FRENCH
                .iter()
                .map(|(key, text)| (key.to_string(), text.to_string()))
                .collect(),
        }
    }

    /// 扁平的 TOML 表，例如 `"contact.form.success" = "..."`
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let entries: HashMap<String, String> =
            toml::from_str(content).map_err(|e| BookingError::ConfigError {
                message: format!("translation catalog parsing error: {}", e),
            })?;
        Ok(Self { entries })
    }

    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.entries.extend(overrides);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Translator for Catalog {
    fn t(&self, key: &str) -> String {
        match self.get(key) {
            Some(text) => text.to_string(),
            None => {
                tracing::debug!("Missing translation for '{}'", key);
                key.to_string()
            }
        }
    }
}

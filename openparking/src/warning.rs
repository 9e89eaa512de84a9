//! Collecte d'avertissements
//!
//! Un collecteur est créé par l'appelant pour une passe (décodage d'un parking,
//! validation d'une source) puis vidé explicitement avec [`Warnings::flush`].
//! Aucun état global: rien ne fuit d'une passe à la suivante.

use tracing::debug;

#[derive(Debug, Default)]
pub struct Warnings {
    entries: Vec<String>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre un avertissement
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(warning = %message, "Warning recorded");
        self.entries.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Retourne les avertissements accumulés et vide le collecteur
    pub fn flush(&mut self) -> Vec<String> {
        std::mem::take(&mut self.entries)
    }
}

// ── Core error types ──
//
// User-facing errors from intercfg-core. Every message is meant to be shown
// as-is in the TUI, so variants carry enough context to stand alone.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Form validation ──────────────────────────────────────────────
    #[error("{message}")]
    Validation { message: String },

    // ── Registry conflicts ───────────────────────────────────────────
    #[error("Key {identifier} is already bound to another address; remove it first")]
    DuplicateKey { identifier: String },

    #[error("Apartment {number} already exists")]
    DuplicateApartment { number: String },

    #[error("The only network address cannot be removed")]
    LastNetworkAddress,

    #[error("At least one NTP server is required")]
    LastNtpServer,

    // ── Hardware simulation ──────────────────────────────────────────
    #[error("Could not read the key, try again")]
    KeyReadFailed,

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },
}

impl CoreError {
    /// Shorthand for a validation failure with a display message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_displays_message_verbatim() {
        let err = CoreError::validation("Fill in the apartment number");
        assert_eq!(err.to_string(), "Fill in the apartment number");
    }

    #[test]
    fn not_found_names_entity() {
        let err = CoreError::not_found("Key", "42");
        assert_eq!(err.to_string(), "Key not found: 42");
    }
}

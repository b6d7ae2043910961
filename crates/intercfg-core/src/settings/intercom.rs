// ── Entrance and running-line settings ──

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntranceSettings {
    pub doors_always_open: bool,
    pub open_on_network_failure: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum ScrollSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
    VeryFast,
}

impl ScrollSpeed {
    pub fn label(self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very fast",
        }
    }

    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Scrolling text shown on the panel display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningLine {
    pub enabled: bool,
    pub speed: ScrollSpeed,
    pub text: String,
}

impl Default for RunningLine {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: ScrollSpeed::Normal,
            text: "Welcome to GoodLine".into(),
        }
    }
}

impl RunningLine {
    pub const MAX_CHARS: usize = 100;

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.char_count() > Self::MAX_CHARS {
            return Err(CoreError::validation(format!(
                "Text must not exceed {} characters",
                Self::MAX_CHARS
            )));
        }
        if self.enabled && self.text.trim().is_empty() {
            return Err(CoreError::validation("Enter the running line text"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters_not_bytes() {
        let line = RunningLine {
            text: "Привет".repeat(16),
            ..RunningLine::default()
        };
        assert_eq!(line.char_count(), 96);
        assert!(line.validate().is_ok());
    }

    #[test]
    fn rejects_overlong_and_empty_enabled_text() {
        let long = RunningLine {
            text: "x".repeat(101),
            ..RunningLine::default()
        };
        assert!(long.validate().is_err());

        let mut empty = RunningLine {
            text: "  ".into(),
            ..RunningLine::default()
        };
        assert!(empty.validate().is_err());
        empty.enabled = false;
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn four_speeds() {
        assert_eq!(ScrollSpeed::all().len(), 4);
        assert_eq!(ScrollSpeed::default(), ScrollSpeed::Normal);
    }
}

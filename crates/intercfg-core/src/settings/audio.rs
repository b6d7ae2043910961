// ── Sound and equalizer ──

use serde::{Deserialize, Serialize};

use super::{LEVEL_MAX, check_level};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSettings {
    pub system_volume: u8,
    pub door_sounds: bool,
    pub analog_ring_volume: u8,
    pub analog_conversation_volume: u8,
    pub analog_panel_volume: u8,
    pub sip_mic_gain: u8,
    pub sip_panel_volume: u8,
    pub sip_gate_volume: u8,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            system_volume: 5,
            door_sounds: true,
            analog_ring_volume: 1,
            analog_conversation_volume: 1,
            analog_panel_volume: 2,
            // Factory value is 19, above the slider range.
            sip_mic_gain: LEVEL_MAX,
            sip_panel_volume: 14,
            sip_gate_volume: 5,
        }
    }
}

impl SoundSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        check_level("System volume", self.system_volume)?;
        check_level("Handset ring volume", self.analog_ring_volume)?;
        check_level("Handset conversation volume", self.analog_conversation_volume)?;
        check_level("Panel conversation volume", self.analog_panel_volume)?;
        check_level("Panel microphone gain", self.sip_mic_gain)?;
        check_level("SIP panel conversation volume", self.sip_panel_volume)?;
        check_level("Gate call volume", self.sip_gate_volume)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equalizer {
    pub low: u8,
    pub mid: u8,
    pub high: u8,
}

impl Default for Equalizer {
    fn default() -> Self {
        Self {
            low: 13,
            mid: 9,
            high: 8,
        }
    }
}

impl Equalizer {
    pub fn validate(&self) -> Result<(), CoreError> {
        check_level("Low frequencies", self.low)?;
        check_level("Mid frequencies", self.mid)?;
        check_level("High frequencies", self.high)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_range() {
        assert!(SoundSettings::default().validate().is_ok());
        assert!(Equalizer::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_level_is_named() {
        let eq = Equalizer {
            mid: 17,
            ..Equalizer::default()
        };
        assert_eq!(
            eq.validate(),
            Err(CoreError::validation("Mid frequencies must be between 0 and 16"))
        );
    }
}

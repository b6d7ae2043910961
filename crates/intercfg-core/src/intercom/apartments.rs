// ── Apartment registry ──

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use tracing::info;

use crate::error::CoreError;
use crate::settings::LEVEL_MAX;

pub const SEED_APARTMENTS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apartment {
    pub id: u32,
    pub number: String,
}

// ── Per-apartment settings ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SettingsTab {
    Basic,
    Audio,
    Keys,
    Codes,
    Sip,
    Diagnostic,
}

impl SettingsTab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Audio => "Audio",
            Self::Keys => "Keys",
            Self::Codes => "Codes",
            Self::Sip => "SIP number",
            Self::Diagnostic => "Diagnostic",
        }
    }

    pub fn index(self) -> usize {
        Self::iter().position(|t| t == self).unwrap_or(0)
    }

    /// Previous tab, staying put on the first one.
    pub fn prev(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::iter().nth(i))
            .unwrap_or(self)
    }

    /// Next tab, staying put on the last one.
    pub fn next(self) -> Self {
        Self::iter().nth(self.index() + 1).unwrap_or(self)
    }

    /// Position label such as `2 / 6`.
    pub fn position(self) -> String {
        format!("{} / {}", self.index() + 1, Self::iter().count())
    }
}

/// A handset volume that can defer to the building-wide value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioLevel {
    pub use_common: bool,
    pub value: u8,
}

impl AudioLevel {
    const fn common(value: u8) -> Self {
        Self {
            use_common: true,
            value,
        }
    }

    pub fn set(&mut self, value: u8) {
        self.value = value.min(LEVEL_MAX);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApartmentAudio {
    pub ring: AudioLevel,
    pub conversation: AudioLevel,
    pub panel: AudioLevel,
    pub sip_panel: AudioLevel,
    pub gate_ring: AudioLevel,
    pub mic_gain: AudioLevel,
}

impl Default for ApartmentAudio {
    fn default() -> Self {
        Self {
            ring: AudioLevel::common(1),
            conversation: AudioLevel::common(3),
            panel: AudioLevel::common(12),
            sip_panel: AudioLevel::common(12),
            gate_ring: AudioLevel::common(16),
            mic_gain: AudioLevel::common(16),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApartmentSettings {
    pub voice_guided_opening: bool,
    pub analog_ringing: bool,
    pub sip_ringing: bool,
    pub audio: ApartmentAudio,
    pub standard_levels: bool,
    pub lift_voltage: String,
    pub door_open_voltage: String,
}

impl Default for ApartmentSettings {
    fn default() -> Self {
        Self {
            voice_guided_opening: true,
            analog_ringing: false,
            sip_ringing: true,
            audio: ApartmentAudio::default(),
            standard_levels: false,
            lift_voltage: "5".into(),
            door_open_voltage: "12".into(),
        }
    }
}

impl ApartmentSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.standard_levels {
            parse_voltage("Handset lift voltage", &self.lift_voltage)?;
            parse_voltage("Door-open voltage", &self.door_open_voltage)?;
        }
        Ok(())
    }
}

/// Building-wide analog handset thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandsetLevels {
    pub standard_levels: bool,
    pub pickup: String,
    pub malfunction: String,
    pub lifting: String,
    pub door_open: String,
}

impl Default for HandsetLevels {
    fn default() -> Self {
        Self {
            standard_levels: false,
            pickup: "9.5".into(),
            malfunction: "2".into(),
            lifting: "5".into(),
            door_open: "9".into(),
        }
    }
}

impl HandsetLevels {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.standard_levels {
            return Ok(());
        }
        parse_voltage("Pickup voltage", &self.pickup)?;
        parse_voltage("Malfunction voltage", &self.malfunction)?;
        parse_voltage("Lifting voltage", &self.lifting)?;
        parse_voltage("Door-open voltage", &self.door_open)?;
        Ok(())
    }
}

fn parse_voltage(label: &str, raw: &str) -> Result<f64, CoreError> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| CoreError::validation(format!("{label} must be a number")))
}

// ── Registry ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ApartmentRegistry {
    apartments: Vec<Apartment>,
    settings: BTreeMap<u32, ApartmentSettings>,
    pub handset_levels: HandsetLevels,
}

impl Default for ApartmentRegistry {
    fn default() -> Self {
        Self {
            apartments: (1..=SEED_APARTMENTS)
                .map(|n| Apartment {
                    id: n,
                    number: n.to_string(),
                })
                .collect(),
            settings: BTreeMap::new(),
            handset_levels: HandsetLevels::default(),
        }
    }
}

impl ApartmentRegistry {
    pub fn apartments(&self) -> &[Apartment] {
        &self.apartments
    }

    pub fn get(&self, id: u32) -> Option<&Apartment> {
        self.apartments.iter().find(|a| a.id == id)
    }

    pub fn filter(&self, query: &str) -> Vec<Apartment> {
        let needle = query.trim();
        self.apartments
            .iter()
            .filter(|a| a.number.contains(needle))
            .cloned()
            .collect()
    }

    /// Create (`editing == None`) or renumber an apartment.
    pub fn save(&mut self, editing: Option<u32>, number: &str) -> Result<u32, CoreError> {
        let number = number.trim();
        if number.is_empty() {
            return Err(CoreError::validation("Enter an apartment number"));
        }
        if self
            .apartments
            .iter()
            .any(|a| a.number == number && Some(a.id) != editing)
        {
            return Err(CoreError::DuplicateApartment {
                number: number.to_owned(),
            });
        }
        if let Some(id) = editing {
            let apt = self
                .apartments
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| CoreError::not_found("Apartment", id.to_string()))?;
            apt.number = number.to_owned();
            info!(id, number, "apartment renumbered");
            return Ok(id);
        }
        let id = self.apartments.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        self.apartments.push(Apartment {
            id,
            number: number.to_owned(),
        });
        info!(id, number, "apartment added");
        Ok(id)
    }

    pub fn delete(&mut self, id: u32) -> Result<(), CoreError> {
        let before = self.apartments.len();
        self.apartments.retain(|a| a.id != id);
        if self.apartments.len() == before {
            return Err(CoreError::not_found("Apartment", id.to_string()));
        }
        self.settings.remove(&id);
        info!(id, "apartment deleted");
        Ok(())
    }

    pub fn delete_all(&mut self) {
        info!(count = self.apartments.len(), "all apartments deleted");
        self.apartments.clear();
        self.settings.clear();
    }

    pub fn settings(&self, id: u32) -> ApartmentSettings {
        self.settings.get(&id).cloned().unwrap_or_default()
    }

    pub fn save_settings(&mut self, id: u32, settings: ApartmentSettings) -> Result<(), CoreError> {
        if self.get(id).is_none() {
            return Err(CoreError::not_found("Apartment", id.to_string()));
        }
        settings.validate()?;
        self.settings.insert(id, settings);
        info!(id, "apartment settings saved");
        Ok(())
    }

    /// Drop every personal override so all apartments use the defaults.
    pub fn reset_personal_settings(&mut self) {
        info!(overrides = self.settings.len(), "personal settings reset");
        self.settings.clear();
    }

    pub fn save_handset_levels(&mut self, levels: HandsetLevels) -> Result<(), CoreError> {
        levels.validate()?;
        self.handset_levels = levels;
        info!("handset levels saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn seeded_with_one_hundred() {
        let reg = ApartmentRegistry::default();
        assert_eq!(reg.apartments().len(), 100);
        assert_eq!(reg.apartments()[99].number, "100");
    }

    #[test]
    fn filter_matches_substring() {
        let reg = ApartmentRegistry::default();
        let hits: Vec<String> = reg.filter("9").into_iter().map(|a| a.number).collect();
        assert_eq!(hits.len(), 19);
        assert!(hits.contains(&"99".to_owned()));
    }

    #[test]
    fn save_rejects_blank_and_duplicates() {
        let mut reg = ApartmentRegistry::default();
        assert_eq!(
            reg.save(None, " "),
            Err(CoreError::validation("Enter an apartment number"))
        );
        assert!(matches!(
            reg.save(None, "5"),
            Err(CoreError::DuplicateApartment { .. })
        ));
        // Renaming to its own number is fine.
        assert_eq!(reg.save(Some(5), "5"), Ok(5));
    }

    #[test]
    fn new_ids_follow_the_maximum() {
        let mut reg = ApartmentRegistry::default();
        reg.delete(50).unwrap();
        assert_eq!(reg.save(None, "101").unwrap(), 101);
        reg.delete_all();
        assert_eq!(reg.save(None, "1").unwrap(), 1);
    }

    #[test]
    fn tabs_clamp_at_both_ends() {
        assert_eq!(SettingsTab::Basic.prev(), SettingsTab::Basic);
        assert_eq!(SettingsTab::Basic.next(), SettingsTab::Audio);
        assert_eq!(SettingsTab::Diagnostic.next(), SettingsTab::Diagnostic);
        assert_eq!(SettingsTab::Sip.position(), "5 / 6");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut reg = ApartmentRegistry::default();
        let mut custom = reg.settings(3);
        custom.analog_ringing = true;
        custom.audio.ring.set(40);
        assert_eq!(custom.audio.ring.value, LEVEL_MAX);
        reg.save_settings(3, custom.clone()).unwrap();
        assert_eq!(reg.settings(3), custom);

        reg.reset_personal_settings();
        assert_eq!(reg.settings(3), ApartmentSettings::default());
    }

    #[test]
    fn handset_levels_must_be_numeric() {
        let mut reg = ApartmentRegistry::default();
        let mut levels = HandsetLevels::default();
        levels.pickup = "abc".into();
        assert!(reg.save_handset_levels(levels.clone()).is_err());
        levels.pickup = "9,5".into();
        reg.save_handset_levels(levels).unwrap();
    }
}

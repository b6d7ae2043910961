// ── Session-wide panel state ──
//
// The diagnostic screens work on drafts and hand finished edits back as a
// `PanelUpdate`. `PanelState` keeps the accepted values until the process
// exits.

use tracing::info;

use crate::error::CoreError;
use crate::intercom::{ApartmentRegistry, KeyRegistry, MatrixBoard};
use crate::settings::{
    DateTimeSettings, DdnsSettings, EntranceSettings, Equalizer, NetworkSettings, PanelInfo,
    RunningLine, SipStatus, SoundSettings, SyslogSettings, VideoSettings,
};

#[derive(Debug, Clone, Default)]
pub struct PanelState {
    pub info: PanelInfo,
    pub sip: SipStatus,
    pub keys: KeyRegistry,
    pub apartments: ApartmentRegistry,
    pub matrix: MatrixBoard,
    pub entrance: EntranceSettings,
    pub running_line: RunningLine,
    pub sound: SoundSettings,
    pub equalizer: Equalizer,
    pub video: VideoSettings,
    pub ddns: DdnsSettings,
    pub network: NetworkSettings,
    pub syslog: SyslogSettings,
    pub date_time: DateTimeSettings,
}

/// A replacement value for one section of [`PanelState`].
#[derive(Debug, Clone)]
pub enum PanelUpdate {
    Keys(KeyRegistry),
    Apartments(ApartmentRegistry),
    Matrix(MatrixBoard),
    Entrance(EntranceSettings),
    RunningLine(RunningLine),
    Sound(SoundSettings),
    Equalizer(Equalizer),
    Video(VideoSettings),
    Ddns(DdnsSettings),
    Network(NetworkSettings),
    Syslog(SyslogSettings),
    DateTime(DateTimeSettings),
}

impl PanelUpdate {
    /// Human-readable section name, used in notifications and logs.
    pub fn section(&self) -> &'static str {
        match self {
            Self::Keys(_) => "Keys",
            Self::Apartments(_) => "Apartments",
            Self::Matrix(_) => "Matrix",
            Self::Entrance(_) => "Entrance",
            Self::RunningLine(_) => "Running line",
            Self::Sound(_) => "Sound",
            Self::Equalizer(_) => "Equalizer",
            Self::Video(_) => "Video stream",
            Self::Ddns(_) => "DDNS",
            Self::Network(_) => "Network settings",
            Self::Syslog(_) => "Syslog",
            Self::DateTime(_) => "Date & time",
        }
    }

    /// Form-backed sections are re-validated before they are accepted.
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::RunningLine(v) => v.validate(),
            Self::Sound(v) => v.validate(),
            Self::Equalizer(v) => v.validate(),
            Self::Video(v) => v.validate(),
            Self::Ddns(v) => v.validate(),
            Self::Network(v) => v.validate(),
            Self::Syslog(v) => v.validate(),
            Self::DateTime(v) => v.validate(),
            Self::Keys(_) | Self::Apartments(_) | Self::Matrix(_) | Self::Entrance(_) => Ok(()),
        }
    }
}

impl PanelState {
    /// Replace one section. Nothing changes if validation fails.
    pub fn apply(&mut self, update: PanelUpdate) -> Result<(), CoreError> {
        update.validate()?;
        let section = update.section();
        match update {
            PanelUpdate::Keys(v) => self.keys = v,
            PanelUpdate::Apartments(v) => self.apartments = v,
            PanelUpdate::Matrix(v) => self.matrix = v,
            PanelUpdate::Entrance(v) => self.entrance = v,
            PanelUpdate::RunningLine(v) => self.running_line = v,
            PanelUpdate::Sound(v) => self.sound = v,
            PanelUpdate::Equalizer(v) => self.equalizer = v,
            PanelUpdate::Video(v) => self.video = v,
            PanelUpdate::Ddns(v) => self.ddns = v,
            PanelUpdate::Network(v) => self.network = v,
            PanelUpdate::Syslog(v) => self.syslog = v,
            PanelUpdate::DateTime(v) => self.date_time = v,
        }
        info!(section, "panel settings saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepted_update_replaces_section() {
        let mut state = PanelState::default();
        let eq = Equalizer {
            low: 1,
            mid: 2,
            high: 3,
        };
        state.apply(PanelUpdate::Equalizer(eq)).unwrap();
        assert_eq!(state.equalizer, eq);
    }

    #[test]
    fn invalid_update_is_rejected_untouched() {
        let mut state = PanelState::default();
        let line = RunningLine {
            text: "x".repeat(150),
            ..RunningLine::default()
        };
        assert!(state.apply(PanelUpdate::RunningLine(line)).is_err());
        assert_eq!(state.running_line, RunningLine::default());
    }

    #[test]
    fn registry_updates_skip_validation() {
        let mut state = PanelState::default();
        let mut keys = state.keys.clone();
        keys.delete(1).unwrap();
        state.apply(PanelUpdate::Keys(keys)).unwrap();
        assert_eq!(state.keys.keys().len(), 7);
    }
}

//! Screen identifiers.

use std::fmt;

use strum::{EnumIter, EnumString, IntoStaticStr};

/// Every navigable screen. Screens take no parameters; anything they need
/// comes from the store snapshot or the panel state when they are created.
///
/// Parses case-insensitively from the variant name, which is what the
/// `ui.initial_screen` config key and the `--screen` flag accept.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum ScreenId {
    // ── Auto-configuration wizard ──
    #[default]
    ModeSelection,
    DeviceType,
    DeviceSubtype,
    DeviceList,
    CommutatorList,
    PortList,
    ConfigurationConfirm,

    // ── Diagnostics ──
    DiagnosticMain,
    Main,
    Keys,
    Apartments,
    Matrix,
    Entrance,
    RunningLine,
    Sound,
    Equalizer,
    SipAccount,
    VideoStream,
    Ddns,
    NetworkSettings,
    Syslog,
    Update,
    DateTime,
    Reboot,
    Reset,
}

impl ScreenId {
    /// Title shown in the header and breadcrumbs.
    pub fn label(self) -> &'static str {
        match self {
            Self::ModeSelection => "Mode selection",
            Self::DeviceType => "Device type",
            Self::DeviceSubtype => "Device subtype",
            Self::DeviceList => "Devices",
            Self::CommutatorList => "Switches",
            Self::PortList => "Ports",
            Self::ConfigurationConfirm => "Configuration",
            Self::DiagnosticMain => "Diagnostics",
            Self::Main => "Panel info",
            Self::Keys => "Keys",
            Self::Apartments => "Apartments",
            Self::Matrix => "Matrix",
            Self::Entrance => "Entrance",
            Self::RunningLine => "Running line",
            Self::Sound => "Sound",
            Self::Equalizer => "Equalizer",
            Self::SipAccount => "SIP account",
            Self::VideoStream => "Video stream",
            Self::Ddns => "DDNS",
            Self::NetworkSettings => "Network settings",
            Self::Syslog => "Syslog",
            Self::Update => "Firmware update",
            Self::DateTime => "Date & time",
            Self::Reboot => "Reboot",
            Self::Reset => "Factory reset",
        }
    }

    /// Variant name, the form accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// `(step, of)` for screens inside the auto-configuration wizard.
    pub fn wizard_step(self) -> Option<(u8, u8)> {
        let step = match self {
            Self::DeviceType => 1,
            Self::DeviceSubtype => 2,
            Self::DeviceList => 3,
            Self::CommutatorList => 4,
            Self::PortList => 5,
            Self::ConfigurationConfirm => 6,
            _ => return None,
        };
        Some((step, 6))
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn twenty_five_screens() {
        assert_eq!(ScreenId::iter().count(), 25);
    }

    #[test]
    fn names_parse_back() {
        for id in ScreenId::iter() {
            assert_eq!(id.name().parse::<ScreenId>().unwrap(), id);
        }
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!("diagnosticmain".parse::<ScreenId>().unwrap(), ScreenId::DiagnosticMain);
        assert_eq!("DDNS".parse::<ScreenId>().unwrap(), ScreenId::Ddns);
        assert!("Dashboard".parse::<ScreenId>().is_err());
    }

    #[test]
    fn wizard_steps_are_sequential() {
        let steps: Vec<u8> = ScreenId::iter()
            .filter_map(|id| id.wizard_step().map(|(n, _)| n))
            .collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
    }
}

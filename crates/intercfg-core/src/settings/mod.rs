// ── Panel settings models ──
//
// One model per settings screen. Text inputs are kept as the raw strings
// the user typed; `validate()` parses them and reports the first problem as
// a `CoreError::Validation` ready for display.

pub mod audio;
pub mod intercom;
pub mod network;
pub mod panel;
pub mod system;
pub mod video;

use std::net::Ipv4Addr;

use crate::error::CoreError;

pub use audio::{Equalizer, SoundSettings};
pub use intercom::{EntranceSettings, RunningLine, ScrollSpeed};
pub use network::{
    AddressKind, DdnsSettings, LogLevel, NetworkAddress, NetworkSettings, SyslogProtocol,
    SyslogSettings,
};
pub use panel::{PanelInfo, SipStatus};
pub use system::{
    ConfirmStage, DateTimeSettings, DoubleConfirm, FirmwareUpdate, NtpServer, UpdateMethod,
};
pub use video::{BitrateMode, Resolution, StreamKind, StreamSettings, VideoProfile, VideoSettings};

/// Upper bound shared by every 0..=16 slider on the panel.
pub const LEVEL_MAX: u8 = 16;

pub(crate) fn require(label: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{label} is required")));
    }
    Ok(())
}

pub(crate) fn parse_port(label: &str, raw: &str) -> Result<u16, CoreError> {
    require(label, raw)?;
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| CoreError::validation(format!("{label} must be between 1 and 65535")))
}

pub(crate) fn parse_ipv4(label: &str, raw: &str) -> Result<Ipv4Addr, CoreError> {
    raw.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| CoreError::validation(format!("{label} is not a valid IPv4 address")))
}

pub(crate) fn check_level(label: &str, value: u8) -> Result<(), CoreError> {
    if value > LEVEL_MAX {
        return Err(CoreError::validation(format!(
            "{label} must be between 0 and {LEVEL_MAX}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_bounds() {
        assert_eq!(parse_port("Port", " 8081 "), Ok(8081));
        assert!(parse_port("Port", "0").is_err());
        assert!(parse_port("Port", "65536").is_err());
        assert_eq!(
            parse_port("Port", ""),
            Err(CoreError::validation("Port is required"))
        );
    }

    #[test]
    fn ipv4_parsing() {
        assert!(parse_ipv4("IP", "192.168.0.1").is_ok());
        assert!(parse_ipv4("IP", "192.168.0").is_err());
    }
}

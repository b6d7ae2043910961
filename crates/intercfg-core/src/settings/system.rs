// ── Firmware update, date & time, destructive confirmations ──

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use tracing::info;

use crate::error::CoreError;
use crate::source::Clipboard;

pub const CURRENT_FIRMWARE: &str = "2.5.0.12.8";

// ── Firmware update ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum UpdateMethod {
    #[default]
    Http,
    Ftp,
}

impl UpdateMethod {
    /// Path template shown under the server path field.
    pub fn template(self) -> &'static str {
        match self {
            Self::Http => "http://server/path/to/file",
            Self::Ftp => "ftp://server-port/path/to/file",
        }
    }
}

#[derive(Debug)]
pub struct FirmwareUpdate {
    pub method: UpdateMethod,
    pub server_path: String,
    pub file_name: String,
    pub login: String,
    pub password: SecretString,
}

impl Default for FirmwareUpdate {
    fn default() -> Self {
        Self {
            method: UpdateMethod::Http,
            server_path: String::new(),
            file_name: String::new(),
            login: String::new(),
            password: SecretString::from(String::new()),
        }
    }
}

impl FirmwareUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.server_path.trim().is_empty() || self.file_name.trim().is_empty() {
            return Err(CoreError::validation(
                "Fill in the server folder path and the file name",
            ));
        }
        if self.method == UpdateMethod::Ftp
            && (self.login.trim().is_empty() || self.password.expose_secret().is_empty())
        {
            return Err(CoreError::validation("FTP requires a login and password"));
        }
        Ok(())
    }
}

// ── Date & time ──────────────────────────────────────────────────────

pub const TIMEZONES: [&str; 11] = [
    "UTC",
    "Europe/Moscow",
    "Europe/Kaliningrad",
    "Asia/Yekaterinburg",
    "Asia/Omsk",
    "Asia/Krasnoyarsk",
    "Asia/Irkutsk",
    "Asia/Yakutsk",
    "Asia/Vladivostok",
    "Asia/Magadan",
    "Asia/Kamchatka",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NtpServer {
    pub id: u32,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeSettings {
    pub timezone: String,
    ntp_servers: Vec<NtpServer>,
}

impl Default for DateTimeSettings {
    fn default() -> Self {
        Self {
            timezone: "Asia/Krasnoyarsk".into(),
            ntp_servers: vec![NtpServer {
                id: 1,
                address: "ntp.goodline.info".into(),
            }],
        }
    }
}

impl DateTimeSettings {
    pub fn ntp_servers(&self) -> &[NtpServer] {
        &self.ntp_servers
    }

    pub fn set_timezone(&mut self, tz: &str) -> Result<(), CoreError> {
        if !TIMEZONES.contains(&tz) {
            return Err(CoreError::validation(format!("Unknown timezone {tz}")));
        }
        tz.clone_into(&mut self.timezone);
        Ok(())
    }

    pub fn add_ntp_server(&mut self) -> u32 {
        let id = self.ntp_servers.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        self.ntp_servers.push(NtpServer {
            id,
            address: String::new(),
        });
        id
    }

    pub fn set_ntp_address(&mut self, id: u32, address: &str) -> Result<(), CoreError> {
        let server = self
            .ntp_servers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found("NTP server", id.to_string()))?;
        address.clone_into(&mut server.address);
        Ok(())
    }

    pub fn remove_ntp_server(&mut self, id: u32) -> Result<(), CoreError> {
        if self.ntp_servers.len() <= 1 {
            return Err(CoreError::LastNtpServer);
        }
        let before = self.ntp_servers.len();
        self.ntp_servers.retain(|s| s.id != id);
        if self.ntp_servers.len() == before {
            return Err(CoreError::not_found("NTP server", id.to_string()));
        }
        Ok(())
    }

    /// Put the server address on the clipboard and return it.
    pub fn copy_ntp_server(&self, id: u32, clipboard: &dyn Clipboard) -> Result<String, CoreError> {
        let server = self
            .ntp_servers
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found("NTP server", id.to_string()))?;
        clipboard.set_text(&server.address);
        Ok(server.address.clone())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !TIMEZONES.contains(&self.timezone.as_str()) {
            return Err(CoreError::validation("Select a timezone"));
        }
        if self.ntp_servers.iter().any(|s| s.address.trim().is_empty()) {
            return Err(CoreError::validation("Fill in the addresses of all NTP servers"));
        }
        Ok(())
    }
}

// ── Two-step confirmation ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfirmStage {
    #[default]
    Idle,
    First,
    Second,
    Done,
}

/// Reboot and factory reset both ask twice before acting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleConfirm {
    stage: ConfirmStage,
}

impl DoubleConfirm {
    pub fn stage(self) -> ConfirmStage {
        self.stage
    }

    /// Advance one step. Returns `true` when the action should run.
    pub fn confirm(&mut self) -> bool {
        self.stage = match self.stage {
            ConfirmStage::Idle => ConfirmStage::First,
            ConfirmStage::First => ConfirmStage::Second,
            ConfirmStage::Second | ConfirmStage::Done => ConfirmStage::Done,
        };
        if self.stage == ConfirmStage::Done {
            info!("double confirmation accepted");
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.stage = ConfirmStage::Idle;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::MemoryClipboard;

    #[test]
    fn update_requires_path_and_file() {
        let mut update = FirmwareUpdate::default();
        assert!(update.validate().is_err());
        update.server_path = "http://fw.local/panel".into();
        update.file_name = "firmware.isoam".into();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn ftp_requires_credentials() {
        let mut update = FirmwareUpdate {
            method: UpdateMethod::Ftp,
            server_path: "ftp://fw.local-21/panel".into(),
            file_name: "firmware.isoam".into(),
            ..FirmwareUpdate::default()
        };
        assert_eq!(
            update.validate(),
            Err(CoreError::validation("FTP requires a login and password"))
        );
        update.login = "admin".into();
        update.password = SecretString::from("secret".to_owned());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn ntp_list_keeps_one_server() {
        let mut dt = DateTimeSettings::default();
        assert_eq!(dt.remove_ntp_server(1), Err(CoreError::LastNtpServer));
        let id = dt.add_ntp_server();
        assert!(dt.validate().is_err());
        dt.set_ntp_address(id, "pool.ntp.org").unwrap();
        assert!(dt.validate().is_ok());
        dt.remove_ntp_server(1).unwrap();
        assert_eq!(dt.ntp_servers().len(), 1);
    }

    #[test]
    fn copy_puts_address_on_clipboard() {
        let dt = DateTimeSettings::default();
        let clip = MemoryClipboard::default();
        let copied = dt.copy_ntp_server(1, &clip).unwrap();
        assert_eq!(copied, "ntp.goodline.info");
        assert_eq!(clip.last().as_deref(), Some("ntp.goodline.info"));
    }

    #[test]
    fn timezone_must_be_known() {
        let mut dt = DateTimeSettings::default();
        assert!(dt.set_timezone("Mars/Olympus").is_err());
        dt.set_timezone("UTC").unwrap();
        assert_eq!(dt.timezone, "UTC");
    }

    #[test]
    fn double_confirm_runs_on_second_yes() {
        let mut dc = DoubleConfirm::default();
        assert!(!dc.confirm());
        assert_eq!(dc.stage(), ConfirmStage::First);
        assert!(!dc.confirm());
        assert_eq!(dc.stage(), ConfirmStage::Second);
        assert!(dc.confirm());
        assert_eq!(dc.stage(), ConfirmStage::Done);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut dc = DoubleConfirm::default();
        dc.confirm();
        dc.confirm();
        dc.cancel();
        assert_eq!(dc.stage(), ConfirmStage::Idle);
    }
}

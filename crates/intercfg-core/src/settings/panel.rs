// ── Read-only panel status ──

/// Hardware and firmware readout shown on the panel info screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelInfo {
    pub panel_model: String,
    pub camera_model: String,
    pub mac_address: String,
    pub serial_number: String,
    pub temperature: String,
    pub input_voltage: String,
    pub uptime: String,
    pub opt_version: FirmwarePart,
    pub media_version: FirmwarePart,
    pub rootfs_version: FirmwarePart,
    pub sip_registered: bool,
    pub gate_mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwarePart {
    pub version: String,
    pub date: String,
}

impl FirmwarePart {
    fn new(version: &str, date: &str) -> Self {
        Self {
            version: version.to_owned(),
            date: date.to_owned(),
        }
    }
}

impl std::fmt::Display for FirmwarePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.version, self.date)
    }
}

impl Default for PanelInfo {
    fn default() -> Self {
        Self {
            panel_model: "Sokol Plus (rev. 5)".into(),
            camera_model: "GK7205V300".into(),
            mac_address: "08:53:C0:18:74:3E".into(),
            serial_number: "53CD18743E".into(),
            temperature: "75.37 °C".into(),
            input_voltage: "12.2 V".into(),
            uptime: "5d 22h 24m 6s".into(),
            opt_version: FirmwarePart::new("2.5.0.12.8", "2025-06-19"),
            media_version: FirmwarePart::new("2.5.0.11.2", "2024-12-20"),
            rootfs_version: FirmwarePart::new("2.5.0.12.8", "2025-06-19"),
            sip_registered: false,
            gate_mode: "Off".into(),
        }
    }
}

impl PanelInfo {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Panel model", self.panel_model.clone()),
            ("Camera model", self.camera_model.clone()),
            ("MAC address", self.mac_address.clone()),
            ("Serial number", self.serial_number.clone()),
            ("Temperature", self.temperature.clone()),
            ("Input voltage", self.input_voltage.clone()),
            ("Uptime", self.uptime.clone()),
            ("Firmware (opt)", self.opt_version.to_string()),
            ("Firmware (media)", self.media_version.to_string()),
            ("Firmware (rootfs)", self.rootfs_version.to_string()),
            (
                "SIP registration",
                if self.sip_registered {
                    "Registered".into()
                } else {
                    "Not registered".into()
                },
            ),
            ("Gate mode", self.gate_mode.clone()),
        ]
    }
}

/// SIP registration state for the account screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SipStatus {
    pub registered: bool,
}

impl Default for SipStatus {
    fn default() -> Self {
        Self { registered: true }
    }
}

impl SipStatus {
    pub const CHECKLIST: [&'static str; 3] = [
        "Network connection",
        "SIP server settings",
        "SIP account login and password",
    ];

    pub fn label(self) -> &'static str {
        if self.registered {
            "Registered"
        } else {
            "Not registered"
        }
    }

    /// Troubleshooting items, shown only while unregistered.
    pub fn checklist(self) -> &'static [&'static str] {
        if self.registered { &[] } else { &Self::CHECKLIST }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_rows_include_firmware_dates() {
        let rows = PanelInfo::default().rows();
        assert_eq!(rows.len(), 12);
        assert!(rows.contains(&("Firmware (media)", "2.5.0.11.2 (2024-12-20)".to_owned())));
        assert!(rows.contains(&("SIP registration", "Not registered".to_owned())));
    }

    #[test]
    fn checklist_only_when_unregistered() {
        assert!(SipStatus::default().checklist().is_empty());
        assert_eq!(SipStatus { registered: false }.checklist().len(), 3);
    }
}

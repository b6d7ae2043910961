// ── DDNS, IP addressing and remote syslog ──

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use tracing::info;

use super::{parse_ipv4, parse_port, require};
use crate::error::CoreError;

// ── DDNS ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct DdnsSettings {
    pub enabled: bool,
    pub interval_secs: String,
    pub port: String,
    pub server: String,
    pub login: String,
    pub password: SecretString,
    pub hostname: String,
}

impl Clone for DdnsSettings {
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            interval_secs: self.interval_secs.clone(),
            port: self.port.clone(),
            server: self.server.clone(),
            login: self.login.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
            hostname: self.hostname.clone(),
        }
    }
}

impl Default for DdnsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: "300".into(),
            port: "8081".into(),
            server: "10.199.63.7".into(),
            login: "default".into(),
            password: SecretString::from(String::new()),
            hostname: "ddns.ISOam".into(),
        }
    }
}

impl DdnsSettings {
    /// Fields are only checked while DDNS is switched on.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.enabled {
            return Ok(());
        }
        require("Request interval", &self.interval_secs)?;
        let interval = self.interval_secs.trim().parse::<u32>().unwrap_or(0);
        if !(1..=65_535).contains(&interval) {
            return Err(CoreError::validation(
                "Request interval must be between 1 and 65535 seconds",
            ));
        }
        parse_port("Port", &self.port)?;
        require("Server address", &self.server)?;
        require("Login", &self.login)?;
        require("Password", self.password.expose_secret())?;
        require("Hostname", &self.hostname)?;
        Ok(())
    }
}

// ── Network addresses ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum AddressKind {
    Dynamic,
    Static,
}

impl AddressKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Dynamic => "Dynamic",
            Self::Static => "Static",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAddress {
    pub id: u32,
    pub kind: AddressKind,
    pub ip: String,
    pub mask: String,
    pub gateway: String,
    pub dns1: String,
    pub dns2: String,
}

impl NetworkAddress {
    pub fn dynamic(id: u32) -> Self {
        Self {
            id,
            kind: AddressKind::Dynamic,
            ip: String::new(),
            mask: String::new(),
            gateway: String::new(),
            dns1: String::new(),
            dns2: String::new(),
        }
    }

    fn fixed(id: u32, ip: &str, mask: &str, gateway: &str, dns1: &str) -> Self {
        Self {
            id,
            kind: AddressKind::Static,
            ip: ip.into(),
            mask: mask.into(),
            gateway: gateway.into(),
            dns1: dns1.into(),
            dns2: String::new(),
        }
    }

    /// Switching to dynamic drops whatever was typed into the fields.
    pub fn set_kind(&mut self, kind: AddressKind) {
        self.kind = kind;
        if kind == AddressKind::Dynamic {
            *self = Self::dynamic(self.id);
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.kind == AddressKind::Dynamic {
            return Ok(());
        }
        let fields = [
            ("IP address", &self.ip, true),
            ("Subnet mask", &self.mask, true),
            ("Gateway", &self.gateway, true),
            ("DNS 1", &self.dns1, true),
            ("DNS 2", &self.dns2, false),
        ];
        if fields
            .iter()
            .any(|(_, value, required)| *required && value.trim().is_empty())
        {
            return Err(CoreError::validation(format!(
                "Fill in all required fields for network address #{}",
                self.id
            )));
        }
        for (label, value, _) in fields {
            if !value.trim().is_empty() {
                parse_ipv4(&format!("Address #{}: {label}", self.id), value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    addresses: Vec<NetworkAddress>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            addresses: vec![
                NetworkAddress::fixed(
                    1,
                    "10.207.249.132",
                    "255.255.255.24",
                    "10.207.249.125",
                    "212.75.210.62",
                ),
                NetworkAddress::fixed(2, "192.168.0.100", "255.255.255.0", "192.168.0.1", "192.168.0.1"),
            ],
        }
    }
}

impl NetworkSettings {
    pub fn addresses(&self) -> &[NetworkAddress] {
        &self.addresses
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut NetworkAddress> {
        self.addresses.iter_mut().find(|a| a.id == id)
    }

    /// Append a new dynamic address and return its id.
    pub fn add(&mut self) -> u32 {
        let id = self.addresses.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        self.addresses.push(NetworkAddress::dynamic(id));
        id
    }

    pub fn remove(&mut self, id: u32) -> Result<(), CoreError> {
        if self.addresses.len() <= 1 {
            return Err(CoreError::LastNetworkAddress);
        }
        let before = self.addresses.len();
        self.addresses.retain(|a| a.id != id);
        if self.addresses.len() == before {
            return Err(CoreError::not_found("Network address", id.to_string()));
        }
        info!(id, "network address removed");
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        self.addresses.iter().try_for_each(NetworkAddress::validate)
    }
}

// ── Syslog ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SyslogProtocol {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, strum::Display)]
pub enum LogLevel {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyslogSettings {
    pub server: String,
    pub port: String,
    pub protocol: SyslogProtocol,
    pub level: LogLevel,
}

impl Default for SyslogSettings {
    fn default() -> Self {
        Self {
            server: "10.102.137.95".into(),
            port: "5140".into(),
            protocol: SyslogProtocol::Tcp,
            level: LogLevel::Debug,
        }
    }
}

impl SyslogSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        require("Server address", &self.server)?;
        parse_port("Server port", &self.port)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ddns_disabled_skips_validation() {
        let mut ddns = DdnsSettings {
            port: "nope".into(),
            ..DdnsSettings::default()
        };
        assert!(ddns.validate().is_ok());
        ddns.enabled = true;
        assert!(ddns.validate().is_err());
    }

    #[test]
    fn ddns_enabled_needs_password() {
        let ddns = DdnsSettings {
            enabled: true,
            ..DdnsSettings::default()
        };
        assert_eq!(
            ddns.validate(),
            Err(CoreError::validation("Password is required"))
        );
        let ok = DdnsSettings {
            password: SecretString::from("hunter2".to_owned()),
            ..ddns
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.clone().password.expose_secret(), "hunter2");
    }

    #[test]
    fn seeded_addresses_validate() {
        assert!(NetworkSettings::default().validate().is_ok());
    }

    #[test]
    fn last_address_cannot_be_removed() {
        let mut net = NetworkSettings::default();
        net.remove(1).unwrap();
        assert_eq!(net.remove(2), Err(CoreError::LastNetworkAddress));
    }

    #[test]
    fn add_appends_dynamic_with_fresh_id() {
        let mut net = NetworkSettings::default();
        net.remove(1).unwrap();
        let id = net.add();
        assert_eq!(id, 3);
        assert_eq!(net.addresses().last().unwrap().kind, AddressKind::Dynamic);
    }

    #[test]
    fn switching_to_dynamic_clears_fields() {
        let mut net = NetworkSettings::default();
        let addr = net.get_mut(1).unwrap();
        addr.set_kind(AddressKind::Dynamic);
        assert_eq!(addr, &NetworkAddress::dynamic(1));
    }

    #[test]
    fn static_address_errors_name_the_address() {
        let mut net = NetworkSettings::default();
        let id = net.add();
        net.get_mut(id).unwrap().kind = AddressKind::Static;
        assert_eq!(
            net.validate(),
            Err(CoreError::validation(
                "Fill in all required fields for network address #3"
            ))
        );

        let addr = net.get_mut(id).unwrap();
        addr.ip = "10.0.0.300".into();
        addr.mask = "255.0.0.0".into();
        addr.gateway = "10.0.0.1".into();
        addr.dns1 = "10.0.0.1".into();
        assert!(net.validate().is_err());
    }

    #[test]
    fn syslog_defaults_and_levels() {
        let syslog = SyslogSettings::default();
        assert!(syslog.validate().is_ok());
        assert_eq!(syslog.protocol.to_string(), "TCP");
        assert_eq!(LogLevel::all().len(), 8);
    }
}

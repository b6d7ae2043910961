// ── Device domain types ──

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use super::entity_id::{CommutatorId, DeviceId};

/// Kind of hardware the wizard can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
pub enum DeviceType {
    CallPanel,
    Camera,
}

impl DeviceType {
    pub fn label(self) -> &'static str {
        match self {
            Self::CallPanel => "Call panel",
            Self::Camera => "Camera",
        }
    }

    /// Subtypes that can be chosen once this type is selected.
    pub fn subtypes(self) -> &'static [DeviceSubtype] {
        match self {
            Self::CallPanel => &[DeviceSubtype::MainEntrance, DeviceSubtype::Gate],
            Self::Camera => &[DeviceSubtype::External, DeviceSubtype::Internal],
        }
    }
}

/// Mounting position of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
pub enum DeviceSubtype {
    MainEntrance,
    Gate,
    External,
    Internal,
}

impl DeviceSubtype {
    pub fn label(self) -> &'static str {
        match self {
            Self::MainEntrance => "Main entrance",
            Self::Gate => "Gate",
            Self::External => "External",
            Self::Internal => "Internal",
        }
    }

    /// The device type this subtype belongs to.
    pub fn device_type(self) -> DeviceType {
        match self {
            Self::MainEntrance | Self::Gate => DeviceType::CallPanel,
            Self::External | Self::Internal => DeviceType::Camera,
        }
    }
}

/// A configurable device in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub device_type: DeviceType,
    pub subtype: DeviceSubtype,
    pub is_configured: bool,
}

impl Device {
    pub fn new(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        device_type: DeviceType,
        subtype: DeviceSubtype,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_type,
            subtype,
            is_configured: false,
        }
    }
}

/// Network switch the configured devices are cabled to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commutator {
    pub id: CommutatorId,
    pub name: String,
    pub available_ports: u16,
}

impl Commutator {
    pub fn new(id: impl Into<CommutatorId>, name: impl Into<String>, available_ports: u16) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available_ports,
        }
    }
}

/// Physical port on a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: u16,
    pub name: String,
    pub is_available: bool,
    pub is_disconnected: bool,
}

impl Port {
    pub fn new(id: u16, is_available: bool, is_disconnected: bool) -> Self {
        Self {
            id,
            name: format!("Port {id}"),
            is_available,
            is_disconnected,
        }
    }
}

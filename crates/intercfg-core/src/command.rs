// ── Store command API ──
//
// Every mutation of the wizard selection flows through `StoreCommand`.
// UI code builds commands and hands them to `DeviceStore::apply`.

use crate::model::{Commutator, Device, DeviceSubtype, DeviceType, Port};

/// All possible mutations of the wizard selection store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    // ── Selection ────────────────────────────────────────────────────
    SetDeviceType(DeviceType),
    SetDeviceSubtype(DeviceSubtype),
    ToggleDevice(Device),
    SetCommutator(Commutator),
    SetPort(Port),

    // ── Lifecycle ────────────────────────────────────────────────────
    CompleteConfiguration,
    Reset,
}

impl StoreCommand {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetDeviceType(_) => "set_device_type",
            Self::SetDeviceSubtype(_) => "set_device_subtype",
            Self::ToggleDevice(_) => "toggle_device",
            Self::SetCommutator(_) => "set_commutator",
            Self::SetPort(_) => "set_port",
            Self::CompleteConfiguration => "complete_configuration",
            Self::Reset => "reset",
        }
    }
}

//! Action enum — every state change in the TUI flows through here.

use std::fmt;
use std::sync::Arc;

use intercfg_core::{CoreError, PanelUpdate, StoreCommand, StoreSnapshot};

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Something destructive waiting on the y/n dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteKey { id: u32, identifier: String },
    DeleteApartment { id: u32, number: String },
    DeleteAllApartments,
    ResetPersonalSettings,
    RemoveNetworkAddress { id: u32 },
    RemoveNtpServer { id: u32 },
    StartFirmwareUpdate,
    RebootFirst,
    RebootFinal,
    FactoryResetFirst,
    FactoryResetFinal,
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteKey { identifier, .. } => write!(f, "Delete key {identifier}?"),
            Self::DeleteApartment { number, .. } => write!(f, "Delete apartment {number}?"),
            Self::DeleteAllApartments => write!(f, "Delete ALL apartments? This cannot be undone."),
            Self::ResetPersonalSettings => {
                write!(f, "Reset personal settings of every apartment?")
            }
            Self::RemoveNetworkAddress { id } => write!(f, "Remove network address #{id}?"),
            Self::RemoveNtpServer { id } => write!(f, "Remove NTP server #{id}?"),
            Self::StartFirmwareUpdate => write!(f, "Start the firmware update?"),
            Self::RebootFirst => write!(f, "Reboot the panel?"),
            Self::RebootFinal => {
                write!(f, "The panel will be unavailable for a few minutes. Reboot now?")
            }
            Self::FactoryResetFirst => write!(f, "Reset the panel to factory settings?"),
            Self::FactoryResetFinal => {
                write!(f, "All settings will be erased. This cannot be undone. Reset?")
            }
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    Navigate(ScreenId),
    GoBack,

    // ── Wizard store ──────────────────────────────────────────────
    Store(StoreCommand),
    StoreUpdated(Arc<StoreSnapshot>),

    // ── Panel state ───────────────────────────────────────────────
    SavePanel(Box<PanelUpdate>),

    // ── Simulated hardware ────────────────────────────────────────
    KeyRead(Result<String, CoreError>),

    // ── Confirmation dialog ───────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    /// Delivered to the active screen after the user answered yes.
    Confirmed(ConfirmAction),
    /// Delivered to the active screen after the user answered no.
    Cancelled(ConfirmAction),

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}

impl Action {
    pub fn save(update: PanelUpdate) -> Self {
        Self::SavePanel(Box::new(update))
    }
}

//! Domain layer for the `intercfg` intercom panel configurator.
//!
//! Everything here is plain in-memory state; no hardware is contacted.
//!
//! - **[`DeviceStore`]** — Owns the device catalog and the selections made
//!   in the guided auto-configuration wizard. Mutations go through
//!   [`StoreCommand`]; consumers observe [`StoreSnapshot`]s through a
//!   `tokio::sync::watch` channel.
//!
//! - **Sources** ([`source`]) — [`PortScanner`], [`KeyReader`], [`Clock`] and
//!   [`Clipboard`] traits with seeded simulations and fixed test doubles.
//!
//! - **Registries** ([`intercom`]) — Access keys (with the guided NFC flow),
//!   apartments and their per-apartment settings, and the switching matrix.
//!
//! - **Settings** ([`settings`]) — One model per panel settings screen, each
//!   with factory defaults and a `validate()` that yields a displayable
//!   [`CoreError`].
//!
//! - **[`PanelState`]** — The accepted value of every diagnostic section for
//!   the current session, replaced one [`PanelUpdate`] at a time.
//!
//! - **Paging** ([`paging`]) — 1-based page slicing and the compact page
//!   button window used by long lists.

pub mod command;
pub mod error;
pub mod intercom;
pub mod model;
pub mod paging;
pub mod settings;
pub mod source;
pub mod state;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::StoreCommand;
pub use error::CoreError;
pub use paging::{PageWindow, Paginator};
pub use source::{
    Clipboard, Clock, FixedClock, FixedPortScanner, KeyReader, MemoryClipboard, PortScanner,
    ScriptedKeyReader, SimulatedNfcReader, SimulatedPortScanner, SystemClock, format_panel_time,
};
pub use state::{PanelState, PanelUpdate};
pub use store::{DeviceStore, Selection, StoreSnapshot};

pub use model::{Commutator, CommutatorId, Device, DeviceId, DeviceSubtype, DeviceType, Port};

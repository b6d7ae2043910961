// ── Intercom registries ──
//
// In-memory data behind the Keys, Apartments and Matrix screens.

pub mod apartments;
pub mod keys;
pub mod matrix;

pub use apartments::{
    Apartment, ApartmentAudio, ApartmentRegistry, ApartmentSettings, AudioLevel, HandsetLevels,
    SettingsTab,
};
pub use keys::{AddKeyFlow, AddKeyStep, Key, KeyRegistry, KeySearch, NfcState};
pub use matrix::{ApartmentRange, Matrix, MatrixBoard};

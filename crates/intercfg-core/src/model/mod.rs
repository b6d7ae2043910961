// ── Domain model ──

pub mod device;
pub mod entity_id;

pub use device::{Commutator, Device, DeviceSubtype, DeviceType, Port};
pub use entity_id::{CommutatorId, DeviceId};

// ── Seed catalog ──
//
// The fixed device and switch inventory the wizard works against.

use crate::model::{Commutator, Device, DeviceSubtype, DeviceType};

pub fn seed_devices() -> Vec<Device> {
    vec![
        Device::new("1", "Entrance No. 3", DeviceType::CallPanel, DeviceSubtype::MainEntrance),
        Device::new("2", "Entrance No. 5", DeviceType::CallPanel, DeviceSubtype::MainEntrance),
        Device::new("3", "Gate No. 1", DeviceType::CallPanel, DeviceSubtype::Gate),
        Device::new("4", "Camera No. 1", DeviceType::Camera, DeviceSubtype::External),
        Device::new("5", "Camera No. 2", DeviceType::Camera, DeviceSubtype::Internal),
    ]
}

pub fn seed_commutators() -> Vec<Commutator> {
    vec![
        Commutator::new("1", "Switch 1", 24),
        Commutator::new("2", "Switch 2", 16),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_ids_are_unique_and_unconfigured() {
        let devices = seed_devices();
        let ids: HashSet<_> = devices.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids.len(), devices.len());
        assert!(devices.iter().all(|d| !d.is_configured));
    }

    #[test]
    fn seed_subtypes_match_types() {
        for device in seed_devices() {
            assert_eq!(device.subtype.device_type(), device.device_type);
        }
    }
}

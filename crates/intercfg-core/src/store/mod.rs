// ── Wizard selection store ──
//
// Holds the device catalog and the in-progress auto-configuration
// selection. Every mutation rebuilds an immutable snapshot and pushes it
// through a `watch` channel so UI consumers re-render from a consistent view.

pub mod catalog;

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::command::StoreCommand;
use crate::model::{Commutator, Device, DeviceId, DeviceSubtype, DeviceType, Port};

/// The five wizard fields collected across the configuration flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub device_type: Option<DeviceType>,
    pub device_subtype: Option<DeviceSubtype>,
    /// Keyed by device id, in the order the user picked them.
    pub devices: IndexMap<DeviceId, Device>,
    pub commutator: Option<Commutator>,
    pub port: Option<Port>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.device_type.is_none()
            && self.device_subtype.is_none()
            && self.devices.is_empty()
            && self.commutator.is_none()
            && self.port.is_none()
    }
}

/// Point-in-time view of the store handed to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub devices: Vec<Device>,
    pub commutators: Vec<Commutator>,
    pub selection: Selection,
}

impl StoreSnapshot {
    pub fn is_device_selected(&self, id: &DeviceId) -> bool {
        self.selection.devices.contains_key(id)
    }

    /// Catalog entries matching the selected type and subtype, with
    /// unconfigured devices listed first. Empty until both are chosen.
    pub fn devices_for_selection(&self) -> Vec<Device> {
        let mut matching: Vec<Device> = self
            .devices
            .iter()
            .filter(|d| {
                self.selection.device_type == Some(d.device_type)
                    && self.selection.device_subtype == Some(d.subtype)
            })
            .cloned()
            .collect();
        matching.sort_by_key(|d| d.is_configured);
        matching
    }
}

/// Owner of the device catalog and the wizard selection.
pub struct DeviceStore {
    devices: Vec<Device>,
    commutators: Vec<Commutator>,
    selection: Selection,
    snapshot: watch::Sender<Arc<StoreSnapshot>>,
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new(catalog::seed_devices(), catalog::seed_commutators())
    }
}

impl DeviceStore {
    pub fn new(devices: Vec<Device>, commutators: Vec<Commutator>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(StoreSnapshot::default()));
        let store = Self {
            devices,
            commutators,
            selection: Selection::default(),
            snapshot,
        };
        store.publish();
        store
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn commutators(&self) -> &[Commutator] {
        &self.commutators
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_device_selected(&self, device: &Device) -> bool {
        self.selection.devices.contains_key(&device.id)
    }

    pub fn devices_for_selection(&self) -> Vec<Device> {
        self.snapshot().devices_for_selection()
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<StoreSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreSnapshot>> {
        self.snapshot.subscribe()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Reducer entry point used by the UI.
    pub fn apply(&mut self, command: StoreCommand) {
        debug!(command = command.name(), "applying store command");
        match command {
            StoreCommand::SetDeviceType(ty) => self.set_device_type(ty),
            StoreCommand::SetDeviceSubtype(sub) => self.set_device_subtype(sub),
            StoreCommand::ToggleDevice(device) => self.toggle_device_selection(&device),
            StoreCommand::SetCommutator(c) => self.set_commutator(c),
            StoreCommand::SetPort(p) => self.set_port(p),
            StoreCommand::CompleteConfiguration => self.complete_configuration(),
            StoreCommand::Reset => self.reset(),
        }
    }

    /// Selecting a type invalidates everything chosen beneath it.
    pub fn set_device_type(&mut self, device_type: DeviceType) {
        self.selection.device_type = Some(device_type);
        self.selection.device_subtype = None;
        self.selection.devices.clear();
        self.publish();
    }

    pub fn set_device_subtype(&mut self, subtype: DeviceSubtype) {
        self.selection.device_subtype = Some(subtype);
        self.selection.devices.clear();
        self.publish();
    }

    pub fn toggle_device_selection(&mut self, device: &Device) {
        if self.selection.devices.shift_remove(&device.id).is_none() {
            self.selection
                .devices
                .insert(device.id.clone(), device.clone());
        }
        debug!(
            device = %device.id,
            selected = self.selection.devices.len(),
            "toggled device"
        );
        self.publish();
    }

    /// A different switch drops the port chosen on the previous one.
    pub fn set_commutator(&mut self, commutator: Commutator) {
        let changed = self
            .selection
            .commutator
            .as_ref()
            .is_none_or(|current| current.id != commutator.id);
        if changed {
            self.selection.port = None;
        }
        self.selection.commutator = Some(commutator);
        self.publish();
    }

    pub fn set_port(&mut self, port: Port) {
        self.selection.port = Some(port);
        self.publish();
    }

    /// Mark every selected catalog device as configured, then reset.
    pub fn complete_configuration(&mut self) {
        let mut configured = Vec::new();
        for device in &mut self.devices {
            if self.selection.devices.contains_key(&device.id) {
                device.is_configured = true;
                configured.push(device.id.to_string());
            }
        }
        info!(devices = ?configured, "configuration completed");
        self.reset();
    }

    pub fn reset(&mut self) {
        self.selection = Selection::default();
        self.publish();
    }

    fn publish(&self) {
        let snap = StoreSnapshot {
            devices: self.devices.clone(),
            commutators: self.commutators.clone(),
            selection: self.selection.clone(),
        };
        // `send_replace` updates even with zero receivers.
        self.snapshot.send_replace(Arc::new(snap));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn device(store: &DeviceStore, id: &str) -> Device {
        store
            .devices()
            .iter()
            .find(|d| d.id.as_str() == id)
            .cloned()
            .unwrap()
    }

    #[test]
    fn setting_type_clears_subtype_and_devices() {
        let mut store = DeviceStore::default();
        store.set_device_type(DeviceType::CallPanel);
        store.set_device_subtype(DeviceSubtype::MainEntrance);
        let d = device(&store, "1");
        store.toggle_device_selection(&d);

        store.set_device_type(DeviceType::Camera);

        assert_eq!(store.selection().device_type, Some(DeviceType::Camera));
        assert_eq!(store.selection().device_subtype, None);
        assert!(store.selection().devices.is_empty());
    }

    #[test]
    fn setting_subtype_clears_devices_only() {
        let mut store = DeviceStore::default();
        store.set_device_type(DeviceType::CallPanel);
        let d = device(&store, "3");
        store.toggle_device_selection(&d);
        store.set_commutator(store.commutators()[0].clone());

        store.set_device_subtype(DeviceSubtype::Gate);

        assert!(store.selection().devices.is_empty());
        assert_eq!(store.selection().device_type, Some(DeviceType::CallPanel));
        assert!(store.selection().commutator.is_some());
    }

    #[test]
    fn toggle_twice_restores_selection() {
        let mut store = DeviceStore::default();
        let a = device(&store, "1");
        let b = device(&store, "2");
        store.toggle_device_selection(&a);
        let before = store.selection().clone();

        store.toggle_device_selection(&b);
        store.toggle_device_selection(&b);

        assert_eq!(store.selection(), &before);
        assert!(store.is_device_selected(&a));
        assert!(!store.is_device_selected(&b));
    }

    #[test]
    fn toggle_keeps_insertion_order() {
        let mut store = DeviceStore::default();
        for id in ["2", "1", "3"] {
            let d = device(&store, id);
            store.toggle_device_selection(&d);
        }
        let order: Vec<&str> = store.selection().devices.keys().map(DeviceId::as_str).collect();
        assert_eq!(order, vec!["2", "1", "3"]);
    }

    #[test]
    fn complete_marks_exactly_the_selection() {
        let mut store = DeviceStore::default();
        let a = device(&store, "1");
        let c = device(&store, "3");
        store.toggle_device_selection(&a);
        store.toggle_device_selection(&c);
        // Unknown ids are skipped silently.
        store.toggle_device_selection(&Device::new(
            "99",
            "Ghost",
            DeviceType::Camera,
            DeviceSubtype::Internal,
        ));

        store.complete_configuration();

        let configured: Vec<&str> = store
            .devices()
            .iter()
            .filter(|d| d.is_configured)
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(configured, vec!["1", "3"]);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn reset_clears_all_fields() {
        let mut store = DeviceStore::default();
        store.apply(StoreCommand::SetDeviceType(DeviceType::CallPanel));
        store.apply(StoreCommand::SetDeviceSubtype(DeviceSubtype::Gate));
        store.apply(StoreCommand::ToggleDevice(device(&store, "3")));
        store.apply(StoreCommand::SetCommutator(store.commutators()[1].clone()));
        store.apply(StoreCommand::SetPort(Port::new(4, true, false)));

        store.apply(StoreCommand::Reset);

        assert!(store.selection().is_empty());
    }

    #[test]
    fn devices_for_selection_filters_and_puts_unconfigured_first() {
        let mut store = DeviceStore::default();
        let first = device(&store, "1");
        store.toggle_device_selection(&first);
        store.complete_configuration();

        store.set_device_type(DeviceType::CallPanel);
        store.set_device_subtype(DeviceSubtype::MainEntrance);

        let ids: Vec<String> = store
            .devices_for_selection()
            .into_iter()
            .map(|d| d.id.to_string())
            .collect();
        assert_eq!(ids, vec!["2".to_owned(), "1".to_owned()]);
    }

    #[test]
    fn devices_for_selection_needs_type_and_subtype() {
        let mut store = DeviceStore::default();
        assert!(store.devices_for_selection().is_empty());

        store.set_device_type(DeviceType::CallPanel);
        assert!(store.devices_for_selection().is_empty());

        store.set_device_subtype(DeviceSubtype::MainEntrance);
        assert!(!store.devices_for_selection().is_empty());
    }

    #[test]
    fn switching_commutator_drops_the_port() {
        let mut store = DeviceStore::default();
        let first = store.commutators()[0].clone();
        let second = store.commutators()[1].clone();
        store.set_commutator(first.clone());
        store.set_port(Port::new(3, true, false));

        store.set_commutator(first);
        assert_eq!(store.selection().port.as_ref().map(|p| p.id), Some(3));

        store.set_commutator(second.clone());
        assert_eq!(store.selection().port, None);
        assert_eq!(store.selection().commutator, Some(second));
    }

    #[tokio::test]
    async fn subscribers_see_every_mutation() {
        let mut store = DeviceStore::default();
        let mut rx = store.subscribe();

        store.set_device_type(DeviceType::Camera);
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow().selection.device_type,
            Some(DeviceType::Camera)
        );

        store.reset();
        rx.changed().await.unwrap();
        assert!(rx.borrow().selection.is_empty());
    }
}

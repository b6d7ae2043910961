// ── Access key registry ──
//
// Keys bound to apartments (or to the common area), the manual add/edit
// form rules, and the guided entrance → apartment → NFC → name flow.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoreError;

pub const COMMON_APARTMENT: &str = "Common";
pub const ENTRANCE_COUNT: usize = 4;
pub const APARTMENTS_PER_PICKER: u16 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: u32,
    pub apartment: String,
    pub identifier: String,
    pub name: Option<String>,
}

/// Which column the search box matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeySearch {
    #[default]
    Identifier,
    Apartment,
}

impl KeySearch {
    pub fn toggle(self) -> Self {
        match self {
            Self::Identifier => Self::Apartment,
            Self::Apartment => Self::Identifier,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Identifier => "Search by identifier",
            Self::Apartment => "Search by apartment",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyRegistry {
    keys: Vec<Key>,
    next_id: u32,
    /// Panel-side option: also accept identifiers read in reverse byte order.
    pub reverse_identifier_check: bool,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        let seed = [
            ("3", "00000030F5304E"),
            ("3", "0000030F5304D1"),
            ("3", "0000030F5304D3"),
            ("1", "0000043A6B9C1"),
            (COMMON_APARTMENT, "0000001DA5F2AB"),
            ("57", "0000000B1D2E1D"),
            (COMMON_APARTMENT, "0000030F5304D5"),
            ("2", "0000030F5301D1"),
        ];
        let mut registry = Self {
            keys: Vec::new(),
            next_id: 1,
            reverse_identifier_check: true,
        };
        for (apartment, identifier) in seed {
            registry.push(apartment, identifier, None);
        }
        registry
    }
}

impl KeyRegistry {
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn get(&self, id: u32) -> Option<&Key> {
        self.keys.iter().find(|k| k.id == id)
    }

    /// Case-insensitive substring search. An empty query keeps every key.
    pub fn filter(&self, query: &str, by: KeySearch) -> Vec<Key> {
        let needle = query.trim().to_lowercase();
        self.keys
            .iter()
            .filter(|k| {
                needle.is_empty()
                    || match by {
                        KeySearch::Apartment => k.apartment.to_lowercase().contains(&needle),
                        KeySearch::Identifier => k.identifier.to_lowercase().contains(&needle),
                    }
            })
            .cloned()
            .collect()
    }

    pub fn edit(&mut self, id: u32, apartment: &str, identifier: &str) -> Result<(), CoreError> {
        require_both(apartment, identifier)?;
        let key = self
            .keys
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| CoreError::not_found("Key", id.to_string()))?;
        key.apartment = apartment.trim().to_owned();
        key.identifier = identifier.trim().to_owned();
        info!(id, "key updated");
        Ok(())
    }

    pub fn add_manual(&mut self, apartment: &str, identifier: &str) -> Result<u32, CoreError> {
        require_both(apartment, identifier)?;
        let id = self.push(apartment.trim(), identifier.trim(), None);
        info!(id, "key added");
        Ok(id)
    }

    pub fn delete(&mut self, id: u32) -> Result<Key, CoreError> {
        let pos = self
            .keys
            .iter()
            .position(|k| k.id == id)
            .ok_or_else(|| CoreError::not_found("Key", id.to_string()))?;
        info!(id, "key deleted");
        Ok(self.keys.remove(pos))
    }

    /// Bind a freshly read key. An identifier can be bound only once.
    pub fn register_scanned(
        &mut self,
        apartment: &str,
        identifier: &str,
        name: &str,
    ) -> Result<u32, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("Enter a key name"));
        }
        if identifier.is_empty() {
            return Err(CoreError::KeyReadFailed);
        }
        if self.keys.iter().any(|k| k.identifier == identifier) {
            return Err(CoreError::DuplicateKey {
                identifier: identifier.to_owned(),
            });
        }
        let id = self.push(apartment, identifier, Some(name.trim().to_owned()));
        info!(id, apartment, "scanned key registered");
        Ok(id)
    }

    fn push(&mut self, apartment: &str, identifier: &str, name: Option<String>) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.keys.push(Key {
            id,
            apartment: apartment.to_owned(),
            identifier: identifier.to_owned(),
            name,
        });
        id
    }
}

fn require_both(apartment: &str, identifier: &str) -> Result<(), CoreError> {
    if apartment.trim().is_empty() || identifier.trim().is_empty() {
        return Err(CoreError::validation("Fill in all fields"));
    }
    Ok(())
}

// ── Guided add-key flow ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddKeyStep {
    Entrance,
    Apartment,
    Nfc,
    Name,
}

impl AddKeyStep {
    pub fn title(self) -> &'static str {
        match self {
            Self::Entrance => "Select entrance",
            Self::Apartment => "Select apartment",
            Self::Nfc => "Read key",
            Self::Name => "Key name",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NfcState {
    #[default]
    Idle,
    Reading,
    Failed,
    Read(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddKeyFlow {
    step: AddKeyStep,
    entrance: Option<usize>,
    apartment: Option<u16>,
    nfc: NfcState,
    pub name: String,
}

impl Default for AddKeyFlow {
    fn default() -> Self {
        Self {
            step: AddKeyStep::Entrance,
            entrance: None,
            apartment: None,
            nfc: NfcState::Idle,
            name: String::new(),
        }
    }
}

impl AddKeyFlow {
    pub fn entrances() -> impl Iterator<Item = String> {
        (1..=ENTRANCE_COUNT).map(|n| format!("Entrance {n}"))
    }

    pub fn apartments() -> impl Iterator<Item = u16> {
        1..=APARTMENTS_PER_PICKER
    }

    pub fn step(&self) -> AddKeyStep {
        self.step
    }

    pub fn nfc(&self) -> &NfcState {
        &self.nfc
    }

    pub fn entrance(&self) -> Option<usize> {
        self.entrance
    }

    pub fn apartment(&self) -> Option<u16> {
        self.apartment
    }

    /// `index` is 1-based.
    pub fn select_entrance(&mut self, index: usize) {
        if (1..=ENTRANCE_COUNT).contains(&index) {
            self.entrance = Some(index);
            self.step = AddKeyStep::Apartment;
        }
    }

    pub fn select_apartment(&mut self, number: u16) {
        if (1..=APARTMENTS_PER_PICKER).contains(&number) {
            self.apartment = Some(number);
            self.nfc = NfcState::Idle;
            self.step = AddKeyStep::Nfc;
        }
    }

    /// Returns `false` if a read is already running or the flow is elsewhere.
    pub fn begin_read(&mut self) -> bool {
        if self.step != AddKeyStep::Nfc || self.nfc == NfcState::Reading {
            return false;
        }
        self.nfc = NfcState::Reading;
        true
    }

    pub fn finish_read(&mut self, outcome: Result<String, CoreError>) {
        if self.nfc != NfcState::Reading {
            return;
        }
        match outcome {
            Ok(identifier) => {
                self.nfc = NfcState::Read(identifier);
                self.step = AddKeyStep::Name;
            }
            Err(_) => self.nfc = NfcState::Failed,
        }
    }

    /// From the name step, drop the scanned id and read again.
    pub fn rescan(&mut self) {
        self.nfc = NfcState::Idle;
        self.step = AddKeyStep::Nfc;
    }

    /// Step back. Returns `false` when already at the first step.
    pub fn back(&mut self) -> bool {
        self.step = match self.step {
            AddKeyStep::Entrance => return false,
            AddKeyStep::Apartment => AddKeyStep::Entrance,
            AddKeyStep::Nfc => {
                self.nfc = NfcState::Idle;
                AddKeyStep::Apartment
            }
            AddKeyStep::Name => {
                self.nfc = NfcState::Idle;
                AddKeyStep::Nfc
            }
        };
        true
    }

    pub fn scanned_identifier(&self) -> Option<&str> {
        match &self.nfc {
            NfcState::Read(id) => Some(id),
            _ => None,
        }
    }

    /// Commit the flow into the registry.
    pub fn register(&self, registry: &mut KeyRegistry) -> Result<u32, CoreError> {
        let apartment = self
            .apartment
            .map(|n| n.to_string())
            .ok_or_else(|| CoreError::validation("Select an apartment"))?;
        let identifier = self.scanned_identifier().unwrap_or_default();
        registry.register_scanned(&apartment, identifier, &self.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn seed_has_eight_keys() {
        let reg = KeyRegistry::default();
        assert_eq!(reg.keys().len(), 8);
        assert!(reg.reverse_identifier_check);
    }

    #[test]
    fn filter_by_identifier_is_case_insensitive() {
        let reg = KeyRegistry::default();
        let hits = reg.filter("f5304d", KeySearch::Identifier);
        assert_eq!(hits.len(), 3);
        assert_eq!(reg.filter("", KeySearch::Identifier).len(), 8);
    }

    #[test]
    fn filter_by_apartment() {
        let reg = KeyRegistry::default();
        let hits = reg.filter("common", KeySearch::Apartment);
        assert_eq!(hits.len(), 2);
        assert!(reg.filter("57", KeySearch::Identifier).is_empty());
    }

    #[test]
    fn manual_add_requires_both_fields() {
        let mut reg = KeyRegistry::default();
        assert_eq!(
            reg.add_manual("  ", "ABC"),
            Err(CoreError::validation("Fill in all fields"))
        );
        let id = reg.add_manual("12", "ABCDEF").unwrap();
        assert_eq!(reg.get(id).unwrap().apartment, "12");
    }

    #[test]
    fn edit_and_delete() {
        let mut reg = KeyRegistry::default();
        reg.edit(1, "4", "FFFF").unwrap();
        assert_eq!(reg.get(1).unwrap().identifier, "FFFF");
        reg.delete(1).unwrap();
        assert!(reg.get(1).is_none());
        assert!(matches!(reg.delete(1), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn scanned_duplicate_is_rejected() {
        let mut reg = KeyRegistry::default();
        let err = reg
            .register_scanned("5", "0000030F5304D1", "Front door")
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { .. }));
        assert_eq!(
            reg.register_scanned("5", "ABCD", " "),
            Err(CoreError::validation("Enter a key name"))
        );
    }

    #[test]
    fn flow_walks_all_steps() {
        let mut flow = AddKeyFlow::default();
        flow.select_entrance(2);
        assert_eq!(flow.step(), AddKeyStep::Apartment);
        flow.select_apartment(17);
        assert_eq!(flow.step(), AddKeyStep::Nfc);

        assert!(flow.begin_read());
        assert!(!flow.begin_read());
        flow.finish_read(Err(CoreError::KeyReadFailed));
        assert_eq!(flow.nfc(), &NfcState::Failed);

        assert!(flow.begin_read());
        flow.finish_read(Ok("A1B2C3D4E5F607".into()));
        assert_eq!(flow.step(), AddKeyStep::Name);

        flow.name = "Courier".into();
        let mut reg = KeyRegistry::default();
        let id = flow.register(&mut reg).unwrap();
        let key = reg.get(id).unwrap();
        assert_eq!(key.apartment, "17");
        assert_eq!(key.name.as_deref(), Some("Courier"));
    }

    #[test]
    fn rescan_and_back_clear_the_identifier() {
        let mut flow = AddKeyFlow::default();
        flow.select_entrance(1);
        flow.select_apartment(1);
        flow.begin_read();
        flow.finish_read(Ok("AA".into()));
        flow.rescan();
        assert_eq!(flow.step(), AddKeyStep::Nfc);
        assert_eq!(flow.scanned_identifier(), None);

        assert!(flow.back());
        assert!(flow.back());
        assert_eq!(flow.step(), AddKeyStep::Entrance);
        assert!(!flow.back());
    }
}

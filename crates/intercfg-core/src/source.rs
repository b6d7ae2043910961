// ── Injectable hardware sources ──
//
// Everything that would talk to real hardware (switch port probing, NFC
// reads, wall clock, clipboard) sits behind a trait so screens can be
// driven by seeded simulations in the app and fixed values in tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Commutator, Port};

/// Length of an NFC key identifier in hex digits.
pub const KEY_IDENTIFIER_LEN: usize = 14;

// ── Port scanning ────────────────────────────────────────────────────

pub trait PortScanner: Send + Sync {
    /// Report the ports of `commutator`, numbered `1..=available_ports`.
    fn scan(&self, commutator: &Commutator) -> Vec<Port>;
}

/// Produces a pseudo-random port layout that is stable per switch.
#[derive(Debug, Clone)]
pub struct SimulatedPortScanner {
    seed: u64,
    available_ratio: f64,
    disconnected_ratio: f64,
}

impl SimulatedPortScanner {
    pub const DEFAULT_AVAILABLE_RATIO: f64 = 0.7;
    pub const DEFAULT_DISCONNECTED_RATIO: f64 = 0.2;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            available_ratio: Self::DEFAULT_AVAILABLE_RATIO,
            disconnected_ratio: Self::DEFAULT_DISCONNECTED_RATIO,
        }
    }

    pub fn with_ratios(mut self, available: f64, disconnected: f64) -> Self {
        self.available_ratio = available.clamp(0.0, 1.0);
        self.disconnected_ratio = disconnected.clamp(0.0, 1.0);
        self
    }

    fn rng_for(&self, commutator: &Commutator) -> StdRng {
        StdRng::seed_from_u64(switch_seed(self.seed, commutator.id.as_str()))
    }
}

/// Per-switch seed: FNV-1a over the switch id, folded into the session
/// seed and finished with the splitmix64 mixer. Fixed across toolchains.
fn switch_seed(seed: u64, id: &str) -> u64 {
    let id_hash = id.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    });
    let mut z = (seed ^ id_hash).wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl PortScanner for SimulatedPortScanner {
    fn scan(&self, commutator: &Commutator) -> Vec<Port> {
        let mut rng = self.rng_for(commutator);
        let ports: Vec<Port> = (1..=commutator.available_ports)
            .map(|id| {
                let available = rng.gen_bool(self.available_ratio);
                let disconnected = rng.gen_bool(self.disconnected_ratio);
                Port::new(id, available, disconnected)
            })
            .collect();
        debug!(
            commutator = %commutator.id,
            total = ports.len(),
            available = ports.iter().filter(|p| p.is_available).count(),
            "scanned ports"
        );
        ports
    }
}

/// Returns the same ports for every switch.
#[derive(Debug, Clone, Default)]
pub struct FixedPortScanner(pub Vec<Port>);

impl PortScanner for FixedPortScanner {
    fn scan(&self, _commutator: &Commutator) -> Vec<Port> {
        self.0.clone()
    }
}

// ── NFC key reading ──────────────────────────────────────────────────

pub trait KeyReader: Send + Sync {
    /// Attempt a single key read. Any delay is the caller's concern.
    fn read_key(&self) -> Result<String, CoreError>;
}

#[derive(Debug, Clone)]
pub struct SimulatedNfcReader {
    rng: Arc<Mutex<StdRng>>,
    success_ratio: f64,
}

impl SimulatedNfcReader {
    pub const DEFAULT_SUCCESS_RATIO: f64 = 0.7;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            success_ratio: Self::DEFAULT_SUCCESS_RATIO,
        }
    }

    pub fn with_success_ratio(mut self, ratio: f64) -> Self {
        self.success_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}

impl KeyReader for SimulatedNfcReader {
    fn read_key(&self) -> Result<String, CoreError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if !rng.gen_bool(self.success_ratio) {
            debug!("simulated key read failed");
            return Err(CoreError::KeyReadFailed);
        }
        let identifier: String = (0..KEY_IDENTIFIER_LEN)
            .map(|_| {
                let nibble: u32 = rng.gen_range(0..16);
                char::from_digit(nibble, 16).map_or('0', |c| c.to_ascii_uppercase())
            })
            .collect();
        debug!(%identifier, "simulated key read");
        Ok(identifier)
    }
}

/// Replays a scripted sequence of read outcomes, then fails.
#[derive(Debug, Default)]
pub struct ScriptedKeyReader {
    outcomes: Mutex<Vec<Result<String, CoreError>>>,
}

impl ScriptedKeyReader {
    pub fn new(outcomes: Vec<Result<String, CoreError>>) -> Self {
        let mut outcomes = outcomes;
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
        }
    }
}

impl KeyReader for ScriptedKeyReader {
    fn read_key(&self) -> Result<String, CoreError> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or(Err(CoreError::KeyReadFailed))
    }
}

// ── Clock ────────────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Panel-style timestamp, e.g. `05.03.2025 — 14:07:09`.
pub fn format_panel_time(at: &DateTime<Local>) -> String {
    at.format("%d.%m.%Y — %H:%M:%S").to_string()
}

// ── Clipboard ────────────────────────────────────────────────────────

pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str);
}

/// In-process clipboard that remembers the last copied value.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn last(&self) -> Option<String> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&self, text: &str) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_owned());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn switch(id: &str, ports: u16) -> Commutator {
        Commutator::new(id, format!("Switch {id}"), ports)
    }

    #[test]
    fn simulated_scan_numbers_ports_from_one() {
        let ports = SimulatedPortScanner::new(7).scan(&switch("1", 24));
        let ids: Vec<u16> = ports.iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=24).collect::<Vec<_>>());
        assert_eq!(ports[0].name, "Port 1");
    }

    #[test]
    fn simulated_scan_is_stable_per_switch() {
        let scanner = SimulatedPortScanner::new(42);
        let first = scanner.scan(&switch("1", 24));
        let again = scanner.scan(&switch("1", 24));
        assert_eq!(first, again);
    }

    #[test]
    fn switch_seed_is_a_fixed_function() {
        assert_eq!(switch_seed(0, ""), 0xc381_7c01_6ba4_ff30);
        assert_eq!(switch_seed(42, "1"), 0xe7ab_feed_b2e8_03cf);
        assert_eq!(switch_seed(42, "2"), 0x7b56_7395_39f6_27b8);
        assert_ne!(switch_seed(42, "1"), switch_seed(43, "1"));
    }

    #[test]
    fn scans_repeat_across_scanner_instances() {
        let first = SimulatedPortScanner::new(42).scan(&switch("1", 24));
        let second = SimulatedPortScanner::new(42).scan(&switch("1", 24));
        assert_eq!(first, second);
        assert_ne!(first, SimulatedPortScanner::new(42).scan(&switch("2", 24)));
    }

    #[test]
    fn ratios_at_the_extremes_are_exact() {
        let all = SimulatedPortScanner::new(1).with_ratios(1.0, 0.0);
        assert!(all.scan(&switch("2", 16)).iter().all(|p| p.is_available && !p.is_disconnected));

        let none = SimulatedPortScanner::new(1).with_ratios(0.0, 1.0);
        assert!(none.scan(&switch("2", 16)).iter().all(|p| !p.is_available && p.is_disconnected));
    }

    #[test]
    fn nfc_reader_yields_uppercase_hex_of_fixed_length() {
        let reader = SimulatedNfcReader::new(3).with_success_ratio(1.0);
        let id = reader.read_key().unwrap();
        assert_eq!(id.len(), KEY_IDENTIFIER_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn nfc_reader_fails_when_ratio_is_zero() {
        let reader = SimulatedNfcReader::new(3).with_success_ratio(0.0);
        assert_eq!(reader.read_key(), Err(CoreError::KeyReadFailed));
    }

    #[test]
    fn scripted_reader_replays_in_order() {
        let reader = ScriptedKeyReader::new(vec![Err(CoreError::KeyReadFailed), Ok("ABC".into())]);
        assert!(reader.read_key().is_err());
        assert_eq!(reader.read_key().unwrap(), "ABC");
        assert!(reader.read_key().is_err());
    }

    #[test]
    fn panel_time_format() {
        let at = Local.with_ymd_and_hms(2025, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(format_panel_time(&at), "05.03.2025 — 14:07:09");
        assert_eq!(format_panel_time(&FixedClock(at).now()), "05.03.2025 — 14:07:09");
    }

    #[test]
    fn memory_clipboard_keeps_last_value() {
        let clip = MemoryClipboard::default();
        assert_eq!(clip.last(), None);
        clip.set_text("pool.ntp.org");
        clip.set_text("ntp.example.net");
        assert_eq!(clip.last().as_deref(), Some("ntp.example.net"));
    }
}

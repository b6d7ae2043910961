//! Everything a screen may read when it is created.

use std::sync::Arc;
use std::time::Duration;

use intercfg_config::{Config, SimulationConfig};
use intercfg_core::{
    Clipboard, Clock, KeyReader, MemoryClipboard, PanelState, PortScanner, SimulatedNfcReader,
    SimulatedPortScanner, StoreSnapshot, SystemClock,
};

/// Hardware stand-ins shared by every screen.
#[derive(Clone)]
pub struct Sources {
    pub ports: Arc<dyn PortScanner>,
    pub keys: Arc<dyn KeyReader>,
    pub clock: Arc<dyn Clock>,
    pub clipboard: Arc<dyn Clipboard>,
}

impl Sources {
    /// Seeded simulations. Without a configured seed a fresh one is drawn.
    pub fn simulated(sim: &SimulationConfig) -> (Self, u64) {
        let seed = sim.seed.unwrap_or_else(rand::random);
        let sources = Self {
            ports: Arc::new(
                SimulatedPortScanner::new(seed)
                    .with_ratios(sim.port_available_ratio, sim.port_disconnected_ratio),
            ),
            keys: Arc::new(
                SimulatedNfcReader::new(seed).with_success_ratio(sim.nfc_success_ratio),
            ),
            clock: Arc::new(SystemClock),
            clipboard: Arc::new(MemoryClipboard::default()),
        };
        (sources, seed)
    }
}

/// Timings screens pull out of the config.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub nfc_read_delay: Duration,
    pub configure_duration: Duration,
    pub page_size: usize,
}

impl From<&Config> for Timings {
    fn from(cfg: &Config) -> Self {
        Self {
            nfc_read_delay: cfg.simulation.nfc_read_delay(),
            configure_duration: cfg.simulation.configure_duration(),
            page_size: cfg.ui.page_size,
        }
    }
}

/// Borrowed view handed to the screen factory.
pub struct ScreenContext<'a> {
    pub store: Arc<StoreSnapshot>,
    pub panel: &'a PanelState,
    pub sources: &'a Sources,
    pub timings: Timings,
}

#[cfg(test)]
pub mod fixtures {
    use chrono::{Local, TimeZone};
    use intercfg_core::{FixedClock, FixedPortScanner, Port, ScriptedKeyReader};

    use super::*;

    pub fn sources() -> Sources {
        Sources {
            ports: Arc::new(FixedPortScanner(vec![
                Port::new(1, true, false),
                Port::new(2, false, true),
                Port::new(3, true, false),
            ])),
            keys: Arc::new(ScriptedKeyReader::new(vec![Ok("04A1B2C3D4E5F6".into())])),
            clock: Arc::new(FixedClock(
                Local
                    .with_ymd_and_hms(2025, 6, 19, 12, 30, 5)
                    .single()
                    .unwrap_or_else(Local::now),
            )),
            clipboard: Arc::new(MemoryClipboard::default()),
        }
    }

    pub fn timings() -> Timings {
        Timings {
            nfc_read_delay: Duration::from_millis(10),
            configure_duration: Duration::from_millis(1000),
            page_size: 20,
        }
    }
}

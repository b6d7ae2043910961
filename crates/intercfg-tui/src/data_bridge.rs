//! Data bridge — forwards [`DeviceStore`](intercfg_core::DeviceStore)
//! snapshots into the TUI action loop.
//!
//! Runs as a background task holding a `watch` receiver. Every published
//! snapshot becomes an [`Action::StoreUpdated`], so screens further down
//! the stack stay in sync with wizard selections made above them.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use intercfg_core::StoreSnapshot;

use crate::action::Action;

pub async fn spawn_store_bridge(
    mut snapshots: watch::Receiver<Arc<StoreSnapshot>>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!("store dropped, stopping bridge");
                    break;
                }
                let snapshot = Arc::clone(&snapshots.borrow_and_update());
                if action_tx.send(Action::StoreUpdated(snapshot)).is_err() {
                    break;
                }
            }
        }
    }
    debug!("store bridge shut down");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use intercfg_core::{DeviceStore, DeviceType, StoreCommand};

    #[tokio::test]
    async fn forwards_store_changes() {
        let mut store = DeviceStore::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(spawn_store_bridge(store.subscribe(), tx, cancel.clone()));

        store.apply(StoreCommand::SetDeviceType(DeviceType::Camera));

        let Some(Action::StoreUpdated(snapshot)) = rx.recv().await else {
            panic!("expected a store update");
        };
        assert_eq!(snapshot.selection.device_type, Some(DeviceType::Camera));

        cancel.cancel();
        task.await.unwrap();
    }
}

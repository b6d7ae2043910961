//! Terminal input for the configurator.
//!
//! A background task merges crossterm input with two timers. Ticks drive
//! the panel clock on the date/time screen, the configuration progress and
//! throbber, the running-line preview and toast expiry. Renders redraw the
//! frame. Both rates come from `[ui]` in the config file.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
pub enum Event {
    /// Key press, or a held key repeating.
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    Tick,
    Render,
}

/// Maps raw terminal input onto the events the app handles. Key releases,
/// mouse, focus and paste input are dropped.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
            Some(Event::Key(key))
        }
        CrosstermEvent::Resize(cols, rows) => Some(Event::Resize(cols, rows)),
        _ => None,
    }
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut input = EventStream::new();
            let mut ticks = tokio::time::interval(tick_rate);
            let mut renders = tokio::time::interval(render_rate);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            renders.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    () = task_cancel.cancelled() => break,
                    _ = ticks.tick() => Event::Tick,
                    _ = renders.tick() => Event::Render,
                    Some(Ok(raw)) = input.next() => match translate(raw) {
                        Some(event) => event,
                        None => continue,
                    },
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
            debug!("event reader stopped");
        });

        Self { rx, cancel }
    }

    /// `None` once the reader task has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

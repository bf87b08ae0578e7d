//! Fire-and-forget event sink shared by the coordinators

use livesync_core::prelude::*;
use livesync_core::LiveSyncEvent;
use tokio::sync::broadcast;

/// Capacity of the event channel; slow subscribers lag instead of blocking
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Broadcasts [`LiveSyncEvent`]s to every subscriber.
///
/// Emitting never waits and never fails, so a device pipeline can report
/// progress without being held up by listeners or by other devices.
#[derive(Debug, Clone)]
pub struct EventNotifier {
    event_tx: broadcast::Sender<LiveSyncEvent>,
}

impl Default for EventNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EventNotifier {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { event_tx }
    }

    /// Subscribe to events emitted from now on.
    ///
    /// Subscribers that fall more than the channel capacity behind miss the
    /// oldest events; use `broadcast::error::RecvError::Lagged` to detect this.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveSyncEvent> {
        self.event_tx.subscribe()
    }

    pub fn emit(&self, event: LiveSyncEvent) {
        trace!(
            "Emitting {} for device {}",
            event.event_type(),
            event.device_identifier()
        );
        let _ = self.event_tx.send(event);
    }
}

/// Collect every event currently buffered for `rx`
#[cfg(test)]
pub(crate) fn drain(rx: &mut broadcast::Receiver<LiveSyncEvent>) -> Vec<LiveSyncEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::host::HostEvent;

// Lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Failed to publish poll state: {0}")]
    PollStateError(String),
}

/// Tracks connected gamepads and owns the snapshot-poll state.
///
/// Exactly one poll exists process-wide: it is switched on when the first
/// gamepad connects and switched off when the last one disconnects. Every
/// connection notification is reported individually; duplicates are never
/// collapsed, but they can never start a second poll either.
pub struct PollLifecycle {
    // Hotplug notifications from the device monitor
    hotplug_rx: mpsc::Receiver<HostEvent>,

    // Poll on/off flag observed by the device monitor
    poll_active: watch::Sender<bool>,

    // Gamepads currently believed connected
    connected: usize,
}

impl PollLifecycle {
    pub fn new(hotplug_rx: mpsc::Receiver<HostEvent>, poll_active: watch::Sender<bool>) -> Self {
        Self {
            hotplug_rx,
            poll_active,
            connected: 0,
        }
    }

    pub fn connected_count(&self) -> usize {
        self.connected
    }

    pub fn is_polling(&self) -> bool {
        *self.poll_active.borrow()
    }

    /// Applies one hotplug notification: reports it and updates the poll
    /// state when the connected count crosses zero in either direction.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<(), LifecycleError> {
        match event {
            HostEvent::Connected {
                index,
                name,
                timestamp,
            } => {
                info!(
                    "Gamepad connected at index {}: {} at {}",
                    index,
                    name,
                    timestamp.format("%H:%M:%S.%3f")
                );
                self.connected += 1;

                if self.is_polling() {
                    debug!(
                        "Snapshot poll already running, {} gamepads connected",
                        self.connected
                    );
                } else {
                    info!("First gamepad present, starting snapshot poll");
                    self.set_poll_active(true)?;
                }
            }
            HostEvent::Disconnected {
                index,
                name,
                timestamp,
            } => {
                info!(
                    "Gamepad disconnected from index {}: {} at {}",
                    index,
                    name,
                    timestamp.format("%H:%M:%S.%3f")
                );
                if self.connected == 0 {
                    warn!("Disconnect notification while no gamepads were tracked");
                }
                self.connected = self.connected.saturating_sub(1);

                if self.connected == 0 && self.is_polling() {
                    info!("Last gamepad removed, stopping snapshot poll");
                    self.set_poll_active(false)?;
                }
            }
        }

        Ok(())
    }

    fn set_poll_active(&self, active: bool) -> Result<(), LifecycleError> {
        self.poll_active
            .send(active)
            .map_err(|e| LifecycleError::PollStateError(e.to_string()))
    }

    /// Observer loop. Runs until the run flag drops or the hotplug channel
    /// closes.
    pub async fn run(mut self, mut run_rx: watch::Receiver<bool>) -> Result<(), LifecycleError> {
        info!("Starting poll lifecycle loop");

        loop {
            tokio::select! {
                changed = run_rx.changed() => {
                    if changed.is_err() || !*run_rx.borrow() {
                        info!("Shutdown signal received, stopping poll lifecycle");
                        break;
                    }
                }

                event = self.hotplug_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event)?,
                        None => {
                            warn!("Hotplug channel closed, stopping poll lifecycle");
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::{connected, disconnected};

    fn lifecycle() -> (PollLifecycle, watch::Receiver<bool>, mpsc::Sender<HostEvent>) {
        let (hotplug_tx, hotplug_rx) = mpsc::channel(16);
        let (poll_tx, poll_rx) = watch::channel(false);
        (PollLifecycle::new(hotplug_rx, poll_tx), poll_rx, hotplug_tx)
    }

    #[test]
    fn first_connection_starts_the_poll() {
        let (mut lifecycle, poll_rx, _tx) = lifecycle();

        lifecycle.handle_event(connected(0, "Test Pad")).unwrap();

        assert_eq!(lifecycle.connected_count(), 1);
        assert!(*poll_rx.borrow());
    }

    #[test]
    fn duplicate_connections_never_start_a_second_poll() {
        let (mut lifecycle, mut poll_rx, _tx) = lifecycle();

        lifecycle.handle_event(connected(0, "Test Pad")).unwrap();
        assert!(poll_rx.has_changed().unwrap());
        poll_rx.mark_unchanged();

        // Same descriptor again: reported and counted, but the poll flag is
        // not re-sent.
        lifecycle.handle_event(connected(0, "Test Pad")).unwrap();

        assert_eq!(lifecycle.connected_count(), 2);
        assert!(*poll_rx.borrow());
        assert!(!poll_rx.has_changed().unwrap());
    }

    #[test]
    fn poll_stops_only_when_the_last_gamepad_leaves() {
        let (mut lifecycle, poll_rx, _tx) = lifecycle();

        lifecycle.handle_event(connected(0, "Test Pad")).unwrap();
        lifecycle.handle_event(connected(1, "Other Pad")).unwrap();

        lifecycle.handle_event(disconnected(0, "Test Pad")).unwrap();
        assert_eq!(lifecycle.connected_count(), 1);
        assert!(*poll_rx.borrow());

        lifecycle
            .handle_event(disconnected(1, "Other Pad"))
            .unwrap();
        assert_eq!(lifecycle.connected_count(), 0);
        assert!(!*poll_rx.borrow());
    }

    #[test]
    fn stray_disconnect_is_reported_without_error() {
        let (mut lifecycle, poll_rx, _tx) = lifecycle();

        lifecycle.handle_event(disconnected(0, "Test Pad")).unwrap();

        assert_eq!(lifecycle.connected_count(), 0);
        assert!(!*poll_rx.borrow());
    }

    #[tokio::test]
    async fn run_loop_applies_events_and_honors_shutdown() {
        let (lifecycle, mut poll_rx, hotplug_tx) = lifecycle();
        let (run_tx, run_rx) = watch::channel(true);

        let task = tokio::spawn(lifecycle.run(run_rx));

        hotplug_tx.send(connected(0, "Test Pad")).await.unwrap();
        poll_rx.changed().await.unwrap();
        assert!(*poll_rx.borrow());

        run_tx.send(false).unwrap();
        task.await.unwrap().unwrap();
    }
}

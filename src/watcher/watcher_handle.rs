//! Watcher Handle - Unified API for gamepad watching
//!
//! Provides a high-level interface over the two watcher tasks: the device
//! monitor (host event pump and snapshot polling) and the poll lifecycle
//! (connection tracking and poll start/stop). Manages task wiring and
//! graceful shutdown.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use super::device_monitor::{DeviceMonitor, MonitorError, MonitorSettings};
pub use super::poll_lifecycle::{LifecycleError, PollLifecycle};
use crate::host::gilrs_host::{GilrsHost, HostError};
use crate::host::GamepadHost;

/// Configuration settings for the complete watcher subsystem.
#[derive(Clone, Debug)]
pub struct WatcherSettings {
    /// Snapshot poll interval in milliseconds.
    ///
    /// How often connected device state is queried and reported while at
    /// least one gamepad is present.
    pub poll_interval_ms: u64,

    /// Host event pump interval in milliseconds.
    ///
    /// How often the host event queue is drained for connection changes.
    /// Lower values surface hotplug events sooner but consume more CPU.
    pub pump_interval_ms: u64,

    /// Analog stick deadzone as a fraction (0.0-1.0).
    ///
    /// Stick readings inside the zone are reported as zero to keep drift
    /// out of the snapshot lines.
    pub joystick_deadzone: f32,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            pump_interval_ms: 10,
            joystick_deadzone: 0.05,
        }
    }
}

/// Errors that can occur during watcher initialization or operation.
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// Host input API could not be initialized.
    #[error("Host error: {0}")]
    HostError(#[from] HostError),

    /// Error from the device monitor task.
    #[error("Monitor error: {0}")]
    MonitorError(#[from] MonitorError),

    /// Error from the poll lifecycle task.
    #[error("Lifecycle error: {0}")]
    LifecycleError(#[from] LifecycleError),

    /// Inter-task communication error.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

/// Handle for managing the watcher subsystem lifecycle.
///
/// Spawns two tokio tasks joined by channels:
///
/// ```text
/// Host ──► DeviceMonitor ──[HostEvent]──► PollLifecycle
///              ▲                               │
///              └───── poll-active flag ────────┘
/// ```
///
/// The handle keeps the run flag and both task handles so the subsystem
/// can be stopped cleanly with [`WatcherHandle::shutdown`].
pub struct WatcherHandle {
    run_tx: watch::Sender<bool>,
    poll_state: watch::Receiver<bool>,
    monitor_task: JoinHandle<()>,
    lifecycle_task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Spawns the watcher over the gilrs host.
    ///
    /// # Errors
    ///
    /// Returns [`WatcherError::HostError`] if the gilrs context cannot be
    /// created (missing input subsystem, unsupported platform).
    pub fn spawn(settings: Option<WatcherSettings>) -> Result<Self, WatcherError> {
        let host = GilrsHost::new()?;
        Self::spawn_with_host(settings, Box::new(host))
    }

    /// Spawns the watcher over an injected host implementation.
    pub fn spawn_with_host(
        settings: Option<WatcherSettings>,
        host: Box<dyn GamepadHost>,
    ) -> Result<Self, WatcherError> {
        info!("Initializing watcher with settings: {:?}", settings);

        // Use default settings if none provided
        let settings = settings.unwrap_or_default();

        let monitor_settings = MonitorSettings {
            pump_interval_ms: settings.pump_interval_ms,
            poll_interval_ms: settings.poll_interval_ms,
            joystick_deadzone: settings.joystick_deadzone,
        };

        // Create inter-task communication channels
        let (hotplug_tx, hotplug_rx) = mpsc::channel(64);
        let (poll_tx, poll_rx) = watch::channel(false);
        let (run_tx, run_rx) = watch::channel(true);
        debug!("Created hotplug channel with buffer capacity 64");

        let monitor =
            DeviceMonitor::create(Some(monitor_settings), host, hotplug_tx, poll_rx.clone())
                .initialize();
        let lifecycle = PollLifecycle::new(hotplug_rx, poll_tx);

        info!("Spawning Device Monitor task");
        let monitor_run = run_rx.clone();
        let monitor_task = tokio::spawn(async move {
            let mut monitor = monitor;
            if let Err(e) = monitor.run_watch_loop(monitor_run).await {
                error!("Device Monitor task terminated with error: {}", e);
            } else {
                info!("Device Monitor task finished");
            }
        });

        info!("Spawning poll lifecycle task");
        let lifecycle_task = tokio::spawn(async move {
            if let Err(e) = lifecycle.run(run_rx).await {
                error!("Poll lifecycle task terminated with error: {}", e);
            } else {
                info!("Poll lifecycle task finished");
            }
        });

        info!("Watcher initialized successfully");
        Ok(Self {
            run_tx,
            poll_state: poll_rx,
            monitor_task,
            lifecycle_task,
        })
    }

    /// Observer for the poll-active flag.
    pub fn poll_state(&self) -> watch::Receiver<bool> {
        self.poll_state.clone()
    }

    /// Flips the run flag and waits for both tasks to stop.
    pub async fn shutdown(self) {
        info!("Stopping watcher tasks");
        if self.run_tx.send(false).is_err() {
            warn!("Watcher tasks already stopped");
        }

        if let Err(e) = self.monitor_task.await {
            error!("Device Monitor task panicked: {}", e);
        }
        if let Err(e) = self.lifecycle_task.await {
            error!("Poll lifecycle task panicked: {}", e);
        }

        info!("Watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::snapshot::DeviceSnapshot;
    use crate::host::testing::{connected, ScriptedHost};
    use tokio::time::{timeout, Duration};

    fn fast_settings() -> WatcherSettings {
        WatcherSettings {
            poll_interval_ms: 20,
            pump_interval_ms: 5,
            joystick_deadzone: 0.05,
        }
    }

    #[tokio::test]
    async fn watcher_starts_polling_once_a_gamepad_connects() {
        let mut host = ScriptedHost::new();
        host.events.push_back(connected(0, "Test Pad"));
        host.slots = vec![Some(DeviceSnapshot::new(0, "Test Pad"))];

        let handle =
            WatcherHandle::spawn_with_host(Some(fast_settings()), Box::new(host)).unwrap();

        let mut poll_state = handle.poll_state();
        timeout(Duration::from_secs(2), poll_state.wait_for(|active| *active))
            .await
            .expect("poll never became active")
            .unwrap();

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn watcher_with_an_idle_host_spawns_and_stops_cleanly() {
        let handle =
            WatcherHandle::spawn_with_host(Some(fast_settings()), Box::new(ScriptedHost::new()))
                .unwrap();

        assert!(!*handle.poll_state().borrow());

        handle.shutdown().await;
    }
}

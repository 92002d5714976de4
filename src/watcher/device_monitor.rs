use chrono::Local;
use statum::{machine, state};
use tokio::sync::{mpsc, watch};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::host::{GamepadHost, HostEvent};

// Monitor settings
#[derive(Clone, Debug)]
pub struct MonitorSettings {
    pub pump_interval_ms: u64,
    pub poll_interval_ms: u64,
    pub joystick_deadzone: f32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            pump_interval_ms: 10,
            poll_interval_ms: 500,
            joystick_deadzone: 0.05,
        }
    }
}

// Monitor errors
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Failed to forward hotplug event: {0}")]
    EventForwardError(String),
}

// Define monitor states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum MonitorState {
    Initializing,
    Watching,
}

#[machine]
pub struct DeviceMonitor<S: MonitorState> {
    // Host input API
    host: Box<dyn GamepadHost>,

    // Monitor settings
    settings: MonitorSettings,

    // Channel for forwarding hotplug notifications to the lifecycle
    hotplug_tx: mpsc::Sender<HostEvent>,

    // Poll on/off flag owned by the lifecycle
    poll_active: watch::Receiver<bool>,
}

// Implementation of methods available in all states
impl<S: MonitorState> DeviceMonitor<S> {
    // Get a reference to the current settings
    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }
}

// Implementation for Initializing state
impl DeviceMonitor<Initializing> {
    pub fn create(
        settings: Option<MonitorSettings>,
        host: Box<dyn GamepadHost>,
        hotplug_tx: mpsc::Sender<HostEvent>,
        poll_active: watch::Receiver<bool>,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        debug!("Creating Device Monitor with settings: {:?}", settings);

        Self::new(host, settings, hotplug_tx, poll_active)
    }

    // Log the starting roster and transition to Watching state
    pub fn initialize(self) -> DeviceMonitor<Watching> {
        if !self.host.supports_snapshots() {
            warn!("Host cannot answer snapshot queries, polls will report nothing");
        }

        let roster = self.host.roster();
        if roster.is_empty() {
            info!("No gamepad connected yet, waiting for hotplug notifications");
        } else {
            info!("Found {} gamepads:", roster.len());
            for (index, name) in &roster {
                info!("  [{}] {}", index, name);
            }
        }

        info!("Device Monitor initialized, transitioning to Watching state");
        self.transition()
    }
}

// Implementation for Monitor in Watching state
impl DeviceMonitor<Watching> {
    // Forward all pending host notifications to the lifecycle channel.
    // Returns how many were forwarded.
    pub fn pump_host_events(&mut self) -> Result<usize, MonitorError> {
        let mut forwarded = 0;

        while let Some(event) = self.host.pump_event() {
            debug!("Host notification: {:?}", event);
            match self.hotplug_tx.try_send(event) {
                Ok(_) => forwarded += 1,
                Err(e) => {
                    error!("Failed to forward hotplug event: {}", e);
                    return Err(MonitorError::EventForwardError(e.to_string()));
                }
            }
        }

        Ok(forwarded)
    }

    // Query the host and report one line per connected device. Returns how
    // many snapshots were reported; an incapable host reports zero.
    pub fn report_snapshots(&mut self) -> usize {
        if !self.host.supports_snapshots() {
            debug!("Snapshot query unsupported by host, nothing to report");
            return 0;
        }

        let deadzone = self.settings.joystick_deadzone;
        let mut reported = 0;

        for mut snapshot in self.host.snapshots() {
            snapshot.apply_deadzone(deadzone);
            info!("{}", snapshot);
            reported += 1;
        }

        if reported == 0 {
            debug!("Poll found no connected gamepads");
        }

        reported
    }

    // Run the monitor loop until the run flag drops
    pub async fn run_watch_loop(
        &mut self,
        mut run_rx: watch::Receiver<bool>,
    ) -> Result<(), MonitorError> {
        let settings = self.settings.clone();
        info!(
            "Starting Device Monitor loop (pump every {} ms, poll every {} ms)",
            settings.pump_interval_ms, settings.poll_interval_ms
        );

        let mut pump_timer = interval(tokio::time::Duration::from_millis(
            settings.pump_interval_ms,
        ));
        let mut poll_timer = interval(tokio::time::Duration::from_millis(
            settings.poll_interval_ms,
        ));

        // Stats for performance monitoring
        let mut events_forwarded = 0;
        let mut polls = 0;
        let mut snapshots_reported = 0;
        let mut last_stats_time = Local::now();
        let stats_interval = chrono::Duration::seconds(30);

        loop {
            tokio::select! {
                changed = run_rx.changed() => {
                    if changed.is_err() || !*run_rx.borrow() {
                        info!("Shutdown signal received, stopping Device Monitor");
                        break;
                    }
                }

                _ = pump_timer.tick() => {
                    match self.pump_host_events() {
                        Ok(n) => events_forwarded += n,
                        // Continue despite errors to maintain the loop
                        Err(e) => error!("Error pumping host events: {}", e),
                    }
                }

                _ = poll_timer.tick() => {
                    if *self.poll_active.borrow() {
                        polls += 1;
                        snapshots_reported += self.report_snapshots();
                    }
                }
            }

            // Log performance stats periodically
            let now = Local::now();
            if now - last_stats_time > stats_interval {
                info!(
                    "Device Monitor stats: {} hotplug events, {} polls, {} snapshots in last {} seconds",
                    events_forwarded,
                    polls,
                    snapshots_reported,
                    (now - last_stats_time).num_seconds()
                );
                events_forwarded = 0;
                polls = 0;
                snapshots_reported = 0;
                last_stats_time = now;
            }
        }

        Ok(())
    }
}

//! Host input API seam
//!
//! The watcher never talks to a gamepad backend directly; everything goes
//! through [`GamepadHost`], which models what a host platform provides:
//! connection and disconnection notifications, a snapshot query over the
//! currently connected devices, and a capability check for hosts that
//! cannot answer snapshot queries at all.

pub mod gilrs_host;
pub mod snapshot;

use chrono::{DateTime, Local};

use self::snapshot::DeviceSnapshot;

/// Connection-state notification delivered by the host platform.
#[derive(Clone, Debug)]
pub enum HostEvent {
    Connected {
        index: usize,
        name: String,
        timestamp: DateTime<Local>,
    },
    Disconnected {
        index: usize,
        name: String,
        timestamp: DateTime<Local>,
    },
}

impl HostEvent {
    pub fn index(&self) -> usize {
        match self {
            HostEvent::Connected { index, .. } => *index,
            HostEvent::Disconnected { index, .. } => *index,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            HostEvent::Connected { name, .. } => name,
            HostEvent::Disconnected { name, .. } => name,
        }
    }
}

/// Interface to the host's gamepad registry.
pub trait GamepadHost: Send {
    /// Whether this host can answer snapshot queries. Hosts without the
    /// capability still deliver connection notifications.
    fn supports_snapshots(&self) -> bool {
        true
    }

    /// Drains the next pending connection notification, advancing any
    /// cached input state along the way. Non-blocking. Devices already
    /// present when watching begins must be reported as `Connected`.
    fn pump_event(&mut self) -> Option<HostEvent>;

    /// Snapshots of all currently connected devices. Absent host slots are
    /// skipped. Hosts without the snapshot capability return an empty vec.
    fn snapshots(&mut self) -> Vec<DeviceSnapshot>;

    /// Devices currently known to the host, as (index, name) pairs.
    fn roster(&self) -> Vec<(usize, String)>;
}

// Scripted stand-in for a host platform, shared by the watcher tests.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use chrono::Local;

    use super::snapshot::DeviceSnapshot;
    use super::{GamepadHost, HostEvent};

    pub(crate) struct ScriptedHost {
        pub events: VecDeque<HostEvent>,
        pub slots: Vec<Option<DeviceSnapshot>>,
        pub snapshot_capable: bool,
    }

    impl ScriptedHost {
        pub fn new() -> Self {
            Self {
                events: VecDeque::new(),
                slots: Vec::new(),
                snapshot_capable: true,
            }
        }
    }

    impl GamepadHost for ScriptedHost {
        fn supports_snapshots(&self) -> bool {
            self.snapshot_capable
        }

        fn pump_event(&mut self) -> Option<HostEvent> {
            self.events.pop_front()
        }

        fn snapshots(&mut self) -> Vec<DeviceSnapshot> {
            if !self.snapshot_capable {
                return Vec::new();
            }
            self.slots.iter().flatten().cloned().collect()
        }

        fn roster(&self) -> Vec<(usize, String)> {
            self.slots
                .iter()
                .flatten()
                .map(|snapshot| (snapshot.index, snapshot.name.clone()))
                .collect()
        }
    }

    pub(crate) fn connected(index: usize, name: &str) -> HostEvent {
        HostEvent::Connected {
            index,
            name: name.to_string(),
            timestamp: Local::now(),
        }
    }

    pub(crate) fn disconnected(index: usize, name: &str) -> HostEvent {
        HostEvent::Disconnected {
            index,
            name: name.to_string(),
            timestamp: Local::now(),
        }
    }
}

//! Watcher subsystem for gamepad hotplug and state reporting
//!
//! Implements a two-task pipeline:
//!
//! 1. [`device_monitor`] - host event pump and snapshot polling
//! 2. [`poll_lifecycle`] - connection tracking and poll start/stop
//! 3. [`watcher_handle`] - unified API and lifecycle management
//!
//! # Architecture
//!
//! ```text
//! Host ──► DeviceMonitor ──[HostEvent]──► PollLifecycle
//!              ▲                               │
//!              └───── poll-active flag ────────┘
//! ```
//!
//! The monitor owns the host and does all the reporting; the lifecycle owns
//! the single process-wide poll and switches it with the first connect and
//! the last disconnect.

pub mod device_monitor;
pub mod poll_lifecycle;
pub mod watcher_handle;

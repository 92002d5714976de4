use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, Gamepad, Gilrs};
use tracing::{debug, error, info};

use super::snapshot::{AxisReading, ButtonReading, DeviceSnapshot, PadAxis, PadButton};
use super::{GamepadHost, HostEvent};

// Host errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Failed to initialize gamepad host: {0}")]
    InitializationError(String),
}

// Helper function to pair gilrs buttons with our layout names
fn button_pairs() -> Vec<(Button, PadButton)> {
    vec![
        (Button::South, PadButton::South),
        (Button::East, PadButton::East),
        (Button::North, PadButton::North),
        (Button::West, PadButton::West),
        (Button::DPadUp, PadButton::DPadUp),
        (Button::DPadDown, PadButton::DPadDown),
        (Button::DPadLeft, PadButton::DPadLeft),
        (Button::DPadRight, PadButton::DPadRight),
        (Button::LeftTrigger, PadButton::LeftBumper),
        (Button::RightTrigger, PadButton::RightBumper),
        (Button::LeftThumb, PadButton::LeftStick),
        (Button::RightThumb, PadButton::RightStick),
        (Button::Start, PadButton::Start),
        (Button::Select, PadButton::Select),
        (Button::Mode, PadButton::Guide),
    ]
}

// Helper function to pair gilrs axes with our layout names
fn axis_pairs() -> Vec<(Axis, PadAxis)> {
    vec![
        (Axis::LeftStickX, PadAxis::LeftStickX),
        (Axis::LeftStickY, PadAxis::LeftStickY),
        (Axis::RightStickX, PadAxis::RightStickX),
        (Axis::RightStickY, PadAxis::RightStickY),
        (Axis::LeftZ, PadAxis::LeftTrigger),
        (Axis::RightZ, PadAxis::RightTrigger),
    ]
}

/// Production [`GamepadHost`] backed by gilrs.
///
/// gilrs reports devices that were already connected when the context was
/// created as `Connected` events, so the watcher sees pre-existing pads
/// without a separate startup scan.
pub struct GilrsHost {
    gilrs: Gilrs,
}

impl GilrsHost {
    pub fn new() -> Result<Self, HostError> {
        info!("Initializing gilrs host interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(HostError::InitializationError(e.to_string()));
            }
        };

        Ok(Self { gilrs })
    }

    fn snapshot_of(index: usize, gamepad: &Gamepad<'_>) -> DeviceSnapshot {
        let mut snapshot = DeviceSnapshot::new(index, gamepad.name());

        for (gilrs_button, button) in button_pairs() {
            snapshot.buttons.push(ButtonReading {
                button,
                pressed: gamepad.is_pressed(gilrs_button),
            });
        }

        for (gilrs_axis, axis) in axis_pairs() {
            if let Some(data) = gamepad.axis_data(gilrs_axis) {
                snapshot.axes.push(AxisReading {
                    axis,
                    value: data.value(),
                });
            }
        }

        snapshot
    }
}

impl GamepadHost for GilrsHost {
    fn pump_event(&mut self) -> Option<HostEvent> {
        // Every queued event has to be consumed so gilrs keeps its cached
        // button and axis state current; only connection changes surface.
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            let now = Local::now();
            match event {
                EventType::Connected => {
                    let name = self.gilrs.gamepad(id).name().to_string();
                    return Some(HostEvent::Connected {
                        index: usize::from(id),
                        name,
                        timestamp: now,
                    });
                }
                EventType::Disconnected => {
                    let name = self.gilrs.gamepad(id).name().to_string();
                    return Some(HostEvent::Disconnected {
                        index: usize::from(id),
                        name,
                        timestamp: now,
                    });
                }
                other => {
                    debug!("Ignoring non-connection gilrs event: {:?}", other);
                }
            }
        }

        None
    }

    fn snapshots(&mut self) -> Vec<DeviceSnapshot> {
        self.gilrs
            .gamepads()
            .map(|(id, gamepad)| Self::snapshot_of(usize::from(id), &gamepad))
            .collect()
    }

    fn roster(&self) -> Vec<(usize, String)> {
        self.gilrs
            .gamepads()
            .map(|(id, gamepad)| (usize::from(id), gamepad.name().to_string()))
            .collect()
    }
}

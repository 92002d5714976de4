use std::fmt;

use chrono::{DateTime, Local};

/// Button layout shared by all host implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PadButton {
    South,
    East,
    North,
    West,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    LeftBumper,
    RightBumper,
    LeftStick,
    RightStick,
    Start,
    Select,
    Guide,
}

/// Analog axes shared by all host implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PadAxis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

#[derive(Clone, Debug)]
pub struct ButtonReading {
    pub button: PadButton,
    pub pressed: bool,
}

#[derive(Clone, Debug)]
pub struct AxisReading {
    pub axis: PadAxis,
    pub value: f32,
}

/// Read-only description of one connected device at the moment of query.
///
/// Snapshots are produced by the host, reported once, and dropped; nothing
/// is retained or compared across polls.
#[derive(Clone, Debug)]
pub struct DeviceSnapshot {
    pub index: usize,
    pub name: String,
    pub buttons: Vec<ButtonReading>,
    pub axes: Vec<AxisReading>,
    pub timestamp: DateTime<Local>,
}

impl DeviceSnapshot {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            buttons: Vec::new(),
            axes: Vec::new(),
            timestamp: Local::now(),
        }
    }

    /// Buttons currently held down.
    pub fn pressed_buttons(&self) -> Vec<PadButton> {
        self.buttons
            .iter()
            .filter(|reading| reading.pressed)
            .map(|reading| reading.button)
            .collect()
    }

    /// Current value of an axis, 0.0 if the host did not report it.
    pub fn axis_value(&self, axis: PadAxis) -> f32 {
        self.axes
            .iter()
            .find(|reading| reading.axis == axis)
            .map(|reading| reading.value)
            .unwrap_or(0.0)
    }

    /// Rescales the stick axes so values inside the deadzone clamp to zero.
    /// Trigger axes are left untouched.
    pub fn apply_deadzone(&mut self, deadzone: f32) {
        for reading in &mut self.axes {
            match reading.axis {
                PadAxis::LeftStickX
                | PadAxis::LeftStickY
                | PadAxis::RightStickX
                | PadAxis::RightStickY => {
                    reading.value = apply_deadzone(reading.value, deadzone);
                }
                PadAxis::LeftTrigger | PadAxis::RightTrigger => {}
            }
        }
    }
}

impl fmt::Display for DeviceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gamepad {} (\"{}\")", self.index, self.name)?;

        let pressed = self.pressed_buttons();
        if pressed.is_empty() {
            write!(f, ": no buttons pressed")?;
        } else {
            write!(f, ": pressed {:?}", pressed)?;
        }

        write!(
            f,
            ", left stick ({:.2}, {:.2}), right stick ({:.2}, {:.2}), triggers ({:.2}, {:.2})",
            self.axis_value(PadAxis::LeftStickX),
            self.axis_value(PadAxis::LeftStickY),
            self.axis_value(PadAxis::RightStickX),
            self.axis_value(PadAxis::RightStickY),
            self.axis_value(PadAxis::LeftTrigger),
            self.axis_value(PadAxis::RightTrigger),
        )
    }
}

// Helper function to apply deadzone to analog stick values
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        // Rescale the value to the range outside the deadzone
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadzone_clamps_small_values_to_zero() {
        assert_eq!(apply_deadzone(0.03, 0.05), 0.0);
        assert_eq!(apply_deadzone(-0.04, 0.05), 0.0);
    }

    #[test]
    fn deadzone_rescales_values_outside_the_zone() {
        // Full deflection stays full deflection
        assert!((apply_deadzone(1.0, 0.05) - 1.0).abs() < f32::EPSILON);
        assert!((apply_deadzone(-1.0, 0.05) + 1.0).abs() < f32::EPSILON);

        // Values just outside the zone rescale towards zero
        let rescaled = apply_deadzone(0.05, 0.05);
        assert!(rescaled >= 0.0 && rescaled < 0.01);
    }

    #[test]
    fn snapshot_deadzone_leaves_triggers_untouched() {
        let mut snapshot = DeviceSnapshot::new(0, "Test Pad");
        snapshot.axes.push(AxisReading {
            axis: PadAxis::LeftStickX,
            value: 0.03,
        });
        snapshot.axes.push(AxisReading {
            axis: PadAxis::LeftTrigger,
            value: 0.03,
        });

        snapshot.apply_deadzone(0.05);

        assert_eq!(snapshot.axis_value(PadAxis::LeftStickX), 0.0);
        assert_eq!(snapshot.axis_value(PadAxis::LeftTrigger), 0.03);
    }

    #[test]
    fn display_reports_index_and_identifier() {
        let mut snapshot = DeviceSnapshot::new(0, "Test Pad");
        snapshot.buttons.push(ButtonReading {
            button: PadButton::South,
            pressed: true,
        });
        snapshot.buttons.push(ButtonReading {
            button: PadButton::Start,
            pressed: false,
        });

        let line = snapshot.to_string();
        assert!(line.contains("gamepad 0"));
        assert!(line.contains("Test Pad"));
        assert!(line.contains("South"));
        assert!(!line.contains("Start"));
    }

    #[test]
    fn missing_axes_read_as_zero() {
        let snapshot = DeviceSnapshot::new(3, "Bare Pad");
        assert_eq!(snapshot.axis_value(PadAxis::RightStickY), 0.0);
    }
}

use std::fmt::{self, Display};

use crate::device::InputDevice;

/// Host level notification, forwarded untouched to the notification handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// The host reported a change in its device setup without details.
    DevicesChanged,
    DeviceAdded(InputDevice),
    DeviceRemoved(InputDevice),
    Connected(InputDevice),
    Disconnected(InputDevice),
    Other(String),
}

impl Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::DevicesChanged => f.write_str("device setup changed"),
            Notification::DeviceAdded(device) => write!(f, "{device} appeared"),
            Notification::DeviceRemoved(device) => write!(f, "{device} went away"),
            Notification::Connected(device) => write!(f, "{device} is connected"),
            Notification::Disconnected(device) => write!(f, "{device} is disconnected"),
            Notification::Other(message) => f.write_str(message),
        }
    }
}

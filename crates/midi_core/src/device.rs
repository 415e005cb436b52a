use std::fmt::{self, Display};

use serde::Serialize;
use thiserror::Error;

/// An input endpoint as listed by the host.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct InputDevice {
    pub name: String,
    pub unique_id: i32,
}

impl InputDevice {
    pub fn new(name: impl Into<String>, unique_id: i32) -> Self {
        Self { name: name.into(), unique_id }
    }
}

impl Display for InputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.unique_id)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("no input device with id {0}")]
    NotFound(i32),
    #[error("{0} is already connected")]
    AlreadyConnected(InputDevice),
    #[error("device {0} is not connected")]
    NotConnected(i32),
}

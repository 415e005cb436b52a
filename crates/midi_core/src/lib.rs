#![allow(forbidden_lint_groups)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod callbacks;
pub mod controller_map;
pub mod decoder;
pub mod device;
pub mod dispatcher;
pub mod event;
pub mod host;
pub mod midi_in;
pub mod midir_host;
pub mod notification;
pub mod packet;

pub use callbacks::CallbackSet;
pub use controller_map::{ControllerConfig, ControllerMap, ControllerMapError};
pub use decoder::{decode, decode_list, decode_message};
pub use device::{DeviceError, InputDevice};
pub use dispatcher::{MidiMap, dispatch};
pub use event::{MODULATION_WHEEL, MidiEvent, SUSTAIN_PEDAL};
pub use host::{MidiHost, PacketSink};
pub use midi_in::{MidiIn, MidiService};
pub use midir_host::MidirHost;
pub use notification::Notification;
pub use packet::{PacketError, PacketList, RawPacket};
pub use parameter::Parameter;
use serde::{Deserialize, Serialize};
pub use wmidi::U7;

/// Which inputs to open and under which client name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiServiceConfig {
    pub client_name: String,
    /// Inputs whose name contains one of these strings are connected.
    pub devices: Vec<String>,
    pub connect_all: bool,
}

impl Default for MidiServiceConfig {
    fn default() -> Self {
        Self { client_name: build::PROJECT_NAME.to_string(), devices: Vec::new(), connect_all: false }
    }
}

impl MidiServiceConfig {
    #[must_use]
    pub fn wants(&self, device: &InputDevice) -> bool {
        self.connect_all || self.devices.iter().any(|pattern| device.name.contains(pattern.as_str()))
    }
}

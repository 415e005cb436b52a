use errors::Result;

use crate::{device::InputDevice, packet::RawPacket};

/// Receives the packets of one connected input, on the host's delivery thread.
pub type PacketSink = Box<dyn FnMut(RawPacket<'_>) + Send + 'static>;

/// Called from a host thread when the device setup changed.
pub type DevicesChangedCallback = Box<dyn Fn() + Send + 'static>;

/// The platform MIDI layer: lists inputs and delivers their packets to a sink.
pub trait MidiHost {
    /// Keeps the input connected for as long as it is alive.
    type Connection;

    fn devices(&self) -> Result<Vec<InputDevice>>;

    fn connect(&self, device: &InputDevice, sink: PacketSink) -> Result<Self::Connection>;

    /// Registers for device setup changes. Hosts without hot-plug support never call back.
    fn watch_devices(&mut self, _callback: DevicesChangedCallback) -> Result<()> {
        Ok(())
    }
}

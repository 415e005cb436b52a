#[cfg(target_os = "macos")]
use errors::Report;
use errors::{LogOptionWithExt, MakeReportExt, Result, error_backtrace};
use itertools::Itertools;
use log::debug;
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};

use crate::{
    device::InputDevice,
    host::{DevicesChangedCallback, MidiHost, PacketSink},
    packet::{MESSAGE_SIZE, RawPacket},
};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME))
}

/// Stable id of a port across listings. CoreMIDI port ids are already the endpoint's unique id, other backends get
/// a hash of their port id string.
#[must_use]
pub fn device_id(port_id: &str) -> i32 {
    port_id.parse().unwrap_or_else(|_| i32::from_be_bytes(fnv1a(port_id.as_bytes()).to_be_bytes()))
}

/// Fits a message delivered by midir into a single slot. Short messages are zero padded, longer ones (system
/// exclusive) don't fit and are dropped.
#[must_use]
pub fn frame_message(data: &[u8]) -> Option<[u8; MESSAGE_SIZE]> {
    if data.is_empty() || data.len() > MESSAGE_SIZE {
        return None;
    }
    let mut slot = [0; MESSAGE_SIZE];
    slot[..data.len()].copy_from_slice(data);
    Some(slot)
}

pub struct MidirHost {
    client_name: String,
    midi_input: MidiInput,
}

impl MidirHost {
    pub fn new(client_name: &str) -> Result<Self> {
        Ok(Self { client_name: client_name.to_string(), midi_input: MidiInput::new(client_name)? })
    }

    fn ports(&self) -> Vec<(MidiInputPort, InputDevice)> {
        self.midi_input
            .ports()
            .into_iter()
            .enumerate()
            .filter_map(|(n, port)| {
                let name = match self.midi_input.port_name(&port) {
                    Ok(name) => name,
                    Err(err) => {
                        error_backtrace!("Could not fetch name, skipping device {n} : {err:?}");
                        return None;
                    }
                };
                let device = InputDevice::new(name, device_id(&port.id()));
                Some((port, device))
            })
            .collect_vec()
    }
}

impl MidiHost for MidirHost {
    type Connection = MidiInputConnection<()>;

    fn devices(&self) -> Result<Vec<InputDevice>> {
        Ok(self.ports().into_iter().map(|(_, device)| device).sorted().collect_vec())
    }

    fn connect(&self, device: &InputDevice, mut sink: PacketSink) -> Result<Self::Connection> {
        let (port, _) = self
            .ports()
            .into_iter()
            .find(|(_, candidate)| candidate.unique_id == device.unique_id)
            .report_msg("Input port went away")?;

        let mut midi_input = MidiInput::new(&self.client_name)?;
        midi_input.ignore(Ignore::All);
        debug!("connecting to {device}");

        midi_input
            .connect(
                &port,
                device.name.as_str(),
                move |timestamp: u64, data: &[u8], (): &mut ()| {
                    if let Some(slot) = frame_message(data) {
                        sink(RawPacket::new(timestamp, 1, &slot));
                    }
                },
                (),
            )
            .report_msg("Unable to listen to input port")
    }

    #[cfg(target_os = "macos")]
    fn watch_devices(&mut self, callback: DevicesChangedCallback) -> Result<()> {
        coremidi_hotplug_notification::receive_device_updates(callback).map_err(Report::msg)
    }

    #[cfg(not(target_os = "macos"))]
    fn watch_devices(&mut self, _callback: DevicesChangedCallback) -> Result<()> {
        Ok(())
    }
}

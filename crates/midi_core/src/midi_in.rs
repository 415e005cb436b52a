use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{Receiver, SyncSender},
    },
    thread,
};

use errors::{MakeReportExt, Report, Result, error_backtrace};
use itertools::Itertools;
use log::{error, info};
use sync::{ArcRwLock, ArcRwLockExt, RwLock};

use crate::{
    device::{DeviceError, InputDevice},
    dispatcher::MidiMap,
    host::{MidiHost, PacketSink},
    notification::Notification,
    packet::RawPacket,
};

/// Connects host inputs to a shared [`MidiMap`].
///
/// Every connection delivers into the same map. The delivery side only ever tries the read lock: a packet arriving
/// while the map is being updated is dropped as a whole and counted in [`MidiIn::dropped_packets`].
pub struct MidiIn<H: MidiHost> {
    host: H,
    midi_map: ArcRwLock<MidiMap>,
    devices: Vec<InputDevice>,
    connections: BTreeMap<i32, (InputDevice, H::Connection)>,
    dropped_packets: Arc<AtomicU64>,
}

impl<H: MidiHost> MidiIn<H> {
    pub fn new(mut host: H, midi_map: MidiMap) -> Result<Self> {
        let midi_map = Arc::new(RwLock::new(midi_map));
        host.watch_devices({
            let midi_map = midi_map.clone();
            Box::new(move || midi_map.get(|midi_map| midi_map.callbacks.notify(&Notification::DevicesChanged)))
        })?;
        let devices = host.devices()?.into_iter().sorted().collect_vec();

        Ok(Self { host, midi_map, devices, connections: BTreeMap::new(), dropped_packets: Arc::default() })
    }

    #[must_use]
    pub fn available_devices(&self) -> &[InputDevice] {
        &self.devices
    }

    /// Queries the host again and reports every device that appeared or went away.
    ///
    /// Devices are matched by `unique_id`: a renamed device keeps its connection. A connected device that went away
    /// is disconnected.
    pub fn update_available_devices(&mut self) -> Result<&[InputDevice]> {
        let devices = self.host.devices()?.into_iter().sorted().collect_vec();
        let removed = self.devices.iter().filter(|device| !has_id(&devices, device.unique_id)).cloned().collect_vec();
        let added = devices.iter().filter(|device| !has_id(&self.devices, device.unique_id)).cloned().collect_vec();
        for device in &devices {
            if let Some((connected, _)) = self.connections.get_mut(&device.unique_id)
                && connected.name != device.name
            {
                info!("{connected} is now named {}", device.name);
                connected.name.clone_from(&device.name);
            }
        }
        self.devices = devices;

        for device in removed {
            info!("{device} went away");
            if self.connections.remove(&device.unique_id).is_some() {
                self.notify(Notification::Disconnected(device.clone()));
            }
            self.notify(Notification::DeviceRemoved(device));
        }
        for device in added {
            info!("{device} appeared");
            self.notify(Notification::DeviceAdded(device));
        }
        Ok(&self.devices)
    }

    pub fn connect(&mut self, unique_id: i32) -> Result<()> {
        if let Some((device, _)) = self.connections.get(&unique_id) {
            return Err(DeviceError::AlreadyConnected(device.clone()).into());
        }
        let device = self
            .devices
            .iter()
            .find(|device| device.unique_id == unique_id)
            .cloned()
            .ok_or(DeviceError::NotFound(unique_id))?;

        let connection = self.host.connect(&device, self.sink())?;
        info!("connected to {device}");
        self.connections.insert(unique_id, (device.clone(), connection));
        self.notify(Notification::Connected(device));
        Ok(())
    }

    pub fn disconnect(&mut self, unique_id: i32) -> Result<()> {
        let (device, connection) = self.connections.remove(&unique_id).ok_or(DeviceError::NotConnected(unique_id))?;
        drop(connection);
        info!("disconnected from {device}");
        self.notify(Notification::Disconnected(device));
        Ok(())
    }

    #[must_use]
    pub fn is_connected(&self, unique_id: i32) -> bool {
        self.connections.contains_key(&unique_id)
    }

    pub fn connected_devices(&self) -> impl Iterator<Item = &InputDevice> {
        self.connections.values().map(|(device, _)| device)
    }

    /// Runs `update` with exclusive access to the map. Packets delivered in the meantime are dropped.
    ///
    /// Must not be called from a handler: handlers run under the read lock.
    pub fn update_midi_map<R>(&self, update: impl FnOnce(&mut MidiMap) -> R) -> R {
        self.midi_map.get_mut(update)
    }

    pub fn notify(&self, notification: Notification) {
        self.midi_map.get(|midi_map| midi_map.callbacks.notify(&notification));
    }

    /// Packets dropped because the map was being updated when they arrived.
    #[must_use]
    pub fn dropped_packets(&self) -> u64 {
        self.dropped_packets.load(Ordering::Relaxed)
    }

    fn sink(&self) -> PacketSink {
        let midi_map = self.midi_map.clone();
        let dropped_packets = self.dropped_packets.clone();
        Box::new(move |packet: RawPacket<'_>| {
            if midi_map.try_get(|midi_map| midi_map.process(packet)).is_err() {
                dropped_packets.fetch_add(1, Ordering::Relaxed);
            }
        })
    }
}

fn has_id(devices: &[InputDevice], unique_id: i32) -> bool {
    devices.iter().any(|device| device.unique_id == unique_id)
}

type Command<H> = Box<dyn FnOnce(&mut MidiIn<H>) + Send + 'static>;

/// Owns a [`MidiIn`] on a dedicated thread, platform MIDI handles are not necessarily `Send`.
pub struct MidiService<H: MidiHost> {
    commands_sender: SyncSender<Command<H>>,
}

impl<H> MidiService<H>
where
    H: MidiHost + 'static,
{
    fn start_service<F>(factory: F) -> Result<Receiver<Result<SyncSender<Command<H>>, Report>>>
    where
        F: FnOnce() -> Result<MidiIn<H>> + Send + 'static,
    {
        let (result_sender, result_receiver) = std::sync::mpsc::sync_channel(0);

        thread::Builder::new().name("MIDI Service".to_string()).spawn(move || {
            let mut midi_in = match factory() {
                Ok(result) => result,
                Err(err) => {
                    if let Err(e) = result_sender.send(Err(err)) {
                        error!("error while reporting on thread start {e:?}");
                    }
                    return;
                }
            };
            let (commands_sender, commands_receiver) = std::sync::mpsc::sync_channel::<Command<H>>(0);
            if let Err(e) = result_sender.send(Ok(commands_sender)) {
                error!("error while reporting on thread start {e:?}");
            }
            while let Ok(command) = commands_receiver.recv() {
                command(&mut midi_in);
            }
            info!("MIDI service stopped");
        })?;
        Ok(result_receiver)
    }

    /// Starts the thread and builds the [`MidiIn`] on it with `factory`.
    pub fn new<F>(factory: F) -> Result<Self>
    where
        F: FnOnce() -> Result<MidiIn<H>> + Send + 'static,
    {
        Ok(Self { commands_sender: Self::start_service(factory)?.recv()?? })
    }

    pub fn execute<R, F>(&self, command: F) -> Result<R>
    where
        F: FnOnce(&mut MidiIn<H>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let (result_sender, result_receiver) = std::sync::mpsc::sync_channel(0);

        self.commands_sender
            .send(Box::new(move |midi_in| {
                if let Err(e) = result_sender.send(command(midi_in)) {
                    error_backtrace!("could not send back result : {e:?}");
                }
            }))
            .report_msg("MIDI service is gone")?;
        result_receiver.recv()?
    }
}

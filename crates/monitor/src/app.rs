use std::{
    fmt::Display,
    sync::{
        Arc,
        atomic::Ordering,
        mpsc::{self, RecvTimeoutError, Sender},
    },
    time::{Duration, Instant},
};

use errors::{LogErrorExt, LogErrorWithExt, Result};
use itertools::Itertools;
use log::{debug, info};
use midi_core::{
    CallbackSet, ControllerMap, InputDevice, MidiEvent, MidiHost, MidiIn, MidiMap, MidiService, MidiServiceConfig,
    MidirHost, Notification,
};
use parameter::Parameter;
use sync::ArcAtomicBool;

use crate::{config::Config, signals::spawn_signal_thread};

const TICK: Duration = Duration::from_millis(50);

/// What the handlers forward from the delivery thread to the printing loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Event(MidiEvent),
    Notification(Notification),
}

/// Handlers that forward everything to `sender` without blocking.
#[must_use]
pub fn forwarding_callbacks(sender: &Sender<Output>) -> CallbackSet {
    let forward = |wrap: fn(MidiEvent) -> Output| {
        let sender = sender.clone();
        move |event| {
            sender.send(wrap(event)).ok();
        }
    };
    let note_on_off = forward(Output::Event);
    let sustain_pedal = forward(Output::Event);
    let pitch_bend = forward(Output::Event);
    let modulation_wheel = forward(Output::Event);
    let notification = sender.clone();

    let mut callbacks = CallbackSet::default();
    callbacks
        .set_note_on_off(move |note, velocity| note_on_off(MidiEvent::NoteOnOff { note, velocity }))
        .set_sustain_pedal(move |value| {
            sustain_pedal(MidiEvent::control_change(midi_core::SUSTAIN_PEDAL, u8::from(value)));
        })
        .set_pitch_bend(move |value| pitch_bend(MidiEvent::PitchBend { value }))
        .set_modulation_wheel(move |value| {
            modulation_wheel(MidiEvent::control_change(midi_core::MODULATION_WHEEL, u8::from(value)));
        })
        .set_notification(move |event| {
            notification.send(Output::Notification(event.clone())).ok();
        });
    callbacks
}

/// Tracks the mapped parameters and reports the ones written since the last call.
pub struct ParameterWatch {
    parameters: Vec<(u8, Arc<Parameter>, u32)>,
}

impl ParameterWatch {
    #[must_use]
    pub fn new(controllers: &ControllerMap) -> Self {
        Self {
            parameters: controllers
                .iter()
                .map(|(number, parameter)| (number, parameter.clone(), parameter.generation()))
                .collect_vec(),
        }
    }

    pub fn changed(&mut self) -> Vec<(u8, Arc<Parameter>)> {
        self.parameters
            .iter_mut()
            .filter_map(|(number, parameter, seen)| {
                let generation = parameter.generation();
                (generation != *seen).then(|| {
                    *seen = generation;
                    (*number, parameter.clone())
                })
            })
            .collect_vec()
    }
}

fn print_line(text: impl Display) {
    println!("{} {text}", chrono::Local::now().format("%H:%M:%S%.3f"));
}

/// Connects every available device selected by `config` that is not connected yet. Returns the new connections.
pub fn connect_wanted<H: MidiHost>(midi_in: &mut MidiIn<H>, config: &MidiServiceConfig) -> Vec<InputDevice> {
    let wanted = midi_in
        .available_devices()
        .iter()
        .filter(|device| config.wants(device) && !midi_in.is_connected(device.unique_id))
        .cloned()
        .collect_vec();
    wanted
        .into_iter()
        .filter(|device| {
            let message = format!("could not connect to {device}");
            midi_in.connect(device.unique_id).log_error_msg(&message).is_ok()
        })
        .collect_vec()
}

fn scan(service: &MidiService<MidirHost>, config: &MidiServiceConfig) -> Result<()> {
    let config = config.clone();
    let connected = service.execute(move |midi_in| {
        midi_in.update_available_devices()?;
        Ok(connect_wanted(midi_in, &config))
    })?;
    debug!("scan connected {} new device(s)", connected.len());
    Ok(())
}

pub fn list_devices(config: &Config) -> Result<()> {
    let devices = MidirHost::new(&config.midi.client_name)?.devices()?;
    if devices.is_empty() {
        println!("no input device");
    }
    for device in devices {
        let marker = if config.midi.wants(&device) { "*" } else { " " };
        println!("{marker} {device}");
    }
    Ok(())
}

/// Prints events and parameter changes until a termination signal arrives.
pub fn run(config: &Config) -> Result<()> {
    let running = ArcAtomicBool::new(true);
    spawn_signal_thread({
        let running = running.weak();
        move || {
            if let Some(running) = running.upgrade() {
                running.store(false, Ordering::SeqCst);
            }
            Ok(())
        }
    })?;

    let poll_interval = config.poll_interval()?;
    let controllers = config.controller_map()?;
    for (number, parameter) in controllers.iter() {
        print_line(format_args!("cc {number:>3} -> {parameter}"));
    }
    let mut watch = ParameterWatch::new(&controllers);

    let (sender, receiver) = mpsc::channel();
    let midi_map = MidiMap::new(forwarding_callbacks(&sender), controllers);
    let client_name = config.midi.client_name.clone();
    let service = MidiService::new(move || MidiIn::new(MidirHost::new(&client_name)?, midi_map))?;

    if !config.midi.connect_all && config.midi.devices.is_empty() {
        print_line("no device selected, use --device NAME or --all");
    }
    scan(&service, &config.midi)?;

    let mut last_scan = Instant::now();
    let mut rescan = false;

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(TICK) {
            Ok(Output::Event(event)) => print_line(event),
            Ok(Output::Notification(notification)) => {
                rescan |= notification == Notification::DevicesChanged;
                print_line(notification);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for (number, parameter) in watch.changed() {
            print_line(format_args!("cc {number:>3} -> {parameter}"));
        }

        if rescan || last_scan.elapsed() >= poll_interval {
            scan(&service, &config.midi).log_error_msg("device scan failed").ok();
            last_scan = Instant::now();
            rescan = false;
        }
    }

    if let Ok(dropped_packets) = service.execute(|midi_in| Ok(midi_in.dropped_packets())).log_error() {
        info!("exiting, {dropped_packets} packet(s) dropped during map updates");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use midi_core::{RawPacket, U7};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn callbacks_forward_events_in_order() {
        let (sender, receiver) = mpsc::channel();
        let midi_map = MidiMap::new(forwarding_callbacks(&sender), ControllerMap::default());

        let data = [0x90, 60, 100, 0xB0, 64, 127, 0xE0, 0, 90, 0xB0, 1, 3];
        midi_map.process(RawPacket::from_messages(0, &data).unwrap());
        midi_map.callbacks.notify(&Notification::DevicesChanged);

        assert_eq!(
            receiver.try_iter().collect_vec(),
            vec![
                Output::Event(MidiEvent::NoteOnOff { note: U7::from_u8_lossy(60), velocity: U7::from_u8_lossy(100) }),
                Output::Event(MidiEvent::control_change(64, 127)),
                Output::Event(MidiEvent::pitch_bend(90)),
                Output::Event(MidiEvent::control_change(1, 3)),
                Output::Notification(Notification::DevicesChanged),
            ]
        );
    }

    #[test]
    fn watch_reports_each_write_once() {
        let mut controllers = ControllerMap::default();
        let volume = Arc::new(Parameter::new("volume", 0.0, 1.0, 0.5));
        let cutoff = Arc::new(Parameter::new("cutoff", 20.0, 20000.0, 20000.0));
        controllers.set(7, volume.clone()).unwrap();
        controllers.set(74, cutoff.clone()).unwrap();
        let mut watch = ParameterWatch::new(&controllers);

        assert!(watch.changed().is_empty());

        controllers.apply(U7::from_u8_lossy(74), U7::from_u8_lossy(0));
        let changed = watch.changed();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0, 74);
        assert_eq!(changed[0].1.value(), 20.0);

        volume.set_value(0.5);
        assert_eq!(watch.changed().iter().map(|(number, _)| *number).collect_vec(), vec![7]);
        assert!(watch.changed().is_empty());
    }
}

use crate::{
    callbacks::CallbackSet,
    controller_map::ControllerMap,
    event::{MODULATION_WHEEL, MidiEvent, SUSTAIN_PEDAL},
    packet::{PacketList, RawPacket},
};

/// Routes one event to its handler, or to the controller map for unreserved control changes.
pub fn dispatch(event: MidiEvent, callbacks: &CallbackSet, controllers: &ControllerMap) {
    match event {
        MidiEvent::NoteOnOff { note, velocity } => callbacks.note_on_off(note, velocity),
        MidiEvent::PitchBend { value } => callbacks.pitch_bend(value),
        MidiEvent::ControlChange { number, value } => match u8::from(number) {
            MODULATION_WHEEL => callbacks.modulation_wheel(value),
            SUSTAIN_PEDAL => callbacks.sustain_pedal(value),
            _ => {
                controllers.apply(number, value);
            }
        },
    }
}

/// Handlers and controller mappings of one application, shared by every connected input.
#[derive(Debug, Default)]
pub struct MidiMap {
    pub callbacks: CallbackSet,
    pub controllers: ControllerMap,
}

impl MidiMap {
    #[must_use]
    pub fn new(callbacks: CallbackSet, controllers: ControllerMap) -> Self {
        Self { callbacks, controllers }
    }

    pub fn dispatch(&self, event: MidiEvent) {
        dispatch(event, &self.callbacks, &self.controllers);
    }

    /// Decodes and dispatches every message of the packet, in order.
    pub fn process(&self, packet: RawPacket<'_>) {
        for event in packet.events() {
            self.dispatch(event);
        }
    }

    pub fn process_list(&self, packets: &PacketList) {
        for packet in packets.iter() {
            self.process(packet);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use parameter::Parameter;
    use pretty_assertions::assert_eq;
    use wmidi::U7;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Note(u8, u8),
        Sustain(u8),
        PitchBend(u8),
        Modulation(u8),
    }

    fn recorder(calls: &Arc<Mutex<Vec<Call>>>) -> impl Fn(Call) + Send + Sync + 'static {
        let calls = calls.clone();
        move |call| calls.lock().unwrap().push(call)
    }

    fn recording_map() -> (MidiMap, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut map = MidiMap::default();
        let note = recorder(&calls);
        let sustain = recorder(&calls);
        let pitch_bend = recorder(&calls);
        let modulation = recorder(&calls);
        map.callbacks
            .set_note_on_off(move |note_number, velocity| note(Call::Note(note_number.into(), velocity.into())))
            .set_sustain_pedal(move |value| sustain(Call::Sustain(value.into())))
            .set_pitch_bend(move |value| pitch_bend(Call::PitchBend(value.into())))
            .set_modulation_wheel(move |value| modulation(Call::Modulation(value.into())));
        (map, calls)
    }

    #[test]
    fn modulation_wheel_goes_to_its_handler_only() {
        let (mut map, calls) = recording_map();
        let parameter = Arc::new(Parameter::new("p", 0.0, 10.0, 3.0));
        map.controllers.set(2, parameter.clone()).unwrap();

        map.dispatch(MidiEvent::control_change(1, 90));

        assert_eq!(*calls.lock().unwrap(), vec![Call::Modulation(90)]);
        assert_eq!(parameter.value(), 3.0);
        assert_eq!(parameter.generation(), 0);
    }

    #[test]
    fn sustain_pedal_goes_to_its_handler() {
        let (map, calls) = recording_map();
        map.dispatch(MidiEvent::control_change(64, 0));
        assert_eq!(*calls.lock().unwrap(), vec![Call::Sustain(0)]);
    }

    #[test]
    fn mapped_controller_sets_the_parameter() {
        let (mut map, calls) = recording_map();
        let parameter = Arc::new(Parameter::new("depth", 0.0, 10.0, 0.0));
        map.controllers.set(20, parameter.clone()).unwrap();

        map.dispatch(MidiEvent::control_change(20, 127));
        assert_eq!(parameter.value(), 10.0);
        map.dispatch(MidiEvent::control_change(20, 0));
        assert_eq!(parameter.value(), 0.0);
        map.dispatch(MidiEvent::control_change(20, 64));
        assert!((parameter.value() - 5.04).abs() < 0.01, "{}", parameter.value());

        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unmapped_controller_is_ignored() {
        let (map, calls) = recording_map();
        map.dispatch(MidiEvent::control_change(21, 127));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unregistered_handlers_have_no_effect() {
        let map = MidiMap::default();
        for event in [
            MidiEvent::note_on_off(60, 100),
            MidiEvent::pitch_bend(64),
            MidiEvent::control_change(1, 90),
            MidiEvent::control_change(64, 127),
            MidiEvent::control_change(20, 127),
        ] {
            map.dispatch(event);
        }
    }

    #[test]
    fn free_function_routes_like_the_map() {
        let (map, calls) = recording_map();
        dispatch(
            MidiEvent::NoteOnOff { note: U7::from_u8_lossy(61), velocity: U7::from_u8_lossy(1) },
            &map.callbacks,
            &map.controllers,
        );
        assert_eq!(*calls.lock().unwrap(), vec![Call::Note(61, 1)]);
    }

    #[test]
    fn packets_are_processed_in_wire_order() {
        let (map, calls) = recording_map();
        let mut packets = PacketList::default();
        packets.push(0, &[0x90, 60, 100, 0xE0, 0, 80]).unwrap();
        packets.push(1, &[0xA0, 60, 1, 0xB0, 1, 33]).unwrap();
        packets.push(2, &[0x80, 60, 12]).unwrap();

        map.process_list(&packets);

        assert_eq!(
            *calls.lock().unwrap(),
            vec![Call::Note(60, 100), Call::PitchBend(80), Call::Modulation(33), Call::Note(60, 0)]
        );
    }
}

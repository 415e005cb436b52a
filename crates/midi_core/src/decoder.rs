use std::iter::FusedIterator;

use wmidi::U7;

use crate::{
    event::MidiEvent,
    packet::{MESSAGE_SIZE, PacketList, RawPacket},
};

const NOTE_OFF: u8 = 0x8;
const NOTE_ON: u8 = 0x9;
const CONTROL_CHANGE: u8 = 0xB;
const PITCH_BEND: u8 = 0xE;

/// Decodes one message slot. Commands other than note off/on, control change and pitch bend yield `None`.
#[must_use]
pub fn decode_message([status, data1, data2]: [u8; MESSAGE_SIZE]) -> Option<MidiEvent> {
    match status >> 4 {
        command @ (NOTE_OFF | NOTE_ON) => Some(MidiEvent::NoteOnOff {
            note: U7::from_u8_lossy(data1),
            velocity: if command == NOTE_OFF { U7::from_u8_lossy(0) } else { U7::from_u8_lossy(data2) },
        }),
        // only the coarse byte is used
        PITCH_BEND => Some(MidiEvent::PitchBend { value: U7::from_u8_lossy(data2) }),
        CONTROL_CHANGE => {
            Some(MidiEvent::ControlChange { number: U7::from_u8_lossy(data1), value: U7::from_u8_lossy(data2) })
        }
        _ => None,
    }
}

/// Lazily decodes the messages of a packet, in wire order.
#[must_use]
pub fn decode(packet: RawPacket<'_>) -> Decode<'_> {
    Decode { data: packet.data(), slot: 0, slots: packet.slot_count() }
}

/// Events of every packet of the list, packet after packet.
pub fn decode_list(packets: &PacketList) -> impl Iterator<Item = MidiEvent> + Clone + '_ {
    packets.iter().flat_map(decode)
}

/// Iterator returned by [`decode`]. A clone continues independently from the same slot.
#[derive(Clone, Debug)]
pub struct Decode<'a> {
    data: &'a [u8],
    slot: usize,
    slots: usize,
}

impl Iterator for Decode<'_> {
    type Item = MidiEvent;

    fn next(&mut self) -> Option<Self::Item> {
        while self.slot < self.slots {
            let offset = self.slot * MESSAGE_SIZE;
            self.slot += 1;
            let Some(&[status, data1, data2]) = self.data.get(offset..offset + MESSAGE_SIZE) else {
                break;
            };
            if let Some(event) = decode_message([status, data1, data2]) {
                return Some(event);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.slots - self.slot))
    }
}

impl FusedIterator for Decode<'_> {}

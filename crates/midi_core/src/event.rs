use std::fmt::{self, Display};

use wmidi::U7;

/// Controller number routed to the modulation wheel handler.
pub const MODULATION_WHEEL: u8 = 1;
/// Controller number routed to the sustain pedal handler.
pub const SUSTAIN_PEDAL: u8 = 64;

/// Returns true for the controller numbers that never reach the controller map.
#[must_use]
pub const fn is_reserved_controller(number: u8) -> bool {
    matches!(number, MODULATION_WHEEL | SUSTAIN_PEDAL)
}

/// A decoded channel message. Every field holds the low 7 bits of the wire byte.
///
/// Note off is represented as `NoteOnOff` with a zero velocity. Pitch bend only carries the coarse (most significant)
/// 7 bits; the fine byte is not reconstructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOnOff { note: U7, velocity: U7 },
    PitchBend { value: U7 },
    ControlChange { number: U7, value: U7 },
}

impl MidiEvent {
    #[must_use]
    pub fn note_on_off(note: u8, velocity: u8) -> Self {
        Self::NoteOnOff { note: U7::from_u8_lossy(note), velocity: U7::from_u8_lossy(velocity) }
    }

    #[must_use]
    pub fn pitch_bend(value: u8) -> Self {
        Self::PitchBend { value: U7::from_u8_lossy(value) }
    }

    #[must_use]
    pub fn control_change(number: u8, value: u8) -> Self {
        Self::ControlChange { number: U7::from_u8_lossy(number), value: U7::from_u8_lossy(value) }
    }
}

impl Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiEvent::NoteOnOff { note, velocity } if u8::from(velocity) == 0 => {
                write!(f, "note {:>3} off", u8::from(note))
            }
            MidiEvent::NoteOnOff { note, velocity } => {
                write!(f, "note {:>3} on  velocity {:>3}", u8::from(note), u8::from(velocity))
            }
            MidiEvent::PitchBend { value } => write!(f, "pitch bend {:>3}", u8::from(value)),
            MidiEvent::ControlChange { number, value } => match u8::from(number) {
                MODULATION_WHEEL => write!(f, "modulation wheel {:>3}", u8::from(value)),
                SUSTAIN_PEDAL => write!(f, "sustain pedal {:>3}", u8::from(value)),
                number => write!(f, "cc {number:>3} value {:>3}", u8::from(value)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn constructors_mask_to_seven_bits() {
        assert_eq!(
            MidiEvent::note_on_off(0xBC, 0xFF),
            MidiEvent::NoteOnOff { note: U7::from_u8_lossy(0x3C), velocity: U7::from_u8_lossy(0x7F) }
        );
        assert_eq!(MidiEvent::control_change(0x81, 0x80), MidiEvent::control_change(1, 0));
    }

    #[test]
    fn reserved_controllers() {
        assert!(is_reserved_controller(1));
        assert!(is_reserved_controller(64));
        assert!(!is_reserved_controller(0));
        assert!(!is_reserved_controller(65));
    }

    #[test]
    fn display() {
        assert_eq!(MidiEvent::note_on_off(60, 100).to_string(), "note  60 on  velocity 100");
        assert_eq!(MidiEvent::note_on_off(60, 0).to_string(), "note  60 off");
        assert_eq!(MidiEvent::control_change(64, 127).to_string(), "sustain pedal 127");
        assert_eq!(MidiEvent::control_change(74, 5).to_string(), "cc  74 value   5");
        assert_eq!(MidiEvent::pitch_bend(64).to_string(), "pitch bend  64");
    }
}

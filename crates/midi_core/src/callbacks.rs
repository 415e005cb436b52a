use std::fmt;

use wmidi::U7;

use crate::notification::Notification;

pub type NoteOnOffCallback = Box<dyn Fn(U7, U7) + Send + Sync>;
pub type ValueCallback = Box<dyn Fn(U7) + Send + Sync>;
pub type NotificationCallback = Box<dyn Fn(&Notification) + Send + Sync>;

/// At most one handler per event kind. Setting a handler replaces the previous one, an empty slot drops the event.
///
/// Handlers run on the host's delivery thread, synchronously, and must return promptly.
#[derive(Default)]
pub struct CallbackSet {
    note_on_off: Option<NoteOnOffCallback>,
    sustain_pedal: Option<ValueCallback>,
    pitch_bend: Option<ValueCallback>,
    modulation_wheel: Option<ValueCallback>,
    notification: Option<NotificationCallback>,
}

impl CallbackSet {
    pub fn set_note_on_off(&mut self, callback: impl Fn(U7, U7) + Send + Sync + 'static) -> &mut Self {
        self.note_on_off = Some(Box::new(callback));
        self
    }

    pub fn set_sustain_pedal(&mut self, callback: impl Fn(U7) + Send + Sync + 'static) -> &mut Self {
        self.sustain_pedal = Some(Box::new(callback));
        self
    }

    pub fn set_pitch_bend(&mut self, callback: impl Fn(U7) + Send + Sync + 'static) -> &mut Self {
        self.pitch_bend = Some(Box::new(callback));
        self
    }

    pub fn set_modulation_wheel(&mut self, callback: impl Fn(U7) + Send + Sync + 'static) -> &mut Self {
        self.modulation_wheel = Some(Box::new(callback));
        self
    }

    pub fn set_notification(&mut self, callback: impl Fn(&Notification) + Send + Sync + 'static) -> &mut Self {
        self.notification = Some(Box::new(callback));
        self
    }

    pub fn clear_note_on_off(&mut self) -> Option<NoteOnOffCallback> {
        self.note_on_off.take()
    }

    pub fn clear_sustain_pedal(&mut self) -> Option<ValueCallback> {
        self.sustain_pedal.take()
    }

    pub fn clear_pitch_bend(&mut self) -> Option<ValueCallback> {
        self.pitch_bend.take()
    }

    pub fn clear_modulation_wheel(&mut self) -> Option<ValueCallback> {
        self.modulation_wheel.take()
    }

    pub fn clear_notification(&mut self) -> Option<NotificationCallback> {
        self.notification.take()
    }

    pub fn note_on_off(&self, note: U7, velocity: U7) {
        if let Some(callback) = &self.note_on_off {
            callback(note, velocity);
        }
    }

    pub fn sustain_pedal(&self, value: U7) {
        if let Some(callback) = &self.sustain_pedal {
            callback(value);
        }
    }

    pub fn pitch_bend(&self, value: U7) {
        if let Some(callback) = &self.pitch_bend {
            callback(value);
        }
    }

    pub fn modulation_wheel(&self, value: U7) {
        if let Some(callback) = &self.modulation_wheel {
            callback(value);
        }
    }

    pub fn notify(&self, notification: &Notification) {
        if let Some(callback) = &self.notification {
            callback(notification);
        }
    }
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("note_on_off", &self.note_on_off.is_some())
            .field("sustain_pedal", &self.sustain_pedal.is_some())
            .field("pitch_bend", &self.pitch_bend.is_some())
            .field("modulation_wheel", &self.modulation_wheel.is_some())
            .field("notification", &self.notification.is_some())
            .finish()
    }
}

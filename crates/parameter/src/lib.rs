#![allow(forbidden_lint_groups)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use atomic_float::AtomicF32;
pub use getset::*;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

/// `(value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min`, in single precision.
///
/// There is no guard against `in_max == in_min`: the division then yields an infinite or NaN value, which is passed
/// through unchanged.
#[must_use]
#[inline]
pub fn map_linear_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (value - in_min) / (in_max - in_min) * (out_max - out_min) + out_min
}

pub const CONTROLLER_MIN: f32 = 0.0;
pub const CONTROLLER_MAX: f32 = 127.0;

/// A value owned by the application and driven by a MIDI controller.
///
/// The current value is atomic so the MIDI delivery thread can write it through a shared reference while the
/// application reads it from any other thread.
#[derive(Getters, CopyGetters, Deserialize)]
#[serde(from = "ParameterConfig")]
pub struct Parameter {
    #[getset(get = "pub")]
    label: String,
    #[getset(get_copy = "pub")]
    min_value: f32,
    #[getset(get_copy = "pub")]
    max_value: f32,
    current_value: AtomicF32,
    // bumped on every write, lets pollers tell a new value from a repeated one
    generation: AtomicU32,
}

impl Parameter {
    pub fn new(label: impl Into<String>, min_value: f32, max_value: f32, current_value: f32) -> Self {
        Self {
            label: label.into(),
            min_value,
            max_value,
            current_value: AtomicF32::new(current_value),
            generation: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.current_value.load(Ordering::Relaxed)
    }

    pub fn set_value(&self, value: f32) {
        self.current_value.store(value, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::Release);
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }

    /// Stores the controller value (0..=127) mapped linearly onto `min_value..=max_value`.
    pub fn set_from_controller(&self, value: u8) {
        let value = map_linear_range(f32::from(value), CONTROLLER_MIN, CONTROLLER_MAX, self.min_value, self.max_value);
        self.set_value(value);
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("label", &self.label)
            .field("min_value", &self.min_value)
            .field("max_value", &self.max_value)
            .field("current_value", &self.value())
            .finish()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:.3} [{} ..= {}]", self.label, self.value(), self.min_value, self.max_value)
    }
}

/// Serialized form of a [`Parameter`]. `default` falls back to `min`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterConfig {
    pub label: String,
    pub min: f32,
    pub max: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f32>,
}

impl From<ParameterConfig> for Parameter {
    fn from(ParameterConfig { label, min, max, default }: ParameterConfig) -> Self {
        Self::new(label, min, max, default.unwrap_or(min))
    }
}

impl Serialize for Parameter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Parameter", 4)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("min", &self.min_value)?;
        state.serialize_field("max", &self.max_value)?;
        state.serialize_field("default", &self.value())?;
        state.end()
    }
}

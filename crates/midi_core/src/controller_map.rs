use std::sync::Arc;

use errors::TypedResult;
use itertools::Itertools;
use parameter::{Parameter, ParameterConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wmidi::U7;

use crate::event::is_reserved_controller;

pub const CONTROLLER_COUNT: usize = 128;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMapError {
    #[error("controller {0} is reserved for the modulation wheel or the sustain pedal")]
    Reserved(u8),
    #[error("controller number {0} is not a 7-bit value")]
    OutOfRange(u8),
    #[error("controller {0} is mapped more than once")]
    Duplicate(u8),
}

/// One entry of a controller mapping as written in configuration files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub number: u8,
    #[serde(flatten)]
    pub parameter: ParameterConfig,
}

/// Routes controller numbers to shared parameters.
///
/// Indexed by controller number, so a lookup from the delivery thread neither hashes nor allocates. Numbers 1 and 64
/// cannot be mapped.
#[derive(Clone, Debug)]
pub struct ControllerMap {
    entries: [Option<Arc<Parameter>>; CONTROLLER_COUNT],
}

impl Default for ControllerMap {
    fn default() -> Self {
        Self { entries: std::array::from_fn(|_| None) }
    }
}

impl ControllerMap {
    fn check(number: u8) -> Result<usize, ControllerMapError> {
        if usize::from(number) >= CONTROLLER_COUNT {
            Err(ControllerMapError::OutOfRange(number))
        } else if is_reserved_controller(number) {
            Err(ControllerMapError::Reserved(number))
        } else {
            Ok(usize::from(number))
        }
    }

    /// Maps `number` to `parameter`, returning the parameter it was mapped to before.
    pub fn set(
        &mut self,
        number: u8,
        parameter: Arc<Parameter>,
    ) -> TypedResult<Option<Arc<Parameter>>, ControllerMapError> {
        let index = Self::check(number)?;
        Ok(self.entries[index].replace(parameter))
    }

    #[must_use]
    pub fn get(&self, number: u8) -> Option<&Arc<Parameter>> {
        self.entries.get(usize::from(number))?.as_ref()
    }

    pub fn remove(&mut self, number: u8) -> Option<Arc<Parameter>> {
        self.entries.get_mut(usize::from(number))?.take()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Arc<Parameter>)> {
        (0..=u8::MAX)
            .zip(self.entries.iter())
            .filter_map(|(number, parameter)| parameter.as_ref().map(|parameter| (number, parameter)))
    }

    /// Sets the parameter mapped to `number` from the controller `value`. Returns the parameter, if any.
    pub fn apply(&self, number: U7, value: U7) -> Option<&Arc<Parameter>> {
        let parameter = self.entries[usize::from(u8::from(number))].as_ref()?;
        parameter.set_from_controller(u8::from(value));
        Some(parameter)
    }

    /// Builds a map from configuration entries. Every entry gets a fresh parameter.
    pub fn from_configs<'a>(
        configs: impl IntoIterator<Item = &'a ControllerConfig>,
    ) -> TypedResult<Self, ControllerMapError> {
        let configs = configs.into_iter().collect_vec();
        if let Some(duplicate) = configs.iter().map(|config| config.number).duplicates().next() {
            return Err(ControllerMapError::Duplicate(duplicate).into());
        }

        let mut controllers = Self::default();
        for config in configs {
            controllers.set(config.number, Arc::new(Parameter::from(config.parameter.clone())))?;
        }
        Ok(controllers)
    }

    #[must_use]
    pub fn to_configs(&self) -> Vec<ControllerConfig> {
        self.iter()
            .map(|(number, parameter)| ControllerConfig {
                number,
                parameter: ParameterConfig {
                    label: parameter.label().clone(),
                    min: parameter.min_value(),
                    max: parameter.max_value(),
                    default: Some(parameter.value()),
                },
            })
            .collect()
    }
}

use std::{fmt, str::FromStr};

use models::{heating_cooling::HeatingCooling, units::round_decimal};
use serde_json::{json, Value};

use super::BridgeConfig;
use crate::error::BridgeError;

/// The thermostat characteristics an accessory exposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Characteristic {
    CurrentHeatingCoolingState,
    TargetHeatingCoolingState,
    CurrentTemperature,
    TargetTemperature,
    TemperatureDisplayUnits,
    CurrentRelativeHumidity,
}

impl Characteristic {
    pub const ALL: [Characteristic; 6] = [
        Characteristic::CurrentHeatingCoolingState,
        Characteristic::TargetHeatingCoolingState,
        Characteristic::CurrentTemperature,
        Characteristic::TargetTemperature,
        Characteristic::TemperatureDisplayUnits,
        Characteristic::CurrentRelativeHumidity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Characteristic::CurrentHeatingCoolingState => "CurrentHeatingCoolingState",
            Characteristic::TargetHeatingCoolingState => "TargetHeatingCoolingState",
            Characteristic::CurrentTemperature => "CurrentTemperature",
            Characteristic::TargetTemperature => "TargetTemperature",
            Characteristic::TemperatureDisplayUnits => "TemperatureDisplayUnits",
            Characteristic::CurrentRelativeHumidity => "CurrentRelativeHumidity",
        }
    }

    pub fn is_writable(self) -> bool {
        matches!(
            self,
            Characteristic::TargetHeatingCoolingState
                | Characteristic::TargetTemperature
                | Characteristic::TemperatureDisplayUnits
        )
    }

    /// Backend path queried to read this characteristic.
    pub fn read_path(self) -> &'static str {
        match self {
            Characteristic::CurrentHeatingCoolingState => "get/state",
            Characteristic::TargetHeatingCoolingState => "get/mode",
            Characteristic::CurrentTemperature | Characteristic::CurrentRelativeHumidity => {
                "get/conditions"
            }
            Characteristic::TargetTemperature => "get/temp/target",
            Characteristic::TemperatureDisplayUnits => "get/temp/display_units",
        }
    }

    /// Picks the characteristic value out of the reply to [`Self::read_path`].
    pub fn read_value(self, reply: &Value) -> Option<Value> {
        match self {
            Characteristic::CurrentHeatingCoolingState => {
                let state = heating_cooling_at(reply, "/state/value")?;
                state.is_current_state().then(|| json!(state.value()))
            }
            Characteristic::TargetHeatingCoolingState => {
                heating_cooling_at(reply, "/mode/value").map(|mode| json!(mode.value()))
            }
            Characteristic::CurrentTemperature => number_at(reply, "/conditions/temp/celsius"),
            Characteristic::TargetTemperature => number_at(reply, "/temp/celsius"),
            Characteristic::TemperatureDisplayUnits => reply
                .get("celsius")
                .and_then(Value::as_bool)
                .map(|celsius| json!(if celsius { 0 } else { 1 })),
            Characteristic::CurrentRelativeHumidity => {
                number_at(reply, "/conditions/relative_humidity")
            }
        }
    }

    /// Backend path that sets this characteristic to `value`.
    pub fn write_path(self, value: &Value, config: &BridgeConfig) -> Result<String, BridgeError> {
        let invalid = || BridgeError::InvalidValue {
            characteristic: self,
            value: value.clone(),
        };

        match self {
            Characteristic::TargetHeatingCoolingState => {
                let mode = value
                    .as_u64()
                    .and_then(|v| u8::try_from(v).ok())
                    .and_then(HeatingCooling::from_value)
                    .ok_or_else(invalid)?;
                let name = config.backend_mode(mode).ok_or(BridgeError::UnmappedMode(mode))?;
                Ok(format!("set/mode/{name}"))
            }
            Characteristic::TargetTemperature => {
                let celsius = value
                    .as_f64()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .ok_or_else(invalid)?;
                Ok(format!("set/temp/target/{}/C", round_decimal(celsius, 1)))
            }
            Characteristic::TemperatureDisplayUnits => match value.as_u64() {
                Some(0) => Ok("set/temp/display_units/C".to_string()),
                Some(1) => Ok("set/temp/display_units/F".to_string()),
                _ => Err(invalid()),
            },
            Characteristic::CurrentHeatingCoolingState
            | Characteristic::CurrentTemperature
            | Characteristic::CurrentRelativeHumidity => Err(BridgeError::ReadOnly(self)),
        }
    }
}

fn heating_cooling_at(reply: &Value, pointer: &str) -> Option<HeatingCooling> {
    let value = reply.pointer(pointer)?.as_u64()?;
    HeatingCooling::from_value(u8::try_from(value).ok()?)
}

fn number_at(reply: &Value, pointer: &str) -> Option<Value> {
    reply.pointer(pointer).filter(|v| v.is_number()).cloned()
}

impl FromStr for Characteristic {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Characteristic::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| BridgeError::UnknownCharacteristic(s.to_string()))
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Heating/cooling state as numbered by smart-home accessory protocols.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingCooling {
    #[default]
    Off,
    Heat,
    Cool,
    Auto,
}

impl HeatingCooling {
    pub fn from_value(value: u8) -> Option<HeatingCooling> {
        match value {
            0 => Some(HeatingCooling::Off),
            1 => Some(HeatingCooling::Heat),
            2 => Some(HeatingCooling::Cool),
            3 => Some(HeatingCooling::Auto),
            _ => None,
        }
    }

    pub fn value(self) -> u8 {
        match self {
            HeatingCooling::Off => 0,
            HeatingCooling::Heat => 1,
            HeatingCooling::Cool => 2,
            HeatingCooling::Auto => 3,
        }
    }

    /// Current state can only ever be off, heating or cooling.
    pub fn is_current_state(self) -> bool {
        self != HeatingCooling::Auto
    }
}

impl fmt::Display for HeatingCooling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HeatingCooling::Off => f.write_str("Off"),
            HeatingCooling::Heat => f.write_str("Heat"),
            HeatingCooling::Cool => f.write_str("Cool"),
            HeatingCooling::Auto => f.write_str("Auto"),
        }
    }
}

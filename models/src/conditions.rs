use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub temp_c: f64,
    pub relative_humidity: f64,
}

/// Live sensor readings from `get_state`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub conditions: Conditions,
    /// HVAC output name as reported by the controller (`Off`, `Heating`, `Cooling`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon_running: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub icon_url: String,
    pub description: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub high: f64,
    pub low: f64,
}

/// Sunrise and sunset as `HHMM` integers in local time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solar {
    pub sunrise: u16,
    pub sunset: u16,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolarEvent {
    Sunrise(u16),
    Sunset(u16),
}

impl Solar {
    /// The next sun transition after `now`: sunset while the sun is up,
    /// sunrise otherwise.
    pub fn next_transition(&self, now: NaiveTime) -> SolarEvent {
        let hhmm = (now.hour() * 100 + now.minute()) as u16;
        if hhmm > self.sunrise && hhmm < self.sunset {
            SolarEvent::Sunset(self.sunset)
        } else {
            SolarEvent::Sunrise(self.sunrise)
        }
    }
}

/// Local weather from `get_weather`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temp_c: f64,
    pub relative_humidity: f64,
    pub condition: Condition,
    pub forecast: Forecast,
    pub solar: Solar,
}

//! Temperature conversion and display rounding.
//!
//! Every conversion here rounds half-up (toward positive infinity), so the
//! browser front end and the native client agree on the same digits. The
//! string-returning functions mirror what is shown on screen; canonical
//! storage is always degrees Celsius.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid used by [`round_to_step`] when no usable step is given.
pub const DEFAULT_STEP: f64 = 1.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Celsius,
    Fahrenheit,
}

impl Scale {
    pub fn from_celsius_flag(celsius: bool) -> Scale {
        if celsius {
            Scale::Celsius
        } else {
            Scale::Fahrenheit
        }
    }

    pub fn is_celsius(self) -> bool {
        self == Scale::Celsius
    }

    pub fn toggled(self) -> Scale {
        match self {
            Scale::Celsius => Scale::Fahrenheit,
            Scale::Fahrenheit => Scale::Celsius,
        }
    }

    /// Setpoint increment in this scale's own degrees.
    pub fn step(self) -> f64 {
        match self {
            Scale::Celsius => 0.5,
            Scale::Fahrenheit => 1.0,
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Scale::Celsius => "C",
            Scale::Fahrenheit => "F",
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "°{}", self.unit())
    }
}

fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Rounds `value` to `decimals` places and renders it with exactly that many.
pub fn round_decimal(value: f64, decimals: u32) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = round_half_up(value * factor) / factor;
    format!("{:.*}", decimals as usize, rounded)
}

/// Snaps `value` to the nearest multiple of `step`.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    let step = if step.is_finite() && step > 0.0 {
        step
    } else {
        DEFAULT_STEP
    };
    let inv = 1.0 / step;
    round_half_up(value * inv) / inv
}

pub fn to_fahrenheit(celsius: f64) -> String {
    round_decimal(celsius * 9.0 / 5.0 + 32.0, 0)
}

pub fn to_celsius(fahrenheit: f64) -> String {
    round_decimal((fahrenheit - 32.0) * 5.0 / 9.0, 1)
}

fn parse_finite(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Runs `convert` on `value` if it is a number, otherwise yields nothing.
pub fn parse_or_empty(value: &str, convert: impl Fn(f64) -> String) -> Option<String> {
    parse_finite(value).map(convert)
}

/// Numeric form of [`parse_or_empty`], for chaining conversions.
pub fn convert_value(value: f64, convert: impl Fn(f64) -> String) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    parse_finite(&convert(value))
}

/// Re-expresses a canonical Celsius value on `scale`'s grid, shifted by
/// `steps` grid increments, and returns it in Celsius again.
///
/// Fahrenheit goes through convert, snap, shift, convert back, so the stored
/// value carries only the precision the display can show.
pub fn quantize(celsius: f64, scale: Scale, steps: f64) -> Option<f64> {
    match scale {
        Scale::Celsius => {
            if !celsius.is_finite() {
                return None;
            }
            Some(round_to_step(celsius, Scale::Celsius.step()) + steps * Scale::Celsius.step())
        }
        Scale::Fahrenheit => {
            let fahrenheit = convert_value(celsius, to_fahrenheit)?;
            let fahrenheit = round_to_step(fahrenheit, Scale::Fahrenheit.step())
                + steps * Scale::Fahrenheit.step();
            convert_value(fahrenheit, to_celsius)
        }
    }
}

/// Display string for a canonical Celsius reading on `scale`.
pub fn display_temperature(celsius: f64, scale: Scale) -> String {
    let shown = round_decimal(celsius, 1);
    match scale {
        Scale::Celsius => shown,
        Scale::Fahrenheit => parse_or_empty(&shown, to_fahrenheit).unwrap_or_default(),
    }
}

/// Formats an `HHMM` integer (as reported for sunrise/sunset) as `H:MM`.
pub fn format_hhmm(hhmm: u16) -> String {
    format!("{}:{:02}", hhmm / 100, hhmm % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn converts_with_display_precision() {
        assert_eq!(to_fahrenheit(21.0), "70");
        assert_eq!(to_fahrenheit(21.5), "71");
        assert_eq!(to_celsius(70.0), "21.1");
        assert_eq!(to_celsius(32.0), "0.0");
        assert_eq!(round_decimal(-2.5, 0), "-2");
    }

    #[test]
    fn step_defaults_to_whole_degrees() {
        assert_eq!(round_to_step(21.26, 0.5), 21.5);
        assert_eq!(round_to_step(21.24, 0.5), 21.0);
        assert_eq!(round_to_step(21.6, 0.0), 22.0);
        assert_eq!(round_to_step(21.4, f64::NAN), 21.0);
    }

    #[test]
    fn malformed_input_degrades_to_nothing() {
        assert_eq!(parse_or_empty("", to_fahrenheit), None);
        assert_eq!(parse_or_empty("warm", to_celsius), None);
        assert_eq!(parse_or_empty("NaN", to_celsius), None);
        assert_eq!(parse_or_empty(" 70 ", to_celsius).as_deref(), Some("21.1"));
        assert_eq!(convert_value(f64::INFINITY, to_fahrenheit), None);
    }

    #[test]
    fn quantize_moves_along_each_grid() {
        assert_eq!(quantize(21.0, Scale::Celsius, 1.0), Some(21.5));
        assert_eq!(quantize(21.3, Scale::Celsius, -1.0), Some(21.0));
        // 21.0C -> 70F -> 71F -> 21.7C
        assert_eq!(quantize(21.0, Scale::Fahrenheit, 1.0), Some(21.7));
        assert_eq!(quantize(21.0, Scale::Fahrenheit, 0.0), Some(21.1));
        assert_eq!(quantize(f64::NAN, Scale::Fahrenheit, 1.0), None);
    }

    #[test]
    fn displays_in_active_scale() {
        assert_eq!(display_temperature(21.04, Scale::Celsius), "21.0");
        assert_eq!(display_temperature(21.04, Scale::Fahrenheit), "70");
        assert_eq!(Scale::Fahrenheit.to_string(), "°F");
        assert_eq!(format_hhmm(712), "7:12");
        assert_eq!(format_hhmm(1905), "19:05");
    }

    proptest! {
        #[test]
        fn round_trip_is_stable_after_first_rounding(f in -60i32..140) {
            let c1: f64 = to_celsius(f64::from(f)).parse().unwrap();
            let f1: f64 = to_fahrenheit(c1).parse().unwrap();
            let c2: f64 = to_celsius(f1).parse().unwrap();
            let f2: f64 = to_fahrenheit(c2).parse().unwrap();
            prop_assert_eq!(c1, c2);
            prop_assert_eq!(f1, f2);
        }

        #[test]
        fn steps_land_on_grid(v in -1000.0f64..1000.0) {
            let half = round_to_step(v, 0.5);
            prop_assert_eq!((half * 2.0).fract(), 0.0);
            prop_assert_eq!(round_to_step(v, 1.0).fract(), 0.0);
        }
    }
}

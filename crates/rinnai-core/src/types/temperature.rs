//! Temperature units and command value validation.

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidInputError;

pub const MIN_TEMPERATURE_F: i64 = 100;
pub const MAX_TEMPERATURE_F: i64 = 140;
pub const MIN_TEMPERATURE_C: i64 = 38;
pub const MAX_TEMPERATURE_C: i64 = 60;
pub const MIN_RECIRCULATION_DURATION: i64 = 1;
pub const MAX_RECIRCULATION_DURATION: i64 = 60;

/// Unit of a requested temperature. Heaters work in Fahrenheit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemperatureUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureUnit {
    /// Convert Celsius to Fahrenheit, rounded half to even.
    pub fn celsius_to_fahrenheit(celsius: f64) -> i64 {
        (celsius * 9.0 / 5.0 + 32.0).round_ties_even() as i64
    }

    pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
        (fahrenheit - 32.0) * 5.0 / 9.0
    }

    fn symbol(&self) -> char {
        match self {
            TemperatureUnit::Fahrenheit => 'F',
            TemperatureUnit::Celsius => 'C',
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Fahrenheit => f.write_str("fahrenheit"),
            TemperatureUnit::Celsius => f.write_str("celsius"),
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            other => Err(format!("unknown temperature unit '{other}'")),
        }
    }
}

/// Validate a requested temperature and return it in whole degrees Fahrenheit.
///
/// # Errors
///
/// Returns an error outside 100-140 °F (or 38-60 °C).
///
/// # Example
///
/// ```
/// use rinnai_core::types::validate_temperature;
/// use rinnai_core::TemperatureUnit;
///
/// assert_eq!(validate_temperature(120.0, TemperatureUnit::Fahrenheit).unwrap(), 120);
/// assert_eq!(validate_temperature(60.0, TemperatureUnit::Celsius).unwrap(), 140);
/// assert!(validate_temperature(150.0, TemperatureUnit::Fahrenheit).is_err());
/// ```
pub fn validate_temperature(value: f64, unit: TemperatureUnit) -> Result<u32, InvalidInputError> {
    let (min, max) = match unit {
        TemperatureUnit::Fahrenheit => (MIN_TEMPERATURE_F, MAX_TEMPERATURE_F),
        TemperatureUnit::Celsius => (MIN_TEMPERATURE_C, MAX_TEMPERATURE_C),
    };

    // NaN fails the range check.
    if !(min as f64 <= value && value <= max as f64) {
        return Err(InvalidInputError::Temperature {
            value,
            min,
            max,
            unit: unit.symbol(),
        });
    }

    let fahrenheit = match unit {
        TemperatureUnit::Fahrenheit => value.trunc() as i64,
        TemperatureUnit::Celsius => TemperatureUnit::celsius_to_fahrenheit(value),
    };
    Ok(fahrenheit as u32)
}

/// Validate a recirculation duration in minutes.
///
/// # Errors
///
/// Returns an error outside 1-60 minutes.
pub fn validate_duration(minutes: i64) -> Result<u32, InvalidInputError> {
    if !(MIN_RECIRCULATION_DURATION..=MAX_RECIRCULATION_DURATION).contains(&minutes) {
        return Err(InvalidInputError::Duration {
            value: minutes,
            min: MIN_RECIRCULATION_DURATION,
            max: MAX_RECIRCULATION_DURATION,
        });
    }
    Ok(minutes as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_range_is_inclusive() {
        for value in MIN_TEMPERATURE_F..=MAX_TEMPERATURE_F {
            let validated = validate_temperature(value as f64, TemperatureUnit::Fahrenheit).unwrap();
            assert_eq!(validated as i64, value);
        }
        assert!(validate_temperature(99.0, TemperatureUnit::Fahrenheit).is_err());
        assert!(validate_temperature(141.0, TemperatureUnit::Fahrenheit).is_err());
        assert!(validate_temperature(f64::NAN, TemperatureUnit::Fahrenheit).is_err());
    }

    #[test]
    fn fractional_fahrenheit_is_truncated() {
        assert_eq!(validate_temperature(120.7, TemperatureUnit::Fahrenheit).unwrap(), 120);
    }

    #[test]
    fn celsius_range_converts_into_fahrenheit_range() {
        for value in MIN_TEMPERATURE_C..=MAX_TEMPERATURE_C {
            let validated = validate_temperature(value as f64, TemperatureUnit::Celsius).unwrap() as i64;
            assert!((MIN_TEMPERATURE_F..=MAX_TEMPERATURE_F).contains(&validated));
        }
        assert_eq!(validate_temperature(40.0, TemperatureUnit::Celsius).unwrap(), 104);
        assert!(validate_temperature(37.0, TemperatureUnit::Celsius).is_err());
        assert!(validate_temperature(61.0, TemperatureUnit::Celsius).is_err());
    }

    #[test]
    fn out_of_range_message_names_unit() {
        let err = validate_temperature(150.0, TemperatureUnit::Fahrenheit).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Temperature must be between 100 and 140°F, got 150°F"
        );
    }

    #[test]
    fn duration_range_is_inclusive() {
        for minutes in MIN_RECIRCULATION_DURATION..=MAX_RECIRCULATION_DURATION {
            assert_eq!(validate_duration(minutes).unwrap() as i64, minutes);
        }
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(61).is_err());
        assert!(validate_duration(-5).is_err());
    }

    #[test]
    fn conversions() {
        assert_eq!(TemperatureUnit::celsius_to_fahrenheit(60.0), 140);
        assert_eq!(TemperatureUnit::fahrenheit_to_celsius(104.0), 40.0);
        assert_eq!("C".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert!("kelvin".parse::<TemperatureUnit>().is_err());
    }
}

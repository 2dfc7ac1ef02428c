//! Validated input and response types.
//!
//! Device input is validated at construction so that invalid commands fail
//! before any network call is made.

mod device;
mod response;
mod temperature;

pub use device::DeviceRef;
pub use response::{ApiResponse, ResponsePayload, SUCCESS_SENTINEL};
pub use temperature::{
    MAX_RECIRCULATION_DURATION, MAX_TEMPERATURE_C, MAX_TEMPERATURE_F, MIN_RECIRCULATION_DURATION,
    MIN_TEMPERATURE_C, MIN_TEMPERATURE_F, TemperatureUnit, validate_duration, validate_temperature,
};

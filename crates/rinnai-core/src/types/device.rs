//! Device reference type.

use std::fmt;

use serde_json::Value;

use crate::error::InvalidInputError;

/// A reference to a water heater, as needed to address its shadow document.
///
/// The thing name is required and non-empty; the other identifiers are
/// carried along when known.
///
/// # Example
///
/// ```
/// use rinnai_core::DeviceRef;
/// use serde_json::json;
///
/// let record = json!({"id": "device-456", "thing_name": "rinnai-thing-123"});
/// let device = DeviceRef::from_record(&record).unwrap();
/// assert_eq!(device.thing_name(), "rinnai-thing-123");
/// assert_eq!(device.id(), Some("device-456"));
///
/// assert!(DeviceRef::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceRef {
    thing_name: String,
    user_uuid: Option<String>,
    id: Option<String>,
}

impl DeviceRef {
    /// Create a device reference from its thing name.
    ///
    /// # Errors
    ///
    /// Returns an error if the thing name is blank, or if it could leave its
    /// path segment in the shadow URL.
    pub fn new(thing_name: impl Into<String>) -> Result<Self, InvalidInputError> {
        let thing_name = thing_name.into();
        if thing_name.trim().is_empty() {
            return Err(InvalidInputError::MissingThingName);
        }
        if matches!(thing_name.as_str(), "." | "..")
            || thing_name.contains(['/', '\\', '?', '#', '%'])
        {
            return Err(InvalidInputError::InvalidThingName { value: thing_name });
        }
        Ok(Self {
            thing_name,
            user_uuid: None,
            id: None,
        })
    }

    /// Build a reference from a device record of the user info document.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no string `thing_name`.
    pub fn from_record(record: &Value) -> Result<Self, InvalidInputError> {
        let thing_name = record
            .get("thing_name")
            .and_then(Value::as_str)
            .ok_or(InvalidInputError::MissingThingName)?;

        let mut device = Self::new(thing_name)?;
        device.user_uuid = string_field(record, "user_uuid");
        device.id = string_field(record, "id");
        Ok(device)
    }

    pub fn with_user_uuid(mut self, user_uuid: impl Into<String>) -> Self {
        self.user_uuid = Some(user_uuid.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn thing_name(&self) -> &str {
        &self.thing_name
    }

    pub fn user_uuid(&self) -> Option<&str> {
        self.user_uuid.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl TryFrom<&Value> for DeviceRef {
    type Error = InvalidInputError;

    fn try_from(record: &Value) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.thing_name)
    }
}

fn string_field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

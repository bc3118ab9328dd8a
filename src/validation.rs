//! Input validation
//!
//! Range and format checks that run before scoring. The scorer assumes a
//! validated [`FatigueInput`]; everything that can go wrong with caller data
//! is reported here.

use crate::clock::ClockTime;
use crate::types::FatigueInput;
use serde_json::Value;

/// Upper bound for either reported sleep period, in hours
pub const MAX_SLEEP_HOURS: f64 = 24.0;

pub const FIELD_SLEEP_LAST_24: &str = "sleepLast24";
pub const FIELD_SLEEP_PREVIOUS_24: &str = "sleepPrevious24";
pub const FIELD_WAKE_TIME: &str = "wakeTime";
pub const FIELD_WORK_START_TIME: &str = "workStartTime";

/// Validation errors for fatigue inputs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field {field} must be {expected}")]
    WrongType { field: String, expected: String },

    #[error("Field {field} must be between 0 and 24 hours, got {value}")]
    SleepOutOfRange { field: String, value: f64 },

    #[error("Field {field} must be a clock time in HH:MM format, got {value:?}")]
    InvalidClockTime { field: String, value: String },

    #[error("Input must be a JSON object")]
    NotAnObject,

    #[error("Unknown fatigue level {value:?} (expected Low, Moderate, High or Extreme)")]
    UnknownLevel { value: String },
}

impl FatigueInput {
    /// Check that both sleep fields are finite and within 0-24 hours.
    ///
    /// Clock fields are already well-formed by construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_sleep(FIELD_SLEEP_LAST_24, self.sleep_last_24)?;
        check_sleep(FIELD_SLEEP_PREVIOUS_24, self.sleep_previous_24)?;
        Ok(())
    }
}

fn check_sleep(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=MAX_SLEEP_HOURS).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::SleepOutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

/// Validate an untyped JSON input, collecting every problem.
///
/// Returns an empty vector when the value would parse into a valid
/// [`FatigueInput`].
pub fn validate_value(value: &Value) -> Vec<ValidationError> {
    let Some(object) = value.as_object() else {
        return vec![ValidationError::NotAnObject];
    };

    let mut errors = Vec::new();

    for field in [FIELD_SLEEP_LAST_24, FIELD_SLEEP_PREVIOUS_24] {
        match object.get(field) {
            None | Some(Value::Null) => errors.push(ValidationError::MissingField {
                field: field.to_string(),
            }),
            Some(Value::Number(n)) => {
                // as_f64 only fails for arbitrary-precision numbers
                let hours = n.as_f64().unwrap_or(f64::NAN);
                if let Err(e) = check_sleep(field, hours) {
                    errors.push(e);
                }
            }
            Some(_) => errors.push(ValidationError::WrongType {
                field: field.to_string(),
                expected: "a number of hours".to_string(),
            }),
        }
    }

    for field in [FIELD_WAKE_TIME, FIELD_WORK_START_TIME] {
        match object.get(field) {
            None | Some(Value::Null) => errors.push(ValidationError::MissingField {
                field: field.to_string(),
            }),
            Some(Value::String(s)) => {
                if s.parse::<ClockTime>().is_err() {
                    errors.push(ValidationError::InvalidClockTime {
                        field: field.to_string(),
                        value: s.clone(),
                    });
                }
            }
            Some(_) => errors.push(ValidationError::WrongType {
                field: field.to_string(),
                expected: "an HH:MM string".to_string(),
            }),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_bounds() {
        let input = FatigueInput::parse(0.0, 24.0, "00:00", "23:59").unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_sleep() {
        let input = FatigueInput::parse(24.5, 8.0, "06:00", "07:00").unwrap();
        assert_eq!(
            input.validate(),
            Err(ValidationError::SleepOutOfRange {
                field: "sleepLast24".to_string(),
                value: 24.5,
            })
        );

        let input = FatigueInput::parse(8.0, -1.0, "06:00", "07:00").unwrap();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::SleepOutOfRange { ref field, .. }) if field == "sleepPrevious24"
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let input = FatigueInput::parse(f64::NAN, 8.0, "06:00", "07:00").unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_validate_value_ok() {
        let value = json!({
            "sleepLast24": 7,
            "sleepPrevious24": 6.5,
            "wakeTime": "5:30",
            "workStartTime": "13:30"
        });
        assert!(validate_value(&value).is_empty());
    }

    #[test]
    fn test_validate_value_collects_all_errors() {
        let value = json!({
            "sleepLast24": 30,
            "sleepPrevious24": "eight",
            "wakeTime": "6am"
        });
        let errors = validate_value(&value);

        assert_eq!(
            errors,
            vec![
                ValidationError::SleepOutOfRange {
                    field: "sleepLast24".to_string(),
                    value: 30.0,
                },
                ValidationError::WrongType {
                    field: "sleepPrevious24".to_string(),
                    expected: "a number of hours".to_string(),
                },
                ValidationError::InvalidClockTime {
                    field: "wakeTime".to_string(),
                    value: "6am".to_string(),
                },
                ValidationError::MissingField {
                    field: "workStartTime".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_validate_value_not_object() {
        assert_eq!(validate_value(&json!([1, 2])), vec![ValidationError::NotAnObject]);
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::InvalidClockTime {
            field: "wakeTime".to_string(),
            value: "24:00".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Field wakeTime must be a clock time in HH:MM format, got \"24:00\""
        );
    }
}

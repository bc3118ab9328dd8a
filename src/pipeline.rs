//! Pipeline orchestration
//!
//! This module provides the public API for Fatigue Check.
//! It runs the full path from caller input to a scored result:
//! validation → scoring and projection → (optional) audit record.

use crate::audit::AuditStore;
use crate::error::ComputeError;
use crate::scorer::FatigueScorer;
use crate::types::{AssessmentRecord, FatigueInput, FatigueResult};
use crate::validation::validate_value;
use uuid::Uuid;

/// Validate and score one input.
///
/// # Example
/// ```
/// use fatigue_check::{assess, FatigueInput, FatigueLevel};
///
/// let input = FatigueInput::parse(8.0, 8.0, "06:00", "07:00")?;
/// let result = assess(&input)?;
/// assert_eq!(result.level, FatigueLevel::Low);
/// # Ok::<(), fatigue_check::ComputeError>(())
/// ```
pub fn assess(input: &FatigueInput) -> Result<FatigueResult, ComputeError> {
    input.validate()?;
    Ok(FatigueScorer::new().compute_score(input))
}

/// Score a JSON input and return the JSON result.
///
/// # Arguments
/// * `raw_json` - `{"sleepLast24", "sleepPrevious24", "wakeTime", "workStartTime"}`
///
/// # Returns
/// `{"score", "level", "totalSleep48", "hoursAwake", "projections"}`
pub fn assess_json(raw_json: String) -> Result<String, ComputeError> {
    let input = parse_input(&raw_json)?;
    let result = assess(&input)?;
    Ok(serde_json::to_string(&result)?)
}

/// Parse and validate a JSON input.
///
/// Fails with the first validation problem found; use
/// [`validate_value`] to see all of them.
pub fn parse_input(raw_json: &str) -> Result<FatigueInput, ComputeError> {
    let value: serde_json::Value = serde_json::from_str(raw_json)?;

    if let Some(error) = validate_value(&value).into_iter().next() {
        return Err(error.into());
    }

    Ok(serde_json::from_value(value)?)
}

/// Processor that records every assessment in an audit store.
pub struct FatigueProcessor<S: AuditStore> {
    scorer: FatigueScorer,
    store: S,
}

impl<S: AuditStore> FatigueProcessor<S> {
    pub fn new(store: S) -> Self {
        Self {
            scorer: FatigueScorer::new(),
            store,
        }
    }

    /// Validate, score and record. Nothing is recorded for invalid input.
    pub fn process(
        &mut self,
        input: &FatigueInput,
    ) -> Result<(FatigueResult, AssessmentRecord), ComputeError> {
        input.validate()?;
        let result = self.scorer.compute_score(input);
        let record = self.store.record(input, &result)?;
        Ok((result, record))
    }

    /// JSON in, JSON result out, with the assessment recorded
    pub fn process_json(&mut self, raw_json: &str) -> Result<String, ComputeError> {
        let input = parse_input(raw_json)?;
        let (result, _) = self.process(&input)?;
        Ok(serde_json::to_string(&result)?)
    }

    /// Most recent recorded assessments, newest first
    pub fn history(&self, limit: usize) -> Result<Vec<AssessmentRecord>, ComputeError> {
        self.store.recent(limit)
    }

    pub fn lookup(&self, id: Uuid) -> Result<Option<AssessmentRecord>, ComputeError> {
        self.store.get(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{JsonlAuditStore, MemoryAuditStore};
    use crate::types::FatigueLevel;
    use crate::validation::ValidationError;
    use pretty_assertions::assert_eq;

    fn sample_json() -> &'static str {
        r#"{
            "sleepLast24": 4,
            "sleepPrevious24": 4,
            "wakeTime": "20:00",
            "workStartTime": "02:00"
        }"#
    }

    #[test]
    fn test_assess_json() {
        let output = assess_json(sample_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(payload["score"], 10);
        assert_eq!(payload["level"], "Extreme");
        assert_eq!(payload["totalSleep48"], 8.0);
        assert_eq!(payload["hoursAwake"], 6.0);

        let projections = payload["projections"].as_array().unwrap();
        assert_eq!(projections.len(), 24);
        assert_eq!(projections[0]["time"], "02:00");
        assert_eq!(projections[23]["time"], "01:00");
    }

    #[test]
    fn test_assess_json_single_digit_hour() {
        let output = assess_json(
            r#"{"sleepLast24": 7.5, "sleepPrevious24": 6, "wakeTime": "5:30", "workStartTime": "13:30"}"#
                .to_string(),
        )
        .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(payload["score"], 3);
        assert_eq!(payload["level"], "Low");
        assert_eq!(payload["hoursAwake"], 8.0);
    }

    #[test]
    fn test_invalid_json() {
        let result = assess_json("not valid json".to_string());
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }

    #[test]
    fn test_out_of_range_input() {
        let result = assess_json(
            r#"{"sleepLast24": 25, "sleepPrevious24": 8, "wakeTime": "06:00", "workStartTime": "07:00"}"#
                .to_string(),
        );
        assert!(matches!(
            result,
            Err(ComputeError::Validation(ValidationError::SleepOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_malformed_clock_is_rejected() {
        let result = parse_input(
            r#"{"sleepLast24": 8, "sleepPrevious24": 8, "wakeTime": "06:00", "workStartTime": "7am"}"#,
        );
        assert!(matches!(
            result,
            Err(ComputeError::Validation(ValidationError::InvalidClockTime { .. }))
        ));
    }

    #[test]
    fn test_assess_rejects_typed_out_of_range() {
        let input = FatigueInput::parse(-0.5, 8.0, "06:00", "07:00").unwrap();
        assert!(assess(&input).is_err());
    }

    #[test]
    fn test_processor_records_assessments() {
        let mut processor = FatigueProcessor::new(MemoryAuditStore::new());

        let input = FatigueInput::parse(8.0, 8.0, "06:00", "07:00").unwrap();
        let (result, record) = processor.process(&input).unwrap();

        assert_eq!(result.score, 0);
        assert_eq!(record.level, FatigueLevel::Low);
        assert_eq!(record.hours_awake, result.hours_awake);
        assert_eq!(processor.lookup(record.id).unwrap(), Some(record));

        processor.process_json(sample_json()).unwrap();

        let history = processor.history(10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].level, FatigueLevel::Extreme);
    }

    #[test]
    fn test_processor_skips_invalid_input() {
        let mut processor = FatigueProcessor::new(MemoryAuditStore::new());

        let input = FatigueInput::parse(30.0, 8.0, "06:00", "07:00").unwrap();
        assert!(processor.process(&input).is_err());
        assert!(processor.process_json("{}").is_err());
        assert!(processor.store().is_empty());
    }

    #[test]
    fn test_processor_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let mut processor = FatigueProcessor::new(JsonlAuditStore::new(&path));
        processor.process_json(sample_json()).unwrap();

        let reopened = FatigueProcessor::new(JsonlAuditStore::new(&path));
        let history = reopened.history(1).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].score, 10);
        assert_eq!(history[0].wake_time.to_string(), "20:00");
    }
}

//! Core types for Fatigue Check
//!
//! This module defines the data structures that cross the crate boundary: the
//! per-request input, the computed result with its hourly projection, and the
//! audit record kept by the persistence layer.
//!
//! Wire names are camelCase (`sleepLast24`, `totalSleep48`, ...).

use crate::clock::ClockTime;
use crate::error::ComputeError;
use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Highest possible fatigue score
pub const MAX_SCORE: u8 = 10;

/// Number of hourly slots in a projection
pub const PROJECTION_HOURS: usize = 24;

/// Coarse bucketing of a fatigue score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FatigueLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl FatigueLevel {
    /// Classify a score: `<=3` Low, `<=6` Moderate, `<=8` High, otherwise Extreme.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=3 => FatigueLevel::Low,
            4..=6 => FatigueLevel::Moderate,
            7..=8 => FatigueLevel::High,
            _ => FatigueLevel::Extreme,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FatigueLevel::Low => "Low",
            FatigueLevel::Moderate => "Moderate",
            FatigueLevel::High => "High",
            FatigueLevel::Extreme => "Extreme",
        }
    }

    pub fn all() -> [FatigueLevel; 4] {
        [
            FatigueLevel::Low,
            FatigueLevel::Moderate,
            FatigueLevel::High,
            FatigueLevel::Extreme,
        ]
    }
}

impl fmt::Display for FatigueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FatigueLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FatigueLevel::all()
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownLevel { value: s.to_string() })
    }
}

/// Sleep history and shift timing for one pre-shift check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueInput {
    /// Hours slept in the 24h before shift start (0-24)
    pub sleep_last_24: f64,
    /// Hours slept in the 24h period before that (0-24)
    pub sleep_previous_24: f64,
    /// Local time the worker woke up
    pub wake_time: ClockTime,
    /// Local time the shift starts
    pub work_start_time: ClockTime,
}

impl FatigueInput {
    pub fn new(
        sleep_last_24: f64,
        sleep_previous_24: f64,
        wake_time: ClockTime,
        work_start_time: ClockTime,
    ) -> Self {
        Self {
            sleep_last_24,
            sleep_previous_24,
            wake_time,
            work_start_time,
        }
    }

    /// Build from clock strings, failing on malformed times
    pub fn parse(
        sleep_last_24: f64,
        sleep_previous_24: f64,
        wake_time: &str,
        work_start_time: &str,
    ) -> Result<Self, ComputeError> {
        Ok(Self::new(
            sleep_last_24,
            sleep_previous_24,
            wake_time.parse()?,
            work_start_time.parse()?,
        ))
    }

    pub fn total_sleep_48(&self) -> f64 {
        self.sleep_last_24 + self.sleep_previous_24
    }
}

/// Projected fatigue for one hourly slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeProjection {
    /// Slot start, `HH:MM`
    pub time: String,
    pub level: FatigueLevel,
    pub score: u8,
}

/// Outcome of a fatigue assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueResult {
    /// Score at the work-start instant (0-10)
    pub score: u8,
    pub level: FatigueLevel,
    pub total_sleep_48: f64,
    /// Hours from wake to work start, one decimal place
    pub hours_awake: f64,
    /// 24 hourly slots starting at work start, non-decreasing in score
    pub projections: Vec<TimeProjection>,
}

/// One archived assessment.
///
/// Identity and timestamp are assigned by the audit store. The hourly
/// projection is not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub sleep_last_24: f64,
    pub sleep_previous_24: f64,
    pub wake_time: ClockTime,
    pub work_start_time: ClockTime,
    pub score: u8,
    pub level: FatigueLevel,
    pub total_sleep_48: f64,
    pub hours_awake: f64,
}

impl AssessmentRecord {
    pub fn new(input: &FatigueInput, result: &FatigueResult, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
            sleep_last_24: input.sleep_last_24,
            sleep_previous_24: input.sleep_previous_24,
            wake_time: input.wake_time,
            work_start_time: input.work_start_time,
            score: result.score,
            level: result.level,
            total_sleep_48: result.total_sleep_48,
            hours_awake: result.hours_awake,
        }
    }

    /// The originating input
    pub fn input(&self) -> FatigueInput {
        FatigueInput::new(
            self.sleep_last_24,
            self.sleep_previous_24,
            self.wake_time,
            self.work_start_time,
        )
    }
}

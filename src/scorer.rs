//! Fatigue scoring
//!
//! A fixed point-rule table turns sleep history and shift timing into a 0-10
//! score:
//! - Sleep in the last 24h (0-4 points)
//! - Total sleep over 48h (0-3 points)
//! - Hours awake at the evaluation instant (0-4 points)
//! - Night window 23:00-05:59 (2 points) and early start 01:00-05:59 (1 point)
//!
//! The two timing penalties overlap for hours 1-5, so those hours carry 3
//! points while hours 0 and 23 carry 2.
//!
//! The hourly projection re-evaluates the same rule for each of the 24 hours
//! from work start and never lets the score go down.

use crate::clock::ClockTime;
use crate::types::{FatigueInput, FatigueLevel, FatigueResult, TimeProjection, MAX_SCORE, PROJECTION_HOURS};
use tracing::debug;

/// Scorer for pre-shift fatigue assessments
#[derive(Debug, Clone, Copy, Default)]
pub struct FatigueScorer;

impl FatigueScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score the input at its work-start instant and project the next 24 hours
    pub fn compute_score(&self, input: &FatigueInput) -> FatigueResult {
        let minutes_awake = input.wake_time.minutes_until(input.work_start_time);
        let score = score_at(input, input.work_start_time);
        let level = FatigueLevel::from_score(score);
        let projections = self.compute_projection(input, input.work_start_time);

        debug!(
            score,
            level = level.as_str(),
            minutes_awake,
            work_start = %input.work_start_time,
            "computed fatigue score"
        );

        FatigueResult {
            score,
            level,
            total_sleep_48: input.total_sleep_48(),
            hours_awake: round_one_decimal(f64::from(minutes_awake) / 60.0),
            projections,
        }
    }

    /// Hourly projection from `work_start`, one slot per hour for 24 hours.
    ///
    /// Each slot's score is the running maximum of the raw scores so far.
    pub fn compute_projection(&self, input: &FatigueInput, work_start: ClockTime) -> Vec<TimeProjection> {
        (0..PROJECTION_HOURS as u32)
            .scan(0u8, |running_max, offset| {
                let instant = work_start.plus_hours(offset);
                *running_max = (*running_max).max(score_at(input, instant));

                Some(TimeProjection {
                    time: instant.to_string(),
                    level: FatigueLevel::from_score(*running_max),
                    score: *running_max,
                })
            })
            .collect()
    }
}

/// Raw (unsmoothed) score with `instant` as the evaluation time
pub fn score_at(input: &FatigueInput, instant: ClockTime) -> u8 {
    let hours_awake = f64::from(input.wake_time.minutes_until(instant)) / 60.0;
    let hour = instant.hour();

    let total = sleep_deficit_points(input.sleep_last_24)
        + cumulative_sleep_points(input.total_sleep_48())
        + time_awake_points(hours_awake)
        + circadian_points(hour)
        + early_start_points(hour);

    total.min(MAX_SCORE)
}

/// Points for sleep in the last 24 hours
pub fn sleep_deficit_points(sleep_last_24: f64) -> u8 {
    if sleep_last_24 < 5.0 {
        4
    } else if sleep_last_24 < 6.0 {
        3
    } else if sleep_last_24 < 7.0 {
        2
    } else if sleep_last_24 < 8.0 {
        1
    } else {
        0
    }
}

/// Points for total sleep over the last 48 hours
pub fn cumulative_sleep_points(total_sleep_48: f64) -> u8 {
    if total_sleep_48 < 12.0 {
        3
    } else if total_sleep_48 < 14.0 {
        2
    } else if total_sleep_48 < 16.0 {
        1
    } else {
        0
    }
}

/// Points for time awake; every threshold is strict
pub fn time_awake_points(hours_awake: f64) -> u8 {
    if hours_awake > 18.0 {
        4
    } else if hours_awake > 16.0 {
        3
    } else if hours_awake > 14.0 {
        2
    } else if hours_awake > 12.0 {
        1
    } else {
        0
    }
}

/// Night window: 23:00 through 05:59
pub fn circadian_points(hour: u8) -> u8 {
    if hour >= 23 || hour <= 5 {
        2
    } else {
        0
    }
}

/// Early start: 01:00 through 05:59. Midnight is excluded.
pub fn early_start_points(hour: u8) -> u8 {
    if hour > 0 && hour < 6 {
        1
    } else {
        0
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

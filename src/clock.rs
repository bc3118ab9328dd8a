//! Local wall-clock times
//!
//! All time arithmetic is done on integer minutes since midnight (0-1439) with
//! explicit modulo-1440 wraparound. There is no date and no timezone.

use crate::error::ComputeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Minutes in one day
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A local clock time, stored as minute-of-day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minute_of_day: u16,
}

impl ClockTime {
    /// Build from hour (0-23) and minute (0-59)
    pub fn new(hour: u8, minute: u8) -> Result<Self, ComputeError> {
        if hour > 23 || minute > 59 {
            return Err(ComputeError::InvalidClockTime(format!(
                "{hour}:{minute:02}"
            )));
        }
        Ok(Self {
            minute_of_day: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Build from a minute-of-day, wrapping values past midnight
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            minute_of_day: (minutes % u32::from(MINUTES_PER_DAY)) as u16,
        }
    }

    pub fn minute_of_day(&self) -> u16 {
        self.minute_of_day
    }

    pub fn hour(&self) -> u8 {
        (self.minute_of_day / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.minute_of_day % 60) as u8
    }

    /// This time shifted forward by whole hours, wrapping at 24:00
    pub fn plus_hours(&self, hours: u32) -> Self {
        Self::from_minutes(u32::from(self.minute_of_day) + hours * 60)
    }

    /// Forward wall-clock interval from `self` to `later`, in minutes.
    ///
    /// When `later` is earlier in the day it is taken to be on the following
    /// day, so the result is always in `0..1440`.
    pub fn minutes_until(&self, later: ClockTime) -> u16 {
        if later.minute_of_day >= self.minute_of_day {
            later.minute_of_day - self.minute_of_day
        } else {
            later.minute_of_day + MINUTES_PER_DAY - self.minute_of_day
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Accepts `H:MM` or `HH:MM` (hour 0-23, minute 00-59).
impl FromStr for ClockTime {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ComputeError::InvalidClockTime(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        if !(1..=2).contains(&hour.len()) || minute.len() != 2 {
            return Err(invalid());
        }
        if !all_digits(hour) || !all_digits(minute) {
            return Err(invalid());
        }

        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

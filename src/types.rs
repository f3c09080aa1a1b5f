//! Core record types for the rowsync pipeline
//!
//! These are the typed rows that flow between the stages: lap summaries
//! and per-sample trackpoints extracted from TCX files, and the merged
//! rows produced by the time aligner. Optional fields stay `None` when
//! the source element is absent; they are never defaulted, with the one
//! documented exception of an empty `Watts` element coercing to `0.0`.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Which physical recorder a table came from, for provenance in logs
/// and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Wrist unit (heart-rate source, e.g. a Garmin watch)
    Wrist,
    /// Rowing-machine head unit (power/stroke source, e.g. a Concept2 PM5)
    Erg,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Wrist => "wrist",
            Device::Erg => "erg",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one lap, extracted from a TCX `<Lap>` element.
///
/// `number` is 1-based and assigned in document order by the walker;
/// laps within one file are contiguous starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapRecord {
    pub number: u32,
    /// Lap start in the injected local timezone, offset dropped
    pub start_time: NaiveDateTime,
    /// Lap distance (meters)
    pub distance: Option<f64>,
    pub calories: Option<u32>,
    /// Lap duration (seconds)
    pub total_time: Option<f64>,
    pub max_speed: Option<f64>,
    /// Maximum heart rate (bpm)
    pub max_hr: Option<f64>,
    /// Average heart rate (bpm)
    pub avg_hr: Option<f64>,
}

/// One telemetry sample, extracted from a TCX `<Trackpoint>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackpointRecord {
    /// Sample time in the injected local timezone, offset dropped
    pub time: NaiveDateTime,
    /// Cumulative distance (meters)
    pub distance: Option<f64>,
    /// Instantaneous heart rate (bpm)
    pub heart_rate: Option<u32>,
    /// Instantaneous power (watts); `Some(0.0)` when the source element
    /// exists but is empty
    pub watt: Option<f64>,
    pub cadence: Option<f64>,
    /// Number of the enclosing lap in the same file
    pub lap: u32,
}

/// One row of the aligned report: an erg sample on the wrist clock,
/// joined with the nearest preceding wrist heart-rate sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub time: NaiveDateTime,
    pub distance: Option<f64>,
    pub watt: Option<f64>,
    pub cadence: Option<f64>,
    pub heart_rate: Option<u32>,
    /// Elapsed whole seconds since the first merged row
    pub duration: i64,
    /// `duration` rendered as an hh:mm:ss clock time of day. Durations of
    /// 24 hours or more wrap around midnight; quirk kept from the
    /// original report format.
    pub clock: String,
}

/// Column order contract for lap tables
pub const LAP_COLUMNS: [&str; 8] = [
    "number",
    "start_time",
    "distance",
    "calories",
    "total_time",
    "max_speed",
    "max_hr",
    "avg_hr",
];

/// Column order contract for trackpoint tables
pub const TRACKPOINT_COLUMNS: [&str; 6] =
    ["time", "distance", "heart_rate", "watt", "cadence", "lap"];

/// Column order contract for the merged table
pub const MERGED_COLUMNS: [&str; 7] = [
    "time",
    "distance",
    "watt",
    "cadence",
    "heart_rate",
    "duration",
    "clock",
];

//! Cross-device time alignment and as-of merge
//!
//! The wrist unit and the erg head unit each run their own clock. This
//! module concatenates and time-sorts each device's tables, measures the
//! clock offset from the two first lap starts, shifts the erg timeline
//! onto the wrist clock, and joins the two trackpoint streams with a
//! backward as-of join: every erg sample picks up the heart rate of the
//! most recent wrist sample at or before it.
//!
//! The join is a single dual-pointer sweep over the two pre-sorted
//! streams, O(n + m). Never a nested scan.

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::error::SyncError;
use crate::types::{Device, LapRecord, MergedRecord, TrackpointRecord};

/// Accumulated tables for one device, possibly spanning several files.
#[derive(Debug, Clone)]
pub struct DeviceData {
    pub device: Device,
    pub laps: Vec<LapRecord>,
    pub points: Vec<TrackpointRecord>,
}

impl DeviceData {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            laps: Vec::new(),
            points: Vec::new(),
        }
    }

    /// Append one file's tables to the running concatenation.
    pub fn append(&mut self, laps: Vec<LapRecord>, points: Vec<TrackpointRecord>) {
        self.laps.extend(laps);
        self.points.extend(points);
    }

    /// Sort laps by start time and trackpoints by sample time,
    /// independently. Stable, so rows that tie keep their file order.
    pub fn sort_by_time(&mut self) {
        self.laps.sort_by_key(|lap| lap.start_time);
        self.points.sort_by_key(|point| point.time);
    }

    /// Earliest lap start across all files.
    pub fn first_lap_start(&self) -> Option<NaiveDateTime> {
        self.laps.iter().map(|lap| lap.start_time).min()
    }

    /// Shift every timestamp in both tables by `offset`.
    pub fn shift(&mut self, offset: Duration) {
        for lap in &mut self.laps {
            lap.start_time += offset;
        }
        for point in &mut self.points {
            point.time += offset;
        }
    }

    fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.points.iter().map(|p| p.time).min()?;
        let last = self.points.iter().map(|p| p.time).max()?;
        Some((first, last))
    }
}

/// Signed clock offset between the two devices: wrist first lap start
/// minus erg first lap start.
pub fn clock_offset(wrist: &DeviceData, erg: &DeviceData) -> Result<Duration, SyncError> {
    let wrist_start = wrist
        .first_lap_start()
        .ok_or_else(|| SyncError::InsufficientData(format!("{} has no laps", wrist.device)))?;
    let erg_start = erg
        .first_lap_start()
        .ok_or_else(|| SyncError::InsufficientData(format!("{} has no laps", erg.device)))?;
    Ok(wrist_start - erg_start)
}

/// Result of aligning two devices onto the wrist clock.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub wrist: DeviceData,
    /// Erg tables with every timestamp shifted onto the wrist clock
    pub erg: DeviceData,
    /// Applied shift: wrist first lap start minus erg first lap start
    pub offset: Duration,
    pub merged: Vec<MergedRecord>,
}

/// Sort, offset, shift, and merge the two device datasets.
///
/// Fails with [`SyncError::InsufficientData`] when either device has no
/// laps or no trackpoints; an all-missing merge would be worse than an
/// error.
pub fn align(mut wrist: DeviceData, mut erg: DeviceData) -> Result<Alignment, SyncError> {
    for data in [&wrist, &erg] {
        if data.points.is_empty() {
            return Err(SyncError::InsufficientData(format!(
                "{} has no trackpoints",
                data.device
            )));
        }
    }

    wrist.sort_by_time();
    erg.sort_by_time();

    let offset = clock_offset(&wrist, &erg)?;
    erg.shift(offset);

    if let (Some((wrist_first, wrist_last)), Some((erg_first, erg_last))) =
        (wrist.span(), erg.span())
    {
        debug!(
            wrist_first = %wrist_first,
            wrist_last = %wrist_last,
            erg_first = %erg_first,
            erg_last = %erg_last,
            offset_seconds = offset.num_seconds(),
            "aligned device timelines"
        );
    }

    let merged = merge_asof(&erg.points, &wrist.points);
    Ok(Alignment {
        wrist,
        erg,
        offset,
        merged,
    })
}

/// Backward as-of join of the erg stream against the wrist stream.
///
/// Both slices must already be sorted by time; `erg` is expected to be
/// on the wrist clock. Each erg row carries the `heart_rate` of the
/// latest wrist row at or before it; rows before the first wrist sample
/// get none. Derived columns: `duration` in whole seconds since the
/// first merged row, and its hh:mm:ss clock rendering.
pub fn merge_asof(
    erg: &[TrackpointRecord],
    wrist: &[TrackpointRecord],
) -> Vec<MergedRecord> {
    let Some(first) = erg.first() else {
        return Vec::new();
    };
    let start = first.time;

    let mut merged = Vec::with_capacity(erg.len());
    let mut cursor = 0usize;
    let mut carried: Option<&TrackpointRecord> = None;

    for point in erg {
        while cursor < wrist.len() && wrist[cursor].time <= point.time {
            carried = Some(&wrist[cursor]);
            cursor += 1;
        }
        let duration = (point.time - start).num_seconds();
        merged.push(MergedRecord {
            time: point.time,
            distance: point.distance,
            watt: point.watt,
            cadence: point.cadence,
            heart_rate: carried.and_then(|w| w.heart_rate),
            duration,
            clock: clock_of_day(duration),
        });
    }

    merged
}

/// Render a duration as a clock time of day, treating it as seconds
/// since midnight. Durations of 24 hours or more wrap; kept quirk.
fn clock_of_day(duration: i64) -> String {
    let s = duration.rem_euclid(86_400);
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

//! Tabular session report
//!
//! Renders an [`Alignment`] into named sheets with the fixed column
//! order downstream tooling depends on, and writes them out as one CSV
//! file per sheet. Missing values render as empty cells, never as a
//! filled-in default.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::align::Alignment;
use crate::error::SyncError;
use crate::types::{LapRecord, MergedRecord, TrackpointRecord};
use crate::types::{LAP_COLUMNS, MERGED_COLUMNS, TRACKPOINT_COLUMNS};

/// One named table of string cells, ready for any tabular sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

fn fmt_time(time: NaiveDateTime) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn lap_row(lap: &LapRecord) -> Vec<String> {
    vec![
        lap.number.to_string(),
        fmt_time(lap.start_time),
        opt(lap.distance),
        opt(lap.calories),
        opt(lap.total_time),
        opt(lap.max_speed),
        opt(lap.max_hr),
        opt(lap.avg_hr),
    ]
}

fn point_row(point: &TrackpointRecord) -> Vec<String> {
    vec![
        fmt_time(point.time),
        opt(point.distance),
        opt(point.heart_rate),
        opt(point.watt),
        opt(point.cadence),
        point.lap.to_string(),
    ]
}

fn merged_row(row: &MergedRecord) -> Vec<String> {
    vec![
        fmt_time(row.time),
        opt(row.distance),
        opt(row.watt),
        opt(row.cadence),
        opt(row.heart_rate),
        row.duration.to_string(),
        row.clock.clone(),
    ]
}

/// The five report sheets in contract order: wrist laps, wrist
/// trackpoints, erg laps, erg trackpoints (both on the wrist clock),
/// merged.
pub fn sheets(alignment: &Alignment) -> Vec<Sheet> {
    vec![
        Sheet {
            name: "wrist_laps",
            columns: &LAP_COLUMNS,
            rows: alignment.wrist.laps.iter().map(lap_row).collect(),
        },
        Sheet {
            name: "wrist_trackpoints",
            columns: &TRACKPOINT_COLUMNS,
            rows: alignment.wrist.points.iter().map(point_row).collect(),
        },
        Sheet {
            name: "erg_laps",
            columns: &LAP_COLUMNS,
            rows: alignment.erg.laps.iter().map(lap_row).collect(),
        },
        Sheet {
            name: "erg_trackpoints",
            columns: &TRACKPOINT_COLUMNS,
            rows: alignment.erg.points.iter().map(point_row).collect(),
        },
        Sheet {
            name: "merged",
            columns: &MERGED_COLUMNS,
            rows: alignment.merged.iter().map(merged_row).collect(),
        },
    ]
}

/// Write every sheet as `<name>.csv` under `dir`.
pub fn write_csv(alignment: &Alignment, dir: &Path) -> Result<(), SyncError> {
    std::fs::create_dir_all(dir).map_err(|source| SyncError::FileAccess {
        path: dir.to_path_buf(),
        source,
    })?;

    for sheet in sheets(alignment) {
        let path = dir.join(format!("{}.csv", sheet.name));
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(sheet.columns)?;
        for row in &sheet.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|source| SyncError::FileAccess {
            path,
            source,
        })?;
    }
    Ok(())
}

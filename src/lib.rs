//! Rowsync - time-synchronized merge of rowing-machine and wrist telemetry
//!
//! Rowsync reads TCX activity recordings from two independently clocked
//! devices (a wrist unit and a rowing-machine head unit), extracts lap
//! summaries and per-sample trackpoints into typed tables, and aligns the
//! two timelines into one session report: extraction → per-device
//! concatenation → clock-offset shift → backward as-of merge.
//!
//! ## Modules
//!
//! - **extract**: typed field extraction from single lap/trackpoint nodes
//! - **walker**: whole-document traversal producing per-file tables
//! - **align**: clock offset, timeline shift, and the as-of join
//! - **pipeline**: end-to-end orchestration across files and devices
//! - **discover** / **report**: filename-prefix discovery and CSV output

pub mod align;
pub mod discover;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod walker;

pub use align::{align, clock_offset, merge_asof, Alignment, DeviceData};
pub use error::SyncError;
pub use pipeline::{load_device, sync_session};
pub use types::{Device, LapRecord, MergedRecord, TrackpointRecord};
pub use walker::load_activity;

/// Rowsync version embedded in CLI output
pub const ROWSYNC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve the system timezone by IANA name.
///
/// Only the outermost entry point should call this; everything below it
/// takes the timezone as an explicit parameter so tests can pin it.
pub fn system_timezone() -> Result<chrono_tz::Tz, SyncError> {
    let name = iana_time_zone::get_timezone()
        .map_err(|e| SyncError::UnknownTimezone(e.to_string()))?;
    name.parse().map_err(|_| SyncError::UnknownTimezone(name))
}

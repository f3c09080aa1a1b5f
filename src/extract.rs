//! Field extraction from TCX lap and trackpoint elements
//!
//! Pulls the named fields out of one `<Lap>` or `<Trackpoint>` node and
//! coerces them into a typed record. Required fields (lap `StartTime`,
//! trackpoint `Time`) fail hard when absent; optional fields come back
//! as `None`. Heart-rate elements wrap their reading in a nested
//! `<Value>` child, so extraction drills one level deeper for those.
//!
//! Timestamps carry their own offset in the source text. They are
//! converted to the injected timezone and stored naive, so every
//! downstream comparison happens on one local clock.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use roxmltree::Node;

use crate::error::SyncError;
use crate::types::{LapRecord, TrackpointRecord};

/// TCX default namespace (TrainingCenterDatabase v2)
pub const TCX_NS: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";

/// Garmin activity extension namespace, home of the `<Watts>` element
pub const ACTIVITY_EXT_NS: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";

/// First direct child with the given name in the TCX namespace.
pub(crate) fn tcx_child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name((TCX_NS, name)))
}

/// First descendant (recursive) with the given name in the activity
/// extension namespace. `<Watts>` sits under `<Extensions>/<TPX>`, at a
/// depth that has varied across recorders.
fn ext_descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|c| c.has_tag_name((ACTIVITY_EXT_NS, name)))
}

fn element_text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("").trim()
}

fn parse_f64(raw: &str, field: &'static str, path: &Path) -> Result<f64, SyncError> {
    raw.parse().map_err(|_| SyncError::FieldParse {
        path: path.to_path_buf(),
        field,
        value: raw.to_string(),
    })
}

fn parse_u32(raw: &str, field: &'static str, path: &Path) -> Result<u32, SyncError> {
    raw.parse().map_err(|_| SyncError::FieldParse {
        path: path.to_path_buf(),
        field,
        value: raw.to_string(),
    })
}

fn child_f64(
    node: Node<'_, '_>,
    name: &'static str,
    path: &Path,
) -> Result<Option<f64>, SyncError> {
    match tcx_child(node, name) {
        Some(elem) => parse_f64(element_text(elem), name, path).map(Some),
        None => Ok(None),
    }
}

/// Heart-rate wrappers (`MaximumHeartRateBpm`, `AverageHeartRateBpm`,
/// `HeartRateBpm`) hold the reading in a nested `<Value>` element.
fn hr_value<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    tcx_child(node, name).and_then(|wrapper| tcx_child(wrapper, "Value"))
}

/// Parse an offset-bearing ISO-8601 timestamp and re-express it on the
/// target local clock, dropping the offset.
pub(crate) fn to_local(
    raw: &str,
    field: &'static str,
    path: &Path,
    tz: Tz,
) -> Result<NaiveDateTime, SyncError> {
    let instant = DateTime::parse_from_rfc3339(raw).map_err(|_| SyncError::FieldParse {
        path: path.to_path_buf(),
        field,
        value: raw.to_string(),
    })?;
    Ok(instant.with_timezone(&tz).naive_local())
}

/// Extract one lap summary. `number` is the 1-based position assigned by
/// the walker; the `StartTime` attribute is required, everything else is
/// optional.
pub fn extract_lap(
    lap: Node<'_, '_>,
    number: u32,
    path: &Path,
    tz: Tz,
) -> Result<LapRecord, SyncError> {
    let start_raw = lap.attribute("StartTime").ok_or(SyncError::MissingField {
        path: path.to_path_buf(),
        field: "StartTime",
    })?;
    let start_time = to_local(start_raw, "StartTime", path, tz)?;

    let calories = match tcx_child(lap, "Calories") {
        Some(elem) => Some(parse_u32(element_text(elem), "Calories", path)?),
        None => None,
    };

    let max_hr = match hr_value(lap, "MaximumHeartRateBpm") {
        Some(value) => Some(parse_f64(element_text(value), "MaximumHeartRateBpm", path)?),
        None => None,
    };
    let avg_hr = match hr_value(lap, "AverageHeartRateBpm") {
        Some(value) => Some(parse_f64(element_text(value), "AverageHeartRateBpm", path)?),
        None => None,
    };

    Ok(LapRecord {
        number,
        start_time,
        distance: child_f64(lap, "DistanceMeters", path)?,
        calories,
        total_time: child_f64(lap, "TotalTimeSeconds", path)?,
        max_speed: child_f64(lap, "MaximumSpeed", path)?,
        max_hr,
        avg_hr,
    })
}

/// Extract one trackpoint sample, stamped with its enclosing lap number.
///
/// The `Time` child is required. A `Ok(None)` return marks a node the
/// caller should skip rather than insert; the current extraction never
/// produces it, but the walker honors it so that tolerable malformed
/// entries in future schema variants can be dropped instead of aborting
/// the file.
pub fn extract_trackpoint(
    point: Node<'_, '_>,
    lap: u32,
    path: &Path,
    tz: Tz,
) -> Result<Option<TrackpointRecord>, SyncError> {
    let time_elem = tcx_child(point, "Time").ok_or(SyncError::MissingField {
        path: path.to_path_buf(),
        field: "Time",
    })?;
    let time = to_local(element_text(time_elem), "Time", path, tz)?;

    let heart_rate = match hr_value(point, "HeartRateBpm") {
        Some(value) => Some(parse_u32(element_text(value), "HeartRateBpm", path)?),
        None => None,
    };

    // Empty <Watts/> means zero power, not a missing sample. The erg
    // emits the empty element during rest strokes.
    let watt = match ext_descendant(point, "Watts") {
        Some(elem) => {
            let raw = element_text(elem);
            if raw.is_empty() {
                Some(0.0)
            } else {
                Some(parse_f64(raw, "Watts", path)?)
            }
        }
        None => None,
    };

    Ok(Some(TrackpointRecord {
        time,
        distance: child_f64(point, "DistanceMeters", path)?,
        heart_rate,
        watt,
        cadence: child_f64(point, "Cadence", path)?,
        lap,
    }))
}

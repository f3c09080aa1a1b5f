//! Document walker: one TCX file in, two record tables out
//!
//! Parses the whole document up front (no streaming), takes the first
//! `<Activity>`, and walks laps and trackpoints in document order,
//! delegating per-node field extraction to [`crate::extract`].

use std::fs;
use std::path::Path;

use chrono_tz::Tz;
use roxmltree::Document;
use tracing::debug;

use crate::error::SyncError;
use crate::extract::{extract_lap, extract_trackpoint, tcx_child, TCX_NS};
use crate::types::{LapRecord, TrackpointRecord};

/// Load one activity file and return its lap and trackpoint tables.
///
/// Laps are numbered 1-based in document order. Trackpoints come back in
/// document order as well (lap-major, chronological within a lap); they
/// are not globally re-sorted here. Only the first `<Activity>` in the
/// file is read; multi-activity files are out of scope.
pub fn load_activity(
    path: &Path,
    tz: Tz,
) -> Result<(Vec<LapRecord>, Vec<TrackpointRecord>), SyncError> {
    let raw = fs::read_to_string(path).map_err(|source| SyncError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = Document::parse(&raw).map_err(|e| SyncError::DocumentParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let root = doc.root_element();
    let activities = tcx_child(root, "Activities").ok_or(SyncError::Schema {
        path: path.to_path_buf(),
        expected: "Activities",
    })?;
    let activity = activities
        .children()
        .find(|n| n.has_tag_name((TCX_NS, "Activity")))
        .ok_or(SyncError::Schema {
            path: path.to_path_buf(),
            expected: "Activity",
        })?;

    let mut laps = Vec::new();
    let mut points = Vec::new();

    for (idx, lap_node) in activity
        .children()
        .filter(|n| n.has_tag_name((TCX_NS, "Lap")))
        .enumerate()
    {
        let number = idx as u32 + 1;
        let lap = extract_lap(lap_node, number, path, tz)?;
        debug!(lap = number, start = %lap.start_time, "lap boundary");

        // A lap may carry several <Track> segments; only the first is
        // read, mirroring the first-Activity rule above. A lap with no
        // track contributes no samples.
        if let Some(track) = tcx_child(lap_node, "Track") {
            for point_node in track
                .children()
                .filter(|n| n.has_tag_name((TCX_NS, "Trackpoint")))
            {
                // None marks a tolerably malformed node: skip, don't insert.
                if let Some(point) = extract_trackpoint(point_node, number, path, tz)? {
                    points.push(point);
                }
            }
        }

        laps.push(lap);
    }

    debug!(
        path = %path.display(),
        laps = laps.len(),
        points = points.len(),
        "scanned activity file"
    );

    Ok((laps, points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ACTIVITY_EXT_NS;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ROME: Tz = chrono_tz::Europe::Rome;

    const TWO_LAP_FILE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2"
                        xmlns:ns3="http://www.garmin.com/xmlschemas/ActivityExtension/v2">
  <Activities>
    <Activity Sport="Other">
      <Id>2022-01-03T14:00:00Z</Id>
      <Lap StartTime="2022-01-03T14:00:00Z">
        <TotalTimeSeconds>60.0</TotalTimeSeconds>
        <DistanceMeters>250.0</DistanceMeters>
        <Calories>15</Calories>
        <Track>
          <Trackpoint>
            <Time>2022-01-03T14:00:01Z</Time>
            <DistanceMeters>4.2</DistanceMeters>
            <Cadence>24</Cadence>
            <Extensions><ns3:TPX><ns3:Watts>180</ns3:Watts></ns3:TPX></Extensions>
          </Trackpoint>
          <Trackpoint>
            <Time>2022-01-03T14:00:02Z</Time>
            <DistanceMeters>8.5</DistanceMeters>
          </Trackpoint>
        </Track>
      </Lap>
      <Lap StartTime="2022-01-03T14:01:00Z">
        <DistanceMeters>255.0</DistanceMeters>
        <Track>
          <Trackpoint>
            <Time>2022-01-03T14:01:01Z</Time>
            <HeartRateBpm><Value>131</Value></HeartRateBpm>
          </Trackpoint>
        </Track>
      </Lap>
    </Activity>
  </Activities>
</TrainingCenterDatabase>
"#;

    fn write_fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn walks_laps_and_trackpoints_in_document_order() {
        let file = write_fixture(TWO_LAP_FILE);
        let (laps, points) = load_activity(file.path(), ROME).unwrap();

        assert_eq!(laps.len(), 2);
        assert_eq!(laps[0].number, 1);
        assert_eq!(laps[1].number, 2);
        assert_eq!(laps[0].calories, Some(15));
        assert_eq!(laps[1].calories, None);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].lap, 1);
        assert_eq!(points[1].lap, 1);
        assert_eq!(points[2].lap, 2);
        assert_eq!(points[0].watt, Some(180.0));
        assert_eq!(points[1].watt, None);
        assert_eq!(points[2].heart_rate, Some(131));
        assert!(points[0].time < points[1].time);
        assert!(points[1].time < points[2].time);
    }

    #[test]
    fn loading_twice_yields_identical_tables() {
        let file = write_fixture(TWO_LAP_FILE);
        let first = load_activity(file.path(), ROME).unwrap();
        let second = load_activity(file.path(), ROME).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn lap_without_track_contributes_no_points() {
        let xml = format!(
            r#"<TrainingCenterDatabase xmlns="{TCX_NS}" xmlns:ns3="{ACTIVITY_EXT_NS}">
              <Activities><Activity Sport="Other">
                <Lap StartTime="2022-01-03T14:00:00Z"><Calories>5</Calories></Lap>
              </Activity></Activities>
            </TrainingCenterDatabase>"#
        );
        let file = write_fixture(&xml);
        let (laps, points) = load_activity(file.path(), ROME).unwrap();
        assert_eq!(laps.len(), 1);
        assert!(points.is_empty());
    }

    #[test]
    fn missing_activities_container_is_a_schema_error() {
        let xml = format!(
            r#"<TrainingCenterDatabase xmlns="{TCX_NS}"><Author/></TrainingCenterDatabase>"#
        );
        let file = write_fixture(&xml);
        let err = load_activity(file.path(), ROME).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Schema {
                expected: "Activities",
                ..
            }
        ));
    }

    #[test]
    fn empty_activities_container_is_a_schema_error() {
        let xml = format!(
            r#"<TrainingCenterDatabase xmlns="{TCX_NS}"><Activities/></TrainingCenterDatabase>"#
        );
        let file = write_fixture(&xml);
        let err = load_activity(file.path(), ROME).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Schema {
                expected: "Activity",
                ..
            }
        ));
    }

    #[test]
    fn malformed_markup_is_a_parse_error() {
        let file = write_fixture("<TrainingCenterDatabase><Activities>");
        let err = load_activity(file.path(), ROME).unwrap_err();
        assert!(matches!(err, SyncError::DocumentParse { .. }));
    }

    #[test]
    fn missing_file_is_a_file_access_error() {
        let err = load_activity(Path::new("does-not-exist.tcx"), ROME).unwrap_err();
        assert!(matches!(err, SyncError::FileAccess { .. }));
    }
}

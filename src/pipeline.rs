//! Pipeline orchestration
//!
//! End-to-end entry points: load every file for each device, concatenate
//! the per-file tables, then hand both datasets to the aligner. One
//! logical thread of control; the accumulating [`DeviceData`] is owned
//! here and nowhere else.

use std::path::PathBuf;

use chrono_tz::Tz;
use tracing::info;

use crate::align::{align, Alignment, DeviceData};
use crate::error::SyncError;
use crate::types::Device;
use crate::walker::load_activity;

/// Load and concatenate every file recorded by one device.
///
/// Any failing file aborts the whole load; a partial device table would
/// poison the downstream merge.
pub fn load_device(device: Device, paths: &[PathBuf], tz: Tz) -> Result<DeviceData, SyncError> {
    if paths.is_empty() {
        return Err(SyncError::InsufficientData(format!(
            "no files for {device}"
        )));
    }

    let mut data = DeviceData::new(device);
    for path in paths {
        let (laps, points) = load_activity(path, tz)?;
        data.append(laps, points);
    }

    info!(
        device = %device,
        files = paths.len(),
        laps = data.laps.len(),
        points = data.points.len(),
        "loaded device recordings"
    );
    Ok(data)
}

/// Run the whole session: load both devices, align the erg timeline onto
/// the wrist clock, and merge the trackpoint streams.
pub fn sync_session(
    wrist_paths: &[PathBuf],
    erg_paths: &[PathBuf],
    tz: Tz,
) -> Result<Alignment, SyncError> {
    let wrist = load_device(Device::Wrist, wrist_paths, tz)?;
    let erg = load_device(Device::Erg, erg_paths, tz)?;
    align(wrist, erg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::io::Write;
    use tempfile::TempDir;

    const ROME: Tz = chrono_tz::Europe::Rome;

    fn tcx(laps: &str) -> String {
        format!(
            r#"<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2"
                        xmlns:ns3="http://www.garmin.com/xmlschemas/ActivityExtension/v2">
  <Activities><Activity Sport="Other">{laps}</Activity></Activities>
</TrainingCenterDatabase>"#
        )
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn empty_path_set_is_insufficient_data() {
        let err = load_device(Device::Erg, &[], ROME).unwrap_err();
        assert!(matches!(err, SyncError::InsufficientData(_)));
    }

    #[test]
    fn session_runs_end_to_end_across_files() {
        let dir = TempDir::new().unwrap();

        // Wrist clock runs 125 s ahead of the erg clock.
        let wrist = write(
            &dir,
            "activity_wrist.tcx",
            &tcx(r#"<Lap StartTime="2022-01-03T10:00:05Z"><Track>
                <Trackpoint><Time>2022-01-03T10:00:06Z</Time>
                  <HeartRateBpm><Value>100</Value></HeartRateBpm></Trackpoint>
                <Trackpoint><Time>2022-01-03T10:00:16Z</Time>
                  <HeartRateBpm><Value>110</Value></HeartRateBpm></Trackpoint>
              </Track></Lap>"#),
        );
        let erg_a = write(
            &dir,
            "concept2_a.tcx",
            &tcx(r#"<Lap StartTime="2022-01-03T09:58:00Z"><Track>
                <Trackpoint><Time>2022-01-03T09:58:04Z</Time>
                  <DistanceMeters>10.0</DistanceMeters>
                  <Extensions><ns3:TPX><ns3:Watts>150</ns3:Watts></ns3:TPX></Extensions>
                </Trackpoint>
              </Track></Lap>"#),
        );
        let erg_b = write(
            &dir,
            "concept2_b.tcx",
            &tcx(r#"<Lap StartTime="2022-01-03T09:58:10Z"><Track>
                <Trackpoint><Time>2022-01-03T09:58:13Z</Time>
                  <DistanceMeters>40.0</DistanceMeters>
                  <Extensions><ns3:TPX><ns3:Watts>200</ns3:Watts></ns3:TPX></Extensions>
                </Trackpoint>
              </Track></Lap>"#),
        );

        let alignment =
            sync_session(&[wrist], &[erg_a, erg_b], ROME).unwrap();

        assert_eq!(alignment.offset, Duration::seconds(125));
        assert_eq!(alignment.erg.laps.len(), 2);
        assert_eq!(alignment.merged.len(), 2);
        // 09:58:04 + 125 s lands between the two wrist samples
        assert_eq!(alignment.merged[0].heart_rate, Some(100));
        assert_eq!(alignment.merged[1].heart_rate, Some(110));
        assert_eq!(alignment.merged[0].watt, Some(150.0));
        assert_eq!(alignment.merged[1].watt, Some(200.0));
        assert_eq!(alignment.merged[1].duration, 9);
    }

    #[test]
    fn failing_file_aborts_the_session() {
        let dir = TempDir::new().unwrap();
        let wrist = write(
            &dir,
            "activity_wrist.tcx",
            &tcx(r#"<Lap StartTime="2022-01-03T10:00:05Z"><Track>
                <Trackpoint><Time>2022-01-03T10:00:06Z</Time></Trackpoint>
              </Track></Lap>"#),
        );
        let broken = write(&dir, "concept2_bad.tcx", "<TrainingCenterDatabase>");

        let err = sync_session(&[wrist], &[broken], ROME).unwrap_err();
        assert!(matches!(err, SyncError::DocumentParse { .. }));
    }
}

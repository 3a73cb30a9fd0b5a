//! Timestamped snapshot persistence.
//!
//! Every capture cycle writes one JPEG copy into the output directory —
//! write-once, never read back. A failure here is logged by the caller and
//! does not abort the cycle.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use scry_core::CaptureMode;

/// Build the snapshot filename for a capture at the given time.
///
/// Full-frame captures use the `capture_` prefix, region captures `region_`,
/// followed by a `YYYYMMDD_HHMMSS` timestamp.
pub fn snapshot_filename(mode: CaptureMode, at: DateTime<Local>) -> String {
    format!(
        "{}_{}.jpg",
        mode.snapshot_prefix(),
        at.format("%Y%m%d_%H%M%S")
    )
}

/// Write a timestamped JPEG copy into `dir`, creating it if needed.
///
/// Returns the path of the written file.
pub fn persist_snapshot(
    dir: &Path,
    mode: CaptureMode,
    jpeg: &[u8],
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_filename(mode, Local::now()));
    std::fs::write(&path, jpeg)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_format() {
        let at = Local.with_ymd_and_hms(2026, 8, 24, 13, 5, 9).unwrap();
        assert_eq!(
            snapshot_filename(CaptureMode::FullFrame, at),
            "capture_20260824_130509.jpg"
        );
        assert_eq!(
            snapshot_filename(CaptureMode::CenterCrop, at),
            "region_20260824_130509.jpg"
        );
    }

    #[test]
    fn writes_file_into_created_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("captures");
        let path = persist_snapshot(&dir, CaptureMode::FullFrame, b"\xFF\xD8fake").unwrap();
        assert!(path.starts_with(&dir));
        assert_eq!(std::fs::read(&path).unwrap(), b"\xFF\xD8fake");
    }

    #[test]
    fn region_snapshot_uses_region_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let path = persist_snapshot(tmp.path(), CaptureMode::CenterCrop, b"x").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("region_"), "unexpected name: {name}");
    }

    #[test]
    fn unwritable_dir_errors() {
        // A path under an existing *file* cannot be created as a directory.
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let result = persist_snapshot(&blocker.join("sub"), CaptureMode::FullFrame, b"x");
        assert!(result.is_err());
    }
}

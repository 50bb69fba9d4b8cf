//! Per-device append-only CSV logs.
//!
//! Each device owns the file `data-<id>.csv` in the data directory. The device ID is used as-is
//! in the file name. Lines are appended with one write each and no in-process lock, so concurrent
//! requests for the same device rely on `O_APPEND`.

use std::{
    io::Error as IoError,
    path::{Path, PathBuf},
};

use log::warn;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use super::Reading;

/// Provides append operations on device log files under one directory.
#[derive(Clone, Debug)]
pub struct DeviceLog {
    data_dir: PathBuf,
}

impl DeviceLog {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        DeviceLog {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// The log file path for the device.
    pub fn file_path(&self, device_id: &str) -> PathBuf {
        self.data_dir.join(format!("data-{}.csv", device_id))
    }

    /// To append one reading line to the device's log file.
    ///
    /// Only the open error is returned. An error while writing the opened file is logged and
    /// ignored.
    pub async fn append(&self, reading: &Reading) -> Result<(), IoError> {
        const FN_NAME: &'static str = "DeviceLog::append";

        let path = self.file_path(reading.device_id.as_str());
        let mut file = open_append(&path).await?;
        if let Err(e) = file.write_all(reading.to_csv_line().as_bytes()).await {
            warn!("[{}] write {} error: {}", FN_NAME, path.display(), e);
            return Ok(());
        }
        if let Err(e) = file.flush().await {
            warn!("[{}] flush {} error: {}", FN_NAME, path.display(), e);
        }
        Ok(())
    }
}

#[cfg(unix)]
async fn open_append(path: &Path) -> Result<tokio::fs::File, IoError> {
    let mut opts = OpenOptions::new();
    opts.append(true).create(true).mode(0o600);
    opts.open(path).await
}

#[cfg(not(unix))]
async fn open_append(path: &Path) -> Result<tokio::fs::File, IoError> {
    let mut opts = OpenOptions::new();
    opts.append(true).create(true);
    opts.open(path).await
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn file_path_uses_device_id_verbatim() {
        let log = DeviceLog::new("/var/weather");
        assert_eq!(
            log.file_path("42"),
            PathBuf::from("/var/weather/data-42.csv")
        );
        assert_eq!(
            log.file_path("a b,c"),
            PathBuf::from("/var/weather/data-a b,c.csv")
        );
    }

    #[tokio::test]
    async fn append_creates_and_grows_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = DeviceLog::new(dir.path());
        let time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        log.append(&Reading::new("7", "21.0", time)).await.unwrap();
        log.append(&Reading::new("7", "21.5", time)).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("data-7.csv")).unwrap();
        assert_eq!(
            content,
            "2024-03-01T12:00:00.000Z, 21.0\n2024-03-01T12:00:00.000Z, 21.5\n"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn append_creates_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = DeviceLog::new(dir.path());
        log.append(&Reading::new("perm", "1", Utc::now()))
            .await
            .unwrap();
        let meta = std::fs::metadata(dir.path().join("data-perm.csv")).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[tokio::test]
    async fn append_fails_on_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log = DeviceLog::new(dir.path().join("missing"));
        assert!(log.append(&Reading::new("1", "2", Utc::now())).await.is_err());
    }
}

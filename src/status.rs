//! Service status
//!
//! Runtime information reported by `GET /status`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Status snapshot
#[derive(Debug, Serialize)]
pub struct NutChatStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,

    pub nutrition_path: String,
    pub nutrition_size_bytes: Option<u64>,
    pub nutrition_records: usize,

    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Tracks service start time and the loaded reference table
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    nutrition_path: PathBuf,
    nutrition_records: usize,
}

impl StatusTracker {
    pub fn new(nutrition_path: PathBuf, nutrition_records: usize) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            nutrition_path,
            nutrition_records,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> NutChatStatus {
        let build_info = BuildInfo::current();

        let nutrition_size_bytes = std::fs::metadata(&self.nutrition_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutChatStatus {
            name: build_info.name,
            version: build_info.version,
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            nutrition_path: self.nutrition_path.display().to_string(),
            nutrition_size_bytes,
            nutrition_records: self.nutrition_records,
            started_at: self.started_at.to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_status_reports_reference_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let tracker = StatusTracker::new(file.path().to_path_buf(), 42);
        let status = tracker.get_status();

        assert_eq!(status.nutrition_records, 42);
        assert_eq!(status.nutrition_size_bytes, Some(2));
        assert_eq!(status.process_id, std::process::id());
        assert!(!status.version.is_empty());
        assert!(DateTime::parse_from_rfc3339(&status.started_at).is_ok());
    }

    #[test]
    fn test_status_missing_file() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/nutrition.db"), 0);
        assert!(tracker.get_status().nutrition_size_bytes.is_none());
    }
}

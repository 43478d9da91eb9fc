use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::warn;

pub const AUDIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write-only, timestamped record of every command attempt and its outcome.
pub struct AuditLogger {
    path: PathBuf,
}

impl AuditLogger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `[YYYY-MM-DD HH:MM:SS] message`. Failures never reach the caller.
    pub fn record(&self, message: &str) {
        let line = format!("[{}] {}\n", Local::now().format(AUDIT_TIME_FORMAT), message);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(err) = written {
            warn!("audit log {} not written: {}", self.path.display(), err);
        }
    }

    pub fn success(&self, message: &str) {
        self.record(&format!("SUCCESS: {}", message));
    }

    pub fn error(&self, message: &str) {
        self.record(&format!("ERROR: {}", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditLogger::new(dir.path().join("shell.log"));
        audit.record("ls -l");
        audit.success("listed .");
        audit.error("not found: x");

        let content = fs::read_to_string(audit.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('['));
        assert_eq!(&lines[0][21..], " ls -l");
        assert!(lines[1].ends_with("] SUCCESS: listed ."));
        assert!(lines[2].ends_with("] ERROR: not found: x"));
    }

    #[test]
    fn unwritable_sink_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened for appending
        let audit = AuditLogger::new(dir.path().to_path_buf());
        audit.record("still fine");
    }
}

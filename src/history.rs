use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::error::{Result, ShellError};

/// Append-only log of raw command lines, oldest first, one per line.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| ShellError::io(&self.path, err))?;
        writeln!(file, "{}", line.trim()).map_err(|err| ShellError::io(&self.path, err))
    }

    /// Up to the last `n` entries, oldest of the window first.
    pub fn last(&self, n: usize) -> Result<Vec<String>> {
        let entries = self.read_entries()?;
        let skip = entries.len().saturating_sub(n);
        Ok(entries.into_iter().skip(skip).collect())
    }

    /// Removes and returns the most recent entry.
    pub fn pop(&self) -> Result<Option<String>> {
        let mut entries = self.read_entries()?;
        let Some(last) = entries.pop() else {
            return Ok(None);
        };
        self.rewrite(&entries)?;
        Ok(Some(last))
    }

    fn read_entries(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|err| ShellError::io(&self.path, err))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    // Write the remaining entries to a sibling temp file and swap it in, so an
    // interrupted pop leaves either the old or the new history behind.
    fn rewrite(&self, entries: &[String]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|err| ShellError::io(&dir, err))?;
        for entry in entries {
            writeln!(tmp, "{}", entry).map_err(|err| ShellError::io(tmp.path(), err))?;
        }
        tmp.persist(&self.path)
            .map_err(|err| ShellError::io(&self.path, err.error))?;
        Ok(())
    }
}

//! Append-only JSON-lines journal.
//!
//! One line per committed mutation. The journal is the durable copy of the store:
//! replaying it from the top rebuilds the exact collection, including the id sequence.

use super::types::{Report, ReportId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEvent {
    Created { report: Report },
    StatusUpdated { id: ReportId, resolved: bool },
}

pub struct Journal {
    path: PathBuf,
    file: File,
}

impl Journal {
    /// Opens (or creates) the journal at `path` and returns every event already in it.
    ///
    /// A trailing line without a newline that does not parse is the remains of an
    /// interrupted append; it is cut off so the next append starts on a clean line.
    /// A malformed line anywhere else is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<JournalEvent>)> {
        let path = path.as_ref().to_path_buf();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading journal {}", path.display()));
            }
        };

        let mut events = Vec::new();
        let mut good_len = 0usize;
        let mut needs_newline = false;

        for (line_no, chunk) in bytes.split_inclusive(|b| *b == b'\n').enumerate() {
            let complete = chunk.ends_with(b"\n");
            let line = chunk.strip_suffix(b"\n").unwrap_or(chunk);

            if line.iter().all(|b| b.is_ascii_whitespace()) {
                if complete {
                    good_len += chunk.len();
                }
                continue;
            }

            match serde_json::from_slice::<JournalEvent>(line) {
                Ok(event) => {
                    events.push(event);
                    good_len += chunk.len();
                    needs_newline = !complete;
                }
                Err(e) if !complete => {
                    tracing::warn!(
                        "Dropping torn trailing entry in journal {}: {}",
                        path.display(),
                        e
                    );
                    break;
                }
                Err(e) => {
                    anyhow::bail!(
                        "journal {} is corrupt at line {}: {}",
                        path.display(),
                        line_no + 1,
                        e
                    );
                }
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening journal {}", path.display()))?;

        if good_len < bytes.len() {
            file.set_len(good_len as u64)
                .with_context(|| format!("truncating journal {}", path.display()))?;
        }
        if needs_newline {
            file.write_all(b"\n")?;
        }

        tracing::info!(
            "Opened journal {} with {} event(s)",
            path.display(),
            events.len()
        );

        Ok((Self { path, file }, events))
    }

    /// Writes one event and forces it to disk before returning.
    pub fn append(&mut self, event: &JournalEvent) -> Result<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.file
            .write_all(&line)
            .with_context(|| format!("appending to journal {}", self.path.display()))?;
        self.file
            .sync_data()
            .with_context(|| format!("syncing journal {}", self.path.display()))?;
        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Swaps the append handle for a read-only one so every later append fails.
    #[cfg(test)]
    pub(crate) fn make_read_only(&mut self) -> Result<()> {
        self.file = File::open(&self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

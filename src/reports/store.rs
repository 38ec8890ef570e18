use super::error::{StoreError, StoreResult};
use super::journal::{Journal, JournalEvent};
use super::normalize;
use super::types::{NewReport, Report, ReportId, StatusUpdate};

use anyhow::Result;
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The single owner of all reports.
///
/// Single-record reads go straight to the `DashMap`. Every mutation goes through
/// `writer`, which serializes id allocation, the journal append and the in-memory
/// commit; `list_all` takes it too so a listing never interleaves with a commit. The
/// lock is synchronous and never held across an `.await`.
pub struct ReportStore {
    records: DashMap<ReportId, Report>,
    writer: Mutex<Writer>,
    closed: AtomicBool,
}

struct Writer {
    next_id: u64,
    journal: Option<Journal>,
    /// Set after a failed append; the journal tail may hold a partial line.
    broken: bool,
}

impl Writer {
    fn record(&mut self, event: &JournalEvent) -> StoreResult<()> {
        if self.broken {
            return Err(StoreError::Unavailable(
                "journal failed earlier, restart required".to_string(),
            ));
        }
        match self.journal.as_mut() {
            Some(journal) => journal.append(event).map_err(|e| {
                tracing::error!("Journal append failed: {:#}", e);
                self.broken = true;
                StoreError::Unavailable(format!("{:#}", e))
            }),
            None => Ok(()),
        }
    }
}

impl ReportStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            records: DashMap::new(),
            writer: Mutex::new(Writer {
                next_id: 1,
                journal: None,
                broken: false,
            }),
            closed: AtomicBool::new(false),
        }
    }

    /// A store backed by the journal at `path`, rebuilt from whatever it already holds.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let (journal, events) = Journal::open(path)?;
        let records = DashMap::new();
        let mut last_id = 0u64;

        for event in events {
            match event {
                JournalEvent::Created { report } => {
                    last_id = last_id.max(report.id.0);
                    if records.insert(report.id, report).is_some() {
                        anyhow::bail!("journal {} assigns an id twice", journal.path().display());
                    }
                }
                JournalEvent::StatusUpdated { id, resolved } => {
                    let mut entry = records.get_mut(&id).ok_or_else(|| {
                        anyhow::anyhow!(
                            "journal {} updates unknown report {}",
                            journal.path().display(),
                            id
                        )
                    })?;
                    entry.resolved = resolved;
                }
            }
        }

        tracing::info!("Restored {} report(s), next id {}", records.len(), last_id + 1);

        Ok(Self {
            records,
            writer: Mutex::new(Writer {
                next_id: last_id + 1,
                journal: Some(journal),
                broken: false,
            }),
            closed: AtomicBool::new(false),
        })
    }

    fn lock_writer(&self) -> StoreResult<MutexGuard<'_, Writer>> {
        self.ensure_open()?;
        let guard = self
            .writer
            .lock()
            .map_err(|_| StoreError::Unavailable("writer lock poisoned".to_string()))?;
        // shutdown() may have won the race for the lock
        self.ensure_open()?;
        Ok(guard)
    }

    /// `Unavailable` once the store has been shut down.
    pub fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("store is shut down".to_string()));
        }
        Ok(())
    }

    /// Validates and normalizes `input`, then commits it under a fresh id.
    ///
    /// Fields are checked in the order `lat`, `lon`, `resolved`, `time`; the first
    /// failure is returned and nothing is written.
    pub fn create(&self, input: NewReport) -> StoreResult<Report> {
        let lat = normalize::latitude(input.lat.as_ref())?;
        let lon = normalize::longitude(input.lon.as_ref())?;
        let resolved = normalize::resolved(input.resolved.as_ref())?;
        let time = normalize::timestamp(input.time.as_ref())?;

        let mut writer = self.lock_writer()?;
        let id = ReportId(writer.next_id);
        // burned even if the append below fails
        writer.next_id += 1;

        let report = Report {
            id,
            lat,
            lon,
            time,
            resolved,
        };
        writer.record(&JournalEvent::Created {
            report: report.clone(),
        })?;
        self.records.insert(id, report.clone());
        drop(writer);

        tracing::info!("Created report {} at ({}, {})", id, lat, lon);
        Ok(report)
    }

    /// Every report in creation order.
    ///
    /// Holds the writer lock while copying, so the result is a point-in-time snapshot:
    /// no create or update lands halfway through it.
    pub fn list_all(&self) -> StoreResult<Vec<Report>> {
        let writer = self.lock_writer()?;
        let mut reports: Vec<Report> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        drop(writer);
        reports.sort_by_key(|report| report.id);
        Ok(reports)
    }

    /// Overwrites the `resolved` flag of an existing report and nothing else.
    pub fn update_status(&self, update: StatusUpdate) -> StoreResult<Report> {
        let id = normalize::report_id(update.id.as_ref())?;
        let resolved = normalize::resolved(update.resolved.as_ref())?;

        let mut writer = self.lock_writer()?;
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        writer.record(&JournalEvent::StatusUpdated { id, resolved })?;
        entry.resolved = resolved;
        let report = entry.value().clone();
        drop(entry);
        drop(writer);

        tracing::info!("Report {} marked resolved={}", id, resolved);
        Ok(report)
    }

    pub fn get(&self, id: ReportId) -> Option<Report> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn fail_journal_appends(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("writer lock poisoned"))?;
        match writer.journal.as_mut() {
            Some(journal) => journal.make_read_only(),
            None => anyhow::bail!("store has no journal"),
        }
    }

    /// Flushes and closes the journal. Every later call returns `Unavailable`.
    pub fn shutdown(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("writer lock poisoned"))?;
        self.closed.store(true, Ordering::Release);
        if let Some(mut journal) = writer.journal.take() {
            journal.sync()?;
            tracing::info!("Closed journal {}", journal.path().display());
        }
        Ok(())
    }
}

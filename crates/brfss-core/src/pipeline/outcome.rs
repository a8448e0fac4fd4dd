//! Terminal states of an entry and the per-run report.

use std::path::{Path, PathBuf};

use crate::catalog::DownloadEntry;
use crate::extract::ExtractError;
use crate::transfer::{TlsMode, TransferError};

/// How processing one entry ended.
#[derive(Debug)]
pub enum EntryOutcome {
    /// Artifact already present; nothing was touched.
    Skipped { artifact: PathBuf },
    /// Downloaded and unpacked.
    Completed {
        bytes: u64,
        tls: TlsMode,
        extracted: Vec<PathBuf>,
        /// False when the archive could not be deleted after extraction.
        archive_removed: bool,
    },
    /// Both transfer attempts failed (or the only one, without fallback).
    AcquireFailed(TransferError),
    /// The archive was downloaded but could not be unpacked. It stays on disk.
    ExtractFailed { archive: PathBuf, error: ExtractError },
}

impl EntryOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            EntryOutcome::AcquireFailed(_) | EntryOutcome::ExtractFailed { .. }
        )
    }

    /// Short state name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            EntryOutcome::Skipped { .. } => "skipped",
            EntryOutcome::Completed { .. } => "completed",
            EntryOutcome::AcquireFailed(_) => "acquire_failed",
            EntryOutcome::ExtractFailed { .. } => "extract_failed",
        }
    }
}

/// Progress notifications emitted while an entry is processed.
#[derive(Debug)]
pub enum EntryEvent<'a> {
    Started,
    Downloading { url: &'a str },
    /// The verified attempt failed; retrying once with verification disabled.
    Retrying { error: &'a TransferError },
    Saved { archive: &'a Path, bytes: u64, tls: TlsMode },
    Extracting { archive: &'a Path },
    Extracted { dest_dir: &'a Path, files: &'a [PathBuf] },
    ArchiveRemoved { archive: &'a Path },
    Finished(&'a EntryOutcome),
}

/// Outcomes of a whole run, in catalog order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<(DownloadEntry, EntryOutcome)>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped { .. }))
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Completed { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(EntryOutcome::is_failure)
    }

    /// Years whose entry ended in a failure state.
    pub fn failed_years(&self) -> Vec<u16> {
        self.results
            .iter()
            .filter(|(_, o)| o.is_failure())
            .map(|(e, _)| e.year)
            .collect()
    }
}

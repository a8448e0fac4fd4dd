//! The fetch-and-extract loop.
//!
//! Entries are processed one at a time in catalog order. Every failure is
//! contained in the entry's [`EntryOutcome`]; only setting up the destination
//! directory can fail the run as a whole.
//!
//! Per entry: existence check → acquire → unpack → remove archive.
//! An archive whose unpack fails is left in place and gets overwritten by the
//! next run's download.

mod outcome;

pub use outcome::{EntryEvent, EntryOutcome, RunReport};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifacts;
use crate::catalog::{Catalog, DownloadEntry};
use crate::extract;
use crate::transfer::{self, Fetcher};

/// Sequential fetch-and-extract runner bound to one destination directory.
pub struct Pipeline<F> {
    fetcher: F,
    dest_dir: PathBuf,
    insecure_fallback: bool,
}

impl<F: Fetcher> Pipeline<F> {
    pub fn new(fetcher: F, dest_dir: impl Into<PathBuf>, insecure_fallback: bool) -> Self {
        Self {
            fetcher,
            dest_dir: dest_dir.into(),
            insecure_fallback,
        }
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Process every entry of `catalog`. Creates the destination directory first.
    pub fn run(
        &self,
        catalog: &Catalog,
        on_event: &mut dyn FnMut(&DownloadEntry, EntryEvent<'_>),
    ) -> Result<RunReport> {
        fs::create_dir_all(&self.dest_dir).with_context(|| {
            format!("create destination directory {}", self.dest_dir.display())
        })?;
        if self.insecure_fallback {
            tracing::warn!("insecure TLS fallback is enabled for this run");
        }

        let mut report = RunReport::default();
        for entry in catalog {
            let outcome = self.process_entry(entry, on_event);
            report.results.push((entry.clone(), outcome));
        }
        tracing::info!(
            completed = report.completed(),
            skipped = report.skipped(),
            failed = report.failed(),
            "run finished"
        );
        Ok(report)
    }

    /// Drive one entry to a terminal state. Never panics on I/O or network errors.
    pub fn process_entry(
        &self,
        entry: &DownloadEntry,
        on_event: &mut dyn FnMut(&DownloadEntry, EntryEvent<'_>),
    ) -> EntryOutcome {
        on_event(entry, EntryEvent::Started);
        let outcome = self.drive(entry, on_event);
        tracing::info!(year = entry.year, state = outcome.label(), "entry done");
        on_event(entry, EntryEvent::Finished(&outcome));
        outcome
    }

    fn drive(
        &self,
        entry: &DownloadEntry,
        on_event: &mut dyn FnMut(&DownloadEntry, EntryEvent<'_>),
    ) -> EntryOutcome {
        let artifact_name = entry.artifact_name();
        match artifacts::find_artifact(&self.dest_dir, &artifact_name) {
            Ok(Some(artifact)) => {
                tracing::debug!(year = entry.year, artifact = %artifact.display(), "artifact present");
                return EntryOutcome::Skipped { artifact };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    year = entry.year,
                    "could not scan {}: {}; treating artifact as missing",
                    self.dest_dir.display(),
                    e
                );
            }
        }

        let archive = entry.archive_path(&self.dest_dir);
        on_event(entry, EntryEvent::Downloading { url: &entry.url });
        let acquired = match transfer::acquire(
            &self.fetcher,
            &entry.url,
            &archive,
            self.insecure_fallback,
            &mut |error| on_event(entry, EntryEvent::Retrying { error }),
        ) {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(year = entry.year, url = %entry.url, "download failed: {}", e);
                return EntryOutcome::AcquireFailed(e);
            }
        };
        on_event(
            entry,
            EntryEvent::Saved {
                archive: &archive,
                bytes: acquired.bytes,
                tls: acquired.tls,
            },
        );

        on_event(entry, EntryEvent::Extracting { archive: &archive });
        let extracted = match extract::extract_zip(&archive, &self.dest_dir) {
            Ok(files) => files,
            Err(error) => {
                tracing::error!(
                    year = entry.year,
                    archive = %archive.display(),
                    "extraction failed, archive left in place: {}",
                    error
                );
                return EntryOutcome::ExtractFailed { archive, error };
            }
        };
        on_event(
            entry,
            EntryEvent::Extracted {
                dest_dir: &self.dest_dir,
                files: &extracted,
            },
        );
        if !extracted
            .iter()
            .any(|p| p.to_string_lossy().eq_ignore_ascii_case(&artifact_name))
        {
            tracing::warn!(
                year = entry.year,
                expected = %artifact_name,
                "archive did not contain the expected artifact"
            );
        }

        let archive_removed = match fs::remove_file(&archive) {
            Ok(()) => {
                on_event(entry, EntryEvent::ArchiveRemoved { archive: &archive });
                true
            }
            Err(e) => {
                tracing::warn!("could not remove {}: {}", archive.display(), e);
                false
            }
        };

        EntryOutcome::Completed {
            bytes: acquired.bytes,
            tls: acquired.tls,
            extracted,
            archive_removed,
        }
    }
}

//! Scanning the destination directory for extracted artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::DownloadEntry;

/// One file reported after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub name: String,
    pub size: u64,
}

impl ArtifactInfo {
    /// Size in MiB, as printed in the listing.
    pub fn size_mib(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

/// Regular files directly inside `dir`, by name. A missing directory yields nothing.
fn regular_files(dir: &Path) -> io::Result<Vec<(String, fs::Metadata)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        // non-UTF-8 names can never match an artifact name
        if let Ok(name) = entry.file_name().into_string() {
            files.push((name, meta));
        }
    }
    Ok(files)
}

/// Finds a file in `dir` whose name equals `name` ignoring ASCII case.
pub fn find_artifact(dir: &Path, name: &str) -> io::Result<Option<PathBuf>> {
    Ok(regular_files(dir)?
        .into_iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(candidate, _)| dir.join(candidate)))
}

fn has_suffix_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Files in `dir` whose name ends with `suffix` (ASCII case-insensitive), sorted by name.
pub fn list_artifacts(dir: &Path, suffix: &str) -> io::Result<Vec<ArtifactInfo>> {
    let mut found: Vec<ArtifactInfo> = regular_files(dir)?
        .into_iter()
        .filter(|(name, _)| has_suffix_ignore_case(name, suffix))
        .map(|(name, meta)| ArtifactInfo {
            name,
            size: meta.len(),
        })
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

/// What is on disk for one entry, without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalStatus {
    /// Artifact exists (name matched ignoring case).
    Present(PathBuf),
    /// No artifact, but an archive from an earlier failed unpack is still there.
    StaleArchive(PathBuf),
    Missing,
}

impl LocalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LocalStatus::Present(_) => "present",
            LocalStatus::StaleArchive(_) => "stale archive",
            LocalStatus::Missing => "missing",
        }
    }
}

pub fn local_status(dir: &Path, entry: &DownloadEntry) -> io::Result<LocalStatus> {
    if let Some(artifact) = find_artifact(dir, &entry.artifact_name())? {
        return Ok(LocalStatus::Present(artifact));
    }
    let archive = entry.archive_path(dir);
    if archive.is_file() {
        return Ok(LocalStatus::StaleArchive(archive));
    }
    Ok(LocalStatus::Missing)
}

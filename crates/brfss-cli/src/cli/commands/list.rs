//! `brfss list` – extracted artifacts with sizes.

use anyhow::{Context, Result};
use brfss_core::artifacts::{self, ArtifactInfo};
use brfss_core::config::FetchConfig;
use std::path::Path;

pub(crate) fn listing_lines(found: &[ArtifactInfo]) -> Vec<String> {
    if found.is_empty() {
        return vec!["  (none)".to_string()];
    }
    found
        .iter()
        .map(|a| format!("  {} ({:.1} MB)", a.name, a.size_mib()))
        .collect()
}

/// Print the artifact listing for `dest_dir`.
pub(crate) fn print_listing(cfg: &FetchConfig, dest_dir: &Path) -> Result<()> {
    let found = artifacts::list_artifacts(dest_dir, &cfg.artifact_suffix)
        .with_context(|| format!("scan {}", dest_dir.display()))?;
    println!("\nDownloaded files:");
    for line in listing_lines(&found) {
        println!("{}", line);
    }
    Ok(())
}

pub fn run_list(cfg: &FetchConfig, dest_dir: &Path) -> Result<()> {
    println!("Target directory: {}", dest_dir.display());
    print_listing(cfg, dest_dir)
}

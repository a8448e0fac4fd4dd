//! `brfss plan` – catalog entries and their local state.

use anyhow::{Context, Result};
use brfss_core::artifacts::{self, LocalStatus};
use brfss_core::catalog::Catalog;
use brfss_core::config::FetchConfig;
use std::path::Path;

/// Table rows plus the summary line for every entry of `catalog` against `dest_dir`.
pub(crate) fn plan_lines(catalog: &Catalog, dest_dir: &Path) -> Result<Vec<String>> {
    let mut lines = vec![format!(
        "{:<6} {:<14} {:<14} {}",
        "YEAR", "ARTIFACT", "STATUS", "URL"
    )];
    let mut missing = 0usize;
    for entry in catalog {
        let status = artifacts::local_status(dest_dir, entry)
            .with_context(|| format!("scan {}", dest_dir.display()))?;
        if !matches!(status, LocalStatus::Present(_)) {
            missing += 1;
        }
        lines.push(format!(
            "{:<6} {:<14} {:<14} {}",
            entry.year,
            entry.artifact_name(),
            status.label(),
            entry.url
        ));
    }
    if missing == 0 {
        lines.push(format!(
            "\nAll {} artifacts present; `brfss fetch` has nothing to do.",
            catalog.len()
        ));
    } else {
        lines.push(format!(
            "\n{} of {} entries would be downloaded.",
            missing,
            catalog.len()
        ));
    }
    Ok(lines)
}

pub fn run_plan(cfg: &FetchConfig, dest_dir: &Path) -> Result<()> {
    let catalog = cfg.catalog()?;
    println!("Target directory: {}", dest_dir.display());
    for line in plan_lines(&catalog, dest_dir)? {
        println!("{}", line);
    }
    Ok(())
}

//! `brfss fetch` – download and unpack missing archives.

use anyhow::Result;
use brfss_core::catalog::DownloadEntry;
use brfss_core::config::FetchConfig;
use brfss_core::pipeline::{EntryEvent, EntryOutcome, Pipeline};
use brfss_core::transfer::{CurlFetcher, TlsMode};
use std::path::Path;

use super::list::print_listing;

const RULE: &str = "============================================================";

const WASHOUT_NOTE: &str = "
The paper (Valvi et al. 2019) defines 2010 as a \"washout period\" because:

1. METHODOLOGY CHANGE: In 2011, BRFSS changed from landline-only
   to landline + cell phone sampling. Data from before and after
   this change are not directly comparable.

2. EARLY ADOPTERS: 5 states + DC started Medicaid expansion in
   2010 under ACA waivers, before the main 2014 implementation.

3. CLEAN COMPARISON: By excluding 2010, we get a cleaner
   pre-period (2003-2009) and post-period (2011-2015).

2010 is downloaded for completeness; the analysis code
(proc.do) excludes it.
";

const NEXT_STEPS: &str = "
Next steps:
1. Open Stata
2. Run: do proc.do
3. Run: do analysis.do";

/// Console lines for one progress event, or `None` when the event prints nothing.
pub(crate) fn event_lines(entry: &DownloadEntry, event: &EntryEvent<'_>) -> Option<String> {
    let line = match event {
        EntryEvent::Started => format!("\n[{}] Processing...", entry.year),
        EntryEvent::Downloading { url } => format!("  Downloading: {}", url),
        EntryEvent::Retrying { error } => format!(
            "  Warning: {}; retrying with TLS certificate verification DISABLED...",
            error
        ),
        EntryEvent::Saved {
            archive,
            bytes,
            tls,
        } => {
            let mut s = format!(
                "  Saved to: {} ({:.1} MB)",
                archive.display(),
                *bytes as f64 / (1024.0 * 1024.0)
            );
            if *tls == TlsMode::Insecure {
                s.push_str("\n  Warning: downloaded with TLS certificate verification DISABLED");
            }
            s
        }
        EntryEvent::Extracting { archive } => format!("  Extracting: {}", archive.display()),
        EntryEvent::Extracted { dest_dir, .. } => format!("  Extracted to: {}", dest_dir.display()),
        EntryEvent::ArchiveRemoved { archive } => format!(
            "  Removed zip file: {}",
            archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| archive.display().to_string())
        ),
        EntryEvent::Finished(outcome) => match outcome {
            EntryOutcome::Skipped { .. } => {
                format!("  Already exists: {}, skipping...", entry.artifact_name())
            }
            EntryOutcome::AcquireFailed(e) => {
                format!("  ERROR downloading {}: {}", entry.year, e)
            }
            EntryOutcome::ExtractFailed { error, archive } => format!(
                "  ERROR extracting {}: {}\n  Archive left at: {}",
                entry.year,
                error,
                archive.display()
            ),
            EntryOutcome::Completed {
                archive_removed: false,
                ..
            } => "  Warning: archive could not be removed".to_string(),
            EntryOutcome::Completed { .. } => return None,
        },
    };
    Some(line)
}

fn print_event(entry: &DownloadEntry, event: EntryEvent<'_>) {
    if let Some(line) = event_lines(entry, &event) {
        println!("{}", line);
    }
}

pub fn run_fetch(
    cfg: &FetchConfig,
    dest_dir: &Path,
    years: &[u16],
    insecure_fallback: bool,
) -> Result<()> {
    let catalog = cfg.catalog()?.restrict_to(years)?;
    let insecure = insecure_fallback || cfg.insecure_fallback;

    println!("{}", RULE);
    println!("BRFSS Data Download");
    println!("{}", RULE);
    println!("Target directory: {}", dest_dir.display());
    if insecure {
        println!("Insecure TLS fallback: ENABLED");
    }

    let pipeline = Pipeline::new(CurlFetcher::new(cfg.transfer.clone()), dest_dir, insecure);
    let report = pipeline.run(&catalog, &mut print_event)?;

    println!("\n{}", RULE);
    println!("Download complete!");
    println!("{}", RULE);
    if report.failed() > 0 {
        let years: Vec<String> = report.failed_years().iter().map(u16::to_string).collect();
        println!("Failed: {} (re-run to retry)", years.join(", "));
    }

    print_listing(cfg, dest_dir)?;

    println!("\n{}", RULE);
    println!("WHY IS 2010 INCLUDED BUT EXCLUDED FROM ANALYSIS?");
    println!("{}", RULE);
    println!("{}", WASHOUT_NOTE);
    println!("{}", NEXT_STEPS);
    Ok(())
}

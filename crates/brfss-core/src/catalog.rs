//! Catalog of annual survey archives: an ordered list of `year → URL` entries.
//!
//! The artifact each entry produces is named after its year. The CDC switched
//! from `CDBRFSyy.XPT` to `LLCPyyyy.XPT` when cell-phone sampling was added, so
//! the naming rule flips at [`LLCP_FIRST_YEAR`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::url_model;

/// First survey year published under the `LLCPyyyy` naming convention.
pub const LLCP_FIRST_YEAR: u16 = 2011;

const BUILTIN_FIRST_YEAR: u16 = 2003;
const BUILTIN_LAST_YEAR: u16 = 2015;

/// Name of the extracted file for a survey year.
///
/// - `artifact_name(2003)` → `"CDBRFS03.XPT"`
/// - `artifact_name(2011)` → `"LLCP2011.XPT"`
pub fn artifact_name(year: u16) -> String {
    if year < LLCP_FIRST_YEAR {
        format!("CDBRFS{:02}.XPT", year % 100)
    } else {
        format!("LLCP{}.XPT", year)
    }
}

/// Download URL of the SAS transport archive the CDC publishes for `year`.
pub fn cdc_archive_url(year: u16) -> String {
    let stem = if year < LLCP_FIRST_YEAR {
        format!("CDBRFS{:02}", year % 100)
    } else {
        format!("LLCP{}", year)
    };
    format!(
        "https://www.cdc.gov/brfss/annual_data/{}/files/{}XPT.zip",
        year, stem
    )
}

/// One archive to fetch and unpack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadEntry {
    pub year: u16,
    pub url: String,
}

impl DownloadEntry {
    pub fn new(year: u16, url: impl Into<String>) -> Self {
        Self {
            year,
            url: url.into(),
        }
    }

    /// Expected name of the extracted file.
    pub fn artifact_name(&self) -> String {
        artifact_name(self.year)
    }

    /// Local filename of the downloaded archive, taken from the URL path.
    pub fn archive_name(&self) -> String {
        url_model::archive_filename(&self.url)
            .unwrap_or_else(|| format!("brfss-{}.zip", self.year))
    }

    /// Where the archive lands inside `dest_dir` while it is being unpacked.
    pub fn archive_path(&self, dest_dir: &Path) -> PathBuf {
        dest_dir.join(self.archive_name())
    }
}

/// Reasons a catalog is rejected before any work starts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog is empty")]
    Empty,
    #[error("year {0} appears more than once")]
    DuplicateYear(u16),
    #[error("year {year}: invalid URL {url:?}: {reason}")]
    InvalidUrl {
        year: u16,
        url: String,
        reason: String,
    },
    #[error("year {0} is not in the catalog")]
    UnknownYear(u16),
}

/// Ordered, validated sequence of entries. Iteration order is processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<DownloadEntry>,
}

impl Catalog {
    /// Validates that years are unique and URLs are absolute http(s) URLs.
    pub fn new(entries: Vec<DownloadEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for e in &entries {
            if !seen.insert(e.year) {
                return Err(CatalogError::DuplicateYear(e.year));
            }
            if let Err(reason) = url_model::check_download_url(&e.url) {
                return Err(CatalogError::InvalidUrl {
                    year: e.year,
                    url: e.url.clone(),
                    reason,
                });
            }
        }
        Ok(Self { entries })
    }

    /// BRFSS 2003–2015 as published by the CDC. 2010 is kept even though the
    /// analysis treats it as a washout year.
    pub fn builtin() -> Self {
        let entries = (BUILTIN_FIRST_YEAR..=BUILTIN_LAST_YEAR)
            .map(|year| DownloadEntry::new(year, cdc_archive_url(year)))
            .collect();
        Self { entries }
    }

    /// Keeps only `years`, preserving catalog order. An empty filter keeps everything.
    pub fn restrict_to(self, years: &[u16]) -> Result<Self, CatalogError> {
        if years.is_empty() {
            return Ok(self);
        }
        if let Some(&missing) = years.iter().find(|y| !self.contains(**y)) {
            return Err(CatalogError::UnknownYear(missing));
        }
        let entries = self
            .entries
            .into_iter()
            .filter(|e| years.contains(&e.year))
            .collect();
        Ok(Self { entries })
    }

    pub fn contains(&self, year: u16) -> bool {
        self.entries.iter().any(|e| e.year == year)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DownloadEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a DownloadEntry;
    type IntoIter = std::slice::Iter<'a, DownloadEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

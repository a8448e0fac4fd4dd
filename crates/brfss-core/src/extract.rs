//! ZIP extraction into the destination directory.
//!
//! Only stored and deflate members are supported, which covers every archive
//! the CDC publishes for these years.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::storage::PartFile;

/// Why an archive could not be unpacked.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid zip archive: {0}")]
    InvalidZip(#[source] zip::result::ZipError),
    #[error("failed to read member #{index}: {source}")]
    Member {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },
    /// Member path is absolute or climbs out of the destination.
    #[error("refusing unsafe member path {0:?}")]
    UnsafePath(String),
    #[error("write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Extract every member of `archive` into `dest_dir`, overwriting existing files.
/// Returns the relative paths of the files written, in archive order.
///
/// All-or-nothing: member paths are checked before anything is written, each
/// member lands through a `.part` file, and on any failure the files already
/// written by this call are removed again.
pub fn extract_zip(archive: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let file = File::open(archive).map_err(|source| ExtractError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(ExtractError::InvalidZip)?;
    let members = member_paths(&mut zip)?;

    let mut written = Vec::new();
    for (index, (relative, is_dir)) in members.into_iter().enumerate() {
        let out_path = dest_dir.join(&relative);
        let result = if is_dir {
            create_dir(&out_path)
        } else {
            write_member(&mut zip, index, &out_path).map(|bytes| {
                tracing::debug!(member = %relative.display(), bytes, "extracted");
                written.push(relative);
            })
        };
        if let Err(e) = result {
            roll_back(dest_dir, &written);
            return Err(e);
        }
    }
    Ok(written)
}

/// Enclosed relative path of every member, and whether it is a directory.
fn member_paths<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
) -> Result<Vec<(PathBuf, bool)>, ExtractError> {
    (0..zip.len())
        .map(|index| {
            let member = zip
                .by_index(index)
                .map_err(|source| ExtractError::Member { index, source })?;
            let relative = member
                .enclosed_name()
                .ok_or_else(|| ExtractError::UnsafePath(member.name().to_string()))?;
            Ok((relative, member.is_dir()))
        })
        .collect()
}

fn create_dir(path: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(path).map_err(|source| ExtractError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Stream one member into `<out_path>.part`; rename only once the whole member
/// (including its CRC check at EOF) has been read.
fn write_member<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    index: usize,
    out_path: &Path,
) -> Result<u64, ExtractError> {
    let mut member = zip
        .by_index(index)
        .map_err(|source| ExtractError::Member { index, source })?;
    if let Some(parent) = out_path.parent() {
        create_dir(parent)?;
    }
    let write_error = |source| ExtractError::Write {
        path: out_path.to_path_buf(),
        source,
    };
    let mut part = PartFile::create(out_path).map_err(write_error)?;
    if let Err(source) = io::copy(&mut member, &mut part) {
        part.discard();
        return Err(write_error(source));
    }
    part.finalize(out_path).map_err(write_error)
}

fn roll_back(dest_dir: &Path, written: &[PathBuf]) {
    for relative in written {
        let path = dest_dir.join(relative);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("could not remove {}: {}", path.display(), e);
            }
        }
    }
}

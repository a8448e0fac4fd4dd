//! Archive file lifecycle: stream into `<name>.part`, rename into place on success.
//!
//! A transfer that dies midway never leaves a file carrying the archive's final
//! name, so a half-written archive is not mistaken for a finished one.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.zip` → `a.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for an in-flight download.
pub struct PartFile {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create (or truncate) the `.part` file next to `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            file,
            temp_path,
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, close and rename onto `final_path`, replacing any stale file there.
    /// Returns the number of bytes written. On failure the temp file is removed.
    pub fn finalize(mut self, final_path: &Path) -> io::Result<u64> {
        let synced = self.file.flush().and_then(|()| self.file.sync_all());
        let written = self.written;
        let temp_path = self.temp_path.clone();
        drop(self.file);
        if let Err(e) = synced.and_then(|()| std::fs::rename(&temp_path, final_path)) {
            remove_temp(&temp_path);
            return Err(e);
        }
        Ok(written)
    }

    /// Close and delete the temp file. Errors are logged, not returned.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        remove_temp(&temp_path);
    }
}

impl Write for PartFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn remove_temp(temp_path: &Path) {
    if let Err(e) = std::fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!("could not remove {}: {}", temp_path.display(), e);
        }
    }
}

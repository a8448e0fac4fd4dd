//! Single-stream HTTP GET via a libcurl easy handle, written to a `.part` file.

use std::io;
use std::path::Path;
use std::time::Duration;

use super::{Fetcher, TlsMode, TransferError};
use crate::config::TransferConfig;
use crate::storage::PartFile;

/// Blocking fetcher backed by libcurl. One easy handle per request.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    cfg: TransferConfig,
}

impl CurlFetcher {
    pub fn new(cfg: TransferConfig) -> Self {
        Self { cfg }
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str, tls: TlsMode) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.cfg.user_agent)?;
        easy.connect_timeout(Duration::from_secs(self.cfg.connect_timeout_secs))?;
        // Abort stalled transfers rather than relying only on the wall-clock limit.
        easy.low_speed_limit(self.cfg.low_speed_limit_bytes)?;
        easy.low_speed_time(Duration::from_secs(self.cfg.low_speed_time_secs))?;
        easy.timeout(Duration::from_secs(self.cfg.timeout_secs))?;
        if tls == TlsMode::Insecure {
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }
        Ok(())
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, dest: &Path, tls: TlsMode) -> Result<u64, TransferError> {
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url, tls)?;

        let mut part = PartFile::create(dest).map_err(|e| TransferError::io(dest, e))?;
        let mut write_error: Option<io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match part.write_chunk(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            let temp = part.temp_path().to_path_buf();
            part.discard();
            return Err(match write_error {
                Some(io_err) if e.is_write_error() => TransferError::io(temp, io_err),
                _ => TransferError::Curl(e),
            });
        }

        let code = match easy.response_code() {
            Ok(code) => code,
            Err(e) => {
                part.discard();
                return Err(TransferError::Curl(e));
            }
        };
        if !(200..300).contains(&code) {
            part.discard();
            return Err(TransferError::Http(code));
        }

        let bytes = part.finalize(dest).map_err(|e| TransferError::io(dest, e))?;
        tracing::debug!(url, bytes, ?tls, "transfer finished");
        Ok(bytes)
    }
}

//! Transfer failure type.

use std::io;
use std::path::PathBuf;

/// Why an archive could not be transferred to disk.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// libcurl reported an error (DNS, connect, TLS, timeout, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Final response (after redirects) was not 2xx.
    #[error("HTTP {0}")]
    Http(u32),
    /// The local `.part` file could not be created, written or renamed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TransferError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for certificate / handshake failures, the case the insecure retry exists for.
    pub fn is_tls(&self) -> bool {
        match self {
            TransferError::Curl(e) => {
                e.is_ssl_connect_error()
                    || e.is_peer_failed_verification()
                    || e.is_ssl_cacert()
                    || e.is_ssl_cacert_badfile()
                    || e.is_ssl_certproblem()
            }
            TransferError::Http(_) | TransferError::Io { .. } => false,
        }
    }
}

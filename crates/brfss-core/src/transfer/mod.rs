//! Archive transfer: one verified attempt, then an optional insecure retry.
//!
//! The pipeline only talks to the [`Fetcher`] trait; [`CurlFetcher`] is the
//! libcurl implementation used by the CLI.

mod curl_fetcher;
mod error;

pub use curl_fetcher::CurlFetcher;
pub use error::TransferError;

use std::path::Path;

/// TLS verification used for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Default peer and hostname verification.
    Verified,
    /// Peer and hostname verification disabled.
    Insecure,
}

/// Transfers a URL to a local file.
pub trait Fetcher {
    /// Download `url` into `dest`, replacing it. Returns bytes written.
    /// On error `dest` is left as it was before the call.
    fn fetch(&self, url: &str, dest: &Path, tls: TlsMode) -> Result<u64, TransferError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str, dest: &Path, tls: TlsMode) -> Result<u64, TransferError> {
        (**self).fetch(url, dest, tls)
    }
}

/// A successful acquire: how many bytes landed, and whether verification was off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub bytes: u64,
    pub tls: TlsMode,
}

/// Fetch `url` into `dest`. When the verified attempt fails for any reason and
/// `insecure_fallback` is set, `on_retry` sees the first error and the fetch is
/// retried exactly once with verification disabled.
/// Returns the error of the last attempt.
pub fn acquire<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    dest: &Path,
    insecure_fallback: bool,
    on_retry: &mut dyn FnMut(&TransferError),
) -> Result<Acquired, TransferError> {
    let primary = match fetcher.fetch(url, dest, TlsMode::Verified) {
        Ok(bytes) => {
            return Ok(Acquired {
                bytes,
                tls: TlsMode::Verified,
            })
        }
        Err(e) => e,
    };

    if !insecure_fallback {
        tracing::info!(url, error = %primary, "transfer failed; insecure fallback disabled");
        return Err(primary);
    }

    tracing::warn!(
        url,
        error = %primary,
        tls_failure = primary.is_tls(),
        "retrying with TLS certificate and hostname verification DISABLED"
    );
    on_retry(&primary);
    let bytes = fetcher.fetch(url, dest, TlsMode::Insecure)?;
    Ok(Acquired {
        bytes,
        tls: TlsMode::Insecure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Replays scripted results and records the TLS mode of each call.
    struct Scripted {
        results: RefCell<Vec<Result<u64, TransferError>>>,
        calls: RefCell<Vec<TlsMode>>,
    }

    impl Scripted {
        fn new(mut results: Vec<Result<u64, TransferError>>) -> Self {
            results.reverse();
            Self {
                results: RefCell::new(results),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for Scripted {
        fn fetch(&self, _url: &str, _dest: &Path, tls: TlsMode) -> Result<u64, TransferError> {
            self.calls.borrow_mut().push(tls);
            self.results
                .borrow_mut()
                .pop()
                .expect("unexpected extra fetch")
        }
    }

    const URL: &str = "https://example.com/a.zip";

    #[test]
    fn verified_success_makes_one_call() {
        let f = Scripted::new(vec![Ok(42)]);
        let got = acquire(&f, URL, Path::new("a.zip"), true, &mut |_| {}).unwrap();
        assert_eq!(
            got,
            Acquired {
                bytes: 42,
                tls: TlsMode::Verified
            }
        );
        assert_eq!(*f.calls.borrow(), vec![TlsMode::Verified]);
    }

    #[test]
    fn failure_without_fallback_is_final() {
        let f = Scripted::new(vec![Err(TransferError::Http(500))]);
        let mut retries = 0;
        let err = acquire(&f, URL, Path::new("a.zip"), false, &mut |_| retries += 1).unwrap_err();
        assert_eq!(retries, 0);
        assert!(matches!(err, TransferError::Http(500)));
        assert_eq!(*f.calls.borrow(), vec![TlsMode::Verified]);
    }

    #[test]
    fn fallback_retries_once_insecure() {
        let f = Scripted::new(vec![Err(TransferError::Http(500)), Ok(7)]);
        let mut retried = Vec::new();
        let got = acquire(&f, URL, Path::new("a.zip"), true, &mut |e| {
            retried.push(e.to_string())
        })
        .unwrap();
        assert_eq!(retried, vec!["HTTP 500"]);
        assert_eq!(got.tls, TlsMode::Insecure);
        assert_eq!(got.bytes, 7);
        assert_eq!(
            *f.calls.borrow(),
            vec![TlsMode::Verified, TlsMode::Insecure]
        );
    }

    #[test]
    fn both_attempts_failing_returns_last_error() {
        let f = Scripted::new(vec![
            Err(TransferError::Http(500)),
            Err(TransferError::Http(404)),
        ]);
        let err = acquire(&f, URL, Path::new("a.zip"), true, &mut |_| {}).unwrap_err();
        assert!(matches!(err, TransferError::Http(404)));
        assert_eq!(f.calls.borrow().len(), 2);
    }
}

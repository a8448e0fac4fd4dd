//! Integration test: local HTTP server, real libcurl transfers, real ZIP extraction.

mod common;

use brfss_core::artifacts;
use brfss_core::catalog::{artifact_name, Catalog, DownloadEntry};
use brfss_core::config::TransferConfig;
use brfss_core::pipeline::{EntryOutcome, Pipeline};
use brfss_core::transfer::{CurlFetcher, Fetcher, TlsMode, TransferError};
use common::archive_server::ArchiveServer;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;

fn archive_for(year: u16, payload: &[u8]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file(artifact_name(year), SimpleFileOptions::default())
        .unwrap();
    zip.write_all(payload).unwrap();
    zip.finish().unwrap().into_inner()
}

fn fetcher() -> CurlFetcher {
    CurlFetcher::new(TransferConfig {
        connect_timeout_secs: 5,
        timeout_secs: 30,
        ..TransferConfig::default()
    })
}

#[test]
fn fetch_extract_and_clean_up_over_http() {
    let payload_03: Vec<u8> = (0u8..200).cycle().take(64 * 1024).collect();
    let mut files = HashMap::new();
    files.insert("/2003/CDBRFS03XPT.zip".to_string(), archive_for(2003, &payload_03));
    files.insert("/2011/LLCP2011XPT.zip".to_string(), archive_for(2011, b"llcp"));
    let server = ArchiveServer::start(files);

    let catalog = Catalog::new(vec![
        DownloadEntry::new(2003, server.url("/2003/CDBRFS03XPT.zip")),
        // not served: 404
        DownloadEntry::new(2004, server.url("/2004/CDBRFS04XPT.zip")),
        DownloadEntry::new(2011, server.url("/2011/LLCP2011XPT.zip")),
    ])
    .unwrap();

    let dest = tempdir().unwrap();
    let pipeline = Pipeline::new(fetcher(), dest.path(), false);
    let report = pipeline.run(&catalog, &mut |_, _| {}).unwrap();

    assert_eq!(report.completed(), 2);
    assert_eq!(report.failed_years(), vec![2004]);
    assert!(matches!(
        report.results[1].1,
        EntryOutcome::AcquireFailed(TransferError::Http(404))
    ));

    assert_eq!(
        std::fs::read(dest.path().join("CDBRFS03.XPT")).unwrap(),
        payload_03
    );
    assert_eq!(
        std::fs::read(dest.path().join("LLCP2011.XPT")).unwrap(),
        b"llcp"
    );
    // archives removed, failed transfer left nothing behind
    for leftover in [
        "CDBRFS03XPT.zip",
        "LLCP2011XPT.zip",
        "CDBRFS04XPT.zip",
        "CDBRFS04XPT.zip.part",
    ] {
        assert!(!dest.path().join(leftover).exists(), "{leftover} should not exist");
    }

    let listed = artifacts::list_artifacts(dest.path(), ".XPT").unwrap();
    let names: Vec<&str> = listed.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["CDBRFS03.XPT", "LLCP2011.XPT"]);
    assert_eq!(listed[0].size, payload_03.len() as u64);

    // Re-run: the two present artifacts are skipped, only the missing year is requested.
    let before = server.request_count();
    let report = pipeline.run(&catalog, &mut |_, _| {}).unwrap();
    assert_eq!(report.skipped(), 2);
    assert_eq!(server.request_count(), before + 1);
}

#[test]
fn all_present_means_zero_requests() {
    let server = ArchiveServer::start(HashMap::new());
    let catalog = Catalog::new(vec![
        DownloadEntry::new(2009, server.url("/CDBRFS09XPT.zip")),
        DownloadEntry::new(2014, server.url("/LLCP2014XPT.zip")),
    ])
    .unwrap();

    let dest = tempdir().unwrap();
    std::fs::write(dest.path().join("cdbrfs09.xpt"), b"x").unwrap();
    std::fs::write(dest.path().join("LLCP2014.XPT"), b"y").unwrap();

    let pipeline = Pipeline::new(fetcher(), dest.path(), true);
    let report = pipeline.run(&catalog, &mut |_, _| {}).unwrap();
    assert_eq!(report.skipped(), 2);
    assert_eq!(server.request_count(), 0);
}

#[test]
fn curl_fetcher_writes_body_and_rejects_http_errors() {
    let mut files = HashMap::new();
    files.insert("/ok.zip".to_string(), b"body bytes".to_vec());
    let server = ArchiveServer::start(files);
    let dest = tempdir().unwrap();
    let f = fetcher();

    let out = dest.path().join("ok.zip");
    let n = f.fetch(&server.url("/ok.zip"), &out, TlsMode::Verified).unwrap();
    assert_eq!(n, 10);
    assert_eq!(std::fs::read(&out).unwrap(), b"body bytes");

    let missing = dest.path().join("missing.zip");
    let err = f
        .fetch(&server.url("/missing.zip"), &missing, TlsMode::Verified)
        .unwrap_err();
    assert!(matches!(err, TransferError::Http(404)), "{err}");
    assert!(!missing.exists());
    assert!(!dest.path().join("missing.zip.part").exists());
}

#[test]
fn unreachable_host_is_a_curl_error() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let dest = tempdir().unwrap();
    let err = fetcher()
        .fetch(
            &format!("http://127.0.0.1:{}/x.zip", port),
            &dest.path().join("x.zip"),
            TlsMode::Verified,
        )
        .unwrap_err();
    assert!(matches!(err, TransferError::Curl(_)), "{err}");
}

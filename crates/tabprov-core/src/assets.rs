//! Downloading and unpacking the browser package installed on every tablet.

use std::fs::File;
use std::path::Path;

use crate::config::BrowserConfig;
use crate::error::{ProvisionError, Result};
use crate::io::atomic_copy;
use crate::operator::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The destination already existed; nothing was requested.
    Skipped,
    Downloaded(u64),
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// An existing file is trusted as-is. The body is streamed into a sibling
/// tempfile and renamed into place, so an interrupted download never leaves
/// a truncated `dest` that a later run would skip over.
pub fn fetch(url: &str, dest: &Path) -> Result<FetchOutcome> {
    if dest.exists() {
        tracing::info!(path = %dest.display(), "download skipped, file exists");
        return Ok(FetchOutcome::Skipped);
    }

    let download_err = |e: reqwest::Error| ProvisionError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    };

    // No total timeout: the default 30s cuts off large packages.
    let client = reqwest::blocking::Client::builder()
        .timeout(None)
        .build()
        .map_err(download_err)?;
    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(download_err)?;

    let written = atomic_copy(dest, &mut response)?;
    tracing::info!(url, bytes = written, "downloaded");
    Ok(FetchOutcome::Downloaded(written))
}

/// Extract the single archive entry `entry` from `archive` to `out`.
pub fn unpack(archive: &Path, entry: &str, out: &Path) -> Result<u64> {
    if !archive.exists() {
        return Err(ProvisionError::AssetMissing(archive.to_path_buf()));
    }
    let file = File::open(archive)?;
    let mut zip =
        zip::ZipArchive::new(file).map_err(|e| ProvisionError::Archive(e.to_string()))?;
    let mut member = match zip.by_name(entry) {
        Ok(m) => m,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(ProvisionError::ArchiveEntryMissing {
                archive: archive.to_path_buf(),
                entry: entry.to_string(),
            })
        }
        Err(e) => return Err(ProvisionError::Archive(e.to_string())),
    };
    atomic_copy(out, &mut member)
}

/// Make sure the browser APK is on disk: download the package if needed,
/// then pull the APK out of it.
pub fn prepare_browser(browser: &BrowserConfig, operator: &mut dyn Operator) -> Result<()> {
    operator.say(&format!("Downloading '{}'… ", browser.url), false);
    match fetch(&browser.url, &browser.archive)? {
        FetchOutcome::Skipped => operator.say("skipped.", true),
        FetchOutcome::Downloaded(_) => operator.say("done.", true),
    }

    operator.say("Extracting browser APK… ", false);
    unpack(&browser.archive, &browser.entry, &browser.apk)?;
    operator.say("done.", true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const ENTRY: &str = "chrome-android/apks/ChromeShell.apk";

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut w = zip::ZipWriter::new(file);
        for (name, data) in entries {
            w.start_file(*name, zip::write::SimpleFileOptions::default())
                .unwrap();
            w.write_all(data).unwrap();
        }
        w.finish().unwrap();
    }

    #[test]
    fn fetch_downloads_missing_file() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/chrome-android.zip")
            .with_status(200)
            .with_body("zip-bytes")
            .expect(1)
            .create();

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("chromium.zip");
        let url = format!("{}/chrome-android.zip", server.url());

        let outcome = fetch(&url, &dest).unwrap();
        assert_eq!(outcome, FetchOutcome::Downloaded(9));
        assert_eq!(std::fs::read(&dest).unwrap(), b"zip-bytes");
        mock.assert();
    }

    #[test]
    fn fetch_is_idempotent_when_destination_exists() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/chrome-android.zip")
            .with_body("new-bytes")
            .expect(0)
            .create();

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("chromium.zip");
        std::fs::write(&dest, b"original").unwrap();
        let url = format!("{}/chrome-android.zip", server.url());

        assert_eq!(fetch(&url, &dest).unwrap(), FetchOutcome::Skipped);
        assert_eq!(fetch(&url, &dest).unwrap(), FetchOutcome::Skipped);
        assert_eq!(std::fs::read(&dest).unwrap(), b"original");
        mock.assert();
    }

    #[test]
    fn fetch_http_error_leaves_no_file() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/missing.zip")
            .with_status(404)
            .create();

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("chromium.zip");
        let url = format!("{}/missing.zip", server.url());

        let err = fetch(&url, &dest).unwrap_err();
        assert!(matches!(err, ProvisionError::Download { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn unpack_extracts_named_entry() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("chromium.zip");
        write_zip(
            &archive,
            &[("chrome-android/README", &b"readme"[..]), (ENTRY, &b"apk-bytes"[..])],
        );
        let out = dir.path().join("chromium.apk");

        unpack(&archive, ENTRY, &out).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"apk-bytes");
    }

    #[test]
    fn unpack_missing_entry_fails() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("chromium.zip");
        write_zip(&archive, &[("other.apk", &b"x"[..])]);
        let out = dir.path().join("chromium.apk");

        let err = unpack(&archive, ENTRY, &out).unwrap_err();
        assert!(matches!(err, ProvisionError::ArchiveEntryMissing { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn unpack_rejects_non_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("chromium.zip");
        std::fs::write(&archive, b"not a zip").unwrap();

        let err = unpack(&archive, ENTRY, &dir.path().join("out.apk")).unwrap_err();
        assert!(matches!(err, ProvisionError::Archive(_)));
    }
}

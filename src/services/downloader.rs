//! Streaming file downloader
//!
//! Writes a direct-download URL to disk chunk by chunk and checks the received
//! byte count against `content-length`. A short body with a declared length is
//! reported as an integrity mismatch; the partial file is left in place.

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::domain::{AcquisitionError, DownloadOutcome, Integrity};
use crate::utils::{ProgressReporter, sanitize_file_name};

const FALLBACK_FILE_NAME: &str = "download.bin";

/// Percent-decoded final path segment of `url`. A query string stays part of
/// the name so `get.php?md5=...` links map to distinct files.
pub fn file_name_from_url(url: &str) -> String {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => {
            let last = parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or_default()
                .to_string();
            match parsed.query() {
                Some(query) if !query.is_empty() && !last.is_empty() => format!("{}?{}", last, query),
                _ => last,
            }
        }
        Err(_) => url
            .split('#')
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string(),
    };

    let decoded = urlencoding::decode(&segment)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned());

    if decoded.trim().is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        sanitize_file_name(&decoded)
    }
}

/// File name announced in a `Content-Disposition` header, `filename*` first
pub fn file_name_from_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for part in value.split(';').map(str::trim) {
        let lower = part.to_ascii_lowercase();
        if lower.starts_with("filename*=") {
            let encoded = part["filename*=".len()..].trim().trim_matches('"');
            // charset'language'value
            let raw = encoded.rsplit("''").next().unwrap_or(encoded);
            match urlencoding::decode(raw) {
                Ok(decoded) if !decoded.trim().is_empty() => {
                    return Some(sanitize_file_name(&decoded));
                }
                _ => {}
            }
        } else if lower.starts_with("filename=") {
            let name = part["filename=".len()..].trim().trim_matches('"');
            if !name.trim().is_empty() {
                plain = Some(sanitize_file_name(name));
            }
        }
    }
    plain
}

/// `directory/name`, or `name-1`, `name-2`, ... (before the extension) when taken
pub async fn unique_path(directory: &Path, name: &str) -> PathBuf {
    let candidate = directory.join(name);
    if !fs::try_exists(&candidate).await.unwrap_or(false) {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let extension = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n: u32 = 1;
    loop {
        let candidate = directory.join(format!("{}-{}{}", stem, n, extension));
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return candidate;
        }
        n += 1;
    }
}

/// Compare declared and received byte counts
pub fn check_integrity(bytes_expected: u64, bytes_written: u64) -> Integrity {
    if bytes_expected == 0 {
        Integrity::Unverified
    } else if bytes_expected == bytes_written {
        Integrity::Verified
    } else {
        Integrity::Mismatch {
            expected: bytes_expected,
            written: bytes_written,
        }
    }
}

async fn create_file(path: &Path) -> Result<File, AcquisitionError> {
    File::create(path)
        .await
        .map_err(|e| AcquisitionError::Io(format!("Failed to create {}: {}", path.display(), e)))
}

pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Stream `url` into `directory`, creating the directory if needed
    pub async fn download(
        &self,
        url: &str,
        directory: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> Result<DownloadOutcome, AcquisitionError> {
        fs::create_dir_all(directory).await.map_err(|e| {
            AcquisitionError::Io(format!("Failed to create {}: {}", directory.display(), e))
        })?;

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquisitionError::Transport(format!("Download of {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AcquisitionError::Transport(format!(
                "Download of {} returned status: {}",
                url,
                response.status()
            )));
        }

        let bytes_expected = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(0);

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| file_name_from_url(url));
        let file_path = unique_path(directory, &file_name).await;

        progress.start(&file_name, bytes_expected);
        let mut bytes_written: u64 = 0;
        // Opened on the first chunk so a stream failing up front leaves nothing behind
        let mut file: Option<File> = None;

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if file.is_none() {
                        file = Some(create_file(&file_path).await?);
                    }
                    if let Some(f) = file.as_mut() {
                        f.write_all(&chunk).await?;
                    }
                    bytes_written += chunk.len() as u64;
                    progress.advance(bytes_written);
                }
                Ok(None) => break,
                Err(e) if bytes_written > 0 && bytes_expected > 0 => {
                    // Declared length: the integrity check reports the short body
                    tracing::warn!("Stream of {} interrupted: {}", url, e);
                    break;
                }
                Err(e) => {
                    if let Some(mut f) = file.take() {
                        f.flush().await?;
                        tracing::warn!(
                            "Keeping partial file {} ({} bytes)",
                            file_path.display(),
                            bytes_written
                        );
                    }
                    progress.finish(bytes_written);
                    return Err(AcquisitionError::Transport(format!(
                        "Stream of {} failed after {} bytes: {}",
                        url, bytes_written, e
                    )));
                }
            }
        }

        // Empty body still yields an (empty) file
        let mut file = match file {
            Some(f) => f,
            None => create_file(&file_path).await?,
        };
        file.flush().await?;
        progress.finish(bytes_written);

        let integrity = check_integrity(bytes_expected, bytes_written);
        match integrity {
            Integrity::Mismatch { expected, written } => tracing::warn!(
                "Integrity mismatch for {}: expected {} bytes, wrote {}",
                file_path.display(),
                expected,
                written
            ),
            Integrity::Verified => {
                tracing::info!("Downloaded {} ({} bytes)", file_path.display(), bytes_written)
            }
            Integrity::Unverified => tracing::info!(
                "Downloaded {} ({} bytes, size not declared, unverified)",
                file_path.display(),
                bytes_written
            ),
        }

        Ok(DownloadOutcome {
            file_path,
            bytes_expected,
            bytes_written,
            integrity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_percent_decoded() {
        assert_eq!(
            file_name_from_url("http://dl.example/main/1/abc/Sun%20Tzu%20-%20The%20Art%20of%20War.epub"),
            "Sun Tzu - The Art of War.epub"
        );
        assert_eq!(
            file_name_from_url("http://dl.example/get/book.pdf#page=2"),
            "book.pdf"
        );
    }

    #[test]
    fn test_query_string_keeps_names_distinct() {
        let first = file_name_from_url("http://dl.example/get.php?md5=1A2B&key=K1");
        let second = file_name_from_url("http://dl.example/get.php?md5=3C4D&key=K2");
        assert_eq!(first, "get.php_md5=1A2B&key=K1");
        assert_ne!(first, second);
    }

    #[test]
    fn test_disposition_file_name() {
        assert_eq!(
            file_name_from_disposition("attachment; filename=\"The Art of War.epub\"").as_deref(),
            Some("The Art of War.epub")
        );
        assert_eq!(
            file_name_from_disposition(
                "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''%C3%89mile%20Zola.pdf"
            )
            .as_deref(),
            Some("Émile Zola.pdf")
        );
        assert_eq!(
            file_name_from_disposition("attachment; FILENAME=a/b.pdf").as_deref(),
            Some("a_b.pdf")
        );
        assert_eq!(file_name_from_disposition("inline"), None);
    }

    #[tokio::test]
    async fn test_unique_path_adds_suffix_before_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_path(dir.path(), "book.pdf").await, dir.path().join("book.pdf"));

        std::fs::write(dir.path().join("book.pdf"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "book.pdf").await, dir.path().join("book-1.pdf"));

        std::fs::write(dir.path().join("book-1.pdf"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "book.pdf").await, dir.path().join("book-2.pdf"));

        std::fs::write(dir.path().join("README"), b"x").unwrap();
        assert_eq!(unique_path(dir.path(), "README").await, dir.path().join("README-1"));
    }

    #[test]
    fn test_file_name_fallbacks() {
        assert_eq!(file_name_from_url("http://dl.example/"), FALLBACK_FILE_NAME);
        assert_eq!(file_name_from_url("relative/path/x%2Fy.pdf"), "x_y.pdf");
    }

    #[test]
    fn test_integrity_byte_accounting() {
        assert_eq!(check_integrity(1_000_000, 1_000_000), Integrity::Verified);
        assert_eq!(
            check_integrity(1_000_000, 999_000),
            Integrity::Mismatch {
                expected: 1_000_000,
                written: 999_000
            }
        );
        assert_eq!(check_integrity(0, 42), Integrity::Unverified);
    }
}

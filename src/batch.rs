use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::downloader::{Downloader, FileDownloader};
use crate::manifest::ImageRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub request: ImageRequest,
    /// Set only when a file was written.
    pub destination: Option<PathBuf>,
    pub outcome: Outcome,
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<DownloadResult>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Process exit status: 0 unless `strict` is set and some item failed.
    pub fn exit_status(&self, strict: bool) -> u8 {
        if strict && !self.is_complete_success() {
            1
        } else {
            0
        }
    }
}

/// A failed item is logged and skipped; the run always reaches the end.
pub fn run<T>(downloader: &Downloader<T>, requests: &[ImageRequest], delay: Duration) -> BatchReport
where
    T: FileDownloader,
{
    let mut report = BatchReport::default();

    for (position, request) in requests.iter().enumerate() {
        if position > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }

        tracing::info!(item = %request.label(), url = %request.source, "downloading");

        let result = match downloader.download(request) {
            Ok(download) => {
                tracing::info!(
                    item = %request.label(),
                    file = %download.file.display(),
                    bytes = download.size,
                    "saved"
                );
                DownloadResult {
                    request: request.clone(),
                    destination: Some(download.file),
                    outcome: Outcome::Success,
                }
            }
            Err(err) => {
                tracing::warn!(item = %request.label(), url = %request.source, "download failed: {}", err);
                DownloadResult {
                    request: request.clone(),
                    destination: None,
                    outcome: Outcome::Failure(err.to_string()),
                }
            }
        };

        report.results.push(result);
    }

    report
}

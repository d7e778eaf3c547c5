pub mod batch;
pub mod downloader;
pub mod logging;
pub mod manifest;

pub use batch::{run, BatchReport, DownloadResult, Outcome};
pub use downloader::{Download, DownloadError, Downloader, FileDownloader, Response, UReqFetcher};
pub use manifest::{ImageRequest, Manifest, ManifestError};

mod fetcher;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use url::Url;

use crate::manifest::ImageRequest;

pub use fetcher::UReqFetcher;

#[derive(Debug)]
pub enum Response {
    Ok {
        body: Vec<u8>,
        content_type: Option<String>,
    },
    Status(u16),
    InvalidBody,
    NetworkError(String),
}

impl Response {
    pub fn ok(body: Vec<u8>, content_type: Option<String>) -> Self {
        Self::Ok { body, content_type }
    }

    pub fn status(code: u16) -> Self {
        Self::Status(code)
    }

    pub fn invalid_body() -> Self {
        Self::InvalidBody
    }

    pub fn network_error(reason: impl Into<String>) -> Self {
        Self::NetworkError(reason.into())
    }
}

/// Transport seam: one GET, one [`Response`].
pub trait FileDownloader {
    fn fetch(&self, url: &str) -> Response;
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("response body could not be read")]
    InvalidBody,

    #[error("cannot write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, PartialEq)]
pub struct Download {
    pub source: String,
    pub file: PathBuf,
    pub size: usize,
}

impl Download {
    pub fn new(source: String, file: PathBuf, size: usize) -> Self {
        Self { source, file, size }
    }
}

struct Fetched {
    url: String,
    body: Vec<u8>,
    content_type: Option<String>,
}

pub struct Downloader<T: FileDownloader> {
    fetcher: T,
    path: PathBuf,
}

impl<T> Downloader<T>
where
    T: FileDownloader,
{
    /// The output directory is created lazily, on the first successful fetch.
    pub fn with_fetcher(path: impl Into<PathBuf>, fetcher: T) -> Self {
        Downloader {
            path: path.into(),
            fetcher,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.path
    }

    /// Fetches `source` and writes the body to `destination`, replacing any existing file.
    ///
    /// Nothing is written unless the server answered 2xx.
    pub fn fetch_and_persist(&self, source: &str, destination: &Path) -> Result<Download, DownloadError> {
        let fetched = self.fetch(source)?;

        Self::persist(&fetched.body, destination)?;

        Ok(Download::new(fetched.url, destination.to_path_buf(), fetched.body.len()))
    }

    /// Fetches one manifest entry into the output directory under its deterministic name.
    pub fn download(&self, request: &ImageRequest) -> Result<Download, DownloadError> {
        let fetched = self.fetch(&request.source)?;

        let extension = file_extension(&fetched.url, &fetched.body, fetched.content_type.as_deref());
        let destination = self.path.join(request.file_name_for(&extension));

        Self::persist(&fetched.body, &destination)?;

        Ok(Download::new(fetched.url, destination, fetched.body.len()))
    }

    fn fetch(&self, source: &str) -> Result<Fetched, DownloadError> {
        let url = Url::parse(source).map_err(|_| DownloadError::InvalidUrl(source.to_string()))?;

        let url = String::from(url.as_str());

        match self.fetcher.fetch(&url) {
            Response::NetworkError(reason) => Err(DownloadError::Network(reason)),
            Response::Status(code) => Err(DownloadError::HttpStatus(code)),
            Response::InvalidBody => Err(DownloadError::InvalidBody),

            Response::Ok { body, content_type } => Ok(Fetched {
                url,
                body,
                content_type,
            }),
        }
    }

    fn persist(body: &[u8], destination: &Path) -> Result<(), DownloadError> {
        let filesystem = |source: io::Error| DownloadError::Filesystem {
            path: destination.to_path_buf(),
            source,
        };

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                tracing::debug!(dir = %parent.display(), "creating output directory");
            }
            fs::create_dir_all(parent).map_err(filesystem)?;
        }

        fs::write(destination, body).map_err(filesystem)
    }
}

impl Downloader<UReqFetcher> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let fetcher = UReqFetcher::new();
        Downloader::with_fetcher(path, fetcher)
    }
}

/// Extension for a fetched file: from the URL path, else the sniffed image
/// format, else the `Content-Type`, else `data`.
pub fn file_extension(url: &str, body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ext) = extension_from_url(url) {
        return ext;
    }

    let format = image::guess_format(body)
        .ok()
        .or_else(|| content_type.and_then(mime_essence).and_then(ImageFormat::from_mime_type));

    format
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("data")
        .to_string()
}

fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;

    let (stem, ext) = segment.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}

// "image/png; charset=binary" -> "image/png"
fn mime_essence(content_type: &str) -> Option<&str> {
    content_type.split(';').next().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
use fetcher::MockFetcher;

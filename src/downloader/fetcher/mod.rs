mod ureq_fetcher;

#[cfg(test)]
mod mock_fetcher;

// Transports implement the parent's seam.
use super::{FileDownloader, Response};

pub use ureq_fetcher::UReqFetcher;

#[cfg(test)]
pub(super) use mock_fetcher::MockFetcher;

use std::io::Read;

use ureq::Error::{Status, Transport};

use super::{FileDownloader, Response};

/// Blocking transport backed by `ureq`.
///
/// One plain `GET` per call: no extra headers, no timeout override, no retry.
pub struct UReqFetcher;

impl FileDownloader for UReqFetcher {
    fn fetch(&self, url: &str) -> Response {
        let request = ureq::request("GET", url);

        match request.call() {
            Ok(response) => {
                let status = response.status();

                // ureq only reports >= 400 as errors; anything else that is not 2xx is skipped too.
                if !(200..300).contains(&status) {
                    return Response::status(status);
                }

                let content_type = response.header("Content-Type").map(str::to_string);

                let mut body = Vec::new();

                if response.into_reader().read_to_end(&mut body).is_err() {
                    return Response::invalid_body();
                }

                Response::ok(body, content_type)
            }

            Err(Status(code, _)) => Response::status(code),

            Err(Transport(transport)) => Response::network_error(transport.to_string()),
        }
    }
}

impl UReqFetcher {
    pub fn new() -> Self {
        UReqFetcher
    }
}

impl Default for UReqFetcher {
    fn default() -> Self {
        Self::new()
    }
}

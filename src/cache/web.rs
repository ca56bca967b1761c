//! Blocking HTTP fetcher used on `get_web` misses

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::cache::error::{CacheError, Result};

/// Default overall request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP GET client with a fixed overall timeout
#[derive(Debug, Clone)]
pub struct WebClient {
    client: Client,
}

impl WebClient {
    /// Build a client. A zero `timeout` means no overall timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("speed-checker/", env!("CARGO_PKG_VERSION")));
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|source| CacheError::Network {
                url: String::new(),
                source,
            })?;

        Ok(Self { client })
    }

    /// GET `url` and return the full body. Only 2xx responses are accepted.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let network = |source| CacheError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(network)?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_ok() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/list.txt")
            .with_status(200)
            .with_body("1.1.1.1:1080\n")
            .create();

        let client = WebClient::new(DEFAULT_TIMEOUT).unwrap();
        let body = client.fetch(&format!("{}/list.txt", server.url())).unwrap();

        assert_eq!(body, b"1.1.1.1:1080\n");
        mock.assert();
    }

    #[test]
    fn test_fetch_error_status() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/gone").with_status(404).create();

        let client = WebClient::new(DEFAULT_TIMEOUT).unwrap();
        let err = client
            .fetch(&format!("{}/gone", server.url()))
            .unwrap_err();

        assert!(matches!(err, CacheError::Status { status: 404, .. }));
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/slow.txt")
            .with_status(200)
            .with_body("2.2.2.2:9050\n")
            .expect(1)
            .create();

        let client = WebClient::new(Duration::ZERO).unwrap();
        let body = client.fetch(&format!("{}/slow.txt", server.url())).unwrap();

        assert_eq!(body, b"2.2.2.2:9050\n");
        mock.assert();
    }

    #[test]
    fn test_fetch_invalid_url() {
        let client = WebClient::new(DEFAULT_TIMEOUT).unwrap();
        let err = client.fetch("not a url").unwrap_err();
        assert!(err.is_network());
    }
}

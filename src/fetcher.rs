//! HTTP fetcher for downloading filter lists.
//!
//! Downloads are retried a fixed number of times with exponential backoff.
//! Gzip-compressed bodies are decompressed transparently.

use flate2::read::GzDecoder;
use std::io::Read;
use std::time::Duration;

use crate::error::{Error, FetchFailure, Result};

const TIMEOUT_SECS: u64 = 60;
const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 1000;

/// Minimal blocking HTTP GET, the seam between the fetcher and the network.
pub trait HttpClient {
    /// Fetch `url`, returning the body bytes of a success response.
    fn get(&self, url: &str) -> std::result::Result<Vec<u8>, FetchFailure>;
}

/// Default [`HttpClient`] backed by a blocking reqwest client.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("blockingmachine/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> std::result::Result<Vec<u8>, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchFailure::Transport(e.to_string()))
    }
}

/// Retry budget for one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each further attempt
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt `attempt` (0-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

/// Filter list downloader.
pub struct Fetcher<C = ReqwestClient> {
    client: C,
    policy: RetryPolicy,
}

impl Fetcher<ReqwestClient> {
    /// Create a fetcher with the default HTTP client and retry policy.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(ReqwestClient::new()?))
    }
}

impl<C: HttpClient> Fetcher<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Download `url` as text, retrying on any failure.
    ///
    /// Returns [`Error::Fetch`] with the last failure once every attempt
    /// has failed.
    pub fn fetch(&self, url: &str) -> Result<String> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_failure = None;

        for attempt in 0..attempts {
            match self.client.get(url) {
                Ok(body) => {
                    if attempt > 0 {
                        log::info!("Fetched {} on attempt {}", url, attempt + 1);
                    }
                    return decode_body(body).map_err(|e| Error::Fetch {
                        url: url.to_string(),
                        attempts: attempt + 1,
                        cause: e.to_string(),
                    });
                }
                Err(failure) => {
                    log::warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt + 1,
                        attempts,
                        url,
                        failure
                    );
                    last_failure = Some(failure);
                    if attempt + 1 < attempts {
                        let delay = self.policy.delay_after(attempt);
                        log::debug!("Retrying {} in {:?}", url, delay);
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        Err(Error::Fetch {
            url: url.to_string(),
            attempts,
            cause: last_failure
                .map(|f| f.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }
}

/// Check if data is gzip compressed.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Decompress if needed and decode as UTF-8, replacing invalid sequences.
fn decode_body(raw: Vec<u8>) -> std::io::Result<String> {
    let data = if is_gzip(&raw) {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        data
    } else {
        raw
    };

    Ok(match String::from_utf8(data) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::time::Instant;

    /// Client replaying scripted responses.
    struct ScriptedClient {
        responses: Mutex<VecDeque<std::result::Result<Vec<u8>, FetchFailure>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<std::result::Result<Vec<u8>, FetchFailure>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock()
        }
    }

    impl HttpClient for ScriptedClient {
        fn get(&self, _url: &str) -> std::result::Result<Vec<u8>, FetchFailure> {
            *self.calls.lock() += 1;
            self.responses
                .lock()
                .pop_front()
                .unwrap_or(Err(FetchFailure::Transport("script exhausted".into())))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_after(0), Duration::from_secs(1));
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
    }

    #[test]
    fn test_first_attempt_success() {
        let fetcher = Fetcher::with_client(ScriptedClient::new(vec![Ok(b"||a.com^".to_vec())]));
        assert_eq!(fetcher.fetch("http://x").unwrap(), "||a.com^");
        assert_eq!(fetcher.client.calls(), 1);
    }

    #[test]
    fn test_success_on_third_attempt_waits_for_backoff() {
        let client = ScriptedClient::new(vec![
            Err(FetchFailure::Status(503)),
            Err(FetchFailure::Transport("connection reset".into())),
            Ok(b"||a.com^\n||b.com^".to_vec()),
        ]);
        let fetcher = Fetcher::with_client(client);

        let started = Instant::now();
        let body = fetcher.fetch("http://x").unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(body.lines().count(), 2);
        assert_eq!(fetcher.client.calls(), 3);
    }

    #[test]
    fn test_gives_up_after_budget() {
        let client = ScriptedClient::new(vec![
            Err(FetchFailure::Status(500)),
            Err(FetchFailure::Status(502)),
            Err(FetchFailure::Status(404)),
            Ok(b"never reached".to_vec()),
        ]);
        let fetcher = Fetcher::with_client(client).with_policy(fast_policy());

        let err = fetcher.fetch("http://x/list.txt").unwrap_err();
        match err {
            Error::Fetch {
                url,
                attempts,
                cause,
            } => {
                assert_eq!(url, "http://x/list.txt");
                assert_eq!(attempts, 3);
                assert!(cause.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fetcher.client.calls(), 3);
    }

    #[test]
    fn test_gzip_body() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"||gz.example.com^\n").unwrap();
        let gz = encoder.finish().unwrap();

        let fetcher = Fetcher::with_client(ScriptedClient::new(vec![Ok(gz)]));
        assert_eq!(fetcher.fetch("http://x").unwrap(), "||gz.example.com^\n");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let fetcher = Fetcher::with_client(ScriptedClient::new(vec![Ok(vec![b'a', 0xff, b'b'])]));
        assert_eq!(fetcher.fetch("http://x").unwrap(), "a\u{fffd}b");
    }

    #[test]
    fn test_reqwest_client_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/easylist.txt");
            then.status(200).body("! comment\n||ads.example.com^\n");
        });

        let fetcher = Fetcher::new().unwrap();
        let body = fetcher.fetch(&server.url("/easylist.txt")).unwrap();
        assert!(body.contains("||ads.example.com^"));
        mock.assert_hits(1);
    }

    #[test]
    fn test_reqwest_client_persistent_error_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/down.txt");
            then.status(500);
        });

        let fetcher = Fetcher::new().unwrap().with_policy(fast_policy());
        let err = fetcher.fetch(&server.url("/down.txt")).unwrap_err();
        assert!(matches!(err, Error::Fetch { attempts: 3, .. }));
        assert!(err.to_string().contains("status: 500"));
        mock.assert_hits(3);
    }
}

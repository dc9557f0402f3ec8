use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};
use thiserror::Error;

pub const DEFAULT_SHORTENER_ENDPOINT: &str = "https://v1.mk/short";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("shortener request failed")]
    Http(#[from] reqwest::Error),
    #[error("shortener response carries no short URL")]
    MissingShortUrl,
}

pub type ShortenResult<T> = Result<T, ShortenError>;

/// Retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds or the attempts are used up, returning the
    /// last error in the latter case. `op` receives the 1-based attempt number.
    /// Dropping the returned future cancels the remaining attempts.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.attempts => return Err(e),
                Err(e) => {
                    warn!("Attempt {}/{} failed: {}", attempt, self.attempts, e);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Extract the short URL from the shortener's JSON response.
pub fn parse_short_url(body: &serde_json::Value) -> ShortenResult<String> {
    body.get("ShortUrl")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(ShortenError::MissingShortUrl)
}

pub struct Shortener {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl Shortener {
    pub fn new(endpoint: impl Into<String>) -> ShortenResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn shorten_once(&self, long_url: &str) -> ShortenResult<String> {
        let long_url = STANDARD.encode(long_url);
        let body: serde_json::Value = self
            .client
            .post(&self.endpoint)
            .form(&[("longUrl", long_url)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_short_url(&body)
    }

    pub async fn shorten(&self, long_url: &str) -> ShortenResult<String> {
        let short_url = self.retry.run(|_| self.shorten_once(long_url)).await?;
        debug!("Shortened {} to {}", long_url, short_url);
        Ok(short_url)
    }
}

use std::time::Duration;

use reqwest::StatusCode;
use snip_config::extraction::{AuthScheme, ConfigError, ExtractionConfig};
use snip_types::{CroppedImage, ExtractionResult, FailureKind};
use tokio_util::sync::CancellationToken;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};
use crate::wire::{GenerateRequest, GenerateResponse, Recognized, error_message};

/// Wait before the attempt following attempt `completed` (1-based): `2^completed` s
pub fn backoff_delay(completed: u32) -> Duration {
    Duration::from_secs(1u64 << completed.min(16))
}

/// Where the attempt loop is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    /// Attempt `n` (1-based) is about to run
    Attempting(u32),
    /// Attempt `n` failed in a retryable way and another one is allowed
    Backoff(u32),
    Terminal(ExtractionResult),
}

/// Attempt failures that may go away on their own
#[derive(Debug)]
enum Transient {
    Http { status: u16, message: String },
    Network(String),
    Malformed(String),
}

enum Outcome {
    Done(ExtractionResult),
    Retry(Transient),
}

pub struct ExtractionClient<T = HttpTransport> {
    transport: T,
}

impl Default for ExtractionClient<HttpTransport> {
    fn default() -> Self {
        Self::new(HttpTransport::new())
    }
}

impl<T: Transport> ExtractionClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ask the service for the text in `image`.
    ///
    /// Every service-side failure comes back inside [`ExtractionResult`]; only
    /// an unusable `config` is an `Err`, reported before any request is sent.
    pub async fn extract_text(
        &self,
        image: &CroppedImage,
        config: &ExtractionConfig,
    ) -> Result<ExtractionResult, ConfigError> {
        self.extract_text_with_cancel(image, config, &CancellationToken::new())
            .await
    }

    /// Like [`extract_text`](Self::extract_text), stopping early once `cancel` fires
    pub async fn extract_text_with_cancel(
        &self,
        image: &CroppedImage,
        config: &ExtractionConfig,
        cancel: &CancellationToken,
    ) -> Result<ExtractionResult, ConfigError> {
        let mut url = config.validate()?;

        let Some(credential) = config.usable_credential() else {
            tracing::warn!("No usable API key, skipping text extraction");
            return Ok(ExtractionResult::failure(
                FailureKind::Unauthorized,
                "credential not configured",
            ));
        };

        let bearer = match config.auth_scheme {
            AuthScheme::QueryKey => {
                url.query_pairs_mut().append_pair("key", credential);
                None
            }
            AuthScheme::Bearer => Some(credential.to_string()),
        };

        let request = HttpRequest {
            url,
            bearer,
            body: GenerateRequest::for_image(&config.prompt_text, image.to_base64()),
        };

        let mut state = AttemptState::Attempting(1);
        loop {
            state = match state {
                AttemptState::Attempting(n) => {
                    tracing::debug!("Extraction attempt {n}/{}", config.max_attempts);
                    match self.attempt(&request, config, cancel).await {
                        Outcome::Done(result) => AttemptState::Terminal(result),
                        Outcome::Retry(reason) if n < config.max_attempts => {
                            tracing::warn!("Attempt {n} failed, will retry: {reason:?}");
                            AttemptState::Backoff(n)
                        }
                        Outcome::Retry(reason) => {
                            AttemptState::Terminal(exhausted(reason, config))
                        }
                    }
                }
                AttemptState::Backoff(n) => {
                    let delay = backoff_delay(n);
                    tracing::debug!("Backing off {delay:?} before attempt {}", n + 1);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => AttemptState::Attempting(n + 1),
                        _ = cancel.cancelled() => AttemptState::Terminal(cancelled()),
                    }
                }
                AttemptState::Terminal(result) => {
                    if let ExtractionResult::Failure { kind, message } = &result {
                        tracing::error!("Text extraction failed ({kind}): {message}");
                    }
                    return Ok(result);
                }
            };
        }
    }

    async fn attempt(
        &self,
        request: &HttpRequest,
        config: &ExtractionConfig,
        cancel: &CancellationToken,
    ) -> Outcome {
        let sent = tokio::select! {
            sent = tokio::time::timeout(config.timeout(), self.transport.send(request)) => sent,
            _ = cancel.cancelled() => return Outcome::Done(cancelled()),
        };

        match sent {
            Err(_elapsed) => Outcome::Done(ExtractionResult::failure(
                FailureKind::Timeout,
                format!("no response within {}ms", config.timeout_ms),
            )),
            Ok(Err(TransportError::Timeout)) => Outcome::Done(ExtractionResult::failure(
                FailureKind::Timeout,
                "request timed out",
            )),
            Ok(Err(TransportError::Network(message))) => {
                Outcome::Retry(Transient::Network(message))
            }
            Ok(Ok(response)) => classify(response, config),
        }
    }
}

fn classify(response: HttpResponse, config: &ExtractionConfig) -> Outcome {
    if !response.is_success() {
        let message = error_message(&response.body).unwrap_or_else(|| status_text(response.status));
        return Outcome::Retry(Transient::Http {
            status: response.status,
            message,
        });
    }

    let recognized = match serde_json::from_str::<GenerateResponse>(&response.body) {
        Ok(parsed) => parsed.recognize(),
        Err(e) => Recognized::Malformed(format!("unexpected response body: {e}")),
    };

    match recognized {
        Recognized::Text(text) => Outcome::Done(ExtractionResult::Success(text)),
        Recognized::NoText => Outcome::Done(ExtractionResult::Empty),
        Recognized::Malformed(message) if config.retry_malformed => {
            Outcome::Retry(Transient::Malformed(message))
        }
        Recognized::Malformed(message) => Outcome::Done(ExtractionResult::failure(
            FailureKind::MalformedResponse,
            message,
        )),
    }
}

/// Result once the last allowed attempt failed in a retryable way
fn exhausted(reason: Transient, config: &ExtractionConfig) -> ExtractionResult {
    match reason {
        Transient::Http { .. } if config.lenient_http_errors => ExtractionResult::Empty,
        Transient::Http { status, message } => ExtractionResult::failure(
            FailureKind::RateLimitedOrServerError,
            format!("HTTP {status}: {message}"),
        ),
        Transient::Malformed(message) => {
            ExtractionResult::failure(FailureKind::MalformedResponse, message)
        }
        Transient::Network(message) => ExtractionResult::failure(
            FailureKind::Unknown,
            format!("exhausted retries: {message}"),
        ),
    }
}

fn cancelled() -> ExtractionResult {
    ExtractionResult::failure(FailureKind::Unknown, "extraction cancelled")
}

fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
        .to_string()
}

/// Extract with a fresh reqwest client
pub async fn extract_text(
    image: &CroppedImage,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ConfigError> {
    ExtractionClient::<HttpTransport>::default()
        .extract_text(image, config)
        .await
}

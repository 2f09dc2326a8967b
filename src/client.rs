use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::types::{ChatCompletionRequest, ChatCompletionResponse};

const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/";
const COMPLETIONS_PATH: &str = "chat/completions";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const REFERER: &str = "https://fitness-tracker.streamlit.app";
const APP_TITLE: &str = "Streak Fitness Tracker";

/// Something that turns a chat-completions request into reply text.
///
/// [`OpenRouter`] is the production implementation; the fetcher only depends
/// on this trait.
#[async_trait::async_trait]
pub trait Completer: Send + Sync {
    /// Send `request` with `credential` and return the first choice's text.
    async fn complete(&self, credential: &str, request: &ChatCompletionRequest) -> Result<String>;
}

/// Client for the OpenRouter chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenRouter {
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl OpenRouter {
    /// Create a new client against the public endpoint with a 15 second timeout.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `base_url` is the API root; `chat/completions` is resolved against it.
    pub fn with_options(base_url: Option<&str>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url.unwrap_or(DEFAULT_API_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The API root requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create the headers sent with every request.
    fn default_headers(credential: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut authorization = HeaderValue::from_str(&format!("Bearer {credential}"))
            .map_err(|_| {
                Error::validation(
                    "API key contains characters that cannot be sent in a header",
                    Some("api_key".to_string()),
                )
            })?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert("http-referer", HeaderValue::from_static(REFERER));
        headers.insert("x-title", HeaderValue::from_static(APP_TITLE));
        Ok(headers)
    }

    /// Turn a failed `send` into our error type.
    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            message: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| {
                if error_body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    error_body
                }
            });

        Error::api(status.as_u16(), message)
    }

    async fn send(&self, credential: &str, request: &ChatCompletionRequest) -> Result<String> {
        let url = self.base_url.join(COMPLETIONS_PATH)?;

        let response = self
            .client
            .post(url)
            .headers(Self::default_headers(credential)?)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        parsed
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| Error::unexpected_response("response contained no choices"))
    }
}

#[async_trait::async_trait]
impl Completer for OpenRouter {
    async fn complete(&self, credential: &str, request: &ChatCompletionRequest) -> Result<String> {
        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let result = self.send(credential, request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            CLIENT_REQUEST_ERRORS.click();
        }
        result
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

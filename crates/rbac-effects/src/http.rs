//! Shared request plumbing for the HTTP handlers

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;

/// Upper bound on error bodies kept in error messages
const MAX_ERROR_BODY: usize = 512;

/// Request timeout applied to every call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Base URL plus optional bearer token
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    client: Client,
    base: Url,
    token: Option<String>,
}

/// A raw response: status and body text
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Why a request produced no response
#[derive(Debug, Error)]
pub(crate) enum RequestFailure {
    /// The base URL cannot take path segments
    #[error("cannot build URL from base {0}")]
    InvalidBase(String),
    /// Transport-level error
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl Endpoint {
    pub(crate) fn new(base: &str, token: Option<String>) -> Result<Self, RequestFailure> {
        let base = Url::parse(base).map_err(|_| RequestFailure::InvalidBase(base.to_string()))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base,
            token,
        })
    }

    /// `base` with `segments` appended, each percent-encoded
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, RequestFailure> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RequestFailure::InvalidBase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    pub(crate) fn patch(&self, url: Url) -> RequestBuilder {
        self.authorize(self.client.patch(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Send and collect status plus body
pub(crate) async fn send(request: RequestBuilder) -> Result<RawResponse, RequestFailure> {
    let response: Response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    Ok(RawResponse { status, body })
}

/// Truncated body for error messages
pub(crate) fn error_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

//! REST gateway over the shop API.
//!
//! Thin reqwest wrapper. URL building, status mapping, and body parsing are
//! pure functions so they can be tested without a server.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::{BoardGateway, GatewayError, SaveReceipt};
use crate::config::RaiboardConfig;
use crate::types::{Board, CollaboratorRole};

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpGateway {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// does not parse.
    pub fn new(config: &RaiboardConfig) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url, api_token: config.api_token.clone() })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send `request`, returning the status and body text.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), GatewayError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok((status, text))
    }
}

#[async_trait]
impl BoardGateway for HttpGateway {
    async fn get_board_by_id(&self, id: &str) -> Result<Board, GatewayError> {
        let url = board_url(&self.base_url, id)?;
        debug!(%url, "gateway: fetch board");
        let (status, text) = self.send(self.http.get(url)).await?;
        check_status(status, &text, id)?;
        parse_board(&text)
    }

    async fn save_board(&self, board: &Board) -> Result<SaveReceipt, GatewayError> {
        let url = board_url(&self.base_url, &board.id)?;
        debug!(%url, products = board.products.len(), texts = board.text_elements.len(), "gateway: save board");
        let (status, text) = self.send(self.http.put(url).json(board)).await?;
        check_status(status, &text, &board.id)?;
        parse_save_receipt(&text)
    }

    async fn invite_collaborator(&self, board_id: &str, email: &str, role: CollaboratorRole) -> Result<(), GatewayError> {
        let url = collaborators_url(&self.base_url, board_id)?;
        let body = InviteRequest { email, role };
        let (status, text) = self.send(self.http.post(url).json(&body)).await?;
        check_status(status, &text, board_id)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct InviteRequest<'a> {
    email: &'a str,
    role: CollaboratorRole,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: String,
}

// =============================================================================
// PURE HELPERS
// =============================================================================

/// Append `segments` to the base path. Each segment is percent-encoded, so
/// a `/`, `?` or `#` inside a board id stays inside its segment.
fn endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, GatewayError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| GatewayError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn board_url(base_url: &Url, board_id: &str) -> Result<Url, GatewayError> {
    endpoint(base_url, &["boards", board_id])
}

fn collaborators_url(base_url: &Url, board_id: &str) -> Result<Url, GatewayError> {
    endpoint(base_url, &["boards", board_id, "collaborators"])
}

/// Map a non-2xx status to the gateway taxonomy.
fn check_status(status: u16, body: &str, board_id: &str) -> Result<(), GatewayError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(GatewayError::NotFound(board_id.to_owned())),
        400 | 422 => Err(GatewayError::Validation(error_message(body))),
        _ => Err(GatewayError::Status { status, body: body.to_owned() }),
    }
}

/// Prefer a JSON `message`/`error` field, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(|_| body.trim().to_owned(), |parsed| parsed.message)
}

fn parse_board(json: &str) -> Result<Board, GatewayError> {
    serde_json::from_str(json).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Servers that reconcile nothing may answer with an empty body.
fn parse_save_receipt(json: &str) -> Result<SaveReceipt, GatewayError> {
    if json.trim().is_empty() {
        return Ok(SaveReceipt::default());
    }
    serde_json::from_str(json).map_err(|e| GatewayError::Decode(e.to_string()))
}

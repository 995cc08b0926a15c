//! HTTP client for the Wizi Learn REST API
//!
//! Thin wrapper over `reqwest`: builds the URL, attaches the bearer token, maps HTTP
//! status codes to `ApiError`, and decodes the JSON list. No caching or retries here;
//! that belongs to the fetch layer.

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::{Category, Formation, RankingEntry};

/// Path of the categories endpoint
pub const CATEGORIES_PATH: &str = "/api/categories";

/// Path of the formations endpoint
pub const FORMATIONS_PATH: &str = "/api/formations";

/// Path of the global ranking endpoint
pub const RANKING_PATH: &str = "/api/classement";

/// Errors that can occur when calling the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("Requête échouée: {0}")]
    Request(#[from] reqwest::Error),

    /// The token is missing or expired
    #[error("Session expirée, veuillez vous reconnecter")]
    Unauthorized,

    /// Non-success status other than 401
    #[error("Réponse inattendue {status} pour {url}")]
    Status { status: u16, url: String },

    /// Response body is not the expected JSON
    #[error("Réponse illisible: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the Wizi Learn backend
#[derive(Debug, Clone)]
pub struct WiziClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl WiziClient {
    /// Creates a client for `base_url` (e.g. `https://wizi-learn.com`)
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_list(CATEGORIES_PATH).await
    }

    pub async fn formations(&self) -> Result<Vec<Formation>, ApiError> {
        self.get_list(FORMATIONS_PATH).await
    }

    pub async fn ranking(&self) -> Result<Vec<RankingEntry>, ApiError> {
        self.get_list(RANKING_PATH).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let url = self.url(path);
        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized),
            status => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    url,
                })
            }
        }

        let text = response.text().await?;
        parse_list(&text)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

/// Decodes a JSON list, bare or wrapped in `{ "data": [...] }`
pub(crate) fn parse_list<T: DeserializeOwned>(text: &str) -> Result<Vec<T>, ApiError> {
    let body: ListBody<T> = serde_json::from_str(text)?;
    Ok(match body {
        ListBody::Bare(items) => items,
        ListBody::Wrapped { data } => data,
    })
}

use std::fmt;

use async_trait::async_trait;
use model::{marker::Marker, parking::Parking, WithId};
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utility::id::Id;

use crate::config::EditorConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The backend answered, but refused the request.
    Rejected {
        status: u16,
        message: Option<String>,
        details: Option<String>,
    },
    Unauthorized,
    /// The backend could not be reached, or its answer was not understood.
    Transport(String),
}

impl std::error::Error for GatewayError {}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GatewayError::Rejected {
                status,
                message,
                details,
            } => {
                write!(f, "request rejected ({status})")?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                if let Some(details) = details {
                    write!(f, " ({details})")?;
                }
                Ok(())
            }
            GatewayError::Unauthorized => write!(f, "not authorized to access the backend"),
            GatewayError::Transport(why) => write!(f, "backend unreachable: {why}"),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Persistence of markers and parkings. Every call maps to exactly one
/// backend request.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    async fn list_markers(&self) -> GatewayResult<Vec<WithId<Marker>>>;
    async fn create_marker(&self, marker: &Marker) -> GatewayResult<WithId<Marker>>;
    async fn delete_marker(&self, id: &Id<Marker>) -> GatewayResult<()>;

    async fn list_parkings(&self) -> GatewayResult<Vec<WithId<Parking>>>;
    async fn create_parking(&self, parking: &Parking) -> GatewayResult<WithId<Parking>>;
    async fn delete_parking(&self, id: &Id<Parking>) -> GatewayResult<()>;
}

/// Error body the backend sends along with a non success status.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: Option<String>,
    detailed_information: Option<String>,
}

#[derive(Serialize)]
struct IdBody<'a> {
    id: &'a str,
}

/// [`Gateway`] speaking JSON over HTTP to the annotation backend.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.base_url.as_str(), config.api_token.clone())
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{endpoint}", self.base_url);
        log::debug!("{method} {url}");
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> GatewayResult<T> {
        let response = request.send().await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
            status => {
                let body = response.json::<ErrorBody>().await.unwrap_or_default();
                Err(GatewayError::Rejected {
                    status: status.as_u16(),
                    message: body.message,
                    details: body.detailed_information,
                })
            }
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_markers(&self) -> GatewayResult<Vec<WithId<Marker>>> {
        self.send(self.request(reqwest::Method::GET, "markers/all"))
            .await
    }

    async fn create_marker(&self, marker: &Marker) -> GatewayResult<WithId<Marker>> {
        self.send(self.request(reqwest::Method::POST, "markers/marker").json(marker))
            .await
    }

    async fn delete_marker(&self, id: &Id<Marker>) -> GatewayResult<()> {
        self.send::<String>(
            self.request(reqwest::Method::DELETE, "markers/marker")
                .json(&IdBody { id: id.raw_ref() }),
        )
        .await
        .map(|confirmation| log::debug!("{confirmation}"))
    }

    async fn list_parkings(&self) -> GatewayResult<Vec<WithId<Parking>>> {
        self.send(self.request(reqwest::Method::GET, "parkings/all"))
            .await
    }

    async fn create_parking(&self, parking: &Parking) -> GatewayResult<WithId<Parking>> {
        self.send(self.request(reqwest::Method::POST, "parkings/parking").json(parking))
            .await
    }

    async fn delete_parking(&self, id: &Id<Parking>) -> GatewayResult<()> {
        self.send::<String>(
            self.request(reqwest::Method::DELETE, "parkings/parking")
                .json(&IdBody { id: id.raw_ref() }),
        )
        .await
        .map(|confirmation| log::debug!("{confirmation}"))
    }
}

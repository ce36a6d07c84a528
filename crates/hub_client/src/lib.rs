use std::{sync::Arc, time::Duration};

use anyhow::Context;
use assistant::{HttpResponder, ResponseResolver};
use catalog::meeting::DEFAULT_JOIN_URL;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{EventRecord, JoinDescriptor},
    error::{ApiError, ErrorCode},
    protocol::{
        CreateMeetingRequest, HealthResponse, SuggestionsResponse, ASSISTANT_SUGGESTIONS_ROUTE,
        EVENTS_ROUTE, HEALTH_ROUTE, MEETINGS_ROUTE,
    },
};
use thiserror::Error;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("server returned {status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// HTTP caller for a Festival Hub server.
#[derive(Clone)]
pub struct HubClient {
    http: Client,
    server_url: String,
}

impl HubClient {
    pub fn new(server_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        let server_url: String = server_url.into();
        Ok(Self {
            http,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub async fn list_events(&self) -> Result<Vec<EventRecord>, ClientError> {
        let events = self
            .http
            .get(format!("{}{EVENTS_ROUTE}", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(events)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let report = self
            .http
            .get(format!("{}{HEALTH_ROUTE}", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(report)
    }

    pub async fn suggestions(&self) -> Result<SuggestionsResponse, ClientError> {
        let suggestions = self
            .http
            .get(format!("{}{ASSISTANT_SUGGESTIONS_ROUTE}", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(suggestions)
    }

    pub async fn create_meeting(
        &self,
        topic: &str,
        duration_minutes: Option<u32>,
    ) -> Result<JoinDescriptor, ClientError> {
        let response = self
            .http
            .post(format!("{}{MEETINGS_ROUTE}", self.server_url))
            .json(&CreateMeetingRequest {
                topic: Some(topic.to_string()),
                duration_minutes: duration_minutes.map(i64::from),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiError>(&body).ok() {
            Some(err) if err.code == ErrorCode::InvalidArgument => {
                Err(ClientError::InvalidArgument(err.message))
            }
            Some(err) => Err(ClientError::Server {
                status,
                message: err.message,
            }),
            None => Err(ClientError::Server {
                status,
                message: body,
            }),
        }
    }

    /// Where to send a user who wants to join `festival`.
    ///
    /// Transport or server failures fall back to the default join URL;
    /// only a rejected topic is reported.
    pub async fn join_target(&self, festival: &str) -> Result<String, ClientError> {
        match self
            .create_meeting(&format!("{festival} - Virtual Festival"), None)
            .await
        {
            Ok(descriptor) => Ok(descriptor.join_url),
            Err(ClientError::InvalidArgument(message)) => Err(ClientError::InvalidArgument(message)),
            Err(error) => {
                warn!(%error, "meeting creation failed; using default join link");
                Ok(DEFAULT_JOIN_URL.to_string())
            }
        }
    }

    /// A resolver whose remote tier is this server's assistant endpoint.
    pub fn resolver(&self, timeout: Duration) -> ResponseResolver {
        let responder = HttpResponder::with_client(self.http.clone(), &self.server_url);
        ResponseResolver::new(Arc::new(responder)).with_timeout(timeout)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

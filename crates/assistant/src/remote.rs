use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ServiceError,
    protocol::{ResolveRequest, ResolveResponse, ASSISTANT_RESOLVE_ROUTE},
};

/// A service that can answer an utterance on the assistant's behalf.
#[async_trait]
pub trait RemoteResponder: Send + Sync {
    async fn respond(&self, utterance: &str, context: &str) -> Result<String, ServiceError>;
}

/// Calls `POST /assistant/resolve` on another Festival Hub process.
#[derive(Clone)]
pub struct HttpResponder {
    client: Client,
    endpoint: String,
}

impl HttpResponder {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build assistant http client")?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{ASSISTANT_RESOLVE_ROUTE}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteResponder for HttpResponder {
    async fn respond(&self, utterance: &str, context: &str) -> Result<String, ServiceError> {
        let body = ResolveRequest {
            utterance: utterance.to_string(),
            context: Some(context.to_string()),
        };
        let response: ResolveResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(remote_failed)?
            .error_for_status()
            .map_err(remote_failed)?
            .json()
            .await
            .map_err(remote_failed)?;

        if response.reply.trim().is_empty() {
            return Err(ServiceError::RemoteResolutionFailed(
                "remote reply was empty".into(),
            ));
        }
        Ok(response.reply)
    }
}

fn remote_failed(error: reqwest::Error) -> ServiceError {
    ServiceError::RemoteResolutionFailed(error.to_string())
}

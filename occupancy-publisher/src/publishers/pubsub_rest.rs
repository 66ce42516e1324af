use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use gcp_auth::TokenProvider;
use reqwest::Client;

use crate::{
    config::PublisherConfig,
    pipeline::{Publisher, PublisherError},
    topic::TopicPath,
};

pub const DEFAULT_ENDPOINT: &str = "https://pubsub.googleapis.com";
pub const PUBSUB_SCOPE: &str = "https://www.googleapis.com/auth/pubsub";
/// Same variable the official client libraries honor.
pub const EMULATOR_HOST_VAR: &str = "PUBSUB_EMULATOR_HOST";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("credentials error: {0}")]
    Auth(#[from] gcp_auth::Error),
    #[error("publish response carried no message id")]
    MissingMessageId,
}

#[derive(serde::Serialize)]
struct PublishRequest {
    messages: Vec<PubsubMessage>,
}

#[derive(serde::Serialize)]
struct PubsubMessage {
    /// Base64 of the raw payload bytes.
    data: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Pub/Sub publisher speaking the v1 REST API.
///
/// Each `publish` sends a single message and waits for the response carrying
/// its message id; nothing is batched or pipelined.
pub struct PubSubRestPublisher {
    http: Client,
    endpoint: String,
    topic: TopicPath,
    credentials: Option<Arc<dyn TokenProvider>>,
}

impl PubSubRestPublisher {
    /// Binds to `projects/{project_id}/topics/{topic_id}`.
    ///
    /// Talks to the emulator without credentials when `PUBSUB_EMULATOR_HOST`
    /// is set; otherwise resolves Application Default Credentials and fetches a
    /// token up front so missing credentials fail here rather than mid-run.
    pub async fn connect(cfg: PublisherConfig) -> Result<Self, PublisherError> {
        let topic = TopicPath::new(&cfg.project_id, &cfg.topic_id);

        let publisher = match std::env::var(EMULATOR_HOST_VAR) {
            Ok(host) => {
                tracing::info!(emulator = %host, "using Pub/Sub emulator");
                Self::with_endpoint(emulator_endpoint(&host), topic, None)?
            }
            Err(_) => {
                let provider = gcp_auth::provider()
                    .await
                    .map_err(|e| PublisherError::Binding(format!("no usable credentials: {e}")))?;
                provider
                    .token(&[PUBSUB_SCOPE])
                    .await
                    .map_err(|e| PublisherError::Binding(format!("failed to obtain access token: {e}")))?;
                Self::with_endpoint(DEFAULT_ENDPOINT, topic, Some(provider))?
            }
        };

        tracing::info!(topic = %publisher.topic, endpoint = %publisher.endpoint, "publisher bound");
        Ok(publisher)
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        topic: TopicPath,
        credentials: Option<Arc<dyn TokenProvider>>,
    ) -> Result<Self, PublisherError> {
        let http = Client::builder()
            .build()
            .map_err(|e| PublisherError::Binding(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            topic,
            credentials,
        })
    }

    fn publish_url(&self) -> String {
        format!("{}/v1/{}:publish", self.endpoint, self.topic)
    }
}

fn emulator_endpoint(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

#[async_trait::async_trait]
impl Publisher for PubSubRestPublisher {
    type Error = BackendError;

    async fn publish(&self, data: Vec<u8>) -> Result<String, BackendError> {
        let body = PublishRequest {
            messages: vec![PubsubMessage {
                data: STANDARD.encode(&data),
            }],
        };

        let mut req = self.http.post(self.publish_url()).json(&body);
        if let Some(credentials) = &self.credentials {
            let token = credentials.token(&[PUBSUB_SCOPE]).await?;
            req = req.bearer_auth(token.as_str());
        }

        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BackendError::UnexpectedStatus { status, body });
        }

        let ack: PublishResponse = res.json().await?;
        ack.message_ids
            .into_iter()
            .next()
            .ok_or(BackendError::MissingMessageId)
    }
}

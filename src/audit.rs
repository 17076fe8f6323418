//! Best-effort audit trail.
//!
//! Events are handed to an [`AuditClient`] on a detached task. A failing
//! sidecar is logged and never fails the request that produced the event.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntity {
    User,
    Product,
    File,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Get,
    Delete,
    Register,
    Login,
    UploadFile,
}

#[derive(Clone, Debug, Serialize)]
pub struct LogItem {
    pub entity: AuditEntity,
    pub action: AuditAction,
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
}

impl LogItem {
    pub fn now(entity: AuditEntity, action: AuditAction, entity_id: impl Into<String>) -> Self {
        Self {
            entity,
            action,
            entity_id: entity_id.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit transport failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait AuditClient: Send + Sync {
    async fn record(&self, item: LogItem) -> Result<(), AuditError>;
}

/// Records events to the sidecar over HTTP as JSON.
pub struct HttpAuditClient {
    client: Client,
    endpoint: String,
}

impl HttpAuditClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AuditError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl AuditClient for HttpAuditClient {
    async fn record(&self, item: LogItem) -> Result<(), AuditError> {
        self.client
            .post(&self.endpoint)
            .json(&item)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Used when no sidecar is configured: the event only goes to the log.
pub struct TracingAuditClient;

#[async_trait]
impl AuditClient for TracingAuditClient {
    async fn record(&self, item: LogItem) -> Result<(), AuditError> {
        info!(
            entity = ?item.entity,
            action = ?item.action,
            entity_id = %item.entity_id,
            timestamp = %item.timestamp,
            "Audit event"
        );
        Ok(())
    }
}

/// Sends the event without waiting for it.
pub fn emit(client: &Arc<dyn AuditClient>, entity: AuditEntity, action: AuditAction, entity_id: &str) {
    let client = Arc::clone(client);
    let item = LogItem::now(entity, action, entity_id);
    tokio::spawn(async move {
        if let Err(err) = client.record(item.clone()).await {
            warn!(
                entity = ?item.entity,
                action = ?item.action,
                entity_id = %item.entity_id,
                error = %err,
                "Failed to send audit event"
            );
        }
    });
}

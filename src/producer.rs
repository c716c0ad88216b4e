//! NATS publisher for prediction replies

use crate::types::response::Reply;
use anyhow::Result;
use async_nats::{Client, HeaderMap, Subject};
use tracing::debug;

/// Header carrying the reply status code (200, 422 or 500)
pub const STATUS_HEADER: &str = "Prediction-Status";

/// Publishes replies to the caller's inbox
#[derive(Clone)]
pub struct ReplyPublisher {
    client: Client,
}

impl ReplyPublisher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Publish a reply with its status header
    pub async fn publish(&self, reply_to: Subject, reply: Reply) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, reply.status.code().to_string().as_str());

        debug!(
            reply_to = %reply_to,
            status = reply.status.code(),
            bytes = reply.body.len(),
            "Publishing reply"
        );

        self.client
            .publish_with_headers(reply_to, headers, reply.body.into())
            .await?;

        Ok(())
    }
}

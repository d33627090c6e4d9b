//! HTTP writer feed over the writer's `/journal` endpoint.

use crate::ports::{FeedChunk, WriterFeed};
use async_trait::async_trait;
use shared_types::events::headers;
use shared_types::HubError;
use std::time::Duration;

/// Pulls journal ranges from the writer over HTTP. Every request carries
/// a bounded timeout; expiry maps to `WriterUnreachable`.
pub struct HttpWriterFeed {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpWriterFeed {
    pub fn new(
        writer_address: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, HubError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::Config(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url: writer_address.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn header_u64(response: &reqwest::Response, name: &str) -> Option<u64> {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    fn header_i64(response: &reqwest::Response, name: &str) -> Option<i64> {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    fn header_string(response: &reqwest::Response, name: &str) -> Option<String> {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

#[async_trait]
impl WriterFeed for HttpWriterFeed {
    async fn fetch(&self, offset: u64) -> Result<FeedChunk, HubError> {
        let url = format!("{}/journal?offset={}", self.base_url, offset);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HubError::WriterUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(HubError::WriterUnreachable(format!(
                "writer returned {}",
                response.status()
            )));
        }

        let next_offset = Self::header_u64(&response, headers::NEXT_OFFSET);
        let last_hash = Self::header_string(&response, headers::LAST_HASH);
        let last_timestamp = Self::header_i64(&response, headers::LAST_TIMESTAMP);
        let writer_size_bytes = Self::header_u64(&response, headers::JOURNAL_SIZE);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| HubError::WriterUnreachable(e.to_string()))?
            .to_vec();

        Ok(FeedChunk {
            next_offset: next_offset.unwrap_or(offset + bytes.len() as u64),
            writer_size_bytes: writer_size_bytes.unwrap_or(offset + bytes.len() as u64),
            last_hash,
            last_timestamp,
            bytes,
        })
    }
}

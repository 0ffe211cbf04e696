//! Index sink client.
//!
//! The sink is a remote Elasticsearch-style service: documents are POSTed as
//! JSON to `/{index}/_doc`. The client is built once per pool member and
//! reused for every submission; the pipeline owns no retry policy beyond the
//! client-side timeout.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use linkdex_shared::{IngestDocument, LinkdexError, Result};

/// HTTP client for the search index sink.
pub struct IndexClient {
    base: Url,
    client: Client,
}

impl IndexClient {
    /// Build a client for the sink at `host:port`.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let base = Url::parse(&format!("http://{host}:{port}/"))
            .map_err(|e| LinkdexError::Index(format!("invalid index address {host}:{port}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LinkdexError::Index(format!("failed to build index client: {e}")))?;

        Ok(Self { base, client })
    }

    /// Submit one document under `index`. A non-success response is an
    /// [`LinkdexError::Index`] carrying the status and response body.
    pub async fn index(&self, index: &str, doc: &IngestDocument) -> Result<()> {
        let endpoint = self
            .base
            .join(&format!("{index}/_doc"))
            .map_err(|e| LinkdexError::Index(format!("invalid index name {index:?}: {e}")))?;

        let response = self
            .client
            .post(endpoint)
            .json(doc)
            .send()
            .await
            .map_err(|e| LinkdexError::Index(format!("{index}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LinkdexError::Index(format!("{index}: HTTP {status}: {body}")));
        }

        Ok(())
    }
}

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use tempolens_core::config::Config;
use tempolens_core::decode::decode_trace_body;
use tempolens_core::error::{Result, TempolensError};
use tempolens_core::ids::TraceId;
use tempolens_core::model::Trace;

/// Queries Tempo's trace-by-ID endpoint.
///
/// One request per lookup, bounded by the configured timeout and never
/// retried. Clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TempoClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl TempoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TempolensError::Fetch(format!("failed to build http client: {e}")))?;
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| TempolensError::Config(format!("invalid tempo url {raw:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TempolensError::Config(format!(
                "tempo url {raw:?} cannot carry a path"
            )));
        }

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.tempo_url.clone(), cfg.fetch_timeout)
    }

    /// `{base}/api/traces/{id}` with the ID escaped as a single path segment,
    /// so base64 IDs containing `/` stay intact.
    pub fn trace_url(&self, trace_id: &TraceId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "traces", trace_id.as_str()]);
        }
        url
    }

    /// Fetches one trace and decodes it as OTLP, falling back to Jaeger JSON.
    pub async fn fetch_trace(&self, trace_id: &str) -> Result<Trace> {
        let trace_id = TraceId::parse(trace_id)?;
        let body = self.fetch_body(&trace_id).await?;
        decode_trace_body(&body, trace_id.as_str())
    }

    async fn fetch_body(&self, trace_id: &TraceId) -> Result<Vec<u8>> {
        let url = self.trace_url(trace_id);
        tracing::debug!(url = %url, "querying tempo");

        let resp = self
            .client
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TempolensError::Fetch(format!(
                        "request to {url} timed out after {}",
                        humantime::format_duration(self.timeout)
                    ))
                } else {
                    TempolensError::Fetch(format!("failed to query tempo: {e}"))
                }
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), url = %url, "tempo returned non-200");
            return Err(TempolensError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| TempolensError::Fetch(format!("failed to read response body: {e}")))?;
        tracing::debug!(bytes = body.len(), "tempo response received");
        Ok(body.to_vec())
    }
}

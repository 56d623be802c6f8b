//! Remote query endpoint client

use std::time::Duration;

use crate::{Error, Result};

/// Fallback content when the endpoint answers without a usable reply
pub const NO_VALID_RESPONSE: &str = "No valid response received.";

/// Request timeout applied at the HTTP client boundary
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(serde::Serialize)]
struct QueryRequest<'a> {
    prompt: &'a str,
}

#[derive(serde::Deserialize)]
struct QueryResponse {
    response: Option<QueryInner>,
}

#[derive(serde::Deserialize)]
struct QueryInner {
    response: Option<String>,
}

/// Forwards prompts to the remote query endpoint
pub struct QueryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl QueryClient {
    /// Create a new query client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(endpoint: String) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            endpoint,
        })
    }

    /// Send a prompt, returning the bot reply
    ///
    /// A well-formed response missing the nested `response.response`
    /// field yields [`NO_VALID_RESPONSE`] rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the endpoint is unreachable or
    /// answers with a non-success status.
    pub async fn ask(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&QueryRequest { prompt })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "query request failed");
                Error::Query(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = %status, "query endpoint error");
            return Err(Error::Query(format!("query endpoint returned {status}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::Query(format!("malformed query response: {e}")))?;

        let reply = parsed
            .response
            .and_then(|inner| inner.response)
            .unwrap_or_else(|| NO_VALID_RESPONSE.to_string());

        tracing::debug!(reply_len = reply.len(), "query complete");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_nested_field_falls_back() {
        let parsed: QueryResponse = serde_json::from_str("{}").unwrap();
        let reply = parsed
            .response
            .and_then(|inner| inner.response)
            .unwrap_or_else(|| NO_VALID_RESPONSE.to_string());
        assert_eq!(reply, NO_VALID_RESPONSE);

        let parsed: QueryResponse = serde_json::from_str(r#"{"response": {}}"#).unwrap();
        assert!(parsed.response.unwrap().response.is_none());
    }

    #[test]
    fn nested_field_extracted() {
        let parsed: QueryResponse =
            serde_json::from_str(r#"{"response": {"response": "hi there"}}"#).unwrap();
        assert_eq!(
            parsed.response.unwrap().response.as_deref(),
            Some("hi there")
        );
    }
}

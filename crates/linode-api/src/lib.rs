//! Typed Rust client for the Linode v3 action API.
//!
//! Covers the subset needed to build an SSH inventory:
//! `linode.list` and batched `linode.ip.list`.

mod types;

pub use types::*;

use serde::de::DeserializeOwned;
use tracing::debug;

const BASE_URL: &str = "https://api.linode.com/";

/// Maximum number of actions sent in a single `batch` call.
pub const IP_BATCH_SIZE: usize = 25;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("linode api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("linode api {endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("linode api {action} failed: {}", join_errors(.errors))]
    Linode { action: String, errors: Vec<ApiError> },

    #[error("linode api {action}: invalid json: {source}")]
    Json {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

fn join_errors(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Client for the Linode action API.
///
/// Every call is a form POST against a single endpoint, selected by
/// `api_action`. The key travels in the body so it never shows up in URLs
/// or request errors.
#[derive(Clone)]
pub struct LinodeClient {
    api_key: String,
    http: reqwest::Client,
}

impl LinodeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn check(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint,
                status,
                body,
            });
        }
        Ok(resp)
    }

    async fn call(
        &self,
        action: &'static str,
        extra: Vec<(&'static str, String)>,
    ) -> Result<String> {
        let mut form = vec![
            ("api_key", self.api_key.clone()),
            ("api_action", action.to_string()),
        ];
        form.extend(extra);

        let resp = self
            .http
            .post(BASE_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Request(e.without_url()))?;

        Self::check(resp, action)
            .await?
            .text()
            .await
            .map_err(Error::from)
    }

    // ── Linodes ──────────────────────────────────────────────────────

    pub async fn list_linodes(&self) -> Result<Vec<Linode>> {
        let body = self.call("linode.list", Vec::new()).await?;
        decode_action("linode.list", &body)
    }

    /// Fetch the addresses of every given Linode, batching the per-Linode
    /// `linode.ip.list` calls.
    pub async fn list_ips(&self, linode_ids: &[i64]) -> Result<Vec<LinodeIp>> {
        let mut ips = Vec::new();

        for request_array in ip_batches(linode_ids)? {
            debug!(bytes = request_array.len(), "linode: sending ip batch");
            let body = self
                .call("batch", vec![("api_requestArray", request_array)])
                .await?;

            for list in decode_batch::<Vec<LinodeIp>>(&body)? {
                ips.extend(list);
            }
        }

        Ok(ips)
    }
}

impl Envelope {
    /// Unwrap the payload, failing if the API reported any errors.
    pub fn into_data<T: DeserializeOwned>(self, action: &str) -> Result<T> {
        if !self.errors.is_empty() {
            return Err(Error::Linode {
                action: action.to_string(),
                errors: self.errors,
            });
        }
        serde_json::from_value(self.data).map_err(|source| Error::Json {
            action: action.to_string(),
            source,
        })
    }
}

/// One `api_requestArray` value per batch of at most `IP_BATCH_SIZE`
/// `linode.ip.list` actions. No ids, no batches.
pub fn ip_batches(linode_ids: &[i64]) -> Result<Vec<String>> {
    linode_ids
        .chunks(IP_BATCH_SIZE)
        .map(|chunk| {
            let actions: Vec<BatchAction> = chunk
                .iter()
                .map(|&linode_id| BatchAction {
                    api_action: "linode.ip.list",
                    linode_id,
                })
                .collect();
            serde_json::to_string(&actions).map_err(|source| Error::Json {
                action: "batch".into(),
                source,
            })
        })
        .collect()
}

/// Decode the response body of a single action.
pub fn decode_action<T: DeserializeOwned>(action: &str, body: &str) -> Result<T> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|source| Error::Json {
        action: action.to_string(),
        source,
    })?;
    envelope.into_data(action)
}

/// Decode the response body of a `batch` call: one envelope per action,
/// in request order.
pub fn decode_batch<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    let envelopes: Vec<Envelope> = serde_json::from_str(body).map_err(|source| Error::Json {
        action: "batch".into(),
        source,
    })?;

    envelopes
        .into_iter()
        .map(|envelope| {
            let action = envelope.action.clone();
            envelope.into_data(&action)
        })
        .collect()
}

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Envelope ─────────────────────────────────────────────────────────

/// Wrapper around every action response. `DATA` is kept raw until the
/// error array has been checked, since failed calls return `{}` there.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(rename = "ERRORARRAY", default)]
    pub errors: Vec<ApiError>,
    #[serde(rename = "ACTION", default)]
    pub action: String,
    #[serde(rename = "DATA", default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(rename = "ERRORCODE")]
    pub code: i64,
    #[serde(rename = "ERRORMESSAGE")]
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

// ── Linodes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Linode {
    #[serde(rename = "LINODEID")]
    pub id: i64,
    #[serde(rename = "STATUS")]
    pub status: i32,
    #[serde(rename = "LABEL")]
    pub label: String,
    #[serde(rename = "LPM_DISPLAYGROUP", default)]
    pub display_group: String,
    /// Memory in megabytes.
    #[serde(rename = "TOTALRAM", default)]
    pub total_ram: u32,
}

impl Linode {
    pub const STATUS_RUNNING: i32 = 1;

    pub fn is_running(&self) -> bool {
        self.status == Self::STATUS_RUNNING
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinodeIp {
    #[serde(rename = "LINODEID")]
    pub linode_id: i64,
    #[serde(rename = "ISPUBLIC")]
    pub public: u8,
    #[serde(rename = "IPADDRESS")]
    pub address: String,
}

impl LinodeIp {
    pub fn is_public(&self) -> bool {
        self.public == 1
    }
}

// ── Batch ────────────────────────────────────────────────────────────

/// One entry of a `batch` call's `api_requestArray`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchAction {
    pub api_action: &'static str,
    #[serde(rename = "LinodeID")]
    pub linode_id: i64,
}

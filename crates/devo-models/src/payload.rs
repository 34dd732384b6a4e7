//! Job payload handed to the transport.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::asset::{Asset, AssetKind, SUBTITLE_BLOCK_ID};
use crate::script::Script;

/// Opaque job identifier issued by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Run metadata stored alongside the assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobMetadata {
    /// Liturgical date (YYYY-MM-DD)
    pub date: String,

    /// Human-readable reference of the source reading
    pub reference: String,
}

impl JobMetadata {
    pub fn new(date: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            reference: reference.into(),
        }
    }
}

/// Bundle of assets, script and metadata for one production cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobPayload {
    pub assets: Vec<Asset>,

    pub script: Script,

    pub metadata: JobMetadata,

    /// Final text of the reading block
    #[serde(default)]
    pub assembled_reading_text: String,

    /// Existing job to replace instead of creating a new one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
}

impl JobPayload {
    /// Whether the transport should replace an existing unit.
    pub fn is_replacement(&self) -> bool {
        self.job_id.is_some()
    }

    /// The subtitle asset, if present.
    pub fn subtitles(&self) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.kind == AssetKind::Subtitle && a.block_id == SUBTITLE_BLOCK_ID)
    }

    /// Checks the payload invariant: at most one image and one audio per
    /// block id and at most one subtitle asset.
    pub fn has_unique_assets(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        let mut subtitles = 0usize;
        for asset in &self.assets {
            if asset.kind == AssetKind::Subtitle {
                subtitles += 1;
                continue;
            }
            if !seen.insert((asset.block_id.as_str(), asset.kind)) {
                return false;
            }
        }
        subtitles <= 1
    }
}

/// Listing entry for a stored job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct JobSummary {
    pub id: JobId,

    #[serde(default)]
    pub display_date: Option<String>,

    #[serde(default)]
    pub display_ref: Option<String>,
}

//! Generated asset models and the in-memory asset cache.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::script::BlockId;

/// Reserved block id carried by the subtitle asset.
pub const SUBTITLE_BLOCK_ID: &str = "subtitles";

/// Kind of media synthesized per block and kept in the cache.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of an asset inside a job payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Audio,
    Subtitle,
}

impl From<MediaKind> for AssetKind {
    fn from(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Audio => AssetKind::Audio,
            MediaKind::Image => AssetKind::Image,
        }
    }
}

impl AssetKind {
    /// The cacheable media kind, `None` for subtitles.
    pub fn media_kind(&self) -> Option<MediaKind> {
        match self {
            AssetKind::Audio => Some(MediaKind::Audio),
            AssetKind::Image => Some(MediaKind::Image),
            AssetKind::Subtitle => None,
        }
    }
}

/// A transported asset with base64 payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Asset {
    /// One of the five block ids or [`SUBTITLE_BLOCK_ID`]
    pub block_id: String,

    pub kind: AssetKind,

    /// Base64-encoded content
    pub data: String,
}

impl Asset {
    /// Encode raw bytes into a transportable asset.
    pub fn encode(block_id: impl Into<String>, kind: AssetKind, bytes: &[u8]) -> Self {
        Self {
            block_id: block_id.into(),
            kind,
            data: STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }

    /// The narrative block this asset belongs to, if any.
    pub fn block(&self) -> Option<BlockId> {
        self.block_id.parse().ok()
    }
}

// Payloads can be megabytes; only print their size.
impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("block_id", &self.block_id)
            .field("kind", &self.kind)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Cache of synthesized media, at most one entry per block and kind.
///
/// Values are never mutated in place: every change produces a new cache so
/// that a published snapshot stays consistent for its observers.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AssetCache {
    entries: BTreeMap<(BlockId, MediaKind), Arc<[u8]>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, block: BlockId, kind: MediaKind) -> Option<&Arc<[u8]>> {
        self.entries.get(&(block, kind))
    }

    pub fn audio(&self, block: BlockId) -> Option<&Arc<[u8]>> {
        self.get(block, MediaKind::Audio)
    }

    pub fn image(&self, block: BlockId) -> Option<&Arc<[u8]>> {
        self.get(block, MediaKind::Image)
    }

    pub fn contains(&self, block: BlockId, kind: MediaKind) -> bool {
        self.entries.contains_key(&(block, kind))
    }

    /// Whether both audio and image exist for the block.
    pub fn is_complete(&self, block: BlockId) -> bool {
        self.contains(block, MediaKind::Audio) && self.contains(block, MediaKind::Image)
    }

    /// New cache with the entry inserted, replacing any previous one.
    pub fn with_entry(&self, block: BlockId, kind: MediaKind, bytes: impl Into<Arc<[u8]>>) -> Self {
        let mut entries = self.entries.clone();
        entries.insert((block, kind), bytes.into());
        Self { entries }
    }

    /// New cache without any entries for the block.
    pub fn without_block(&self, block: BlockId) -> Self {
        let mut entries = self.entries.clone();
        entries.retain(|(b, _), _| *b != block);
        Self { entries }
    }

    /// Entries in fixed block order, audio before image.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, MediaKind, &Arc<[u8]>)> + '_ {
        self.entries.iter().map(|((b, k), v)| (*b, *k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total size of all cached payloads.
    pub fn total_bytes(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }
}

impl fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|((b, k), v)| (format!("{}/{}", b, k), v.len())),
            )
            .finish()
    }
}

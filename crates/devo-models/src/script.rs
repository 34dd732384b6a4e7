//! Narrative script models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of one of the five fixed narrative blocks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BlockId {
    Hook,
    Reading,
    Reflection,
    Application,
    Prayer,
}

impl BlockId {
    /// All blocks in playback order. This order is never changed.
    pub const ORDER: [BlockId; 5] = [
        BlockId::Hook,
        BlockId::Reading,
        BlockId::Reflection,
        BlockId::Application,
        BlockId::Prayer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockId::Hook => "hook",
            BlockId::Reading => "reading",
            BlockId::Reflection => "reflection",
            BlockId::Application => "application",
            BlockId::Prayer => "prayer",
        }
    }

    /// Zero-based position in [`BlockId::ORDER`].
    pub fn position(&self) -> usize {
        match self {
            BlockId::Hook => 0,
            BlockId::Reading => 1,
            BlockId::Reflection => 2,
            BlockId::Application => 3,
            BlockId::Prayer => 4,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BlockId {
    type Err = BlockIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hook" => Ok(BlockId::Hook),
            "reading" => Ok(BlockId::Reading),
            "reflection" => Ok(BlockId::Reflection),
            "application" => Ok(BlockId::Application),
            "prayer" => Ok(BlockId::Prayer),
            _ => Err(BlockIdParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown block id: {0}")]
pub struct BlockIdParseError(String);

/// Editable text/prompt pair of a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptBlock {
    /// Spoken text
    #[serde(default)]
    pub text: String,

    /// Image description used for the illustration
    #[serde(default)]
    pub image_prompt: String,
}

impl ScriptBlock {
    pub fn new(text: impl Into<String>, image_prompt: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image_prompt: image_prompt.into(),
        }
    }

    /// Whether there is anything to speak for this block.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Borrowed view of one block together with its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeBlock<'a> {
    pub id: BlockId,
    pub text: &'a str,
    pub image_prompt: &'a str,
}

/// The full five-block script.
///
/// Serializes as a map keyed by block id, matching the persisted job layout.
/// `reading` is always present; the remaining blocks may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<ScriptBlock>,

    pub reading: ScriptBlock,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<ScriptBlock>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ScriptBlock>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prayer: Option<ScriptBlock>,
}

impl Script {
    /// Create a script with only the mandatory reading block.
    pub fn new(reading: ScriptBlock) -> Self {
        Self {
            reading,
            ..Default::default()
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&ScriptBlock> {
        match id {
            BlockId::Hook => self.hook.as_ref(),
            BlockId::Reading => Some(&self.reading),
            BlockId::Reflection => self.reflection.as_ref(),
            BlockId::Application => self.application.as_ref(),
            BlockId::Prayer => self.prayer.as_ref(),
        }
    }

    /// Mutable access for editing. Optional blocks are created empty on demand.
    pub fn block_mut(&mut self, id: BlockId) -> &mut ScriptBlock {
        match id {
            BlockId::Hook => self.hook.get_or_insert_with(ScriptBlock::default),
            BlockId::Reading => &mut self.reading,
            BlockId::Reflection => self.reflection.get_or_insert_with(ScriptBlock::default),
            BlockId::Application => self.application.get_or_insert_with(ScriptBlock::default),
            BlockId::Prayer => self.prayer.get_or_insert_with(ScriptBlock::default),
        }
    }

    pub fn set_block(&mut self, id: BlockId, block: ScriptBlock) {
        *self.block_mut(id) = block;
    }

    /// Present blocks in fixed order.
    pub fn blocks(&self) -> impl Iterator<Item = NarrativeBlock<'_>> + '_ {
        BlockId::ORDER.into_iter().filter_map(move |id| {
            self.block(id).map(|b| NarrativeBlock {
                id,
                text: &b.text,
                image_prompt: &b.image_prompt,
            })
        })
    }

    /// Text of a block, empty when the block is absent.
    pub fn text_of(&self, id: BlockId) -> &str {
        self.block(id).map(|b| b.text.as_str()).unwrap_or("")
    }

    /// Number of blocks that have speakable text.
    pub fn speakable_blocks(&self) -> usize {
        self.blocks().filter(|b| !b.text.trim().is_empty()).count()
    }
}

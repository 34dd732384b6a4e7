//! Visual style, voice, aspect ratio and reading category definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Art style applied to generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisualStyle {
    #[default]
    Cinematic,
    OilPainting,
    Watercolor,
    Anime,
    DigitalArt,
}

impl VisualStyle {
    pub const ALL: &'static [VisualStyle] = &[
        VisualStyle::Cinematic,
        VisualStyle::OilPainting,
        VisualStyle::Watercolor,
        VisualStyle::Anime,
        VisualStyle::DigitalArt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualStyle::Cinematic => "cinematic",
            VisualStyle::OilPainting => "oil_painting",
            VisualStyle::Watercolor => "watercolor",
            VisualStyle::Anime => "anime",
            VisualStyle::DigitalArt => "digital_art",
        }
    }

    /// Label used inside image and script prompts.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            VisualStyle::Cinematic => "Cinematic Realistic",
            VisualStyle::OilPainting => "Oil Painting",
            VisualStyle::Watercolor => "Watercolor",
            VisualStyle::Anime => "Anime Style",
            VisualStyle::DigitalArt => "Digital Art",
        }
    }
}

impl fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VisualStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cinematic" => Ok(VisualStyle::Cinematic),
            "oil_painting" => Ok(VisualStyle::OilPainting),
            "watercolor" => Ok(VisualStyle::Watercolor),
            "anime" => Ok(VisualStyle::Anime),
            "digital_art" => Ok(VisualStyle::DigitalArt),
            _ => Err(StyleParseError::VisualStyle(s.to_string())),
        }
    }
}

/// Prebuilt narration voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum VoiceOption {
    Kore,
    #[default]
    Alnilam,
    Puck,
    Charon,
    Fenrir,
}

impl VoiceOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceOption::Kore => "Kore",
            VoiceOption::Alnilam => "Alnilam",
            VoiceOption::Puck => "Puck",
            VoiceOption::Charon => "Charon",
            VoiceOption::Fenrir => "Fenrir",
        }
    }
}

impl fmt::Display for VoiceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VoiceOption {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kore" => Ok(VoiceOption::Kore),
            "alnilam" => Ok(VoiceOption::Alnilam),
            "puck" => Ok(VoiceOption::Puck),
            "charon" => Ok(VoiceOption::Charon),
            "fenrir" => Ok(VoiceOption::Fenrir),
            _ => Err(StyleParseError::Voice(s.to_string())),
        }
    }
}

/// Opening style requested from the script writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntroStyle {
    /// High energy hook with a curiosity loop
    #[default]
    Viral,
    /// Solemn, traditional opening
    Liturgical,
}

impl IntroStyle {
    pub fn prompt_hint(&self) -> &'static str {
        match self {
            IntroStyle::Viral => "High energy, curiosity loop, viral hook.",
            IntroStyle::Liturgical => "Solemn, respectful, traditional liturgical start.",
        }
    }
}

impl FromStr for IntroStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viral" => Ok(IntroStyle::Viral),
            "liturgical" => Ok(IntroStyle::Liturgical),
            _ => Err(StyleParseError::IntroStyle(s.to_string())),
        }
    }
}

/// Which reading of the day the script is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadingCategory {
    #[default]
    Gospel,
    FirstReading,
    SecondReading,
    Psalm,
}

impl ReadingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingCategory::Gospel => "gospel",
            ReadingCategory::FirstReading => "first_reading",
            ReadingCategory::SecondReading => "second_reading",
            ReadingCategory::Psalm => "psalm",
        }
    }
}

impl fmt::Display for ReadingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReadingCategory {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gospel" => Ok(ReadingCategory::Gospel),
            "first_reading" => Ok(ReadingCategory::FirstReading),
            "second_reading" => Ok(ReadingCategory::SecondReading),
            "psalm" => Ok(ReadingCategory::Psalm),
            _ => Err(StyleParseError::Category(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum StyleParseError {
    #[error("Unknown visual style: {0}")]
    VisualStyle(String),
    #[error("Unknown voice: {0}")]
    Voice(String),
    #[error("Unknown intro style: {0}")]
    IntroStyle(String),
    #[error("Unknown reading category: {0}")]
    Category(String),
}

/// Aspect ratio specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Vertical (9:16) for Reels/Stories
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Horizontal (16:9)
    pub const LANDSCAPE: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    /// Square (1:1)
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pick the image ratio for a video resolution label such as
    /// `"9:16 (Vertical/Stories)"`. Anything else falls back to square.
    pub fn for_resolution_label(label: &str) -> Self {
        if label.contains("9:16") {
            Self::PORTRAIT
        } else if label.contains("16:9") {
            Self::LANDSCAPE
        } else {
            Self::SQUARE
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 2 {
            return Err(AspectRatioParseError::InvalidFormat(s.to_string()));
        }

        let width = parts[0]
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[0].to_string()))?;
        let height = parts[1]
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[1].to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(AspectRatio { width, height })
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

#[derive(Debug, Error)]
pub enum AspectRatioParseError {
    #[error("Invalid aspect ratio format: {0}, expected 'W:H'")]
    InvalidFormat(String),
    #[error("Invalid number in aspect ratio: {0}")]
    InvalidNumber(String),
    #[error("Aspect ratio cannot have zero values")]
    ZeroValue,
}

/// Style, voice and framing used for one media generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct MediaSettings {
    pub visual_style: VisualStyle,
    pub voice: VoiceOption,
    pub aspect_ratio: AspectRatio,
}

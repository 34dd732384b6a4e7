//! Worker configuration.

use devo_models::{
    AspectRatio, IntroStyle, MediaSettings, ReadingCategory, VisualStyle, VoiceOption,
    DEFAULT_ACTIVITY_CAPACITY,
};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Entries kept in the session activity log
    pub activity_log_capacity: usize,
    /// Style, voice and framing for media generation
    pub media: MediaSettings,
    /// Opening style requested from the script writer
    pub intro_style: IntroStyle,
    /// Which reading of the day to build the reel from
    pub category: ReadingCategory,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            activity_log_capacity: DEFAULT_ACTIVITY_CAPACITY,
            media: MediaSettings {
                visual_style: VisualStyle::Cinematic,
                voice: VoiceOption::Alnilam,
                aspect_ratio: AspectRatio::PORTRAIT,
            },
            intro_style: IntroStyle::Viral,
            category: ReadingCategory::Gospel,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            activity_log_capacity: std::env::var("ACTIVITY_LOG_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.activity_log_capacity),
            media: MediaSettings {
                visual_style: std::env::var("DEVO_VISUAL_STYLE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.media.visual_style),
                voice: std::env::var("DEVO_VOICE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.media.voice),
                aspect_ratio: std::env::var("DEVO_ASPECT_RATIO")
                    .ok()
                    .map(|s| {
                        s.parse()
                            .unwrap_or_else(|_| AspectRatio::for_resolution_label(&s))
                    })
                    .unwrap_or(defaults.media.aspect_ratio),
            },
            intro_style: std::env::var("DEVO_INTRO_STYLE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.intro_style),
            category: std::env::var("DEVO_CATEGORY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.category),
        }
    }
}

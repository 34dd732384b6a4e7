//! Audio duration probing for synthesized speech.
//!
//! Speech clips arrive as raw little-endian 16-bit PCM, mono, at
//! [`SPEECH_SAMPLE_RATE`]. Clips carrying a RIFF header are read as WAV with
//! their own sample rate instead.

use std::io::Cursor;

use devo_models::ActivityLog;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Sample rate of raw speech clips from the speech backend.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Duration assumed for a clip that cannot be measured.
pub const FALLBACK_DURATION_MS: u64 = 5_000;

const PCM_BYTES_PER_FRAME: usize = 2;

/// Playable duration of a speech clip in milliseconds.
///
/// Never fails: an undecodable clip or a non-finite result yields
/// [`FALLBACK_DURATION_MS`] and a warning in the activity log.
pub fn probe_duration_ms(clip: &[u8], log: &ActivityLog) -> u64 {
    match measure(clip) {
        Ok(ms) => {
            debug!(bytes = clip.len(), duration_ms = ms, "Probed audio duration");
            ms
        }
        Err(e) => {
            log.warn(format!(
                "Could not measure audio duration ({}), defaulting to {} ms",
                e, FALLBACK_DURATION_MS
            ));
            FALLBACK_DURATION_MS
        }
    }
}

fn measure(clip: &[u8]) -> MediaResult<u64> {
    if clip.is_empty() {
        return Err(MediaError::EmptyAudio);
    }

    let (frames, sample_rate) = if clip.starts_with(b"RIFF") {
        wav_frames(clip)?
    } else {
        pcm_frames(clip)?
    };

    duration_ms(frames, sample_rate)
}

fn pcm_frames(clip: &[u8]) -> MediaResult<(u64, u32)> {
    if clip.len() % PCM_BYTES_PER_FRAME != 0 {
        return Err(MediaError::TruncatedPcm(clip.len()));
    }
    Ok(((clip.len() / PCM_BYTES_PER_FRAME) as u64, SPEECH_SAMPLE_RATE))
}

// The reader is dropped on every return path, releasing the decode state.
fn wav_frames(clip: &[u8]) -> MediaResult<(u64, u32)> {
    let reader = hound::WavReader::new(Cursor::new(clip))?;
    let frames = reader.duration() as u64;
    Ok((frames, reader.spec().sample_rate))
}

fn duration_ms(frames: u64, sample_rate: u32) -> MediaResult<u64> {
    if sample_rate == 0 {
        return Err(MediaError::InvalidSampleRate(sample_rate));
    }
    let ms = frames as f64 / sample_rate as f64 * 1000.0;
    if !ms.is_finite() || ms > u64::MAX as f64 {
        return Err(MediaError::NonFiniteDuration(ms));
    }
    Ok(ms.floor() as u64)
}

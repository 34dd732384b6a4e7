//! Subtitle timeline built from measured speech durations.

use std::fmt::Write as _;

use devo_models::{ActivityLog, AssetCache, BlockId, Script};
use serde::Serialize;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::probe::probe_duration_ms;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// One subtitle entry covering `[start_ms, end_ms)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cue {
    /// 1-based position in the track
    pub index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl Cue {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Ordered, contiguous subtitle cues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubtitleTrack {
    cues: Vec<Cue>,
}

impl SubtitleTrack {
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// End of the last cue, 0 for an empty track.
    pub fn total_duration_ms(&self) -> u64 {
        self.cues.last().map(|c| c.end_ms).unwrap_or(0)
    }

    /// Render as an SRT document.
    pub fn render(&self) -> String {
        let mut doc = String::new();
        for cue in &self.cues {
            let _ = write!(
                doc,
                "{}\n{} --> {}\n{}\n\n",
                cue.index,
                format_srt_timestamp(cue.start_ms),
                format_srt_timestamp(cue.end_ms),
                cue.text
            );
        }
        doc
    }

    /// Parse an SRT document produced by [`SubtitleTrack::render`].
    pub fn parse(doc: &str) -> MediaResult<Self> {
        let mut cues = Vec::new();
        let mut lines = doc.lines().map(|l| l.trim_end_matches('\r')).peekable();

        loop {
            while lines.peek().is_some_and(|l| l.trim().is_empty()) {
                lines.next();
            }
            let Some(index_line) = lines.next() else {
                break;
            };

            let index: u32 = index_line
                .trim()
                .parse()
                .map_err(|_| MediaError::malformed(format!("bad cue index '{}'", index_line)))?;

            let timing = lines
                .next()
                .ok_or_else(|| MediaError::malformed(format!("cue {} has no timing line", index)))?;
            let (start, end) = timing
                .split_once(" --> ")
                .ok_or_else(|| MediaError::malformed(format!("bad timing line '{}'", timing)))?;

            let mut text_lines = Vec::new();
            while let Some(line) = lines.next() {
                if line.is_empty() {
                    break;
                }
                text_lines.push(line);
            }

            cues.push(Cue {
                index,
                start_ms: parse_srt_timestamp(start)?,
                end_ms: parse_srt_timestamp(end)?,
                text: text_lines.join(" "),
            });
        }

        Ok(Self { cues })
    }

    /// Check that indices run from 1, that no cue ends before it starts, and
    /// that each cue starts exactly where the previous one ended.
    pub fn validate(&self) -> MediaResult<()> {
        let mut expected_start = 0u64;
        for (i, cue) in self.cues.iter().enumerate() {
            if cue.index as usize != i + 1 {
                return Err(MediaError::malformed(format!(
                    "cue at position {} has index {}",
                    i + 1,
                    cue.index
                )));
            }
            if cue.end_ms < cue.start_ms {
                return Err(MediaError::malformed(format!(
                    "cue {} ends before it starts",
                    cue.index
                )));
            }
            if cue.start_ms != expected_start {
                return Err(MediaError::malformed(format!(
                    "cue {} starts at {} ms, expected {} ms",
                    cue.index, cue.start_ms, expected_start
                )));
            }
            expected_start = cue.end_ms;
        }
        Ok(())
    }
}

/// Build the subtitle track for the current script and cached audio.
///
/// Blocks are walked in fixed order. A block without cached audio is skipped
/// without advancing the cursor; every other block gets one cue spanning its
/// measured audio duration.
pub fn build_subtitles(script: &Script, cache: &AssetCache, log: &ActivityLog) -> SubtitleTrack {
    let mut cues = Vec::new();
    let mut cursor = 0u64;

    log.info("Starting subtitle generation");

    for block in BlockId::ORDER {
        let Some(audio) = cache.audio(block) else {
            log.warn(format!("No audio for block {}, skipping its subtitle", block));
            continue;
        };

        let duration = probe_duration_ms(audio, log);
        let start = cursor;
        let end = cursor + duration;

        cues.push(Cue {
            index: cues.len() as u32 + 1,
            start_ms: start,
            end_ms: end,
            text: clean_cue_text(script.text_of(block)),
        });
        cursor = end;

        debug!(block_id = %block, start_ms = start, end_ms = end, "Subtitle cue built");
        log.info(format!(
            "Subtitle cue for {}: {} --> {}",
            block,
            format_srt_timestamp(start),
            format_srt_timestamp(end)
        ));
    }

    log.info(format!("Subtitle generation complete ({} cues)", cues.len()));
    SubtitleTrack { cues }
}

/// Collapse each run of line breaks into one space and trim.
fn clean_cue_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out.trim().to_string()
}

/// Format milliseconds as `HH:MM:SS,mmm`, wrapping hours at 24.
pub fn format_srt_timestamp(ms: u64) -> String {
    let ms = ms % MS_PER_DAY;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        ms / MS_PER_HOUR,
        (ms % MS_PER_HOUR) / MS_PER_MINUTE,
        (ms % MS_PER_MINUTE) / MS_PER_SECOND,
        ms % MS_PER_SECOND
    )
}

/// Parse an `HH:MM:SS,mmm` timestamp to milliseconds.
pub fn parse_srt_timestamp(ts: &str) -> MediaResult<u64> {
    let ts = ts.trim();
    let invalid = || MediaError::InvalidTimestamp(ts.to_string());

    let (clock, millis) = ts.split_once(',').ok_or_else(invalid)?;
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 || millis.len() != 3 {
        return Err(invalid());
    }

    let field = |s: &str| -> MediaResult<u64> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        s.parse().map_err(|_| invalid())
    };

    let hours = field(parts[0])?;
    let minutes = field(parts[1])?;
    let seconds = field(parts[2])?;
    let millis = field(millis)?;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    Ok(hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis)
}

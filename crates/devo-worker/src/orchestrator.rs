//! Asset orchestration.
//!
//! Builds the ordered list of synthesis units for a script and executes it
//! strictly one unit at a time, keeping the asset cache, block statuses and
//! progress published as it goes.

use std::time::{Duration, Instant};

use devo_genai::{GenAiError, GenAiResult, ImageSynthesizer, SpeechSynthesizer};
use devo_models::{
    preview, ActivityLog, BlockId, BlockStatus, MediaKind, MediaSettings, ProgressSnapshot, Script,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::CycleLogger;
use crate::metrics::{self, SynthesisOutcome};
use crate::observer::SessionPublisher;

const PREVIEW_CHARS: usize = 50;

/// One synthesis call: a block and the kind of media to produce for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SynthesisUnit {
    pub block: BlockId,
    pub kind: MediaKind,
}

/// Units for every block with non-empty text, in block order, audio before
/// image. `scope` restricts the plan to a single block.
pub fn plan_units(script: &Script, scope: Option<BlockId>) -> Vec<SynthesisUnit> {
    BlockId::ORDER
        .into_iter()
        .filter(|id| scope.map_or(true, |only| only == *id))
        .filter(|id| script.block(*id).is_some_and(|b| b.has_text()))
        .flat_map(|block| {
            [MediaKind::Audio, MediaKind::Image].map(|kind| SynthesisUnit { block, kind })
        })
        .collect()
}

/// A unit that failed without stopping the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    pub block_id: BlockId,
    pub kind: MediaKind,
    pub message: String,
}

/// Outcome of a completed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaReport {
    pub total: u32,
    pub generated: u32,
    pub cached: u32,
    pub failures: Vec<AssetFailure>,
}

impl MediaReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn done(&self) -> u32 {
        self.generated + self.cached + self.failures.len() as u32
    }

    pub fn failed_blocks(&self) -> Vec<BlockId> {
        let mut blocks: Vec<_> = self.failures.iter().map(|f| f.block_id).collect();
        blocks.dedup();
        blocks
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} units: {} generated, {} cached, {} failed",
            self.done(),
            self.total,
            self.generated,
            self.cached,
            self.failures.len()
        )
    }
}

/// Runs synthesis units against the speech and image backends.
pub struct AssetOrchestrator<'a> {
    speech: &'a dyn SpeechSynthesizer,
    images: &'a dyn ImageSynthesizer,
    settings: MediaSettings,
    publisher: &'a SessionPublisher,
    log: &'a ActivityLog,
    logger: &'a CycleLogger,
}

impl<'a> AssetOrchestrator<'a> {
    pub fn new(
        speech: &'a dyn SpeechSynthesizer,
        images: &'a dyn ImageSynthesizer,
        settings: MediaSettings,
        publisher: &'a SessionPublisher,
        log: &'a ActivityLog,
        logger: &'a CycleLogger,
    ) -> Self {
        Self {
            speech,
            images,
            settings,
            publisher,
            log,
            logger,
        }
    }

    /// Execute `units` in order.
    ///
    /// Cached units are skipped and count as done. A quota error stops the
    /// batch immediately and is returned; any other failure is recorded in
    /// the report and the batch continues.
    pub async fn run(&self, script: &Script, units: &[SynthesisUnit]) -> WorkerResult<MediaReport> {
        let total = units.len() as u32;
        let started = Instant::now();
        let mut report = MediaReport {
            total,
            ..Default::default()
        };
        let mut done = 0u32;

        for unit in units {
            self.publisher.set_status(unit.block, BlockStatus::Pending);
        }
        self.publisher
            .publish_progress(Some(ProgressSnapshot::compute(0, total, Duration::ZERO)));
        self.log
            .info(format!("Starting media generation ({} units)", total));

        for (i, unit) in units.iter().enumerate() {
            let last_of_block = units.get(i + 1).map_or(true, |next| next.block != unit.block);

            if self.publisher.cache().contains(unit.block, unit.kind) {
                self.log
                    .info(format!("Using cached {} for {}", unit.kind, unit.block));
                metrics::record_cache_hit(unit.kind.as_str());
                report.cached += 1;
            } else {
                match self.synthesize(script, *unit).await {
                    Ok(bytes) => {
                        let next = self.publisher.cache().with_entry(unit.block, unit.kind, bytes);
                        self.publisher.publish_cache(next);
                        report.generated += 1;
                    }
                    Err(e) if e.is_quota_exceeded() => {
                        self.publisher.set_status(unit.block, BlockStatus::Error);
                        self.log.error(format!(
                            "Quota exceeded while generating {} for {}, stopping media generation",
                            unit.kind, unit.block
                        ));
                        return Err(WorkerError::QuotaExceeded {
                            block: unit.block,
                            kind: unit.kind,
                            message: e.to_string(),
                        });
                    }
                    Err(e) => {
                        self.log.error(format!(
                            "Failed to generate {} for {}: {}",
                            unit.kind, unit.block, e
                        ));
                        report.failures.push(AssetFailure {
                            block_id: unit.block,
                            kind: unit.kind,
                            message: e.to_string(),
                        });
                    }
                }
            }

            done += 1;
            let progress = ProgressSnapshot::compute(done, total, started.elapsed());
            self.logger.log_progress(*unit, &progress);
            self.publisher.publish_progress(Some(progress));

            if last_of_block {
                let failed = report.failures.iter().any(|f| f.block_id == unit.block);
                let status = if failed {
                    BlockStatus::Error
                } else {
                    BlockStatus::Done
                };
                self.publisher.set_status(unit.block, status);
            }
        }

        self.log
            .info(format!("Media generation finished: {}", report.summary()));
        Ok(report)
    }

    async fn synthesize(&self, script: &Script, unit: SynthesisUnit) -> GenAiResult<Vec<u8>> {
        let (text, prompt) = script
            .block(unit.block)
            .map(|b| (b.text.as_str(), b.image_prompt.as_str()))
            .unwrap_or_default();

        let started = Instant::now();
        let result = match unit.kind {
            MediaKind::Audio => {
                self.publisher
                    .set_status(unit.block, BlockStatus::GeneratingAudio);
                debug!(block_id = %unit.block, text = %preview(text, PREVIEW_CHARS), "Synthesizing speech");
                self.speech
                    .synthesize_speech(text, self.settings.voice)
                    .await
            }
            MediaKind::Image => {
                self.publisher
                    .set_status(unit.block, BlockStatus::GeneratingImage);
                debug!(block_id = %unit.block, prompt = %preview(prompt, PREVIEW_CHARS), "Synthesizing image");
                self.images
                    .synthesize_image(prompt, self.settings.visual_style, self.settings.aspect_ratio)
                    .await
            }
        };

        let result = match result {
            Ok(bytes) if bytes.is_empty() => Err(GenAiError::NoData(unit.kind.as_str())),
            other => other,
        };

        let outcome = match &result {
            Ok(_) => SynthesisOutcome::Success,
            Err(e) if e.is_quota_exceeded() => SynthesisOutcome::Quota,
            Err(_) => SynthesisOutcome::Failure,
        };
        metrics::record_synthesis(unit.kind.as_str(), outcome, started.elapsed().as_secs_f64());

        if let Err(e) = &result {
            let input = match unit.kind {
                MediaKind::Audio => text,
                MediaKind::Image => prompt,
            };
            warn!(
                block_id = %unit.block,
                kind = %unit.kind,
                class = outcome.as_str(),
                input = %preview(input, PREVIEW_CHARS),
                error = %e,
                "Synthesis failed"
            );
        }

        result
    }
}

//! Production session: the processing state machine and its operations.
//!
//! A [`Session`] owns the script, the asset cache and the activity log for
//! one user and drives the cycle fetch → script → media → upload. All
//! mutation happens through `&mut self`; observers follow along through a
//! [`SessionObserver`]. [`SessionHandle`] shares a session between tasks and
//! rejects a second operation while one is running instead of queueing it.

use std::sync::Arc;

use chrono::NaiveDate;
use devo_genai::{ImageSynthesizer, ScriptWriter, SpeechSynthesizer};
use devo_models::{
    ActivityLog, AssetCache, BlockId, BlockStatus, IntroStyle, JobId, JobMetadata, JobPayload,
    JobSummary, ProcessingState, ReadingCategory, Script, ScriptBlock, VisualStyle,
};
use devo_source::{format_liturgical_reading, SourceText, SourceTextProvider};
use devo_storage::JobTransport;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, Instrument};

use crate::assembler::assemble_payload;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::CycleLogger;
use crate::metrics;
use crate::observer::{SessionObserver, SessionPublisher};
use crate::orchestrator::{plan_units, AssetOrchestrator, MediaReport};

/// External collaborators of a session.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn SourceTextProvider>,
    pub writer: Arc<dyn ScriptWriter>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub images: Arc<dyn ImageSynthesizer>,
    pub transport: Arc<dyn JobTransport>,
}

pub struct Session {
    services: Services,
    config: WorkerConfig,
    log: ActivityLog,
    publisher: SessionPublisher,
    state: ProcessingState,
    quota_exceeded: bool,
    date: Option<NaiveDate>,
    source: Option<SourceText>,
    script: Option<Script>,
    metadata: Option<JobMetadata>,
    job_id: Option<JobId>,
    last_report: Option<MediaReport>,
}

impl Session {
    pub fn new(services: Services, config: WorkerConfig) -> Self {
        Self {
            services,
            log: ActivityLog::new(config.activity_log_capacity),
            config,
            publisher: SessionPublisher::new(),
            state: ProcessingState::Idle,
            quota_exceeded: false,
            date: None,
            source: None,
            script: None,
            metadata: None,
            job_id: None,
            last_report: None,
        }
    }

    pub fn observer(&self) -> SessionObserver {
        self.publisher.subscribe()
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    /// Set by a quota abort, cleared by acknowledgment.
    pub fn quota_exceeded(&self) -> bool {
        self.quota_exceeded
    }

    pub fn source(&self) -> Option<&SourceText> {
        self.source.as_ref()
    }

    pub fn script(&self) -> Option<&Script> {
        self.script.as_ref()
    }

    pub fn metadata(&self) -> Option<&JobMetadata> {
        self.metadata.as_ref()
    }

    /// Id of the stored job the next upload replaces.
    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn last_report(&self) -> Option<&MediaReport> {
        self.last_report.as_ref()
    }

    pub fn cache(&self) -> Arc<AssetCache> {
        self.publisher.cache()
    }

    // =========================================================================
    // State machine
    // =========================================================================

    fn transition(&mut self, next: ProcessingState) -> WorkerResult<()> {
        let from = self.state;
        self.state = from.transition(next)?;
        self.publisher.publish_state(self.state);
        debug!(from = %from, to = %next, "Processing state changed");
        Ok(())
    }

    fn ensure_not_busy(&self) -> WorkerResult<()> {
        if self.state.is_busy() {
            return Err(WorkerError::Busy(self.state));
        }
        Ok(())
    }

    /// Enter a phase, acknowledging a finished cycle first.
    fn begin_phase(&mut self, phase: ProcessingState) -> WorkerResult<()> {
        self.ensure_not_busy()?;
        if self.state.is_terminal() {
            self.acknowledge()?;
        }
        self.transition(phase)
    }

    /// Record a hard failure and move to `Error`.
    fn fail(&mut self, err: WorkerError, logger: &CycleLogger) -> WorkerError {
        if err.is_quota_exceeded() {
            self.quota_exceeded = true;
        }
        logger.log_error(&err.to_string());
        self.log.error(err.to_string());
        if let Some(hint) = err.remediation() {
            self.log.warn(hint);
        }
        if self.state.can_transition_to(ProcessingState::Error) {
            self.state = ProcessingState::Error;
            self.publisher.publish_state(self.state);
        }
        err
    }

    /// Return from `Complete` or `Error` to `Idle` and clear the quota flag.
    /// A no-op when already idle.
    pub fn acknowledge(&mut self) -> WorkerResult<()> {
        self.ensure_not_busy()?;
        if self.state.is_terminal() {
            self.transition(ProcessingState::Idle)?;
            self.quota_exceeded = false;
            self.log.info("Acknowledged, ready for the next operation");
        }
        Ok(())
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Fetch the reading for `date`. Starts a new cycle: any previous
    /// script, media and job id are dropped.
    pub async fn fetch_source(
        &mut self,
        date: NaiveDate,
        category: ReadingCategory,
    ) -> WorkerResult<SourceText> {
        let logger = CycleLogger::new("fetch_source");
        let span = logger.create_span();
        self.fetch_source_inner(date, category, &logger)
            .instrument(span)
            .await
    }

    async fn fetch_source_inner(
        &mut self,
        date: NaiveDate,
        category: ReadingCategory,
        logger: &CycleLogger,
    ) -> WorkerResult<SourceText> {
        self.begin_phase(ProcessingState::FetchingSource)?;
        logger.log_start(&format!("{} reading for {}", category, date));
        self.log
            .info(format!("Fetching {} reading for {}", category, date));

        let fetched = self.services.source.fetch(date, category).await;
        let text = match fetched {
            Ok(text) => text,
            Err(e) => return Err(self.fail(e.into(), logger)),
        };

        self.log.info(format!(
            "Reading fetched: {} ({})",
            text.reference, text.liturgical_title
        ));
        self.date = Some(date);
        self.source = Some(text.clone());
        self.reset_cycle();

        self.transition(ProcessingState::Idle)?;
        logger.log_completion(&text.reference);
        Ok(text)
    }

    /// Write the narrative script for the fetched reading. The reading block
    /// text is the formatted proclamation of the source text.
    pub async fn generate_script(
        &mut self,
        intro_style: IntroStyle,
        visual_style: VisualStyle,
    ) -> WorkerResult<Script> {
        let logger = CycleLogger::new("generate_script");
        let span = logger.create_span();
        self.generate_script_inner(intro_style, visual_style, &logger)
            .instrument(span)
            .await
    }

    async fn generate_script_inner(
        &mut self,
        intro_style: IntroStyle,
        visual_style: VisualStyle,
        logger: &CycleLogger,
    ) -> WorkerResult<Script> {
        self.ensure_not_busy()?;
        let source = self.source.clone().ok_or(WorkerError::MissingSource)?;
        self.begin_phase(ProcessingState::GeneratingScript)?;
        logger.log_start(&source.reference);
        self.log
            .info(format!("Generating script for {}", source.reference));

        let written = self
            .services
            .writer
            .write_script(&source.reference, &source.text, visual_style, intro_style)
            .await;
        let generated = match written {
            Ok(generated) => generated,
            Err(e) => return Err(self.fail(WorkerError::script_generation(e.to_string()), logger)),
        };

        let reading_text = format_liturgical_reading(&source.text, &source.reference);
        let script = generated.into_script(reading_text);
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        if !self.publisher.cache().is_empty() {
            self.log.info("Discarding media generated for the previous script");
            self.publisher.publish_cache(AssetCache::new());
        }
        self.publisher.reset_statuses();
        self.config.media.visual_style = visual_style;
        self.metadata = Some(JobMetadata::new(date, &source.reference));
        self.script = Some(script.clone());

        self.transition(ProcessingState::Idle)?;
        self.log.info(format!(
            "Script ready ({} blocks with text)",
            script.speakable_blocks()
        ));
        logger.log_completion(&source.reference);
        Ok(script)
    }

    /// Generate every missing asset, assemble the payload and upload it.
    ///
    /// Returns the stored job id, which later uploads replace.
    pub async fn generate_media(&mut self) -> WorkerResult<JobId> {
        let logger = CycleLogger::new("generate_media");
        let span = logger.create_span();
        self.run_media(None, &logger).instrument(span).await
    }

    /// Drop one block's media, regenerate only that block and upload the
    /// updated payload.
    pub async fn regenerate_block(&mut self, block: BlockId) -> WorkerResult<JobId> {
        let logger = CycleLogger::new("regenerate_block");
        let span = logger.create_span();
        self.run_media(Some(block), &logger).instrument(span).await
    }

    async fn run_media(
        &mut self,
        scope: Option<BlockId>,
        logger: &CycleLogger,
    ) -> WorkerResult<JobId> {
        self.ensure_not_busy()?;
        let script = self.script.clone().ok_or(WorkerError::MissingScript)?;
        self.begin_phase(ProcessingState::GeneratingMedia)?;

        match scope {
            Some(block) => logger.log_start(&format!("regenerate {}", block)),
            None => logger.log_start("all blocks"),
        }

        // Media released after an upload comes back from the stored job, so
        // cached units are not synthesized again and a replacement payload
        // stays complete.
        if self.publisher.cache().is_empty() {
            if let Some(id) = self.job_id.clone() {
                if let Err(e) = self.restore_cache(&id).await {
                    return Err(self.fail(e, logger));
                }
            }
        }

        match scope {
            Some(block) => {
                let cache = self.publisher.cache().without_block(block);
                self.publisher.publish_cache(cache);
                self.log.info(format!("Regenerating media for {}", block));
            }
            None => self.publisher.reset_statuses(),
        }

        let units = plan_units(&script, scope);
        let outcome = {
            let orchestrator = AssetOrchestrator::new(
                self.services.speech.as_ref(),
                self.services.images.as_ref(),
                self.config.media,
                &self.publisher,
                &self.log,
                logger,
            );
            orchestrator.run(&script, &units).await
        };
        let report = match outcome {
            Ok(report) => report,
            Err(e) => return Err(self.fail(e, logger)),
        };

        if !report.is_clean() {
            self.log.warn(format!(
                "Some media failed and will be missing from the job: {}",
                report.summary()
            ));
            logger.log_warning(&report.summary());
        }
        self.last_report = Some(report);

        let metadata = self.metadata.clone().unwrap_or_default();
        let assembled = assemble_payload(
            &script,
            &self.publisher.cache(),
            &metadata,
            self.job_id.as_ref(),
            &self.log,
        );
        let payload = match assembled {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e, logger)),
        };

        self.transition(ProcessingState::Uploading)?;
        self.upload(payload, logger).await
    }

    async fn upload(&mut self, payload: JobPayload, logger: &CycleLogger) -> WorkerResult<JobId> {
        let replace = payload.is_replacement();
        self.log.info(if replace {
            "Uploading job (replacing the stored one)"
        } else {
            "Uploading job"
        });

        let uploaded = self.services.transport.upload(&payload).await;
        metrics::record_upload(replace, uploaded.is_ok());

        let job_id = match uploaded {
            Ok(id) => id,
            Err(e) => return Err(self.fail(e.into(), logger)),
        };

        self.job_id = Some(job_id.clone());
        self.release_media();
        self.transition(ProcessingState::Complete)?;

        self.log.info(format!("Job uploaded: {}", job_id));
        logger.log_completion(job_id.as_str());
        Ok(job_id)
    }

    /// Run a whole cycle for `date` with the configured category and styles.
    pub async fn produce(&mut self, date: NaiveDate) -> WorkerResult<JobId> {
        let category = self.config.category;
        let intro_style = self.config.intro_style;
        let visual_style = self.config.media.visual_style;

        self.fetch_source(date, category).await?;
        self.generate_script(intro_style, visual_style).await?;
        self.generate_media().await
    }

    /// Drop all cached media.
    pub fn clear_cache(&mut self) -> WorkerResult<()> {
        self.ensure_not_busy()?;
        self.publisher.publish_cache(AssetCache::new());
        self.publisher.reset_statuses();
        self.log.info("Media cache cleared");
        Ok(())
    }

    /// Replace one block's text and prompt.
    ///
    /// Cached media for the block is kept even when the content changed; use
    /// [`Session::regenerate_block`] to refresh it.
    pub fn edit_block(&mut self, block: BlockId, content: ScriptBlock) -> WorkerResult<()> {
        self.ensure_not_busy()?;
        let script = self.script.as_mut().ok_or(WorkerError::MissingScript)?;

        let changed = script.block(block) != Some(&content);
        let cache = self.publisher.cache();
        let has_media = cache.audio(block).is_some() || cache.image(block).is_some();
        script.set_block(block, content);

        if changed && has_media {
            self.log.warn(format!(
                "{} was edited after its media was generated; cached media is kept until the block is regenerated",
                block
            ));
        }
        Ok(())
    }

    /// Stored jobs, as reported by the transport.
    pub async fn list_jobs(&mut self) -> WorkerResult<Vec<JobSummary>> {
        self.ensure_not_busy()?;
        let listed = self.services.transport.list().await;
        match listed {
            Ok(jobs) => {
                self.log.info(format!("Found {} stored jobs", jobs.len()));
                Ok(jobs)
            }
            Err(e) => {
                self.log.error(format!("Could not list jobs: {}", e));
                Err(e.into())
            }
        }
    }

    /// Continue a stored job: restore its script, metadata and media.
    ///
    /// The stored subtitle track is discarded; it is rebuilt on upload. The
    /// next upload replaces the stored job.
    pub async fn resume_job(&mut self, id: &JobId) -> WorkerResult<()> {
        self.ensure_not_busy()?;
        let fetched = self.services.transport.fetch(id).await;
        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) => {
                self.log
                    .error(format!("Could not load job {}: {}", id, e));
                return Err(e.into());
            }
        };

        let cache = cache_from_payload(&payload, &self.log);
        self.publisher.reset_statuses();
        for block in BlockId::ORDER {
            if cache.is_complete(block) {
                self.publisher.set_status(block, BlockStatus::Done);
            }
        }

        self.log.info(format!(
            "Resumed job {} ({}, {} cached assets)",
            id,
            payload.metadata.reference,
            cache.len()
        ));
        self.date = NaiveDate::parse_from_str(&payload.metadata.date, "%Y-%m-%d").ok();
        self.script = Some(payload.script);
        self.metadata = Some(payload.metadata);
        self.job_id = Some(id.clone());
        self.last_report = None;
        self.publisher.publish_cache(cache);
        Ok(())
    }

    /// Drop the source, script, media and job id and return to `Idle`.
    ///
    /// An operation future dropped mid-flight leaves the session in its busy
    /// state; abandoning is the way out of that.
    pub fn abandon(&mut self) {
        self.source = None;
        self.date = None;
        self.quota_exceeded = false;
        self.reset_cycle();
        if self.state != ProcessingState::Idle {
            debug!(from = %self.state, "Abandoning session");
            self.state = ProcessingState::Idle;
            self.publisher.publish_state(self.state);
        }
        self.log.info("Session abandoned");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn reset_cycle(&mut self) {
        self.script = None;
        self.metadata = None;
        self.job_id = None;
        self.last_report = None;
        self.publisher.publish_cache(AssetCache::new());
        self.publisher.reset_statuses();
        self.publisher.publish_progress(None);
    }

    fn release_media(&mut self) {
        let cache = self.publisher.cache();
        if !cache.is_empty() {
            self.log.info(format!(
                "Released {} bytes of generated media",
                cache.total_bytes()
            ));
        }
        self.publisher.publish_cache(AssetCache::new());
    }

    async fn restore_cache(&mut self, id: &JobId) -> WorkerResult<()> {
        self.log
            .info(format!("Restoring released media from job {}", id));
        let payload = self.services.transport.fetch(id).await?;
        let cache = cache_from_payload(&payload, &self.log);
        self.publisher.publish_cache(cache);
        Ok(())
    }
}

/// Image and audio assets of a stored payload as a cache. Subtitles and
/// undecodable assets are skipped.
fn cache_from_payload(payload: &JobPayload, log: &ActivityLog) -> AssetCache {
    payload.assets.iter().fold(AssetCache::new(), |cache, asset| {
        let (Some(block), Some(kind)) = (asset.block(), asset.kind.media_kind()) else {
            return cache;
        };
        match asset.decode() {
            Ok(bytes) => cache.with_entry(block, kind, bytes),
            Err(e) => {
                log.warn(format!("Skipping undecodable {} for {}: {}", kind, block, e));
                cache
            }
        }
    })
}

/// Shares a session between tasks.
///
/// Only one task may operate on the session at a time; a second caller gets
/// [`WorkerError::Busy`] immediately.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
    observer: SessionObserver,
}

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        let observer = session.observer();
        Self {
            inner: Arc::new(Mutex::new(session)),
            observer,
        }
    }

    pub fn observer(&self) -> SessionObserver {
        self.observer.clone()
    }

    /// Exclusive access for one operation.
    ///
    /// While a phase runs the error carries its state; operations outside the
    /// state machine (listing, resuming) report `OperationInProgress`.
    pub fn try_acquire(&self) -> WorkerResult<OwnedMutexGuard<Session>> {
        self.inner.clone().try_lock_owned().map_err(|_| {
            let state = self.observer.state();
            if state.is_busy() {
                WorkerError::Busy(state)
            } else {
                WorkerError::OperationInProgress
            }
        })
    }
}

//! In-memory collaborators for session tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use devo_genai::{
    GenAiError, GenAiResult, GeneratedScript, ImageSynthesizer, ScriptWriter, SpeechSynthesizer,
};
use devo_models::{
    AspectRatio, IntroStyle, JobId, JobPayload, JobSummary, ReadingCategory, ScriptBlock,
    VisualStyle, VoiceOption,
};
use devo_source::{SourceError, SourceResult, SourceText, SourceTextProvider};
use devo_storage::{JobTransport, StorageError, StorageResult};
use devo_worker::{Services, Session, WorkerConfig};
use tokio::sync::Notify;

/// Every fake speech clip: 2000 ms of raw PCM at 24 kHz.
pub const CLIP_MS: u64 = 2_000;

pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G'];

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 16).unwrap()
}

pub fn clip() -> Vec<u8> {
    vec![0u8; (24 * CLIP_MS * 2) as usize]
}

pub struct FakeSource {
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceTextProvider for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self, _date: NaiveDate, _category: ReadingCategory) -> SourceResult<SourceText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::provider("both providers down"));
        }
        Ok(SourceText {
            reference: "Mt 5, 1-12".to_string(),
            text: "Naquele tempo, vendo Jesus as multidões, subiu ao monte.".to_string(),
            liturgical_title: "Segunda-feira da 3ª Semana do Advento".to_string(),
        })
    }
}

pub struct FakeWriter {
    pub fail: AtomicBool,
}

#[async_trait]
impl ScriptWriter for FakeWriter {
    async fn write_script(
        &self,
        _reference: &str,
        _text: &str,
        _visual_style: VisualStyle,
        _intro_style: IntroStyle,
    ) -> GenAiResult<GeneratedScript> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenAiError::InvalidResponse("not json".to_string()));
        }
        Ok(GeneratedScript {
            hook: ScriptBlock::new("Hook", "dawn"),
            reading_prompt: "bible".to_string(),
            reflection: ScriptBlock::new("Reflect", "river"),
            application: ScriptBlock::new("Apply", "road"),
            prayer: ScriptBlock::new("Pray", "hands"),
        })
    }
}

/// Speech and image backend with scripted faults.
///
/// Calls are numbered from 1 across both kinds.
#[derive(Default)]
pub struct FakeMedia {
    pub calls: Mutex<Vec<String>>,
    /// Quota error on this call number
    pub quota_on_call: Mutex<Option<usize>>,
    /// Quota error for images with this prompt
    pub quota_on_image: Mutex<Option<String>>,
    /// Non-quota failure for speech with this text
    pub fail_audio_for: Mutex<Option<String>>,
    /// (entered, release): the first call signals `entered` then waits
    pub gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl FakeMedia {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_faults(&self) {
        *self.quota_on_call.lock().unwrap() = None;
        *self.quota_on_image.lock().unwrap() = None;
        *self.fail_audio_for.lock().unwrap() = None;
    }

    async fn record(&self, call: String) -> usize {
        let gate = self.gate.lock().unwrap().take();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.len()
    }

    fn quota_on(&self, n: usize) -> bool {
        *self.quota_on_call.lock().unwrap() == Some(n)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeMedia {
    async fn synthesize_speech(&self, text: &str, _voice: VoiceOption) -> GenAiResult<Vec<u8>> {
        let n = self.record(format!("audio:{}", text)).await;
        if self.quota_on(n) {
            return Err(GenAiError::QuotaExceeded("RESOURCE_EXHAUSTED".to_string()));
        }
        if self.fail_audio_for.lock().unwrap().as_deref() == Some(text) {
            return Err(GenAiError::RequestFailed {
                status: 400,
                message: "bad input".to_string(),
            });
        }
        Ok(clip())
    }
}

#[async_trait]
impl ImageSynthesizer for FakeMedia {
    async fn synthesize_image(
        &self,
        prompt: &str,
        _style: VisualStyle,
        _aspect_ratio: AspectRatio,
    ) -> GenAiResult<Vec<u8>> {
        let n = self.record(format!("image:{}", prompt)).await;
        if self.quota_on(n) || self.quota_on_image.lock().unwrap().as_deref() == Some(prompt) {
            return Err(GenAiError::QuotaExceeded("RESOURCE_EXHAUSTED".to_string()));
        }
        Ok(PNG.to_vec())
    }
}

/// Job store keyed by id.
#[derive(Default)]
pub struct FakeTransport {
    pub jobs: Mutex<BTreeMap<String, JobPayload>>,
    pub uploads: Mutex<Vec<JobPayload>>,
    pub fetches: AtomicUsize,
    pub fail_upload: AtomicBool,
}

impl FakeTransport {
    pub fn uploads(&self) -> Vec<JobPayload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn last_upload(&self) -> JobPayload {
        self.uploads().pop().expect("no upload")
    }
}

#[async_trait]
impl JobTransport for FakeTransport {
    async fn upload(&self, payload: &JobPayload) -> StorageResult<JobId> {
        self.uploads.lock().unwrap().push(payload.clone());
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(StorageError::rejected("sheet is full"));
        }
        let mut jobs = self.jobs.lock().unwrap();
        let id = payload
            .job_id
            .clone()
            .unwrap_or_else(|| JobId::new(format!("job-{}", jobs.len() + 1)));
        let mut stored = payload.clone();
        stored.job_id = Some(id.clone());
        jobs.insert(id.to_string(), stored);
        Ok(id)
    }

    async fn list(&self) -> StorageResult<Vec<JobSummary>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .map(|(id, job)| JobSummary {
                id: JobId::new(id.clone()),
                display_date: Some(job.metadata.date.clone()),
                display_ref: Some(job.metadata.reference.clone()),
            })
            .collect())
    }

    async fn fetch(&self, id: &JobId) -> StorageResult<JobPayload> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.jobs
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StorageError::rejected(format!("Job not found: {}", id)))
    }
}

pub struct Harness {
    pub source: Arc<FakeSource>,
    pub writer: Arc<FakeWriter>,
    pub media: Arc<FakeMedia>,
    pub transport: Arc<FakeTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            source: Arc::new(FakeSource::new()),
            writer: Arc::new(FakeWriter {
                fail: AtomicBool::new(false),
            }),
            media: Arc::new(FakeMedia::default()),
            transport: Arc::new(FakeTransport::default()),
        }
    }

    pub fn session(&self) -> Session {
        let services = Services {
            source: self.source.clone(),
            writer: self.writer.clone(),
            speech: self.media.clone(),
            images: self.media.clone(),
            transport: self.transport.clone(),
        };
        Session::new(services, WorkerConfig::default())
    }

    /// A session with the reading fetched and the script written.
    pub async fn scripted_session(&self) -> Session {
        let mut session = self.session();
        session
            .fetch_source(date(), ReadingCategory::Gospel)
            .await
            .unwrap();
        session
            .generate_script(IntroStyle::Viral, VisualStyle::Cinematic)
            .await
            .unwrap();
        session
    }
}

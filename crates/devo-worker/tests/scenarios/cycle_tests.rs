//! Whole production cycles: timeline, soft failures, quota aborts and reruns.

use std::sync::atomic::Ordering;

use devo_media::SubtitleTrack;
use devo_models::{AssetKind, BlockId, BlockStatus, JobId, JobPayload, MediaKind, ProcessingState};
use devo_worker::WorkerError;

use super::fakes::{date, Harness, CLIP_MS};

fn cues_of(payload: &JobPayload) -> SubtitleTrack {
    let bytes = payload.subtitles().expect("subtitle asset").decode().unwrap();
    SubtitleTrack::parse(&String::from_utf8(bytes).unwrap()).unwrap()
}

#[tokio::test]
async fn test_full_cycle_uploads_contiguous_timeline() {
    let h = Harness::new();
    let mut session = h.session();
    let observer = session.observer();

    let job_id = session.produce(date()).await.unwrap();

    assert_eq!(job_id, JobId::new("job-1"));
    assert_eq!(session.state(), ProcessingState::Complete);
    assert_eq!(session.job_id(), Some(&job_id));

    let calls = h.media.calls();
    assert_eq!(calls.len(), 10);
    assert_eq!(calls[0], "audio:Hook");
    assert_eq!(calls[1], "image:dawn");
    assert!(calls[2].starts_with("audio:"));
    assert_eq!(calls[3], "image:bible");
    assert_eq!(calls[9], "image:hands");

    let payload = h.transport.last_upload();
    assert_eq!(payload.assets.len(), 11);
    assert!(payload.has_unique_assets());
    assert!(!payload.is_replacement());
    assert_eq!(payload.metadata.date, "2024-12-16");
    assert_eq!(payload.metadata.reference, "Mt 5, 1-12");
    assert_eq!(payload.assembled_reading_text, payload.script.reading.text);
    assert!(payload.assembled_reading_text.contains("Naquele tempo"));

    let track = cues_of(&payload);
    track.validate().unwrap();
    assert_eq!(track.len(), 5);
    let starts: Vec<u64> = track.cues().iter().map(|c| c.start_ms).collect();
    assert_eq!(starts, [0, CLIP_MS, 2 * CLIP_MS, 3 * CLIP_MS, 4 * CLIP_MS]);
    assert_eq!(track.cues()[0].text, "Hook");
    assert_eq!(track.cues()[4].text, "Pray");
    assert_eq!(track.total_duration_ms(), 5 * CLIP_MS);

    // Binary media is released once stored
    assert!(observer.cache().is_empty());
    assert!(BlockId::ORDER
        .iter()
        .all(|b| observer.status(*b) == BlockStatus::Done));
    let progress = observer.progress().unwrap();
    assert_eq!((progress.done, progress.total, progress.percent), (10, 10, 100));
}

#[tokio::test]
async fn test_soft_audio_failure_shifts_later_cues() {
    let h = Harness::new();
    *h.media.fail_audio_for.lock().unwrap() = Some("Reflect".to_string());
    let mut session = h.scripted_session().await;
    let observer = session.observer();

    session.generate_media().await.unwrap();

    assert_eq!(session.state(), ProcessingState::Complete);
    assert_eq!(h.media.call_count(), 10);

    let report = session.last_report().unwrap();
    assert_eq!(report.failed_blocks(), [BlockId::Reflection]);
    assert_eq!(report.generated, 9);
    assert_eq!(observer.status(BlockId::Reflection), BlockStatus::Error);
    assert_eq!(observer.status(BlockId::Application), BlockStatus::Done);

    let payload = h.transport.last_upload();
    assert!(!payload
        .assets
        .iter()
        .any(|a| a.block_id == "reflection" && a.kind == AssetKind::Audio));
    assert!(payload
        .assets
        .iter()
        .any(|a| a.block_id == "reflection" && a.kind == AssetKind::Image));

    let track = cues_of(&payload);
    track.validate().unwrap();
    let texts: Vec<&str> = track.cues().iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts.len(), 4);
    assert_eq!(texts[0], "Hook");
    assert_eq!(&texts[2..], ["Apply", "Pray"]);
    assert_eq!(track.cues()[2].start_ms, 2 * CLIP_MS);
    assert_eq!(track.cues()[3].start_ms, 3 * CLIP_MS);
}

#[tokio::test]
async fn test_quota_stops_before_next_block() {
    let h = Harness::new();
    *h.media.quota_on_image.lock().unwrap() = Some("bible".to_string());
    let mut session = h.scripted_session().await;
    let observer = session.observer();

    let err = session.generate_media().await.unwrap_err();

    assert!(matches!(
        err,
        WorkerError::QuotaExceeded {
            block: BlockId::Reading,
            kind: MediaKind::Image,
            ..
        }
    ));
    assert!(err.remediation().is_some());
    assert_eq!(session.state(), ProcessingState::Error);
    assert!(session.quota_exceeded());

    // Nothing after the failing unit was attempted
    assert_eq!(h.media.calls().last().map(String::as_str), Some("image:bible"));
    assert_eq!(h.media.call_count(), 4);
    assert!(h.transport.uploads().is_empty());

    let cache = observer.cache();
    assert_eq!(cache.len(), 3);
    assert!(cache.is_complete(BlockId::Hook));
    assert!(cache.audio(BlockId::Reading).is_some());
    assert!(cache.image(BlockId::Reading).is_none());

    assert_eq!(observer.status(BlockId::Hook), BlockStatus::Done);
    assert_eq!(observer.status(BlockId::Reading), BlockStatus::Error);
    assert_eq!(observer.status(BlockId::Reflection), BlockStatus::Pending);
    assert_eq!(observer.progress().unwrap().done, 3);
}

#[tokio::test]
async fn test_quota_on_nth_call_keeps_earlier_units() {
    for n in [1usize, 6, 10] {
        let h = Harness::new();
        *h.media.quota_on_call.lock().unwrap() = Some(n);
        let mut session = h.scripted_session().await;

        let err = session.generate_media().await.unwrap_err();

        assert!(err.is_quota_exceeded(), "call {}", n);
        assert_eq!(h.media.call_count(), n);
        assert_eq!(session.cache().len(), n - 1);
        assert_eq!(session.observer().progress().unwrap().done as usize, n - 1);
    }
}

#[tokio::test]
async fn test_rerun_after_quota_generates_only_missing_units() {
    let h = Harness::new();
    *h.media.quota_on_image.lock().unwrap() = Some("bible".to_string());
    let mut session = h.scripted_session().await;
    session.generate_media().await.unwrap_err();

    h.media.clear_faults();
    session.generate_media().await.unwrap();

    assert_eq!(session.state(), ProcessingState::Complete);
    assert!(!session.quota_exceeded());
    let calls = h.media.calls();
    assert_eq!(calls.len(), 11);
    assert_eq!(calls[4], "image:bible");
    assert_eq!(calls.iter().filter(|c| *c == "audio:Hook").count(), 1);

    let report = session.last_report().unwrap();
    assert_eq!((report.cached, report.generated), (3, 7));
    assert_eq!(cues_of(&h.transport.last_upload()).len(), 5);
}

#[tokio::test]
async fn test_failed_upload_keeps_media_for_cached_rerun() {
    let h = Harness::new();
    h.transport.fail_upload.store(true, Ordering::SeqCst);
    let mut session = h.scripted_session().await;

    let err = session.generate_media().await.unwrap_err();
    assert!(matches!(err, WorkerError::Transport(_)));
    assert_eq!(session.state(), ProcessingState::Error);
    assert!(!session.quota_exceeded());
    assert_eq!(session.cache().len(), 10);

    h.transport.fail_upload.store(false, Ordering::SeqCst);
    let job_id = session.generate_media().await.unwrap();

    assert_eq!(job_id, JobId::new("job-1"));
    assert_eq!(h.media.call_count(), 10);
    assert_eq!(session.last_report().unwrap().cached, 10);
    assert_eq!(h.transport.uploads().len(), 2);
}

#[tokio::test]
async fn test_resumed_job_regenerates_nothing_and_replaces() {
    let h = Harness::new();
    let job_id = h.session().produce(date()).await.unwrap();
    assert_eq!(h.media.call_count(), 10);

    let mut session = h.session();
    session.resume_job(&job_id).await.unwrap();

    assert_eq!(session.job_id(), Some(&job_id));
    assert_eq!(session.cache().len(), 10);
    assert_eq!(session.metadata().unwrap().reference, "Mt 5, 1-12");
    assert_eq!(session.script().unwrap().text_of(BlockId::Prayer), "Pray");
    assert_eq!(session.observer().status(BlockId::Hook), BlockStatus::Done);

    let replaced = session.generate_media().await.unwrap();

    assert_eq!(replaced, job_id);
    assert_eq!(h.media.call_count(), 10);
    let payload = h.transport.last_upload();
    assert_eq!(payload.job_id, Some(job_id));
    assert!(payload.has_unique_assets());
    assert_eq!(cues_of(&payload).len(), 5);
    assert_eq!(h.transport.jobs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_regenerate_all_after_upload_reuses_stored_media() {
    let h = Harness::new();
    let mut session = h.session();
    let job_id = session.produce(date()).await.unwrap();
    assert!(session.cache().is_empty());

    let replaced = session.generate_media().await.unwrap();

    assert_eq!(replaced, job_id);
    assert_eq!(h.media.call_count(), 10);
    assert_eq!(h.transport.fetches.load(Ordering::SeqCst), 1);
    let report = session.last_report().unwrap();
    assert_eq!((report.cached, report.generated), (10, 0));

    let payload = h.transport.last_upload();
    assert_eq!(payload.job_id, Some(job_id));
    assert_eq!(payload.assets.len(), 11);
    assert_eq!(cues_of(&payload).len(), 5);
}

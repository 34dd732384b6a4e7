//! Individual session operations: preconditions, editing, resume, busy handling.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use devo_models::{
    BlockId, IntroStyle, JobId, LogLevel, ProcessingState, ReadingCategory, ScriptBlock,
    VisualStyle,
};
use devo_worker::{SessionHandle, WorkerError};
use tokio::sync::Notify;

use super::fakes::{date, Harness};

#[tokio::test]
async fn test_generate_script_requires_source() {
    let h = Harness::new();
    let mut session = h.session();

    let err = session
        .generate_script(IntroStyle::Viral, VisualStyle::Cinematic)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::MissingSource));
    assert_eq!(session.state(), ProcessingState::Idle);
}

#[tokio::test]
async fn test_generate_media_requires_script() {
    let h = Harness::new();
    let mut session = h.session();
    session
        .fetch_source(date(), ReadingCategory::Gospel)
        .await
        .unwrap();

    let err = session.generate_media().await.unwrap_err();

    assert!(matches!(err, WorkerError::MissingScript));
    assert_eq!(session.state(), ProcessingState::Idle);
    assert_eq!(h.media.call_count(), 0);
}

#[tokio::test]
async fn test_fetch_failure_then_retry() {
    let h = Harness::new();
    h.source.fail.store(true, Ordering::SeqCst);
    let mut session = h.session();

    let err = session
        .fetch_source(date(), ReadingCategory::Gospel)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkerError::SourceFetch(_)));
    assert_eq!(session.state(), ProcessingState::Error);
    assert!(session.source().is_none());
    assert!(session
        .log()
        .entries()
        .iter()
        .any(|e| e.level == LogLevel::Error));

    h.source.fail.store(false, Ordering::SeqCst);
    let text = session
        .fetch_source(date(), ReadingCategory::Gospel)
        .await
        .unwrap();

    assert_eq!(text.reference, "Mt 5, 1-12");
    assert_eq!(session.state(), ProcessingState::Idle);
    assert_eq!(h.source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_script_failure_moves_to_error() {
    let h = Harness::new();
    h.writer.fail.store(true, Ordering::SeqCst);
    let mut session = h.session();
    session
        .fetch_source(date(), ReadingCategory::Gospel)
        .await
        .unwrap();

    let err = session
        .generate_script(IntroStyle::Viral, VisualStyle::Cinematic)
        .await
        .unwrap_err();

    assert!(matches!(err, WorkerError::ScriptGeneration(_)));
    assert_eq!(session.state(), ProcessingState::Error);
    assert!(session.script().is_none());
}

#[tokio::test]
async fn test_generate_script_formats_reading_and_metadata() {
    let h = Harness::new();
    let session = h.scripted_session().await;

    let script = session.script().unwrap();
    assert!(script.reading.text.ends_with("Palavra da Salvação. Glória a vós, Senhor!"));
    assert!(script.reading.text.contains("Naquele tempo"));
    assert_eq!(script.reading.image_prompt, "bible");
    assert_eq!(script.text_of(BlockId::Hook), "Hook");

    let metadata = session.metadata().unwrap();
    assert_eq!(metadata.date, "2024-12-16");
    assert_eq!(metadata.reference, "Mt 5, 1-12");
}

#[tokio::test]
async fn test_new_fetch_starts_a_fresh_cycle() {
    let h = Harness::new();
    let mut session = h.session();
    session.produce(date()).await.unwrap();
    assert!(session.job_id().is_some());

    session
        .fetch_source(date(), ReadingCategory::Gospel)
        .await
        .unwrap();

    assert_eq!(session.state(), ProcessingState::Idle);
    assert!(session.script().is_none());
    assert!(session.job_id().is_none());
    assert!(session.metadata().is_none());
}

#[tokio::test]
async fn test_new_script_discards_cached_media() {
    let h = Harness::new();
    *h.media.quota_on_image.lock().unwrap() = Some("bible".to_string());
    let mut session = h.scripted_session().await;
    session.generate_media().await.unwrap_err();
    assert_eq!(session.cache().len(), 3);

    session
        .generate_script(IntroStyle::Liturgical, VisualStyle::Watercolor)
        .await
        .unwrap();

    assert_eq!(session.state(), ProcessingState::Idle);
    assert!(!session.quota_exceeded());
    assert!(session.cache().is_empty());
    assert_eq!(session.config().media.visual_style, VisualStyle::Watercolor);
}

#[tokio::test]
async fn test_regenerate_block_restores_released_media() {
    let h = Harness::new();
    let mut session = h.session();
    let job_id = session.produce(date()).await.unwrap();
    assert!(session.cache().is_empty());

    let replaced = session.regenerate_block(BlockId::Reflection).await.unwrap();

    assert_eq!(replaced, job_id);
    assert_eq!(h.transport.fetches.load(Ordering::SeqCst), 1);
    let calls = h.media.calls();
    assert_eq!(calls.len(), 12);
    assert_eq!(&calls[10..], ["audio:Reflect", "image:river"]);

    let payload = h.transport.last_upload();
    assert_eq!(payload.job_id, Some(job_id));
    assert_eq!(payload.assets.len(), 11);
    assert!(payload.has_unique_assets());
}

#[tokio::test]
async fn test_regenerate_block_with_cache_only_touches_that_block() {
    let h = Harness::new();
    h.transport.fail_upload.store(true, Ordering::SeqCst);
    let mut session = h.scripted_session().await;
    session.generate_media().await.unwrap_err();
    h.transport.fail_upload.store(false, Ordering::SeqCst);

    session.regenerate_block(BlockId::Prayer).await.unwrap();

    assert_eq!(h.transport.fetches.load(Ordering::SeqCst), 0);
    assert_eq!(&h.media.calls()[10..], ["audio:Pray", "image:hands"]);
    let report = session.last_report().unwrap();
    assert_eq!((report.total, report.generated), (2, 2));
    assert_eq!(h.transport.last_upload().assets.len(), 11);
}

#[tokio::test]
async fn test_edit_block_keeps_cache_and_warns() {
    let h = Harness::new();
    *h.media.quota_on_image.lock().unwrap() = Some("bible".to_string());
    let mut session = h.scripted_session().await;
    session.generate_media().await.unwrap_err();
    let warnings = |s: &devo_worker::Session| {
        s.log()
            .entries()
            .iter()
            .filter(|e| e.level == LogLevel::Warn && e.message.contains("edited"))
            .count()
    };

    session
        .edit_block(BlockId::Hook, ScriptBlock::new("Hook", "dawn"))
        .unwrap();
    assert_eq!(warnings(&session), 0);

    session
        .edit_block(BlockId::Hook, ScriptBlock::new("A new hook", "dawn"))
        .unwrap();

    assert_eq!(warnings(&session), 1);
    assert_eq!(session.script().unwrap().text_of(BlockId::Hook), "A new hook");
    assert!(session.cache().is_complete(BlockId::Hook));

    // No media yet, no warning
    session
        .edit_block(BlockId::Prayer, ScriptBlock::new("Amen", "hands"))
        .unwrap();
    assert_eq!(warnings(&session), 1);
}

#[tokio::test]
async fn test_edit_block_requires_script() {
    let h = Harness::new();
    let mut session = h.session();

    let err = session
        .edit_block(BlockId::Hook, ScriptBlock::new("Hook", "dawn"))
        .unwrap_err();

    assert!(matches!(err, WorkerError::MissingScript));
}

#[tokio::test]
async fn test_clear_cache() {
    let h = Harness::new();
    h.transport.fail_upload.store(true, Ordering::SeqCst);
    let mut session = h.scripted_session().await;
    session.generate_media().await.unwrap_err();
    assert_eq!(session.cache().len(), 10);

    session.clear_cache().unwrap();

    assert!(session.cache().is_empty());
    assert!(session.observer().cache().is_empty());
}

#[tokio::test]
async fn test_list_jobs() {
    let h = Harness::new();
    let mut session = h.session();
    session.produce(date()).await.unwrap();

    let jobs = session.list_jobs().await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, JobId::new("job-1"));
    assert_eq!(jobs[0].display_ref.as_deref(), Some("Mt 5, 1-12"));
}

#[tokio::test]
async fn test_resume_unknown_job_fails() {
    let h = Harness::new();
    let mut session = h.session();

    let err = session.resume_job(&JobId::new("missing")).await.unwrap_err();

    assert!(matches!(err, WorkerError::Transport(_)));
    assert_eq!(session.state(), ProcessingState::Idle);
    assert!(session.job_id().is_none());
}

#[tokio::test]
async fn test_acknowledge_clears_quota_flag() {
    let h = Harness::new();
    *h.media.quota_on_call.lock().unwrap() = Some(1);
    let mut session = h.scripted_session().await;
    session.generate_media().await.unwrap_err();
    assert!(session.quota_exceeded());

    session.acknowledge().unwrap();

    assert_eq!(session.state(), ProcessingState::Idle);
    assert!(!session.quota_exceeded());
    // Idempotent when already idle
    session.acknowledge().unwrap();
    assert_eq!(session.state(), ProcessingState::Idle);
}

#[tokio::test]
async fn test_abandon_resets_session() {
    let h = Harness::new();
    let mut session = h.session();
    session.produce(date()).await.unwrap();
    assert_eq!(session.state(), ProcessingState::Complete);

    session.abandon();

    assert_eq!(session.state(), ProcessingState::Idle);
    assert!(session.source().is_none());
    assert!(session.script().is_none());
    assert!(session.job_id().is_none());
    assert!(session.observer().progress().is_none());
}

#[tokio::test]
async fn test_busy_session_rejects_second_operation() {
    let h = Harness::new();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    *h.media.gate.lock().unwrap() = Some((entered.clone(), release.clone()));

    let handle = SessionHandle::new(h.scripted_session().await);
    let observer = handle.observer();
    let worker = handle.clone();
    let task = tokio::spawn(async move {
        let mut session = worker.try_acquire().unwrap();
        session.generate_media().await
    });

    entered.notified().await;
    assert_eq!(observer.state(), ProcessingState::GeneratingMedia);
    assert!(matches!(
        handle.try_acquire(),
        Err(WorkerError::Busy(ProcessingState::GeneratingMedia))
    ));

    release.notify_one();
    let job_id = task.await.unwrap().unwrap();

    assert_eq!(job_id, JobId::new("job-1"));
    assert_eq!(observer.state(), ProcessingState::Complete);
    assert!(handle.try_acquire().is_ok());
}

#[tokio::test]
async fn test_held_session_outside_a_phase_reports_operation_in_progress() {
    let h = Harness::new();
    let handle = SessionHandle::new(h.session());

    let guard = handle.try_acquire().unwrap();
    assert_eq!(guard.state(), ProcessingState::Idle);

    let err = match handle.try_acquire() {
        Err(e) => e,
        Ok(_) => panic!("second acquire succeeded"),
    };
    assert!(matches!(err, WorkerError::OperationInProgress));
    assert!(err.remediation().is_some());

    drop(guard);
    assert!(handle.try_acquire().is_ok());
}

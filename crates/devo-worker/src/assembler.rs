//! Job payload assembly.

use devo_media::build_subtitles;
use devo_models::{
    ActivityLog, Asset, AssetCache, AssetKind, BlockId, JobId, JobMetadata, JobPayload, Script,
    SUBTITLE_BLOCK_ID,
};
use tracing::debug;

use crate::error::WorkerResult;

/// Bundle cached media, a freshly built subtitle track, the script and
/// metadata into a transport payload.
///
/// Assets are ordered by block, image before audio; blocks with neither are
/// left out. The subtitle track is always rebuilt from the cache and must
/// validate. `existing` becomes the replace hint.
pub fn assemble_payload(
    script: &Script,
    cache: &AssetCache,
    metadata: &JobMetadata,
    existing: Option<&JobId>,
    log: &ActivityLog,
) -> WorkerResult<JobPayload> {
    let track = build_subtitles(script, cache, log);
    track.validate()?;

    let mut assets = Vec::with_capacity(cache.len() + 1);
    for block in BlockId::ORDER {
        if let Some(image) = cache.image(block) {
            assets.push(Asset::encode(block.as_str(), AssetKind::Image, image));
        }
        if let Some(audio) = cache.audio(block) {
            assets.push(Asset::encode(block.as_str(), AssetKind::Audio, audio));
        }
    }
    assets.push(Asset::encode(
        SUBTITLE_BLOCK_ID,
        AssetKind::Subtitle,
        track.render().as_bytes(),
    ));

    debug!(
        assets = assets.len(),
        cues = track.len(),
        duration_ms = track.total_duration_ms(),
        replace = existing.is_some(),
        "Payload assembled"
    );
    log.info(format!(
        "Payload assembled: {} assets, {} subtitle cues",
        assets.len(),
        track.len()
    ));

    Ok(JobPayload {
        assets,
        script: script.clone(),
        metadata: metadata.clone(),
        assembled_reading_text: script.reading.text.clone(),
        job_id: existing.cloned(),
    })
}

//! Snapshot publishing for session observers.
//!
//! The session is the only writer. Every publication is a freshly built value,
//! so a reader holding an older snapshot never sees it change underneath.

use std::collections::BTreeMap;
use std::sync::Arc;

use devo_models::{AssetCache, BlockId, BlockStatus, ProcessingState, ProgressSnapshot};
use tokio::sync::watch;

/// Status of every block for the current run.
pub type BlockStatusMap = BTreeMap<BlockId, BlockStatus>;

fn pending_statuses() -> BlockStatusMap {
    BlockId::ORDER
        .into_iter()
        .map(|id| (id, BlockStatus::Pending))
        .collect()
}

/// Writing side, owned by the session.
#[derive(Debug)]
pub struct SessionPublisher {
    state: watch::Sender<ProcessingState>,
    cache: watch::Sender<Arc<AssetCache>>,
    statuses: watch::Sender<BlockStatusMap>,
    progress: watch::Sender<Option<ProgressSnapshot>>,
}

impl Default for SessionPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionPublisher {
    pub fn new() -> Self {
        Self {
            state: watch::channel(ProcessingState::Idle).0,
            cache: watch::channel(Arc::new(AssetCache::new())).0,
            statuses: watch::channel(pending_statuses()).0,
            progress: watch::channel(None).0,
        }
    }

    pub fn subscribe(&self) -> SessionObserver {
        SessionObserver {
            state: self.state.subscribe(),
            cache: self.cache.subscribe(),
            statuses: self.statuses.subscribe(),
            progress: self.progress.subscribe(),
        }
    }

    pub fn publish_state(&self, state: ProcessingState) {
        self.state.send_replace(state);
    }

    /// Current cache snapshot.
    pub fn cache(&self) -> Arc<AssetCache> {
        self.cache.borrow().clone()
    }

    pub fn publish_cache(&self, cache: AssetCache) {
        self.cache.send_replace(Arc::new(cache));
    }

    pub fn statuses(&self) -> BlockStatusMap {
        self.statuses.borrow().clone()
    }

    /// Publish a new status map with one block changed.
    pub fn set_status(&self, block: BlockId, status: BlockStatus) {
        let mut next = self.statuses();
        next.insert(block, status);
        self.statuses.send_replace(next);
    }

    pub fn reset_statuses(&self) {
        self.statuses.send_replace(pending_statuses());
    }

    pub fn publish_progress(&self, progress: Option<ProgressSnapshot>) {
        self.progress.send_replace(progress);
    }
}

/// Reading side. Cheap to clone; each clone tracks changes independently.
#[derive(Debug, Clone)]
pub struct SessionObserver {
    state: watch::Receiver<ProcessingState>,
    cache: watch::Receiver<Arc<AssetCache>>,
    statuses: watch::Receiver<BlockStatusMap>,
    progress: watch::Receiver<Option<ProgressSnapshot>>,
}

impl SessionObserver {
    pub fn state(&self) -> ProcessingState {
        *self.state.borrow()
    }

    pub fn cache(&self) -> Arc<AssetCache> {
        self.cache.borrow().clone()
    }

    pub fn statuses(&self) -> BlockStatusMap {
        self.statuses.borrow().clone()
    }

    pub fn status(&self, block: BlockId) -> BlockStatus {
        self.statuses
            .borrow()
            .get(&block)
            .copied()
            .unwrap_or_default()
    }

    pub fn progress(&self) -> Option<ProgressSnapshot> {
        *self.progress.borrow()
    }

    /// Wait until the processing state differs from what was last seen.
    ///
    /// Returns `None` once the session is gone.
    pub async fn state_changed(&mut self) -> Option<ProcessingState> {
        self.state.changed().await.ok()?;
        Some(*self.state.borrow_and_update())
    }

    /// Wait for the next progress publication.
    pub async fn progress_changed(&mut self) -> Option<Option<ProgressSnapshot>> {
        self.progress.changed().await.ok()?;
        Some(*self.progress.borrow_and_update())
    }
}

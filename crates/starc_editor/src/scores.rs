//! Observable score store: the single source of truth for the displayed
//! [`ScoreSet`].

use serde::Serialize;
use starc_client::ApiClient;
use starc_core::fence::AppliedMark;
use starc_core::models::scores::{ScorePayload, ScoreSet};
use starc_core::models::DocumentId;
use starc_core::RequestFence;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Snapshot observed by subscribers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreState {
    pub scores: Option<ScoreSet>,
    pub loading: bool,
    #[serde(skip)]
    applied: AppliedMark,
}

impl ScoreState {
    /// Sequence of the last fenced result applied.
    pub fn applied_seq(&self) -> u64 {
        self.applied.get()
    }
}

/// Cloneable handle; every clone shares the same state.
#[derive(Debug, Clone)]
pub struct ScoreStore {
    tx: Arc<watch::Sender<ScoreState>>,
}

impl Default for ScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ScoreState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Receiver that is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<ScoreState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ScoreState {
        *self.tx.borrow()
    }

    pub fn scores(&self) -> Option<ScoreSet> {
        self.tx.borrow().scores
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading
    }

    pub fn set_loading(&self, loading: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    /// Replace the scores from the response payload of operation `seq` and
    /// clear loading. Fenced like [`ScoreStore::apply`].
    ///
    /// # Returns
    /// The set now on display from this payload, or `None` when the payload
    /// carried no scores or a newer result was already applied. The displayed
    /// values are left alone in both cases.
    pub fn update_scores(&self, seq: u64, payload: &ScorePayload) -> Option<ScoreSet> {
        let normalized = payload.normalize();
        let mut applied = None;
        self.tx.send_modify(|state| {
            if let Some(scores) = normalized {
                if state.applied.advance(seq) {
                    state.scores = Some(scores);
                    applied = Some(scores);
                } else {
                    debug!(seq, "dropping stale score payload");
                }
            }
            state.loading = false;
        });
        applied
    }

    /// Replace the scores with the result of operation `seq`, unless a newer
    /// operation has already been applied.
    pub fn apply(&self, seq: u64, scores: ScoreSet) -> bool {
        let applied = self.tx.send_if_modified(|state| {
            if state.applied.advance(seq) {
                state.scores = Some(scores);
                true
            } else {
                false
            }
        });
        if !applied {
            debug!(seq, "dropping stale score result");
        }
        applied
    }

    /// Fetch the scores for `id` and apply them.
    ///
    /// Failures are logged and leave the last known scores on display;
    /// loading is cleared either way.
    pub async fn fetch_scores(&self, client: &ApiClient, id: DocumentId, fence: &RequestFence) {
        let seq = fence.next();
        self.set_loading(true);
        match client.get_scores(id).await {
            Ok(Some(scores)) => {
                self.apply(seq, scores);
            }
            Ok(None) => debug!(document_id = id, "no scores available yet"),
            Err(err) => warn!(document_id = id, error = %err, "score fetch failed"),
        }
        self.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreStore;
    use starc_core::models::scores::{ScorePayload, ScoreSet};
    use starc_core::RequestFence;

    #[test]
    fn positional_update_replaces_all_four_values() {
        let store = ScoreStore::new();
        store.set_loading(true);
        let applied = store
            .update_scores(1, &ScorePayload::Positional([80.0, 70.0, 60.0, 90.0]))
            .expect("scores");
        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.scores, Some(applied));
        assert_eq!(applied.overall, 80.0);
        assert_eq!(applied.optimism, 70.0);
        assert_eq!(applied.forecast, 60.0);
        assert_eq!(applied.confidence, 90.0);
    }

    #[test]
    fn empty_payload_keeps_last_known_scores() {
        let store = ScoreStore::new();
        store.apply(1, ScoreSet::new(50.0, 50.0, 50.0, 50.0));
        store.set_loading(true);
        assert_eq!(store.update_scores(2, &ScorePayload::List(Vec::new())), None);
        assert_eq!(store.scores(), Some(ScoreSet::new(50.0, 50.0, 50.0, 50.0)));
        assert!(!store.is_loading());
    }

    #[test]
    fn late_fetch_cannot_overwrite_a_newer_update() {
        let store = ScoreStore::new();
        let fence = RequestFence::new();
        let fetch_seq = fence.next();
        let update_seq = fence.next();

        let updated = store
            .update_scores(update_seq, &ScorePayload::Positional([80.0, 70.0, 60.0, 90.0]))
            .expect("scores");
        assert!(!store.apply(fetch_seq, ScoreSet::new(10.0, 10.0, 10.0, 10.0)));
        assert_eq!(store.scores(), Some(updated));
        assert_eq!(store.snapshot().applied_seq(), update_seq);

        assert_eq!(
            store.update_scores(fetch_seq, &ScorePayload::Positional([1.0, 1.0, 1.0, 1.0])),
            None
        );
        assert_eq!(store.scores(), Some(updated));
    }

    #[test]
    fn older_results_never_overwrite_newer_ones() {
        let store = ScoreStore::new();
        let newer = ScoreSet::new(90.0, 90.0, 90.0, 90.0);
        let older = ScoreSet::new(10.0, 10.0, 10.0, 10.0);
        assert!(store.apply(5, newer));
        assert!(!store.apply(3, older));
        assert_eq!(store.scores(), Some(newer));
        assert_eq!(store.snapshot().applied_seq(), 5);
    }

    #[tokio::test]
    async fn subscribers_see_each_replacement() {
        let store = ScoreStore::new();
        let mut rx = store.subscribe();
        let clone = store.clone();
        clone.apply(1, ScoreSet::new(1.0, 2.0, 3.0, 4.0));
        rx.changed().await.expect("changed");
        assert_eq!(rx.borrow().scores, Some(ScoreSet::new(1.0, 2.0, 3.0, 4.0)));
    }
}

//! Best-effort mirroring of a batch to the remote watchlist store.
//!
//! Sync never reads or writes the local collection: a failed sync leaves the
//! merged collection as it is and is only reported back to the caller.

use kisetsu_api::traits::{Diagnostic, RemoteStore, WatchlistRow};
use tracing::{info, warn};

use crate::error::KisetsuError;
use crate::models::{BatchEntry, UserSession};

/// Why a batch was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSignedIn,
    RemoteDisabled,
    EmptyBatch,
}

/// Outcome of syncing one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Synced { rows: usize },
    /// `message` is meant to be shown to the user.
    Failed { message: String },
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Number of rows written, with failures as [`KisetsuError::SyncFailure`].
    pub fn into_result(self) -> Result<usize, KisetsuError> {
        match self {
            Self::Skipped(_) => Ok(0),
            Self::Synced { rows } => Ok(rows),
            Self::Failed { message } => Err(KisetsuError::SyncFailure(message)),
        }
    }
}

/// Map a batch to remote rows owned by `user_id`.
pub fn to_rows(batch: &[BatchEntry], user_id: &str) -> Vec<WatchlistRow> {
    batch
        .iter()
        .map(|entry| {
            let item = &entry.item;
            WatchlistRow {
                anilist_id: item.anilist_id,
                title: item.title.clone(),
                image: item.image.clone(),
                rating: item.rating,
                watched: item.watched,
                rewatch_count: item.rewatch_count,
                tags: item.tags.clone(),
                series_name: item.series_name.clone(),
                studios: item.studios.clone(),
                season_name: entry.season_name.clone(),
                user_id: user_id.to_string(),
            }
        })
        .collect()
}

/// Write the batch to the store in a single insert.
///
/// Without a signed-in user or a configured store nothing is sent.
pub async fn sync_batch<S: RemoteStore>(
    store: Option<&S>,
    user: Option<&UserSession>,
    batch: &[BatchEntry],
) -> SyncOutcome {
    let Some(user) = user else {
        return SyncOutcome::Skipped(SkipReason::NotSignedIn);
    };
    let Some(store) = store else {
        return SyncOutcome::Skipped(SkipReason::RemoteDisabled);
    };
    if batch.is_empty() {
        return SyncOutcome::Skipped(SkipReason::EmptyBatch);
    }

    let rows = to_rows(batch, &user.user_id);
    match store.insert_rows(&rows).await {
        Ok(stored) => {
            info!(rows = stored.len(), user_id = %user.user_id, "Synced batch");
            SyncOutcome::Synced { rows: stored.len() }
        }
        Err(e) => {
            warn!(error = %e, user_id = %user.user_id, "Batch sync failed");
            SyncOutcome::Failed {
                message: format!("Failed to save to watchlist: {}", e.diagnostic()),
            }
        }
    }
}

//! Session state for one user driving the catalog: the current collection,
//! the expansion set, and the most recent search results.

mod db;

use kisetsu_api::anilist::AniListClient;
use kisetsu_api::supabase::SupabaseClient;
use kisetsu_api::traits::{
    CatalogRecord, CatalogSearch, Diagnostic, Quarter, RemoteStore, WatchlistRow,
};
use kisetsu_core::catalog;
use kisetsu_core::config::AppConfig;
use kisetsu_core::merge::{self, MergeOutcome};
use kisetsu_core::models::{Collection, ExpandedSeasons, UserSession};
use kisetsu_core::normalize;
use kisetsu_core::sync::{self, SyncOutcome};

pub use db::DbHandle;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("not signed in")]
    NotSignedIn,
}

/// What one submit action did.
///
/// The merge is already applied to the session when this is returned; the
/// sync result is reported alongside it and never changes the local state.
#[derive(Debug, Clone)]
pub struct Submission {
    pub merge: MergeOutcome,
    pub sync: SyncOutcome,
    /// Set when the local snapshot could not be written.
    pub persist_error: Option<String>,
}

/// The session type used by the application.
pub type AppSession = Session<AniListClient, SupabaseClient>;

pub struct Session<C, S> {
    catalog: C,
    store: Option<S>,
    user: Option<UserSession>,
    db: Option<DbHandle>,
    collection: Collection,
    expanded: ExpandedSeasons,
    results: Vec<CatalogRecord>,
}

impl<C: CatalogSearch, S: RemoteStore> Session<C, S> {
    pub fn new(catalog: C, store: Option<S>, user: Option<UserSession>) -> Self {
        Self {
            catalog,
            store,
            user,
            db: None,
            collection: Collection::default(),
            expanded: ExpandedSeasons::new(),
            results: Vec::new(),
        }
    }

    /// Attach local persistence and restore the stored collection.
    pub async fn with_db(mut self, db: DbHandle) -> Result<Self, RuntimeError> {
        let snapshot = db.load_snapshot().await?;
        tracing::debug!(
            seasons = snapshot.collection.seasons().len(),
            items = snapshot.collection.item_count(),
            "Restored collection"
        );
        self.collection = snapshot.collection;
        self.expanded = snapshot.expanded;
        self.db = Some(db);
        Ok(self)
    }

    /// Start from an existing collection instead of an empty one.
    pub fn with_state(mut self, collection: Collection, expanded: ExpandedSeasons) -> Self {
        self.collection = collection;
        self.expanded = expanded;
        self
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn expanded(&self) -> &ExpandedSeasons {
        &self.expanded
    }

    pub fn results(&self) -> &[CatalogRecord] {
        &self.results
    }

    pub fn user(&self) -> Option<&UserSession> {
        self.user.as_ref()
    }

    /// Search by title, replacing the current results.
    pub async fn search_title(&mut self, query: &str) -> &[CatalogRecord] {
        self.results = catalog::search_title(&self.catalog, query).await;
        &self.results
    }

    /// Search by release period, replacing the current results.
    pub async fn search_season(&mut self, quarter: Quarter, year: u32) -> &[CatalogRecord] {
        self.results = catalog::search_season(&self.catalog, quarter, year).await;
        &self.results
    }

    /// Add the selected search results (by index) to the collection.
    ///
    /// The merge is committed to the session first. Persisting the new
    /// snapshot and syncing the batch then run together; neither outcome
    /// rolls back the merge.
    pub async fn submit(&mut self, selection: &[usize]) -> Submission {
        let records = self.selected(selection);
        let batch = normalize::build_batch(&records, &self.collection);
        let outcome = merge::merge(&self.collection, &self.expanded, &batch);

        self.collection = outcome.collection.clone();
        self.expanded = outcome.expanded.clone();

        let persist = async {
            match &self.db {
                Some(db) => {
                    db.save_snapshot(self.collection.clone(), self.expanded.clone())
                        .await
                }
                None => Ok(()),
            }
        };
        let remote = sync::sync_batch(self.store.as_ref(), self.user.as_ref(), &batch);
        let (persisted, sync) = tokio::join!(persist, remote);

        let persist_error = persisted.err().map(|e| {
            tracing::error!(error = %e, "Failed to persist collection");
            e.to_string()
        });

        Submission {
            merge: outcome,
            sync,
            persist_error,
        }
    }

    /// The signed-in user's remote watchlist.
    pub async fn fetch_watchlist(&self) -> Result<Vec<WatchlistRow>, RuntimeError> {
        let user = self.user.as_ref().ok_or(RuntimeError::NotSignedIn)?;
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| RuntimeError::Config("remote store is not configured".into()))?;
        store
            .fetch_rows(&user.user_id)
            .await
            .map_err(|e| RuntimeError::Api(e.diagnostic()))
    }

    /// Records picked by index, in selection order. Repeated or out-of-range
    /// indices are skipped.
    fn selected(&self, selection: &[usize]) -> Vec<CatalogRecord> {
        let mut seen = Vec::with_capacity(selection.len());
        let mut records = Vec::with_capacity(selection.len());
        for &i in selection {
            if seen.contains(&i) {
                continue;
            }
            seen.push(i);
            match self.results.get(i) {
                Some(record) => records.push(record.clone()),
                None => tracing::warn!(
                    index = i,
                    results = self.results.len(),
                    "Selection out of range, skipping"
                ),
            }
        }
        records
    }
}

impl AppSession {
    /// Build a session from configuration: AniList search, the remote store
    /// when enabled, and the configured user.
    pub fn from_config(config: &AppConfig) -> Result<Self, RuntimeError> {
        let catalog = AniListClient::with_settings(
            config.search.endpoint.clone(),
            config.search.per_page,
            config.search_timeout(),
        )
        .map_err(|e| RuntimeError::Config(e.to_string()))?;

        let user = config.user_session();
        let store = if config.remote.enabled {
            Some(build_store(config, user.as_ref())?)
        } else {
            None
        };

        Ok(Self::new(catalog, store, user))
    }
}

fn build_store(
    config: &AppConfig,
    user: Option<&UserSession>,
) -> Result<SupabaseClient, RuntimeError> {
    let url = config
        .remote
        .url
        .as_deref()
        .ok_or_else(|| RuntimeError::Config("remote.url is required when remote is enabled".into()))?;
    let api_key = config.remote.api_key.clone().ok_or_else(|| {
        RuntimeError::Config("remote.api_key is required when remote is enabled".into())
    })?;

    let mut client = SupabaseClient::new(url, api_key)
        .map_err(|e| RuntimeError::Config(e.to_string()))?
        .with_table(config.remote.table.clone());
    if let Some(token) = user.and_then(|u| u.access_token.clone()) {
        client = client.with_access_token(token);
    }
    Ok(client)
}

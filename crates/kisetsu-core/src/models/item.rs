use serde::{Deserialize, Serialize};

/// Image reference used when the source record has no cover.
pub const PLACEHOLDER_IMAGE: &str = "placeholder";

/// A catalog entry held in a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Locally assigned, unique across the whole collection.
    pub id: u64,
    /// Id of the search record this item was created from.
    pub anilist_id: u64,
    pub title: String,
    pub image: String,
    /// 0 means unrated.
    pub rating: i32,
    pub watched: bool,
    pub rewatch_count: u32,
    pub tags: Option<Vec<String>>,
    pub series_name: Option<String>,
    pub studios: Option<Vec<String>>,
}

/// A freshly normalized item paired with the season it belongs to.
///
/// The season name is resolved once from the source record and travels with
/// the item through merge and sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub item: Item,
    pub season_name: String,
}

/// The signed-in user on whose behalf batches are synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub access_token: Option<String>,
}

//! Conversion of search records into catalog items.

use kisetsu_api::traits::{CatalogRecord, CoverImages};
use tracing::{debug, warn};

use crate::genre::derive_tags;
use crate::models::{BatchEntry, Collection, Item, PLACEHOLDER_IMAGE};
use crate::season::{self, SeasonKey};
use crate::series::infer_series_name;

/// Convert one search record into an item with the given id.
///
/// New items are always unwatched and unrated.
pub fn normalize_record(record: &CatalogRecord, id: u64) -> Item {
    let title = select_title(record);
    let series_name = infer_series_name(&title);

    Item {
        id,
        anilist_id: record.service_id,
        image: select_image(&record.cover),
        rating: 0,
        watched: false,
        rewatch_count: 0,
        tags: derive_tags(&record.genres),
        series_name,
        studios: if record.studios.is_empty() {
            None
        } else {
            Some(record.studios.clone())
        },
        title,
    }
}

/// Native title, then romaji, then empty.
fn select_title(record: &CatalogRecord) -> String {
    [&record.title_native, &record.title_romaji]
        .into_iter()
        .flatten()
        .map(|t| t.trim())
        .find(|t| !t.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Largest cover variant available, else the placeholder.
fn select_image(cover: &CoverImages) -> String {
    [&cover.extra_large, &cover.large, &cover.medium]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
}

/// Resolve a record's season, routing malformed quarters to the unclassified
/// season instead of failing the batch.
pub fn resolve_season(record: &CatalogRecord) -> SeasonKey {
    match season::resolve(record.year, record.season.as_deref()) {
        Ok(key) => key,
        Err(e) => {
            warn!(
                anilist_id = record.service_id,
                error = %e,
                "Unrecognized release quarter, filing as unclassified"
            );
            SeasonKey::Unclassified
        }
    }
}

/// Normalize a selection of records against the current collection.
///
/// Ids continue from the collection's maximum, read once before the batch,
/// so the i-th record (1-based) gets `max + i`.
pub fn build_batch(records: &[CatalogRecord], collection: &Collection) -> Vec<BatchEntry> {
    let base = collection.max_item_id();
    let batch: Vec<BatchEntry> = records
        .iter()
        .zip(1u64..)
        .map(|(record, offset)| BatchEntry {
            item: normalize_record(record, base + offset),
            season_name: resolve_season(record).name(),
        })
        .collect();

    debug!(base_id = base, count = batch.len(), "Normalized batch");
    batch
}

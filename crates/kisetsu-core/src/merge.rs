//! Season merge engine.
//!
//! Places a normalized batch into the collection and returns new values;
//! the caller's collection and expansion set are never modified.

use std::collections::HashMap;

use tracing::info;

use crate::models::{BatchEntry, Collection, ExpandedSeasons, Season};
use crate::season::sort_key;

/// Result of merging one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub collection: Collection,
    pub expanded: ExpandedSeasons,
    /// Seasons that did not exist before, in first-touch order.
    pub created: Vec<String>,
    /// Pre-existing seasons that received items, in first-touch order.
    pub appended: Vec<String>,
}

impl MergeOutcome {
    /// Every season touched by the batch.
    pub fn touched(&self) -> impl Iterator<Item = &str> {
        self.created
            .iter()
            .chain(self.appended.iter())
            .map(String::as_str)
    }
}

/// Merge `batch` into `collection`.
///
/// Each entry is appended to the season named by its `season_name`, creating
/// the season on first use. Seasons are then re-sorted chronologically (see
/// [`crate::season::SortKey`]) and every touched season is added to the
/// expansion set.
pub fn merge(
    collection: &Collection,
    expanded: &ExpandedSeasons,
    batch: &[BatchEntry],
) -> MergeOutcome {
    let mut seasons: Vec<Season> = collection.seasons().to_vec();
    let mut index: HashMap<String, usize> = seasons
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.clone(), i))
        .collect();

    let mut created: Vec<String> = Vec::new();
    let mut appended: Vec<String> = Vec::new();

    for entry in batch {
        let name = &entry.season_name;
        match index.get(name) {
            Some(&i) => {
                seasons[i].animes.push(entry.item.clone());
                if !created.contains(name) && !appended.contains(name) {
                    appended.push(name.clone());
                }
            }
            None => {
                let mut season = Season::new(name.clone());
                season.animes.push(entry.item.clone());
                index.insert(name.clone(), seasons.len());
                seasons.push(season);
                created.push(name.clone());
            }
        }
    }

    sort_seasons(&mut seasons);

    let mut expanded = expanded.clone();
    expanded.extend(created.iter().cloned());
    expanded.extend(appended.iter().cloned());

    if !batch.is_empty() {
        info!(
            items = batch.len(),
            created = created.len(),
            appended = appended.len(),
            "Merged batch into collection"
        );
    }

    MergeOutcome {
        collection: Collection::new(seasons),
        expanded,
        created,
        appended,
    }
}

/// Stable chronological sort of seasons by name.
pub fn sort_seasons(seasons: &mut [Season]) {
    seasons.sort_by_cached_key(|s| sort_key(&s.name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Item, PLACEHOLDER_IMAGE};
    use crate::season::UNCLASSIFIED;

    fn item(id: u64) -> Item {
        Item {
            id,
            anilist_id: 1000 + id,
            title: format!("Anime {id}"),
            image: PLACEHOLDER_IMAGE.into(),
            rating: 0,
            watched: false,
            rewatch_count: 0,
            tags: None,
            series_name: None,
            studios: None,
        }
    }

    fn entry(id: u64, season: &str) -> BatchEntry {
        BatchEntry {
            item: item(id),
            season_name: season.into(),
        }
    }

    fn season(name: &str, ids: &[u64]) -> Season {
        Season {
            name: name.into(),
            animes: ids.iter().map(|&id| item(id)).collect(),
        }
    }

    fn names(collection: &Collection) -> Vec<&str> {
        collection.seasons().iter().map(|s| s.name.as_str()).collect()
    }

    fn ids(season: &Season) -> Vec<u64> {
        season.animes.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_winter_plus_two_summer_items() {
        let collection = Collection::new(vec![season("2024年冬", &[5])]);
        let expanded = ExpandedSeasons::new();
        let batch = vec![entry(6, "2024年夏"), entry(7, "2024年夏")];

        let out = merge(&collection, &expanded, &batch);

        assert_eq!(names(&out.collection), vec!["2024年冬", "2024年夏"]);
        assert_eq!(ids(&out.collection.seasons()[0]), vec![5]);
        assert_eq!(ids(&out.collection.seasons()[1]), vec![6, 7]);
        assert!(out.expanded.contains("2024年夏"));
        assert_eq!(out.created, vec!["2024年夏"]);
        assert!(out.appended.is_empty());
    }

    #[test]
    fn test_new_season_created_once() {
        let batch = vec![entry(1, "2022年春"), entry(2, "2022年春"), entry(3, "2022年春")];
        let out = merge(&Collection::default(), &ExpandedSeasons::new(), &batch);
        assert_eq!(out.collection.seasons().len(), 1);
        assert_eq!(ids(&out.collection.seasons()[0]), vec![1, 2, 3]);
    }

    #[test]
    fn test_append_preserves_prior_order() {
        let collection = Collection::new(vec![season("2023年秋", &[4, 1, 3])]);
        let out = merge(&collection, &ExpandedSeasons::new(), &[entry(5, "2023年秋")]);
        assert_eq!(ids(&out.collection.seasons()[0]), vec![4, 1, 3, 5]);
        assert_eq!(out.appended, vec!["2023年秋"]);
        assert!(out.created.is_empty());
    }

    #[test]
    fn test_chronological_order_after_merge() {
        let collection = Collection::new(vec![
            season("2023年夏", &[1]),
            season("2024年秋", &[2]),
        ]);
        let batch = vec![
            entry(3, "2024年冬"),
            entry(4, "2021年秋"),
            entry(5, "2023年春"),
            entry(6, "2024年夏"),
        ];
        let out = merge(&collection, &ExpandedSeasons::new(), &batch);
        assert_eq!(
            names(&out.collection),
            vec!["2021年秋", "2023年春", "2023年夏", "2024年冬", "2024年夏", "2024年秋"]
        );

        let keys: Vec<_> = out
            .collection
            .seasons()
            .iter()
            .map(|s| sort_key(&s.name))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unclassified_always_last() {
        let collection = Collection::new(vec![season(UNCLASSIFIED, &[1])]);
        let batch = vec![entry(2, "2030年秋"), entry(3, "1990年冬")];
        let out = merge(&collection, &ExpandedSeasons::new(), &batch);
        assert_eq!(names(&out.collection), vec!["1990年冬", "2030年秋", UNCLASSIFIED]);

        let out = merge(&out.collection, &out.expanded, &[entry(4, UNCLASSIFIED)]);
        assert_eq!(out.collection.seasons().last().unwrap().name, UNCLASSIFIED);
        assert_eq!(ids(out.collection.seasons().last().unwrap()), vec![1, 4]);
    }

    #[test]
    fn test_custom_names_sort_between_dated_and_unclassified() {
        let collection = Collection::new(vec![
            season(UNCLASSIFIED, &[1]),
            season("Favorites", &[2]),
            season("2024年春", &[3]),
        ]);
        let out = merge(&collection, &ExpandedSeasons::new(), &[]);
        assert_eq!(names(&out.collection), vec!["2024年春", "Favorites", UNCLASSIFIED]);
    }

    #[test]
    fn test_expansion_only_grows() {
        let expanded: ExpandedSeasons =
            ["2020年冬".to_string(), "gone".to_string()].into_iter().collect();
        let collection = Collection::new(vec![season("2024年冬", &[1])]);
        let batch = vec![entry(2, "2024年冬"), entry(3, "2024年春")];

        let out = merge(&collection, &expanded, &batch);
        assert!(out.expanded.is_superset(&expanded));
        assert!(out.expanded.contains("2024年冬"));
        assert!(out.expanded.contains("2024年春"));
        assert_eq!(out.expanded.len(), 4);
    }

    #[test]
    fn test_inputs_untouched() {
        let collection = Collection::new(vec![season("2024年冬", &[1])]);
        let expanded = ExpandedSeasons::new();
        let before = (collection.clone(), expanded.clone());

        let _ = merge(&collection, &expanded, &[entry(2, "2024年冬"), entry(3, "2025年冬")]);
        assert_eq!((collection, expanded), before);
    }

    #[test]
    fn test_touched_lists_created_then_appended() {
        let collection = Collection::new(vec![season("2024年冬", &[1])]);
        let batch = vec![
            entry(2, "2024年冬"),
            entry(3, "2024年春"),
            entry(4, "2024年冬"),
            entry(5, "2024年春"),
        ];
        let out = merge(&collection, &ExpandedSeasons::new(), &batch);
        assert_eq!(out.created, vec!["2024年春"]);
        assert_eq!(out.appended, vec!["2024年冬"]);
        assert_eq!(out.touched().collect::<Vec<_>>(), vec!["2024年春", "2024年冬"]);
        assert_eq!(ids(out.collection.get("2024年春").unwrap()), vec![3, 5]);
    }

    #[test]
    fn test_empty_batch_is_identity_on_sorted_collection() {
        let collection = Collection::new(vec![season("2024年冬", &[1]), season("2024年夏", &[2])]);
        let expanded: ExpandedSeasons = ["2024年冬".to_string()].into_iter().collect();
        let out = merge(&collection, &expanded, &[]);
        assert_eq!(out.collection, collection);
        assert_eq!(out.expanded, expanded);
    }
}

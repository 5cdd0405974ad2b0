use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Item;

/// Names of seasons the presentation layer should render expanded.
pub type ExpandedSeasons = BTreeSet<String>;

/// A named group of items ("season").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub name: String,
    /// Insertion order.
    pub animes: Vec<Item>,
}

impl Season {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animes: Vec::new(),
        }
    }
}

/// The ordered list of seasons.
///
/// Values are replaced wholesale by the merge engine rather than edited in
/// place, so the type only exposes read access plus construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    seasons: Vec<Season>,
}

impl Collection {
    pub fn new(seasons: Vec<Season>) -> Self {
        Self { seasons }
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    pub fn get(&self, name: &str) -> Option<&Season> {
        self.seasons.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.seasons.iter().flat_map(|s| s.animes.iter())
    }

    pub fn item_count(&self) -> usize {
        self.seasons.iter().map(|s| s.animes.len()).sum()
    }

    /// Largest item id in the collection, or 0 when empty.
    pub fn max_item_id(&self) -> u64 {
        self.items().map(|item| item.id).max().unwrap_or(0)
    }
}

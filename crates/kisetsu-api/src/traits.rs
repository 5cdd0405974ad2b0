//! Trait definitions for the catalog search service and the remote store.
//!
//! The search client and the store client implement these traits so the
//! ingestion pipeline and the session can be tested against in-process fakes.

use std::future::Future;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// A title search service returning catalog candidates.
pub trait CatalogSearch: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search for anime by title.
    fn search_title(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CatalogRecord>, Self::Error>> + Send;

    /// List anime airing in the given season (first page, most popular first).
    fn search_season(
        &self,
        quarter: Quarter,
        year: u32,
    ) -> impl Future<Output = Result<Vec<CatalogRecord>, Self::Error>> + Send;
}

/// Errors that carry a short explanation fit to show the user.
pub trait Diagnostic {
    fn diagnostic(&self) -> String;
}

/// A per-user remote watchlist store.
pub trait RemoteStore: Send + Sync {
    type Error: std::error::Error + Diagnostic + Send + Sync + 'static;

    /// Insert all rows in one request. Returns the rows as stored.
    fn insert_rows(
        &self,
        rows: &[WatchlistRow],
    ) -> impl Future<Output = Result<Vec<WatchlistRow>, Self::Error>> + Send;

    /// Fetch every row belonging to `user_id`.
    fn fetch_rows(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<WatchlistRow>, Self::Error>> + Send;
}

/// Cover image variants, smallest to largest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImages {
    pub medium: Option<String>,
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

/// A search candidate as returned by the catalog service.
///
/// `season` keeps the raw service enum (`WINTER`, `SPRING`, ...) so that
/// malformed values can be detected downstream instead of being silently
/// dropped here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub service_id: u64,
    pub title_native: Option<String>,
    pub title_romaji: Option<String>,
    pub cover: CoverImages,
    pub season: Option<String>,
    pub year: Option<u32>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub episodes: Option<u32>,
    pub format: Option<String>,
}

impl CatalogRecord {
    /// Title used when listing search results.
    pub fn display_title(&self) -> &str {
        self.title_native
            .as_deref()
            .or(self.title_romaji.as_deref())
            .unwrap_or("")
    }
}

/// A page of season browse results.
#[derive(Debug, Clone)]
pub struct SeasonPage {
    pub items: Vec<CatalogRecord>,
    pub has_next: bool,
}

/// One row of the remote watchlist table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistRow {
    pub anilist_id: u64,
    pub title: String,
    pub image: String,
    pub rating: i32,
    pub watched: bool,
    pub rewatch_count: u32,
    pub tags: Option<Vec<String>>,
    pub series_name: Option<String>,
    pub studios: Option<Vec<String>>,
    pub season_name: String,
    pub user_id: String,
}

/// Release quarter of the year.
///
/// Variant order is chronological, so the derived `Ord` is the quarter rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Quarter {
    pub const ALL: &[Quarter] = &[Self::Winter, Self::Spring, Self::Summer, Self::Fall];

    /// Convert to AniList GraphQL `MediaSeason` enum value.
    pub fn to_anilist_str(self) -> &'static str {
        match self {
            Self::Winter => "WINTER",
            Self::Spring => "SPRING",
            Self::Summer => "SUMMER",
            Self::Fall => "FALL",
        }
    }

    /// Parse an AniList `MediaSeason` value. Unknown values yield `None`.
    pub fn from_anilist_str(s: &str) -> Option<Self> {
        match s {
            "WINTER" => Some(Self::Winter),
            "SPRING" => Some(Self::Spring),
            "SUMMER" => Some(Self::Summer),
            "FALL" => Some(Self::Fall),
            _ => None,
        }
    }

    /// Label used in season names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Winter => "冬",
            Self::Spring => "春",
            Self::Summer => "夏",
            Self::Fall => "秋",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|q| q.label() == s)
    }

    /// Ordinal within a year, winter first.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Determine the current quarter from the current month.
    pub fn current() -> Self {
        match chrono::Utc::now().month() {
            1..=3 => Self::Winter,
            4..=6 => Self::Spring,
            7..=9 => Self::Summer,
            _ => Self::Fall,
        }
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "Winter"),
            Self::Spring => write!(f, "Spring"),
            Self::Summer => write!(f, "Summer"),
            Self::Fall => write!(f, "Fall"),
        }
    }
}

impl std::str::FromStr for Quarter {
    type Err = String;

    /// Accepts the AniList enum, the English name, or the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::from_anilist_str(&upper)
            .or_else(|| Self::from_label(s.trim()))
            .ok_or_else(|| format!("unknown quarter: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_rank_is_chronological() {
        let ranks: Vec<u8> = Quarter::ALL.iter().map(|q| q.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
        assert!(Quarter::Winter < Quarter::Fall);
    }

    #[test]
    fn test_quarter_anilist_roundtrip() {
        for &q in Quarter::ALL {
            assert_eq!(Quarter::from_anilist_str(q.to_anilist_str()), Some(q));
        }
        assert_eq!(Quarter::from_anilist_str("AUTUMN"), None);
        assert_eq!(Quarter::from_anilist_str("winter"), None);
    }

    #[test]
    fn test_quarter_from_str() {
        assert_eq!("summer".parse::<Quarter>(), Ok(Quarter::Summer));
        assert_eq!("FALL".parse::<Quarter>(), Ok(Quarter::Fall));
        assert_eq!("春".parse::<Quarter>(), Ok(Quarter::Spring));
        assert!("monsoon".parse::<Quarter>().is_err());
    }

    #[test]
    fn test_display_title_prefers_native() {
        let record = CatalogRecord {
            title_native: Some("葬送のフリーレン".into()),
            title_romaji: Some("Sousou no Frieren".into()),
            ..Default::default()
        };
        assert_eq!(record.display_title(), "葬送のフリーレン");
        assert_eq!(CatalogRecord::default().display_title(), "");
    }
}

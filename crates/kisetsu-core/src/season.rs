//! Season names: resolution from release metadata and chronological ordering.
//!
//! Canonical names have the form `"<year>年<label>"` (e.g. `2024年夏`).
//! Records without a year or quarter go to [`UNCLASSIFIED`].

use std::fmt;

use kisetsu_api::traits::Quarter;

use crate::error::KisetsuError;

/// Name of the season holding items with no release period.
pub const UNCLASSIFIED: &str = "未分類";

/// The resolved season of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonKey {
    Dated { year: u32, quarter: Quarter },
    Unclassified,
}

impl SeasonKey {
    /// Parse a season name back into a key. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        if name == UNCLASSIFIED {
            return Some(Self::Unclassified);
        }
        let (year, label) = name.split_once('年')?;
        if year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self::Dated {
            year: year.parse().ok()?,
            quarter: Quarter::from_label(label)?,
        })
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SeasonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dated { year, quarter } => write!(f, "{year}年{}", quarter.label()),
            Self::Unclassified => f.write_str(UNCLASSIFIED),
        }
    }
}

/// Resolve the season for a record's release year and raw quarter enum.
///
/// Missing year or quarter resolves to [`SeasonKey::Unclassified`]. A quarter
/// outside the four service values is an [`KisetsuError::InvalidQuarter`].
pub fn resolve(year: Option<u32>, quarter: Option<&str>) -> Result<SeasonKey, KisetsuError> {
    match (year, quarter) {
        (Some(year), Some(raw)) => {
            let quarter = Quarter::from_anilist_str(raw)
                .ok_or_else(|| KisetsuError::InvalidQuarter(raw.to_string()))?;
            Ok(SeasonKey::Dated { year, quarter })
        }
        _ => Ok(SeasonKey::Unclassified),
    }
}

/// Sort position of a season name.
///
/// Canonical seasons come first by `(year, quarter rank)`, then names that
/// are neither canonical nor the sentinel, then [`UNCLASSIFIED`] last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Dated(u32, u8),
    Other,
    Unclassified,
}

pub fn sort_key(name: &str) -> SortKey {
    match SeasonKey::parse(name) {
        Some(SeasonKey::Dated { year, quarter }) => SortKey::Dated(year, quarter.rank()),
        Some(SeasonKey::Unclassified) => SortKey::Unclassified,
        None => SortKey::Other,
    }
}

//! Catalog lookups that never fail the caller.
//!
//! A search that cannot reach the service or parse its answer is logged and
//! treated as having no results.

use kisetsu_api::traits::{CatalogRecord, CatalogSearch, Quarter};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::KisetsuError;

/// Search by title; errors yield an empty list.
pub async fn search_title<C: CatalogSearch>(client: &C, query: &str) -> Vec<CatalogRecord> {
    let query = normalize_query(query);
    if query.is_empty() {
        return Vec::new();
    }
    recover(client.search_title(&query).await, &query)
}

/// NFKC-fold the query (fullwidth letters and spaces become ASCII) and trim it.
pub fn normalize_query(query: &str) -> String {
    query.nfkc().collect::<String>().trim().to_string()
}

/// Search by release period; errors yield an empty list.
pub async fn search_season<C: CatalogSearch>(
    client: &C,
    quarter: Quarter,
    year: u32,
) -> Vec<CatalogRecord> {
    let label = format!("{year} {quarter}");
    recover(client.search_season(quarter, year).await, &label)
}

fn recover<E: std::error::Error>(
    result: Result<Vec<CatalogRecord>, E>,
    query: &str,
) -> Vec<CatalogRecord> {
    match result {
        Ok(records) => {
            debug!(query, results = records.len(), "Catalog search complete");
            records
        }
        Err(e) => {
            let err = KisetsuError::SearchUnavailable(e.to_string());
            warn!(query, error = %err, "Catalog search failed, showing no results");
            Vec::new()
        }
    }
}

use std::time::Duration;

use reqwest::Client;

use super::error::AniListError;
use super::types::{AniListMedia, GraphQLResponse, PageResponse};
use crate::traits::{CatalogRecord, CatalogSearch, Quarter, SeasonPage};

pub const API_URL: &str = "https://graphql.anilist.co";

const DEFAULT_PER_PAGE: u32 = 20;

const SEARCH_QUERY: &str = r#"
query ($search: String, $perPage: Int) {
    Page(perPage: $perPage) {
        media(search: $search, type: ANIME) {
            id
            title { romaji native }
            episodes
            coverImage { medium large extraLarge }
            season
            seasonYear
            genres
            studios(isMain: true) { nodes { name } }
            format
        }
    }
}
"#;

const SEASON_BROWSE_QUERY: &str = r#"
query ($season: MediaSeason, $seasonYear: Int, $page: Int, $perPage: Int) {
    Page(page: $page, perPage: $perPage) {
        pageInfo { hasNextPage }
        media(season: $season, seasonYear: $seasonYear, type: ANIME, sort: POPULARITY_DESC) {
            id
            title { romaji native }
            episodes
            coverImage { medium large extraLarge }
            season
            seasonYear
            genres
            studios(isMain: true) { nodes { name } }
            format
        }
    }
}
"#;

/// AniList GraphQL API client. Catalog queries need no authentication.
#[derive(Debug, Clone)]
pub struct AniListClient {
    endpoint: String,
    per_page: u32,
    http: Client,
}

impl Default for AniListClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AniListClient {
    pub fn new() -> Self {
        Self {
            endpoint: API_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            http: Client::new(),
        }
    }

    /// Build a client against a specific endpoint with a request timeout.
    pub fn with_settings(
        endpoint: impl Into<String>,
        per_page: u32,
        timeout: Duration,
    ) -> Result<Self, AniListError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kisetsu/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            per_page: per_page.max(1),
            http,
        })
    }

    async fn graphql_request<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AniListError> {
        tracing::debug!(operation, "AniList GraphQL request");

        let resp = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status_code, "AniList API error");
            return Err(AniListError::Api {
                status: status_code,
                message: body,
            });
        }

        tracing::debug!(operation, status = %status, "AniList response received");
        let envelope = resp
            .json::<GraphQLResponse<T>>()
            .await
            .map_err(|e| AniListError::Parse(e.to_string()))?;
        envelope.into_data().map_err(AniListError::GraphQL)
    }

    async fn search_raw(&self, query: &str) -> Result<Vec<AniListMedia>, AniListError> {
        let resp: PageResponse = self
            .graphql_request(
                "Search",
                SEARCH_QUERY,
                serde_json::json!({ "search": query, "perPage": self.per_page }),
            )
            .await?;
        Ok(resp.page.media)
    }

    /// Browse one page of a season's anime, most popular first.
    pub async fn browse_season(
        &self,
        quarter: Quarter,
        year: u32,
        page: u32,
    ) -> Result<SeasonPage, AniListError> {
        let resp: PageResponse = self
            .graphql_request(
                "SeasonBrowse",
                SEASON_BROWSE_QUERY,
                serde_json::json!({
                    "season": quarter.to_anilist_str(),
                    "seasonYear": year,
                    "page": page,
                    "perPage": self.per_page,
                }),
            )
            .await?;

        let has_next = resp
            .page
            .page_info
            .as_ref()
            .is_some_and(|info| info.has_next_page);
        let items = resp
            .page
            .media
            .into_iter()
            .map(AniListMedia::into_record)
            .collect();

        Ok(SeasonPage { items, has_next })
    }
}

impl CatalogSearch for AniListClient {
    type Error = AniListError;

    async fn search_title(&self, query: &str) -> Result<Vec<CatalogRecord>, AniListError> {
        let media = self.search_raw(query).await?;
        Ok(media.into_iter().map(AniListMedia::into_record).collect())
    }

    async fn search_season(
        &self,
        quarter: Quarter,
        year: u32,
    ) -> Result<Vec<CatalogRecord>, AniListError> {
        Ok(self.browse_season(quarter, year, 1).await?.items)
    }
}

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use url::Url;

use super::error::StoreError;
use crate::traits::{RemoteStore, WatchlistRow};

pub const DEFAULT_TABLE: &str = "anime_list";

/// PostgREST client for the remote watchlist table.
///
/// Requests carry the project `apikey`; the bearer token is the signed-in
/// user's access token when one is set, so row-level security applies.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: Url,
    api_key: String,
    access_token: Option<String>,
    table: String,
    http: Client,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("kisetsu/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: normalize_base(base_url)?,
            api_key: api_key.into(),
            access_token: None,
            table: DEFAULT_TABLE.to_string(),
            http,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn table_url(&self) -> Result<Url, StoreError> {
        Ok(self.base_url.join(&format!("rest/v1/{}", self.table))?)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Accept", "application/json")
    }

    async fn read_rows(
        operation: &str,
        resp: Response,
    ) -> Result<Vec<WatchlistRow>, StoreError> {
        let status = resp.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status_code, "store API error");
            return Err(StoreError::from_response(status_code, &body));
        }

        tracing::debug!(operation, status = %status, "store response received");
        resp.json::<Vec<WatchlistRow>>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))
    }
}

impl RemoteStore for SupabaseClient {
    type Error = StoreError;

    async fn insert_rows(&self, rows: &[WatchlistRow]) -> Result<Vec<WatchlistRow>, StoreError> {
        let url = self.table_url()?;
        tracing::debug!(table = %self.table, rows = rows.len(), "inserting rows");

        let resp = self
            .authorized(self.http.post(url))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;
        Self::read_rows("Insert", resp).await
    }

    async fn fetch_rows(&self, user_id: &str) -> Result<Vec<WatchlistRow>, StoreError> {
        let url = self.table_url()?;
        tracing::debug!(table = %self.table, user_id, "fetching rows");

        let resp = self
            .authorized(self.http.get(url))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ])
            .send()
            .await?;
        Self::read_rows("Fetch", resp).await
    }
}

/// Ensure the base URL ends in `/` so `join` appends instead of replacing.
fn normalize_base(base_url: &str) -> Result<Url, StoreError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    Ok(Url::parse(&format!("{trimmed}/"))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let client = SupabaseClient::new("https://abc.supabase.co", "key").unwrap();
        assert_eq!(
            client.table_url().unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/anime_list"
        );

        let client = SupabaseClient::new("https://example.com/proxy/", "key")
            .unwrap()
            .with_table("watchlist");
        assert_eq!(
            client.table_url().unwrap().as_str(),
            "https://example.com/proxy/rest/v1/watchlist"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = SupabaseClient::new("not a url", "key").unwrap_err();
        assert!(matches!(err, StoreError::Url(_)));
    }

    #[test]
    fn test_row_serializes_with_column_names() {
        let row = WatchlistRow {
            anilist_id: 154587,
            title: "葬送のフリーレン".into(),
            image: "placeholder".into(),
            rating: 0,
            watched: false,
            rewatch_count: 0,
            tags: Some(vec!["fantasy".into()]),
            series_name: None,
            studios: Some(vec!["Madhouse".into()]),
            season_name: "2023年秋".into(),
            user_id: "user-1".into(),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["anilist_id"], 154587);
        assert_eq!(value["season_name"], "2023年秋");
        assert_eq!(value["rewatch_count"], 0);
        assert!(value["series_name"].is_null());
    }

    #[test]
    fn test_row_deserializes_ignoring_extra_columns() {
        let json = r#"[{
            "id": 99,
            "created_at": "2024-01-01T00:00:00Z",
            "anilist_id": 1,
            "title": "A",
            "image": "placeholder",
            "rating": 4,
            "watched": true,
            "rewatch_count": 2,
            "tags": null,
            "series_name": "A",
            "studios": null,
            "season_name": "未分類",
            "user_id": "u"
        }]"#;
        let rows: Vec<WatchlistRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].rating, 4);
        assert!(rows[0].watched);
        assert_eq!(rows[0].season_name, "未分類");
    }
}

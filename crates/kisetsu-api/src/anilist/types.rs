use serde::Deserialize;

use crate::traits::{CatalogRecord, CoverImages};

// ── GraphQL response wrappers ────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

impl<T> GraphQLResponse<T> {
    /// Collapse into the payload, turning a `data`-less response into an error
    /// carrying the joined GraphQL error messages.
    pub fn into_data(self) -> Result<T, String> {
        match self.data {
            Some(data) => Ok(data),
            None if self.errors.is_empty() => Err("response contained no data".into()),
            None => Err(self
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ")),
        }
    }
}

// ── Search / season queries ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageResponse {
    #[serde(rename = "Page")]
    pub page: PageData,
}

#[derive(Debug, Deserialize)]
pub struct PageData {
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
    pub media: Vec<AniListMedia>,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub struct AniListMedia {
    pub id: u64,
    pub title: Option<AniListTitle>,
    pub episodes: Option<u32>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
    pub season: Option<String>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<u32>,
    pub genres: Option<Vec<String>>,
    pub studios: Option<StudioConnection>,
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverImage {
    pub medium: Option<String>,
    pub large: Option<String>,
    #[serde(rename = "extraLarge")]
    pub extra_large: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StudioConnection {
    pub nodes: Option<Vec<StudioNode>>,
}

#[derive(Debug, Deserialize)]
pub struct StudioNode {
    pub name: String,
}

// ── Conversions ──────────────────────────────────────────────────

impl AniListMedia {
    pub fn into_record(self) -> CatalogRecord {
        let (title_native, title_romaji) = match self.title {
            Some(t) => (t.native, t.romaji),
            None => (None, None),
        };
        let cover = self
            .cover_image
            .map(|c| CoverImages {
                medium: c.medium,
                large: c.large,
                extra_large: c.extra_large,
            })
            .unwrap_or_default();
        let studios = self
            .studios
            .and_then(|s| s.nodes)
            .unwrap_or_default()
            .into_iter()
            .map(|n| n.name)
            .collect();

        CatalogRecord {
            service_id: self.id,
            title_native,
            title_romaji,
            cover,
            season: self.season,
            year: self.season_year,
            genres: self.genres.unwrap_or_default(),
            studios,
            episodes: self.episodes,
            format: self.format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_search_response() {
        let json = r#"{
            "data": {
                "Page": {
                    "media": [
                        {
                            "id": 154587,
                            "title": {
                                "romaji": "Sousou no Frieren",
                                "native": "葬送のフリーレン"
                            },
                            "episodes": 28,
                            "coverImage": {
                                "medium": "https://s4.anilist.co/file/anilistcdn/media/anime/cover/small/154587.jpg",
                                "large": "https://s4.anilist.co/file/anilistcdn/media/anime/cover/medium/154587.jpg",
                                "extraLarge": "https://s4.anilist.co/file/anilistcdn/media/anime/cover/large/154587.jpg"
                            },
                            "season": "FALL",
                            "seasonYear": 2023,
                            "genres": ["Adventure", "Drama", "Fantasy"],
                            "studios": { "nodes": [{ "name": "Madhouse" }] },
                            "format": "TV"
                        }
                    ]
                }
            }
        }"#;

        let resp: GraphQLResponse<PageResponse> = serde_json::from_str(json).unwrap();
        let page = resp.into_data().unwrap().page;
        assert!(page.page_info.is_none());
        assert_eq!(page.media.len(), 1);

        let record = page.media.into_iter().next().unwrap().into_record();
        assert_eq!(record.service_id, 154587);
        assert_eq!(record.title_native.as_deref(), Some("葬送のフリーレン"));
        assert_eq!(record.title_romaji.as_deref(), Some("Sousou no Frieren"));
        assert!(record.cover.extra_large.as_deref().unwrap().ends_with("large/154587.jpg"));
        assert_eq!(record.season.as_deref(), Some("FALL"));
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.genres, vec!["Adventure", "Drama", "Fantasy"]);
        assert_eq!(record.studios, vec!["Madhouse"]);
        assert_eq!(record.episodes, Some(28));
        assert_eq!(record.format.as_deref(), Some("TV"));
    }

    #[test]
    fn test_deserialize_season_page() {
        let json = r#"{
            "data": {
                "Page": {
                    "pageInfo": { "hasNextPage": true },
                    "media": [{ "id": 1, "title": { "romaji": "A" } }]
                }
            }
        }"#;
        let resp: GraphQLResponse<PageResponse> = serde_json::from_str(json).unwrap();
        let page = resp.into_data().unwrap().page;
        assert!(page.page_info.unwrap().has_next_page);
    }

    #[test]
    fn test_deserialize_minimal_media() {
        let json = r#"{ "id": 1, "title": null, "studios": { "nodes": null } }"#;
        let media: AniListMedia = serde_json::from_str(json).unwrap();
        let record = media.into_record();
        assert_eq!(record.service_id, 1);
        assert!(record.title_native.is_none());
        assert!(record.title_romaji.is_none());
        assert_eq!(record.cover, CoverImages::default());
        assert!(record.genres.is_empty());
        assert!(record.studios.is_empty());
    }

    #[test]
    fn test_graphql_errors_without_data() {
        let json = r#"{
            "data": null,
            "errors": [
                { "message": "Too Many Requests." },
                { "message": "Try again later" }
            ]
        }"#;
        let resp: GraphQLResponse<PageResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(resp.into_data().unwrap_err(), "Too Many Requests.; Try again later");
    }
}

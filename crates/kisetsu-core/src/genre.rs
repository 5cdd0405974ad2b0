//! Genre translation and tag derivation.

use phf::phf_map;

/// Maximum number of tags derived from a record's genres.
pub const MAX_TAGS: usize = 3;

/// AniList genre → display label.
static GENRE_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "Action" => "アクション",
    "Adventure" => "冒険",
    "Comedy" => "コメディ",
    "Drama" => "ドラマ",
    "Ecchi" => "エッチ",
    "Fantasy" => "ファンタジー",
    "Hentai" => "成人向け",
    "Horror" => "ホラー",
    "Mahou Shoujo" => "魔法少女",
    "Mecha" => "ロボット",
    "Music" => "音楽",
    "Mystery" => "ミステリー",
    "Psychological" => "心理",
    "Romance" => "恋愛",
    "Sci-Fi" => "SF",
    "Slice of Life" => "日常",
    "Sports" => "スポーツ",
    "Supernatural" => "超常現象",
    "Thriller" => "サスペンス",
};

/// A tag users can filter by: canonical value plus display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDefinition {
    pub value: &'static str,
    pub label: &'static str,
}

/// Known tags. Labels without a definition are kept verbatim.
pub const TAG_DEFINITIONS: &[TagDefinition] = &[
    TagDefinition { value: "action", label: "アクション" },
    TagDefinition { value: "adventure", label: "冒険" },
    TagDefinition { value: "comedy", label: "コメディ" },
    TagDefinition { value: "drama", label: "ドラマ" },
    TagDefinition { value: "fantasy", label: "ファンタジー" },
    TagDefinition { value: "horror", label: "ホラー" },
    TagDefinition { value: "mecha", label: "ロボット" },
    TagDefinition { value: "music", label: "音楽" },
    TagDefinition { value: "mystery", label: "ミステリー" },
    TagDefinition { value: "romance", label: "恋愛" },
    TagDefinition { value: "sci-fi", label: "SF" },
    TagDefinition { value: "slice-of-life", label: "日常" },
    TagDefinition { value: "sports", label: "スポーツ" },
];

/// Translate a service genre. Unknown genres pass through unchanged.
pub fn translate_genre(genre: &str) -> &str {
    GENRE_LABELS.get(genre).copied().unwrap_or(genre)
}

/// Look up the tag definition whose label matches.
pub fn find_tag(label: &str) -> Option<&'static TagDefinition> {
    TAG_DEFINITIONS.iter().find(|t| t.label == label)
}

/// Derive at most [`MAX_TAGS`] tags from a genre list, keeping genre order.
pub fn derive_tags(genres: &[String]) -> Option<Vec<String>> {
    let tags: Vec<String> = genres
        .iter()
        .map(|genre| {
            let label = translate_genre(genre);
            match find_tag(label) {
                Some(tag) => tag.value.to_string(),
                None => label.to_string(),
            }
        })
        .take(MAX_TAGS)
        .collect();

    if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}

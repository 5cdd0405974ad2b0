use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::KisetsuError;
use crate::models::{Collection, ExpandedSeasons, Item, Season};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_initial.sql");

/// The persisted local state: collection plus expansion set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub collection: Collection,
    pub expanded: ExpandedSeasons,
}

/// SQLite-backed storage for the local collection.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, KisetsuError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, KisetsuError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Load the stored collection in its saved order.
    pub fn load_snapshot(&self) -> Result<Snapshot, KisetsuError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM season ORDER BY position")?;
        let mut seasons: Vec<Season> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(Season::new)
            .collect();
        let index: HashMap<String, usize> = seasons
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), i))
            .collect();

        let mut stmt = self.conn.prepare(
            "SELECT season_name, id, anilist_id, title, image, rating, watched,
                    rewatch_count, tags, series_name, studios
             FROM item ORDER BY season_name, position",
        )?;
        let rows = stmt.query_map([], |row| {
            let season: String = row.get(0)?;
            Ok((season, row_to_item(row)?))
        })?;
        for row in rows {
            let (season, item) = row?;
            if let Some(&i) = index.get(&season) {
                seasons[i].animes.push(item);
            }
        }

        let mut stmt = self.conn.prepare("SELECT name FROM expanded_season")?;
        let expanded = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<ExpandedSeasons, _>>()?;

        Ok(Snapshot {
            collection: Collection::new(seasons),
            expanded,
        })
    }

    /// Replace the stored state with the given collection and expansion set.
    pub fn save_snapshot(
        &self,
        collection: &Collection,
        expanded: &ExpandedSeasons,
    ) -> Result<(), KisetsuError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM item; DELETE FROM season; DELETE FROM expanded_season;")?;

        {
            let mut insert_season =
                tx.prepare("INSERT INTO season (name, position) VALUES (?1, ?2)")?;
            let mut insert_item = tx.prepare(
                "INSERT INTO item (id, anilist_id, season_name, position, title, image,
                 rating, watched, rewatch_count, tags, series_name, studios)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for (position, season) in collection.seasons().iter().enumerate() {
                insert_season.execute(params![season.name, position as i64])?;
                for (item_pos, item) in season.animes.iter().enumerate() {
                    insert_item.execute(params![
                        item.id as i64,
                        item.anilist_id as i64,
                        season.name,
                        item_pos as i64,
                        item.title,
                        item.image,
                        item.rating,
                        item.watched,
                        item.rewatch_count,
                        to_json(&item.tags),
                        item.series_name,
                        to_json(&item.studios),
                    ])?;
                }
            }

            let mut insert_expanded =
                tx.prepare("INSERT INTO expanded_season (name) VALUES (?1)")?;
            for name in expanded {
                insert_expanded.execute(params![name])?;
            }
        }

        tx.commit()?;
        tracing::debug!(
            seasons = collection.seasons().len(),
            items = collection.item_count(),
            "Saved collection snapshot"
        );
        Ok(())
    }
}

/// Run all pending migrations based on `PRAGMA user_version`.
fn run_migrations(conn: &Connection) -> Result<(), KisetsuError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────

fn to_json(list: &Option<Vec<String>>) -> Option<String> {
    list.as_ref()
        .map(|v| serde_json::to_string(v).unwrap_or_default())
}

fn from_json(text: Option<String>) -> Option<Vec<String>> {
    text.and_then(|s| serde_json::from_str(&s).ok())
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get::<_, i64>(1)? as u64,
        anilist_id: row.get::<_, i64>(2)? as u64,
        title: row.get(3)?,
        image: row.get(4)?,
        rating: row.get(5)?,
        watched: row.get(6)?,
        rewatch_count: row.get(7)?,
        tags: from_json(row.get(8)?),
        series_name: row.get(9)?,
        studios: from_json(row.get(10)?),
    })
}

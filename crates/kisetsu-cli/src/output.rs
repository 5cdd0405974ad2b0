//! Plain-text rendering for the terminal.

use kisetsu_api::traits::{CatalogRecord, WatchlistRow};
use kisetsu_core::merge::MergeOutcome;
use kisetsu_core::models::{Collection, ExpandedSeasons, Item};
use kisetsu_core::normalize;
use kisetsu_core::sync::{SkipReason, SyncOutcome};
use kisetsu_runtime::Submission;

pub fn print_results(results: &[CatalogRecord]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }
    for (i, record) in results.iter().enumerate() {
        let season = normalize::resolve_season(record);
        let mut line = format!("{:>3}. {} [{}]", i + 1, record.display_title(), season);
        if let Some(format) = &record.format {
            line.push_str(&format!(" {format}"));
        }
        if let Some(episodes) = record.episodes {
            line.push_str(&format!(" {episodes}話"));
        }
        println!("{line}");
    }
}

pub fn print_submission(submission: &Submission) {
    for line in season_lines(&submission.merge) {
        println!("{line}");
    }

    match &submission.sync {
        SyncOutcome::Synced { rows } => println!("Saved {rows} item(s) to watchlist."),
        SyncOutcome::Skipped(SkipReason::NotSignedIn) => {
            println!("Not signed in; kept locally only.")
        }
        SyncOutcome::Skipped(SkipReason::RemoteDisabled) => {
            println!("Remote watchlist disabled; kept locally only.")
        }
        SyncOutcome::Skipped(SkipReason::EmptyBatch) => println!("Nothing to add."),
        // Reported by the caller.
        SyncOutcome::Failed { .. } => {}
    }
}

/// One line per season the merge touched, new seasons first.
fn season_lines(merge: &MergeOutcome) -> Vec<String> {
    merge
        .touched()
        .map(|name| {
            if merge.created.iter().any(|c| c == name) {
                format!("New season: {name}")
            } else {
                format!("Added to: {name}")
            }
        })
        .collect()
}

pub fn print_collection(collection: &Collection, expanded: &ExpandedSeasons, all: bool) {
    if collection.is_empty() {
        println!("Collection is empty.");
        return;
    }
    for season in collection.seasons() {
        let open = all || expanded.contains(&season.name);
        let marker = if open { "▼" } else { "▶" };
        println!("{marker} {} ({})", season.name, season.animes.len());
        if open {
            for item in &season.animes {
                println!("    {}", item_line(item));
            }
        }
    }
}

pub fn print_watchlist(rows: &[WatchlistRow]) {
    if rows.is_empty() {
        println!("Watchlist is empty.");
        return;
    }
    for row in rows {
        println!("{} [{}]", row.title, row.season_name);
    }
}

fn item_line(item: &Item) -> String {
    let mut line = format!("#{} {}", item.id, item.title);
    if let Some(series) = &item.series_name {
        line.push_str(&format!(" ({series})"));
    }
    if let Some(tags) = &item.tags {
        line.push_str(&format!(" {}", tags.join(", ")));
    }
    if item.watched {
        line.push_str(" ✓");
    }
    line
}

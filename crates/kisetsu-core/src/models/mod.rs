mod collection;
mod item;

pub use collection::{Collection, ExpandedSeasons, Season};
pub use item::{BatchEntry, Item, UserSession, PLACEHOLDER_IMAGE};

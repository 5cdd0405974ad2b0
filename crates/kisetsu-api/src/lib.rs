//! Clients for the external services kisetsu talks to: the AniList catalog
//! search API and the PostgREST-backed remote watchlist store.

pub mod anilist;
pub mod supabase;
pub mod traits;

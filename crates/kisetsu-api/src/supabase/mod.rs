pub mod client;
pub mod error;

pub use client::SupabaseClient;
pub use error::StoreError;

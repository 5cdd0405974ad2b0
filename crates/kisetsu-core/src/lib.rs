pub mod catalog;
pub mod config;
pub mod error;
pub mod genre;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod season;
pub mod series;
pub mod storage;
pub mod sync;

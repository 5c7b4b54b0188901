//! Application services: cached aggregates, player lookups and bulk import.

pub mod error;
pub mod import;
pub mod pagination;
pub mod players;
pub mod repos;
pub mod stats;

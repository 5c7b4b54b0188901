//! Chess player statistics service.
//!
//! Loads FIDE rating-list exports into Postgres and serves player lookups plus
//! cached aggregate statistics over HTTP.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

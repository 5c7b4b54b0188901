//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::PageRequest;
use crate::domain::entities::PlayerRecord;
use crate::domain::types::{FederationCode, RatingFloor, Title, TopLimit};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
    #[error("database unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerQueryFilter {
    /// Case-insensitive substring of the player name.
    pub name: Option<String>,
    pub federation: Option<FederationCode>,
    pub min_rating: Option<RatingFloor>,
    pub title: Option<Title>,
}

/// One entry of a rating-ordered ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPlayerRow {
    pub name: String,
    pub rating: i32,
    pub title: Option<String>,
}

/// Raw counts behind a federation summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FederationSummaryRow {
    /// Rows of the federation whose standard rating is not null.
    pub total_players: i64,
    /// Mean of non-null, non-zero standard ratings; `None` when there are none.
    pub avg_rating: Option<f64>,
    /// Rows counted in `total_players` that carry a title.
    pub titled_players: i64,
}

/// Player count for one width-100 standard-rating bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBucketRow {
    pub floor: i32,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCountRow {
    pub federation: Option<String>,
    pub title: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerWriteOptions {
    /// Empty the table before writing.
    pub replace: bool,
    /// Rows per INSERT statement.
    pub batch_size: usize,
}

#[async_trait]
pub trait PlayersRepo: Send + Sync {
    async fn find_by_fide_id(&self, fide_id: i64) -> Result<Option<PlayerRecord>, RepoError>;

    /// Players matching `filter`, ordered by FIDE id.
    async fn search(
        &self,
        filter: &PlayerQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<PlayerRecord>, RepoError>;

    /// Players of `federation` with a positive standard rating, highest first.
    async fn top_rated(
        &self,
        federation: &FederationCode,
        limit: TopLimit,
    ) -> Result<Vec<RankedPlayerRow>, RepoError>;

    async fn federation_summary(
        &self,
        federation: &FederationCode,
    ) -> Result<FederationSummaryRow, RepoError>;

    /// Bins over positive standard ratings, ordered by floor.
    async fn rating_buckets(
        &self,
        federation: Option<&FederationCode>,
    ) -> Result<Vec<RatingBucketRow>, RepoError>;

    /// Counts per (federation, title) over rows with a non-empty title.
    async fn title_counts(&self) -> Result<Vec<TitleCountRow>, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PlayersWriteRepo: Send + Sync {
    /// Persist `players` atomically, returning the number of rows written.
    async fn write_players(
        &self,
        players: &[PlayerRecord],
        options: PlayerWriteOptions,
    ) -> Result<u64, RepoError>;
}

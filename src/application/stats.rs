//! Cached aggregate queries over the player table.
//!
//! Every public method follows the same read-through sequence: build the
//! normalized [`StatsKey`], serve a fresh cache entry if one exists, otherwise
//! query the repository, shape the rows, store the result and return it.
//! Results are handed out as `Arc`s so a cache hit returns the very value that
//! was stored.
//!
//! Two concurrent misses for the same key both query the store; whichever
//! finishes last overwrites the other's entry.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::repos::{
    FederationSummaryRow, PlayersRepo, RankedPlayerRow, RatingBucketRow, RepoError, TitleCountRow,
};
use crate::cache::{CacheConfig, Clock, StatsKey, TtlCache};
use crate::domain::types::{FederationCode, TopLimit};

pub const METRIC_CACHE_HIT: &str = "chess_stats_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "chess_stats_cache_miss_total";
pub const METRIC_AGGREGATE_COMPUTE_MS: &str = "chess_stats_aggregate_compute_ms";

/// Federation label used by the global rating histogram.
const ALL_FEDERATIONS: &str = "all";
/// Cross-tab bucket for titled players without a federation.
const UNKNOWN_FEDERATION: &str = "null";

pub type StatsCache = TtlCache<StatsKey, CachedAggregate>;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPlayer {
    pub name: String,
    pub rating: i32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopPlayers {
    pub federation: FederationCode,
    pub players: Vec<RankedPlayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FederationStats {
    pub federation: FederationCode,
    pub total_players: i64,
    pub avg_rating: f64,
    pub titled_players: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingBucket {
    /// Inclusive range such as `1400-1499`.
    pub rating_range: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingDistribution {
    /// Federation code, or `all` for the global histogram.
    pub federation: String,
    pub distribution: Vec<RatingBucket>,
}

/// Title counts keyed by federation, then by title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TitleCrossTab(pub BTreeMap<String, BTreeMap<String, i64>>);

impl TitleCrossTab {
    pub fn count(&self, federation: &str, title: &str) -> Option<i64> {
        self.0.get(federation)?.get(title).copied()
    }
}

/// Value stored in the aggregate cache.
#[derive(Debug, Clone)]
pub enum CachedAggregate {
    TopPlayers(Arc<TopPlayers>),
    FederationStats(Arc<FederationStats>),
    RatingDistribution(Arc<RatingDistribution>),
    TitledPlayers(Arc<TitleCrossTab>),
}

trait Aggregate: Sized + Send + Sync {
    fn into_cached(value: Arc<Self>) -> CachedAggregate;
    fn from_cached(cached: CachedAggregate) -> Option<Arc<Self>>;
}

macro_rules! impl_aggregate {
    ($ty:ty, $variant:ident) => {
        impl Aggregate for $ty {
            fn into_cached(value: Arc<Self>) -> CachedAggregate {
                CachedAggregate::$variant(value)
            }

            fn from_cached(cached: CachedAggregate) -> Option<Arc<Self>> {
                match cached {
                    CachedAggregate::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

impl_aggregate!(TopPlayers, TopPlayers);
impl_aggregate!(FederationStats, FederationStats);
impl_aggregate!(RatingDistribution, RatingDistribution);
impl_aggregate!(TitleCrossTab, TitledPlayers);

#[derive(Clone)]
pub struct StatsService {
    repo: Arc<dyn PlayersRepo>,
    cache: Option<Arc<StatsCache>>,
}

impl StatsService {
    /// Build a service around an existing cache; `None` disables caching.
    pub fn new(repo: Arc<dyn PlayersRepo>, cache: Option<Arc<StatsCache>>) -> Self {
        Self { repo, cache }
    }

    pub fn from_config(
        repo: Arc<dyn PlayersRepo>,
        config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = config
            .is_enabled()
            .then(|| Arc::new(StatsCache::new(config.ttl, clock)));
        Self::new(repo, cache)
    }

    pub fn cache(&self) -> Option<&Arc<StatsCache>> {
        self.cache.as_ref()
    }

    /// Highest-rated players of `federation`. Ties keep store order.
    pub async fn top_players(
        &self,
        federation: FederationCode,
        limit: TopLimit,
    ) -> Result<Arc<TopPlayers>, StatsError> {
        let key = StatsKey::TopPlayers {
            federation: federation.clone(),
            limit,
        };
        self.read_through(key, async {
            let rows = self.repo.top_rated(&federation, limit).await?;
            Ok(shape_top_players(federation, rows))
        })
        .await
    }

    pub async fn federation_stats(
        &self,
        federation: FederationCode,
    ) -> Result<Arc<FederationStats>, StatsError> {
        let key = StatsKey::FederationStats {
            federation: federation.clone(),
        };
        self.read_through(key, async {
            let row = self.repo.federation_summary(&federation).await?;
            Ok(shape_federation_stats(federation, row))
        })
        .await
    }

    /// Width-100 rating histogram, global when `federation` is `None`.
    pub async fn rating_distribution(
        &self,
        federation: Option<FederationCode>,
    ) -> Result<Arc<RatingDistribution>, StatsError> {
        let key = StatsKey::RatingDistribution {
            federation: federation.clone(),
        };
        self.read_through(key, async {
            let rows = self.repo.rating_buckets(federation.as_ref()).await?;
            Ok(shape_rating_distribution(federation.as_ref(), rows))
        })
        .await
    }

    pub async fn titled_players(&self) -> Result<Arc<TitleCrossTab>, StatsError> {
        self.read_through(StatsKey::TitledPlayers, async {
            let rows = self.repo.title_counts().await?;
            Ok(shape_title_cross_tab(rows))
        })
        .await
    }

    async fn read_through<T, F>(&self, key: StatsKey, compute: F) -> Result<Arc<T>, StatsError>
    where
        T: Aggregate,
        F: Future<Output = Result<T, RepoError>>,
    {
        let aggregate = key.aggregate();

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).and_then(T::from_cached) {
                counter!(METRIC_CACHE_HIT, "aggregate" => aggregate).increment(1);
                debug!(target = "chess_stats::stats", key = %key, "Aggregate cache hit");
                return Ok(hit);
            }
            counter!(METRIC_CACHE_MISS, "aggregate" => aggregate).increment(1);
            debug!(target = "chess_stats::stats", key = %key, "Aggregate cache miss");
        }

        let started_at = Instant::now();
        let value = match compute.await {
            Ok(value) => Arc::new(value),
            Err(err) => {
                warn!(
                    target = "chess_stats::stats",
                    key = %key,
                    error = %err,
                    "Aggregate query failed"
                );
                return Err(err.into());
            }
        };
        histogram!(METRIC_AGGREGATE_COMPUTE_MS, "aggregate" => aggregate)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        if let Some(cache) = &self.cache {
            cache.set(key, T::into_cached(Arc::clone(&value)));
        }
        Ok(value)
    }
}

fn shape_top_players(federation: FederationCode, rows: Vec<RankedPlayerRow>) -> TopPlayers {
    TopPlayers {
        federation,
        players: rows
            .into_iter()
            .map(|row| RankedPlayer {
                name: row.name,
                rating: row.rating,
                title: row.title,
            })
            .collect(),
    }
}

fn shape_federation_stats(federation: FederationCode, row: FederationSummaryRow) -> FederationStats {
    FederationStats {
        federation,
        total_players: row.total_players,
        avg_rating: round_to_cents(row.avg_rating.unwrap_or(0.0)),
        titled_players: row.titled_players,
    }
}

fn shape_rating_distribution(
    federation: Option<&FederationCode>,
    rows: Vec<RatingBucketRow>,
) -> RatingDistribution {
    RatingDistribution {
        federation: federation.map_or_else(|| ALL_FEDERATIONS.to_string(), ToString::to_string),
        distribution: rows
            .into_iter()
            .map(|row| RatingBucket {
                rating_range: format!("{}-{}", row.floor, row.floor + 99),
                count: row.count,
            })
            .collect(),
    }
}

fn shape_title_cross_tab(rows: Vec<TitleCountRow>) -> TitleCrossTab {
    let mut table: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for row in rows {
        let federation = row
            .federation
            .unwrap_or_else(|| UNKNOWN_FEDERATION.to_string());
        *table
            .entry(federation)
            .or_default()
            .entry(row.title)
            .or_default() += row.count;
    }
    TitleCrossTab(table)
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

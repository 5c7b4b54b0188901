#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use chess_stats::application::pagination::PageRequest;
use chess_stats::application::repos::{
    FederationSummaryRow, PlayerQueryFilter, PlayerWriteOptions, PlayersRepo, PlayersWriteRepo,
    RankedPlayerRow, RatingBucketRow, RepoError, TitleCountRow,
};
use chess_stats::domain::entities::{PlayerRecord, RatingLine};
use chess_stats::domain::types::{FederationCode, TopLimit};

/// In-memory player table that counts aggregate queries.
#[derive(Default)]
pub struct MemoryPlayers {
    players: Mutex<Vec<PlayerRecord>>,
    aggregate_queries: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryPlayers {
    pub fn with_players(players: Vec<PlayerRecord>) -> Self {
        Self {
            players: Mutex::new(players),
            ..Default::default()
        }
    }

    pub fn aggregate_queries(&self) -> usize {
        self.aggregate_queries.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn push(&self, player: PlayerRecord) {
        self.players.lock().expect("players lock").push(player);
    }

    pub fn snapshot(&self) -> Vec<PlayerRecord> {
        self.players.lock().expect("players lock").clone()
    }

    fn begin_aggregate(&self) -> Result<Vec<PlayerRecord>, RepoError> {
        self.aggregate_queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Timeout);
        }
        Ok(self.snapshot())
    }
}

fn in_federation(player: &PlayerRecord, federation: &FederationCode) -> bool {
    player.federation.as_deref() == Some(federation.as_str())
}

#[async_trait]
impl PlayersRepo for MemoryPlayers {
    async fn find_by_fide_id(&self, fide_id: i64) -> Result<Option<PlayerRecord>, RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("connection refused".into()));
        }
        Ok(self
            .snapshot()
            .into_iter()
            .find(|player| player.fide_id == fide_id))
    }

    async fn search(
        &self,
        filter: &PlayerQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<PlayerRecord>, RepoError> {
        let needle = filter.name.as_ref().map(|name| name.to_lowercase());
        let mut matches: Vec<PlayerRecord> = self
            .snapshot()
            .into_iter()
            .filter(|player| {
                needle
                    .as_ref()
                    .is_none_or(|needle| player.name.to_lowercase().contains(needle))
            })
            .filter(|player| {
                filter
                    .federation
                    .as_ref()
                    .is_none_or(|federation| in_federation(player, federation))
            })
            .filter(|player| {
                filter.min_rating.is_none_or(|floor| {
                    player
                        .standard
                        .rating
                        .is_some_and(|rating| rating >= floor.get())
                })
            })
            .filter(|player| {
                filter
                    .title
                    .as_ref()
                    .is_none_or(|title| player.title.as_deref() == Some(title.as_str()))
            })
            .collect();
        matches.sort_by_key(|player| player.fide_id);
        Ok(matches
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn top_rated(
        &self,
        federation: &FederationCode,
        limit: TopLimit,
    ) -> Result<Vec<RankedPlayerRow>, RepoError> {
        let mut rows: Vec<RankedPlayerRow> = self
            .begin_aggregate()?
            .into_iter()
            .filter(|player| in_federation(player, federation))
            .filter_map(|player| {
                player.standard.rated().map(|rating| RankedPlayerRow {
                    name: player.name,
                    rating,
                    title: player.title,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.rating.cmp(&a.rating));
        rows.truncate(limit.get() as usize);
        Ok(rows)
    }

    async fn federation_summary(
        &self,
        federation: &FederationCode,
    ) -> Result<FederationSummaryRow, RepoError> {
        let rows: Vec<PlayerRecord> = self
            .begin_aggregate()?
            .into_iter()
            .filter(|player| in_federation(player, federation) && player.standard.rating.is_some())
            .collect();
        let rated: Vec<i32> = rows.iter().filter_map(|p| p.standard.rated()).collect();
        let avg_rating = (!rated.is_empty())
            .then(|| rated.iter().map(|r| f64::from(*r)).sum::<f64>() / rated.len() as f64);
        Ok(FederationSummaryRow {
            total_players: rows.len() as i64,
            avg_rating,
            titled_players: rows.iter().filter(|p| p.title.is_some()).count() as i64,
        })
    }

    async fn rating_buckets(
        &self,
        federation: Option<&FederationCode>,
    ) -> Result<Vec<RatingBucketRow>, RepoError> {
        let mut bins: BTreeMap<i32, i64> = BTreeMap::new();
        for player in self.begin_aggregate()? {
            if federation.is_some_and(|federation| !in_federation(&player, federation)) {
                continue;
            }
            if let Some(rating) = player.standard.rated() {
                *bins.entry((rating / 100) * 100).or_default() += 1;
            }
        }
        Ok(bins
            .into_iter()
            .map(|(floor, count)| RatingBucketRow { floor, count })
            .collect())
    }

    async fn title_counts(&self) -> Result<Vec<TitleCountRow>, RepoError> {
        let mut counts: BTreeMap<(Option<String>, String), i64> = BTreeMap::new();
        for player in self.begin_aggregate()? {
            if let Some(title) = player.title.filter(|title| !title.is_empty()) {
                *counts.entry((player.federation, title)).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|((federation, title), count)| TitleCountRow {
                federation,
                title,
                count,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlayersWriteRepo for MemoryPlayers {
    async fn write_players(
        &self,
        players: &[PlayerRecord],
        options: PlayerWriteOptions,
    ) -> Result<u64, RepoError> {
        let mut table = self.players.lock().expect("players lock");
        if options.replace {
            table.clear();
        }
        for player in players {
            match table.iter_mut().find(|row| row.fide_id == player.fide_id) {
                Some(row) => *row = player.clone(),
                None => table.push(player.clone()),
            }
        }
        Ok(players.len() as u64)
    }
}

/// Player with only the fields aggregates look at.
pub fn player(
    fide_id: i64,
    name: &str,
    federation: Option<&str>,
    rating: Option<i32>,
    title: Option<&str>,
) -> PlayerRecord {
    PlayerRecord {
        fide_id,
        name: name.to_string(),
        federation: federation.map(str::to_string),
        sex: None,
        title: title.map(str::to_string),
        w_title: None,
        o_title: None,
        foa_title: None,
        standard: RatingLine {
            rating,
            games: None,
            k_factor: None,
        },
        rapid: RatingLine::default(),
        blitz: RatingLine::default(),
        birth_year: None,
        flag: None,
    }
}

pub fn fed(code: &str) -> FederationCode {
    FederationCode::parse(code).expect("valid federation")
}

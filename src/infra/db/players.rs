use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use crate::{
    application::pagination::PageRequest,
    application::repos::{
        FederationSummaryRow, PlayerQueryFilter, PlayerWriteOptions, PlayersRepo,
        PlayersWriteRepo, RankedPlayerRow, RatingBucketRow, RepoError, TitleCountRow,
    },
    domain::entities::{PlayerRecord, RatingLine},
    domain::types::{FederationCode, TopLimit},
};

use super::{PostgresRepositories, map_sqlx_error};

const PLAYER_COLUMNS: &str = "fide_id, name, federation, sex, title, w_title, o_title, foa_title, \
    standard_rating, standard_games, standard_k, \
    rapid_rating, rapid_games, rapid_k, \
    blitz_rating, blitz_games, blitz_k, \
    birth_year, flag";

#[derive(sqlx::FromRow)]
struct PlayerRow {
    fide_id: i64,
    name: String,
    federation: Option<String>,
    sex: Option<String>,
    title: Option<String>,
    w_title: Option<String>,
    o_title: Option<String>,
    foa_title: Option<String>,
    standard_rating: Option<i32>,
    standard_games: Option<i32>,
    standard_k: Option<i32>,
    rapid_rating: Option<i32>,
    rapid_games: Option<i32>,
    rapid_k: Option<i32>,
    blitz_rating: Option<i32>,
    blitz_games: Option<i32>,
    blitz_k: Option<i32>,
    birth_year: Option<i32>,
    flag: Option<String>,
}

impl From<PlayerRow> for PlayerRecord {
    fn from(row: PlayerRow) -> Self {
        Self {
            fide_id: row.fide_id,
            name: row.name,
            federation: row.federation,
            sex: row.sex,
            title: row.title,
            w_title: row.w_title,
            o_title: row.o_title,
            foa_title: row.foa_title,
            standard: RatingLine {
                rating: row.standard_rating,
                games: row.standard_games,
                k_factor: row.standard_k,
            },
            rapid: RatingLine {
                rating: row.rapid_rating,
                games: row.rapid_games,
                k_factor: row.rapid_k,
            },
            blitz: RatingLine {
                rating: row.blitz_rating,
                games: row.blitz_games,
                k_factor: row.blitz_k,
            },
            birth_year: row.birth_year,
            flag: row.flag,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RankedRow {
    name: String,
    rating: i32,
    title: Option<String>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    total_players: i64,
    avg_rating: Option<f64>,
    titled_players: i64,
}

#[derive(sqlx::FromRow)]
struct BucketRow {
    floor: i32,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct TitleRow {
    federation: Option<String>,
    title: String,
    count: i64,
}

impl PostgresRepositories {
    fn apply_player_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q PlayerQueryFilter) {
        if let Some(name) = filter.name.as_ref() {
            qb.push(" AND name ILIKE ");
            qb.push_bind(format!("%{name}%"));
        }
        if let Some(federation) = filter.federation.as_ref() {
            qb.push(" AND federation = ");
            qb.push_bind(federation.as_str());
        }
        if let Some(min_rating) = filter.min_rating {
            qb.push(" AND standard_rating >= ");
            qb.push_bind(min_rating.get());
        }
        if let Some(title) = filter.title.as_ref() {
            qb.push(" AND title = ");
            qb.push_bind(title.as_str());
        }
    }
}

#[async_trait]
impl PlayersRepo for PostgresRepositories {
    async fn find_by_fide_id(&self, fide_id: i64) -> Result<Option<PlayerRecord>, RepoError> {
        let sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE fide_id = $1");
        let row = sqlx::query_as::<_, PlayerRow>(&sql)
            .bind(fide_id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PlayerRecord::from))
    }

    async fn search(
        &self,
        filter: &PlayerQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<PlayerRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PLAYER_COLUMNS);
        qb.push(" FROM players WHERE 1 = 1");
        Self::apply_player_filter(&mut qb, filter);
        qb.push(" ORDER BY fide_id OFFSET ");
        qb.push_bind(i64::from(page.skip));
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(page.limit));

        let rows = qb
            .build_query_as::<PlayerRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PlayerRecord::from).collect())
    }

    async fn top_rated(
        &self,
        federation: &FederationCode,
        limit: TopLimit,
    ) -> Result<Vec<RankedPlayerRow>, RepoError> {
        let rows = sqlx::query_as::<_, RankedRow>(
            r#"
            SELECT name, standard_rating AS rating, title
            FROM players
            WHERE federation = $1
              AND standard_rating > 0
            ORDER BY standard_rating DESC
            LIMIT $2
            "#,
        )
        .bind(federation.as_str())
        .bind(i64::from(limit.get()))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| RankedPlayerRow {
                name: row.name,
                rating: row.rating,
                title: row.title,
            })
            .collect())
    }

    async fn federation_summary(
        &self,
        federation: &FederationCode,
    ) -> Result<FederationSummaryRow, RepoError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                COUNT(*) AS total_players,
                AVG(NULLIF(standard_rating, 0))::float8 AS avg_rating,
                COUNT(title) AS titled_players
            FROM players
            WHERE federation = $1
              AND standard_rating IS NOT NULL
            "#,
        )
        .bind(federation.as_str())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(FederationSummaryRow {
            total_players: row.total_players,
            avg_rating: row.avg_rating,
            titled_players: row.titled_players,
        })
    }

    async fn rating_buckets(
        &self,
        federation: Option<&FederationCode>,
    ) -> Result<Vec<RatingBucketRow>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT (standard_rating / 100) * 100 AS floor, COUNT(*) AS count \
             FROM players WHERE standard_rating > 0",
        );
        if let Some(federation) = federation {
            qb.push(" AND federation = ");
            qb.push_bind(federation.as_str());
        }
        qb.push(" GROUP BY 1 ORDER BY 1");

        let rows = qb
            .build_query_as::<BucketRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| RatingBucketRow {
                floor: row.floor,
                count: row.count,
            })
            .collect())
    }

    async fn title_counts(&self) -> Result<Vec<TitleCountRow>, RepoError> {
        let rows = sqlx::query_as::<_, TitleRow>(
            r#"
            SELECT federation, title, COUNT(*) AS count
            FROM players
            WHERE title IS NOT NULL
              AND title <> ''
            GROUP BY federation, title
            ORDER BY federation, title
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| TitleCountRow {
                federation: row.federation,
                title: row.title,
                count: row.count,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        PostgresRepositories::health_check(self)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl PlayersWriteRepo for PostgresRepositories {
    async fn write_players(
        &self,
        players: &[PlayerRecord],
        options: PlayerWriteOptions,
    ) -> Result<u64, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        if options.replace {
            sqlx::query("TRUNCATE TABLE players RESTART IDENTITY")
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        let mut written = 0;
        for (batch_index, batch) in players.chunks(options.batch_size.max(1)).enumerate() {
            let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO players (");
            qb.push(PLAYER_COLUMNS);
            qb.push(") ");
            qb.push_values(batch, |mut row, player| {
                row.push_bind(player.fide_id)
                    .push_bind(&player.name)
                    .push_bind(&player.federation)
                    .push_bind(&player.sex)
                    .push_bind(&player.title)
                    .push_bind(&player.w_title)
                    .push_bind(&player.o_title)
                    .push_bind(&player.foa_title)
                    .push_bind(player.standard.rating)
                    .push_bind(player.standard.games)
                    .push_bind(player.standard.k_factor)
                    .push_bind(player.rapid.rating)
                    .push_bind(player.rapid.games)
                    .push_bind(player.rapid.k_factor)
                    .push_bind(player.blitz.rating)
                    .push_bind(player.blitz.games)
                    .push_bind(player.blitz.k_factor)
                    .push_bind(player.birth_year)
                    .push_bind(&player.flag);
            });
            qb.push(
                " ON CONFLICT (fide_id) DO UPDATE SET \
                 name = EXCLUDED.name, federation = EXCLUDED.federation, \
                 sex = EXCLUDED.sex, title = EXCLUDED.title, \
                 w_title = EXCLUDED.w_title, o_title = EXCLUDED.o_title, \
                 foa_title = EXCLUDED.foa_title, \
                 standard_rating = EXCLUDED.standard_rating, \
                 standard_games = EXCLUDED.standard_games, \
                 standard_k = EXCLUDED.standard_k, \
                 rapid_rating = EXCLUDED.rapid_rating, \
                 rapid_games = EXCLUDED.rapid_games, rapid_k = EXCLUDED.rapid_k, \
                 blitz_rating = EXCLUDED.blitz_rating, \
                 blitz_games = EXCLUDED.blitz_games, blitz_k = EXCLUDED.blitz_k, \
                 birth_year = EXCLUDED.birth_year, flag = EXCLUDED.flag",
            );

            let result = qb
                .build()
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            written += result.rows_affected();

            if (batch_index + 1) % 100 == 0 {
                info!(
                    target = "chess_stats::infra::db::players",
                    written, "Wrote player batches"
                );
            }
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(written)
    }
}

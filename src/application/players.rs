//! Player lookup and search. These reads go straight to the store.

use std::sync::Arc;

use thiserror::Error;

use crate::application::pagination::PageRequest;
use crate::application::repos::{PlayerQueryFilter, PlayersRepo, RepoError};
use crate::domain::entities::PlayerRecord;

#[derive(Debug, Error)]
pub enum PlayerServiceError {
    #[error("player `{0}` not found")]
    NotFound(i64),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct PlayerService {
    repo: Arc<dyn PlayersRepo>,
}

impl PlayerService {
    pub fn new(repo: Arc<dyn PlayersRepo>) -> Self {
        Self { repo }
    }

    pub async fn get_player(&self, fide_id: i64) -> Result<PlayerRecord, PlayerServiceError> {
        self.repo
            .find_by_fide_id(fide_id)
            .await?
            .ok_or(PlayerServiceError::NotFound(fide_id))
    }

    /// Players matching `filter`, ordered by FIDE id.
    pub async fn search_players(
        &self,
        filter: &PlayerQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<PlayerRecord>, PlayerServiceError> {
        let filter = PlayerQueryFilter {
            name: filter
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            ..filter.clone()
        };
        Ok(self.repo.search(&filter, page).await?)
    }

    pub async fn health_check(&self) -> Result<(), PlayerServiceError> {
        Ok(self.repo.health_check().await?)
    }
}

use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::application::players::PlayerService;
use crate::application::stats::StatsService;

#[derive(Clone)]
pub struct ApiState {
    pub players: Arc<PlayerService>,
    pub stats: Arc<StatsService>,
    /// Shared secret required on every `/api/v1` request when set.
    pub api_key: Option<ApiKey>,
}

/// Static API key compared in constant time.
#[derive(Clone)]
pub struct ApiKey(Arc<str>);

impl ApiKey {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_matches_only_exact_secret() {
        let key = ApiKey::new("s3cret");
        assert!(key.matches("s3cret"));
        assert!(!key.matches("s3cre"));
        assert!(!key.matches("S3CRET"));
        assert!(!key.matches(""));
        assert_eq!(format!("{key:?}"), "ApiKey(**redacted**)");
    }
}

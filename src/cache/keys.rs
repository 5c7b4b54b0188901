//! Cache key definitions.
//!
//! Each aggregate query maps to exactly one `StatsKey` variant carrying its
//! normalized parameters, so equal queries share an entry and distinct
//! queries cannot collide. `Display` renders the stable textual form used in
//! logs.

use std::fmt;

use crate::domain::types::{FederationCode, TopLimit};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatsKey {
    TopPlayers {
        federation: FederationCode,
        limit: TopLimit,
    },
    RatingDistribution {
        federation: Option<FederationCode>,
    },
    FederationStats {
        federation: FederationCode,
    },
    TitledPlayers,
}

impl StatsKey {
    /// Aggregate name used as the metrics label.
    pub fn aggregate(&self) -> &'static str {
        match self {
            StatsKey::TopPlayers { .. } => "top_players",
            StatsKey::RatingDistribution { .. } => "rating_dist",
            StatsKey::FederationStats { .. } => "fed_stats",
            StatsKey::TitledPlayers => "titled_players_stats",
        }
    }
}

impl fmt::Display for StatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsKey::TopPlayers { federation, limit } => {
                write!(f, "top_players_{federation}_{}", limit.get())
            }
            StatsKey::RatingDistribution {
                federation: Some(federation),
            } => write!(f, "rating_dist_{federation}"),
            StatsKey::RatingDistribution { federation: None } => f.write_str("rating_dist_all"),
            StatsKey::FederationStats { federation } => write!(f, "fed_stats_{federation}"),
            StatsKey::TitledPlayers => f.write_str("titled_players_stats"),
        }
    }
}

//! Domain entities mirrored from persistent storage.

use serde::Serialize;

/// Rating, games played and development coefficient for one time control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RatingLine {
    pub rating: Option<i32>,
    pub games: Option<i32>,
    pub k_factor: Option<i32>,
}

impl RatingLine {
    /// Rating usable in aggregates: zero and null both mean "unrated".
    pub fn rated(&self) -> Option<i32> {
        self.rating.filter(|value| *value > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRecord {
    pub fide_id: i64,
    pub name: String,
    pub federation: Option<String>,
    pub sex: Option<String>,
    pub title: Option<String>,
    pub w_title: Option<String>,
    pub o_title: Option<String>,
    pub foa_title: Option<String>,
    pub standard: RatingLine,
    pub rapid: RatingLine,
    pub blitz: RatingLine,
    pub birth_year: Option<i32>,
    pub flag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rating_is_unrated() {
        let line = RatingLine {
            rating: Some(0),
            ..Default::default()
        };
        assert_eq!(line.rated(), None);
        assert_eq!(RatingLine::default().rated(), None);
        assert_eq!(
            RatingLine {
                rating: Some(1500),
                ..Default::default()
            }
            .rated(),
            Some(1500)
        );
    }
}

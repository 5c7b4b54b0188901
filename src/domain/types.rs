//! Normalized parameter types shared by the HTTP boundary and the services.
//!
//! Values of these types are always valid: the constructors normalize their
//! input (trim, uppercase) and reject anything outside the documented bounds,
//! so code past the boundary never re-validates.

use std::fmt;

use serde::{Serialize, Serializer};

use super::error::DomainError;

/// Three-letter national federation code, stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FederationCode(String);

impl FederationCode {
    pub const LEN: usize = 3;

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.len() != Self::LEN || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(
                "federation",
                format!("`{trimmed}` is not a three-letter federation code"),
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FederationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FederationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Row limit for top-N rankings, bounded to `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopLimit(u32);

impl TopLimit {
    pub const DEFAULT: Self = Self(10);
    pub const MAX: u32 = 100;

    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 || value > Self::MAX {
            return Err(DomainError::validation(
                "limit",
                format!("must be between 1 and {}", Self::MAX),
            ));
        }
        Ok(Self(value))
    }

    /// Apply the default when the caller did not supply a limit.
    pub fn from_optional(value: Option<u32>) -> Result<Self, DomainError> {
        value.map_or(Ok(Self::DEFAULT), Self::new)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for TopLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Title abbreviation (`GM`, `IM`, `WGM`, ...), stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    const MAX_LEN: usize = 3;

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > Self::MAX_LEN {
            return Err(DomainError::validation(
                "title",
                format!("`{trimmed}` is not a title abbreviation"),
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Standard-rating floor accepted by player search, bounded to `0..=3000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingFloor(i32);

impl RatingFloor {
    pub const MAX: i32 = 3000;

    pub fn new(value: i32) -> Result<Self, DomainError> {
        if !(0..=Self::MAX).contains(&value) {
            return Err(DomainError::validation(
                "min_rating",
                format!("must be between 0 and {}", Self::MAX),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn federation_code_is_trimmed_and_uppercased() {
        let code = FederationCode::parse(" usa ").expect("valid code");
        assert_eq!(code.as_str(), "USA");
        assert_eq!(code, FederationCode::parse("USA").expect("valid code"));
    }

    #[test]
    fn federation_code_rejects_wrong_length_and_digits() {
        assert!(FederationCode::parse("US").is_err());
        assert!(FederationCode::parse("USAA").is_err());
        assert!(FederationCode::parse("U5A").is_err());
        assert!(FederationCode::parse("").is_err());
    }

    #[test]
    fn top_limit_bounds() {
        assert_eq!(TopLimit::from_optional(None).expect("default").get(), 10);
        assert_eq!(TopLimit::new(1).expect("lower bound").get(), 1);
        assert_eq!(TopLimit::new(100).expect("upper bound").get(), 100);
        assert!(TopLimit::new(0).is_err());
        assert!(TopLimit::new(101).is_err());
    }

    #[test]
    fn rating_floor_bounds() {
        assert!(RatingFloor::new(0).is_ok());
        assert!(RatingFloor::new(3000).is_ok());
        assert!(RatingFloor::new(-1).is_err());
        assert!(RatingFloor::new(3001).is_err());
    }

    #[test]
    fn title_is_uppercased() {
        assert_eq!(Title::parse("gm").expect("valid title").as_str(), "GM");
        assert!(Title::parse("   ").is_err());
        assert!(Title::parse("GRANDMASTER").is_err());
    }
}

//! Bulk loading of FIDE rating-list exports.
//!
//! Both export formats are parsed into [`PlayerRecord`]s through the same
//! field normalization: values are trimmed, empty values become `None`,
//! numbers that do not parse become `None`. A record without a usable FIDE id,
//! or with a federation that is not three characters long, is skipped.

mod fixed_width;
mod xml;

use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{PlayerWriteOptions, PlayersWriteRepo, RepoError};
use crate::domain::entities::{PlayerRecord, RatingLine};

pub use fixed_width::parse_fixed_width;
pub use xml::parse_xml;

/// Lines between progress log entries.
const PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Fixed-width TXT list with a header line.
    FixedWidth,
    /// `<playerslist>` XML document.
    Xml,
}

impl ImportFormat {
    /// Guess the format from a file extension; anything but `.xml` is text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => Self::Xml,
            _ => Self::FixedWidth,
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML near byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Players parsed from one export, before they are written.
#[derive(Debug, Default)]
pub struct ParsedPlayers {
    pub players: Vec<PlayerRecord>,
    /// Records seen, skipped ones included.
    pub read: u64,
    pub skipped: u64,
}

/// Outcome of an import, logged when the run completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub read: u64,
    pub skipped: u64,
    /// Later records that replaced an earlier one with the same FIDE id.
    pub duplicates: u64,
    pub federations: usize,
    /// Records carrying a standard rating.
    pub rated: usize,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub written: u64,
}

impl ImportSummary {
    fn from_players(parsed: &ParsedPlayers, duplicates: u64) -> Self {
        let federations: BTreeSet<&str> = parsed
            .players
            .iter()
            .filter_map(|player| player.federation.as_deref())
            .collect();
        let ratings = parsed
            .players
            .iter()
            .filter_map(|player| player.standard.rating);

        let mut summary = Self {
            read: parsed.read,
            skipped: parsed.skipped,
            duplicates,
            federations: federations.len(),
            ..Self::default()
        };
        for rating in ratings {
            summary.rated += 1;
            summary.min_rating = Some(summary.min_rating.map_or(rating, |min| min.min(rating)));
            summary.max_rating = Some(summary.max_rating.map_or(rating, |max| max.max(rating)));
        }
        summary
    }
}

pub struct ImportService {
    writer: Arc<dyn PlayersWriteRepo>,
    batch_size: NonZeroU32,
}

impl ImportService {
    pub fn new(writer: Arc<dyn PlayersWriteRepo>, batch_size: NonZeroU32) -> Self {
        Self { writer, batch_size }
    }

    pub async fn import_file(
        &self,
        path: &Path,
        format: ImportFormat,
        replace: bool,
    ) -> Result<ImportSummary, ImportError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ImportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        // Rating lists are not guaranteed to be valid UTF-8.
        let text = String::from_utf8_lossy(&bytes);
        info!(
            target = "chess_stats::import",
            path = %path.display(),
            ?format,
            bytes = bytes.len(),
            "Parsing player export"
        );
        self.import_text(&text, format, replace).await
    }

    pub async fn import_text(
        &self,
        text: &str,
        format: ImportFormat,
        replace: bool,
    ) -> Result<ImportSummary, ImportError> {
        let mut parsed = match format {
            ImportFormat::FixedWidth => parse_fixed_width(text),
            ImportFormat::Xml => parse_xml(text)?,
        };
        let duplicates = dedupe_by_fide_id(&mut parsed.players);
        let mut summary = ImportSummary::from_players(&parsed, duplicates);

        let options = PlayerWriteOptions {
            replace,
            batch_size: self.batch_size.get() as usize,
        };
        summary.written = self.writer.write_players(&parsed.players, options).await?;

        info!(
            target = "chess_stats::import",
            read = summary.read,
            skipped = summary.skipped,
            duplicates = summary.duplicates,
            federations = summary.federations,
            rated = summary.rated,
            min_rating = ?summary.min_rating,
            max_rating = ?summary.max_rating,
            written = summary.written,
            replace,
            "Import completed"
        );
        Ok(summary)
    }
}

/// Keep the last record per FIDE id, in first-seen order.
fn dedupe_by_fide_id(players: &mut Vec<PlayerRecord>) -> u64 {
    let mut positions: HashMap<i64, usize> = HashMap::with_capacity(players.len());
    let mut unique: Vec<PlayerRecord> = Vec::with_capacity(players.len());
    let mut duplicates = 0;
    for player in players.drain(..) {
        match positions.get(&player.fide_id) {
            Some(&index) => {
                duplicates += 1;
                unique[index] = player;
            }
            None => {
                positions.insert(player.fide_id, unique.len());
                unique.push(player);
            }
        }
    }
    *players = unique;
    duplicates
}

/// Raw textual fields of one exported player.
#[derive(Debug, Default)]
struct RawPlayer<'a> {
    fide_id: &'a str,
    name: &'a str,
    federation: &'a str,
    sex: &'a str,
    title: &'a str,
    w_title: &'a str,
    o_title: &'a str,
    foa_title: &'a str,
    standard: [&'a str; 3],
    rapid: [&'a str; 3],
    blitz: [&'a str; 3],
    birth_year: &'a str,
    flag: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
enum SkipReason {
    InvalidFideId(String),
    InvalidFederation(String),
}

impl RawPlayer<'_> {
    fn into_record(self) -> Result<PlayerRecord, SkipReason> {
        let fide_id = self
            .fide_id
            .trim()
            .parse::<i64>()
            .map_err(|_| SkipReason::InvalidFideId(self.fide_id.trim().to_string()))?;

        let federation = text(self.federation);
        if let Some(code) = federation.as_deref()
            && code.chars().count() != 3
        {
            return Err(SkipReason::InvalidFederation(code.to_string()));
        }

        Ok(PlayerRecord {
            fide_id,
            name: self.name.trim().to_string(),
            federation,
            sex: text(self.sex),
            title: text(self.title),
            w_title: text(self.w_title),
            o_title: text(self.o_title),
            foa_title: text(self.foa_title),
            standard: rating_line(self.standard),
            rapid: rating_line(self.rapid),
            blitz: rating_line(self.blitz),
            birth_year: number(self.birth_year),
            flag: text(self.flag),
        })
    }
}

fn text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn number(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn rating_line([rating, games, k_factor]: [&str; 3]) -> RatingLine {
    RatingLine {
        rating: number(rating),
        games: number(games),
        k_factor: number(k_factor),
    }
}

fn record_or_skip(raw: RawPlayer<'_>, position: u64, parsed: &mut ParsedPlayers) {
    parsed.read += 1;
    match raw.into_record() {
        Ok(player) => parsed.players.push(player),
        Err(reason) => {
            parsed.skipped += 1;
            warn!(
                target = "chess_stats::import",
                position,
                ?reason,
                "Skipping player record"
            );
        }
    }
    if parsed.read % PROGRESS_INTERVAL == 0 {
        info!(
            target = "chess_stats::import",
            read = parsed.read,
            "Parsed player records"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(fide_id: i64, federation: &str, rating: Option<i32>) -> PlayerRecord {
        PlayerRecord {
            fide_id,
            name: format!("Player {fide_id}"),
            federation: Some(federation.to_string()),
            sex: None,
            title: None,
            w_title: None,
            o_title: None,
            foa_title: None,
            standard: RatingLine {
                rating,
                ..Default::default()
            },
            rapid: RatingLine::default(),
            blitz: RatingLine::default(),
            birth_year: None,
            flag: None,
        }
    }

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(
            ImportFormat::from_path(Path::new("players_list.XML")),
            ImportFormat::Xml
        );
        assert_eq!(
            ImportFormat::from_path(Path::new("players_list_foa.txt")),
            ImportFormat::FixedWidth
        );
        assert_eq!(
            ImportFormat::from_path(Path::new("players")),
            ImportFormat::FixedWidth
        );
    }

    #[test]
    fn raw_fields_are_normalized() {
        let raw = RawPlayer {
            fide_id: " 1503014 ",
            name: " Carlsen, Magnus ",
            federation: "NOR",
            title: "GM ",
            standard: ["2830", "", "10"],
            birth_year: "1990",
            flag: "   ",
            ..Default::default()
        };
        let record = raw.into_record().expect("valid record");
        assert_eq!(record.fide_id, 1_503_014);
        assert_eq!(record.name, "Carlsen, Magnus");
        assert_eq!(record.title.as_deref(), Some("GM"));
        assert_eq!(record.standard.rating, Some(2830));
        assert_eq!(record.standard.games, None);
        assert_eq!(record.standard.k_factor, Some(10));
        assert_eq!(record.birth_year, Some(1990));
        assert_eq!(record.flag, None);
        assert_eq!(record.sex, None);
    }

    #[test]
    fn bad_identity_or_federation_is_skipped() {
        let missing_id = RawPlayer {
            fide_id: "  ",
            ..Default::default()
        };
        assert_eq!(
            missing_id.into_record(),
            Err(SkipReason::InvalidFideId(String::new()))
        );

        let bad_federation = RawPlayer {
            fide_id: "42",
            federation: "NORW",
            ..Default::default()
        };
        assert_eq!(
            bad_federation.into_record(),
            Err(SkipReason::InvalidFederation("NORW".into()))
        );

        let no_federation = RawPlayer {
            fide_id: "42",
            ..Default::default()
        };
        assert_eq!(
            no_federation.into_record().expect("federation is optional").federation,
            None
        );
    }

    #[test]
    fn unparsable_numbers_become_none() {
        let raw = RawPlayer {
            fide_id: "7",
            standard: ["abc", "12x", "40"],
            birth_year: "0000",
            ..Default::default()
        };
        let record = raw.into_record().expect("valid record");
        assert_eq!(record.standard.rating, None);
        assert_eq!(record.standard.games, None);
        assert_eq!(record.standard.k_factor, Some(40));
        assert_eq!(record.birth_year, Some(0));
    }

    #[test]
    fn duplicates_keep_the_last_record() {
        let mut players = vec![
            player(1, "USA", Some(2000)),
            player(2, "NOR", None),
            player(1, "USA", Some(2100)),
        ];
        let duplicates = dedupe_by_fide_id(&mut players);
        assert_eq!(duplicates, 1);
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].fide_id, 1);
        assert_eq!(players[0].standard.rating, Some(2100));
        assert_eq!(players[1].fide_id, 2);
    }

    #[test]
    fn summary_reports_federations_and_rating_range() {
        let parsed = ParsedPlayers {
            players: vec![
                player(1, "USA", Some(2400)),
                player(2, "USA", None),
                player(3, "NOR", Some(0)),
                player(4, "IND", Some(1850)),
            ],
            read: 5,
            skipped: 1,
        };
        let summary = ImportSummary::from_players(&parsed, 0);
        assert_eq!(summary.read, 5);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.federations, 3);
        assert_eq!(summary.rated, 3);
        assert_eq!(summary.min_rating, Some(0));
        assert_eq!(summary.max_rating, Some(2400));
        assert_eq!(summary.written, 0);
    }
}

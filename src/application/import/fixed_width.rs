//! Fixed-width TXT rating list.
//!
//! Column positions count characters, not bytes, so names with accented
//! letters do not shift the following columns.

use std::ops::Range;

use super::{ParsedPlayers, RawPlayer, record_or_skip};

const FIDE_ID: Range<usize> = 0..10;
const NAME: Range<usize> = 10..72;
const FEDERATION: Range<usize> = 72..75;
const SEX: Range<usize> = 75..76;
const TITLE: Range<usize> = 76..79;
const W_TITLE: Range<usize> = 79..82;
const O_TITLE: Range<usize> = 82..85;
const FOA_TITLE: Range<usize> = 85..88;
const STANDARD: [Range<usize>; 3] = [88..94, 94..98, 98..100];
const RAPID: [Range<usize>; 3] = [100..106, 106..110, 110..112];
const BLITZ: [Range<usize>; 3] = [112..118, 118..122, 122..124];
const BIRTH_YEAR: Range<usize> = 124..128;
const FLAG_START: usize = 128;

/// Parse a TXT export. The first line is a column header and is ignored, as
/// are blank lines.
pub fn parse_fixed_width(input: &str) -> ParsedPlayers {
    let mut parsed = ParsedPlayers::default();
    for (index, line) in input.lines().enumerate().skip(1) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let columns = Columns::new(line);
        let raw = RawPlayer {
            fide_id: columns.get(FIDE_ID),
            name: columns.get(NAME),
            federation: columns.get(FEDERATION),
            sex: columns.get(SEX),
            title: columns.get(TITLE),
            w_title: columns.get(W_TITLE),
            o_title: columns.get(O_TITLE),
            foa_title: columns.get(FOA_TITLE),
            standard: STANDARD.map(|range| columns.get(range)),
            rapid: RAPID.map(|range| columns.get(range)),
            blitz: BLITZ.map(|range| columns.get(range)),
            birth_year: columns.get(BIRTH_YEAR),
            flag: columns.rest(FLAG_START),
        };
        record_or_skip(raw, index as u64 + 1, &mut parsed);
    }
    parsed
}

/// Character-indexed view of one line. Columns past the end are empty.
struct Columns<'a> {
    line: &'a str,
    boundaries: Vec<usize>,
}

impl<'a> Columns<'a> {
    fn new(line: &'a str) -> Self {
        let boundaries = line
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(line.len()))
            .collect();
        Self { line, boundaries }
    }

    fn offset(&self, chars: usize) -> usize {
        self.boundaries
            .get(chars)
            .copied()
            .unwrap_or(self.line.len())
    }

    fn get(&self, range: Range<usize>) -> &'a str {
        &self.line[self.offset(range.start)..self.offset(range.end)]
    }

    fn rest(&self, start: usize) -> &'a str {
        &self.line[self.offset(start)..]
    }
}

//! `<playerslist>` XML rating list.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{ImportError, ParsedPlayers, RawPlayer, record_or_skip};

const PLAYER: &[u8] = b"player";

/// Parse an XML export. Unknown child elements are ignored.
pub fn parse_xml(input: &str) -> Result<ParsedPlayers, ImportError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedPlayers::default();
    let mut player: Option<HashMap<String, String>> = None;
    let mut field: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|source| ImportError::Xml {
            position: reader.buffer_position(),
            source,
        })?;
        match event {
            Event::Start(start) => {
                let name = start.local_name();
                if name.as_ref() == PLAYER {
                    player = Some(HashMap::new());
                } else if player.is_some() {
                    field = Some(String::from_utf8_lossy(name.as_ref()).into_owned());
                }
            }
            Event::Text(text) => {
                if let (Some(fields), Some(name)) = (player.as_mut(), field.as_ref()) {
                    let value = text.unescape().map_err(|source| ImportError::Xml {
                        position: reader.buffer_position(),
                        source,
                    })?;
                    fields.entry(name.clone()).or_default().push_str(&value);
                }
            }
            Event::End(end) => {
                if end.local_name().as_ref() == PLAYER {
                    if let Some(fields) = player.take() {
                        let position = parsed.read + 1;
                        record_or_skip(raw_player(&fields), position, &mut parsed);
                    }
                } else {
                    field = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parsed)
}

fn raw_player(fields: &HashMap<String, String>) -> RawPlayer<'_> {
    let get = |name: &str| fields.get(name).map_or("", String::as_str);
    RawPlayer {
        fide_id: get("fideid"),
        name: get("name"),
        federation: get("country"),
        sex: get("sex"),
        title: get("title"),
        w_title: get("w_title"),
        o_title: get("o_title"),
        foa_title: get("foa_title"),
        standard: [get("rating"), get("games"), get("k")],
        rapid: [get("rapid_rating"), get("rapid_games"), get("rapid_k")],
        blitz: [get("blitz_rating"), get("blitz_games"), get("blitz_k")],
        birth_year: get("birthday"),
        flag: get("flag"),
    }
}

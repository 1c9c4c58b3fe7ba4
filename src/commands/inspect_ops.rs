use unicode_width::UnicodeWidthStr;

use crate::keyboard::{KeyEvent, KeyTranslator, LayoutSet, UNKNOWN_KEY_INDEX};
use crate::phrase::Phrase;
use crate::predict::{next_keys_with, resolve_with, PredictOptions, Provenance, SpellingPreference};
use crate::romaji::RomajiTable;
use crate::settings::settings;

fn options() -> PredictOptions {
    PredictOptions {
        single_n_at_end: settings().session.single_n_at_end,
    }
}

/// Left-align `s` in a column `width` terminal cells wide.
fn pad(s: &str, width: usize) -> String {
    format!("{s}{}", " ".repeat(width.saturating_sub(s.width())))
}

fn parse_prefer(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((kana, spelling)) if !kana.is_empty() && !spelling.is_empty() => {
            Ok((kana.to_string(), spelling.to_ascii_lowercase()))
        }
        _ => Err(format!("expected kana=spelling, got {arg:?}")),
    }
}

pub fn keys_cmd(kana: &str, typed: &str) {
    let table = RomajiTable::global();
    let phrase = Phrase::parse(kana, table);
    let keys = next_keys_with(table, &phrase, typed, options());

    if keys.is_empty() {
        println!("(no further keys)");
        return;
    }
    for cand in keys.iter() {
        match &cand.provenance {
            Provenance::TableMatch {
                kana,
                spelling,
                offset,
            } => println!("{}  {} {spelling}[{offset}]", cand.letter, pad(kana, 4)),
            Provenance::Direct => println!("{}  (literal)", cand.letter),
        }
    }
}

pub fn hint_cmd(kana: &str, typed: &str, prefer: &[String]) {
    let table = RomajiTable::global();
    let phrase = Phrase::parse(kana, table);

    let mut preference = SpellingPreference::new();
    for arg in prefer {
        let (unit, spelling) = die!(parse_prefer(arg), "Error: {}");
        preference.record(&unit, &spelling);
    }

    let guess = resolve_with(table, &preference, &phrase, typed, options());
    println!("{}", guess.text);

    // Unit/spelling breakdown in aligned columns.
    let mut units_row = String::new();
    let mut spellings_row = String::new();
    for (unit, spelling) in phrase.units().iter().zip(&guess.spellings) {
        let width = unit.width().max(spelling.len()) + 1;
        units_row.push_str(&pad(unit, width));
        spellings_row.push_str(&pad(spelling, width));
    }
    println!("{}", units_row.trim_end());
    println!("{}", spellings_row.trim_end());
}

pub fn translate_cmd(code: &str, shift: bool, from: &str, to: &str) {
    let translator = die!(
        KeyTranslator::from_names(LayoutSet::global(), from, to),
        "Error: {}"
    );
    let event = KeyEvent::new(code, shift);
    let position = translator.position_index(code);
    let position = if position == UNKNOWN_KEY_INDEX {
        "-".to_string()
    } else {
        position.to_string()
    };

    match translator.translate(&event) {
        Some(ch) => println!("{ch:?}  position={position}"),
        None => println!("(no character)  position={position}"),
    }
}

pub fn layouts_cmd() {
    for layout in LayoutSet::global().iter() {
        println!("{}  shape={:?}", layout.name(), layout.shape());
        for (i, row) in layout.rows().iter().enumerate() {
            let keys: Vec<String> = row.iter().map(char::to_string).collect();
            println!("  {}{}", " ".repeat(i), keys.join(" "));
        }
    }
}

use std::fs;

use crate::corpus::parse_corpus_toml;
use crate::keyboard::{parse_layouts_toml, DEFAULT_LAYOUTS_TOML};
use crate::romaji::{parse_romaji_toml, DEFAULT_TOML};
use crate::settings::{default_toml, parse_settings_toml};

pub fn romaji_export() {
    print!("{DEFAULT_TOML}");
}

pub fn romaji_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let map = die!(parse_romaji_toml(&content), "Error: {}");
    let spellings: usize = map.values().map(Vec::len).sum();
    println!("OK: {} kana, {} spellings", map.len(), spellings);
}

pub fn settings_export() {
    print!("{}", default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(parse_settings_toml(&content), "Error: {}");
    let modes: Vec<&str> = s.mode_names().collect();
    println!(
        "OK: speed_window={}, layout={}->{}, modes=[{}]",
        s.session.speed_window,
        s.layout.source,
        s.layout.target,
        modes.join(", ")
    );
}

pub fn layouts_export() {
    print!("{DEFAULT_LAYOUTS_TOML}");
}

pub fn layouts_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let set = die!(parse_layouts_toml(&content), "Error: {}");
    let names: Vec<&str> = set.names().collect();
    println!("OK: {} layouts [{}]", names.len(), names.join(", "));
}

pub fn corpus_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let corpus = die!(parse_corpus_toml(&content), "Error: {}");
    println!("OK: {} phrases", corpus.len());
}

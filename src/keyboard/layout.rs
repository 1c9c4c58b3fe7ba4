use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_LAYOUTS_TOML: &str = include_str!("default_layouts.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("no layouts defined")]
    Empty,
    #[error("layout {0} has an empty row or no rows")]
    EmptyRow(String),
    #[error("layout {layout} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        layout: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("unknown layout: {0}")]
    Unknown(String),
    #[error("layouts already initialized")]
    AlreadyInitialized,
}

#[derive(Deserialize)]
struct LayoutsConfig {
    layouts: BTreeMap<String, RawLayout>,
}

#[derive(Deserialize)]
struct RawLayout {
    rows: Vec<String>,
}

/// A named grid of printable characters, one cell per physical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTable {
    name: String,
    rows: Vec<Vec<char>>,
}

impl LayoutTable {
    pub fn new(name: impl Into<String>, rows: &[&str]) -> Self {
        Self {
            name: name.into(),
            rows: rows.iter().map(|r| r.chars().collect()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    /// Row lengths, top to bottom.
    pub fn shape(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn at(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row)?.get(col).copied()
    }

    /// Case-insensitive search for `ch`. Grids may hold a character twice
    /// (the JIS yen and ro keys); `prefer_last` picks the later cell.
    pub fn find(&self, ch: char, prefer_last: bool) -> Option<(usize, usize)> {
        let needle = ch.to_lowercase().next().unwrap_or(ch);
        let mut cells = self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(move |(_, c)| c.to_lowercase().next() == Some(needle))
                .map(move |(c, _)| (r, c))
        });
        if prefer_last {
            cells.last()
        } else {
            cells.next()
        }
    }

    /// Row-major index of a cell.
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        self.rows.iter().take(row).map(Vec::len).sum::<usize>() + col
    }
}

/// Every layout available to the player, sharing one grid shape.
#[derive(Debug, Clone)]
pub struct LayoutSet {
    layouts: Vec<LayoutTable>,
}

impl LayoutSet {
    /// Set custom TOML before first `global()` call.
    pub fn init_custom(toml_content: String) -> Result<(), LayoutError> {
        parse_layouts_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| LayoutError::AlreadyInitialized)
    }

    /// Get or initialize the global layout set.
    pub fn global() -> &'static LayoutSet {
        static INSTANCE: OnceLock<LayoutSet> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_LAYOUTS_TOML);
            parse_layouts_toml(toml_str).expect("layout TOML must be valid")
        })
    }

    pub fn from_layouts(layouts: Vec<LayoutTable>) -> Result<Self, LayoutError> {
        let first = layouts.first().ok_or(LayoutError::Empty)?;
        let expected = first.shape();
        for layout in &layouts {
            let found = layout.shape();
            if found.is_empty() || found.contains(&0) {
                return Err(LayoutError::EmptyRow(layout.name.clone()));
            }
            if found != expected {
                return Err(LayoutError::ShapeMismatch {
                    layout: layout.name.clone(),
                    expected,
                    found,
                });
            }
        }
        Ok(Self { layouts })
    }

    pub fn get(&self, name: &str) -> Option<&LayoutTable> {
        self.layouts.iter().find(|l| l.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&LayoutTable, LayoutError> {
        self.get(name)
            .ok_or_else(|| LayoutError::Unknown(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.iter().map(|l| l.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutTable> {
        self.layouts.iter()
    }
}

pub fn parse_layouts_toml(toml_str: &str) -> Result<LayoutSet, LayoutError> {
    let config: LayoutsConfig =
        toml::from_str(toml_str).map_err(|e| LayoutError::Parse(e.to_string()))?;
    let layouts = config
        .layouts
        .into_iter()
        .map(|(name, raw)| LayoutTable {
            name,
            rows: raw.rows.iter().map(|r| r.chars().collect()).collect(),
        })
        .collect();
    LayoutSet::from_layouts(layouts)
}

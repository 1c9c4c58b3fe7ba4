use super::keycode::{base_char, shifted, KeyEvent, INTL_RO, UNKNOWN_KEY_INDEX};
use super::layout::{LayoutError, LayoutSet, LayoutTable};

/// Character the player meant to type on `target` by pressing `code` on a
/// board laid out as `source`.
///
/// `None` means the key is not a typing key, or the source layout has no
/// cell for it; callers ignore such events.
pub fn translate(
    code: &str,
    shift: bool,
    source: &LayoutTable,
    target: &LayoutTable,
) -> Option<char> {
    let base = base_char(code)?;
    let at_ro = code == INTL_RO;
    // Space has no grid cell and types the same on every layout.
    if base == ' ' {
        return Some(' ');
    }

    let (row, col) = source.find(base, at_ro)?;
    let mut ch = target.at(row, col)?;
    if base.is_lowercase() && ch.is_uppercase() {
        ch = ch.to_lowercase().next().unwrap_or(ch);
    }
    if shift {
        ch = shifted(ch, at_ro);
    }
    Some(ch)
}

/// Row-major grid index of the key `code` on `source`, or
/// [`UNKNOWN_KEY_INDEX`] when it has no cell.
pub fn position_index(code: &str, source: &LayoutTable) -> usize {
    base_char(code)
        .and_then(|base| source.find(base, code == INTL_RO))
        .map_or(UNKNOWN_KEY_INDEX, |(row, col)| source.flat_index(row, col))
}

/// Character at the cell of `to` that holds `ch` in `from`.
pub fn remap_char(ch: char, from: &LayoutTable, to: &LayoutTable) -> Option<char> {
    let (row, col) = from.find(ch, false)?;
    to.at(row, col)
}

/// A source/target layout pair, resolved once per session.
#[derive(Debug, Clone)]
pub struct KeyTranslator {
    source: LayoutTable,
    target: LayoutTable,
}

impl KeyTranslator {
    pub fn new(source: LayoutTable, target: LayoutTable) -> Self {
        Self { source, target }
    }

    pub fn from_names(set: &LayoutSet, source: &str, target: &str) -> Result<Self, LayoutError> {
        Ok(Self::new(
            set.require(source)?.clone(),
            set.require(target)?.clone(),
        ))
    }

    pub fn source(&self) -> &LayoutTable {
        &self.source
    }

    pub fn target(&self) -> &LayoutTable {
        &self.target
    }

    pub fn translate(&self, event: &KeyEvent) -> Option<char> {
        translate(&event.code, event.shift, &self.source, &self.target)
    }

    pub fn position_index(&self, code: &str) -> usize {
        position_index(code, &self.source)
    }

    /// Grid index of the physical key that types `ch` on the target layout.
    pub fn highlight_index(&self, ch: char) -> usize {
        self.target
            .find(ch, false)
            .map_or(UNKNOWN_KEY_INDEX, |(row, col)| {
                self.target.flat_index(row, col)
            })
    }
}

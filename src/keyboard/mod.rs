//! Keyboard layouts and hardware-key translation.
//!
//! The player's physical board is described by a "source" layout; the
//! practice board they want to learn is the "target". Both share one grid
//! shape, so a key press is translated by position.

mod keycode;
mod layout;
mod translate;


pub use keycode::{base_char, code_for_char, shifted, KeyEvent, UNKNOWN_KEY_INDEX};
pub use layout::{parse_layouts_toml, LayoutError, LayoutSet, LayoutTable, DEFAULT_LAYOUTS_TOML};
pub use translate::{position_index, remap_char, translate, KeyTranslator};

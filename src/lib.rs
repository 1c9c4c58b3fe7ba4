pub mod corpus;
pub mod keyboard;
pub mod phrase;
pub mod predict;
pub mod romaji;
pub mod session;
pub mod settings;
pub mod trace_init;
pub mod unicode;

#[cfg(feature = "cli")]
pub mod commands;

pub use keyboard::{KeyEvent, KeyTranslator};
pub use phrase::Phrase;
pub use romaji::RomajiTable;
pub use session::{run_session, SessionConfig, TypingSession};

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use kanatype_engine::commands::{config_ops, inspect_ops, play};
use kanatype_engine::corpus::Corpus;
use kanatype_engine::keyboard::LayoutSet;
use kanatype_engine::romaji::RomajiTable;
use kanatype_engine::{settings, trace_init};

#[derive(Parser)]
#[command(name = "kanatype", about = "Kana typing trainer")]
struct Cli {
    /// Custom settings TOML
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Custom romanization TOML
    #[arg(long, global = true)]
    romaji: Option<PathBuf>,
    /// Custom keyboard layouts TOML
    #[arg(long, global = true)]
    layouts: Option<PathBuf>,
    /// Custom phrase corpus TOML
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,
    /// Write a JSON trace into this directory (requires --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the keys that may legally come next
    Keys {
        /// Target phrase (kana)
        kana: String,
        /// Romaji typed so far
        #[arg(default_value = "")]
        typed: String,
    },
    /// Show the best full romanization for a phrase
    Hint {
        /// Target phrase (kana)
        kana: String,
        /// Romaji typed so far
        #[arg(default_value = "")]
        typed: String,
        /// Preferred spelling, as kana=spelling (repeatable)
        #[arg(long)]
        prefer: Vec<String>,
    },
    /// Translate a hardware key code between layouts
    Translate {
        /// Key code, e.g. KeyA, Digit1, IntlRo
        code: String,
        /// Shift held
        #[arg(long)]
        shift: bool,
        /// Physical layout
        #[arg(long, default_value = "qwerty")]
        from: String,
        /// Practice layout
        #[arg(long, default_value = "qwerty")]
        to: String,
    },
    /// List keyboard layouts
    Layouts,
    /// Play a session in the terminal
    Play {
        /// Difficulty mode
        #[arg(long, default_value = "normal")]
        mode: String,
        /// RNG seed for the issue draw
        #[arg(long)]
        seed: Option<u64>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export default romanization table as TOML
    RomajiExport,
    /// Validate a custom romanization TOML file
    RomajiValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Export default keyboard layouts as TOML
    LayoutsExport,
    /// Validate a custom keyboard layouts TOML file
    LayoutsValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Validate a phrase corpus TOML file
    CorpusValidate {
        /// Path to the TOML file
        file: String,
    },
}

/// Unwrap a Result or print the error and exit.
macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

fn read(path: &Path) -> String {
    die!(fs::read_to_string(path), "Error reading {}: {}", path.display())
}

fn main() {
    let cli = Cli::parse();

    if let Some(dir) = &cli.trace_dir {
        match die!(trace_init::init_tracing(dir), "Error creating {}: {}", dir.display()) {
            Some(path) => eprintln!("Tracing to {}", path.display()),
            None => eprintln!("Built without the trace feature; --trace-dir ignored"),
        }
    }
    if let Some(path) = &cli.settings {
        die!(settings::init_custom(read(path)), "Error in {}: {}", path.display());
    }
    if let Some(path) = &cli.romaji {
        die!(RomajiTable::init_custom(read(path)), "Error in {}: {}", path.display());
    }
    if let Some(path) = &cli.layouts {
        die!(LayoutSet::init_custom(read(path)), "Error in {}: {}", path.display());
    }
    if let Some(path) = &cli.corpus {
        die!(Corpus::init_custom(read(path)), "Error in {}: {}", path.display());
    }

    match cli.command {
        Command::Keys { kana, typed } => inspect_ops::keys_cmd(&kana, &typed),
        Command::Hint {
            kana,
            typed,
            prefer,
        } => inspect_ops::hint_cmd(&kana, &typed, &prefer),
        Command::Translate {
            code,
            shift,
            from,
            to,
        } => inspect_ops::translate_cmd(&code, shift, &from, &to),
        Command::Layouts => inspect_ops::layouts_cmd(),
        Command::Play { mode, seed, json } => {
            if let Err(e) = play::play(&mode, seed, json) {
                eprintln!("Error: {e:#}");
                process::exit(1);
            }
        }
        Command::RomajiExport => config_ops::romaji_export(),
        Command::RomajiValidate { file } => config_ops::romaji_validate(&file),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
        Command::LayoutsExport => config_ops::layouts_export(),
        Command::LayoutsValidate { file } => config_ops::layouts_validate(&file),
        Command::CorpusValidate { file } => config_ops::corpus_validate(&file),
    }
}

//! Interactive terminal session.
//!
//! A reader thread turns crossterm key events into [`KeyEvent`]s on a
//! [`KeyFeed`]; the main thread runs the session loop and redraws the screen
//! before every wait. Ctrl-C cancels whichever wait is current.

use std::io::{self, stdout, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use crate::corpus::Corpus;
use crate::keyboard::{KeyEvent, KeyTranslator, LayoutSet};
use crate::romaji::RomajiTable;
use crate::session::{
    key_channel, run_session, CancelToken, KeyFeed, KeyOutcome, Presenter, SessionConfig,
    SessionState, SessionSummary, StepReport, SummaryOutcome, TypingSession,
};
use crate::settings::settings;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

type CurrentToken = Arc<Mutex<Option<CancelToken>>>;

pub fn play(mode: &str, seed: Option<u64>, json: bool) -> anyhow::Result<()> {
    let settings = settings();
    let table = RomajiTable::global();
    let translator = KeyTranslator::from_names(
        LayoutSet::global(),
        &settings.layout.source,
        &settings.layout.target,
    )?;
    let config = SessionConfig::from_settings(settings, mode)?;

    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let issues = Corpus::global().draw(&config.mode, table, &mut rng);
    debug!(mode, issues = issues.len(), "starting play");
    let mut session = TypingSession::new(table, translator, config, issues)?;

    let (feed, mut waiter) = key_channel();
    let current: CurrentToken = Arc::new(Mutex::new(None));
    let done = Arc::new(AtomicBool::new(false));

    let summary = {
        let _terminal = TerminalGuard::enter().context("cannot switch terminal to raw mode")?;
        let reader = spawn_reader(feed, Arc::clone(&current), Arc::clone(&done));
        let mut presenter = TerminalPresenter {
            out: stdout(),
            current,
        };
        let summary = run_session(&mut session, &mut waiter, &mut presenter);
        done.store(true, Ordering::Relaxed);
        if reader.join().is_err() {
            warn!("key reader thread panicked");
        }
        summary
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Raw mode plus alternate screen, restored on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self;
        execute!(stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Key(KeyEvent),
    Interrupt,
    Skip,
}

fn map_key(key: &event::KeyEvent) -> Input {
    if key.kind != KeyEventKind::Press {
        return Input::Skip;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Input::Interrupt,
            _ => Input::Skip,
        };
    }
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Esc => Input::Key(KeyEvent::new("Escape", shift)),
        KeyCode::Enter => Input::Key(KeyEvent::new("Enter", shift)),
        KeyCode::Backspace => Input::Key(KeyEvent::new("Backspace", shift)),
        KeyCode::Tab => Input::Key(KeyEvent::new("Tab", shift)),
        KeyCode::Char(ch) => KeyEvent::for_char(ch).map_or(Input::Skip, Input::Key),
        _ => Input::Skip,
    }
}

fn spawn_reader(feed: KeyFeed, current: CurrentToken, done: Arc<AtomicBool>) -> JoinHandle<()> {
    thread::spawn(move || {
        while !done.load(Ordering::Relaxed) {
            match event::poll(POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    let _ = feed.fail(err.to_string());
                    return;
                }
            }
            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(err) => {
                    let _ = feed.fail(err.to_string());
                    return;
                }
            };
            match map_key(&key) {
                Input::Key(event) => {
                    if feed.send(event).is_err() {
                        return;
                    }
                }
                Input::Interrupt => {
                    if let Ok(slot) = current.lock() {
                        if let Some(token) = slot.as_ref() {
                            token.cancel();
                        }
                    }
                }
                Input::Skip => {}
            }
        }
    })
}

struct TerminalPresenter {
    out: Stdout,
    current: CurrentToken,
}

impl Presenter for TerminalPresenter {
    fn on_wait(&mut self, session: &TypingSession<'_>, token: &CancelToken) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(token.clone());
        }
        if let Err(err) = self.render(session) {
            warn!(%err, "render failed");
        }
    }

    fn on_step(&mut self, _session: &TypingSession<'_>, report: &StepReport) {
        if matches!(report.outcome, KeyOutcome::Miss { .. }) {
            let _ = write!(self.out, "\x07");
            let _ = self.out.flush();
        }
    }
}

impl TerminalPresenter {
    fn render(&mut self, session: &TypingSession<'_>) -> io::Result<()> {
        let view = session.view();
        queue!(self.out, MoveTo(0, 0), Clear(ClearType::All))?;

        if view.state == SessionState::AwaitingStart {
            let config = session.config();
            queue!(
                self.out,
                Print(format!(
                    "{} to start, {} to quit, Ctrl-C to cancel",
                    config.start_key, config.abort_key
                ))
            )?;
            return self.out.flush();
        }

        let mut row = 0u16;
        queue!(
            self.out,
            MoveTo(0, row),
            Print(format!("{}/{}", view.issue + 1, view.issue_count))
        )?;
        row += 2;

        // Centre the kana over the romanization.
        let indent = view.hint.width().saturating_sub(view.phrase.width()) / 2;
        queue!(
            self.out,
            MoveTo(0, row),
            Print(format!("{}{}", " ".repeat(indent), view.phrase))
        )?;
        row += 1;

        let split = view.typed.len().min(view.hint.len());
        let (done, rest) = if view.hint.is_char_boundary(split) {
            view.hint.split_at(split)
        } else {
            ("", view.hint.as_str())
        };
        queue!(
            self.out,
            MoveTo(0, row),
            SetAttribute(Attribute::Dim),
            Print(done),
            SetAttribute(Attribute::Reset),
            Print(rest)
        )?;
        row += 2;

        if view.show_keyboard {
            let layout = session.translator().target();
            for (r, keys) in layout.rows().iter().enumerate() {
                let mut line = " ".repeat(r);
                for (c, ch) in keys.iter().enumerate() {
                    if layout.flat_index(r, c) == view.highlight {
                        line.push_str(&format!("[{ch}]"));
                    } else {
                        line.push_str(&format!(" {ch} "));
                    }
                }
                queue!(self.out, MoveTo(0, row), Print(line))?;
                row += 1;
            }
            row += 1;
        }

        let speed = view
            .speed
            .map_or_else(|| "--".to_string(), |s| format!("{s:.1}"));
        queue!(
            self.out,
            MoveTo(0, row),
            Print(format!(
                "hits {}  misses {}  combo {}  {} keys/s  {}s",
                view.counters.hits,
                view.counters.misses,
                view.counters.combo,
                speed,
                view.elapsed.as_secs()
            ))
        )?;
        self.out.flush()
    }
}

fn print_summary(summary: &SessionSummary) {
    let status = match &summary.outcome {
        SummaryOutcome::Completed => "completed".to_string(),
        SummaryOutcome::InProgress => "in progress".to_string(),
        SummaryOutcome::Aborted { reason } => format!("aborted ({reason:?})"),
    };
    println!("{status}");
    println!(
        "issues    {}/{}",
        summary.issues_completed, summary.issues_total
    );
    println!("hits      {}", summary.hits);
    println!("misses    {}", summary.misses);
    println!("accuracy  {:.1}%", summary.accuracy * 100.0);
    println!("max combo {}", summary.max_combo);
    println!("speed     {:.2} keys/s", summary.average_speed);
    if let Some(peak) = summary.peak_speed {
        println!("peak      {peak:.2} keys/s");
    }
    println!("time      {:.1}s", summary.duration_ms as f64 / 1000.0);
    if !summary.missed_chars.is_empty() {
        let missed: String = summary.missed_chars.iter().collect();
        println!("missed    {missed}");
    }
}

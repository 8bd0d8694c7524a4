//! Progress reporting for seed runs.
//!
//! The seeder talks to a [`Ui`]. [`SeedScreen`] is the full-screen view: one
//! table row per selected step with its counters, a record gauge for the
//! running step and the recent skips and failures.

mod components;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::fmt;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::seed::{SeedReport, SeedStep, StepReport};
use components::{Activity, Header, RecordGauge, StepBoard};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Preparing,
    Seeding(SeedStep),
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Preparing => write!(f, "Opening database"),
            Phase::Seeding(step) => write!(f, "Seeding {}", step.label()),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Receiver of seed progress. The full screen, plain console output and
/// silent test runs each implement it.
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);

    /// Called once per step with its final counters
    fn step_finished(&mut self, report: &StepReport) {
        self.log(report.summary());
    }

    /// Whether the user asked to stop; checked between seed steps
    fn cancelled(&mut self) -> bool {
        false
    }
}

/// Full-screen seed view
pub struct SeedScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    phase: Phase,
    source: String,
    board: StepBoard,
    activity: Activity,
    stop_requested: bool,
}

impl SeedScreen {
    /// Enter the alternate screen with a row for each of `steps`
    pub fn new(steps: &[SeedStep]) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            phase: Phase::Preparing,
            source: String::new(),
            board: StepBoard::new(steps),
            activity: Activity::new(500),
            stop_requested: false,
        })
    }

    /// Drain pending key presses; `q`, Esc and Ctrl+C request a stop
    fn poll_keys(&mut self) {
        while let Ok(true) = event::poll(Duration::ZERO) {
            let Ok(event) = event::read() else {
                break;
            };
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) = event
            else {
                continue;
            };
            let stop = matches!(code, KeyCode::Char('q') | KeyCode::Esc)
                || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL));
            if stop && !self.stop_requested {
                self.stop_requested = true;
                self.activity.push("stop requested; the running step will finish first");
            }
        }
    }

    fn draw(&mut self) -> Result<()> {
        let board_height = self.board.len() as u16 + 3;
        let Self {
            terminal,
            phase,
            source,
            board,
            activity,
            stop_requested,
        } = self;

        terminal.draw(|frame| {
            let [header, table, gauge, log] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(board_height),
                    Constraint::Length(1),
                    Constraint::Min(3),
                ])
                .areas(frame.area());

            frame.render_widget(
                Header {
                    phase: &*phase,
                    source: source.as_str(),
                    stopping: *stop_requested,
                },
                header,
            );
            frame.render_widget(&*board, table);
            frame.render_widget(RecordGauge { running: board.running() }, gauge);
            frame.render_widget(&*activity, log);
        })?;
        Ok(())
    }

    fn redraw(&mut self) {
        self.poll_keys();
        self.draw().ok();
    }

    /// Show the final report and wait for a key before leaving the screen
    pub fn finish(mut self, report: &SeedReport) -> Result<()> {
        self.phase = Phase::Complete;
        self.source = report.summary();
        self.activity.push("press any key to exit");
        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(KeyEvent {
                    kind: KeyEventKind::Press,
                    ..
                }) = event::read()?
                {
                    return Ok(());
                }
            }
        }
    }
}

impl Ui for SeedScreen {
    fn set_phase(&mut self, phase: Phase) {
        if let Phase::Seeding(step) = phase {
            self.board.start(step);
        }
        self.phase = phase;
        self.redraw();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.source = info.into();
        self.redraw();
    }

    fn set_progress(&mut self, current: u64, total: u64, _label: impl Into<String>) {
        self.board.advance(current, total);
        self.redraw();
    }

    fn clear_progress(&mut self) {}

    fn log(&mut self, message: impl Into<String>) {
        self.activity.push(message);
        self.redraw();
    }

    fn step_finished(&mut self, report: &StepReport) {
        self.board.finish(report);
        self.activity.push(report.summary());
        self.redraw();
    }

    fn cancelled(&mut self) -> bool {
        self.poll_keys();
        self.stop_requested
    }
}

impl Drop for SeedScreen {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
        self.terminal.show_cursor().ok();
    }
}

/// Line-oriented UI for non-interactive runs. Phase changes go out as
/// `tracing` events; per-record detail is already logged by the seeder.
#[derive(Default)]
pub struct ConsoleUi;

impl ConsoleUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for ConsoleUi {
    fn set_phase(&mut self, phase: Phase) {
        tracing::info!("{}", phase);
    }

    fn set_info(&mut self, info: impl Into<String>) {
        tracing::info!("{}", info.into());
    }

    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}

    fn clear_progress(&mut self) {}

    fn log(&mut self, message: impl Into<String>) {
        tracing::debug!("{}", message.into());
    }

    fn step_finished(&mut self, _report: &StepReport) {}
}

/// Silent UI implementation for testing and non-interactive use
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Seeding(SeedStep::Weapons).to_string(), "Seeding weapons");
        assert_eq!(Phase::Complete.to_string(), "Complete");
    }
}

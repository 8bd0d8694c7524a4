//! Widgets of the seed screen. Each holds plain state and renders through a
//! borrowed `Widget` impl, so the state can be tested without a terminal.

use std::collections::VecDeque;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, Widget};

use super::Phase;
use crate::seed::{SeedStep, StepReport};

/// Where one selected step is in the run
#[derive(Debug, Clone, PartialEq)]
pub enum StepState {
    Waiting,
    Running { record: u64, records: u64 },
    Finished(StepReport),
}

/// One row per selected seed step with its counters once it has run
#[derive(Debug, Clone)]
pub struct StepBoard {
    rows: Vec<(SeedStep, StepState)>,
}

impl StepBoard {
    pub fn new(steps: &[SeedStep]) -> Self {
        let rows = SeedStep::ALL
            .into_iter()
            .filter(|step| steps.contains(step))
            .map(|step| (step, StepState::Waiting))
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn state_mut(&mut self, step: SeedStep) -> Option<&mut StepState> {
        self.rows
            .iter_mut()
            .find(|(s, _)| *s == step)
            .map(|(_, state)| state)
    }

    pub fn start(&mut self, step: SeedStep) {
        if let Some(state) = self.state_mut(step) {
            *state = StepState::Running { record: 0, records: 0 };
        }
    }

    /// Move the running step to `record` of `records`
    pub fn advance(&mut self, record: u64, records: u64) {
        for (_, state) in &mut self.rows {
            if let StepState::Running { .. } = state {
                *state = StepState::Running { record, records };
            }
        }
    }

    pub fn finish(&mut self, report: &StepReport) {
        if let Some(state) = self.state_mut(report.step) {
            *state = StepState::Finished(report.clone());
        }
    }

    /// `(record, records)` of the running step
    pub fn running(&self) -> Option<(SeedStep, u64, u64)> {
        self.rows.iter().find_map(|(step, state)| match state {
            StepState::Running { record, records } => Some((*step, *record, *records)),
            _ => None,
        })
    }

    /// Sum of inserted / skipped / deleted / failed over finished steps
    pub fn totals(&self) -> [u64; 4] {
        self.rows.iter().fold([0; 4], |mut acc, (_, state)| {
            if let StepState::Finished(r) = state {
                acc[0] += r.inserted;
                acc[1] += r.skipped;
                acc[2] += r.deleted;
                acc[3] += r.failed;
            }
            acc
        })
    }
}

fn count_cell(n: u64, colour: Color) -> Cell<'static> {
    if n == 0 {
        Cell::from("·").style(Style::default().fg(Color::DarkGray))
    } else {
        Cell::from(n.to_string()).style(Style::default().fg(colour))
    }
}

impl Widget for &StepBoard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(["step", "source", "state", "ins", "skip", "del", "fail"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.rows.iter().map(|(step, state)| {
            let source = step.source_file().unwrap_or("built-in");
            let mut cells = vec![Cell::from(step.label()), Cell::from(source)];
            match state {
                StepState::Waiting => {
                    cells.push(Cell::from("waiting").style(Style::default().fg(Color::DarkGray)));
                }
                StepState::Running { record, records } => {
                    cells.push(
                        Cell::from(format!("{}/{}", record, records))
                            .style(Style::default().fg(Color::Yellow)),
                    );
                }
                StepState::Finished(report) if !report.is_ok() => {
                    cells.push(Cell::from("aborted").style(Style::default().fg(Color::Red)));
                }
                StepState::Finished(report) => {
                    cells.push(Cell::from("done").style(Style::default().fg(Color::Green)));
                    cells.push(count_cell(report.inserted, Color::Green));
                    cells.push(count_cell(report.skipped, Color::Yellow));
                    cells.push(count_cell(report.deleted, Color::Magenta));
                    cells.push(count_cell(report.failed, Color::Red));
                }
            }
            Row::new(cells)
        });

        let [ins, skip, del, fail] = self.totals();
        let widths = [
            Constraint::Length(18),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
        ];
        Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" steps ")
                    .title_bottom(format!(" +{} ~{} -{} !{} ", ins, skip, del, fail)),
            )
            .render(area, buf);
    }
}

/// Title line: phase and the fixture file being read
pub struct Header<'a> {
    pub phase: &'a Phase,
    pub source: &'a str,
    pub stopping: bool,
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colour = match self.phase {
            Phase::Complete => Color::Green,
            _ if self.stopping => Color::Red,
            _ => Color::Yellow,
        };
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.phase),
                Style::default().fg(colour).add_modifier(Modifier::BOLD),
            ),
            Span::styled(self.source, Style::default().fg(Color::Gray)),
        ];
        if self.stopping {
            spans.push(Span::styled(
                "  stopping after this step",
                Style::default().fg(Color::Red),
            ));
        }

        Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title(" 西游 codex "))
            .render(area, buf);
    }
}

/// Record gauge of the running step; empty between steps
pub struct RecordGauge {
    pub running: Option<(SeedStep, u64, u64)>,
}

impl Widget for RecordGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((step, record, records)) = self.running else {
            return;
        };
        let ratio = if records == 0 {
            0.0
        } else {
            (record as f64 / records as f64).min(1.0)
        };
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Yellow).bg(Color::DarkGray))
            .ratio(ratio)
            .label(format!("{} {}/{}", step.label(), record, records))
            .render(area, buf);
    }
}

/// Most recent skips, failures and step summaries
#[derive(Debug, Clone)]
pub struct Activity {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Activity {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }
}

impl Widget for &Activity {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.entries.len().saturating_sub(visible);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(skip)
            .map(|entry| {
                let colour = if entry.starts_with("fail") {
                    Color::Red
                } else if entry.starts_with("skip") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                ListItem::new(Span::styled(entry.as_str(), Style::default().fg(colour)))
            })
            .collect();

        List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" activity "))
            .render(area, buf);
    }
}

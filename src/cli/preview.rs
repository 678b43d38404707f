//! Interactive conversion preview using ratatui
//!
//! The screen mirrors the desktop flow of converting a ManaBox export:
//! a progress gauge while rows arrive from the worker, one filter input
//! per column, a sortable table of the filtered rows, a summary footer and
//! a colour-coded status line.
//!
//! `PreviewState` holds everything the screen shows and reacts to keys and
//! worker events without touching the terminal, so it can be tested on its
//! own. `run_preview` owns the terminal and the event loop.

use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
};

use super::args::derive_output_path;
use crate::pipeline::{
    apply_event, write_records, ConversionEvent, ConversionHandle, ConversionReport,
    ConversionRunner, Field, ResultStore, SortDirection, Vendor,
};
use crate::utils::{open_vendor_page, truncate_string, SystemBrowser, UrlOpener};

/// How long the loop waits for a key before polling the worker again
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Rows moved by PageUp/PageDown
const PAGE_SIZE: usize = 10;

/// Settings for the interactive preview
#[derive(Clone, Debug)]
pub struct PreviewConfig {
    pub input: PathBuf,
    /// Explicit `-o` path; `None` derives one from the input and vendor
    pub output: Option<PathBuf>,
    pub vendor: Vendor,
}

impl PreviewConfig {
    /// Where a save writes to when converting for `vendor`
    pub fn output_path(&self, vendor: Vendor) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_output_path(&self.input, vendor))
    }
}

/// Severity of a status line message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    fn color(self) -> Color {
        match self {
            StatusKind::Info => Color::White,
            StatusKind::Success => Color::Green,
            StatusKind::Warning => Color::Yellow,
            StatusKind::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// Side effects requested by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAction {
    None,
    Quit,
    Save,
    OpenVendorPage,
    Reconvert,
}

/// Everything the preview screen shows
pub struct PreviewState {
    pub store: ResultStore,
    pub vendor: Vendor,
    config: PreviewConfig,
    output: PathBuf,
    /// Column whose filter input has focus; Enter sorts by it
    pub focused: Field,
    /// Raw filter text per column, in `Field::ALL` order
    pub filter_inputs: [String; 4],
    /// Index of the first displayed row on screen
    pub scroll: usize,
    pub processed: usize,
    pub total: usize,
    pub converting: bool,
    pub last_report: Option<ConversionReport>,
    pub status: StatusMessage,
}

impl PreviewState {
    pub fn new(config: PreviewConfig) -> Self {
        Self {
            store: ResultStore::new(),
            vendor: config.vendor,
            output: config.output_path(config.vendor),
            config,
            focused: Field::Title,
            filter_inputs: Default::default(),
            scroll: 0,
            processed: 0,
            total: 0,
            converting: false,
            last_report: None,
            status: StatusMessage {
                kind: StatusKind::Info,
                text: "Ready".to_string(),
            },
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = StatusMessage {
            kind,
            text: text.into(),
        };
    }

    /// Mark a run as started; events for it are applied with `apply_event`
    pub fn begin_conversion(&mut self) {
        self.converting = true;
        self.processed = 0;
        self.total = 0;
        self.scroll = 0;
        self.set_status(StatusKind::Info, "Converting rows...");
    }

    /// Apply one worker event to the store and progress counters
    pub fn apply_event(&mut self, event: ConversionEvent) {
        if let ConversionEvent::Started { total } = event {
            self.total = total;
        }
        if let Some(processed) = event.processed() {
            self.processed = processed;
        }

        if let Some(report) = apply_event(&mut self.store, event) {
            self.converting = false;
            if report.skipped == 0 {
                self.set_status(
                    StatusKind::Success,
                    format!("Conversion complete! {} row(s) converted", report.converted),
                );
            } else {
                self.set_status(
                    StatusKind::Warning,
                    format!(
                        "Conversion complete: {} converted, {} skipped ({} has no mapping yet)",
                        report.converted,
                        report.skipped,
                        report.vendor.name()
                    ),
                );
            }
            self.last_report = Some(report);
        }
    }

    /// The worker went away without finishing
    pub fn abort_conversion(&mut self) {
        self.converting = false;
        self.set_status(
            StatusKind::Error,
            "Conversion stopped unexpectedly; press Ctrl+R to retry",
        );
    }

    /// Fraction of input rows processed, in 0.0..=1.0
    pub fn progress_ratio(&self) -> f64 {
        if self.total == 0 {
            if self.converting {
                0.0
            } else {
                1.0
            }
        } else {
            (self.processed as f64 / self.total as f64).clamp(0.0, 1.0)
        }
    }

    pub fn input(&self) -> &Path {
        &self.config.input
    }

    /// Destination of the next save; follows the vendor unless `-o` was given
    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn filter_input(&self, field: Field) -> &str {
        &self.filter_inputs[field.index()]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PreviewAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return PreviewAction::Quit,
            KeyCode::Char('c') if ctrl => return PreviewAction::Quit,
            KeyCode::Char('s') if ctrl => {
                if self.converting {
                    self.set_status(
                        StatusKind::Warning,
                        "Wait for the conversion to finish before saving",
                    );
                } else {
                    return PreviewAction::Save;
                }
            }
            KeyCode::Char('o') if ctrl => return PreviewAction::OpenVendorPage,
            KeyCode::Char('r') if ctrl => {
                if self.converting {
                    self.set_status(StatusKind::Warning, "A conversion is already running");
                } else {
                    return PreviewAction::Reconvert;
                }
            }
            KeyCode::Char('v') if ctrl => self.cycle_vendor(),
            KeyCode::Tab | KeyCode::Right => self.focused = next_field(self.focused),
            KeyCode::BackTab | KeyCode::Left => self.focused = previous_field(self.focused),
            KeyCode::Enter => self.sort_focused(),
            KeyCode::Backspace => {
                let mut text = self.filter_input(self.focused).to_string();
                if text.pop().is_some() {
                    self.update_filter(text);
                }
            }
            KeyCode::Char(c) if !ctrl && !c.is_control() => {
                let mut text = self.filter_input(self.focused).to_string();
                text.push(c);
                self.update_filter(text);
            }
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll_to(self.scroll + 1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(PAGE_SIZE),
            KeyCode::PageDown => self.scroll_to(self.scroll + PAGE_SIZE),
            KeyCode::Home => self.scroll = 0,
            KeyCode::End => self.scroll_to(usize::MAX),
            _ => {}
        }
        PreviewAction::None
    }

    fn update_filter(&mut self, text: String) {
        self.store.set_filter(self.focused, &text);
        self.filter_inputs[self.focused.index()] = text;
        self.scroll = 0;
    }

    fn sort_focused(&mut self) {
        if self.converting {
            self.set_status(
                StatusKind::Warning,
                "Sorting is available once the conversion finishes",
            );
            return;
        }
        let direction = self.store.sort(self.focused);
        self.scroll = 0;
        self.set_status(
            StatusKind::Info,
            format!("Sorted by {} ({})", self.focused, direction),
        );
    }

    fn cycle_vendor(&mut self) {
        let idx = Vendor::ALL
            .iter()
            .position(|&vendor| vendor == self.vendor)
            .unwrap_or(0);
        self.vendor = Vendor::ALL[(idx + 1) % Vendor::ALL.len()];
        self.output = self.config.output_path(self.vendor);
        self.set_status(
            StatusKind::Info,
            format!(
                "Vendor: {} (Ctrl+R to convert, saves to {})",
                self.vendor.name(),
                self.output.display()
            ),
        );
    }

    fn scroll_to(&mut self, row: usize) {
        self.scroll = row.min(self.store.displayed_len().saturating_sub(1));
    }
}

fn next_field(field: Field) -> Field {
    Field::ALL[(field.index() + 1) % Field::ALL.len()]
}

fn previous_field(field: Field) -> Field {
    Field::ALL[(field.index() + Field::ALL.len() - 1) % Field::ALL.len()]
}

/// Run the interactive preview until the user quits
pub fn run_preview(config: PreviewConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_preview_loop(&mut terminal, config, &SystemBrowser);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_preview_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: PreviewConfig,
    opener: &dyn UrlOpener,
) -> Result<()> {
    let runner = ConversionRunner::new();
    let mut state = PreviewState::new(config);
    let mut handle = start_conversion(&runner, &mut state);

    loop {
        if let Some(active) = &handle {
            // Check before draining: once the thread is done, every event is queued
            let finished = active.is_finished();
            for event in active.try_events() {
                state.apply_event(event);
            }
            if finished && state.converting {
                state.abort_conversion();
            }
        }
        if !state.converting {
            handle = None;
        }

        terminal.draw(|frame| draw_preview(frame, &state))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match state.handle_key(key) {
                PreviewAction::None => {}
                PreviewAction::Quit => return Ok(()),
                PreviewAction::Save => save_output(&mut state),
                PreviewAction::OpenVendorPage => match open_vendor_page(state.vendor, opener) {
                    Ok(url) => state.set_status(StatusKind::Info, format!("Opened {}", url)),
                    Err(err) => state.set_status(StatusKind::Error, format!("{:#}", err)),
                },
                PreviewAction::Reconvert => {
                    handle = start_conversion(&runner, &mut state);
                }
            }
        }
    }
}

fn start_conversion(runner: &ConversionRunner, state: &mut PreviewState) -> Option<ConversionHandle> {
    match runner.start(&state.config.input, state.vendor) {
        Ok(handle) => {
            state.begin_conversion();
            Some(handle)
        }
        Err(err) => {
            state.set_status(StatusKind::Error, err.to_string());
            None
        }
    }
}

fn save_output(state: &mut PreviewState) {
    match write_records(&state.output, state.store.records()) {
        Ok(()) => state.set_status(
            StatusKind::Success,
            format!(
                "✅ Saved {} row(s) to {}",
                state.store.len(),
                state.output.display()
            ),
        ),
        Err(err) => state.set_status(StatusKind::Error, err.to_string()),
    }
}

fn draw_preview(frame: &mut Frame, state: &PreviewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Files and vendor
            Constraint::Length(3), // Progress
            Constraint::Length(3), // Filters
            Constraint::Min(5),    // Table
            Constraint::Length(1), // Summary
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], state);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Progress "),
        )
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(state.progress_ratio())
        .label(format!("{}/{} rows", state.processed, state.total));
    frame.render_widget(gauge, chunks[1]);

    draw_filters(frame, chunks[2], state);
    draw_table(frame, chunks[3], state);

    let summary = state.store.summary();
    let summary_line = Line::from(vec![
        Span::styled("  Rows: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            summary.row_count.to_string(),
            Style::default().fg(Color::Yellow).bold(),
        ),
        Span::styled("   Total quantity: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            summary.quantity_total.to_string(),
            Style::default().fg(Color::Yellow).bold(),
        ),
        Span::styled(
            format!("   ({} stored)", state.store.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(summary_line), chunks[4]);

    let status_line = Line::from(Span::styled(
        format!("  {}", state.status.text),
        Style::default().fg(state.status.kind.color()),
    ));
    frame.render_widget(
        Paragraph::new(status_line).style(Style::default().bg(Color::Black)),
        chunks[5],
    );

    let help = Line::from(vec![
        Span::styled("  ←/→", Style::default().fg(Color::Cyan)),
        Span::styled(" column  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Cyan)),
        Span::styled(" sort  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Ctrl+S", Style::default().fg(Color::Cyan)),
        Span::styled(" save  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Ctrl+O", Style::default().fg(Color::Cyan)),
        Span::styled(" vendor page  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Ctrl+V", Style::default().fg(Color::Cyan)),
        Span::styled(" vendor  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Ctrl+R", Style::default().fg(Color::Cyan)),
        Span::styled(" convert  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::styled(" quit", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(help), chunks[6]);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &PreviewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" ManaBox CSV Converter ")
        .title_style(Style::default().fg(Color::Yellow).bold())
        .title_alignment(Alignment::Center);

    let max_len = (area.width as usize).saturating_sub(14);
    let vendor_note = if state.vendor.is_supported() {
        ""
    } else {
        "  (no mapping yet)"
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(" Input:  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate_string(&state.input().display().to_string(), max_len),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Output: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                truncate_string(&state.output().display().to_string(), max_len / 2),
                Style::default().fg(Color::White),
            ),
            Span::styled("   Vendor: ", Style::default().fg(Color::DarkGray)),
            Span::styled(state.vendor.name(), Style::default().fg(Color::Green).bold()),
            Span::styled(vendor_note, Style::default().fg(Color::Yellow)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_filters(frame: &mut Frame, area: Rect, state: &PreviewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (field, column) in Field::ALL.iter().zip(columns.iter()) {
        let focused = *field == state.focused;
        let border = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" Filter {} ", field));

        let text = state.filter_input(*field);
        let mut spans = if text.is_empty() && !focused {
            vec![Span::styled("any", Style::default().fg(Color::DarkGray))]
        } else {
            vec![Span::styled(text, Style::default().fg(Color::White))]
        };
        if focused {
            spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), *column);
    }
}

fn draw_table(frame: &mut Frame, area: Rect, state: &PreviewState) {
    let header = Row::new(Field::ALL.iter().map(|&field| {
        let arrow = match state.store.sort_direction(field) {
            Some(SortDirection::Ascending) => " ▲",
            Some(SortDirection::Descending) => " ▼",
            None => "",
        };
        let style = if field == state.focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::White).bold()
        };
        Cell::from(format!("{}{}", field.label(), arrow)).style(style)
    }));

    // Borders and header take three lines
    let visible = (area.height as usize).saturating_sub(3);
    let rows: Vec<Row> = state
        .store
        .displayed()
        .skip(state.scroll)
        .take(visible)
        .map(|record| {
            Row::new(
                Field::ALL
                    .iter()
                    .map(|&field| Cell::from(record.field_text(field))),
            )
        })
        .collect();

    let title = format!(
        " Preview Converted Data ({}/{}) ",
        state.store.displayed_len(),
        state.store.len()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(36),
            Constraint::Percentage(10),
            Constraint::Percentage(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title),
    );
    frame.render_widget(table, area);
}

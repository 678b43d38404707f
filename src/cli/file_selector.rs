//! Export picker: browse for a ManaBox CSV and check its header before use
//!
//! Only directories and `.csv` files are listed. The highlighted file's
//! header is read (no rows) and compared against the columns the converter
//! reads, so a file that is not a ManaBox export is caught before the
//! preview starts.

use std::io::{self, stdout};
use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::pipeline::{
    read_column_names, FOIL_COLUMN, NAME_COLUMN, QUANTITY_COLUMN, SET_NAME_COLUMN,
};
use crate::utils::truncate_string;

/// Columns without which a row converts to an empty title or zero copies
pub const REQUIRED_COLUMNS: [&str; 2] = [NAME_COLUMN, QUANTITY_COLUMN];

/// Every column the Card Kingdom mapping reads
pub const CONVERTER_COLUMNS: [&str; 4] =
    [NAME_COLUMN, SET_NAME_COLUMN, FOIL_COLUMN, QUANTITY_COLUMN];

/// Result of the file selector interaction
pub enum FileSelectResult {
    Selected(PathBuf),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Parent,
    Directory,
    Export,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Outcome of reading a candidate file's header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportCheck {
    /// Header found; `missing` lists converter columns that are absent
    Columns {
        total: usize,
        missing: Vec<&'static str>,
    },
    Unreadable(String),
}

impl ExportCheck {
    /// True when every required column is present
    pub fn is_usable(&self) -> bool {
        match self {
            ExportCheck::Columns { missing, .. } => {
                !missing.iter().any(|column| REQUIRED_COLUMNS.contains(column))
            }
            ExportCheck::Unreadable(_) => false,
        }
    }
}

/// Read the header of `path` and report which converter columns it lacks
pub fn check_export(path: &Path) -> ExportCheck {
    match read_column_names(path) {
        Ok(columns) => ExportCheck::Columns {
            total: columns.len(),
            missing: CONVERTER_COLUMNS
                .into_iter()
                .filter(|wanted| !columns.iter().any(|column| column == wanted))
                .collect(),
        },
        Err(err) => ExportCheck::Unreadable(err.to_string()),
    }
}

/// What a key press asks the picker loop to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorAction {
    Continue,
    Choose(PathBuf),
    Cancel,
}

/// Directory listing, search text and header check of the highlighted file
pub struct FileSelector {
    dir: PathBuf,
    entries: Vec<FileEntry>,
    search: String,
    /// Indices into `entries` matching `search`
    visible: Vec<usize>,
    cursor: usize,
    check: Option<ExportCheck>,
    notice: Option<String>,
}

impl FileSelector {
    pub fn new(dir: PathBuf) -> Self {
        let mut selector = Self {
            dir: PathBuf::new(),
            entries: Vec::new(),
            search: String::new(),
            visible: Vec::new(),
            cursor: 0,
            check: None,
            notice: None,
        };
        selector.enter(dir);
        selector
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Entries matching the search text, in listing order
    pub fn visible(&self) -> impl Iterator<Item = &FileEntry> + '_ {
        self.visible.iter().map(move |&idx| &self.entries[idx])
    }

    pub fn highlighted(&self) -> Option<&FileEntry> {
        self.visible.get(self.cursor).map(|&idx| &self.entries[idx])
    }

    /// Header check of the highlighted export, `None` for directories
    pub fn check(&self) -> Option<&ExportCheck> {
        self.check.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SelectorAction {
        self.notice = None;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return SelectorAction::Cancel;
            }
            KeyCode::Esc if self.search.is_empty() => return SelectorAction::Cancel,
            KeyCode::Esc => self.set_search(String::new()),
            KeyCode::Enter => return self.activate(),
            KeyCode::Backspace if self.search.is_empty() => {
                if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
                    self.enter(parent);
                }
            }
            KeyCode::Backspace => {
                let mut search = self.search.clone();
                search.pop();
                self.set_search(search);
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::Home => self.move_cursor(isize::MIN),
            KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Char(c) if !c.is_control() => {
                let mut search = self.search.clone();
                search.push(c);
                self.set_search(search);
            }
            _ => {}
        }
        SelectorAction::Continue
    }

    fn activate(&mut self) -> SelectorAction {
        let Some(entry) = self.highlighted() else {
            return SelectorAction::Continue;
        };
        match entry.kind {
            EntryKind::Parent | EntryKind::Directory => {
                let path = entry.path.clone();
                self.enter(path);
                SelectorAction::Continue
            }
            EntryKind::Export => {
                let path = entry.path.clone();
                match &self.check {
                    Some(check) if check.is_usable() => SelectorAction::Choose(path),
                    Some(ExportCheck::Unreadable(reason)) => {
                        self.notice = Some(format!("Cannot read this file: {}", reason));
                        SelectorAction::Continue
                    }
                    _ => {
                        self.notice = Some(format!(
                            "Not a ManaBox export: needs {} columns",
                            REQUIRED_COLUMNS.join(" and ")
                        ));
                        SelectorAction::Continue
                    }
                }
            }
        }
    }

    fn enter(&mut self, dir: PathBuf) {
        self.entries = list_directory(&dir);
        self.dir = dir;
        self.set_search(String::new());
    }

    fn set_search(&mut self, search: String) {
        let needle = search.to_lowercase();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry.kind == EntryKind::Parent || entry.name.to_lowercase().contains(&needle)
            })
            .map(|(idx, _)| idx)
            .collect();
        self.search = search;
        self.cursor = 0;
        self.refresh_check();
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        let target = (self.cursor as isize).saturating_add(delta);
        self.cursor = target.clamp(0, last as isize) as usize;
        self.refresh_check();
    }

    fn refresh_check(&mut self) {
        self.check = match self.highlighted() {
            Some(entry) if entry.kind == EntryKind::Export => Some(check_export(&entry.path)),
            _ => None,
        };
    }
}

/// `..` first, then subdirectories, then CSV files, each group sorted
/// case-insensitively. Hidden entries are left out.
pub fn list_directory(dir: &Path) -> Vec<FileEntry> {
    let mut dirs = Vec::new();
    let mut exports = Vec::new();

    for entry in std::fs::read_dir(dir).into_iter().flatten().flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            dirs.push(FileEntry {
                name,
                path,
                kind: EntryKind::Directory,
            });
        } else if is_csv_file(&path) {
            exports.push(FileEntry {
                name,
                path,
                kind: EntryKind::Export,
            });
        }
    }

    dirs.sort_by_key(|entry| entry.name.to_lowercase());
    exports.sort_by_key(|entry| entry.name.to_lowercase());

    let parent = dir.parent().map(|parent| FileEntry {
        name: "..".to_string(),
        path: parent.to_path_buf(),
        kind: EntryKind::Parent,
    });
    parent.into_iter().chain(dirs).chain(exports).collect()
}

pub fn is_csv_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Run the picker, starting in the home directory
pub fn run_file_selector() -> Result<FileSelectResult> {
    let start_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_file_selector_loop(&mut terminal, FileSelector::new(start_dir));

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_file_selector_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut selector: FileSelector,
) -> Result<FileSelectResult> {
    loop {
        terminal.draw(|frame| draw_file_selector(frame, &selector))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match selector.handle_key(key) {
                SelectorAction::Continue => {}
                SelectorAction::Choose(path) => return Ok(FileSelectResult::Selected(path)),
                SelectorAction::Cancel => return Ok(FileSelectResult::Cancelled),
            }
        }
    }
}

fn draw_file_selector(frame: &mut Frame, selector: &FileSelector) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Directory and search
            Constraint::Min(6),    // Listing and header check
            Constraint::Length(1), // Notice
            Constraint::Length(1), // Help
        ])
        .split(frame.area());

    let max_dir_len = (rows[0].width as usize).saturating_sub(30);
    let location = Line::from(vec![
        Span::styled(" 📂 ", Style::default().fg(Color::Cyan)),
        Span::styled(
            truncate_string(&selector.dir().display().to_string(), max_dir_len),
            Style::default().fg(Color::White),
        ),
        Span::styled("   Search: ", Style::default().fg(Color::DarkGray)),
        Span::styled(selector.search(), Style::default().fg(Color::Yellow)),
        Span::styled("▌", Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(
        Paragraph::new(location).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Open ManaBox Export ")
                .title_style(Style::default().fg(Color::Yellow).bold()),
        ),
        rows[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);
    draw_listing(frame, columns[0], selector);
    draw_check(frame, columns[1], selector);

    if let Some(notice) = selector.notice() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("  {}", notice),
                Style::default().fg(Color::Red),
            )),
            rows[2],
        );
    }

    let help = Line::from(vec![
        Span::styled("  ↑/↓", Style::default().fg(Color::Cyan)),
        Span::styled(" move  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Cyan)),
        Span::styled(" open  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Backspace", Style::default().fg(Color::Cyan)),
        Span::styled(" up  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(help), rows[3]);
}

fn draw_listing(frame: &mut Frame, area: Rect, selector: &FileSelector) {
    let items: Vec<ListItem> = selector
        .visible()
        .map(|entry| {
            let (label, style) = match entry.kind {
                EntryKind::Parent => ("▴ ..".to_string(), Style::default().fg(Color::DarkGray)),
                EntryKind::Directory => (
                    format!("▸ {}/", entry.name),
                    Style::default().fg(Color::Cyan),
                ),
                EntryKind::Export => (
                    format!("  {}", entry.name),
                    Style::default().fg(Color::White),
                ),
            };
            ListItem::new(label).style(style)
        })
        .collect();

    let empty = items.len() <= 1;
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(if empty {
                    " No CSV files here "
                } else {
                    " Files "
                }),
        )
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold());

    let mut state = ListState::default();
    state.select(selector.highlighted().map(|_| selector.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_check(frame: &mut Frame, area: Rect, selector: &FileSelector) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Header Check ");

    let Some(check) = selector.check() else {
        let hint = Span::styled("Highlight a CSV file", Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(hint).block(block), area);
        return;
    };

    let lines: Vec<Line> = match check {
        ExportCheck::Unreadable(reason) => vec![
            Line::from(Span::styled(
                "✗ Unreadable",
                Style::default().fg(Color::Red).bold(),
            )),
            Line::from(Span::styled(
                reason.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ],
        ExportCheck::Columns { total, missing } => {
            let mut lines = vec![Line::from(Span::styled(
                format!("{} column(s)", total),
                Style::default().fg(Color::DarkGray),
            ))];
            lines.extend(CONVERTER_COLUMNS.iter().map(|column| {
                if missing.contains(column) {
                    let color = if REQUIRED_COLUMNS.contains(column) {
                        Color::Red
                    } else {
                        Color::Yellow
                    };
                    Line::from(Span::styled(
                        format!("✗ {}", column),
                        Style::default().fg(color),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("✓ {}", column),
                        Style::default().fg(Color::Green),
                    ))
                }
            }));
            lines.push(Line::from(""));
            lines.push(if check.is_usable() {
                Line::from(Span::styled(
                    "Ready to convert",
                    Style::default().fg(Color::Green).bold(),
                ))
            } else {
                Line::from(Span::styled(
                    "Not a ManaBox export",
                    Style::default().fg(Color::Red).bold(),
                ))
            });
            lines
        }
    };

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn export_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("exports")).unwrap();
        std::fs::write(
            temp_dir.path().join("b.csv"),
            "Name,Set name,Foil,Quantity\nOpt,Ixalan,normal,1\n",
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("A.CSV"), "Title,Count\nOpt,1\n").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "hi").unwrap();
        std::fs::write(temp_dir.path().join(".hidden.csv"), "Name\n").unwrap();
        temp_dir
    }

    #[test]
    fn test_list_directory_shows_dirs_then_csv_files() {
        let temp_dir = export_dir();

        let names: Vec<String> = list_directory(temp_dir.path())
            .into_iter()
            .map(|entry| entry.name)
            .collect();

        assert_eq!(names, vec!["..", "exports", "A.CSV", "b.csv"]);
    }

    #[test]
    fn test_check_export_reports_missing_columns() {
        let temp_dir = export_dir();

        let good = check_export(&temp_dir.path().join("b.csv"));
        assert_eq!(
            good,
            ExportCheck::Columns {
                total: 4,
                missing: vec![]
            }
        );
        assert!(good.is_usable());

        let other = check_export(&temp_dir.path().join("A.CSV"));
        assert!(!other.is_usable());
        assert!(matches!(
            &other,
            ExportCheck::Columns { missing, .. } if missing.len() == 4
        ));

        let gone = check_export(&temp_dir.path().join("gone.csv"));
        assert!(matches!(gone, ExportCheck::Unreadable(_)));
    }

    #[test]
    fn test_optional_columns_do_not_block() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slim.csv");
        std::fs::write(&path, "Name,Quantity\nOpt,2\n").unwrap();

        let check = check_export(&path);

        assert!(check.is_usable());
        assert_eq!(
            check,
            ExportCheck::Columns {
                total: 2,
                missing: vec![SET_NAME_COLUMN, FOIL_COLUMN]
            }
        );
    }

    #[test]
    fn test_enter_chooses_only_usable_exports() {
        let temp_dir = export_dir();
        let mut selector = FileSelector::new(temp_dir.path().to_path_buf());
        assert!(selector.check().is_none());

        selector.handle_key(key(KeyCode::Down));
        selector.handle_key(key(KeyCode::Down));
        assert_eq!(selector.highlighted().unwrap().name, "A.CSV");
        assert_eq!(selector.handle_key(key(KeyCode::Enter)), SelectorAction::Continue);
        assert!(selector.notice().unwrap().contains("Name and Quantity"));

        selector.handle_key(key(KeyCode::End));
        assert_eq!(
            selector.handle_key(key(KeyCode::Enter)),
            SelectorAction::Choose(temp_dir.path().join("b.csv"))
        );
    }

    #[test]
    fn test_search_and_navigation() {
        let temp_dir = export_dir();
        let mut selector = FileSelector::new(temp_dir.path().to_path_buf());

        selector.handle_key(key(KeyCode::Char('b')));
        let names: Vec<&str> = selector.visible().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "b.csv"]);

        assert_eq!(selector.handle_key(key(KeyCode::Esc)), SelectorAction::Continue);
        assert_eq!(selector.search(), "");

        selector.handle_key(key(KeyCode::Down));
        selector.handle_key(key(KeyCode::Enter));
        assert_eq!(selector.dir(), temp_dir.path().join("exports"));

        selector.handle_key(key(KeyCode::Backspace));
        assert_eq!(selector.dir(), temp_dir.path());
        assert_eq!(selector.handle_key(key(KeyCode::Esc)), SelectorAction::Cancel);
    }
}

//! Modal file browser for browse fields. Blocks the event loop until the
//! user picks or cancels, like every other dialog in the host.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::markup::FileMode;
use crate::widgets::BrowseOptions;

/// Black background style - forced dark mode
fn dark_bg() -> Style {
    Style::default().bg(Color::Black)
}

/// Dark mode block with black background
fn dark_block<'a>(title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(title, Style::default().fg(Color::Cyan)))
        .style(dark_bg())
}

#[derive(Debug, Clone)]
struct BrowseEntry {
    name: String,
    is_dir: bool,
    /// Synthetic "choose this directory" row in directory modes.
    here: bool,
}

struct BrowseState {
    mode: FileMode,
    caption: String,
    dir: PathBuf,
    entries: Vec<BrowseEntry>,
    selected: usize,
    /// Absolute paths marked under `ExistingFiles`, in pick order.
    marked: Vec<String>,
    /// Filename being typed under `AnyFile`.
    name_input: String,
    /// Lowercased suffixes from the filter, e.g. ".png"; empty shows all.
    patterns: Vec<String>,
}

impl BrowseState {
    fn new(options: &BrowseOptions) -> Self {
        let dir = options
            .directory
            .clone()
            .filter(|d| d.is_dir())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        let mut state = Self {
            mode: options.file_mode,
            caption: options.caption.clone(),
            dir,
            entries: Vec::new(),
            selected: 0,
            marked: Vec::new(),
            name_input: String::new(),
            patterns: parse_patterns(options.filter.as_deref()),
        };
        state.refresh();
        state
    }

    fn refresh(&mut self) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        if let Ok(iter) = fs::read_dir(&self.dir) {
            for entry in iter.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    continue;
                }
                let is_dir = entry.path().is_dir();
                if is_dir {
                    dirs.push(name);
                } else if !self.mode.picks_directory() && self.matches(&name) {
                    files.push(name);
                }
            }
        }
        dirs.sort_by_key(|n| n.to_lowercase());
        files.sort_by_key(|n| n.to_lowercase());

        self.entries.clear();
        if self.mode.picks_directory() {
            self.entries.push(BrowseEntry {
                name: String::new(),
                is_dir: false,
                here: true,
            });
        }
        self.entries.extend(dirs.into_iter().map(|name| BrowseEntry {
            name,
            is_dir: true,
            here: false,
        }));
        self.entries
            .extend(files.into_iter().map(|name| BrowseEntry {
                name,
                is_dir: false,
                here: false,
            }));
        if self.selected >= self.entries.len() {
            self.selected = 0;
        }
    }

    fn matches(&self, name: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let lower = name.to_lowercase();
        self.patterns.iter().any(|suffix| lower.ends_with(suffix))
    }

    fn descend(&mut self, name: &str) {
        self.dir = self.dir.join(name);
        self.selected = 0;
        self.refresh();
    }

    fn ascend(&mut self) {
        if self.dir.pop() {
            self.selected = 0;
            self.refresh();
        }
    }

    fn full_path(&self, name: &str) -> String {
        self.dir.join(name).display().to_string()
    }

    fn toggle_mark(&mut self) {
        let Some(entry) = self.entries.get(self.selected) else {
            return;
        };
        if entry.is_dir || entry.here {
            return;
        }
        let path = self.full_path(&entry.name);
        match self.marked.iter().position(|p| p == &path) {
            Some(i) => {
                self.marked.remove(i);
            }
            None => self.marked.push(path),
        }
    }

    /// Resolve the Enter key. `None` keeps browsing (e.g. descended into
    /// a directory), `Some` is the final pick.
    fn confirm(&mut self) -> Option<String> {
        let entry = self.entries.get(self.selected).cloned();
        if let Some(entry) = &entry {
            if entry.here {
                return Some(self.dir.display().to_string());
            }
            if entry.is_dir {
                let name = entry.name.clone();
                self.descend(&name);
                return None;
            }
        }
        match self.mode {
            FileMode::ExistingFiles if !self.marked.is_empty() => Some(self.marked.join(", ")),
            FileMode::AnyFile if !self.name_input.is_empty() => {
                let name = self.name_input.clone();
                Some(self.full_path(&name))
            }
            _ => entry.map(|e| self.full_path(&e.name)),
        }
    }
}

/// Extract suffix patterns from a filter like `Images (*.png *.jpg)`.
fn parse_patterns(filter: Option<&str>) -> Vec<String> {
    let Some(raw) = filter else {
        return Vec::new();
    };
    let inner = match (raw.find('('), raw.rfind(')')) {
        (Some(open), Some(close)) if close > open => &raw[open + 1..close],
        _ => raw,
    };
    inner
        .split_whitespace()
        .filter_map(|p| p.strip_prefix('*'))
        .filter(|s| !s.is_empty() && *s != ".*")
        .map(|s| s.to_lowercase())
        .collect()
}

/// Run the browser on the already-set-up terminal. Returns the picked
/// path text, or `None` on cancel.
pub fn run_browse(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    options: &BrowseOptions,
) -> Result<Option<String>> {
    let mut state = BrowseState::new(options);

    loop {
        terminal.draw(|f| draw_browse(f, &state))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Esc => return Ok(None),
                KeyCode::Up => {
                    state.selected = state.selected.saturating_sub(1);
                }
                KeyCode::Down => {
                    if state.selected + 1 < state.entries.len() {
                        state.selected += 1;
                    }
                }
                KeyCode::Left => state.ascend(),
                KeyCode::Enter => {
                    if let Some(pick) = state.confirm() {
                        return Ok(Some(pick));
                    }
                }
                KeyCode::Char(' ') if state.mode.picks_many() => state.toggle_mark(),
                KeyCode::Char(c) if state.mode == FileMode::AnyFile => {
                    state.name_input.push(c);
                }
                KeyCode::Backspace => {
                    if state.mode == FileMode::AnyFile && !state.name_input.is_empty() {
                        state.name_input.pop();
                    } else {
                        state.ascend();
                    }
                }
                _ => {}
            }
        }
    }
}

fn draw_browse(f: &mut Frame, state: &BrowseState) {
    let area = centered_rect(72, 76, f.size());
    f.render_widget(Clear, area);
    f.render_widget(Block::default().style(dark_bg()), area);

    let caption = format!(" {} ", state.caption);
    let outer = dark_block(&caption);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Current directory
            Constraint::Min(3),    // Entries
            Constraint::Length(1), // Filename / marks
            Constraint::Length(1), // Key hints
        ])
        .split(inner);

    let path = Paragraph::new(Span::styled(
        state.dir.display().to_string(),
        Style::default().fg(Color::Cyan).bg(Color::Black),
    ));
    f.render_widget(path, chunks[0]);

    let items: Vec<ListItem> = state
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marked = !entry.is_dir
                && !entry.here
                && state.marked.iter().any(|p| p == &state.full_path(&entry.name));
            let text = if entry.here {
                "[ choose this directory ]".to_string()
            } else if entry.is_dir {
                format!("▸ {}/", entry.name)
            } else if marked {
                format!("✓ {}", entry.name)
            } else {
                format!("  {}", entry.name)
            };
            let mut style = if entry.is_dir || entry.here {
                Style::default().fg(Color::Cyan).bg(Color::Black)
            } else if marked {
                Style::default().fg(Color::Green).bg(Color::Black)
            } else {
                Style::default().fg(Color::White).bg(Color::Black)
            };
            if i == state.selected {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();
    f.render_widget(List::new(items).style(dark_bg()), chunks[1]);

    let detail = match state.mode {
        FileMode::AnyFile => format!("Name: {}│", state.name_input),
        FileMode::ExistingFiles => format!("{} marked", state.marked.len()),
        _ => String::new(),
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            detail,
            Style::default().fg(Color::Yellow).bg(Color::Black),
        )),
        chunks[2],
    );

    let hints = match state.mode {
        FileMode::ExistingFiles => "↑↓ move  Enter open/pick  Space mark  ← up  Esc cancel",
        FileMode::AnyFile => "↑↓ move  Enter pick  type a name  ← up  Esc cancel",
        FileMode::Directory | FileMode::DirectoryOnly => {
            "↑↓ move  Enter open/choose  ← up  Esc cancel"
        }
        _ => "↑↓ move  Enter open/pick  ← up  Esc cancel",
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            hints,
            Style::default().fg(Color::Gray).bg(Color::Black),
        )),
        chunks[3],
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

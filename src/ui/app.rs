use anyhow::{Context, Result};
use arboard::Clipboard;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::cli::Args;
use crate::config::{Prefs, TabEntry};
use crate::diagnostics::Console;
use crate::filtering;
use crate::tab::{BodyItem, ScriptTab, TabBody};
use crate::ui::browse;
use crate::ui::input::{InputMode, LineEdit};
use crate::ui::render;
use crate::widgets::{BrowseOptions, InputWidget, WidgetState};

/// One keyboard-reachable slot in the active tab body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusTarget {
    /// A top-level standalone button.
    Item { item: usize },
    /// An input widget inside a group.
    Widget { item: usize, widget: usize },
    /// An action button inside a group.
    Button { item: usize, button: usize },
}

impl FocusTarget {
    /// Index of the top-level item this target lives in.
    pub fn item_index(&self) -> usize {
        match *self {
            FocusTarget::Item { item }
            | FocusTarget::Widget { item, .. }
            | FocusTarget::Button { item, .. } => item,
        }
    }
}

/// What the event loop should do after a key was handled.
enum AppFlow {
    Continue,
    Quit,
    /// Run the modal file browser and write the pick back into a field.
    Browse {
        item: usize,
        widget: usize,
        options: BrowseOptions,
    },
}

pub struct App {
    pub prefs: Prefs,
    pub prefs_path: PathBuf,
    pub tabs: Vec<ScriptTab>,
    /// Leading tabs come from the preferences; the rest are session tabs
    /// from the command line and are never written back.
    pub persisted: usize,
    pub active: usize,
    pub console: Console,
    pub show_console: bool,
    pub mode: InputMode,
    pub search: LineEdit,
    pub edit: LineEdit,
    edit_target: Option<(usize, usize)>,
    pub include_items: Vec<String>,
    pub include_selected: usize,
    pub focus_targets: Vec<FocusTarget>,
    pub focus: usize,
    /// First rendered top-level item, as an index into the visible items.
    pub scroll: usize,
    /// Set when focus moved; render scrolls the focused item into view.
    pub snap_focus: bool,
    pub transient: Option<String>,
}

impl App {
    pub fn new(args: &Args, prefs_path: &Path) -> Result<Self> {
        let prefs = Prefs::load(prefs_path);
        let console = Console::new();

        let mut tabs: Vec<ScriptTab> = prefs.tab_data.iter().cloned().map(ScriptTab::new).collect();
        let persisted = tabs.len();
        for script in &args.scripts {
            let entry = TabEntry::new(
                crate::cli::default_tab_name(script),
                script.to_string_lossy(),
            );
            tabs.push(ScriptTab::new(entry));
        }
        let active = prefs.tab_index.min(tabs.len().saturating_sub(1));

        let mut app = Self {
            prefs,
            prefs_path: prefs_path.to_path_buf(),
            tabs,
            persisted,
            active,
            console,
            show_console: false,
            mode: InputMode::Normal,
            search: LineEdit::default(),
            edit: LineEdit::default(),
            edit_target: None,
            include_items: Vec::new(),
            include_selected: 0,
            focus_targets: Vec::new(),
            focus: 0,
            scroll: 0,
            snap_focus: true,
            transient: None,
        };
        app.rebuild_all();
        Ok(app)
    }

    pub fn active_tab(&self) -> Option<&ScriptTab> {
        self.tabs.get(self.active)
    }

    pub fn focus_target(&self) -> Option<FocusTarget> {
        self.focus_targets.get(self.focus).copied()
    }

    /// The widget currently capturing keystrokes, if any.
    pub fn editing(&self) -> Option<(usize, usize)> {
        if self.mode == InputMode::Edit {
            self.edit_target
        } else {
            None
        }
    }

    fn widget_at(&self, item: usize, widget: usize) -> Option<&InputWidget> {
        match self.active_tab()?.body()?.items.get(item)? {
            BodyItem::Group(group) => group.widgets.get(widget),
            _ => None,
        }
    }

    fn widget_at_mut(&mut self, item: usize, widget: usize) -> Option<&mut InputWidget> {
        let tab = self.tabs.get_mut(self.active)?;
        match tab.body_mut()?.items.get_mut(item)? {
            BodyItem::Group(group) => group.widgets.get_mut(widget),
            _ => None,
        }
    }

    pub fn flash(&mut self, text: impl Into<String>) {
        self.transient = Some(text.into());
    }

    /// Rebuild every tab from source, keeping the current filter applied.
    fn rebuild_all(&mut self) {
        let keys = filtering::parse_keys(&self.search.text);
        for tab in &mut self.tabs {
            tab.rebuild(&self.console);
            tab.apply_filter(&keys);
        }
        self.rebuild_focus();
        self.scroll = 0;
        self.snap_focus = true;
    }

    fn rebuild_active(&mut self) {
        let keys = filtering::parse_keys(&self.search.text);
        if let Some(tab) = self.tabs.get_mut(self.active) {
            tab.capture_saved();
            tab.rebuild(&self.console);
            tab.apply_filter(&keys);
        }
        self.rebuild_focus();
        self.snap_focus = true;
    }

    /// Recompute the focusable slots of the active tab, in render order.
    fn rebuild_focus(&mut self) {
        let targets = match self.active_tab().and_then(|t| t.body()) {
            Some(body) => collect_targets(body),
            None => Vec::new(),
        };
        self.focus_targets = targets;
        if self.focus >= self.focus_targets.len() {
            self.focus = self.focus_targets.len().saturating_sub(1);
        }
    }

    fn focus_next(&mut self) {
        if self.focus_targets.is_empty() {
            return;
        }
        self.focus = (self.focus + 1) % self.focus_targets.len();
        self.snap_focus = true;
    }

    fn focus_prev(&mut self) {
        if self.focus_targets.is_empty() {
            return;
        }
        self.focus = self
            .focus
            .checked_sub(1)
            .unwrap_or(self.focus_targets.len() - 1);
        self.snap_focus = true;
    }

    fn switch_tab(&mut self, forward: bool) {
        if self.tabs.is_empty() {
            return;
        }
        let last = self.tabs.len() - 1;
        self.active = if forward {
            (self.active + 1).min(last)
        } else {
            self.active.saturating_sub(1)
        };
        let keys = filtering::parse_keys(&self.search.text);
        if let Some(tab) = self.tabs.get_mut(self.active) {
            tab.apply_filter(&keys);
        }
        self.focus = 0;
        self.scroll = 0;
        self.snap_focus = true;
        self.rebuild_focus();
    }

    fn apply_search(&mut self) {
        let keys = filtering::parse_keys(&self.search.text);
        if let Some(tab) = self.tabs.get_mut(self.active) {
            tab.apply_filter(&keys);
        }
        self.rebuild_focus();
        self.scroll = 0;
        self.snap_focus = true;
    }

    /// Press the focused button, if any.
    fn invoke_focused(&mut self) {
        let before = self.console.len();
        let mut invoked = false;
        if let Some(tab) = self.tabs.get(self.active) {
            if let Some(body) = tab.body() {
                match self.focus_target() {
                    Some(FocusTarget::Item { item }) => {
                        if let Some(BodyItem::Button(button)) = body.items.get(item) {
                            tab.invoke_button(button, &[]);
                            invoked = true;
                        }
                    }
                    Some(FocusTarget::Button { item, button }) => {
                        if let Some(BodyItem::Group(group)) = body.items.get(item) {
                            if let Some(button) = group.buttons.get(button) {
                                tab.invoke_button(button, &group.widgets);
                                invoked = true;
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        if invoked && self.console.len() > before && !self.show_console {
            self.flash("output in console - press c to view");
        }
    }

    /// Enter pressed: invoke a button, toggle a check, or start editing.
    fn activate_focused(&mut self) {
        enum Act {
            Invoke,
            Toggle(usize, usize),
            Edit(usize, usize, String),
            None,
        }
        let act = match self.focus_target() {
            Some(FocusTarget::Item { .. }) | Some(FocusTarget::Button { .. }) => Act::Invoke,
            Some(FocusTarget::Widget { item, widget }) => {
                match self.widget_at(item, widget).map(|w| &w.state) {
                    Some(WidgetState::Check(_)) => Act::Toggle(item, widget),
                    Some(WidgetState::Text(field)) => Act::Edit(item, widget, field.text.clone()),
                    Some(WidgetState::Spinner(spinner)) => {
                        Act::Edit(item, widget, spinner.display())
                    }
                    _ => Act::None,
                }
            }
            None => Act::None,
        };
        match act {
            Act::Invoke => self.invoke_focused(),
            Act::Toggle(item, widget) => self.toggle_check(item, widget),
            Act::Edit(item, widget, seed) => {
                self.edit = LineEdit::with_text(seed);
                self.edit_target = Some((item, widget));
                self.mode = InputMode::Edit;
            }
            Act::None => {}
        }
    }

    fn toggle_check(&mut self, item: usize, widget: usize) {
        if let Some(w) = self.widget_at_mut(item, widget) {
            if let WidgetState::Check(check) = &mut w.state {
                check.toggle();
            }
        }
    }

    fn step_spinner(&mut self, up: bool) {
        let Some(FocusTarget::Widget { item, widget }) = self.focus_target() else {
            return;
        };
        if let Some(w) = self.widget_at_mut(item, widget) {
            if let WidgetState::Spinner(spinner) = &mut w.state {
                if up {
                    spinner.increment();
                } else {
                    spinner.decrement();
                }
            }
        }
    }

    fn commit_edit(&mut self) {
        self.mode = InputMode::Normal;
        let Some((item, widget)) = self.edit_target.take() else {
            return;
        };
        let text = self.edit.text.clone();
        let is_spinner = matches!(
            self.widget_at(item, widget).map(|w| &w.state),
            Some(WidgetState::Spinner(_))
        );
        if is_spinner {
            match text.trim().parse::<f64>() {
                Ok(value) => {
                    if let Some(w) = self.widget_at_mut(item, widget) {
                        if let WidgetState::Spinner(spinner) = &mut w.state {
                            spinner.set(value);
                        }
                    }
                }
                Err(_) => self.flash(format!("not a number: \"{}\"", text.trim())),
            }
        } else if let Some(tab) = self.tabs.get_mut(self.active) {
            tab.apply_field_text(item, widget, text);
        }
    }

    /// Run the focused field's command button; a browse request bubbles
    /// out for the modal.
    fn run_focused_command(&mut self) -> AppFlow {
        let Some(FocusTarget::Widget { item, widget }) = self.focus_target() else {
            self.flash("focus a field to use its command button");
            return AppFlow::Continue;
        };
        let before = self.console.len();
        let request = self
            .tabs
            .get_mut(self.active)
            .and_then(|tab| tab.run_widget_command(item, widget));
        if let Some(options) = request {
            return AppFlow::Browse {
                item,
                widget,
                options,
            };
        }
        if self.console.len() > before && !self.show_console {
            self.flash("output in console - press c to view");
        }
        AppFlow::Continue
    }

    /// Name of the focused button's callable, for exclusion.
    fn focused_function_name(&self) -> Option<String> {
        let body = self.active_tab()?.body()?;
        match self.focus_target()? {
            FocusTarget::Item { item } => match body.items.get(item)? {
                BodyItem::Button(button) => button.function_name.clone(),
                _ => None,
            },
            FocusTarget::Button { item, button } => match body.items.get(item)? {
                BodyItem::Group(group) => group.buttons.get(button)?.function_name.clone(),
                _ => None,
            },
            FocusTarget::Widget { .. } => None,
        }
    }

    fn exclude_focused(&mut self) {
        let Some(name) = self.focused_function_name() else {
            self.flash("focused item has no named function to exclude");
            return;
        };
        let keys = filtering::parse_keys(&self.search.text);
        let tab = &mut self.tabs[self.active];
        tab.capture_saved();
        if tab.exclude(&name) {
            tab.rebuild(&self.console);
            tab.apply_filter(&keys);
            self.rebuild_focus();
            self.snap_focus = true;
            self.flash(format!("excluded \"{name}\" - press i to bring it back"));
        }
    }

    fn open_include_picker(&mut self) {
        let names = match self.active_tab() {
            Some(tab) => tab.entry.excluded.clone(),
            None => Vec::new(),
        };
        if names.is_empty() {
            self.flash("nothing is excluded on this tab");
            return;
        }
        self.include_items = names;
        self.include_selected = 0;
        self.mode = InputMode::Include;
    }

    fn include_selected_name(&mut self) {
        let Some(name) = self.include_items.get(self.include_selected).cloned() else {
            self.mode = InputMode::Normal;
            return;
        };
        let keys = filtering::parse_keys(&self.search.text);
        let tab = &mut self.tabs[self.active];
        tab.capture_saved();
        if tab.include(&name) {
            tab.rebuild(&self.console);
            tab.apply_filter(&keys);
            self.flash(format!("\"{name}\" is back"));
        }
        self.rebuild_focus();
        self.snap_focus = true;
        self.mode = InputMode::Normal;
    }

    fn copy_script_path(&mut self) {
        let Some(path) = self.active_tab().map(|t| t.entry.script.clone()) else {
            return;
        };
        match Clipboard::new().and_then(|mut clip| clip.set_text(path.clone())) {
            Ok(()) => self.flash(format!("copied {path}")),
            Err(err) => {
                error!("clipboard: {err}");
                self.flash(format!("clipboard failed: {err}"));
            }
        }
    }

    fn open_script(&mut self) {
        let Some(path) = self.active_tab().map(|t| t.entry.script.clone()) else {
            return;
        };
        match opener::open(&path) {
            Ok(()) => self.flash(format!("opened {path}")),
            Err(err) => {
                error!("opener: {err}");
                self.flash(format!("open failed: {err}"));
            }
        }
    }

    /// Copy save-flagged widget values back into the persisted entries.
    fn sync_prefs(&mut self) {
        for tab in &mut self.tabs {
            tab.capture_saved();
        }
        for i in 0..self.persisted.min(self.tabs.len()) {
            self.prefs.tab_data[i] = self.tabs[i].entry.clone();
        }
        self.prefs.tab_index = self.active;
    }

    fn save_prefs(&mut self) {
        self.sync_prefs();
        match self.prefs.save(&self.prefs_path) {
            Ok(()) => self.flash("preferences saved"),
            Err(err) => {
                error!("save: {err:#}");
                self.flash(format!("save failed: {err}"));
            }
        }
    }

    /// Final capture and write before leaving the alternate screen.
    fn shutdown(&mut self) -> Result<()> {
        self.sync_prefs();
        self.prefs
            .save(&self.prefs_path)
            .context("saving preferences on exit")
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppFlow {
        self.transient = None;
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Search => {
                self.handle_search_key(key);
                AppFlow::Continue
            }
            InputMode::Edit => {
                self.handle_edit_key(key);
                AppFlow::Continue
            }
            InputMode::Include => {
                self.handle_include_key(key);
                AppFlow::Continue
            }
            InputMode::Help => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
                ) {
                    self.mode = InputMode::Normal;
                }
                AppFlow::Continue
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> AppFlow {
        match key.code {
            KeyCode::Char('q') => return AppFlow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return AppFlow::Quit;
            }
            KeyCode::Char('/') => {
                self.search.move_end();
                self.mode = InputMode::Search;
            }
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Left => self.switch_tab(false),
            KeyCode::Right => self.switch_tab(true),
            KeyCode::Enter => self.activate_focused(),
            KeyCode::Char(' ') => {
                let check = match self.focus_target() {
                    Some(FocusTarget::Widget { item, widget }) => {
                        match self.widget_at(item, widget).map(|w| &w.state) {
                            Some(WidgetState::Check(_)) => Some((item, widget)),
                            _ => return AppFlow::Continue,
                        }
                    }
                    Some(_) => None,
                    None => return AppFlow::Continue,
                };
                match check {
                    Some((item, widget)) => self.toggle_check(item, widget),
                    None => self.invoke_focused(),
                }
            }
            KeyCode::Char('+') => self.step_spinner(true),
            KeyCode::Char('-') => self.step_spinner(false),
            KeyCode::Char('b') => return self.run_focused_command(),
            KeyCode::Char('x') => self.exclude_focused(),
            KeyCode::Char('i') => self.open_include_picker(),
            KeyCode::Char('r') => {
                self.rebuild_active();
                let name = self.active_tab().map(|t| t.name().to_string());
                if let Some(name) = name {
                    self.flash(format!("refreshed \"{name}\""));
                }
            }
            KeyCode::Char('R') => {
                self.rebuild_all();
                self.flash(format!("refreshed {} tab(s)", self.tabs.len()));
            }
            KeyCode::Char('s') => self.save_prefs(),
            KeyCode::Char('c') => self.show_console = !self.show_console,
            KeyCode::Char('y') => self.copy_script_path(),
            KeyCode::Char('o') => self.open_script(),
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(3);
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(3);
            }
            KeyCode::Char('?') => self.mode = InputMode::Help,
            _ => {}
        }
        AppFlow::Continue
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = InputMode::Normal;
            }
            _ => {
                if self.search.handle_key(key) {
                    self.apply_search();
                }
            }
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Esc => {
                self.edit_target = None;
                self.mode = InputMode::Normal;
            }
            _ => {
                self.edit.handle_key(key);
            }
        }
    }

    fn handle_include_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Up => {
                self.include_selected = self.include_selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.include_selected + 1 < self.include_items.len() {
                    self.include_selected += 1;
                }
            }
            KeyCode::Enter => self.include_selected_name(),
            _ => {}
        }
    }

    /// What the status line should show, by precedence.
    pub fn status_line(&self) -> String {
        if let Some(text) = &self.transient {
            return text.clone();
        }
        if let Some(tip) = self.focused_tooltip() {
            return tip;
        }
        if let Some(tip) = self
            .active_tab()
            .and_then(|t| t.body())
            .and_then(|b| b.settings.tool_tip.clone())
        {
            return tip;
        }
        match self.mode {
            InputMode::Search => "enter/esc done - ctrl+u clear".to_string(),
            InputMode::Edit => "enter commit - esc cancel".to_string(),
            InputMode::Include => "enter bring back - esc close".to_string(),
            _ => "q quit - / filter - tab/arrows move - enter activate - b command - ? help"
                .to_string(),
        }
    }

    fn focused_tooltip(&self) -> Option<String> {
        let body = self.active_tab()?.body()?;
        match self.focus_target()? {
            FocusTarget::Item { item } => match body.items.get(item)? {
                BodyItem::Button(button) => button.tool_tip.clone(),
                _ => None,
            },
            FocusTarget::Widget { item, widget } => match body.items.get(item)? {
                BodyItem::Group(group) => {
                    let w = group.widgets.get(widget)?;
                    w.tool_tip.clone().or_else(|| group.tool_tip.clone())
                }
                _ => None,
            },
            FocusTarget::Button { item, button } => match body.items.get(item)? {
                BodyItem::Group(group) => {
                    let b = group.buttons.get(button)?;
                    b.tool_tip.clone().or_else(|| group.tool_tip.clone())
                }
                _ => None,
            },
        }
    }
}

/// Focusable slots of a body, in the order the renderer lays them out.
fn collect_targets(body: &TabBody) -> Vec<FocusTarget> {
    let mut targets = Vec::new();
    for (i, item) in body.items.iter().enumerate() {
        if !item.visible() {
            continue;
        }
        match item {
            BodyItem::Button(_) => targets.push(FocusTarget::Item { item: i }),
            BodyItem::Group(group) => {
                for (w, widget) in group.widgets.iter().enumerate() {
                    if widget.is_focusable() {
                        targets.push(FocusTarget::Widget { item: i, widget: w });
                    }
                }
                for b in 0..group.buttons.len() {
                    targets.push(FocusTarget::Button { item: i, button: b });
                }
            }
        }
    }
    targets
}

pub fn run_app(args: &Args, prefs_path: &Path) -> Result<()> {
    info!("starting UI with prefs at {}", prefs_path.display());
    let mut app = App::new(args, prefs_path)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    execute!(stdout, crossterm::cursor::SetCursorStyle::DefaultUserShape)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            match app.handle_key(key) {
                AppFlow::Continue => {}
                AppFlow::Quit => {
                    app.shutdown()?;
                    return Ok(());
                }
                AppFlow::Browse {
                    item,
                    widget,
                    options,
                } => {
                    match browse::run_browse(terminal, &options)? {
                        Some(text) => {
                            if let Some(tab) = app.tabs.get_mut(app.active) {
                                tab.apply_field_text(item, widget, text);
                            }
                        }
                        None => app.flash("browse cancelled"),
                    }
                }
            }
        }
    }
}

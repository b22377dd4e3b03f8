use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which part of the app owns the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    /// The filter line captures keystrokes; the filter re-applies on
    /// every change.
    Search,
    /// A focused text or spinner widget captures keystrokes.
    Edit,
    /// The include-back picker overlay is open.
    Include,
    Help,
}

/// Single-line editor state. The cursor is a character index so that
/// multi-byte input never splits a code point.
#[derive(Debug, Clone, Default)]
pub struct LineEdit {
    pub text: String,
    pub cursor: usize,
}

impl LineEdit {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn rebuild(&mut self, chars: Vec<char>) {
        self.text = chars.into_iter().collect();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut chars: Vec<char> = self.text.chars().collect();
        chars.insert(self.cursor, c);
        self.cursor += 1;
        self.rebuild(chars);
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut chars: Vec<char> = self.text.chars().collect();
        chars.remove(self.cursor - 1);
        self.cursor -= 1;
        self.rebuild(chars);
    }

    pub fn delete_char(&mut self) {
        let mut chars: Vec<char> = self.text.chars().collect();
        if self.cursor < chars.len() {
            chars.remove(self.cursor);
            self.rebuild(chars);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// The text with a bar marking the cursor, for rendering.
    pub fn display_with_cursor(&self) -> String {
        let mut out = String::with_capacity(self.text.len() + 3);
        for (i, c) in self.text.chars().enumerate() {
            if i == self.cursor {
                out.push('│');
            }
            out.push(c);
        }
        if self.cursor >= self.text.chars().count() {
            out.push('│');
        }
        out
    }

    /// Apply one key to the buffer. Returns true when the text changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear();
                true
            }
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Delete => {
                self.delete_char();
                true
            }
            KeyCode::Left => {
                self.move_left();
                false
            }
            KeyCode::Right => {
                self.move_right();
                false
            }
            KeyCode::Home => {
                self.move_home();
                false
            }
            KeyCode::End => {
                self.move_end();
                false
            }
            _ => false,
        }
    }
}

pub fn help_text() -> Vec<&'static str> {
    vec![
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━",
        "                          SCRIB - Help                             ",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━",
        "",
        "  Navigation:",
        "    Tab/↓       Next item                    Shift+Tab/↑  Previous item",
        "    ←/→         Switch tab                   PgUp/PgDn    Scroll",
        "",
        "  Items:",
        "    Enter       Press button / edit field / toggle check",
        "    Space       Toggle check / press button",
        "    +/-         Step a focused spinner",
        "    b           Run a field's command button (script / capture / browse)",
        "",
        "  Tab management:",
        "    /           Edit the filter line (comma keys, 'not ' negates)",
        "    x           Exclude the focused button's function",
        "    i           Bring back an excluded function",
        "    r           Refresh this tab (captures saved values first)",
        "    R           Refresh all tabs",
        "",
        "  Host:",
        "    s           Save preferences now",
        "    c           Toggle the console pane",
        "    y           Copy script path to clipboard",
        "    o           Open script in the default application",
        "    ?           Toggle this help          q  Quit (saves preferences)",
        "",
        "  Press Esc, q or ? to close help...",
        "",
    ]
}

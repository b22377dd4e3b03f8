use std::path::PathBuf;

use mlua::Function;

use crate::markup::FileMode;

/// What a field's command button does when pressed.
#[derive(Debug, Clone)]
pub enum FieldCommand {
    /// Call a script function with no arguments; a non-nil result is
    /// written into the field.
    Script(Function),
    /// Open the file browser and write the picked path(s) into the field.
    Browse(BrowseOptions),
    /// Write the current host selection into the field.
    Capture { multi: bool },
}

/// Browse dialog configuration carried by a browse field.
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    pub caption: String,
    pub filter: Option<String>,
    pub file_mode: FileMode,
    pub directory: Option<PathBuf>,
}

/// Editable single-line text state shared by the whole text-field family.
/// The cursor is a character index, as in the rest of the input handling.
#[derive(Debug, Clone)]
pub struct TextField {
    pub text: String,
    pub cursor: usize,
    pub placeholder: Option<String>,
    pub eval: bool,
    pub error_if_empty: bool,
    pub check_existing: bool,
    pub command: Option<FieldCommand>,
    /// Label shown on the command button; empty when there is none.
    pub button_label: String,
    pub button_tool_tip: Option<String>,
}

impl TextField {
    pub fn set_text(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }

    pub fn insert_char(&mut self, c: char) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let at = self.cursor.min(chars.len());
        chars.insert(at, c);
        self.text = chars.into_iter().collect();
        self.cursor = at + 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut chars: Vec<char> = self.text.chars().collect();
        if self.cursor <= chars.len() {
            chars.remove(self.cursor - 1);
            self.text = chars.into_iter().collect();
            self.cursor -= 1;
        }
    }

    pub fn delete_char(&mut self) {
        let mut chars: Vec<char> = self.text.chars().collect();
        if self.cursor < chars.len() {
            chars.remove(self.cursor);
            self.text = chars.into_iter().collect();
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let len = self.text.chars().count();
        if self.cursor < len {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Comma-separated tokens of the field text, trimmed, empties dropped.
    pub fn tokens(&self) -> Vec<String> {
        self.text
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn has_command(&self) -> bool {
        self.command.is_some()
    }
}

pub mod builder;

pub use builder::{ActionButton, BodyItem, GroupBody, TabBody, chain_rows};

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, error};

use crate::config::{SavedValues, TabEntry};
use crate::diagnostics::Console;
use crate::filtering::FilterKey;
use crate::script::{LoadedScript, ScriptRuntime};
use crate::widgets::{BrowseOptions, CommandOutcome, InputWidget};

/// Build lifecycle of one tab. Refreshing always tears the whole body
/// down and rebuilds it; there is no partial state.
#[derive(Debug, Default)]
pub enum TabState {
    #[default]
    Unbuilt,
    Built(TabBody),
    Error(String),
}

/// One tab: its persisted descriptor plus whatever the last build produced.
pub struct ScriptTab {
    pub entry: TabEntry,
    pub state: TabState,
    script: Option<LoadedScript>,
    /// Validation warnings from the last build, for the check command.
    pub warnings: Vec<String>,
}

impl ScriptTab {
    pub fn new(entry: TabEntry) -> Self {
        Self {
            entry,
            state: TabState::Unbuilt,
            script: None,
            warnings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn body(&self) -> Option<&TabBody> {
        match &self.state {
            TabState::Built(body) => Some(body),
            _ => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut TabBody> {
        match &mut self.state {
            TabState::Built(body) => Some(body),
            _ => None,
        }
    }

    pub fn runtime(&self) -> Option<&ScriptRuntime> {
        self.script.as_ref().map(|s| &s.runtime)
    }

    pub fn error_text(&self) -> Option<&str> {
        match &self.state {
            TabState::Error(text) => Some(text),
            _ => None,
        }
    }

    /// Tear down and rebuild from the script file. Load and build failures
    /// land in [`TabState::Error`] and never escape the tab.
    pub fn rebuild(&mut self, console: &Console) {
        self.script = None;
        self.state = TabState::Unbuilt;
        self.warnings.clear();

        let path = Path::new(&self.entry.script);
        let script = match LoadedScript::load(path, console) {
            Ok(script) => script,
            Err(err) => {
                error!("tab \"{}\": {}", self.entry.name, err);
                let text = format!("Failed to parse {}\n\n{}", self.entry.script, err.render());
                console.log(&text);
                self.state = TabState::Error(text);
                return;
            }
        };

        let mut warnings = Vec::new();
        match builder::build_tab(&script, &self.entry.excluded, &self.entry.saved, &mut warnings) {
            Ok(body) => {
                for warning in &warnings {
                    console.warn(warning);
                }
                self.state = TabState::Built(body);
                self.script = Some(script);
            }
            Err(err) => {
                error!("tab \"{}\": {}", self.entry.name, err);
                let text = format!("Failed to parse {}\n\n# {}", self.entry.script, err);
                console.log(&text);
                self.state = TabState::Error(text);
            }
        }
        self.warnings = warnings;
    }

    /// Capture save-flagged widget values into the descriptor, replacing
    /// the previous snapshot. No-op unless the tab is built.
    pub fn capture_saved(&mut self) {
        let TabState::Built(body) = &self.state else {
            return;
        };
        let mut saved = SavedValues::new();
        for item in &body.items {
            let BodyItem::Group(group) = item else {
                continue;
            };
            let mut values = BTreeMap::new();
            for widget in &group.widgets {
                if !widget.save {
                    continue;
                }
                let Some(label) = &widget.label else {
                    debug!(
                        "not capturing unlabelled widget in group \"{}\"",
                        group.label
                    );
                    continue;
                };
                if let Some(value) = widget.capture() {
                    values.insert(label.clone(), value);
                }
            }
            if !values.is_empty() {
                saved.insert(group.label.clone(), values);
            }
        }
        self.entry.saved = saved;
    }

    /// Toggle visibility of top-level items against the parsed search keys.
    pub fn apply_filter(&mut self, keys: &[FilterKey]) {
        let TabState::Built(body) = &mut self.state else {
            return;
        };
        for item in &mut body.items {
            let visible = crate::filtering::label_matches(item.filter_label(), keys);
            item.set_visible(visible);
        }
    }

    /// Add a callable name to the exclusion set. The change shows after
    /// the next rebuild.
    pub fn exclude(&mut self, name: &str) -> bool {
        if self.entry.excluded.iter().any(|e| e == name) {
            return false;
        }
        self.entry.excluded.push(name.to_string());
        true
    }

    pub fn include(&mut self, name: &str) -> bool {
        let before = self.entry.excluded.len();
        self.entry.excluded.retain(|e| e != name);
        self.entry.excluded.len() != before
    }

    pub fn include_all(&mut self) {
        self.entry.excluded.clear();
    }

    /// Press an action button: read its bound widgets, then call. Read
    /// errors abort before the call; script errors render a traceback.
    /// Neither leaves the tab unusable.
    pub fn invoke_button(&self, button: &ActionButton, widgets: &[InputWidget]) {
        let Some(script) = &self.script else {
            return;
        };
        let rt = &script.runtime;
        let mut args = Vec::with_capacity(button.inputs.len());
        for &index in &button.inputs {
            let Some(widget) = widgets.get(index) else {
                continue;
            };
            match widget.read(rt) {
                Ok(value) => args.push(value),
                Err(err) => {
                    error!("button \"{}\": {}", button.label, err);
                    rt.console().log(format!("# {err}"));
                    return;
                }
            }
        }
        if let Err(trace) = rt.call(&button.function, args) {
            error!("button \"{}\": {}", button.label, trace.message);
            rt.console().log(trace.render());
        }
    }

    /// Press a field's command button. A browse request bubbles up for the
    /// host to run its modal.
    pub fn run_widget_command(&mut self, item: usize, widget: usize) -> Option<BrowseOptions> {
        let script = self.script.as_ref()?;
        let TabState::Built(body) = &mut self.state else {
            return None;
        };
        let Some(BodyItem::Group(group)) = body.items.get_mut(item) else {
            return None;
        };
        let target = group.widgets.get_mut(widget)?;
        match target.run_command(&script.runtime) {
            CommandOutcome::NeedsBrowse(options) => Some(options),
            CommandOutcome::Done => None,
        }
    }

    /// Write text into a field with validation, e.g. a browse pick.
    pub fn apply_field_text(&mut self, item: usize, widget: usize, text: String) {
        let Some(script) = self.script.as_ref() else {
            return;
        };
        let TabState::Built(body) = &mut self.state else {
            return;
        };
        let Some(BodyItem::Group(group)) = body.items.get_mut(item) else {
            return;
        };
        if let Some(target) = group.widgets.get_mut(widget) {
            target.apply_text(&script.runtime, text);
        }
    }
}

pub mod check;
pub mod field;
pub mod registry;
pub mod spinner;

pub use check::CheckField;
pub use field::{BrowseOptions, FieldCommand, TextField};
pub use registry::WidgetKind;
pub use spinner::SpinnerField;

use std::path::PathBuf;

use mlua::{Function, Value};
use tracing::debug;

use crate::diagnostics::InputError;
use crate::markup::{InputParams, InputSpec, Rgb};
use crate::script::ScriptRuntime;

/// Outcome of pressing a field's command button.
#[derive(Debug)]
pub enum CommandOutcome {
    /// The command ran (or there was nothing to run); any result has been
    /// written into the field.
    Done,
    /// The host must open the file browser and write back the pick.
    NeedsBrowse(BrowseOptions),
}

/// Variant state of a built widget.
#[derive(Debug, Clone)]
pub enum WidgetState {
    Stretch,
    Spacer { size: u16 },
    Separator { vertical: bool },
    Text(TextField),
    Spinner(SpinnerField),
    Check(CheckField),
}

/// A built input widget: common presentation plus variant state.
#[derive(Debug, Clone)]
pub struct InputWidget {
    pub kind: WidgetKind,
    pub label: Option<String>,
    pub tool_tip: Option<String>,
    pub color: Option<Rgb>,
    pub share: bool,
    pub save: bool,
    pub state: WidgetState,
}

impl InputWidget {
    /// Materialize a validated spec. Command-button callables arrive
    /// already resolved; everything fallible happened during decode.
    pub fn from_spec(spec: &InputSpec, command_fn: Option<Function>) -> Self {
        let state = match &spec.params {
            InputParams::Stretch => WidgetState::Stretch,
            InputParams::Spacer { size } => WidgetState::Spacer { size: *size },
            InputParams::Separator { vertical } => WidgetState::Separator {
                vertical: *vertical,
            },
            InputParams::Check { value } => WidgetState::Check(CheckField::new(*value)),
            InputParams::Spinner(params) => WidgetState::Spinner(SpinnerField::from_params(params)),
            InputParams::Text(params) => {
                let command = match spec.kind {
                    WidgetKind::CmdLineEdit => command_fn.map(FieldCommand::Script),
                    WidgetKind::Browse => Some(FieldCommand::Browse(BrowseOptions {
                        caption: params
                            .caption
                            .clone()
                            .unwrap_or_else(|| "Browse".to_string()),
                        filter: params.filter.clone(),
                        file_mode: params.file_mode,
                        directory: params.directory.as_ref().map(PathBuf::from),
                    })),
                    kind if kind.captures_selection() => Some(FieldCommand::Capture {
                        multi: kind.captures_many(),
                    }),
                    _ => None,
                };
                let button_label = match spec.kind {
                    WidgetKind::Browse => " Browse: ".to_string(),
                    _ if command.is_some() => params
                        .button_label
                        .clone()
                        .unwrap_or_else(|| " > ".to_string()),
                    _ => String::new(),
                };
                let mut field = TextField {
                    text: String::new(),
                    cursor: 0,
                    placeholder: params.placeholder.clone(),
                    eval: params.eval,
                    error_if_empty: params.error_if_empty,
                    check_existing: params.check_existing,
                    command,
                    button_label,
                    button_tool_tip: params.button_tool_tip.clone(),
                };
                field.set_text(params.text.clone());
                WidgetState::Text(field)
            }
        };

        Self {
            kind: spec.kind,
            label: spec.label.clone(),
            tool_tip: spec.tool_tip.clone(),
            color: spec.color,
            share: spec.share,
            save: spec.save,
            state,
        }
    }

    /// Label for messages; falls back to the type tag.
    pub fn label_text(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("({})", self.kind.tag()))
    }

    /// Structural widgets shape layout and take no focus.
    pub fn is_focusable(&self) -> bool {
        !self.kind.is_structural()
    }

    /// Read this widget's value for a script call.
    pub fn read(&self, rt: &ScriptRuntime) -> Result<Value, InputError> {
        match &self.state {
            WidgetState::Stretch | WidgetState::Spacer { .. } | WidgetState::Separator { .. } => {
                Err(InputError::NotReadable {
                    label: self.label_text(),
                })
            }
            WidgetState::Check(check) => Ok(Value::Boolean(check.value)),
            WidgetState::Spinner(spinner) => {
                if spinner.float {
                    Ok(Value::Number(spinner.value))
                } else {
                    Ok(Value::Integer(spinner.value as i64))
                }
            }
            WidgetState::Text(field) => self.read_text(field, rt),
        }
    }

    fn read_text(&self, field: &TextField, rt: &ScriptRuntime) -> Result<Value, InputError> {
        if field.text.is_empty() && field.error_if_empty {
            return Err(InputError::EmptyField {
                label: self.label_text(),
            });
        }
        match self.kind {
            WidgetKind::LineEdit | WidgetKind::CmdLineEdit if field.eval => rt
                .eval(&field.text)
                .map_err(|trace| InputError::Eval {
                    label: self.label_text(),
                    detail: trace.message,
                }),
            WidgetKind::SelectionMulti => {
                let table = rt.lua().create_table()?;
                for (i, token) in field.tokens().into_iter().enumerate() {
                    table.set(i + 1, token)?;
                }
                Ok(Value::Table(table))
            }
            WidgetKind::PyNode => {
                let name = field.text.clone();
                rt.object(&name).ok_or_else(|| InputError::MissingObject {
                    label: self.label_text(),
                    name: name.clone(),
                })
            }
            WidgetKind::PyNodeMulti => {
                let table = rt.lua().create_table()?;
                for (i, name) in field.tokens().into_iter().enumerate() {
                    let value = rt.object(&name).ok_or_else(|| InputError::MissingObject {
                        label: self.label_text(),
                        name: name.clone(),
                    })?;
                    table.set(i + 1, value)?;
                }
                Ok(Value::Table(table))
            }
            _ => Ok(Value::String(rt.lua().create_string(&field.text)?)),
        }
    }

    /// Simple textual value for persistence; `None` for structural widgets.
    pub fn capture(&self) -> Option<serde_json::Value> {
        match &self.state {
            WidgetState::Stretch | WidgetState::Spacer { .. } | WidgetState::Separator { .. } => {
                None
            }
            WidgetState::Text(field) => Some(serde_json::Value::String(field.text.clone())),
            WidgetState::Check(check) => Some(serde_json::Value::Bool(check.value)),
            WidgetState::Spinner(spinner) => {
                if spinner.float {
                    serde_json::Number::from_f64(spinner.value).map(serde_json::Value::Number)
                } else {
                    Some(serde_json::Value::Number(serde_json::Number::from(
                        spinner.value as i64,
                    )))
                }
            }
        }
    }

    /// Apply a persisted value from a previous session.
    pub fn apply_saved(&mut self, rt: &ScriptRuntime, value: &serde_json::Value) {
        match &mut self.state {
            WidgetState::Stretch | WidgetState::Spacer { .. } | WidgetState::Separator { .. } => {}
            WidgetState::Text(_) => {
                let text = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return,
                };
                self.apply_text(rt, text);
            }
            WidgetState::Spinner(spinner) => {
                if let Some(v) = value.as_f64() {
                    spinner.set(v);
                } else if let Some(s) = value.as_str() {
                    if let Ok(v) = s.parse::<f64>() {
                        spinner.set(v);
                    }
                }
            }
            WidgetState::Check(check) => {
                if let Some(b) = value.as_bool() {
                    check.value = b;
                } else if let Some(s) = value.as_str() {
                    check.value = s.eq_ignore_ascii_case("true");
                }
            }
        }
    }

    /// Write text into a text field, honoring `checkExisting` for the
    /// selection family: unknown names warn and clear, as on any other
    /// rejected write.
    pub fn apply_text(&mut self, rt: &ScriptRuntime, text: String) {
        let label = self.label_text();
        let WidgetState::Text(field) = &mut self.state else {
            return;
        };
        if self.kind.captures_selection() && field.check_existing && !text.is_empty() {
            let missing: Vec<String> = text
                .split(',')
                .map(|t| t.trim())
                .filter(|t| !t.is_empty() && !rt.object_exists(t))
                .map(|t| t.to_string())
                .collect();
            if !missing.is_empty() {
                rt.console().warn(format!(
                    "\"{}\" does not exist; clearing \"{label}\"",
                    missing.join(", ")
                ));
                field.set_text(String::new());
                return;
            }
        }
        field.set_text(text);
    }

    /// Press the field's command button.
    pub fn run_command(&mut self, rt: &ScriptRuntime) -> CommandOutcome {
        let WidgetState::Text(field) = &self.state else {
            return CommandOutcome::Done;
        };
        match field.command.clone() {
            None => CommandOutcome::Done,
            Some(FieldCommand::Browse(options)) => CommandOutcome::NeedsBrowse(options),
            Some(FieldCommand::Script(func)) => {
                match rt.call_for_value(&func) {
                    Ok(Value::Nil) => {
                        debug!("command for \"{}\" returned nil", self.label_text());
                    }
                    Ok(value) => {
                        let text = rt.display(&value);
                        self.apply_text(rt, text);
                    }
                    Err(trace) => rt.console().log(trace.render()),
                }
                CommandOutcome::Done
            }
            Some(FieldCommand::Capture { multi }) => {
                let names = rt.selection();
                if names.is_empty() {
                    rt.console().warn(format!(
                        "nothing is selected to put into \"{}\"",
                        self.label_text()
                    ));
                } else if multi {
                    self.apply_text(rt, names.join(", "));
                } else {
                    self.apply_text(rt, names[0].clone());
                }
                CommandOutcome::Done
            }
        }
    }
}

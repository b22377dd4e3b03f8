use mlua::Function;
use tracing::debug;

use crate::config::SavedValues;
use crate::diagnostics::ConfigError;
use crate::markup::{
    ButtonSpec, ContentItem, FunctionRef, GroupSpec, InputParams, Instructions, Rgb, Settings,
};
use crate::script::LoadedScript;
use crate::widgets::InputWidget;

/// A fully built tab body, ready to render and run.
#[derive(Debug)]
pub struct TabBody {
    pub settings: Settings,
    pub items: Vec<BodyItem>,
    pub simple: bool,
}

/// One top-level item: a standalone button or a widget group.
#[derive(Debug)]
pub enum BodyItem {
    Button(ActionButton),
    Group(GroupBody),
}

impl BodyItem {
    /// Label the filter engine tests against.
    pub fn filter_label(&self) -> &str {
        match self {
            BodyItem::Button(button) => &button.label,
            BodyItem::Group(group) => &group.label,
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            BodyItem::Button(button) => button.visible,
            BodyItem::Group(group) => group.visible,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            BodyItem::Button(button) => button.visible = visible,
            BodyItem::Group(group) => group.visible = visible,
        }
    }
}

/// A built group: widgets in share-chained rows plus action buttons.
#[derive(Debug)]
pub struct GroupBody {
    pub label: String,
    pub color: Option<Rgb>,
    pub tool_tip: Option<String>,
    pub widgets: Vec<InputWidget>,
    pub widget_rows: Vec<Vec<usize>>,
    pub buttons: Vec<ActionButton>,
    pub button_rows: Vec<Vec<usize>>,
    pub visible: bool,
}

/// A button wired to a resolved callable.
#[derive(Debug)]
pub struct ActionButton {
    pub label: String,
    pub tool_tip: Option<String>,
    pub icon: Option<String>,
    pub color: Option<Rgb>,
    /// Name the callable resolved from; direct function values have none
    /// and cannot be excluded by name.
    pub function_name: Option<String>,
    pub function: Function,
    /// Indices into the owning group's widget sequence.
    pub inputs: Vec<usize>,
    pub share: bool,
    pub visible: bool,
}

impl ActionButton {
    /// Button label with its icon glyph prepended.
    pub fn display_label(&self) -> String {
        match &self.icon {
            Some(icon) => format!("{icon} {}", self.label),
            None => self.label.clone(),
        }
    }
}

/// Group rows as maximal runs of consecutive share-flagged entries. An
/// entry without the share flag always starts a new row. The rule only
/// looks at the flags, never at what the entries are.
pub fn chain_rows(shares: &[bool]) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut prev_shared = false;
    for (index, &shared) in shares.iter().enumerate() {
        match rows.last_mut() {
            Some(row) if shared && prev_shared => row.push(index),
            _ => rows.push(vec![index]),
        }
        prev_shared = shared;
    }
    rows
}

/// Build a tab body from a loaded script: advanced when the sentinel is
/// present, simple discovery otherwise.
pub fn build_tab(
    script: &LoadedScript,
    excluded: &[String],
    saved: &SavedValues,
    warnings: &mut Vec<String>,
) -> Result<TabBody, ConfigError> {
    match script.instructions_value() {
        Some(value) => {
            let instructions = Instructions::decode(&value, warnings)?;
            build_advanced(script, &instructions, excluded, saved)
        }
        None => Ok(build_simple(script, excluded)),
    }
}

/// One button per discovered callable, minus doc-marker and excluded names.
fn build_simple(script: &LoadedScript, excluded: &[String]) -> TabBody {
    let mut items = Vec::new();
    for (name, function) in &script.callables {
        if script.doc_excluded(name) {
            debug!("simple mode: \"{name}\" opted out by doc marker");
            continue;
        }
        if excluded.iter().any(|e| e == name) {
            continue;
        }
        items.push(BodyItem::Button(ActionButton {
            label: name.clone(),
            tool_tip: None,
            icon: None,
            color: None,
            function_name: Some(name.clone()),
            function: function.clone(),
            inputs: Vec::new(),
            share: false,
            visible: true,
        }));
    }
    TabBody {
        settings: Settings::default(),
        items,
        simple: true,
    }
}

fn build_advanced(
    script: &LoadedScript,
    instructions: &Instructions,
    excluded: &[String],
    saved: &SavedValues,
) -> Result<TabBody, ConfigError> {
    let mut items = Vec::new();
    for content in &instructions.contents {
        match content {
            ContentItem::Simple(simple) => {
                let (function, function_name) = resolve(&simple.function, script)?;
                if is_excluded(&function_name, excluded) {
                    continue;
                }
                let label = simple
                    .label
                    .clone()
                    .or_else(|| function_name.clone())
                    .unwrap_or_else(|| "(function)".to_string());
                items.push(BodyItem::Button(ActionButton {
                    label,
                    tool_tip: simple.tool_tip.clone(),
                    icon: simple.icon.clone(),
                    color: simple.color,
                    function_name,
                    function,
                    inputs: Vec::new(),
                    share: false,
                    visible: true,
                }));
            }
            ContentItem::Group(group) => {
                items.push(BodyItem::Group(build_group(script, group, excluded, saved)?));
            }
        }
    }
    Ok(TabBody {
        settings: instructions.settings.clone(),
        items,
        simple: false,
    })
}

fn build_group(
    script: &LoadedScript,
    spec: &GroupSpec,
    excluded: &[String],
    saved: &SavedValues,
) -> Result<GroupBody, ConfigError> {
    let group_saved = saved.get(&spec.label);

    let mut widgets = Vec::new();
    for input in &spec.inputs {
        let command_fn = match &input.params {
            InputParams::Text(params) => match &params.button_command {
                Some(fref) => Some(resolve(fref, script)?.0),
                None => None,
            },
            _ => None,
        };
        let mut widget = InputWidget::from_spec(input, command_fn);
        if let (Some(values), Some(label)) = (group_saved, &widget.label) {
            if let Some(value) = values.get(label).cloned() {
                widget.apply_saved(&script.runtime, &value);
            }
        }
        widgets.push(widget);
    }
    let widget_shares: Vec<bool> = widgets.iter().map(|w| w.share).collect();
    let widget_rows = chain_rows(&widget_shares);

    let mut buttons = Vec::new();
    for spec_button in &spec.buttons {
        let (function, function_name) = resolve(&spec_button.function, script)?;
        if is_excluded(&function_name, excluded) {
            continue;
        }
        check_inputs(spec_button, widgets.len())?;
        buttons.push(ActionButton {
            label: spec_button.label.clone(),
            tool_tip: spec_button.tool_tip.clone(),
            icon: spec_button.icon.clone(),
            color: spec_button.color,
            function_name,
            function,
            inputs: spec_button.inputs.clone(),
            share: spec_button.share,
            visible: true,
        });
    }
    let button_shares: Vec<bool> = buttons.iter().map(|b| b.share).collect();
    let button_rows = chain_rows(&button_shares);

    Ok(GroupBody {
        label: spec.label.clone(),
        color: spec.color,
        tool_tip: spec.tool_tip.clone(),
        widgets,
        widget_rows,
        buttons,
        button_rows,
        visible: true,
    })
}

/// Resolve a markup callable position exactly once. Unresolvable names
/// list what the script actually defines.
fn resolve(
    fref: &FunctionRef,
    script: &LoadedScript,
) -> Result<(Function, Option<String>), ConfigError> {
    match fref {
        FunctionRef::Direct(function) => Ok((function.clone(), None)),
        FunctionRef::Name(name) => match script.find_callable(name) {
            Some(function) => Ok((function.clone(), Some(name.clone()))),
            None => Err(ConfigError::UnknownFunction {
                name: name.clone(),
                available: script.callable_names().join(", "),
            }),
        },
    }
}

fn is_excluded(function_name: &Option<String>, excluded: &[String]) -> bool {
    function_name
        .as_ref()
        .is_some_and(|name| excluded.iter().any(|e| e == name))
}

fn check_inputs(button: &ButtonSpec, widget_count: usize) -> Result<(), ConfigError> {
    for &index in &button.inputs {
        if index >= widget_count {
            return Err(ConfigError::InputIndexRange {
                button: button.label.clone(),
                index,
                count: widget_count,
            });
        }
    }
    Ok(())
}

use mlua::{Table, Value};

use crate::diagnostics::ConfigError;
use crate::widgets::registry::WidgetKind;

/// An RGB color from markup, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A callable position in markup: a name resolved against the script's
/// callables at build time, or a direct function value.
#[derive(Debug, Clone)]
pub enum FunctionRef {
    Name(String),
    Direct(mlua::Function),
}

impl FunctionRef {
    /// Short description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            FunctionRef::Name(name) => name.clone(),
            FunctionRef::Direct(_) => "(function)".to_string(),
        }
    }
}

/// Tab-level presentation settings.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub color: Option<Rgb>,
    pub tool_tip: Option<String>,
    /// Accepted for contract compatibility; the terminal host never draws it.
    pub image: Option<String>,
}

/// The decoded sentinel value: settings plus ordered content items.
#[derive(Debug, Clone, Default)]
pub struct Instructions {
    pub settings: Settings,
    pub contents: Vec<ContentItem>,
}

#[derive(Debug, Clone)]
pub enum ContentItem {
    Simple(SimpleButton),
    Group(GroupSpec),
}

/// A standalone button bound to one callable.
#[derive(Debug, Clone)]
pub struct SimpleButton {
    pub function: FunctionRef,
    pub label: Option<String>,
    pub tool_tip: Option<String>,
    pub icon: Option<String>,
    pub color: Option<Rgb>,
}

/// A bordered group of input widgets and action buttons.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    pub label: String,
    pub color: Option<Rgb>,
    pub image: Option<String>,
    pub tool_tip: Option<String>,
    pub inputs: Vec<InputSpec>,
    pub buttons: Vec<ButtonSpec>,
}

/// One validated `inputWidgets` entry.
#[derive(Debug, Clone)]
pub struct InputSpec {
    pub kind: WidgetKind,
    pub label: Option<String>,
    pub tool_tip: Option<String>,
    pub color: Option<Rgb>,
    pub share: bool,
    pub save: bool,
    pub params: InputParams,
}

/// Variant-specific widget configuration.
#[derive(Debug, Clone)]
pub enum InputParams {
    Stretch,
    Spacer { size: u16 },
    Separator { vertical: bool },
    Text(TextParams),
    Spinner(SpinnerParams),
    Check { value: bool },
}

/// Configuration shared by the text-field family.
#[derive(Debug, Clone)]
pub struct TextParams {
    pub text: String,
    pub placeholder: Option<String>,
    pub eval: bool,
    pub error_if_empty: bool,
    pub button_command: Option<FunctionRef>,
    pub button_label: Option<String>,
    pub button_tool_tip: Option<String>,
    pub caption: Option<String>,
    pub filter: Option<String>,
    pub file_mode: FileMode,
    pub directory: Option<String>,
    pub check_existing: bool,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            placeholder: None,
            eval: false,
            error_if_empty: false,
            button_command: None,
            button_label: None,
            button_tool_tip: None,
            caption: None,
            filter: None,
            file_mode: FileMode::AnyFile,
            directory: None,
            check_existing: true,
        }
    }
}

/// Browse dialog modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    AnyFile,
    ExistingFile,
    ExistingFiles,
    Directory,
    DirectoryOnly,
}

impl FileMode {
    pub const NAMES: [(&'static str, FileMode); 5] = [
        ("AnyFile", FileMode::AnyFile),
        ("ExistingFile", FileMode::ExistingFile),
        ("ExistingFiles", FileMode::ExistingFiles),
        ("Directory", FileMode::Directory),
        ("DirectoryOnly", FileMode::DirectoryOnly),
    ];

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, mode)| *mode)
            .ok_or_else(|| ConfigError::BadFileMode {
                mode: name.to_string(),
                valid: Self::NAMES
                    .iter()
                    .map(|(n, _)| *n)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Modes that pick directories instead of files.
    pub fn picks_directory(&self) -> bool {
        matches!(self, FileMode::Directory | FileMode::DirectoryOnly)
    }

    /// Modes allowing more than one pick.
    pub fn picks_many(&self) -> bool {
        matches!(self, FileMode::ExistingFiles)
    }
}

/// Spinner configuration; `float` selects the floating-point variant.
#[derive(Debug, Clone, Copy)]
pub struct SpinnerParams {
    pub float: bool,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// One validated `buttons` entry.
#[derive(Debug, Clone)]
pub struct ButtonSpec {
    pub label: String,
    pub function: FunctionRef,
    pub tool_tip: Option<String>,
    pub icon: Option<String>,
    pub color: Option<Rgb>,
    /// Zero-based indices into the group's widget sequence.
    pub inputs: Vec<usize>,
    pub share: bool,
}

impl Instructions {
    /// Validate and decode the sentinel value. Unknown widget keys are
    /// stripped and reported through `warnings`; structural mistakes abort
    /// with a [`ConfigError`].
    pub fn decode(value: &Value, warnings: &mut Vec<String>) -> Result<Self, ConfigError> {
        let table = as_table(value, "scrib_instructions")?;

        let settings = match opt_table(table, "settings")? {
            Some(t) => Settings {
                color: opt_color(&t)?,
                tool_tip: opt_string(&t, "toolTip")?,
                image: opt_string(&t, "image")?,
            },
            None => Settings::default(),
        };

        let mut contents = Vec::new();
        if let Some(list) = opt_table(table, "contents")? {
            for (index, item) in list.sequence_values::<Value>().enumerate() {
                let item = item?;
                let Value::Table(item) = item else {
                    return Err(ConfigError::BadContentItem { index });
                };
                if item.contains_key("simple")? {
                    contents.push(ContentItem::Simple(decode_simple(&item)?));
                } else {
                    contents.push(ContentItem::Group(decode_group(&item, warnings)?));
                }
            }
        }

        Ok(Instructions { settings, contents })
    }
}

fn decode_simple(table: &Table) -> Result<SimpleButton, ConfigError> {
    let function = opt_function(table, "simple")?.ok_or_else(|| ConfigError::WrongType {
        key: "simple".to_string(),
        expected: "a function or function name",
    })?;
    Ok(SimpleButton {
        function,
        label: opt_string(table, "label")?,
        tool_tip: opt_string(table, "toolTip")?,
        icon: opt_string(table, "icon")?,
        color: opt_color(table)?,
    })
}

fn decode_group(table: &Table, warnings: &mut Vec<String>) -> Result<GroupSpec, ConfigError> {
    let label = opt_string(table, "label")?.unwrap_or_else(|| "Default".to_string());

    let mut inputs = Vec::new();
    if let Some(list) = opt_table(table, "inputWidgets")? {
        for entry in list.sequence_values::<Value>() {
            let entry = entry?;
            let Value::Table(entry) = entry else {
                return Err(ConfigError::WrongType {
                    key: "inputWidgets".to_string(),
                    expected: "a list of widget tables",
                });
            };
            inputs.push(decode_input(&entry, warnings)?);
        }
    }

    let mut buttons = Vec::new();
    if let Some(list) = opt_table(table, "buttons")? {
        for (index, entry) in list.sequence_values::<Value>().enumerate() {
            let entry = entry?;
            let Value::Table(entry) = entry else {
                return Err(ConfigError::WrongType {
                    key: "buttons".to_string(),
                    expected: "a list of button tables",
                });
            };
            buttons.push(decode_button(&entry, &label, index)?);
        }
    }

    Ok(GroupSpec {
        label,
        color: opt_color(table)?,
        image: opt_string(table, "image")?,
        tool_tip: opt_string(table, "toolTip")?,
        inputs,
        buttons,
    })
}

fn decode_input(table: &Table, warnings: &mut Vec<String>) -> Result<InputSpec, ConfigError> {
    let tag = opt_string(table, "type")?.unwrap_or_else(|| "(missing)".to_string());
    let kind = WidgetKind::from_tag(&tag)?;
    check_keys(table, kind, warnings)?;

    let params = match kind {
        WidgetKind::Stretch => InputParams::Stretch,
        WidgetKind::Spacer => {
            let size = opt_number(table, "size")?.ok_or(ConfigError::SpacerSize)?;
            InputParams::Spacer {
                size: size.max(0.0) as u16,
            }
        }
        WidgetKind::Separator => InputParams::Separator {
            vertical: opt_bool(table, "vertical")?.unwrap_or(false),
        },
        WidgetKind::IntSpinner | WidgetKind::FloatSpinner => InputParams::Spinner(SpinnerParams {
            float: kind == WidgetKind::FloatSpinner,
            value: opt_number(table, "value")?.unwrap_or(0.0),
            min: opt_number(table, "min")?.unwrap_or(0.0),
            max: opt_number(table, "max")?.unwrap_or(99.0),
            step: opt_number(table, "step")?.unwrap_or(1.0),
        }),
        WidgetKind::Check => InputParams::Check {
            value: opt_bool(table, "value")?.unwrap_or(false),
        },
        _ => {
            let mut params = TextParams {
                text: opt_string(table, "text")?.unwrap_or_default(),
                placeholder: opt_string(table, "placeholderText")?,
                error_if_empty: opt_bool(table, "errorIfEmpty")?.unwrap_or(false),
                ..TextParams::default()
            };
            if kind == WidgetKind::LineEdit || kind == WidgetKind::CmdLineEdit {
                params.eval = opt_bool(table, "eval")?.unwrap_or(false);
            }
            if kind.has_command_button() {
                params.button_label = opt_string(table, "buttonLabel")?;
                params.button_tool_tip = opt_string(table, "buttonToolTip")?;
            }
            if kind == WidgetKind::CmdLineEdit {
                params.button_command = opt_function(table, "buttonCommand")?;
            }
            if kind == WidgetKind::Browse {
                params.caption = opt_string(table, "caption")?;
                params.filter = opt_string(table, "filter")?;
                params.directory = opt_string(table, "directory")?;
                if let Some(mode) = opt_string(table, "fileMode")? {
                    params.file_mode = FileMode::from_name(&mode)?;
                }
            }
            if kind.captures_selection() {
                params.check_existing = opt_bool(table, "checkExisting")?.unwrap_or(true);
            }
            InputParams::Text(params)
        }
    };

    Ok(InputSpec {
        kind,
        label: opt_string(table, "label")?,
        tool_tip: opt_string(table, "toolTip")?,
        color: opt_color(table)?,
        share: opt_bool(table, "share")?.unwrap_or(false),
        save: opt_bool(table, "save")?.unwrap_or(false),
        params,
    })
}

fn decode_button(table: &Table, group: &str, index: usize) -> Result<ButtonSpec, ConfigError> {
    let label = opt_string(table, "label")?.ok_or_else(|| ConfigError::ButtonLabelMissing {
        group: group.to_string(),
        index,
    })?;
    let function = resolve_button_function(table)?.ok_or_else(|| {
        ConfigError::ButtonFunctionMissing {
            button: label.clone(),
        }
    })?;

    let mut inputs = Vec::new();
    if let Some(list) = opt_table(table, "inputs")? {
        for value in list.sequence_values::<Value>() {
            match value? {
                Value::Integer(i) if i >= 0 => inputs.push(i as usize),
                _ => {
                    return Err(ConfigError::WrongType {
                        key: "inputs".to_string(),
                        expected: "a list of widget indices",
                    });
                }
            }
        }
    }

    Ok(ButtonSpec {
        label,
        function,
        tool_tip: opt_string(table, "toolTip")?,
        icon: opt_string(table, "icon")?,
        color: opt_color(table)?,
        inputs,
        share: opt_bool(table, "share")?.unwrap_or(false),
    })
}

/// Buttons accept the callable under `function` or `fn` (the former needs
/// bracket syntax in Lua table constructors).
fn resolve_button_function(table: &Table) -> Result<Option<FunctionRef>, ConfigError> {
    if let Some(found) = opt_function(table, "function")? {
        return Ok(Some(found));
    }
    opt_function(table, "fn")
}

/// Warn about and strip keys the variant does not accept.
fn check_keys(table: &Table, kind: WidgetKind, warnings: &mut Vec<String>) -> Result<(), ConfigError> {
    let allowed = kind.allowed_keys();
    for pair in table.clone().pairs::<Value, Value>() {
        let (key, _) = pair.map_err(ConfigError::Script)?;
        let name = match &key {
            Value::String(s) => s.to_string_lossy().to_string(),
            other => format!("{other:?}"),
        };
        // `fn` doubles for `function` in button tables, never in widgets.
        if !allowed.contains(&name.as_str()) {
            warnings.push(format!(
                "unknown key \"{}\" on \"{}\" widget (eligible keys: {})",
                name,
                kind.tag(),
                allowed.join(", ")
            ));
        }
    }
    Ok(())
}

fn as_table<'a>(value: &'a Value, key: &str) -> Result<&'a Table, ConfigError> {
    match value {
        Value::Table(t) => Ok(t),
        _ => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "a table",
        }),
    }
}

fn opt_table(table: &Table, key: &str) -> Result<Option<Table>, ConfigError> {
    match table.get::<Value>(key).map_err(ConfigError::Script)? {
        Value::Nil => Ok(None),
        Value::Table(t) => Ok(Some(t)),
        _ => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "a table",
        }),
    }
}

fn opt_string(table: &Table, key: &str) -> Result<Option<String>, ConfigError> {
    match table.get::<Value>(key).map_err(ConfigError::Script)? {
        Value::Nil => Ok(None),
        Value::String(s) => Ok(Some(s.to_string_lossy().to_string())),
        Value::Integer(i) => Ok(Some(i.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

fn opt_bool(table: &Table, key: &str) -> Result<Option<bool>, ConfigError> {
    match table.get::<Value>(key).map_err(ConfigError::Script)? {
        Value::Nil => Ok(None),
        Value::Boolean(b) => Ok(Some(b)),
        _ => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "a boolean",
        }),
    }
}

fn opt_number(table: &Table, key: &str) -> Result<Option<f64>, ConfigError> {
    match table.get::<Value>(key).map_err(ConfigError::Script)? {
        Value::Nil => Ok(None),
        Value::Integer(i) => Ok(Some(i as f64)),
        Value::Number(n) => Ok(Some(n)),
        _ => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "a number",
        }),
    }
}

fn opt_function(table: &Table, key: &str) -> Result<Option<FunctionRef>, ConfigError> {
    match table.get::<Value>(key).map_err(ConfigError::Script)? {
        Value::Nil => Ok(None),
        Value::String(s) => Ok(Some(FunctionRef::Name(s.to_string_lossy().to_string()))),
        Value::Function(f) => Ok(Some(FunctionRef::Direct(f))),
        _ => Err(ConfigError::WrongType {
            key: key.to_string(),
            expected: "a function or function name",
        }),
    }
}

fn opt_color(table: &Table) -> Result<Option<Rgb>, ConfigError> {
    let bad = || ConfigError::WrongType {
        key: "color".to_string(),
        expected: "a list of three 0-255 integers",
    };
    match table.get::<Value>("color").map_err(ConfigError::Script)? {
        Value::Nil => Ok(None),
        Value::Table(t) => {
            let mut channels = [0u8; 3];
            for (i, channel) in channels.iter_mut().enumerate() {
                match t.get::<Value>(i + 1).map_err(ConfigError::Script)? {
                    Value::Integer(v) if (0..=255).contains(&v) => *channel = v as u8,
                    Value::Number(n) if n.fract() == 0.0 && (0.0..=255.0).contains(&n) => {
                        *channel = n as u8
                    }
                    _ => return Err(bad()),
                }
            }
            Ok(Some(Rgb(channels[0], channels[1], channels[2])))
        }
        _ => Err(bad()),
    }
}

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::diagnostics::ConfigError;

/// The closed set of widget variants. New variants are a compile-time
/// change: add the enum arm, its tag, and its key set here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Stretch,
    Spacer,
    Separator,
    LineEdit,
    CmdLineEdit,
    Browse,
    Selection,
    SelectionMulti,
    PyNode,
    PyNodeMulti,
    IntSpinner,
    FloatSpinner,
    Check,
}

/// Tag strings in registry order. Error messages enumerate these.
pub const TAGS: [(&str, WidgetKind); 13] = [
    ("stretch", WidgetKind::Stretch),
    ("spacer", WidgetKind::Spacer),
    ("separator", WidgetKind::Separator),
    ("lineEdit", WidgetKind::LineEdit),
    ("cmdLineEdit", WidgetKind::CmdLineEdit),
    ("browse", WidgetKind::Browse),
    ("selection", WidgetKind::Selection),
    ("selectionMulti", WidgetKind::SelectionMulti),
    ("pyNode", WidgetKind::PyNode),
    ("pyNodeMulti", WidgetKind::PyNodeMulti),
    ("intSpinner", WidgetKind::IntSpinner),
    ("floatSpinner", WidgetKind::FloatSpinner),
    ("check", WidgetKind::Check),
];

static BY_TAG: Lazy<HashMap<&'static str, WidgetKind>> =
    Lazy::new(|| TAGS.iter().copied().collect());

/// All valid tags joined for error messages, in registry order.
pub fn tag_list() -> String {
    TAGS.iter()
        .map(|(tag, _)| *tag)
        .collect::<Vec<_>>()
        .join(", ")
}

impl WidgetKind {
    /// Resolve a markup type tag. Unknown tags enumerate the valid set.
    pub fn from_tag(tag: &str) -> Result<Self, ConfigError> {
        BY_TAG
            .get(tag)
            .copied()
            .ok_or_else(|| ConfigError::UnknownWidgetType {
                tag: tag.to_string(),
                valid: tag_list(),
            })
    }

    pub fn tag(&self) -> &'static str {
        TAGS.iter()
            .find(|(_, kind)| kind == self)
            .map(|(tag, _)| *tag)
            .unwrap_or("unknown")
    }

    /// The keys this variant accepts in markup. Anything else is stripped
    /// with a validation warning.
    pub fn allowed_keys(&self) -> &'static [&'static str] {
        match self {
            WidgetKind::Stretch => &["type", "toolTip", "share"],
            WidgetKind::Spacer => &["type", "toolTip", "share", "size"],
            WidgetKind::Separator => &["type", "toolTip", "share", "vertical"],
            WidgetKind::LineEdit => &[
                "type",
                "label",
                "toolTip",
                "color",
                "share",
                "save",
                "text",
                "placeholderText",
                "eval",
                "errorIfEmpty",
            ],
            WidgetKind::CmdLineEdit => &[
                "type",
                "label",
                "toolTip",
                "color",
                "share",
                "save",
                "text",
                "placeholderText",
                "eval",
                "errorIfEmpty",
                "buttonCommand",
                "buttonLabel",
                "buttonToolTip",
            ],
            WidgetKind::Browse => &[
                "type",
                "label",
                "toolTip",
                "color",
                "share",
                "save",
                "text",
                "placeholderText",
                "errorIfEmpty",
                "buttonLabel",
                "buttonToolTip",
                "caption",
                "filter",
                "fileMode",
                "directory",
            ],
            WidgetKind::Selection
            | WidgetKind::SelectionMulti
            | WidgetKind::PyNode
            | WidgetKind::PyNodeMulti => &[
                "type",
                "label",
                "toolTip",
                "color",
                "share",
                "save",
                "text",
                "placeholderText",
                "errorIfEmpty",
                "buttonLabel",
                "buttonToolTip",
                "checkExisting",
            ],
            WidgetKind::IntSpinner | WidgetKind::FloatSpinner => {
                &["type", "label", "toolTip", "color", "share", "save", "max", "min", "value", "step"]
            }
            WidgetKind::Check => &["type", "label", "toolTip", "color", "share", "save", "value"],
        }
    }

    /// Structural widgets shape rows but hold no value.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            WidgetKind::Stretch | WidgetKind::Spacer | WidgetKind::Separator
        )
    }

    /// Variants rendered as a text field.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            WidgetKind::LineEdit
                | WidgetKind::CmdLineEdit
                | WidgetKind::Browse
                | WidgetKind::Selection
                | WidgetKind::SelectionMulti
                | WidgetKind::PyNode
                | WidgetKind::PyNodeMulti
        )
    }

    /// Variants carrying a command button next to the field.
    pub fn has_command_button(&self) -> bool {
        matches!(
            self,
            WidgetKind::CmdLineEdit
                | WidgetKind::Browse
                | WidgetKind::Selection
                | WidgetKind::SelectionMulti
                | WidgetKind::PyNode
                | WidgetKind::PyNodeMulti
        )
    }

    /// Capture-family variants write the host selection into the field.
    pub fn captures_selection(&self) -> bool {
        matches!(
            self,
            WidgetKind::Selection
                | WidgetKind::SelectionMulti
                | WidgetKind::PyNode
                | WidgetKind::PyNodeMulti
        )
    }

    /// Multi-valued capture variants join names with commas.
    pub fn captures_many(&self) -> bool {
        matches!(self, WidgetKind::SelectionMulti | WidgetKind::PyNodeMulti)
    }

    /// Identity-bearing variants read live registered objects.
    pub fn reads_objects(&self) -> bool {
        matches!(self, WidgetKind::PyNode | WidgetKind::PyNodeMulti)
    }
}

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, warn};

/// Author mistakes in markup. Fatal to the tab build that hit them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown widget type \"{tag}\" (valid types: {valid})")]
    UnknownWidgetType { tag: String, valid: String },

    #[error("Spacer widget requires a \"size\" value")]
    SpacerSize,

    #[error("unknown file mode \"{mode}\" (valid modes: {valid})")]
    BadFileMode { mode: String, valid: String },

    #[error("\"{key}\" should be {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("content item {index} is neither a simple button nor a group")]
    BadContentItem { index: usize },

    #[error("button {index} in group \"{group}\" is missing a \"label\"")]
    ButtonLabelMissing { group: String, index: usize },

    #[error("button \"{button}\" is missing a \"function\"")]
    ButtonFunctionMissing { button: String },

    #[error("unknown function \"{name}\" (available: {available})")]
    UnknownFunction { name: String, available: String },

    #[error("button \"{button}\" input index {index} is out of range (group has {count} widgets)")]
    InputIndexRange {
        button: String,
        index: usize,
        count: usize,
    },

    #[error("markup read error: {0}")]
    Script(#[from] mlua::Error),
}

/// Per-read and per-click failures. Recoverable; the tab stays usable.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("\"{label}\": text field is empty")]
    EmptyField { label: String },

    #[error("\"{label}\": {detail}")]
    Eval { label: String, detail: String },

    #[error("nothing is selected")]
    NothingSelected,

    #[error("\"{label}\": no object named \"{name}\" is registered")]
    MissingObject { label: String, name: String },

    #[error("\"{label}\": this widget has no value to read")]
    NotReadable { label: String },

    #[error("script value error: {0}")]
    Script(#[from] mlua::Error),
}

/// A script failed to load or execute. Fatal to its tab only.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", .trace.message)]
    Script { trace: Trace },
}

impl LoadError {
    /// Diagnostic body for the tab: the framed trace for script errors,
    /// a single framed line for everything else.
    pub fn render(&self) -> String {
        match self {
            LoadError::Script { trace } => trace.render(),
            other => format!("# {other}"),
        }
    }
}

/// One parsed stack frame of a script error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub file: String,
    pub line: u32,
    pub function: String,
    /// Source text of the offending line, when the frame is in the loaded script.
    pub source: Option<String>,
}

/// A script error with its parsed traceback.
#[derive(Debug, Clone)]
pub struct Trace {
    pub message: String,
    pub frames: Vec<TraceFrame>,
}

impl Trace {
    /// Parse an `mlua` error into message + frames, resolving source lines
    /// against the loaded script's text.
    pub fn from_lua_error(err: &mlua::Error, script_path: &Path, script_source: &str) -> Self {
        let path_str = script_path.display().to_string();
        match err {
            mlua::Error::CallbackError { traceback, cause } => {
                let mut trace = Trace::from_lua_error(cause, script_path, script_source);
                if trace.frames.is_empty() {
                    trace.frames = parse_traceback(traceback, &path_str, script_source);
                }
                trace
            }
            mlua::Error::RuntimeError(text) => {
                let (message, frames) = match text.split_once("\nstack traceback:") {
                    Some((msg, tb)) => (
                        msg.trim().to_string(),
                        parse_traceback(tb, &path_str, script_source),
                    ),
                    None => (text.trim().to_string(), Vec::new()),
                };
                Trace { message, frames }
            }
            mlua::Error::SyntaxError { message, .. } => {
                let message = message.trim().to_string();
                let frames = frame_from_message(&message, &path_str, script_source)
                    .into_iter()
                    .collect();
                Trace { message, frames }
            }
            other => Trace {
                message: other.to_string(),
                frames: Vec::new(),
            },
        }
    }

    /// Render the framed diagnostic text: error line, one frame line plus
    /// source line per frame, error line again.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.message.lines() {
            out.push_str(&format!("# {line}\n"));
        }
        out.push_str("# traceback (most recent call first):\n");
        for frame in &self.frames {
            out.push_str(&format!(
                "#   {}:{} in {}\n",
                frame.file, frame.line, frame.function
            ));
            if let Some(src) = &frame.source {
                out.push_str(&format!("#     {src}\n"));
            }
        }
        for line in self.message.lines() {
            out.push_str(&format!("# {line}\n"));
        }
        out
    }
}

/// Parse the body of a Lua `stack traceback:` section.
fn parse_traceback(text: &str, script_path: &str, script_source: &str) -> Vec<TraceFrame> {
    let mut frames = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line == "stack traceback:" {
            continue;
        }
        // Native and tail-call frames carry no position we can show.
        if line.starts_with("[C]") || line.starts_with("(...") {
            continue;
        }
        let Some((location, descriptor)) = line.rsplit_once(": in ") else {
            continue;
        };
        let Some((file, line_no)) = location.rsplit_once(':') else {
            continue;
        };
        let Ok(line_no) = line_no.parse::<u32>() else {
            continue;
        };
        let function = clean_descriptor(descriptor);
        let source = if file == script_path {
            source_line(script_source, line_no)
        } else {
            None
        };
        frames.push(TraceFrame {
            file: file.to_string(),
            line: line_no,
            function,
            source,
        });
    }
    frames
}

/// Best-effort frame out of a `path:line: message` error prefix.
fn frame_from_message(message: &str, script_path: &str, script_source: &str) -> Option<TraceFrame> {
    let rest = message.strip_prefix(script_path)?;
    let rest = rest.strip_prefix(':')?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let line_no = digits.parse::<u32>().ok()?;
    Some(TraceFrame {
        file: script_path.to_string(),
        line: line_no,
        function: "main chunk".to_string(),
        source: source_line(script_source, line_no),
    })
}

/// Normalize Lua's frame descriptors ("function 'foo'", "main chunk",
/// "function <file:3>") down to a plain name.
fn clean_descriptor(descriptor: &str) -> String {
    let d = descriptor.trim();
    if d == "main chunk" {
        return d.to_string();
    }
    for prefix in ["function", "local", "method", "upvalue", "field"] {
        if let Some(rest) = d.strip_prefix(prefix) {
            let rest = rest.trim();
            if let Some(name) = rest.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
                return name.to_string();
            }
            if rest.starts_with('<') {
                return "anonymous function".to_string();
            }
        }
    }
    d.to_string()
}

fn source_line(source: &str, line_no: u32) -> Option<String> {
    source
        .lines()
        .nth(line_no.saturating_sub(1) as usize)
        .map(|l| l.trim().to_string())
}

const CONSOLE_CAPACITY: usize = 500;

#[derive(Debug)]
struct ConsoleBuffer {
    lines: VecDeque<String>,
}

/// In-app diagnostics pane. Fed by script `print`, validation warnings and
/// tracebacks; shared by clone across the single-threaded host.
#[derive(Debug, Clone)]
pub struct Console {
    inner: Rc<RefCell<ConsoleBuffer>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ConsoleBuffer {
                lines: VecDeque::new(),
            })),
        }
    }

    /// Append text, splitting embedded newlines into individual lines.
    pub fn log(&self, text: impl AsRef<str>) {
        let mut buf = self.inner.borrow_mut();
        for line in text.as_ref().lines() {
            if buf.lines.len() == CONSOLE_CAPACITY {
                buf.lines.pop_front();
            }
            buf.lines.push_back(line.to_string());
        }
        debug!("console: {}", text.as_ref());
    }

    /// Append a warning, mirrored to the log at warn level.
    pub fn warn(&self, text: impl AsRef<str>) {
        warn!("{}", text.as_ref());
        self.log(format!("warning: {}", text.as_ref()));
    }

    /// The most recent `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let buf = self.inner.borrow();
        let skip = buf.lines.len().saturating_sub(n);
        buf.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().lines.is_empty()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().lines.clear();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashMap;
use std::path::Path;

use mlua::{Function, Value};
use tracing::info;

use crate::diagnostics::{Console, LoadError};
use crate::script::docs;
use crate::script::runtime::ScriptRuntime;

/// A script after loading: its runtime plus everything discovery found.
pub struct LoadedScript {
    pub runtime: ScriptRuntime,
    /// Discovered callables in sorted-name order.
    pub callables: Vec<(String, Function)>,
    /// Doc-comment text per function name.
    pub docs: HashMap<String, String>,
}

impl LoadedScript {
    /// Execute the script and run discovery over the resulting namespace.
    pub fn load(path: &Path, console: &Console) -> Result<Self, LoadError> {
        let runtime = ScriptRuntime::load(path, console.clone())?;
        let callables = runtime.callables();
        let docs = docs::scan_docs(runtime.source());
        info!(
            "script {} loaded: {} callables, advanced = {}",
            path.display(),
            callables.len(),
            runtime.instructions_value().is_some()
        );
        Ok(Self {
            runtime,
            callables,
            docs,
        })
    }

    /// The sentinel markup value, when present.
    pub fn instructions_value(&self) -> Option<Value> {
        self.runtime.instructions_value()
    }

    pub fn callable_names(&self) -> Vec<&str> {
        self.callables.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn find_callable(&self, name: &str) -> Option<&Function> {
        self.callables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Whether simple mode would hide this callable behind the doc marker.
    pub fn doc_excluded(&self, name: &str) -> bool {
        self.docs.get(name).is_some_and(|d| docs::doc_excludes(d))
    }
}

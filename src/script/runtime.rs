use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::{Function, Lua, MultiValue, Value, Variadic};
use tracing::debug;

use crate::diagnostics::{Console, LoadError, Trace};

/// The global key whose presence selects advanced mode.
pub const INSTRUCTIONS_KEY: &str = "scrib_instructions";

/// Named objects registered by the script plus the current selection.
/// Backs the selection and node widget families.
#[derive(Default)]
struct ObjectStore {
    objects: HashMap<String, Value>,
    selection: Vec<String>,
}

/// One loaded script's execution state: a private Lua instance, the host
/// API, and the object store. Dropping the runtime drops the whole
/// namespace; reloading builds a fresh one.
pub struct ScriptRuntime {
    lua: Lua,
    path: PathBuf,
    source: String,
    baseline: HashSet<String>,
    store: Rc<RefCell<ObjectStore>>,
    console: Console,
}

impl ScriptRuntime {
    /// Read and execute a script in a fresh namespace. Execution failures
    /// are fatal to this runtime only.
    pub fn load(path: &Path, console: Console) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let lua = Lua::new();
        let store = Rc::new(RefCell::new(ObjectStore::default()));
        install_host_api(&lua, &store, &console).map_err(|err| LoadError::Script {
            trace: Trace::from_lua_error(&err, path, &source),
        })?;

        // Everything global before execution is host vocabulary, not a
        // script callable.
        let baseline = global_names(&lua);

        let chunk_name = format!("@{}", path.display());
        if let Err(err) = lua.load(&source).set_name(chunk_name).exec() {
            return Err(LoadError::Script {
                trace: Trace::from_lua_error(&err, path, &source),
            });
        }

        debug!("loaded script {}", path.display());
        Ok(Self {
            lua,
            path: path.to_path_buf(),
            source,
            baseline,
            store,
            console,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Callables the script defined at top level, sorted by name.
    pub fn callables(&self) -> Vec<(String, Function)> {
        let mut found = Vec::new();
        for pair in self.lua.globals().pairs::<Value, Value>() {
            let Ok((Value::String(name), Value::Function(func))) = pair else {
                continue;
            };
            let name = name.to_string_lossy().to_string();
            if !self.baseline.contains(&name) {
                found.push((name, func));
            }
        }
        found.sort_by(|a, b| a.0.cmp(&b.0));
        found
    }

    /// The sentinel markup value, when the script defines one.
    pub fn instructions_value(&self) -> Option<Value> {
        match self.lua.globals().get::<Value>(INSTRUCTIONS_KEY) {
            Ok(Value::Nil) | Err(_) => None,
            Ok(value) => Some(value),
        }
    }

    /// Evaluate field text as a script expression.
    pub fn eval(&self, expr: &str) -> Result<Value, Trace> {
        self.lua
            .load(format!("return {expr}"))
            .set_name("=expression")
            .eval::<Value>()
            .map_err(|err| self.trace(&err))
    }

    /// Invoke a callable with positional arguments, discarding results.
    pub fn call(&self, func: &Function, args: Vec<Value>) -> Result<(), Trace> {
        func.call::<()>(MultiValue::from_iter(args))
            .map_err(|err| self.trace(&err))
    }

    /// Invoke a command callable with no arguments, keeping its result.
    pub fn call_for_value(&self, func: &Function) -> Result<Value, Trace> {
        func.call::<Value>(()).map_err(|err| self.trace(&err))
    }

    /// Textual form of a script value, through the script's `tostring`.
    pub fn display(&self, value: &Value) -> String {
        let tostring: Result<Function, _> = self.lua.globals().get("tostring");
        match tostring.and_then(|f| f.call::<mlua::String>(value.clone())) {
            Ok(s) => s.to_string_lossy().to_string(),
            Err(_) => value.type_name().to_string(),
        }
    }

    /// Parse a script error against this runtime's source.
    pub fn trace(&self, err: &mlua::Error) -> Trace {
        Trace::from_lua_error(err, &self.path, &self.source)
    }

    pub fn selection(&self) -> Vec<String> {
        self.store.borrow().selection.clone()
    }

    pub fn object(&self, name: &str) -> Option<Value> {
        self.store.borrow().objects.get(name).cloned()
    }

    pub fn object_exists(&self, name: &str) -> bool {
        self.store.borrow().objects.contains_key(name)
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }
}

/// Install `print` capture and the `scratch` table before user code runs.
fn install_host_api(
    lua: &Lua,
    store: &Rc<RefCell<ObjectStore>>,
    console: &Console,
) -> mlua::Result<()> {
    let tostring: Function = lua.globals().get("tostring")?;

    let print_console = console.clone();
    let print_tostring = tostring.clone();
    let print = lua.create_function(move |_, args: Variadic<Value>| {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args.iter() {
            parts.push(
                print_tostring
                    .call::<mlua::String>(arg.clone())?
                    .to_string_lossy()
                    .to_string(),
            );
        }
        print_console.log(parts.join("\t"));
        Ok(())
    })?;
    lua.globals().set("print", print)?;

    let scratch = lua.create_table()?;

    let s = store.clone();
    let register = lua.create_function(move |lua, (name, value): (String, Option<Value>)| {
        let value = match value {
            Some(v) => v,
            None => Value::String(lua.create_string(&name)?),
        };
        s.borrow_mut().objects.insert(name, value);
        Ok(())
    })?;
    scratch.set("register", register)?;

    let s = store.clone();
    let select_tostring = tostring;
    let select = lua.create_function(move |_, args: Variadic<Value>| {
        let mut names = Vec::with_capacity(args.len());
        let mut store = s.borrow_mut();
        for arg in args.iter() {
            let (name, value) = match arg {
                Value::String(text) => {
                    let name = text.to_string_lossy().to_string();
                    let value = store
                        .objects
                        .get(&name)
                        .cloned()
                        .unwrap_or_else(|| arg.clone());
                    (name, value)
                }
                Value::Table(t) => match t.get::<Option<String>>("name")? {
                    Some(name) => (name, arg.clone()),
                    None => {
                        return Err(mlua::Error::RuntimeError(
                            "scratch.select: table items need a \"name\" field".to_string(),
                        ));
                    }
                },
                Value::Integer(_) | Value::Number(_) => {
                    let name = select_tostring
                        .call::<mlua::String>(arg.clone())?
                        .to_string_lossy()
                        .to_string();
                    (name, arg.clone())
                }
                other => {
                    return Err(mlua::Error::RuntimeError(format!(
                        "scratch.select: cannot select a {} value",
                        other.type_name()
                    )));
                }
            };
            store.objects.insert(name.clone(), value);
            names.push(name);
        }
        store.selection = names;
        Ok(())
    })?;
    scratch.set("select", select)?;

    let s = store.clone();
    let selection = lua.create_function(move |lua, ()| {
        let table = lua.create_table()?;
        for (i, name) in s.borrow().selection.iter().enumerate() {
            table.set(i + 1, name.as_str())?;
        }
        Ok(table)
    })?;
    scratch.set("selection", selection)?;

    let s = store.clone();
    let clear_selection = lua.create_function(move |_, ()| {
        s.borrow_mut().selection.clear();
        Ok(())
    })?;
    scratch.set("clear_selection", clear_selection)?;

    let s = store.clone();
    let exists =
        lua.create_function(move |_, name: String| Ok(s.borrow().objects.contains_key(&name)))?;
    scratch.set("exists", exists)?;

    let s = store.clone();
    let object = lua.create_function(move |_, name: String| {
        Ok(s.borrow().objects.get(&name).cloned().unwrap_or(Value::Nil))
    })?;
    scratch.set("object", object)?;

    lua.globals().set("scratch", scratch)?;
    Ok(())
}

fn global_names(lua: &Lua) -> HashSet<String> {
    let mut names = HashSet::new();
    for pair in lua.globals().pairs::<Value, Value>() {
        if let Ok((Value::String(name), _)) = pair {
            names.insert(name.to_string_lossy().to_string());
        }
    }
    names
}

pub mod docs;
pub mod loader;
pub mod runtime;

pub use loader::LoadedScript;
pub use runtime::ScriptRuntime;

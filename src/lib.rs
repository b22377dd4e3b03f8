// Re-export modules so they can be used from tests
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod filtering;
pub mod logging;
pub mod markup;
pub mod script;
pub mod tab;
pub mod ui;
pub mod widgets;

pub mod app;
pub mod browse;
pub mod input;
pub mod render;

use anyhow::Result;
use std::path::Path;

use crate::cli::Args;

pub fn run_app(args: &Args, prefs_path: &Path) -> Result<()> {
    app::run_app(args, prefs_path)
}

mod args;

pub use args::{Args, Commands, TabsAction, parse_args};

use anyhow::Result;
use std::path::Path;

use crate::config::{Prefs, TabEntry};
use crate::diagnostics::Console;
use crate::tab::ScriptTab;

/// Tab name for a script opened from the command line.
pub fn default_tab_name(script: &Path) -> String {
    script
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| script.display().to_string())
}

pub fn run(args: Args) -> Result<()> {
    let prefs_path = Prefs::resolve_path(args.prefs.as_deref())?;

    match &args.command {
        Some(Commands::Tabs { action }) => run_tabs(action, &prefs_path),
        Some(Commands::Check { script }) => run_check(script),
        None => crate::ui::run_app(&args, &prefs_path),
    }
}

/// Edit the persisted tab list headlessly.
fn run_tabs(action: &TabsAction, prefs_path: &Path) -> Result<()> {
    let mut prefs = Prefs::load(prefs_path);
    match action {
        TabsAction::Add { name, script } => {
            prefs.add_tab(name, &script.to_string_lossy())?;
            prefs.save(prefs_path)?;
            println!("Added tab \"{}\" -> {}", name, script.display());
        }
        TabsAction::Remove { name } => {
            if !prefs.remove_tab(name) {
                anyhow::bail!("no tab named \"{name}\"");
            }
            prefs.save(prefs_path)?;
            println!("Removed tab \"{name}\"");
        }
        TabsAction::List => {
            if prefs.tab_data.is_empty() {
                println!("No tabs configured.");
            }
            for entry in &prefs.tab_data {
                println!("{}\t{}", entry.name, entry.script);
            }
        }
    }
    Ok(())
}

/// Build a script's tab without a terminal and print what came out of it.
/// Exits nonzero when the build fails, for editor and CI hooks.
fn run_check(script: &Path) -> Result<()> {
    let console = Console::new();
    let entry = TabEntry::new(default_tab_name(script), script.to_string_lossy());
    let mut tab = ScriptTab::new(entry);
    tab.rebuild(&console);

    for warning in &tab.warnings {
        println!("warning: {warning}");
    }
    if let Some(text) = tab.error_text() {
        println!("{text}");
        anyhow::bail!("{} failed to build", script.display());
    }
    if let Some(body) = tab.body() {
        let mode = if body.simple { "simple" } else { "advanced" };
        println!(
            "{}: {} mode, {} item(s), {} warning(s)",
            script.display(),
            mode,
            body.items.len(),
            tab.warnings.len()
        );
    }
    Ok(())
}

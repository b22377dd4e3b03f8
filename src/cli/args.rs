use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Tabbed dashboard for Lua scratch scripts with buttons and input widgets",
    long_about = "Scrib hosts one tab per user script. A plain script gets a button per\n\
global function (simple mode); a script that assigns the scrib_instructions\n\
global gets groups of typed input widgets and buttons wired to its functions\n\
(advanced mode). Tabs are persisted in a preferences file and rebuilt from\n\
source on every refresh.\n\
---\n\
Examples:\n\
  scrib                          # open the persisted tabs\n\
  scrib notes.lua rig.lua        # also open two scripts for this session\n\
  scrib tabs add deploy d.lua    # persist a tab without starting the UI\n\
  scrib check d.lua              # build headlessly and report diagnostics\n\
Markers:\n\
  a '--- scratch_exclude' doc line hides a function from simple mode."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Scripts to open as session tabs, after the persisted ones
    pub scripts: Vec<PathBuf>,

    /// Preferences file to use instead of the per-user default
    #[arg(long, value_name = "FILE")]
    pub prefs: Option<PathBuf>,

    /// Development mode: write internal logs to a timestamped file
    #[arg(long)]
    pub dev: bool,

    /// Verbosity level for internal logs (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Edit the persisted tab list without starting the UI
    Tabs {
        #[command(subcommand)]
        action: TabsAction,
    },
    /// Load and build a script headlessly, printing diagnostics
    Check {
        /// Script file to check
        script: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TabsAction {
    /// Add a tab backed by a script file
    Add {
        /// Tab name shown in the tab bar
        name: String,
        /// Script file backing the tab
        script: PathBuf,
    },
    /// Remove a tab by name
    Remove {
        /// Tab name to remove
        name: String,
    },
    /// List the persisted tabs
    List,
}

pub fn parse_args() -> Args {
    Args::parse()
}

// Implement Default for Args
impl Default for Args {
    fn default() -> Self {
        Self {
            command: None,
            scripts: Vec::new(),
            prefs: None,
            dev: false,
            verbose: 0,
        }
    }
}

use anyhow::Result;

use scrib::{cli, logging};

fn main() -> Result<()> {
    let args = cli::parse_args();

    // The dashboard owns the terminal, so unless --dev routes logs to a
    // file we cap stderr at errors to keep the alternate screen clean.
    let ui_mode = args.command.is_none();
    let verbosity = if ui_mode && !args.dev { 0 } else { args.verbose };

    let _guard = logging::setup_logger(verbosity, args.dev)?;
    if args.dev {
        println!("Development mode enabled. Logs will be written to the current directory.");
    }

    cli::run(args)
}

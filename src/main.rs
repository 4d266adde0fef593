use anyhow::Result;
use clap::Parser as _;

use linkfarm::cli::Args;
use linkfarm::execute::ExecutionMode;
use linkfarm::fsx::RealFs;
use linkfarm::report::Report;
use linkfarm::settings::Settings;
use linkfarm::{logging, sync};

fn main() -> Result<()> {
    // Best effort; some terminals simply don't support it.
    let _ = enable_ansi_support::enable_ansi_support();

    let args = Args::parse();
    logging::init(args.verbose);

    let fs = RealFs;
    let settings = Settings::resolve(&fs, &args)?;
    let mut report = Report::new();
    sync::run(&fs, &settings, &mut report)?;

    if settings.mode == ExecutionMode::DryRun {
        println!("\nDry-run only. Re-run with --apply to make changes.");
    }
    Ok(())
}

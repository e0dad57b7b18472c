// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use exercise_form::cli::analyze::run_analyze;
use exercise_form::cli::args::{Cli, Commands};
use exercise_form::cli::calibrate::run_calibrate;
use exercise_form::cli::inspect::run_inspect;
use exercise_form::cli::logging::set_verbose;

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze(args) => {
            // Frame reports own stdout unless they go to a file.
            set_verbose(args.verbose && args.output.is_some());
            run_analyze(args);
        }
        Commands::Calibrate(args) => {
            set_verbose(args.verbose);
            run_calibrate(args);
        }
        Commands::Inspect(args) => run_inspect(args),
    }
}

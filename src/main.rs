#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]
#![deny(missing_docs)]

//! posfilter, a filter for chess position dumps bound for NNUE training.

mod board;
mod cli;
mod dataset;
mod errors;
mod filter;
mod record;
mod stats;

/// The name of the tool.
pub static NAME: &str = "posfilter";
/// The version of the tool.
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    // SAFETY: nothing else is running yet.
    unsafe {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if std::env::args_os().len() == 1 {
        // no input given: show usage and bow out quietly
        println!("{NAME} {VERSION}");
        <cli::Cli as clap::CommandFactory>::command().print_help()?;
        return Ok(());
    }

    let Some(cli) = cli::Cli::parse_or_usage(std::env::args_os()) else {
        // a subcommand without its input is a request for usage
        return Ok(());
    };

    match cli.subcommand {
        cli::Subcommands::Filter { input, output, config, report_every } => {
            dataset::run_filter(&input, output.as_deref(), config.as_deref(), report_every)
        }
        cli::Subcommands::Stats { input, config, report_every } => {
            dataset::run_stats(&input, config.as_deref(), report_every)
        }
        cli::Subcommands::Count { input, report_every } => dataset::run_count(&input, report_every),
        cli::Subcommands::Dupes { input, report_every } => dataset::run_dupes(&input, report_every),
        cli::Subcommands::Repair { input, output, config, report_every } => {
            dataset::run_repair(&input, output.as_deref(), config.as_deref(), report_every)
        }
    }
}

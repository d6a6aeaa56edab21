use std::{ffi::OsString, path::PathBuf};

use clap::{error::ErrorKind, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommands,
}

impl Cli {
    /// Parses `args`, printing usage and returning `None` when the input or
    /// the subcommand is missing. Any other command-line error exits.
    pub fn parse_or_usage<I, T>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => Some(cli),
            Err(e) if is_missing_input(&e) => {
                println!("{}", e.render());
                None
            }
            Err(e) => e.exit(),
        }
    }
}

fn is_missing_input(e: &clap::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::MissingRequiredArgument
            | ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[derive(Subcommand)]
pub enum Subcommands {
    /// Filter a position dump (.csv or .csv.zst) into the plain training format.
    Filter {
        /// Path to the position dump.
        input: PathBuf,
        /// Output path. Derived from the input name if omitted.
        #[clap(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// TOML file overriding the filter thresholds.
        #[clap(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Print a progress report every N positions (0 to disable).
        #[clap(long, value_name = "N", default_value = "10000")]
        report_every: u64,
    },
    /// Run the filter over a position dump and only report statistics.
    Stats {
        /// Path to the position dump.
        input: PathBuf,
        /// TOML file overriding the filter thresholds.
        #[clap(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Print a progress report every N positions (0 to disable).
        #[clap(long, value_name = "N", default_value = "10000")]
        report_every: u64,
    },
    /// Count the games and positions in a position dump.
    Count {
        /// Path to the position dump.
        input: PathBuf,
        /// Print a progress report every N positions (0 to disable).
        #[clap(long, value_name = "N", default_value = "10000")]
        report_every: u64,
    },
    /// Count repeated piece placements in a position dump.
    Dupes {
        /// Path to the position dump.
        input: PathBuf,
        /// Print a progress report every N positions (0 to disable).
        #[clap(long, value_name = "N", default_value = "1000000")]
        report_every: u64,
    },
    /// Rewrite a position dump game by game, recovering the moves actually played.
    Repair {
        /// Path to the position dump.
        input: PathBuf,
        /// Output path. Derived from the input name if omitted.
        #[clap(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// TOML file overriding the filter thresholds.
        #[clap(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Print a progress report every N positions (0 to disable).
        #[clap(long, value_name = "N", default_value = "10000")]
        report_every: u64,
    },
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_simple_tracing;
use crate::{config_print, simulate};
use anyhow::Result;
use clap::{command, ArgAction, Parser, Subcommand};
use contrib_config::{load_config, AppConfig};
use std::str::FromStr;
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "contrib")]
#[command(about = "Confidential contribution scores revealed through a verified decryption oracle", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Raise the log level with additional `-v` arguments. Eg. `contrib -vvv` gives trace output.
    /// Without it the configured `log_level` is used.
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,
}

impl Cli {
    pub fn log_level(&self, config: &AppConfig) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::from_str(&config.log_level).unwrap_or(Level::INFO),
            1 => Level::INFO,  // -v
            2 => Level::DEBUG, // -vv
            _ => Level::TRACE, // -vvv
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.config.clone())?;
        setup_simple_tracing(self.log_level(&config));
        match config.config_file() {
            Some(path) => info!(path = %path.display(), "Loaded configuration"),
            None => info!("No configuration file found, using defaults"),
        }

        match self.command {
            Commands::Config => config_print::execute(&config)?,
            Commands::Simulate { values } => simulate::execute(&config, values).await?,
        }

        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the effective configuration
    Config,

    /// Run submissions through an in-process oracle and print the revealed values
    Simulate {
        /// Shapley value to submit. Repeat for several participants.
        #[arg(
            long = "value",
            action = clap::ArgAction::Append,
            value_name = "VALUE",
            required = true
        )]
        values: Vec<u32>,
    },
}

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use commands::{check, predict, serve};

#[derive(Parser)]
#[command(name = "housecast")]
#[command(about = "Housing price growth dashboard with CLI tools and web server")]
#[command(version)]
pub struct Cli {
    /// Path to a YAML configuration file
    ///
    /// Defaults to configuration/base.yaml when it exists. Any value can be
    /// overridden with HOUSECAST__<SECTION>__<KEY> environment variables.
    #[arg(short, long, global = true, env = "HOUSECAST_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Load the model, data and boundaries and report how they fit together
    Check,
    /// Print one prediction and exit
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Region name, exactly as in the data (e.g., "Madrid")
    #[arg(short, long)]
    pub region: String,

    /// Target calendar year
    #[arg(short, long, conflicts_with = "horizon", required_unless_present = "horizon")]
    pub year: Option<i32>,

    /// Years after the last observed year
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.config.as_deref();
        match self.command {
            Commands::Serve { bind_address } => {
                serve(config, bind_address.as_deref()).await?;
            }
            Commands::Check => {
                check(config)?;
            }
            Commands::Predict(args) => {
                predict(config, &args)?;
            }
        }
        Ok(())
    }
}

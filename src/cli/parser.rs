use clap::{Parser, Subcommand};

/// Command-line interface definition for statelog
#[derive(Parser)]
#[command(
    name = "statelog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Log an MQTT state topic into daily CSV files with bounded retention",
    long_about = None
)]
pub struct Cli {
    /// Configuration file (default: <config dir>/statelog/config.yml)
    #[arg(global = true, long = "config")]
    pub config: Option<String>,

    /// Override the log directory
    #[arg(global = true, long = "dir")]
    pub dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scheduled invocation: rotate, log until the run window closes, rotate
    Run,

    /// Reconcile the log directory (archive, clean up) without connecting
    Rotate,

    /// Show the remaining run budget for an invocation started now
    Window,

    /// Write a configuration template
    Init {
        #[arg(long = "force", help = "Overwrite an existing configuration file")]
        force: bool,
    },

    /// Inspect the effective configuration
    Config {
        #[arg(long = "print", help = "Print the merged configuration (password masked)")]
        print_config: bool,

        #[arg(long = "check", help = "Validate the configuration and list missing keys")]
        check: bool,
    },
}

//! CLI command definitions.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the stored license key and status
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store a license key and check it
    SetKey {
        /// License key
        key: String,
    },

    /// Activate the stored key for this site
    Activate,

    /// Deactivate the stored key for this site
    Deactivate,

    /// Check the stored key and save its status
    Check,

    /// Ask the store for a newer release
    UpdateCheck,

    /// Check the license daily until interrupted
    Watch,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}

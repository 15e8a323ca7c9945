//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::CONFIG_FILE_NAME;

/// Inkbird MQTT sensor for Bluetooth pool thermometers.
#[derive(Debug, Parser)]
#[command(
    name = "inkbirdd",
    version,
    about,
    after_help = "For further details see: https://github.com/ptc/Inkbird-IBS-P01B-MQTT"
)]
pub struct Cli {
    /// Directory where `inkbird.toml` is located.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub config_dir: PathBuf,

    /// One-time execution: read and publish once, then exit.
    #[arg(long, visible_alias = "nodaemon")]
    pub once: bool,
}

impl Cli {
    /// Full path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(
    name = "points-monitor",
    version,
    about = "Tracks Poe points usage per billing cycle"
)]
pub struct CliArgs {
    /// Override the configured port for this run only
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the SQLite database
    #[arg(long, value_name = "DIR", env = "POINTS_MONITOR_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

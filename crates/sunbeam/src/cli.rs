use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "sunbeam", version, about = "Extensible terminal launcher")]
pub struct Cli {
    /// Config file to read instead of the default location.
    #[arg(long, env = "SUNBEAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Open this extension instead of the root list.
    pub extension: Option<String>,

    /// Run this command of the extension directly.
    pub command: Option<String>,

    /// Bind a command param, as KEY=VALUE. Repeatable.
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

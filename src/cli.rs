use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "aw-importer-ios-fitness", version)]
#[command(
    about = "Import iOS workout exports into ActivityWatch",
    long_about = "Watches a folder for workout history CSV exports, imports each new workout as an ActivityWatch event and renames the file with an _imported suffix once done."
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "FILE", help = "Path to the config file")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "DIR",
        help = "Folder containing the exports (overrides data_path)"
    )]
    pub data_path: Option<String>,

    #[arg(long, global = true, help = "Use the ActivityWatch testing server")]
    pub testing: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Watch the data folder and import new exports until interrupted (default)
    Watch,
    /// Import a single export now, then mark it as imported
    Import {
        #[arg(value_name = "FILE", help = "Workout export to import")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            data_path: self.data_path.clone(),
            testing: self.testing.then_some(true),
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch)
    }
}

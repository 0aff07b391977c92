use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "comic-convert")]
#[command(bin_name = "comic-convert")]
#[command(version)]
#[command(about = "Submit directories of comic pages for conversion and track the job")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Service base URL. Overrides the settings file.
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// RON settings file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level and mirror the log to the terminal.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Upload directories of images and wait for the conversion")]
    Convert(ConvertArgs),
    #[command(about = "Check a conversion task once")]
    Status { task_id: String },
    #[command(about = "Print the download URL of a finished conversion")]
    DownloadUrl { conversion_id: String },
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Directories to upload. Each one becomes a group named after it.
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Right-to-left reading order.
    #[arg(long)]
    pub manga: bool,

    /// Delay between status checks.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Save the finished archive into this directory.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

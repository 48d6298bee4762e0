use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
pub struct Cli {
    /// Disk image
    #[arg(long, short)]
    pub disk: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create and format a new image
    Make {
        /// Number of data blocks
        data_blocks: usize,
    },
    #[command(flatten)]
    Volume(VolumeCommand),
}

/// 需要挂载已有镜像的命令
#[derive(Subcommand)]
pub enum VolumeCommand {
    /// Show volume information
    Info,
    /// List files
    Ls,
    /// Copy a host file into the volume
    Add { host_file: PathBuf },
    /// Delete a file
    Rm { name: String },
    /// Print a file to stdout
    Cat { name: String },
    /// Show the size of a file
    Stat { name: String },
}

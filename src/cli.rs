/*!
 * Command line definition
 */

use clap::{Parser, Subcommand};
use filedrop_core::DEFAULT_CHUNK_SIZE;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "filedrop")]
#[command(version, about = "Upload, download, list and delete files on a filedrop server", long_about = None)]
pub struct Cli {
    /// gRPC address of the filedrop server
    #[arg(
        long,
        env = "FILEDROP_SERVER",
        default_value = "http://localhost:50051",
        global = true
    )]
    pub server: String,

    /// Upload chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    pub chunk_size: usize,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file and print its identifier
    Upload {
        /// File to upload
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Download a file by identifier
    Download {
        /// Identifier returned by upload or shown by list
        file_id: String,

        /// Output path (defaults to the stored filename)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// List files on the server
    List,

    /// Delete a file; prompts for a selection when no identifier is given
    Delete {
        file_id: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

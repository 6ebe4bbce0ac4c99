//! CLI for offline freezer maintenance.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd_concat;
mod cmd_get;
mod cmd_init;
mod cmd_put;
mod cmd_status;

#[derive(Parser, Debug)]
#[command(name = "coldstore", version, about = "coldstore freezer maintenance CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Initialize a freezer with the given tables
    Init {
        #[arg(long)]
        path: PathBuf,
        /// Comma-separated table names
        #[arg(long, value_delimiter = ',', required = true)]
        tables: Vec<String>,
    },
    /// Append one item to a table (value as string or from file)
    Put {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        table: String,
        /// Value as a literal string (UTF-8). Ignored if --value-file is set.
        #[arg(long)]
        value: Option<String>,
        /// Read value bytes from a file
        #[arg(long)]
        value_file: Option<PathBuf>,
    },
    /// Read one item back
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        table: String,
        #[arg(long)]
        item: u64,
        /// Optional file to write raw item bytes into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print per-table summary
    Status {
        #[arg(long)]
        path: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Append all items of the freezer at --from onto --path, then promote
    /// the merged store to occupy --from's path
    Concat {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        from: PathBuf,
        /// JSON report
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Init { path, tables } => cmd_init::exec(path, tables),

        Cmd::Put {
            path,
            table,
            value,
            value_file,
        } => cmd_put::exec(path, table, value, value_file),

        Cmd::Get {
            path,
            table,
            item,
            out,
        } => cmd_get::exec(path, table, item, out),

        Cmd::Status { path, json } => cmd_status::exec(path, json),

        Cmd::Concat { path, from, json } => cmd_concat::exec(path, from, json),
    }
}

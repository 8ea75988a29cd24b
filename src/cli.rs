//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `httpvcr`.
#[derive(Debug, Parser)]
#[command(name = "httpvcr", version, about = "Inspect and maintain HTTP cassettes")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Identifies one cassette on disk.
#[derive(Debug, Clone, Args)]
pub struct CassetteArgs {
    /// Folder holding the cassette.
    pub folder: PathBuf,
    /// Cassette name, without the `.cassette.yaml` extension.
    pub name: String,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the interactions stored in a cassette.
    List(CassetteArgs),
    /// Delete a cassette.
    Erase(CassetteArgs),
    /// Redact values in every stored interaction.
    Censor {
        /// Cassette to rewrite.
        #[command(flatten)]
        cassette: CassetteArgs,
        /// Header name to censor (repeatable).
        #[arg(long = "header", value_name = "NAME")]
        headers: Vec<String>,
        /// Query parameter to censor (repeatable).
        #[arg(long = "query", value_name = "NAME")]
        query_parameters: Vec<String>,
        /// JSON body key to censor at any depth (repeatable).
        #[arg(long = "body-key", value_name = "KEY")]
        body_keys: Vec<String>,
        /// JSON pointer into the body to censor (repeatable).
        #[arg(long = "body-path", value_name = "POINTER")]
        body_paths: Vec<String>,
        /// Replacement text.
        #[arg(long)]
        text: Option<String>,
    },
}

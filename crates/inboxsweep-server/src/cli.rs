use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inboxsweep")]
#[command(
    author,
    version,
    about = "Inbox cleanup assistant backed by a local Ollama model"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "inboxsweep.yaml")]
    pub config: String,

    /// Base URL of the local Ollama service
    #[arg(long, global = true, env = "INBOXSWEEP_OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Model used when a scan does not name one
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP scan server
    Serve {
        /// Listen address
        #[arg(short, long)]
        listen: Option<String>,

        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify a list of emails once and print the decisions
    Scan {
        /// JSON file holding an array of emails (defaults to the built-in sample inbox)
        #[arg(short, long)]
        emails: Option<PathBuf>,

        /// Delete the emails marked DELETE and report the impact
        #[arg(long)]
        confirm: bool,
    },

    /// Check whether the Ollama service is reachable and list its models
    Health,
}

//! CLI definitions for pocket-ide.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pocket-ide",
    version,
    about = "Pocket web IDE shell: playground, console and AI chat relay",
    infer_subcommands = true,
    after_help = "Examples:\n  pocket-ide serve                        # HTTP API on 127.0.0.1:8787\n  pocket-ide console                      # interactive console\n  pocket-ide render --template card       # print the combined document\n  pocket-ide scratch -o .                 # save the scratch buffer as code.js\n  pocket-ide chat \"explain flexbox\"       # ask the assistant"
)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG still wins).
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Config file (defaults to ./pocket-ide.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP API.
    Serve {
        /// Listen address override (host:port).
        #[arg(long)]
        listen: Option<String>,
    },
    /// Interactive command console.
    Console,
    /// Render or export the combined document.
    Render {
        /// Seed buffers from a built-in template.
        #[arg(long)]
        template: Option<String>,
        /// Markup file.
        #[arg(long)]
        html: Option<PathBuf>,
        /// Style file.
        #[arg(long)]
        css: Option<PathBuf>,
        /// Script file.
        #[arg(long)]
        js: Option<PathBuf>,
        /// Produce the standalone export instead of the preview document.
        #[arg(long)]
        export: bool,
        /// Write to a file instead of stdout (with --export and a directory,
        /// writes index.html inside it).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print or save the JavaScript scratch buffer.
    Scratch {
        /// Load the buffer from this file instead of the starter snippet.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write to a file instead of stdout (a directory gets code.js).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Browse the template catalog.
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
    /// Send one message to the chat relay and stream the reply.
    Chat {
        /// Provider selector (openai or perplexity).
        #[arg(long, default_value = "openai")]
        provider: String,
        /// Message text; words are joined with spaces.
        #[arg(required = true)]
        message: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TemplatesAction {
    /// List template ids and descriptions.
    List,
    /// Print a template's three buffers.
    Show {
        /// Template id.
        id: String,
    },
    /// Print a template as a single pasteable snippet.
    Snippet {
        /// Template id.
        id: String,
    },
}

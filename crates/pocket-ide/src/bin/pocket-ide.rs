//! CLI entrypoint for pocket-ide.

#[path = "pocket-ide/chat.rs"]
mod chat;
#[path = "pocket-ide/cli.rs"]
mod cli;
#[path = "pocket-ide/console.rs"]
mod console;
#[path = "pocket-ide/prompt.rs"]
mod prompt;
#[path = "pocket-ide/render.rs"]
mod render;
#[path = "pocket-ide/scratch.rs"]
mod scratch;
#[path = "pocket-ide/serve.rs"]
mod serve;
#[path = "pocket-ide/style.rs"]
mod style;
#[path = "pocket-ide/templates.rs"]
mod templates;

use clap::Parser;
use pocket_ide::IdeConfig;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", style::error(format!("Error: {err:#}")));
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = IdeConfig::discover(cli.config.as_deref())?;
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(level);
    config.load_credentials_from_env();

    match cli.command {
        Command::Serve { listen } => serve::run_serve(config, listen),
        Command::Console => console::run_console(),
        Command::Render {
            template,
            html,
            css,
            js,
            export,
            output,
        } => render::run_render(render::RenderArgs {
            template,
            html,
            css,
            js,
            export,
            output,
        }),
        Command::Scratch { input, output } => scratch::run_scratch(input.as_deref(), output),
        Command::Templates { action } => templates::run_templates(action),
        Command::Chat { provider, message } => chat::run_chat(config.relay, &provider, &message),
    }
}

/// `RUST_LOG` wins; otherwise the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

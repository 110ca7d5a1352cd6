//! `pocket-ide chat`.

use std::io::{self, Write};

use pocket_relay::{ChatMessage, ChatRelay, ChatRequest, Provider, RelaySettings};
use tracing::debug;

pub fn run_chat(settings: RelaySettings, provider: &str, message: &[String]) -> anyhow::Result<()> {
    let provider = Provider::parse(provider)?;
    let relay = ChatRelay::http(settings);
    let request = ChatRequest::new(vec![ChatMessage::user(message.join(" "))], Some(provider));
    let mut stream = relay.forward(&request)?;
    debug!(provider = provider.as_str(), "streaming reply");

    let mut stdout = io::stdout().lock();
    io::copy(&mut stream, &mut stdout)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

//! `pocket-ide serve`.

use std::sync::Arc;

use pocket_ide::{start_web_server, ConsoleSessions, IdeConfig, SessionLimits, WebState};
use pocket_console::local_offset_clock;
use pocket_relay::{ChatRelay, Provider};
use tracing::{info, warn};

use crate::style;

pub fn run_serve(mut config: IdeConfig, listen: Option<String>) -> anyhow::Result<()> {
    if let Some(listen) = listen {
        config.server.listen = listen.into();
    }
    for provider in Provider::ALL {
        let settings = config.relay.get(provider);
        if settings.api_key.is_none() {
            warn!(
                provider = provider.as_str(),
                env = settings.api_key_env.as_str(),
                "no credential configured; chat requests for this provider will fail"
            );
        }
    }

    // Resolved here, while the process still has a single thread.
    let sessions = ConsoleSessions::new(SessionLimits::from(config.console))
        .with_console_clock(local_offset_clock());
    let state = WebState {
        relay: Arc::new(ChatRelay::http(config.relay.clone())),
        sessions: Arc::new(sessions),
    };
    let server = start_web_server(&config.server, state)?;
    info!(listen = %server.listen, "pocket-ide ready");
    println!(
        "Serving on {}",
        style::accent(format!("http://{}", server.listen))
    );
    server.wait();
    Ok(())
}

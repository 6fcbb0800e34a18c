use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt, future};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::info;

use crate::config::AgentConfig;
use crate::metrics::SessionMetrics;
use crate::modes::session::play;

/// Plays one game against a server at `ws://<server>:<port>/player`
pub struct WsMode {
    url: String,
    name: String,
    config: AgentConfig,
}

impl WsMode {
    pub fn new(server: &str, port: u16, name: impl Into<String>, config: AgentConfig) -> Self {
        Self {
            url: format!("ws://{server}:{port}/player"),
            name: name.into(),
            config,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn run(&self) -> Result<SessionMetrics> {
        let (stream, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", self.url))?;
        info!(url = %self.url, "connected");

        let (sink, source) = stream.split();
        let incoming = source.filter_map(|message| future::ready(text_frame(message)));
        let outgoing =
            sink.with(|line: String| future::ready(Ok::<_, WsError>(Message::Text(line))));

        play(incoming, outgoing, &self.name, self.config.clone()).await
    }
}

/// Text payload of a frame; control and binary frames are skipped
fn text_frame(message: Result<Message, WsError>) -> Option<Result<String, WsError>> {
    match message {
        Ok(Message::Text(text)) => Some(Ok(text.to_string())),
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    }
}

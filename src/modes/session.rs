use anyhow::{Context, Result, bail};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tracing::{error, info};

use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::metrics::SessionMetrics;
use crate::protocol::{Command, Handshake, StateMessage};

/// Join, read the handshake, then answer each tick with one key command
///
/// `incoming` yields one JSON message per item and `outgoing` takes one JSON
/// message per item, so the same loop serves line-delimited pipes and
/// websocket frames. Ticks that fail to parse or cannot be acted on are
/// logged and left unanswered. The session ends when `incoming` ends.
pub async fn play<S, K, E>(
    mut incoming: S,
    mut outgoing: K,
    name: &str,
    config: AgentConfig,
) -> Result<SessionMetrics>
where
    S: Stream<Item = Result<String, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
    K: Sink<String> + Unpin,
    K::Error: std::error::Error + Send + Sync + 'static,
{
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid agent configuration")?;

    let mut metrics = SessionMetrics::new();

    outgoing
        .send(Command::join(name).to_json()?)
        .await
        .context("Failed to send join")?;

    let handshake = loop {
        match incoming.next().await.transpose().context("Failed to read handshake")? {
            Some(message) if message.trim().is_empty() => continue,
            Some(message) => break message,
            None => bail!("connection closed before the handshake"),
        }
    };
    let map = Handshake::parse(&handshake)
        .and_then(Handshake::into_map)
        .context("Invalid handshake")?;
    let (width, height) = map.size();
    info!(name, width, height, stones = map.stones().len(), "joined game");

    let mut agent = Agent::new(map, config)?;

    while let Some(message) = incoming.next().await.transpose().context("Failed to read tick")? {
        if message.trim().is_empty() {
            continue;
        }

        let snapshot = match StateMessage::parse(&message)
            .and_then(|state| state.into_snapshot(width, height))
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "dropping malformed tick");
                metrics.on_dropped();
                continue;
            }
        };

        match agent.decide(&snapshot) {
            Ok(decision) => {
                metrics.record(&decision);
                outgoing
                    .send(Command::key(decision.action).to_json()?)
                    .await
                    .context("Failed to send key")?;
            }
            Err(e) => {
                error!(step = snapshot.step, error = %e, "dropping tick");
                metrics.on_dropped();
            }
        }
    }

    metrics.update();
    info!(summary = %metrics.format_summary(), "session ended");
    Ok(metrics)
}

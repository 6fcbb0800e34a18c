use anyhow::Result;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::config::AgentConfig;
use crate::metrics::SessionMetrics;
use crate::modes::session::play;

/// Plays one game over line-delimited JSON on stdin/stdout
pub struct PipeMode {
    name: String,
    config: AgentConfig,
}

impl PipeMode {
    pub fn new(name: impl Into<String>, config: AgentConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub async fn run(&self) -> Result<SessionMetrics> {
        run_session(
            tokio::io::stdin(),
            tokio::io::stdout(),
            &self.name,
            self.config.clone(),
        )
        .await
    }
}

/// One session over a byte stream, one JSON message per line
pub async fn run_session<R, W>(
    reader: R,
    writer: W,
    name: &str,
    config: AgentConfig,
) -> Result<SessionMetrics>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let incoming = FramedRead::new(reader, LinesCodec::new());
    let outgoing = FramedWrite::new(writer, LinesCodec::new());
    play(incoming, outgoing, name, config).await
}

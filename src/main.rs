use std::path::PathBuf;

use anyhow::{Context, Result};
use astar_snake::config::AgentConfig;
use astar_snake::game::GameConfig;
use astar_snake::modes::{PipeMode, SimulateMode, WsMode};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "astar_snake")]
#[command(version, about = "Snake agent driven by A* search and quadrant exploration")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Args)]
struct AgentArgs {
    /// JSON file with agent settings and cost weights
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for exploration sampling (and arena layout when simulating)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Mode {
    /// Join the game server over a websocket
    Ws {
        /// Server host
        #[arg(long, env = "SERVER", default_value = "localhost")]
        server: String,

        /// Server port
        #[arg(long, env = "PORT", default_value = "8000")]
        port: u16,

        /// Name sent in the join command
        #[arg(long, env = "NAME", default_value = "student")]
        name: String,

        #[command(flatten)]
        agent: AgentArgs,
    },
    /// Play one game over line-delimited JSON on stdin/stdout
    Pipe {
        /// Name sent in the join command
        #[arg(long, env = "NAME", default_value = "student")]
        name: String,

        #[command(flatten)]
        agent: AgentArgs,
    },
    /// Play against the built-in arena
    Simulate {
        /// Grid width
        #[arg(long, default_value = "48")]
        width: usize,

        /// Grid height
        #[arg(long, default_value = "24")]
        height: usize,

        /// Number of stones
        #[arg(long, default_value = "40")]
        stones: usize,

        /// Number of food items on the map
        #[arg(long, default_value = "4")]
        food: usize,

        /// Half-width of the visible window around the head
        #[arg(long, default_value = "3")]
        sight_radius: usize,

        /// Stones can be crossed
        #[arg(long)]
        traverse: bool,

        /// Stop after this many ticks
        #[arg(long, default_value = "1000")]
        ticks: u64,

        #[command(flatten)]
        agent: AgentArgs,
    },
}

impl AgentArgs {
    fn load(&self) -> Result<AgentConfig> {
        let config = match &self.config {
            Some(path) => AgentConfig::load(path)?,
            None => AgentConfig::new(),
        };
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid agent configuration")?;

        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries protocol messages in pipe mode
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Ws {
            server,
            port,
            name,
            agent,
        } => {
            let ws_mode = WsMode::new(&server, port, name, agent.load()?);
            ws_mode.run().await?;
        }
        Mode::Pipe { name, agent } => {
            let pipe_mode = PipeMode::new(name, agent.load()?);
            pipe_mode.run().await?;
        }
        Mode::Simulate {
            width,
            height,
            stones,
            food,
            sight_radius,
            traverse,
            ticks,
            agent,
        } => {
            let game = GameConfig {
                stone_count: stones,
                food_count: food,
                sight_radius,
                traverse,
                seed: agent.seed,
                ..GameConfig::new(width, height)
            };
            let simulate_mode = SimulateMode::new(game, agent.load()?, ticks);
            simulate_mode.run()?;
        }
    }

    Ok(())
}

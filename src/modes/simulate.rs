use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::game::{Arena, CollisionType, GameConfig};
use crate::metrics::SessionMetrics;

/// How a simulated game finished
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub score: u32,
    pub steps: u64,
    pub collision: Option<CollisionType>,
    pub metrics: SessionMetrics,
}

impl SimulationReport {
    pub fn format_summary(&self) -> String {
        let ending = match self.collision {
            Some(CollisionType::Wall) => "hit a wall",
            Some(CollisionType::SelfCollision) => "hit itself",
            Some(CollisionType::Stone) => "hit a stone",
            None => "survived",
        };
        format!(
            "score {} after {} steps, {}; {}",
            self.score,
            self.steps,
            ending,
            self.metrics.format_summary()
        )
    }
}

/// Runs the agent against the local arena
pub struct SimulateMode {
    game: GameConfig,
    agent: AgentConfig,
    max_ticks: u64,
}

impl SimulateMode {
    pub fn new(game: GameConfig, agent: AgentConfig, max_ticks: u64) -> Self {
        Self {
            game,
            agent,
            max_ticks,
        }
    }

    pub fn run(&self) -> Result<SimulationReport> {
        self.game
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid arena configuration")?;

        let mut arena = Arena::new(self.game.clone());
        let (width, height) = arena.map().size();

        // the agent only learns the map through the handshake
        let map = arena
            .handshake()
            .into_map()
            .context("Failed to rebuild map from handshake")?;
        let mut agent = Agent::new(map, self.agent.clone())?;
        let mut metrics = SessionMetrics::new();
        let mut collision = None;

        info!(
            width,
            height,
            stones = arena.map().stones().len(),
            max_ticks = self.max_ticks,
            "simulation started"
        );

        for _ in 0..self.max_ticks {
            let snapshot = arena
                .observe()
                .into_snapshot(width, height)
                .context("Arena produced an unreadable state")?;

            let action = match agent.decide(&snapshot) {
                Ok(decision) => {
                    metrics.record(&decision);
                    decision.action
                }
                Err(e) => {
                    error!(step = snapshot.step, error = %e, "dropping tick");
                    metrics.on_dropped();
                    continue;
                }
            };

            let result = arena.step(action);
            if result.info.ate_food {
                debug!(step = arena.steps(), score = arena.score(), "ate food");
            }
            if result.terminated {
                collision = result.info.collision_type;
                break;
            }
        }

        metrics.update();
        let report = SimulationReport {
            score: arena.score(),
            steps: arena.steps(),
            collision,
            metrics,
        };
        info!(summary = %report.format_summary(), "simulation finished");
        Ok(report)
    }
}

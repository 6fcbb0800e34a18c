use std::time::{Duration, Instant};

use crate::agent::{Branch, Decision};

/// Counters for one session, reported when it ends
#[derive(Debug, Clone)]
pub struct SessionMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub ticks: u64,
    pub food_moves: u64,
    pub explore_moves: u64,
    pub idle_ticks: u64,
    pub dropped_ticks: u64,
    pub targets_assigned: u64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            ticks: 0,
            food_moves: 0,
            explore_moves: 0,
            idle_ticks: 0,
            dropped_ticks: 0,
            targets_assigned: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn record(&mut self, decision: &Decision) {
        self.ticks += 1;
        match decision.branch {
            Branch::Food(_) => self.food_moves += 1,
            Branch::Explore(_) => self.explore_moves += 1,
            Branch::Idle => self.idle_ticks += 1,
        }
        if decision.new_target.is_some() {
            self.targets_assigned += 1;
        }
    }

    /// A tick that could not be parsed or acted on
    pub fn on_dropped(&mut self) {
        self.ticks += 1;
        self.dropped_ticks += 1;
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "{} ticks in {} (food {}, explore {}, idle {}, dropped {}, targets {})",
            self.ticks,
            self.format_time(),
            self.food_moves,
            self.explore_moves,
            self.idle_ticks,
            self.dropped_ticks,
            self.targets_assigned
        )
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

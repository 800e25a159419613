//! Simulation clock
//!
//! Converts variable frame deltas into a stream of fixed combat ticks.
//! Status timers and field lifetimes only ever see the fixed step, which keeps
//! tick counts reproducible across frame rates.

use serde::{Deserialize, Serialize};

/// Configuration for the simulation clock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many simulated seconds pass per real second
    pub time_scale: f32,
    /// Fixed combat timestep (in seconds)
    pub fixed_timestep: f32,
    /// Maximum frame delta accepted in one update, to prevent a spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

/// Game time tracking
#[derive(Debug, Clone)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Simulated time since start in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Number of fixed ticks consumed so far
    pub tick_count: u64,
    /// Whether the simulation is paused
    pub paused: bool,
    /// Accumulated time not yet consumed by fixed ticks
    fixed_accumulator: f32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(mut config: TimeConfig) -> Self {
        if !(config.fixed_timestep > 0.0) {
            config.fixed_timestep = TimeConfig::default().fixed_timestep;
        }
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            tick_count: 0,
            paused: false,
            fixed_accumulator: 0.0,
        }
    }

    /// Update with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        let clamped = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.delta_time = clamped * self.config.time_scale;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.delta_time;
    }

    /// Number of fixed ticks to run this frame. Consumes them from the accumulator.
    pub fn fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.fixed_accumulator >= self.config.fixed_timestep {
            self.fixed_accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        self.tick_count += steps as u64;
        steps
    }

    /// The fixed timestep every tick advances by
    pub fn fixed_timestep(&self) -> f32 {
        self.config.fixed_timestep
    }

    /// Pause the simulation
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        self.paused = false;
    }
}

//! Locally-authoritative round simulation

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::command::Command;

use super::model::{
    GameState, Obstacle, ObstacleKind, BOUNDARY_HORIZONTAL, BOUNDARY_VERTICAL,
    CANVAS_HEIGHT, CANVAS_WIDTH,
};

/// Commands buffered between ticks; oldest are dropped past this
const COMMAND_QUEUE_CAP: usize = 32;

/// Obstacles spawn at least this far from the top and bottom edges
const SPAWN_Y_MARGIN: f32 = 70.0;

/// Tuning values for a round
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Pixels the airplane moves per accepted command
    pub move_step: f32,
    /// Spawn interval at round start
    pub spawn_interval_ms: u64,
    /// Spawn interval never drops below this
    pub spawn_interval_floor_ms: u64,
    /// Interval reduction per difficulty step
    pub spawn_interval_step_ms: u64,
    /// Horizontal obstacle speed before the speed multiplier
    pub base_obstacle_speed: f32,
    /// Points per obstacle that fully clears the left edge
    pub clear_reward: u32,
    /// Score between difficulty steps
    pub speed_up_every: u32,
    /// Multiplier added per difficulty step
    pub speed_up_amount: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            move_step: 50.0,
            spawn_interval_ms: 2500,
            spawn_interval_floor_ms: 1500,
            spawn_interval_step_ms: 50,
            base_obstacle_speed: 3.5,
            clear_reward: 10,
            speed_up_every: 50,
            speed_up_amount: 0.05,
        }
    }
}

/// Events emitted by a simulation tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// An obstacle fully left the playfield and paid out
    ObstacleCleared { id: u64, score: u32 },
    /// A score threshold raised the difficulty
    DifficultyRaised {
        game_speed: f32,
        spawn_interval_ms: u64,
    },
    /// The airplane hit an obstacle; the round is over
    Crashed { obstacle_id: u64, score: u32 },
}

/// The authoritative round simulation.
///
/// Commands queue up between ticks and are drained in arrival order at
/// the start of each tick, so a tick observes a single consistent
/// airplane position. All timing comes in through `now_ms` which keeps
/// the engine deterministic for a given seed and call schedule.
pub struct LocalEngine {
    cfg: EngineConfig,
    state: GameState,
    commands: VecDeque<Command>,
    spawn_interval_ms: u64,
    last_spawn_ms: u64,
    difficulty_steps: u32,
    next_obstacle_id: u64,
    rng: ChaCha8Rng,
}

impl LocalEngine {
    pub fn new(seed: u64) -> Self {
        Self::with_config(EngineConfig::default(), seed)
    }

    pub fn with_config(cfg: EngineConfig, seed: u64) -> Self {
        Self {
            cfg,
            state: GameState::default(),
            commands: VecDeque::new(),
            spawn_interval_ms: cfg.spawn_interval_ms,
            last_spawn_ms: 0,
            difficulty_steps: 0,
            next_obstacle_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// True while a round is running
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Begin a fresh round. Everything except the RNG stream resets.
    pub fn start(&mut self, now_ms: u64) {
        self.state = GameState {
            game_started: true,
            ..GameState::default()
        };
        self.commands.clear();
        self.spawn_interval_ms = self.cfg.spawn_interval_ms;
        self.last_spawn_ms = now_ms;
        self.difficulty_steps = 0;
        self.next_obstacle_id = 0;
        debug!("round started");
    }

    /// Stop the round without a crash. The state freezes as-is.
    pub fn halt(&mut self) {
        self.state.game_started = false;
        self.commands.clear();
    }

    /// Queue a movement command for the next tick. Commands sent
    /// before the round starts or after it ends are dropped.
    pub fn dispatch(&mut self, command: Command) {
        if !self.is_active() || !command.is_motion() {
            return;
        }
        if self.commands.len() == COMMAND_QUEUE_CAP {
            self.commands.pop_front();
        }
        self.commands.push_back(command);
    }

    /// Advance the round by one tick.
    pub fn tick(&mut self, now_ms: u64) -> Vec<TickEvent> {
        let mut events = Vec::new();
        if !self.is_active() {
            return events;
        }

        self.drain_commands();

        if now_ms.saturating_sub(self.last_spawn_ms) > self.spawn_interval_ms {
            self.spawn_obstacle();
            self.last_spawn_ms = now_ms;
        }

        for obstacle in &mut self.state.obstacles {
            obstacle.x -= obstacle.speed;
        }

        let airplane = self.state.airplane;
        let mut crashed_into = None;
        let mut survivors = Vec::with_capacity(self.state.obstacles.len());
        for obstacle in std::mem::take(&mut self.state.obstacles) {
            // First collision ends the round; the rest of the field
            // freezes in place.
            if crashed_into.is_some() {
                survivors.push(obstacle);
                continue;
            }
            if obstacle.is_cleared() {
                self.state.score += self.cfg.clear_reward;
                events.push(TickEvent::ObstacleCleared {
                    id: obstacle.id,
                    score: self.state.score,
                });
                self.raise_difficulty(&mut events);
                continue;
            }
            if airplane.collides_with(&obstacle) {
                crashed_into = Some(obstacle.id);
            }
            survivors.push(obstacle);
        }
        self.state.obstacles = survivors;

        if let Some(obstacle_id) = crashed_into {
            self.state.game_over = true;
            events.push(TickEvent::Crashed {
                obstacle_id,
                score: self.state.score,
            });
            debug!(score = self.state.score, "round over");
        }

        events
    }

    fn drain_commands(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: Command) {
        let plane = &mut self.state.airplane;
        let step = self.cfg.move_step;
        match command {
            Command::Up => plane.y = (plane.y - step).max(BOUNDARY_VERTICAL),
            Command::Down => {
                plane.y = (plane.y + step).min(CANVAS_HEIGHT - plane.height - BOUNDARY_VERTICAL)
            }
            Command::Left => plane.x = (plane.x - step).max(BOUNDARY_HORIZONTAL),
            Command::Right => {
                plane.x = (plane.x + step).min(CANVAS_WIDTH - plane.width - BOUNDARY_HORIZONTAL)
            }
            Command::None => {}
        }
    }

    fn spawn_obstacle(&mut self) {
        let kind = ObstacleKind::ALL[self.rng.gen_range(0..ObstacleKind::ALL.len())];
        let (width, height) = kind.size();
        let y = SPAWN_Y_MARGIN + self.rng.gen_range(0.0..CANVAS_HEIGHT - 2.0 * SPAWN_Y_MARGIN);

        self.state.obstacles.push(Obstacle {
            id: self.next_obstacle_id,
            x: CANVAS_WIDTH,
            y,
            width,
            height,
            speed: self.cfg.base_obstacle_speed * self.state.game_speed,
            kind,
        });
        self.next_obstacle_id += 1;
    }

    /// Raise difficulty once per crossed score threshold, no matter
    /// how many obstacles cleared in one tick.
    fn raise_difficulty(&mut self, events: &mut Vec<TickEvent>) {
        let crossed = self.state.score / self.cfg.speed_up_every;
        while self.difficulty_steps < crossed {
            self.difficulty_steps += 1;
            self.state.game_speed += self.cfg.speed_up_amount;
            self.spawn_interval_ms = self
                .spawn_interval_ms
                .saturating_sub(self.cfg.spawn_interval_step_ms)
                .max(self.cfg.spawn_interval_floor_ms);
            events.push(TickEvent::DifficultyRaised {
                game_speed: self.state.game_speed,
                spawn_interval_ms: self.spawn_interval_ms,
            });
        }
    }

    #[cfg(test)]
    fn inject_obstacle(&mut self, obstacle: Obstacle) {
        self.state.obstacles.push(obstacle);
    }
}

//! Greedy playback of trained tables
//!
//! Playback runs fresh episodes with exploration switched off and never
//! updates the tables. The hider may already be in sight when a layout is
//! generated, so visibility is checked before every turn as well as after.
//! Its only output is the sequence of grid snapshots; pacing belongs to
//! whoever displays them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

use crate::game::{GameConfig, GameEngine, GameState, Grid};
use crate::rl::{Episode, EpisodeStatus, Policies, TurnResult};

/// Presentation settings for watching agents play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Turns per second at normal speed (0 plays without delay)
    pub fps: u32,

    /// Terminal columns used to draw one grid cell
    pub cell_width: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: 5,
            cell_width: 2,
        }
    }
}

impl PlaybackConfig {
    /// Delay between turns at normal speed, `None` when unpaced
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.fps > 0).then(|| Duration::from_micros(1_000_000 / self.fps as u64))
    }
}

/// Playback speed relative to the configured frame rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSpeed {
    /// Half speed
    Slow,
    /// Configured fps
    Normal,
    /// 4x
    Fast,
    /// 12x
    VeryFast,
}

/// Tick used when playback is unpaced; turns run as fast as the loop allows
pub const UNPACED_TICK: Duration = Duration::from_millis(1);

impl PlaybackSpeed {
    /// Tick interval for this speed given the normal-speed frame interval
    ///
    /// An unpaced playback (`None`, from fps 0) ignores the speed setting.
    pub fn tick_interval(&self, frame_interval: Option<Duration>) -> Duration {
        let Some(base) = frame_interval else {
            return UNPACED_TICK;
        };
        let tick = match self {
            Self::Slow => base * 2,
            Self::Normal => base,
            Self::Fast => base / 4,
            Self::VeryFast => base / 12,
        };
        tick.max(UNPACED_TICK)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }
}

/// Trained agents playing greedy episodes on fresh layouts
///
/// Besides ending when the seeker spots the hider, an episode also ends after
/// `max_steps` turns, the same cap training uses, so two agents that never
/// meet cannot stall playback.
pub struct Playback {
    engine: GameEngine,
    policies: Policies,
    episode: Episode,
}

impl Playback {
    /// Start playback on a freshly generated layout
    pub fn new(policies: Policies, game_config: GameConfig, seed: Option<u64>) -> Result<Self> {
        game_config
            .validate()
            .context("Invalid game configuration for playback")?;

        let mut engine = GameEngine::seeded(game_config, seed);
        let layout = engine.reset().context("Failed to generate layout")?;
        let episode = Episode::new(layout, engine.config());

        Ok(Self {
            engine,
            policies,
            episode,
        })
    }

    /// Start playback on a given layout
    pub fn from_layout(policies: Policies, game_config: GameConfig, layout: GameState) -> Self {
        let episode = Episode::new(layout, &game_config);
        Self {
            engine: GameEngine::new(game_config),
            policies,
            episode,
        }
    }

    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    pub fn state(&self) -> &GameState {
        self.episode.state()
    }

    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    /// End the episode if the hider is in sight; true once it is over
    pub fn check_finished(&mut self) -> bool {
        self.episode.check_spotted();
        self.episode.is_done()
    }

    /// Play one greedy turn, or `None` if the episode is already over
    pub fn advance(&mut self) -> Option<TurnResult> {
        if self.check_finished() {
            return None;
        }
        self.episode
            .play_turn(&self.policies, 0.0, self.engine.rng())
    }

    /// Replace the episode with one on a fresh layout
    pub fn reset(&mut self) -> Result<()> {
        let layout = self.engine.reset().context("Failed to generate layout")?;
        self.episode = Episode::new(layout, self.engine.config());
        Ok(())
    }

    /// Play the current episode out, returning every grid snapshot
    ///
    /// The first snapshot is the layout before any move.
    pub fn run_to_end(&mut self) -> (Vec<Grid>, EpisodeStatus) {
        let mut frames = vec![self.state().grid.clone()];
        while self.advance().is_some() {
            frames.push(self.state().grid.clone());
        }
        (frames, self.episode.status())
    }
}

/// Play `episodes` greedy episodes, writing each snapshot as text
pub fn run_headless<W: Write>(playback: &mut Playback, episodes: usize, out: &mut W) -> Result<()> {
    for n in 0..episodes {
        if n > 0 {
            playback.reset()?;
        }

        let (frames, status) = playback.run_to_end();
        for (turn, grid) in frames.iter().enumerate() {
            writeln!(out, "episode {} turn {}", n + 1, turn)?;
            write!(out, "{}", grid)?;
        }

        let outcome = match status {
            EpisodeStatus::Caught => "seeker found the hider",
            _ => "hider stayed hidden",
        };
        writeln!(out, "episode {}: {} after {} turns", n + 1, outcome, frames.len() - 1)?;
    }
    Ok(())
}

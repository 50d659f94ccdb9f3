//! Visualization mode for watching trained agents
//!
//! This module implements a TUI that plays greedy episodes with the trained
//! seeker and hider tables and draws every turn. After a catch, or once the
//! step budget runs out, the final layout stays on screen for one tick and
//! then a fresh layout is generated.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: New layout
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit
//!
//! # Example
//!
//! ```rust,ignore
//! use hide_seek::modes::{PlaybackConfig, VisualizeMode};
//! use hide_seek::rl::load_policies;
//! use std::path::Path;
//!
//! let (policies, metadata) = load_policies(Path::new("models/policies.json"))?;
//! let mut visualize_mode =
//!     VisualizeMode::new(policies, metadata.game_config, PlaybackConfig::default(), None)?;
//! visualize_mode.run().await?;
//! ```

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{Stderr, stderr},
    time::Duration,
};
use tokio::time::{Interval, interval};
use tracing::info;

use super::playback::{Playback, PlaybackConfig, PlaybackSpeed};
use crate::game::GameConfig;
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{PlaybackView, Renderer};
use crate::rl::{EpisodeStatus, Policies};

/// Visualization mode for watching trained agents
pub struct VisualizeMode {
    /// Greedy episode driver holding the trained tables
    playback: Playback,

    /// Renderer for TUI display
    renderer: Renderer,

    /// Playback counters
    metrics: GameMetrics,

    /// Maps key presses to playback controls
    input_handler: InputHandler,

    /// Delay between turns at normal speed, `None` when unpaced
    frame_interval: Option<Duration>,

    /// Whether to quit the visualization
    should_quit: bool,

    /// Whether playback is paused
    paused: bool,

    /// Current playback speed
    speed: PlaybackSpeed,

    /// Set once the current episode's outcome has been recorded
    episode_recorded: bool,
}

impl VisualizeMode {
    /// Create a new visualization mode on a fresh layout
    pub fn new(
        policies: Policies,
        game_config: GameConfig,
        playback_config: PlaybackConfig,
        seed: Option<u64>,
    ) -> Result<Self> {
        info!(
            seeker_entries = policies.seeker.len(),
            hider_entries = policies.hider.len(),
            grid = game_config.grid_size,
            "starting visualization"
        );

        let playback = Playback::new(policies, game_config, seed)?;

        Ok(Self {
            playback,
            renderer: Renderer::new(playback_config.cell_width),
            metrics: GameMetrics::new(),
            input_handler: InputHandler::new(),
            frame_interval: playback_config.frame_interval(),
            should_quit: false,
            paused: false,
            speed: PlaybackSpeed::Normal,
            episode_recorded: false,
        })
    }

    /// Run the visualization loop
    ///
    /// Sets up the terminal, runs the main visualization loop, and cleans up
    /// on exit.
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run visualization loop
        let result = self.run_visualization_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        info!(
            episodes = self.metrics.episodes_played,
            catches = self.metrics.catches,
            "visualization finished"
        );

        result
    }

    /// Main visualization loop
    async fn run_visualization_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Turns tick at the configured speed
        let mut tick_timer = interval(self.speed.tick_interval(self.frame_interval));

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle keyboard input
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.tick()?;
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        let view = PlaybackView {
                            episode: self.playback.episode(),
                            metrics: &self.metrics,
                            paused: self.paused,
                            speed: self.speed,
                        };
                        self.renderer.render(frame, &view);
                    }).context("Failed to draw frame")?;
                }

                // Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Advance playback by one turn, or start a new layout after an ending
    fn tick(&mut self) -> Result<()> {
        if self.episode_recorded {
            self.new_layout()?;
            return Ok(());
        }

        self.playback.advance();
        if self.playback.check_finished() {
            let episode = self.playback.episode();
            self.metrics
                .on_episode_end(episode.status() == EpisodeStatus::Caught, episode.steps());
            self.episode_recorded = true;
        }

        Ok(())
    }

    fn new_layout(&mut self) -> Result<()> {
        self.playback.reset()?;
        self.metrics.on_episode_start();
        self.episode_recorded = false;
        Ok(())
    }

    /// Handle keyboard events
    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::TogglePause => {
                    self.paused = !self.paused;
                }
                KeyAction::Restart => {
                    self.new_layout()?;
                }
                KeyAction::SetSpeed(speed) => {
                    self.change_speed(speed, tick_timer);
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    /// Change the visualization speed
    fn change_speed(&mut self, new_speed: PlaybackSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        *tick_timer = interval(self.speed.tick_interval(self.frame_interval));
    }

    /// Cleanup terminal state
    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::playback::UNPACED_TICK;

    fn mode(max_steps: usize) -> VisualizeMode {
        let mut config = GameConfig::default();
        config.max_steps = max_steps;
        VisualizeMode::new(Policies::new(), config, PlaybackConfig::default(), Some(8)).unwrap()
    }

    #[test]
    fn test_visualize_mode_creation() {
        let mode = mode(100);
        assert_eq!(mode.metrics.episodes_played, 0);
        assert!(!mode.paused);
        assert_eq!(mode.speed, PlaybackSpeed::Normal);
        assert_eq!(mode.frame_interval, Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_zero_fps_runs_unpaced() {
        let playback_config = PlaybackConfig {
            fps: 0,
            ..Default::default()
        };
        let mode =
            VisualizeMode::new(Policies::new(), GameConfig::default(), playback_config, None)
                .unwrap();
        assert_eq!(mode.frame_interval, None);
        assert_eq!(mode.speed.tick_interval(mode.frame_interval), UNPACED_TICK);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = VisualizeMode::new(
            Policies::new(),
            GameConfig::new(2, 3),
            PlaybackConfig::default(),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ticks_record_episode_then_restart() {
        let mut mode = mode(3);

        // the budget ends the episode within 3 ticks
        let mut ticks = 0;
        while !mode.episode_recorded {
            mode.tick().unwrap();
            ticks += 1;
            assert!(ticks <= 3);
        }
        assert_eq!(mode.metrics.episodes_played, 1);

        mode.tick().unwrap();
        assert!(!mode.episode_recorded);
        assert_eq!(mode.playback.episode().steps(), 0);
    }
}

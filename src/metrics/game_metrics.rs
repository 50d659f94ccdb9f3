use std::time::{Duration, Instant};

/// Counters shown while watching trained agents play
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub episodes_played: u32,
    pub catches: u32,
    pub fastest_catch: Option<usize>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            episodes_played: 0,
            catches: 0,
            fastest_catch: None,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_episode_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    /// Record a finished episode that lasted `steps` turns
    pub fn on_episode_end(&mut self, caught: bool, steps: usize) {
        self.episodes_played += 1;
        if caught {
            self.catches += 1;
            if self.fastest_catch.map_or(true, |best| steps < best) {
                self.fastest_catch = Some(steps);
            }
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

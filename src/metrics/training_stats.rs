//! Training statistics tracking for Q-learning
//!
//! This module provides utilities for tracking training progress: episode
//! lengths, how often the seeker wins, and each agent's return.

use std::collections::VecDeque;

use crate::rl::EpisodeSummary;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use hide_seek::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(12, true, 89.0, -89.0);
///
/// assert_eq!(stats.catch_rate(), 1.0);
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode lengths in turns (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Whether each episode ended with a catch (rolling window)
    catches: VecDeque<bool>,

    /// Seeker returns (rolling window)
    seeker_returns: VecDeque<f64>,

    /// Hider returns (rolling window)
    hider_returns: VecDeque<f64>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of catches over the whole run
    total_catches: usize,

    /// Total number of turns taken
    total_steps: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping the last `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_lengths: VecDeque::with_capacity(window_size),
            catches: VecDeque::with_capacity(window_size),
            seeker_returns: VecDeque::with_capacity(window_size),
            hider_returns: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_catches: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(
        &mut self,
        length: usize,
        caught: bool,
        seeker_return: f64,
        hider_return: f64,
    ) {
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.catches, caught, self.window_size);
        Self::push_deque(&mut self.seeker_returns, seeker_return, self.window_size);
        Self::push_deque(&mut self.hider_returns, hider_return, self.window_size);
        self.total_episodes += 1;
        self.total_steps += length;
        if caught {
            self.total_catches += 1;
        }
    }

    /// Record a finished episode from its summary
    pub fn record_summary(&mut self, summary: &EpisodeSummary) {
        self.record_episode(
            summary.steps,
            summary.caught(),
            summary.seeker_return,
            summary.hider_return,
        );
    }

    /// Mean episode length over the rolling window
    pub fn mean_episode_length(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<usize>() as f64 / self.episode_lengths.len() as f64
        }
    }

    /// Fraction of windowed episodes the seeker won
    pub fn catch_rate(&self) -> f64 {
        if self.catches.is_empty() {
            0.0
        } else {
            self.catches.iter().filter(|&&c| c).count() as f64 / self.catches.len() as f64
        }
    }

    pub fn mean_seeker_return(&self) -> f64 {
        Self::mean(&self.seeker_returns)
    }

    pub fn mean_hider_return(&self) -> f64 {
        Self::mean(&self.hider_returns)
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_catches(&self) -> usize {
        self.total_catches
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Format a summary of the current statistics
    ///
    /// ```text
    /// Episodes: 1 | Steps: 12 | Caught: 100.0% | Len: 12.0 | Seeker: 89.00 | Hider: -89.00
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Caught: {:.1}% | Len: {:.1} | Seeker: {:.2} | Hider: {:.2}",
            self.total_episodes,
            self.total_steps,
            self.catch_rate() * 100.0,
            self.mean_episode_length(),
            self.mean_seeker_return(),
            self.mean_hider_return(),
        )
    }

    fn mean(deque: &VecDeque<f64>) -> f64 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f64>() / deque.len() as f64
        }
    }

    /// Helper function to push to a deque with size limit
    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::EpisodeStatus;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_steps(), 0);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(50, false, -60.0, 40.0);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert_eq!(stats.total_catches(), 0);
        assert!((stats.mean_episode_length() - 50.0).abs() < 1e-9);
        assert!((stats.mean_seeker_return() + 60.0).abs() < 1e-9);
        assert!((stats.mean_hider_return() - 40.0).abs() < 1e-9);
        assert_eq!(stats.catch_rate(), 0.0);
    }

    #[test]
    fn test_record_summary() {
        let mut stats = TrainingStats::new(10);
        stats.record_summary(&EpisodeSummary {
            status: EpisodeStatus::Caught,
            steps: 4,
            seeker_return: 97.0,
            hider_return: -97.0,
        });

        assert_eq!(stats.total_catches(), 1);
        assert_eq!(stats.catch_rate(), 1.0);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);

        stats.record_episode(10, true, 1.0, -1.0);
        stats.record_episode(20, false, 2.0, -2.0);
        stats.record_episode(30, false, 3.0, -3.0);

        assert!((stats.mean_seeker_return() - 2.0).abs() < 1e-9);

        // A 4th episode evicts the first
        stats.record_episode(40, false, 4.0, -4.0);

        assert_eq!(stats.total_episodes(), 4);
        assert_eq!(stats.total_catches(), 1);
        assert!((stats.mean_seeker_return() - 3.0).abs() < 1e-9);
        assert_eq!(stats.catch_rate(), 0.0);
        assert_eq!(stats.total_steps(), 100);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(12, true, 89.0, -89.0);

        let summary = stats.format_summary();
        assert!(summary.contains("Episodes: 1"));
        assert!(summary.contains("Steps: 12"));
        assert!(summary.contains("Caught: 100.0%"));
        assert!(summary.contains("Len: 12.0"));
        assert!(summary.contains("Seeker: 89.00"));
        assert!(summary.contains("Hider: -89.00"));
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);

        assert_eq!(stats.mean_episode_length(), 0.0);
        assert_eq!(stats.catch_rate(), 0.0);
        assert_eq!(stats.mean_seeker_return(), 0.0);
        assert_eq!(stats.mean_hider_return(), 0.0);
    }
}

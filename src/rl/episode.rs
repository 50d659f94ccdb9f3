//! Turn protocol for one hide-and-seek episode
//!
//! Each turn the seeker acts first, then the hider, each picking an action
//! from its own table for the state it observes at that moment. After both
//! moves the seeker checks for line of sight, rewards are assigned and each
//! agent receives one transition to learn from.

use rand::Rng;
use tracing::debug;

use super::config::QLearningConfig;
use super::observation::{StateKey, observe};
use super::q_table::Policies;
use crate::game::{Action, GameConfig, GameState, Role};

/// Seeker reward when the hider is spotted
pub const CATCH_REWARD: f64 = 100.0;
/// Hider reward when it is spotted
pub const CAUGHT_PENALTY: f64 = -100.0;
/// Seeker reward for a successful move that did not end the episode
pub const SEEKER_MOVE_REWARD: f64 = -1.0;
/// Hider reward for a successful move that kept it hidden
pub const HIDER_MOVE_REWARD: f64 = 1.0;
/// Either agent's reward for a rejected move (wall, edge, opponent, or staying put)
pub const BLOCKED_PENALTY: f64 = -5.0;

/// Where an episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeStatus {
    Running,
    /// The seeker saw the hider
    Caught,
    /// The step budget ran out first
    Truncated,
}

/// What one agent did during a turn and what it earned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: StateKey,
    pub action: Action,
    pub moved: bool,
    pub reward: f64,
    pub next_state: StateKey,
}

/// Both agents' transitions for a single turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnResult {
    pub seeker: Transition,
    pub hider: Transition,
    pub caught: bool,
}

impl TurnResult {
    pub fn transition(&self, role: Role) -> &Transition {
        match role {
            Role::Seeker => &self.seeker,
            Role::Hider => &self.hider,
        }
    }
}

/// Totals for a finished episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub status: EpisodeStatus,
    pub steps: usize,
    pub seeker_return: f64,
    pub hider_return: f64,
}

impl EpisodeSummary {
    pub fn caught(&self) -> bool {
        self.status == EpisodeStatus::Caught
    }
}

/// One bounded-length interaction between the seeker and the hider
pub struct Episode {
    state: GameState,
    state_bound: i32,
    max_steps: usize,
    steps: usize,
    status: EpisodeStatus,
}

impl Episode {
    /// Start an episode on an already generated layout
    pub fn new(state: GameState, config: &GameConfig) -> Self {
        Self {
            state,
            state_bound: config.state_bound,
            max_steps: config.max_steps,
            steps: 0,
            status: EpisodeStatus::Running,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn status(&self) -> EpisodeStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status != EpisodeStatus::Running
    }

    /// State key for `role` looking at its opponent right now
    pub fn observe(&self, role: Role) -> StateKey {
        let (me, other) = match role {
            Role::Seeker => (&self.state.seeker, &self.state.hider),
            Role::Hider => (&self.state.hider, &self.state.seeker),
        };
        observe(me, other, self.state_bound)
    }

    /// End the episode as caught if the hider is already in sight
    ///
    /// Training never calls this; playback does before every turn.
    pub fn check_spotted(&mut self) -> bool {
        if self.status == EpisodeStatus::Running && self.state.hider_spotted() {
            self.status = EpisodeStatus::Caught;
        }
        self.status == EpisodeStatus::Caught
    }

    fn act<R: Rng + ?Sized>(
        &mut self,
        role: Role,
        policies: &Policies,
        epsilon: f64,
        rng: &mut R,
    ) -> (StateKey, Action, bool) {
        let state = self.observe(role);
        let action = policies.table(role).choose_action(state, epsilon, rng);
        let (dx, dy) = action.delta();
        let moved = self.state.move_agent(role, dx, dy);
        (state, action, moved)
    }

    /// Play one turn: seeker, then hider, then the visibility check
    ///
    /// Returns `None` once the episode is over. Tables are only read here;
    /// apply the returned transitions with [`learn`] to train.
    pub fn play_turn<R: Rng + ?Sized>(
        &mut self,
        policies: &Policies,
        epsilon: f64,
        rng: &mut R,
    ) -> Option<TurnResult> {
        if self.is_done() {
            return None;
        }

        let (seeker_state, seeker_action, seeker_moved) =
            self.act(Role::Seeker, policies, epsilon, rng);
        let (hider_state, hider_action, hider_moved) =
            self.act(Role::Hider, policies, epsilon, rng);

        let caught = self.state.hider_spotted();
        let (seeker_reward, hider_reward) = if caught {
            (CATCH_REWARD, CAUGHT_PENALTY)
        } else {
            (
                if seeker_moved { SEEKER_MOVE_REWARD } else { BLOCKED_PENALTY },
                if hider_moved { HIDER_MOVE_REWARD } else { BLOCKED_PENALTY },
            )
        };

        self.steps += 1;
        if caught {
            self.status = EpisodeStatus::Caught;
        } else if self.steps >= self.max_steps {
            self.status = EpisodeStatus::Truncated;
        }

        Some(TurnResult {
            seeker: Transition {
                state: seeker_state,
                action: seeker_action,
                moved: seeker_moved,
                reward: seeker_reward,
                next_state: self.observe(Role::Seeker),
            },
            hider: Transition {
                state: hider_state,
                action: hider_action,
                moved: hider_moved,
                reward: hider_reward,
                next_state: self.observe(Role::Hider),
            },
            caught,
        })
    }

    /// Play the episode to the end, updating both tables after every turn
    pub fn run_training<R: Rng + ?Sized>(
        &mut self,
        policies: &mut Policies,
        config: &QLearningConfig,
        rng: &mut R,
    ) -> EpisodeSummary {
        let mut seeker_return = 0.0;
        let mut hider_return = 0.0;

        while let Some(turn) = self.play_turn(policies, config.epsilon, rng) {
            learn(policies, &turn, config);
            seeker_return += turn.seeker.reward;
            hider_return += turn.hider.reward;
        }

        debug!(
            status = ?self.status,
            steps = self.steps,
            seeker_return,
            hider_return,
            "episode finished"
        );

        EpisodeSummary {
            status: self.status,
            steps: self.steps,
            seeker_return,
            hider_return,
        }
    }
}

/// Apply one Bellman update per agent for a finished turn
pub fn learn(policies: &mut Policies, turn: &TurnResult, config: &QLearningConfig) {
    for role in [Role::Seeker, Role::Hider] {
        let t = turn.transition(role);
        policies.table_mut(role).update(
            t.state,
            t.action,
            t.reward,
            t.next_state,
            config.alpha,
            config.gamma,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, GameEngine, Position};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layout(walls: &[Position], seeker: Position, hider: Position) -> GameState {
        GameState::with_layout(6, walls, seeker, hider).unwrap()
    }

    #[test]
    fn test_catch_rewards() {
        // Seeker at (1,0), hider at (3,1). Greedy seeker picks Up (blocked),
        // greedy hider picks Up and lands on the seeker's row with nothing between.
        let state = layout(&[], Position::new(1, 0), Position::new(3, 1));
        let mut episode = Episode::new(state, &GameConfig::open(6));
        let policies = Policies::new();
        let mut rng = StdRng::seed_from_u64(0);

        let turn = episode.play_turn(&policies, 0.0, &mut rng).unwrap();

        assert_eq!(turn.seeker.action, Action::Up);
        assert!(!turn.seeker.moved);
        assert!(turn.hider.moved);
        assert!(turn.caught);
        assert_eq!(turn.seeker.reward, CATCH_REWARD);
        assert_eq!(turn.hider.reward, CAUGHT_PENALTY);
        assert_eq!(episode.status(), EpisodeStatus::Caught);
        assert!(episode.play_turn(&policies, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_shaping_rewards() {
        let walls = [Position::new(2, 2), Position::new(2, 3), Position::new(3, 2)];
        // Seeker (0,3) moves Up to (0,2); hider (4,4) moves Up to (4,3).
        let state = layout(&walls, Position::new(0, 3), Position::new(4, 4));
        let mut episode = Episode::new(state, &GameConfig::open(6));
        let policies = Policies::new();
        let mut rng = StdRng::seed_from_u64(0);

        let turn = episode.play_turn(&policies, 0.0, &mut rng).unwrap();

        assert!(!turn.caught);
        assert!(turn.seeker.moved && turn.hider.moved);
        assert_eq!(turn.seeker.reward, SEEKER_MOVE_REWARD);
        assert_eq!(turn.hider.reward, HIDER_MOVE_REWARD);
        assert_eq!(turn.seeker.state, StateKey::new(4, 1));
        assert_eq!(turn.seeker.next_state, StateKey::new(4, 1));
        assert_eq!(episode.status(), EpisodeStatus::Running);
    }

    #[test]
    fn test_blocked_moves_are_penalized() {
        // Both greedy agents pick Up against the top edge.
        let walls = [Position::new(2, 0), Position::new(1, 1)];
        let state = layout(&walls, Position::new(0, 0), Position::new(5, 0));
        let mut episode = Episode::new(state, &GameConfig::open(6));
        let policies = Policies::new();
        let mut rng = StdRng::seed_from_u64(0);

        let turn = episode.play_turn(&policies, 0.0, &mut rng).unwrap();

        assert!(!turn.caught);
        assert_eq!(turn.seeker.reward, BLOCKED_PENALTY);
        assert_eq!(turn.hider.reward, BLOCKED_PENALTY);
    }

    #[test]
    fn test_hider_observes_after_seeker_moved() {
        let walls = [Position::new(2, 2), Position::new(3, 3)];
        let state = layout(&walls, Position::new(1, 3), Position::new(4, 5));
        let mut episode = Episode::new(state, &GameConfig::open(6));
        let policies = Policies::new();
        let mut rng = StdRng::seed_from_u64(0);

        let turn = episode.play_turn(&policies, 0.0, &mut rng).unwrap();

        // seeker went up to (1,2) before the hider looked
        assert_eq!(turn.hider.state, StateKey::new(-3, -3));
    }

    #[test]
    fn test_truncation_after_budget() {
        // Walls seal the hider into the bottom-right corner out of sight.
        let walls = [Position::new(4, 5), Position::new(5, 4), Position::new(4, 4)];
        let state = layout(&walls, Position::new(0, 0), Position::new(5, 5));
        let mut config = GameConfig::open(6);
        config.max_steps = 3;
        let mut episode = Episode::new(state, &config);
        let mut policies = Policies::new();
        let mut rng = StdRng::seed_from_u64(0);

        let summary = episode.run_training(&mut policies, &QLearningConfig::default(), &mut rng);

        assert_eq!(summary.status, EpisodeStatus::Truncated);
        assert_eq!(summary.steps, 3);
        assert!(!summary.caught());
        assert!(!policies.hider.is_empty());
    }

    #[test]
    fn test_learn_updates_both_tables() {
        let state = layout(&[], Position::new(1, 0), Position::new(3, 1));
        let mut episode = Episode::new(state, &GameConfig::open(6));
        let mut policies = Policies::new();
        let mut rng = StdRng::seed_from_u64(0);
        let config = QLearningConfig::new(0.5, 0.9, 0.0);

        let turn = episode.play_turn(&policies, 0.0, &mut rng).unwrap();
        learn(&mut policies, &turn, &config);

        assert_eq!(policies.seeker.get(turn.seeker.state, turn.seeker.action), 50.0);
        assert_eq!(policies.hider.get(turn.hider.state, turn.hider.action), -50.0);
    }

    #[test]
    fn test_check_spotted() {
        let state = layout(&[], Position::new(0, 0), Position::new(0, 5));
        let mut episode = Episode::new(state, &GameConfig::open(6));
        assert_eq!(episode.status(), EpisodeStatus::Running);
        assert!(episode.check_spotted());
        assert!(episode.is_done());
    }

    #[test]
    fn test_random_episodes_keep_invariants() {
        let config = GameConfig::default();
        let mut engine = GameEngine::with_seed(config.clone(), 11);
        let mut policies = Policies::new();
        let learning = QLearningConfig::new(0.1, 0.9, 1.0);

        for _ in 0..20 {
            let state = engine.reset().unwrap();
            let mut episode = Episode::new(state, &config);
            while let Some(turn) = episode.play_turn(&policies, learning.epsilon, engine.rng()) {
                learn(&mut policies, &turn, &learning);
                let grid = &episode.state().grid;
                assert_eq!(grid.count(Cell::Seeker), 1);
                assert_eq!(grid.count(Cell::Hider), 1);
                assert_eq!(grid.count(Cell::Wall), config.num_walls);
            }
            assert!(episode.steps() <= config.max_steps);
        }
    }
}

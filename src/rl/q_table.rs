//! Tabular action-value estimates with epsilon-greedy selection
//!
//! Values for (state, action) pairs that were never updated read as zero.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::observation::StateKey;
use crate::game::{Action, Role};

/// One stored (state, action) -> value estimate
///
/// JSON maps need string keys, so tables are serialized as a list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: StateKey,
    pub action: Action,
    pub value: f64,
}

/// Action-value table for a single agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QEntry>", into = "Vec<QEntry>")]
pub struct QTable {
    values: HashMap<(StateKey, Action), f64>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current estimate, zero when unseen
    pub fn get(&self, state: StateKey, action: Action) -> f64 {
        self.values.get(&(state, action)).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, state: StateKey, action: Action, value: f64) {
        self.values.insert((state, action), value);
    }

    /// Number of stored (state, action) pairs
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Highest estimate over every action in `state`
    pub fn max_value(&self, state: StateKey) -> f64 {
        Action::ALL
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action; ties go to the action listed first in [`Action::ALL`]
    pub fn best_action(&self, state: StateKey) -> Action {
        let mut best = Action::ALL[0];
        let mut best_value = self.get(state, best);
        for &action in &Action::ALL[1..] {
            let value = self.get(state, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        best
    }

    /// Epsilon-greedy selection
    ///
    /// With `epsilon == 0.0` no randomness is drawn, so greedy play is fully
    /// determined by the table.
    pub fn choose_action<R: Rng + ?Sized>(
        &self,
        state: StateKey,
        epsilon: f64,
        rng: &mut R,
    ) -> Action {
        if epsilon > 0.0 && rng.gen_range(0.0..1.0) < epsilon {
            Action::ALL[rng.gen_range(0..Action::ALL.len())]
        } else {
            self.best_action(state)
        }
    }

    /// One-step Q-learning update; returns the new estimate
    ///
    /// `Q(s,a) += alpha * (reward + gamma * max_a' Q(s',a') - Q(s,a))`
    pub fn update(
        &mut self,
        state: StateKey,
        action: Action,
        reward: f64,
        next_state: StateKey,
        alpha: f64,
        gamma: f64,
    ) -> f64 {
        let old = self.get(state, action);
        let target = reward + gamma * self.max_value(next_state);
        let new = old + alpha * (target - old);
        self.set(state, action, new);
        new
    }

    /// All stored entries, ordered by state then action
    pub fn entries(&self) -> Vec<QEntry> {
        let mut entries: Vec<QEntry> = self
            .values
            .iter()
            .map(|(&(state, action), &value)| QEntry {
                state,
                action,
                value,
            })
            .collect();
        entries.sort_by_key(|e| (e.state, e.action));
        entries
    }
}

impl From<Vec<QEntry>> for QTable {
    fn from(entries: Vec<QEntry>) -> Self {
        Self {
            values: entries
                .into_iter()
                .map(|e| ((e.state, e.action), e.value))
                .collect(),
        }
    }
}

impl From<QTable> for Vec<QEntry> {
    fn from(table: QTable) -> Self {
        table.entries()
    }
}

/// The two independent tables, one per role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policies {
    pub seeker: QTable,
    pub hider: QTable,
}

impl Policies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, role: Role) -> &QTable {
        match role {
            Role::Seeker => &self.seeker,
            Role::Hider => &self.hider,
        }
    }

    pub fn table_mut(&mut self, role: Role) -> &mut QTable {
        match role {
            Role::Seeker => &mut self.seeker,
            Role::Hider => &mut self.hider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const S: StateKey = StateKey { dx: 1, dy: -2 };
    const NEXT: StateKey = StateKey { dx: 0, dy: 3 };

    #[test]
    fn test_unknown_entries_read_zero() {
        let table = QTable::new();
        assert_eq!(table.get(S, Action::Left), 0.0);
        assert_eq!(table.max_value(S), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_table_breaks_ties_by_order() {
        let table = QTable::new();
        assert_eq!(table.best_action(S), Action::Up);
    }

    #[test]
    fn test_first_maximum_wins() {
        let mut table = QTable::new();
        table.set(S, Action::Up, -1.0);
        table.set(S, Action::Left, 2.0);
        table.set(S, Action::Stay, 2.0);
        assert_eq!(table.best_action(S), Action::Left);

        table.set(S, Action::Stay, 2.5);
        assert_eq!(table.best_action(S), Action::Stay);
    }

    #[test]
    fn test_negative_values_lose_to_unseen_zero() {
        let mut table = QTable::new();
        table.set(S, Action::Up, -3.0);
        table.set(S, Action::Down, -1.0);
        // Left is unseen and reads 0
        assert_eq!(table.best_action(S), Action::Left);
    }

    #[test]
    fn test_greedy_is_repeatable() {
        let mut table = QTable::new();
        table.set(S, Action::Right, 0.5);
        table.set(S, Action::Down, 0.5);
        let mut rng = StdRng::seed_from_u64(9);

        let first = table.choose_action(S, 0.0, &mut rng);
        for _ in 0..50 {
            assert_eq!(table.choose_action(S, 0.0, &mut rng), first);
        }
        assert_eq!(first, Action::Down);
    }

    #[test]
    fn test_full_exploration_covers_all_actions() {
        let table = QTable::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen = [false; 5];
        for _ in 0..500 {
            seen[table.choose_action(S, 1.0, &mut rng).index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_update_rule() {
        let mut table = QTable::new();
        table.set(S, Action::Up, 2.0);
        table.set(NEXT, Action::Right, 10.0);
        table.set(NEXT, Action::Down, -4.0);

        // 2 + 0.5 * (1 + 0.9 * 10 - 2) = 6
        let new = table.update(S, Action::Up, 1.0, NEXT, 0.5, 0.9);
        assert!((new - 6.0).abs() < 1e-12);
        assert!((table.get(S, Action::Up) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_from_empty_table() {
        let mut table = QTable::new();
        let new = table.update(S, Action::Stay, 100.0, NEXT, 0.1, 0.9);
        assert!((new - 10.0).abs() < 1e-12);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let mut table = QTable::new();
        table.set(S, Action::Up, 1.5);
        table.set(NEXT, Action::Stay, -0.25);

        let json = serde_json::to_string(&table).unwrap();
        let back: QTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_policies_are_independent() {
        let mut policies = Policies::new();
        policies.table_mut(Role::Seeker).set(S, Action::Up, 1.0);

        assert_eq!(policies.table(Role::Seeker).len(), 1);
        assert!(policies.table(Role::Hider).is_empty());
    }

    proptest! {
        #[test]
        fn prop_update_contracts_toward_target(
            old in -200.0f64..200.0,
            next_best in -200.0f64..200.0,
            reward in -100.0f64..100.0,
            alpha in 0.0f64..=1.0,
            gamma in 0.0f64..=1.0,
        ) {
            let mut table = QTable::new();
            table.set(S, Action::Left, old);
            for action in Action::ALL {
                table.set(NEXT, action, next_best - 1.0);
            }
            table.set(NEXT, Action::Down, next_best);

            let target = reward + gamma * next_best;
            let new = table.update(S, Action::Left, reward, NEXT, alpha, gamma);

            let expected = (1.0 - alpha) * (old - target).abs();
            prop_assert!(((new - target).abs() - expected).abs() < 1e-9);
        }
    }
}

//! Relative-position state abstraction
//!
//! An agent only observes where its opponent is relative to itself, with each
//! axis clamped to `[-bound, bound]`. Displacements beyond the bound alias to
//! the same key.

use serde::{Deserialize, Serialize};

use crate::game::Entity;

/// Clamped displacement of the opponent from the observing agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub dx: i32,
    pub dy: i32,
}

impl StateKey {
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// State key for `observer` looking at `other`
pub fn observe(observer: &Entity, other: &Entity, bound: i32) -> StateKey {
    let from = observer.position();
    let to = other.position();
    StateKey {
        dx: (to.x - from.x).clamp(-bound, bound),
        dy: (to.y - from.y).clamp(-bound, bound),
    }
}

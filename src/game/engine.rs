use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::{
    config::GameConfig,
    state::{Cell, Entity, GameState, Grid, Role},
};

/// Random placement could not be satisfied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("cannot place {requested} cell(s) of {marker:?}: only {free} free")]
    NotEnoughRoom {
        marker: Cell,
        requested: usize,
        free: usize,
    },
}

/// Create an empty grid
pub fn create_grid(size: usize) -> Grid {
    Grid::new(size)
}

/// Mark `count` distinct, uniformly chosen free cells with `marker`
///
/// Fails without touching the grid if fewer than `count` cells are free.
pub fn place_static_objects<R: Rng + ?Sized>(
    grid: &mut Grid,
    marker: Cell,
    count: usize,
    rng: &mut R,
) -> Result<(), PlacementError> {
    let free = grid.free_cells();
    if count > free.len() {
        return Err(PlacementError::NotEnoughRoom {
            marker,
            requested: count,
            free: free.len(),
        });
    }

    for &pos in free.choose_multiple(rng, count) {
        grid.set(pos, marker);
    }
    Ok(())
}

/// Put an agent of `role` on a uniformly chosen free cell
pub fn place_entity<R: Rng + ?Sized>(
    grid: &mut Grid,
    role: Role,
    rng: &mut R,
) -> Result<Entity, PlacementError> {
    let not_enough_room = PlacementError::NotEnoughRoom {
        marker: role.marker(),
        requested: 1,
        free: 0,
    };

    let pos = *grid.free_cells().choose(rng).ok_or(not_enough_room.clone())?;
    Entity::spawn(role, pos, grid).ok_or(not_enough_room)
}

/// Generates fresh episode layouts from a configuration and a seeded RNG
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create an engine seeded from system entropy
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine whose layouts and exploration are reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Build from an optional seed, falling back to entropy
    pub fn seeded(config: GameConfig, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(config, seed),
            None => Self::new(config),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The random source shared by layout generation and action selection
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Generate a fresh layout: walls first, then the seeker, then the hider
    pub fn reset(&mut self) -> Result<GameState, PlacementError> {
        let mut grid = create_grid(self.config.grid_size);
        place_static_objects(&mut grid, Cell::Wall, self.config.num_walls, &mut self.rng)?;
        let seeker = place_entity(&mut grid, Role::Seeker, &mut self.rng)?;
        let hider = place_entity(&mut grid, Role::Hider, &mut self.rng)?;
        Ok(GameState::new(grid, seeker, hider))
    }
}

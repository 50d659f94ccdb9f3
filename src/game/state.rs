use std::fmt;

use super::visibility::in_line_of_sight;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Contents of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Wall,
    Seeker,
    Hider,
}

impl Cell {
    /// One-character marker used for text snapshots
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Wall => '#',
            Cell::Seeker => 'S',
            Cell::Hider => 'H',
        }
    }
}

/// Which side of the game an agent plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Seeker,
    Hider,
}

impl Role {
    /// Grid marker written where an agent of this role stands
    pub fn marker(&self) -> Cell {
        match self {
            Role::Seeker => Cell::Seeker,
            Role::Hider => Cell::Hider,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seeker => "seeker",
            Role::Hider => "hider",
        }
    }
}

/// Square occupancy grid, the single source of truth for who stands where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty `size` x `size` grid
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::Empty; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let within = |v: i32| usize::try_from(v).is_ok_and(|v| v < self.size);
        within(pos.x) && within(pos.y)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.is_in_bounds(pos)
            .then(|| pos.y as usize * self.size + pos.x as usize)
    }

    /// Cell contents, or `None` outside the grid
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrite a cell; returns false when `pos` is out of bounds
    pub fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// True for in-bounds cells holding nothing
    pub fn is_free(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    /// All empty cells in row-major order
    pub fn free_cells(&self) -> Vec<Position> {
        self.positions().filter(|&pos| self.is_free(pos)).collect()
    }

    /// Number of cells holding `cell`
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Rows from top (y = 0) to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size).flat_map(move |y| {
            (0..self.size).map(move |x| Position::new(x as i32, y as i32))
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(Cell::symbol).collect();
            writeln!(f, "|{}|", line)?;
        }
        Ok(())
    }
}

/// A mobile agent standing on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    role: Role,
    pos: Position,
}

impl Entity {
    /// Put a new entity on `pos` if that cell is free
    pub fn spawn(role: Role, pos: Position, grid: &mut Grid) -> Option<Self> {
        if !grid.is_free(pos) {
            return None;
        }
        grid.set(pos, role.marker());
        Some(Self { role, pos })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Step by (dx, dy) if the destination is in bounds and empty
    ///
    /// On success the old cell is cleared and the new one marked. A rejected
    /// move leaves both the grid and the entity untouched. A zero delta always
    /// fails because the entity's own cell is not empty.
    pub fn try_move(&mut self, dx: i32, dy: i32, grid: &mut Grid) -> bool {
        let target = self.pos.moved_by(dx, dy);
        if !grid.is_free(target) {
            return false;
        }

        grid.set(self.pos, Cell::Empty);
        grid.set(target, self.role.marker());
        self.pos = target;
        true
    }
}

/// One episode's layout: the grid plus the two agents standing on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub grid: Grid,
    pub seeker: Entity,
    pub hider: Entity,
}

impl GameState {
    pub fn new(grid: Grid, seeker: Entity, hider: Entity) -> Self {
        Self {
            grid,
            seeker,
            hider,
        }
    }

    /// Build a layout with agents and walls at fixed positions
    ///
    /// Returns `None` if any two of the given positions collide or fall
    /// outside the grid.
    pub fn with_layout(
        size: usize,
        walls: &[Position],
        seeker: Position,
        hider: Position,
    ) -> Option<Self> {
        let mut grid = Grid::new(size);
        for &wall in walls {
            if !grid.is_free(wall) {
                return None;
            }
            grid.set(wall, Cell::Wall);
        }
        let seeker = Entity::spawn(Role::Seeker, seeker, &mut grid)?;
        let hider = Entity::spawn(Role::Hider, hider, &mut grid)?;
        Some(Self::new(grid, seeker, hider))
    }

    /// The agent playing `role`
    pub fn agent(&self, role: Role) -> &Entity {
        match role {
            Role::Seeker => &self.seeker,
            Role::Hider => &self.hider,
        }
    }

    /// Move the agent playing `role`; the grid is updated alongside it
    pub fn move_agent(&mut self, role: Role, dx: i32, dy: i32) -> bool {
        let agent = match role {
            Role::Seeker => &mut self.seeker,
            Role::Hider => &mut self.hider,
        };
        agent.try_move(dx, dy, &mut self.grid)
    }

    /// Whether the seeker currently has the hider in sight
    pub fn hider_spotted(&self) -> bool {
        in_line_of_sight(self.seeker.position(), self.hider.position(), &self.grid)
    }
}

use crate::constants::ARENA_SIZE;
use crate::geometry::{arena_cells, Location};
use crate::units::GameUnit;

/// Per-cell unit storage for the 28x28 board.
#[derive(Clone, Debug, Default)]
pub struct GameMap {
    cells: Vec<Vec<GameUnit>>,
}

impl GameMap {
    pub fn new() -> Self {
        Self {
            cells: vec![Vec::new(); (ARENA_SIZE * ARENA_SIZE) as usize],
        }
    }

    fn slot(location: Location) -> Option<usize> {
        location
            .in_arena()
            .then(|| (location.x * ARENA_SIZE + location.y) as usize)
    }

    /// Units stacked on a cell. Out-of-arena cells are always empty.
    pub fn units_at(&self, location: Location) -> &[GameUnit] {
        match Self::slot(location) {
            Some(slot) => &self.cells[slot],
            None => &[],
        }
    }

    pub fn structure_at(&self, location: Location) -> Option<&GameUnit> {
        self.units_at(location).iter().find(|unit| unit.is_structure())
    }

    pub fn structure_at_mut(&mut self, location: Location) -> Option<&mut GameUnit> {
        let slot = Self::slot(location)?;
        self.cells[slot].iter_mut().find(|unit| unit.is_structure())
    }

    pub fn contains_structure(&self, location: Location) -> bool {
        self.structure_at(location).is_some()
    }

    /// Structures take the whole cell; mobile units stack.
    /// Returns false when the unit's location is outside the arena.
    pub fn place(&mut self, unit: GameUnit) -> bool {
        let Some(slot) = Self::slot(unit.location) else {
            return false;
        };
        let cell = &mut self.cells[slot];
        if unit.is_structure() {
            cell.clear();
        }
        cell.push(unit);
        true
    }

    pub fn units(&self) -> impl Iterator<Item = &GameUnit> {
        arena_cells().flat_map(move |cell| self.units_at(cell).iter())
    }
}

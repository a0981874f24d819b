//! The strategy's view of the game: read-only queries plus attempt orders.

use terminal_core::constants::PLAYER_ENEMY;
use terminal_core::geometry::arena_cells;
use terminal_core::{AttemptReport, GameState, GameUnit, Location, UnitCatalog, UnitKind};

pub trait BoardView {
    fn turn_number(&self) -> u32;

    fn catalog(&self) -> &UnitCatalog;

    fn units_at(&self, location: Location) -> &[GameUnit];

    /// How many units not owned by `player` can hit `location`.
    fn attacker_count(&self, location: Location, player: u8) -> usize;

    /// Path a mobile unit starting at `start` walks toward the opposite edge.
    fn path_to_edge(&self, start: Location) -> Option<Vec<Location>>;

    /// Opponent structures standing on any of `rows`.
    fn hostile_structures_in_rows(&self, rows: &[i32]) -> usize {
        arena_cells()
            .filter(|cell| rows.contains(&cell.y))
            .flat_map(|cell| self.units_at(cell))
            .filter(|unit| unit.owner == PLAYER_ENEMY && unit.is_structure())
            .count()
    }
}

pub trait Orders {
    fn spawn(&mut self, kind: UnitKind, locations: &[Location], count: u32) -> AttemptReport;

    fn remove(&mut self, locations: &[Location]) -> AttemptReport;

    fn upgrade(&mut self, locations: &[Location]) -> AttemptReport;
}

impl BoardView for GameState {
    fn turn_number(&self) -> u32 {
        self.turn_number
    }

    fn catalog(&self) -> &UnitCatalog {
        GameState::catalog(self)
    }

    fn units_at(&self, location: Location) -> &[GameUnit] {
        GameState::units_at(self, location)
    }

    fn attacker_count(&self, location: Location, player: u8) -> usize {
        self.get_attackers(location, player).len()
    }

    fn path_to_edge(&self, start: Location) -> Option<Vec<Location>> {
        self.find_path_to_edge(start, None)
    }
}

impl Orders for GameState {
    fn spawn(&mut self, kind: UnitKind, locations: &[Location], count: u32) -> AttemptReport {
        self.attempt_spawn(kind, locations, count)
    }

    fn remove(&mut self, locations: &[Location]) -> AttemptReport {
        self.attempt_remove(locations)
    }

    fn upgrade(&mut self, locations: &[Location]) -> AttemptReport {
        self.attempt_upgrade(locations)
    }
}

use terminal_core::constants::PLAYER_SELF;
use terminal_core::{Location, UnitKind};

use super::{StrategyLayout, Tally};
use crate::board::{BoardView, Orders};

/// Threshold below which an essential wall is pulled for a rebuild.
pub fn essential_threshold(layout: &StrategyLayout, turn: u32) -> f64 {
    if turn < layout.repair_late_from_turn {
        layout.repair_threshold_early
    } else {
        layout.repair_threshold_late
    }
}

fn damaged_own_wall<B: BoardView>(board: &B, location: Location, threshold: f64) -> bool {
    board.units_at(location).iter().any(|unit| {
        unit.owner == PLAYER_SELF && unit.kind == UnitKind::Wall && unit.health_fraction() < threshold
    })
}

/// Queue removal of worn flank walls so next turn's build order replaces them.
/// Returns the essential locations that were pulled this turn.
pub(crate) fn repair_pass<B: BoardView + Orders>(
    layout: &StrategyLayout,
    tally: &mut Tally<'_, B>,
) -> Vec<Location> {
    let threshold = essential_threshold(layout, tally.board.turn_number());
    let mut attacked = Vec::new();

    for &location in &layout.essential_walls {
        if damaged_own_wall(&*tally.board, location, threshold) {
            tally.remove(&[location]);
            attacked.push(location);
        }
    }
    for &location in &layout.secondary_walls {
        if damaged_own_wall(&*tally.board, location, layout.secondary_repair_threshold) {
            tally.remove(&[location]);
        }
    }

    if !attacked.is_empty() {
        tracing::debug!(?attacked, threshold, "essential walls worn down");
    }
    attacked
}

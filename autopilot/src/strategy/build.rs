//! Structure placement passes. Every pass re-requests its whole list each
//! turn; anything already standing is rejected and costs nothing.

use terminal_core::{Location, UnitKind};

use super::{CornerPair, Stage, StrategyLayout, Tally};
use crate::board::{BoardView, Orders};

const MIDLINE_X: i32 = 14;

fn corner_pair<B: BoardView + Orders>(pair: CornerPair, tally: &mut Tally<'_, B>) {
    tally.spawn(UnitKind::Wall, &[pair.wall]);
    tally.spawn(UnitKind::Turret, &[pair.turret]);
}

/// Plug the flank of every breach in the history. The history is walked in
/// full each turn, duplicates included.
pub(crate) fn scored_location_defense<B: BoardView + Orders>(
    layout: &StrategyLayout,
    scored_on: &[Location],
    tally: &mut Tally<'_, B>,
) {
    for location in scored_on {
        if location.x >= MIDLINE_X {
            corner_pair(layout.right_corner, tally);
        } else {
            corner_pair(layout.left_corner, tally);
        }
    }
}

/// The fixed base build order.
pub(crate) fn staged_base<B: BoardView + Orders>(layout: &StrategyLayout, tally: &mut Tally<'_, B>) {
    let turrets = &layout.base_turrets;
    let walls = &layout.base_walls;
    let supports = &layout.base_supports;

    tally.spawn(UnitKind::Wall, head(walls, 9));
    for x in 3..=10 {
        tally.spawn(UnitKind::Wall, &[Location::new(x, 10)]);
        tally.spawn(UnitKind::Wall, &[Location::new(27 - x, 10)]);
    }
    tally.spawn(UnitKind::Wall, &[Location::new(11, 10)]);
    tally.spawn(UnitKind::Turret, head(turrets, 2));
    tally.upgrade(span(turrets, 0, 1));

    tally.spawn(UnitKind::Wall, span(walls, 9, 10));
    tally.upgrade(head(walls, 2));

    tally.spawn(UnitKind::Wall, span(walls, 10, 14));

    tally.spawn(UnitKind::Support, head(supports, 1));
    tally.upgrade(head(supports, 1));

    tally.upgrade(span(turrets, 1, 2));
    tally.upgrade(span(walls, 2, 4));

    tally.spawn(UnitKind::Wall, tail(walls, 14));
    tally.spawn(UnitKind::Turret, tail(turrets, 2));
    tally.upgrade(tail(turrets, 2));

    tally.upgrade(&layout.important_walls);
}

/// Rebuild the flank behind an essential wall pulled by the repair pass.
pub(crate) fn breach_follow_up<B: BoardView + Orders>(
    layout: &StrategyLayout,
    attacked: &[Location],
    tally: &mut Tally<'_, B>,
) {
    let [left, right] = match layout.essential_walls.as_slice() {
        [left, right, ..] => [*left, *right],
        _ => return,
    };
    if attacked.contains(&left) {
        corner_pair(layout.left_corner, tally);
    }
    if attacked.contains(&right) {
        corner_pair(layout.right_corner, tally);
    }
}

/// Turret plus upgrade next to any breach hugging a side edge. A right-side
/// breach ends the scan.
pub(crate) fn reactive_defense<B: BoardView + Orders>(
    layout: &StrategyLayout,
    scored_on: &[Location],
    tally: &mut Tally<'_, B>,
) {
    for location in scored_on {
        if location.x < 2 {
            tally.spawn(UnitKind::Turret, &[layout.reactive_left_turret]);
            tally.upgrade(&[layout.reactive_left_turret]);
        }
        if location.x > 25 {
            tally.spawn(UnitKind::Turret, &[layout.reactive_right_turret]);
            tally.upgrade(&[layout.reactive_right_turret]);
            break;
        }
    }
}

/// Upgrade badly damaged walls from `locations`, at most `cap` of them.
pub(crate) fn upgrade_limiter<B: BoardView + Orders>(
    locations: &[Location],
    threshold: f64,
    cap: usize,
    tally: &mut Tally<'_, B>,
) -> usize {
    let mut upgraded = 0;
    for &location in locations {
        if upgraded >= cap {
            break;
        }
        let worn = tally.board.units_at(location).iter().any(|unit| {
            unit.kind == UnitKind::Wall && !unit.upgraded && unit.health_fraction() < threshold
        });
        if worn {
            tally.upgrade(&[location]);
            upgraded += 1;
        }
    }
    upgraded
}

/// The escalating second line of defense, by stage.
pub(crate) fn active_defense<B: BoardView + Orders>(
    layout: &StrategyLayout,
    turn: u32,
    tally: &mut Tally<'_, B>,
) {
    let turrets_1 = &layout.stage_1_turrets;
    let walls_1 = &layout.stage_1_walls;
    let turrets_2 = concat(turrets_1, &layout.stage_2_extra_turrets);
    let walls_2 = concat(walls_1, &layout.stage_2_extra_walls);
    let supports_2 = concat(&layout.base_supports, &layout.stage_2_extra_supports);

    match layout.stage_for_turn(turn) {
        Stage::Opening => {
            tally.spawn(UnitKind::Turret, turrets_1);
            tally.spawn(UnitKind::Wall, walls_1);
            tally.upgrade(turrets_1);
            tally.upgrade(walls_1);
        }
        Stage::Middle => {
            tally.spawn(UnitKind::Turret, turrets_1);
            tally.upgrade(turrets_1);
            tally.spawn(UnitKind::Turret, &turrets_2);
            tally.spawn(UnitKind::Wall, &walls_2);
            tally.spawn(UnitKind::Support, &supports_2);
            tally.upgrade(&turrets_2);
            tally.upgrade(&walls_2);
            tally.upgrade(&supports_2);
            tally.upgrade(&layout.stage_2_upgrades);
        }
        Stage::Late => {
            tally.spawn(UnitKind::Turret, &turrets_2);
            tally.spawn(UnitKind::Wall, &walls_2);
            tally.spawn(UnitKind::Support, &supports_2);
            tally.upgrade(&turrets_2);
            tally.upgrade(&walls_2);
            tally.upgrade(&supports_2);

            tally.spawn(UnitKind::Wall, &layout.stage_3_walls);
            tally.upgrade(&layout.stage_3_upgrades);
            tally.upgrade(&layout.corner_upgrades);
            late_guard_posts(layout, tally);
        }
    }
}

// Guard wall, turret and (for the first few) support per index, each
// upgraded right after placement.
fn late_guard_posts<B: BoardView + Orders>(layout: &StrategyLayout, tally: &mut Tally<'_, B>) {
    for (index, &guard) in layout.guard_walls.iter().enumerate() {
        let turret = layout.stage_3_turrets.get(index).copied();
        let support = layout.stage_3_supports.get(index).copied();

        tally.spawn(UnitKind::Wall, &[guard]);
        if let Some(turret) = turret.filter(|t| Some(*t) != layout.stage_3_skipped_turret) {
            tally.spawn(UnitKind::Turret, &[turret]);
        }
        if let Some(support) = support {
            tally.spawn(UnitKind::Support, &[support]);
        }

        if let Some(turret) = turret {
            tally.upgrade(&[turret]);
        }
        tally.upgrade(&[guard]);
        if let Some(support) = support {
            tally.upgrade(&[support]);
        }
    }
}

fn concat(first: &[Location], second: &[Location]) -> Vec<Location> {
    first.iter().chain(second).copied().collect()
}

fn head(list: &[Location], end: usize) -> &[Location] {
    &list[..end.min(list.len())]
}

fn tail(list: &[Location], start: usize) -> &[Location] {
    &list[start.min(list.len())..]
}

fn span(list: &[Location], start: usize, end: usize) -> &[Location] {
    let end = end.min(list.len());
    &list[start.min(end)..end]
}

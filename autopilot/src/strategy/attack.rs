use serde::Serialize;
use terminal_core::constants::{MP, PLAYER_SELF};
use terminal_core::{Location, UnitKind};

use super::{StrategyLayout, Tally};
use crate::board::{BoardView, Orders};

const LINE_START_X: i32 = 27;
const LINE_END_X: i32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Opening,
    Middle,
    Late,
}

/// What the tail of a turn spends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseSlot {
    /// First turn: build only.
    Hold,
    Attack,
    /// Active defense without opening the exit.
    Fortify,
    /// Active defense, then open the exit lane.
    Defend,
}

pub fn slot_for_turn(layout: &StrategyLayout, turn: u32) -> PhaseSlot {
    if turn == 0 {
        return PhaseSlot::Hold;
    }

    let slot = match layout.stage_for_turn(turn) {
        Stage::Opening => match turn % layout.early_attack_every.max(1) {
            0 => PhaseSlot::Attack,
            1 => PhaseSlot::Fortify,
            _ => PhaseSlot::Defend,
        },
        Stage::Middle => {
            let every = layout.mid_attack_every.max(1);
            let attacks = if turn < layout.mid_attack_shift_turn {
                turn % every == 0
            } else {
                turn % every == 1
            };
            if attacks {
                PhaseSlot::Attack
            } else {
                PhaseSlot::Defend
            }
        }
        Stage::Late => {
            if turn % layout.late_attack_every.max(1) == 1 {
                PhaseSlot::Attack
            } else {
                PhaseSlot::Defend
            }
        }
    };

    if slot == PhaseSlot::Attack && turn == layout.no_attack_turn {
        PhaseSlot::Defend
    } else {
        slot
    }
}

/// Summed turret damage a mobile unit would soak walking from each
/// candidate. `None` for candidates with no path (blocked start).
pub fn path_damage<B: BoardView>(board: &B, candidates: &[Location]) -> Vec<Option<f64>> {
    let per_hit = board.catalog().get(UnitKind::Turret).base.damage_i;
    candidates
        .iter()
        .map(|&start| {
            let path = board.path_to_edge(start)?;
            let hits: usize = path
                .iter()
                .map(|&tile| board.attacker_count(tile, PLAYER_SELF))
                .sum();
            Some(hits as f64 * per_hit)
        })
        .collect()
}

/// First candidate with the strictly smallest path damage.
pub fn least_damage_spawn_location<B: BoardView>(
    board: &B,
    candidates: &[Location],
) -> Option<Location> {
    let mut best: Option<(Location, f64)> = None;
    for (&candidate, damage) in candidates.iter().zip(path_damage(board, candidates)) {
        let Some(damage) = damage else {
            continue;
        };
        if best.map_or(true, |(_, lowest)| damage < lowest) {
            best = Some((candidate, damage));
        }
    }
    best.map(|(location, _)| location)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Push {
    pub scout_origin: Option<Location>,
    pub demolishers: bool,
}

/// Demolishers first when the opponent's front rows are crowded, then as
/// many scouts as MP allows from the safest start.
pub(crate) fn launch<B: BoardView + Orders>(layout: &StrategyLayout, tally: &mut Tally<'_, B>) -> Push {
    let mut push = Push::default();

    let front = tally.board.hostile_structures_in_rows(&layout.front_rows);
    if front > layout.front_structure_threshold {
        demolisher_line(layout, tally);
        push.demolishers = true;
    }

    push.scout_origin = least_damage_spawn_location(&*tally.board, &layout.scout_candidates);
    match push.scout_origin {
        Some(origin) => tally.spawn_many(UnitKind::Scout, &[origin], layout.scout_count),
        None => tracing::debug!("every scout start is blocked; holding scouts"),
    }

    tracing::debug!(front, origin = ?push.scout_origin, demolishers = push.demolishers, "attack");
    push
}

fn demolisher_line<B: BoardView + Orders>(layout: &StrategyLayout, tally: &mut Tally<'_, B>) {
    if let Some(row) = layout.demolisher_line_row {
        let cheapest = tally.board.catalog().cheapest_structure(MP);
        for x in (LINE_END_X..=LINE_START_X).rev() {
            tally.spawn(cheapest, &[Location::new(x, row)]);
        }
    }
    tally.spawn_many(
        UnitKind::Demolisher,
        &[layout.demolisher_location],
        layout.demolisher_count,
    );
}

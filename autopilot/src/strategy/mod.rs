//! Lane-defense strategy: a fixed, turn-indexed build order plus a periodic
//! scout push from the least defended starting tile.

pub mod attack;
pub mod build;
pub mod repair;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use terminal_core::{locations, AttemptReport, Breach, Location, UnitKind};

use crate::board::{BoardView, Orders};
pub use attack::{PhaseSlot, Stage};

/// Every coordinate list, threshold and cadence the strategy uses. `Default`
/// is the tuned layout; a JSON file may override any subset of fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyLayout {
    pub suppress_warnings: bool,

    pub stage_1_end: u32,
    pub stage_2_end: u32,
    pub early_attack_every: u32,
    pub mid_attack_every: u32,
    pub late_attack_every: u32,
    pub mid_attack_shift_turn: u32,
    pub no_attack_turn: u32,

    pub essential_walls: Vec<Location>,
    pub secondary_walls: Vec<Location>,
    pub repair_threshold_early: f64,
    pub repair_threshold_late: f64,
    pub repair_late_from_turn: u32,
    pub secondary_repair_threshold: f64,

    pub base_turrets: Vec<Location>,
    pub base_walls: Vec<Location>,
    pub base_supports: Vec<Location>,
    pub important_walls: Vec<Location>,

    pub left_corner: CornerPair,
    pub right_corner: CornerPair,
    pub corner_upgrades: Vec<Location>,

    pub stage_1_turrets: Vec<Location>,
    pub stage_1_walls: Vec<Location>,
    pub stage_2_extra_turrets: Vec<Location>,
    pub stage_2_extra_walls: Vec<Location>,
    pub stage_2_extra_supports: Vec<Location>,
    pub stage_2_upgrades: Vec<Location>,
    pub stage_3_walls: Vec<Location>,
    pub stage_3_upgrades: Vec<Location>,
    pub stage_3_turrets: Vec<Location>,
    pub stage_3_skipped_turret: Option<Location>,
    pub stage_3_supports: Vec<Location>,
    pub guard_walls: Vec<Location>,
    pub exit_locations: Vec<Location>,

    pub scout_candidates: Vec<Location>,
    pub scout_count: u32,
    pub front_rows: Vec<i32>,
    pub front_structure_threshold: usize,
    pub demolisher_location: Location,
    pub demolisher_count: u32,
    pub demolisher_line_row: Option<i32>,

    pub limiter_threshold: f64,
    pub limiter_cap: usize,

    pub reactive_defense: bool,
    pub reactive_left_turret: Location,
    pub reactive_right_turret: Location,
}

/// A wall shielding a turret on one flank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerPair {
    pub wall: Location,
    pub turret: Location,
}

impl Default for StrategyLayout {
    fn default() -> Self {
        Self {
            suppress_warnings: true,

            stage_1_end: 12,
            stage_2_end: 36,
            early_attack_every: 3,
            mid_attack_every: 4,
            late_attack_every: 6,
            mid_attack_shift_turn: 24,
            no_attack_turn: 11,

            essential_walls: locations(&[[0, 13], [27, 13]]),
            secondary_walls: locations(&[[1, 12], [26, 12]]),
            repair_threshold_early: 0.55,
            repair_threshold_late: 1.0,
            repair_late_from_turn: 20,
            secondary_repair_threshold: 0.35,

            base_turrets: locations(&[[12, 10], [16, 10], [16, 9], [12, 9]]),
            base_walls: locations(&[
                [0, 13],
                [27, 13],
                [1, 12],
                [26, 12],
                [2, 11],
                [25, 11],
                [12, 11],
                [16, 11],
                [13, 12],
                [15, 12],
                [2, 12],
                [25, 12],
                [13, 10],
                [15, 10],
                [13, 9],
                [15, 9],
            ]),
            base_supports: locations(&[[11, 9], [17, 9], [10, 9], [18, 9]]),
            important_walls: locations(&[
                [2, 12],
                [25, 12],
                [12, 11],
                [16, 11],
                [13, 10],
                [15, 10],
                [13, 9],
                [16, 9],
            ]),

            left_corner: CornerPair {
                wall: Location::new(3, 12),
                turret: Location::new(3, 11),
            },
            right_corner: CornerPair {
                wall: Location::new(24, 12),
                turret: Location::new(24, 11),
            },
            corner_upgrades: locations(&[[3, 11], [24, 11], [3, 12], [24, 12]]),

            stage_1_turrets: locations(&[[11, 8], [16, 8]]),
            stage_1_walls: locations(&[[12, 8], [15, 8]]),
            stage_2_extra_turrets: locations(&[[11, 7], [15, 7]]),
            stage_2_extra_walls: locations(&[[12, 7], [14, 7]]),
            stage_2_extra_supports: locations(&[[9, 9], [19, 9]]),
            stage_2_upgrades: locations(&[[2, 11], [25, 11]]),
            stage_3_walls: Vec::new(),
            stage_3_upgrades: locations(&[[13, 12], [15, 12]]),
            stage_3_turrets: locations(&[
                [11, 6],
                [16, 6],
                [12, 5],
                [16, 5],
                [11, 4],
                [16, 4],
                [11, 3],
                [15, 3],
            ]),
            stage_3_skipped_turret: Some(Location::new(11, 3)),
            stage_3_supports: locations(&[[11, 8], [17, 9], [10, 8], [18, 8], [8, 8], [19, 8]]),
            guard_walls: locations(&[
                [12, 6],
                [15, 6],
                [13, 5],
                [15, 5],
                [12, 4],
                [15, 4],
                [12, 3],
                [14, 3],
            ]),
            exit_locations: locations(&[[14, 11]]),

            scout_candidates: locations(&[[13, 0], [14, 0], [8, 5], [19, 5]]),
            scout_count: 1000,
            front_rows: vec![17, 18],
            front_structure_threshold: 30,
            demolisher_location: Location::new(24, 10),
            demolisher_count: 2,
            demolisher_line_row: None,

            limiter_threshold: 0.33,
            limiter_cap: 0,

            reactive_defense: false,
            reactive_left_turret: Location::new(1, 12),
            reactive_right_turret: Location::new(26, 12),
        }
    }
}

impl StrategyLayout {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
        let layout: StrategyLayout = serde_json::from_slice(&data)
            .with_context(|| format!("invalid strategy layout {}", path.display()))?;
        Ok(layout)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn stage_for_turn(&self, turn: u32) -> Stage {
        if turn < self.stage_1_end {
            Stage::Opening
        } else if turn < self.stage_2_end {
            Stage::Middle
        } else {
            Stage::Late
        }
    }
}

/// What one turn decided, for logs and replay reports.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TurnPlan {
    pub turn: u32,
    pub slot: Option<PhaseSlot>,
    pub attacked: Vec<Location>,
    pub scout_origin: Option<Location>,
    pub demolishers: bool,
    pub report: AttemptReport,
}

/// Forwards orders to the board and keeps every outcome.
pub(crate) struct Tally<'a, B> {
    pub board: &'a mut B,
    pub report: AttemptReport,
}

impl<'a, B: BoardView + Orders> Tally<'a, B> {
    fn new(board: &'a mut B) -> Self {
        Self {
            board,
            report: AttemptReport::default(),
        }
    }

    pub fn spawn(&mut self, kind: UnitKind, locations: &[Location]) {
        self.spawn_many(kind, locations, 1);
    }

    pub fn spawn_many(&mut self, kind: UnitKind, locations: &[Location], count: u32) {
        if locations.is_empty() {
            return;
        }
        let report = self.board.spawn(kind, locations, count);
        self.report.extend(report);
    }

    pub fn remove(&mut self, locations: &[Location]) {
        if locations.is_empty() {
            return;
        }
        let report = self.board.remove(locations);
        self.report.extend(report);
    }

    pub fn upgrade(&mut self, locations: &[Location]) {
        if locations.is_empty() {
            return;
        }
        let report = self.board.upgrade(locations);
        self.report.extend(report);
    }
}

#[derive(Clone, Debug, Default)]
pub struct LaneStrategy {
    layout: StrategyLayout,
    scored_on: Vec<Location>,
}

impl LaneStrategy {
    pub fn new(layout: StrategyLayout) -> Self {
        Self {
            layout,
            scored_on: Vec::new(),
        }
    }

    pub fn layout(&self) -> &StrategyLayout {
        &self.layout
    }

    /// Every location the opponent has scored on us from, oldest first.
    pub fn scored_on(&self) -> &[Location] {
        &self.scored_on
    }

    /// Append the breaches the opponent scored. Returns how many were added.
    pub fn record_breaches(&mut self, breaches: &[Breach]) -> usize {
        let before = self.scored_on.len();
        for breach in breaches.iter().filter(|breach| breach.scored_on_us()) {
            tracing::debug!(location = %breach.location, "opponent scored");
            self.scored_on.push(breach.location);
        }
        self.scored_on.len() - before
    }

    pub fn on_turn<B: BoardView + Orders>(&self, board: &mut B) -> TurnPlan {
        let layout = &self.layout;
        let turn = board.turn_number();
        let mut tally = Tally::new(board);

        let attacked = repair::repair_pass(layout, &mut tally);
        build::scored_location_defense(layout, &self.scored_on, &mut tally);
        build::staged_base(layout, &mut tally);
        build::breach_follow_up(layout, &attacked, &mut tally);
        tally.upgrade(&layout.corner_upgrades);
        if layout.reactive_defense {
            build::reactive_defense(layout, &self.scored_on, &mut tally);
        }
        build::upgrade_limiter(
            &layout.base_walls,
            layout.limiter_threshold,
            layout.limiter_cap,
            &mut tally,
        );

        let slot = attack::slot_for_turn(layout, turn);
        let mut plan = TurnPlan {
            turn,
            slot: Some(slot),
            attacked,
            ..TurnPlan::default()
        };
        match slot {
            PhaseSlot::Hold => {}
            PhaseSlot::Attack => {
                let push = attack::launch(layout, &mut tally);
                plan.scout_origin = push.scout_origin;
                plan.demolishers = push.demolishers;
            }
            PhaseSlot::Fortify => build::active_defense(layout, turn, &mut tally),
            PhaseSlot::Defend => {
                build::active_defense(layout, turn, &mut tally);
                tally.remove(&layout.exit_locations);
            }
        }
        if slot != PhaseSlot::Hold {
            tally.spawn(UnitKind::Support, &layout.base_supports);
            tally.upgrade(&layout.base_supports);
        }

        plan.report = tally.report;
        tracing::debug!(
            turn,
            slot = ?slot,
            accepted = plan.report.accepted(),
            rejected = plan.report.rejected(),
            "turn planned"
        );
        plan
    }
}

#[cfg(test)]
mod tests;

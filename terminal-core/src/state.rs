use serde_json::Value;
use std::sync::Arc;

use crate::attempt::{AttemptOutcome, AttemptReport};
use crate::config::GameRules;
use crate::constants::{MP, PLAYER_ENEMY, PLAYER_SELF, SP, UNIT_LIST_COUNT};
use crate::error::FrameError;
use crate::frame::{value_as_id, TurnFrame};
use crate::geometry::{is_friendly_edge, Edge, Location};
use crate::map::GameMap;
use crate::navigation::find_path;
use crate::units::{GameUnit, UnitCatalog, UnitKind};

/// A queued build or deploy order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub kind: UnitKind,
    pub location: Location,
}

/// The two lines handed to the engine at the end of a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub build: String,
    pub deploy: String,
}

impl Submission {
    /// A turn with no orders; keeps the engine moving when a frame is unusable.
    pub fn empty() -> Self {
        Self {
            build: "[]".to_string(),
            deploy: "[]".to_string(),
        }
    }
}

/// Our view of the board for one deploy phase, plus the orders queued so far.
///
/// Accepted attempts are applied to the local copy (resources deducted, units
/// placed or upgraded) so later attempts in the same turn see them.
#[derive(Clone, Debug)]
pub struct GameState {
    rules: Arc<GameRules>,
    pub turn_number: u32,
    pub my_health: f64,
    pub my_time: f64,
    pub enemy_health: f64,
    pub enemy_time: f64,
    resources: [[f64; 2]; 2],
    map: GameMap,
    build_stack: Vec<Placement>,
    deploy_stack: Vec<Placement>,
    warnings_enabled: bool,
}

impl GameState {
    pub fn from_frame(rules: Arc<GameRules>, frame: &TurnFrame) -> Result<Self, FrameError> {
        let [my_health, my_sp, my_mp, my_time] = read_stats(&frame.p1_stats, "p1Stats")?;
        let [enemy_health, enemy_sp, enemy_mp, enemy_time] =
            read_stats(&frame.p2_stats, "p2Stats")?;

        let mut state = Self {
            rules,
            turn_number: frame.turn_number(),
            my_health,
            my_time,
            enemy_health,
            enemy_time,
            resources: [[my_sp, my_mp], [enemy_sp, enemy_mp]],
            map: GameMap::new(),
            build_stack: Vec::new(),
            deploy_stack: Vec::new(),
            warnings_enabled: true,
        };
        state.load_units(&frame.p1_units, PLAYER_SELF)?;
        state.load_units(&frame.p2_units, PLAYER_ENEMY)?;
        Ok(state)
    }

    pub fn from_json(rules: Arc<GameRules>, line: &str) -> Result<Self, FrameError> {
        Self::from_frame(rules, &TurnFrame::from_json(line)?)
    }

    // Remove and upgrade markers come after the unit lists they refer to.
    fn load_units(&mut self, lists: &[Vec<Vec<Value>>], owner: u8) -> Result<(), FrameError> {
        if lists.len() > UNIT_LIST_COUNT {
            return Err(FrameError::UnknownUnitIndex { index: lists.len() - 1 });
        }
        for (index, rows) in lists.iter().enumerate() {
            let kind =
                UnitKind::from_index(index).ok_or(FrameError::UnknownUnitIndex { index })?;
            for row in rows {
                let (location, health, id) = read_unit_row(row, owner, index)?;
                match kind {
                    UnitKind::Remove | UnitKind::Upgrade => {
                        let rules = Arc::clone(&self.rules);
                        let unit = self.map.structure_at_mut(location).ok_or_else(|| {
                            FrameError::OrphanModifier {
                                shorthand: rules.catalog.shorthand(kind).to_string(),
                                x: location.x,
                                y: location.y,
                            }
                        })?;
                        if kind == UnitKind::Remove {
                            unit.pending_removal = true;
                        } else {
                            unit.upgrade(&rules.catalog);
                        }
                    }
                    _ => {
                        let mut unit =
                            GameUnit::new(&self.rules.catalog, kind, owner, location, Some(health));
                        unit.id = id;
                        self.map.place(unit);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.rules.catalog
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn build_stack(&self) -> &[Placement] {
        &self.build_stack
    }

    pub fn deploy_stack(&self) -> &[Placement] {
        &self.deploy_stack
    }

    /// Turn rejection warnings into debug-level logs.
    pub fn suppress_warnings(&mut self, suppress: bool) {
        self.warnings_enabled = !suppress;
    }

    fn warn(&self, message: std::fmt::Arguments<'_>) {
        if self.warnings_enabled {
            tracing::warn!("{message}");
        } else {
            tracing::debug!("{message}");
        }
    }

    pub fn resource(&self, slot: usize, player: u8) -> Option<f64> {
        self.resources(player).and_then(|held| held.get(slot).copied())
    }

    /// `[SP, MP]` held by `player`, `None` for anyone but the two players.
    pub fn resources(&self, player: u8) -> Option<[f64; 2]> {
        let held = self.resources.get(player as usize).copied();
        if held.is_none() {
            self.warn(format_args!("invalid player {player}; expected 0 or 1"));
        }
        held
    }

    fn own_resources(&self) -> [f64; 2] {
        self.resources[PLAYER_SELF as usize]
    }

    fn spend(&mut self, cost: [f64; 2]) {
        let held = &mut self.resources[PLAYER_SELF as usize];
        held[SP] -= cost[SP];
        held[MP] -= cost[MP];
    }

    pub fn type_cost(&self, kind: UnitKind, upgrade: bool) -> [f64; 2] {
        self.rules.catalog.cost(kind, upgrade)
    }

    /// How many of `kind` we could place with what we hold right now.
    pub fn number_affordable(&self, kind: UnitKind) -> u32 {
        let cost = self.type_cost(kind, false);
        let held = self.own_resources();
        let by_slot = |slot: usize| (held[slot] / cost[slot]).floor().max(0.0) as u32;
        match (cost[SP] > 0.0, cost[MP] > 0.0) {
            (true, true) => by_slot(SP).min(by_slot(MP)),
            (false, true) => by_slot(MP),
            (true, false) => by_slot(SP),
            (false, false) => {
                self.warn(format_args!("{kind:?} costs nothing; treating as unaffordable"));
                0
            }
        }
    }

    /// MP `player` will hold `turns_ahead` turns from now if nothing is spent.
    /// `None` outside the supported 1..=99 horizon.
    pub fn project_future_mp(
        &self,
        turns_ahead: u32,
        player: u8,
        current_mp: Option<f64>,
    ) -> Option<f64> {
        if !(1..=99).contains(&turns_ahead) {
            self.warn(format_args!(
                "project_future_mp supports 1..=99 turns, got {turns_ahead}"
            ));
            return None;
        }
        let schedule = &self.rules.resources;
        let interval = schedule.turn_interval_for_bit_schedule.max(1);
        let mut current = current_mp.or_else(|| self.resource(MP, player))?;
        for step in 1..=turns_ahead {
            let turn = self.turn_number + step;
            current *= 1.0 - schedule.bit_decay_per_round;
            let ramp_ups = (turn / interval) as f64;
            current += schedule.bits_per_round + schedule.bit_growth_rate * ramp_ups;
            current = (current * 10.0).round() / 10.0;
        }
        Some(current)
    }

    pub fn units_at(&self, location: Location) -> &[GameUnit] {
        self.map.units_at(location)
    }

    pub fn contains_stationary_unit(&self, location: Location) -> bool {
        self.map.contains_structure(location)
    }

    pub fn locations_in_range(&self, location: Location, radius: f64) -> Vec<Location> {
        location.within(radius)
    }

    fn placement_outcome(&self, kind: UnitKind, location: Location) -> AttemptOutcome {
        let mut reasons = Vec::new();
        if !location.in_arena() {
            reasons.push("location out of arena");
        } else {
            let occupied = self.map.contains_structure(location)
                || (kind.is_structure() && !self.map.units_at(location).is_empty());
            if occupied {
                reasons.push("location is blocked");
            }
            if !location.in_own_half() {
                reasons.push("location in enemy territory");
            }
            if kind.is_mobile() && !is_friendly_edge(location) {
                reasons.push("mobile units must be deployed on a friendly edge");
            }
        }
        if !reasons.is_empty() {
            self.warn(format_args!(
                "could not spawn {kind:?} at {location}: {}",
                reasons.join("; ")
            ));
            return AttemptOutcome::RejectedBlocked;
        }
        if self.number_affordable(kind) < 1 {
            self.warn(format_args!(
                "could not spawn {kind:?} at {location}: not enough resources"
            ));
            return AttemptOutcome::RejectedUnaffordable;
        }
        AttemptOutcome::Accepted
    }

    /// Place up to `count` units of `kind` on each location, in order.
    pub fn attempt_spawn(
        &mut self,
        kind: UnitKind,
        locations: &[Location],
        count: u32,
    ) -> AttemptReport {
        let mut report = AttemptReport::default();
        if kind.is_marker() {
            self.warn(format_args!("{kind:?} is not a spawnable unit"));
            return report;
        }
        if count < 1 {
            self.warn(format_args!("spawn count must be at least 1, got {count}"));
            return report;
        }
        // A structure fills its cell, so only one can ever land per location.
        let per_location = if kind.is_structure() { 1 } else { count };

        for &location in locations {
            for _ in 0..per_location {
                let outcome = self.placement_outcome(kind, location);
                report.push(location, outcome);
                if outcome != AttemptOutcome::Accepted {
                    break;
                }
                self.spend(self.type_cost(kind, false));
                self.map.place(GameUnit::new(
                    &self.rules.catalog,
                    kind,
                    PLAYER_SELF,
                    location,
                    None,
                ));
                let placement = Placement { kind, location };
                if kind.is_structure() {
                    self.build_stack.push(placement);
                } else {
                    self.deploy_stack.push(placement);
                }
            }
        }
        report
    }

    /// Queue removal of our structures. The cell stays occupied until the
    /// engine processes the removal at the end of the turn.
    pub fn attempt_remove(&mut self, locations: &[Location]) -> AttemptReport {
        let mut report = AttemptReport::default();
        for &location in locations {
            if location.in_own_half() && self.map.contains_structure(location) {
                self.build_stack.push(Placement {
                    kind: UnitKind::Remove,
                    location,
                });
                report.push(location, AttemptOutcome::Accepted);
            } else {
                self.warn(format_args!(
                    "could not remove a unit from {location}: no structure or enemy territory"
                ));
                report.push(location, AttemptOutcome::RejectedBlocked);
            }
        }
        report
    }

    pub fn attempt_upgrade(&mut self, locations: &[Location]) -> AttemptReport {
        let mut report = AttemptReport::default();
        for &location in locations {
            let target = self
                .map
                .structure_at(location)
                .filter(|_| location.in_own_half())
                .map(|unit| (unit.kind, unit.upgraded));

            let Some((kind, already_upgraded)) = target else {
                self.warn(format_args!(
                    "could not upgrade a unit at {location}: no structure or enemy territory"
                ));
                report.push(location, AttemptOutcome::RejectedBlocked);
                continue;
            };

            if already_upgraded || self.rules.catalog.get(kind).upgraded.is_none() {
                report.push(location, AttemptOutcome::RejectedBlocked);
                continue;
            }

            let cost = self.type_cost(kind, true);
            let held = self.own_resources();
            if held[SP] < cost[SP] || held[MP] < cost[MP] {
                report.push(location, AttemptOutcome::RejectedUnaffordable);
                continue;
            }

            self.spend(cost);
            let rules = Arc::clone(&self.rules);
            if let Some(unit) = self.map.structure_at_mut(location) {
                unit.upgrade_and_heal(&rules.catalog);
            }
            self.build_stack.push(Placement {
                kind: UnitKind::Upgrade,
                location,
            });
            report.push(location, AttemptOutcome::Accepted);
        }
        report
    }

    /// Units able to hit `location` that do not belong to `player`.
    pub fn get_attackers(&self, location: Location, player: u8) -> Vec<&GameUnit> {
        if !location.in_arena() {
            self.warn(format_args!("attackers requested for off-board cell {location}"));
        }
        let search_radius = self.rules.catalog.max_attack_range();
        location
            .within(search_radius)
            .into_iter()
            .flat_map(|cell| self.map.units_at(cell).iter())
            .filter(|unit| {
                unit.stats.damage_i > 0.0
                    && unit.owner != player
                    && location.distance(unit.location) <= unit.stats.attack_range
            })
            .collect()
    }

    /// Path from `start` to `edge` (default: the edge opposite the start).
    pub fn find_path_to_edge(&self, start: Location, edge: Option<Edge>) -> Option<Vec<Location>> {
        if self.map.contains_structure(start) {
            self.warn(format_args!(
                "path requested from {start}, which is blocked by a structure"
            ));
            return None;
        }
        let edge = edge.unwrap_or_else(|| Edge::target_for(start));
        find_path(&self.map, start, edge)
    }

    /// Serialize the queued orders as `[[shorthand, x, y], ...]` lines.
    pub fn submission(&self) -> Submission {
        Submission {
            build: self.encode_stack(&self.build_stack),
            deploy: self.encode_stack(&self.deploy_stack),
        }
    }

    fn encode_stack(&self, stack: &[Placement]) -> String {
        let rows: Vec<Value> = stack
            .iter()
            .map(|placement| {
                Value::from(vec![
                    Value::from(self.rules.catalog.shorthand(placement.kind)),
                    Value::from(placement.location.x),
                    Value::from(placement.location.y),
                ])
            })
            .collect();
        Value::from(rows).to_string()
    }
}

fn read_stats(stats: &[f64], field: &'static str) -> Result<[f64; 4], FrameError> {
    match stats {
        [health, sp, mp, time, ..] => Ok([*health, *sp, *mp, *time]),
        _ => Err(FrameError::MissingField { field }),
    }
}

fn read_unit_row(
    row: &[Value],
    owner: u8,
    index: usize,
) -> Result<(Location, f64, Option<String>), FrameError> {
    let number = |i: usize| row.get(i).and_then(Value::as_f64);
    match (number(0), number(1), number(2)) {
        (Some(x), Some(y), Some(health)) => Ok((
            Location::new(x as i32, y as i32),
            health,
            row.get(3).and_then(value_as_id),
        )),
        _ => Err(FrameError::UnitEntryTooShort {
            player: owner,
            index,
        }),
    }
}

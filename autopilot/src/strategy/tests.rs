use super::*;
use std::collections::HashMap;
use terminal_core::constants::{PLAYER_ENEMY, PLAYER_SELF};
use terminal_core::map::GameMap;
use terminal_core::{AttemptOutcome, GameRules, GameUnit, TurnFrame, UnitCatalog};

const CONFIG: &str = include_str!("../../tests/fixtures/game-config.json");

#[derive(Clone, Copy, Debug, PartialEq)]
enum Order {
    Spawn(UnitKind, Location, u32),
    Remove(Location),
    Upgrade(Location),
}

/// Board with scripted paths and attacker counts. Every order is accepted
/// and recorded; the map itself never changes.
struct ScriptedBoard {
    turn: u32,
    catalog: UnitCatalog,
    map: GameMap,
    attackers: HashMap<Location, usize>,
    paths: HashMap<Location, Vec<Location>>,
    orders: Vec<Order>,
}

impl ScriptedBoard {
    fn new(turn: u32) -> Self {
        let catalog = GameRules::from_json(CONFIG).unwrap().catalog;
        let mut board = Self {
            turn,
            catalog,
            map: GameMap::new(),
            attackers: HashMap::new(),
            paths: HashMap::new(),
            orders: Vec::new(),
        };
        for start in StrategyLayout::default().scout_candidates {
            board.paths.insert(start, vec![start]);
        }
        board
    }

    fn place(&mut self, kind: UnitKind, owner: u8, x: i32, y: i32, health: f64) {
        let unit = GameUnit::new(&self.catalog, kind, owner, Location::new(x, y), Some(health));
        self.map.place(unit);
    }

    fn spawns(&self, kind: UnitKind) -> Vec<(Location, u32)> {
        self.orders
            .iter()
            .filter_map(|order| match order {
                Order::Spawn(k, location, count) if *k == kind => Some((*location, *count)),
                _ => None,
            })
            .collect()
    }

    fn removals(&self) -> Vec<Location> {
        self.orders
            .iter()
            .filter_map(|order| match order {
                Order::Remove(location) => Some(*location),
                _ => None,
            })
            .collect()
    }

    fn mobile_spawns(&self) -> usize {
        UnitKind::MOBILE
            .iter()
            .map(|kind| self.spawns(*kind).len())
            .sum()
    }

    fn accept_all(locations: &[Location]) -> AttemptReport {
        let mut report = AttemptReport::default();
        for location in locations {
            report.push(*location, AttemptOutcome::Accepted);
        }
        report
    }
}

impl BoardView for ScriptedBoard {
    fn turn_number(&self) -> u32 {
        self.turn
    }

    fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    fn units_at(&self, location: Location) -> &[GameUnit] {
        self.map.units_at(location)
    }

    fn attacker_count(&self, location: Location, _player: u8) -> usize {
        self.attackers.get(&location).copied().unwrap_or(0)
    }

    fn path_to_edge(&self, start: Location) -> Option<Vec<Location>> {
        self.paths.get(&start).cloned()
    }
}

impl Orders for ScriptedBoard {
    fn spawn(&mut self, kind: UnitKind, locations: &[Location], count: u32) -> AttemptReport {
        for location in locations {
            self.orders.push(Order::Spawn(kind, *location, count));
        }
        Self::accept_all(locations)
    }

    fn remove(&mut self, locations: &[Location]) -> AttemptReport {
        for location in locations {
            self.orders.push(Order::Remove(*location));
        }
        Self::accept_all(locations)
    }

    fn upgrade(&mut self, locations: &[Location]) -> AttemptReport {
        for location in locations {
            self.orders.push(Order::Upgrade(*location));
        }
        Self::accept_all(locations)
    }
}

fn strategy() -> LaneStrategy {
    LaneStrategy::new(StrategyLayout::default())
}

fn loc(x: i32, y: i32) -> Location {
    Location::new(x, y)
}

#[test]
fn repair_removes_essential_wall_only_below_active_threshold() {
    // Wall max health is 60 in the fixture config.
    let cases = [
        (5, 32.0, true),
        (5, 33.0, false),
        (19, 59.0, false),
        (20, 59.0, true),
        (20, 60.0, false),
        (35, 33.0, true),
    ];
    for (turn, health, expect_removal) in cases {
        let mut board = ScriptedBoard::new(turn);
        board.place(UnitKind::Wall, PLAYER_SELF, 0, 13, health);
        let plan = strategy().on_turn(&mut board);

        let removed = board.removals().contains(&loc(0, 13));
        assert_eq!(removed, expect_removal, "turn {turn} health {health}");
        assert_eq!(plan.attacked.contains(&loc(0, 13)), expect_removal);
        assert_eq!(
            board.removals().iter().filter(|l| **l == loc(0, 13)).count(),
            usize::from(expect_removal),
            "at most one removal per turn"
        );
    }
}

#[test]
fn repair_ignores_opponent_walls_and_uses_fixed_secondary_threshold() {
    let mut board = ScriptedBoard::new(25);
    board.place(UnitKind::Wall, PLAYER_ENEMY, 27, 13, 10.0);
    board.place(UnitKind::Wall, PLAYER_SELF, 1, 12, 20.0);
    board.place(UnitKind::Wall, PLAYER_SELF, 26, 12, 21.0);
    let plan = strategy().on_turn(&mut board);

    assert!(plan.attacked.is_empty());
    assert!(board.removals().contains(&loc(1, 12)));
    assert!(!board.removals().contains(&loc(26, 12)));
    assert!(!board.removals().contains(&loc(27, 13)));
}

#[test]
fn attacked_essential_wall_triggers_corner_rebuild() {
    let mut board = ScriptedBoard::new(2);
    board.place(UnitKind::Wall, PLAYER_SELF, 27, 13, 10.0);
    strategy().on_turn(&mut board);

    let turrets = board.spawns(UnitKind::Turret);
    assert!(turrets.contains(&(loc(24, 11), 1)));
    assert!(!turrets.contains(&(loc(3, 11), 1)));
}

#[test]
fn least_damage_picks_unique_minimum() {
    let mut board = ScriptedBoard::new(3);
    let candidates = locations(&[[13, 0], [14, 0], [8, 5], [19, 5]]);
    board.paths.insert(loc(13, 0), vec![loc(13, 0), loc(13, 1)]);
    board.paths.insert(loc(14, 0), vec![loc(14, 0), loc(14, 1)]);
    board.attackers.insert(loc(13, 1), 2);
    board.attackers.insert(loc(14, 1), 1);
    board.attackers.insert(loc(8, 5), 3);
    board.attackers.insert(loc(19, 5), 1);
    board.attackers.insert(loc(14, 0), 1);

    // Damages: 10, 10, 15, 5 (turret hits for 5).
    let damages = attack::path_damage(&board, &candidates);
    assert_eq!(damages, vec![Some(10.0), Some(10.0), Some(15.0), Some(5.0)]);
    assert_eq!(
        attack::least_damage_spawn_location(&board, &candidates),
        Some(loc(19, 5))
    );
}

#[test]
fn least_damage_tie_goes_to_first_candidate() {
    let board = ScriptedBoard::new(3);
    let candidates = locations(&[[13, 0], [14, 0], [8, 5], [19, 5]]);
    assert_eq!(
        attack::least_damage_spawn_location(&board, &candidates),
        Some(loc(13, 0))
    );
}

#[test]
fn least_damage_skips_blocked_candidates() {
    let mut board = ScriptedBoard::new(3);
    board.paths.remove(&loc(13, 0));
    board.attackers.insert(loc(14, 0), 4);
    let candidates = locations(&[[13, 0], [14, 0], [8, 5]]);
    assert_eq!(
        attack::least_damage_spawn_location(&board, &candidates),
        Some(loc(8, 5))
    );

    board.paths.clear();
    assert_eq!(attack::least_damage_spawn_location(&board, &candidates), None);
}

#[test]
fn all_blocked_starts_issue_no_scouts() {
    let mut board = ScriptedBoard::new(3);
    board.paths.clear();
    let plan = strategy().on_turn(&mut board);
    assert_eq!(plan.slot, Some(PhaseSlot::Attack));
    assert_eq!(plan.scout_origin, None);
    assert!(board.spawns(UnitKind::Scout).is_empty());
}

#[test]
fn dispatch_follows_turn_table() {
    let layout = StrategyLayout::default();
    let expected = [
        (0, PhaseSlot::Hold),
        (1, PhaseSlot::Fortify),
        (2, PhaseSlot::Defend),
        (3, PhaseSlot::Attack),
        (9, PhaseSlot::Attack),
        (10, PhaseSlot::Fortify),
        (11, PhaseSlot::Defend),
        (12, PhaseSlot::Attack),
        (13, PhaseSlot::Defend),
        (20, PhaseSlot::Attack),
        (24, PhaseSlot::Defend),
        (25, PhaseSlot::Attack),
        (33, PhaseSlot::Attack),
        (35, PhaseSlot::Defend),
        (36, PhaseSlot::Defend),
        (37, PhaseSlot::Attack),
        (43, PhaseSlot::Attack),
        (44, PhaseSlot::Defend),
    ];
    for (turn, slot) in expected {
        assert_eq!(attack::slot_for_turn(&layout, turn), slot, "turn {turn}");
    }
}

#[test]
fn mid_stage_attack_turns_match_modulo_rule() {
    let layout = StrategyLayout::default();
    for turn in 12..36 {
        let attacks = (turn % 4 == 0 && turn < 24) || (turn % 4 == 1 && turn >= 24);
        let slot = attack::slot_for_turn(&layout, turn);
        let expected = if attacks {
            PhaseSlot::Attack
        } else {
            PhaseSlot::Defend
        };
        assert_eq!(slot, expected, "turn {turn}");
    }
}

#[test]
fn attack_slot_on_the_no_attack_turn_is_demoted() {
    let layout = StrategyLayout {
        early_attack_every: 11,
        ..StrategyLayout::default()
    };
    assert_eq!(attack::slot_for_turn(&layout, 11), PhaseSlot::Defend);

    for turn in [0, 11] {
        let mut board = ScriptedBoard::new(turn);
        LaneStrategy::new(layout.clone()).on_turn(&mut board);
        assert_eq!(board.mobile_spawns(), 0, "turn {turn}");
    }
}

#[test]
fn first_turn_builds_without_launching_or_trailing_supports() {
    let mut board = ScriptedBoard::new(0);
    let plan = strategy().on_turn(&mut board);

    assert_eq!(plan.slot, Some(PhaseSlot::Hold));
    assert_eq!(board.mobile_spawns(), 0);
    assert!(!board.spawns(UnitKind::Wall).is_empty());
    // Only the staged base asks for a support (the first one).
    assert_eq!(board.spawns(UnitKind::Support), vec![(loc(11, 9), 1)]);
}

#[test]
fn crowded_front_sends_demolishers_and_scouts() {
    let mut board = ScriptedBoard::new(3);
    let row_17 = (3..=24).map(|x| (x, 17));
    let row_18 = (4..=12).map(|x| (x, 18));
    for (x, y) in row_17.chain(row_18) {
        board.place(UnitKind::Wall, PLAYER_ENEMY, x, y, 60.0);
    }
    assert_eq!(board.hostile_structures_in_rows(&[17, 18]), 31);

    let plan = strategy().on_turn(&mut board);
    assert!(plan.demolishers);
    assert_eq!(board.spawns(UnitKind::Demolisher), vec![(loc(24, 10), 2)]);
    assert_eq!(board.spawns(UnitKind::Scout), vec![(loc(13, 0), 1000)]);

    let demolisher_at = board
        .orders
        .iter()
        .position(|o| matches!(o, Order::Spawn(UnitKind::Demolisher, ..)));
    let scout_at = board
        .orders
        .iter()
        .position(|o| matches!(o, Order::Spawn(UnitKind::Scout, ..)));
    assert!(demolisher_at < scout_at);
}

#[test]
fn sparse_front_sends_scouts_only() {
    let mut board = ScriptedBoard::new(3);
    for x in 3..=24 {
        board.place(UnitKind::Wall, PLAYER_ENEMY, x, 17, 60.0);
    }
    let plan = strategy().on_turn(&mut board);
    assert!(!plan.demolishers);
    assert!(board.spawns(UnitKind::Demolisher).is_empty());
    assert_eq!(board.spawns(UnitKind::Scout).len(), 1);
}

#[test]
fn demolisher_line_uses_cheapest_structure_when_configured() {
    let layout = StrategyLayout {
        demolisher_line_row: Some(10),
        front_structure_threshold: 0,
        ..StrategyLayout::default()
    };
    let mut board = ScriptedBoard::new(3);
    board.place(UnitKind::Turret, PLAYER_ENEMY, 13, 17, 75.0);
    LaneStrategy::new(layout).on_turn(&mut board);

    let line_start = board
        .orders
        .iter()
        .position(|o| *o == Order::Spawn(UnitKind::Wall, loc(27, 10), 1))
        .unwrap();
    let line: Vec<Order> = board.orders[line_start..line_start + 22].to_vec();
    for (offset, order) in line.iter().enumerate() {
        assert_eq!(*order, Order::Spawn(UnitKind::Wall, loc(27 - offset as i32, 10), 1));
    }
    assert_eq!(
        board.orders[line_start + 22],
        Order::Spawn(UnitKind::Demolisher, loc(24, 10), 2)
    );
}

#[test]
fn breach_history_grows_only_for_opponent_scores() {
    let mut strategy = strategy();
    let frame = TurnFrame::from_json(
        r#"{"turnInfo":[1,5,30,600],"events":{"breach":[[[5,13],1,3,"91",2],[[22,20],1,3,"92",1]]}}"#,
    )
    .unwrap();
    let added = strategy.record_breaches(&frame.breaches().unwrap());
    assert_eq!(added, 1);
    assert_eq!(strategy.scored_on(), &[loc(5, 13)]);
}

#[test]
fn scored_locations_reinforce_their_flank_every_time() {
    let mut strategy = strategy();
    let breach = |x: i32, y: i32| Breach {
        location: loc(x, y),
        damage: 1.0,
        unit_type: Some(3),
        unit_id: None,
        owner: 2,
    };
    strategy.record_breaches(&[breach(5, 13), breach(5, 13), breach(20, 14)]);

    let mut board = ScriptedBoard::new(1);
    strategy.on_turn(&mut board);
    let opening: Vec<Order> = board.orders[..6].to_vec();
    assert_eq!(
        opening,
        vec![
            Order::Spawn(UnitKind::Wall, loc(3, 12), 1),
            Order::Spawn(UnitKind::Turret, loc(3, 11), 1),
            Order::Spawn(UnitKind::Wall, loc(3, 12), 1),
            Order::Spawn(UnitKind::Turret, loc(3, 11), 1),
            Order::Spawn(UnitKind::Wall, loc(24, 12), 1),
            Order::Spawn(UnitKind::Turret, loc(24, 11), 1),
        ]
    );
}

#[test]
fn staged_base_order_is_fixed() {
    let mut first = ScriptedBoard::new(4);
    let mut second = ScriptedBoard::new(17);
    strategy().on_turn(&mut first);
    strategy().on_turn(&mut second);

    let walls = &StrategyLayout::default().base_walls;
    let expected_head: Vec<Order> = walls[..9]
        .iter()
        .map(|l| Order::Spawn(UnitKind::Wall, *l, 1))
        .chain([
            Order::Spawn(UnitKind::Wall, loc(3, 10), 1),
            Order::Spawn(UnitKind::Wall, loc(24, 10), 1),
        ])
        .collect();
    assert_eq!(&first.orders[..11], expected_head.as_slice());

    let base_len = first
        .orders
        .iter()
        .position(|o| *o == Order::Upgrade(loc(16, 9)))
        .unwrap();
    assert_eq!(first.orders[..=base_len], second.orders[..=base_len]);
}

#[test]
fn upgrade_limiter_respects_cap() {
    let walls = locations(&[[0, 13], [27, 13], [1, 12]]);
    for (cap, expected) in [(0, 0), (2, 2), (5, 3)] {
        let mut board = ScriptedBoard::new(1);
        for wall in &walls {
            board.place(UnitKind::Wall, PLAYER_SELF, wall.x, wall.y, 10.0);
        }
        let mut tally = Tally::new(&mut board);
        let upgraded = build::upgrade_limiter(&walls, 0.33, cap, &mut tally);
        assert_eq!(upgraded, expected, "cap {cap}");
        assert_eq!(tally.report.accepted(), expected);
    }
}

fn spawn_orders(kind: UnitKind, cells: &[[i32; 2]]) -> Vec<Order> {
    cells
        .iter()
        .map(|[x, y]| Order::Spawn(kind, loc(*x, *y), 1))
        .collect()
}

fn upgrade_orders(cells: &[[i32; 2]]) -> Vec<Order> {
    cells.iter().map(|[x, y]| Order::Upgrade(loc(*x, *y))).collect()
}

fn active_defense_orders(layout: &StrategyLayout, turn: u32) -> Vec<Order> {
    let mut board = ScriptedBoard::new(turn);
    {
        let mut tally = Tally::new(&mut board);
        build::active_defense(layout, turn, &mut tally);
    }
    board.orders
}

#[test]
fn middle_stage_layers_second_line_on_the_first() {
    let layout = StrategyLayout::default();
    assert_eq!(layout.stage_for_turn(11), Stage::Opening);
    assert_eq!(layout.stage_for_turn(12), Stage::Middle);
    assert_eq!(layout.stage_for_turn(35), Stage::Middle);
    assert_eq!(layout.stage_for_turn(36), Stage::Late);

    let turrets = [[11, 8], [16, 8], [11, 7], [15, 7]];
    let walls = [[12, 8], [15, 8], [12, 7], [14, 7]];
    let supports = [[11, 9], [17, 9], [10, 9], [18, 9], [9, 9], [19, 9]];
    let expected: Vec<Order> = [
        spawn_orders(UnitKind::Turret, &turrets[..2]),
        upgrade_orders(&turrets[..2]),
        spawn_orders(UnitKind::Turret, &turrets),
        spawn_orders(UnitKind::Wall, &walls),
        spawn_orders(UnitKind::Support, &supports),
        upgrade_orders(&turrets),
        upgrade_orders(&walls),
        upgrade_orders(&supports),
        upgrade_orders(&[[2, 11], [25, 11]]),
    ]
    .concat();

    assert_eq!(active_defense_orders(&layout, 12), expected);
    assert_eq!(active_defense_orders(&layout, 35), expected);

    let opening = active_defense_orders(&layout, 11);
    assert_eq!(
        opening,
        [
            spawn_orders(UnitKind::Turret, &turrets[..2]),
            spawn_orders(UnitKind::Wall, &walls[..2]),
            upgrade_orders(&turrets[..2]),
            upgrade_orders(&walls[..2]),
        ]
        .concat()
    );
}

#[test]
fn late_stage_drops_flank_upgrades_for_guard_posts() {
    let layout = StrategyLayout::default();
    let late = active_defense_orders(&layout, 36);

    assert_eq!(
        &late[..4],
        spawn_orders(UnitKind::Turret, &[[11, 8], [16, 8], [11, 7], [15, 7]]).as_slice()
    );
    assert!(!late.contains(&Order::Upgrade(loc(2, 11))));
    assert!(!late.contains(&Order::Upgrade(loc(25, 11))));
    assert!(late.contains(&Order::Spawn(UnitKind::Wall, loc(12, 6), 1)));
    assert!(late.contains(&Order::Spawn(UnitKind::Turret, loc(11, 6), 1)));
    assert!(late.contains(&Order::Upgrade(loc(13, 12))));
}

#[test]
fn reactive_defense_guards_edge_breaches_until_a_right_one() {
    let layout = StrategyLayout {
        reactive_defense: true,
        ..StrategyLayout::default()
    };
    let scored = locations(&[[5, 13], [1, 12], [27, 13], [0, 13]]);
    let mut board = ScriptedBoard::new(13);
    {
        let mut tally = Tally::new(&mut board);
        build::reactive_defense(&layout, &scored, &mut tally);
    }
    assert_eq!(
        board.orders,
        vec![
            Order::Spawn(UnitKind::Turret, loc(1, 12), 1),
            Order::Upgrade(loc(1, 12)),
            Order::Spawn(UnitKind::Turret, loc(26, 12), 1),
            Order::Upgrade(loc(26, 12)),
        ]
    );
}

#[test]
fn reactive_defense_runs_only_when_enabled() {
    let breach = Breach {
        location: loc(1, 12),
        damage: 1.0,
        unit_type: Some(3),
        unit_id: None,
        owner: 2,
    };
    let left_turret = Order::Spawn(UnitKind::Turret, loc(1, 12), 1);

    let mut off = strategy();
    off.record_breaches(&[breach.clone()]);
    let mut board = ScriptedBoard::new(13);
    off.on_turn(&mut board);
    assert!(!board.orders.contains(&left_turret));

    let mut on = LaneStrategy::new(StrategyLayout {
        reactive_defense: true,
        ..StrategyLayout::default()
    });
    on.record_breaches(&[breach]);
    let mut board = ScriptedBoard::new(13);
    on.on_turn(&mut board);
    assert!(board.orders.contains(&left_turret));
}

#[test]
fn defend_slot_opens_exit_but_fortify_does_not() {
    let mut fortify = ScriptedBoard::new(4);
    strategy().on_turn(&mut fortify);
    assert!(!fortify.removals().contains(&loc(14, 11)));
    assert!(fortify.spawns(UnitKind::Turret).contains(&(loc(11, 8), 1)));

    let mut defend = ScriptedBoard::new(5);
    strategy().on_turn(&mut defend);
    assert!(defend.removals().contains(&loc(14, 11)));
}

#[test]
fn late_stage_skips_one_guard_turret_but_still_upgrades_it() {
    let mut board = ScriptedBoard::new(38);
    let plan = strategy().on_turn(&mut board);
    assert_eq!(plan.slot, Some(PhaseSlot::Defend));

    let turrets = board.spawns(UnitKind::Turret);
    assert!(!turrets.contains(&(loc(11, 3), 1)));
    assert!(turrets.contains(&(loc(15, 3), 1)));
    assert!(board.orders.contains(&Order::Upgrade(loc(11, 3))));
    let supports = board.spawns(UnitKind::Support);
    assert!(supports.contains(&(loc(19, 8), 1)));
    assert!(supports.contains(&(loc(9, 9), 1)));
}

#[test]
fn layout_file_overrides_only_given_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(&path, r#"{"scout_count": 12, "exit_locations": [[13, 11]]}"#).unwrap();

    let layout = StrategyLayout::from_file(&path).unwrap();
    assert_eq!(layout.scout_count, 12);
    assert_eq!(layout.exit_locations, vec![loc(13, 11)]);
    assert_eq!(layout.base_walls, StrategyLayout::default().base_walls);
}

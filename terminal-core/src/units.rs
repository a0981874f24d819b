use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, UnitStatBlock};
use crate::constants::{MP, SP, UNIT_INFORMATION_LEN};
use crate::error::FrameError;
use crate::geometry::Location;

/// The closed set of unit kinds, in `unitInformation` order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Wall,
    Support,
    Turret,
    Scout,
    Demolisher,
    Interceptor,
    Remove,
    Upgrade,
}

impl UnitKind {
    pub const ALL: [UnitKind; UNIT_INFORMATION_LEN] = [
        UnitKind::Wall,
        UnitKind::Support,
        UnitKind::Turret,
        UnitKind::Scout,
        UnitKind::Demolisher,
        UnitKind::Interceptor,
        UnitKind::Remove,
        UnitKind::Upgrade,
    ];
    pub const STRUCTURES: [UnitKind; 3] = [UnitKind::Wall, UnitKind::Support, UnitKind::Turret];
    pub const MOBILE: [UnitKind; 3] = [UnitKind::Scout, UnitKind::Demolisher, UnitKind::Interceptor];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_structure(self) -> bool {
        matches!(self, UnitKind::Wall | UnitKind::Support | UnitKind::Turret)
    }

    pub fn is_mobile(self) -> bool {
        matches!(
            self,
            UnitKind::Scout | UnitKind::Demolisher | UnitKind::Interceptor
        )
    }

    /// Remove/Upgrade only exist as build-stack markers.
    pub fn is_marker(self) -> bool {
        matches!(self, UnitKind::Remove | UnitKind::Upgrade)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct UnitStats {
    pub cost: [f64; 2],
    pub max_health: f64,
    pub damage_i: f64,
    pub damage_f: f64,
    pub attack_range: f64,
    pub shield_range: f64,
    pub shield_per_unit: f64,
    pub shield_bonus_per_y: f64,
    pub speed: f64,
}

impl UnitStats {
    fn base(block: &UnitStatBlock) -> Self {
        Self::default().overridden_by(block)
    }

    fn overridden_by(self, block: &UnitStatBlock) -> Self {
        Self {
            cost: [
                block.cost1.unwrap_or(self.cost[SP]),
                block.cost2.unwrap_or(self.cost[MP]),
            ],
            max_health: block.start_health.unwrap_or(self.max_health),
            damage_i: block.attack_damage_walker.unwrap_or(self.damage_i),
            damage_f: block.attack_damage_tower.unwrap_or(self.damage_f),
            attack_range: block.attack_range.unwrap_or(self.attack_range),
            shield_range: block.shield_range.unwrap_or(self.shield_range),
            shield_per_unit: block.shield_per_unit.unwrap_or(self.shield_per_unit),
            shield_bonus_per_y: block.shield_bonus_per_y.unwrap_or(self.shield_bonus_per_y),
            speed: block.speed.unwrap_or(self.speed),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct UnitType {
    pub kind: UnitKind,
    pub shorthand: String,
    pub base: UnitStats,
    pub upgraded: Option<UnitStats>,
}

/// Unit definitions resolved once per game from the engine config.
#[derive(Clone, Debug, Serialize)]
pub struct UnitCatalog {
    types: Vec<UnitType>,
}

impl UnitCatalog {
    pub fn from_config(config: &GameConfig) -> Result<Self, FrameError> {
        if config.unit_information.len() < UNIT_INFORMATION_LEN {
            return Err(FrameError::UnitInformationTooShort {
                actual: config.unit_information.len(),
                min: UNIT_INFORMATION_LEN,
            });
        }

        let types = UnitKind::ALL
            .iter()
            .zip(&config.unit_information)
            .map(|(kind, info)| {
                let base = UnitStats::base(&info.stats);
                UnitType {
                    kind: *kind,
                    shorthand: info.shorthand.clone(),
                    base,
                    upgraded: info.upgrade.as_ref().map(|block| base.overridden_by(block)),
                }
            })
            .collect();

        Ok(Self { types })
    }

    pub fn get(&self, kind: UnitKind) -> &UnitType {
        &self.types[kind.index()]
    }

    pub fn shorthand(&self, kind: UnitKind) -> &str {
        &self.get(kind).shorthand
    }

    pub fn kind_for_shorthand(&self, shorthand: &str) -> Option<UnitKind> {
        self.types
            .iter()
            .find(|unit_type| unit_type.shorthand == shorthand)
            .map(|unit_type| unit_type.kind)
    }

    /// `[SP, MP]` price of placing (or, with `upgrade`, upgrading) a kind.
    pub fn cost(&self, kind: UnitKind, upgrade: bool) -> [f64; 2] {
        let unit_type = self.get(kind);
        if upgrade {
            unit_type.upgraded.unwrap_or(unit_type.base).cost
        } else {
            unit_type.base.cost
        }
    }

    /// Largest attack range of any kind, upgraded or not.
    pub fn max_attack_range(&self) -> f64 {
        self.types
            .iter()
            .flat_map(|unit_type| {
                std::iter::once(unit_type.base.attack_range)
                    .chain(unit_type.upgraded.map(|stats| stats.attack_range))
            })
            .fold(0.0, f64::max)
    }

    /// Cheapest structure by `resource` cost; earlier kinds win ties.
    pub fn cheapest_structure(&self, resource: usize) -> UnitKind {
        let mut cheapest = UnitKind::Wall;
        for kind in UnitKind::STRUCTURES {
            if self.cost(kind, false)[resource] < self.cost(cheapest, false)[resource] {
                cheapest = kind;
            }
        }
        cheapest
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameUnit {
    pub kind: UnitKind,
    pub owner: u8,
    pub location: Location,
    pub health: f64,
    pub stats: UnitStats,
    pub upgraded: bool,
    pub pending_removal: bool,
    pub id: Option<String>,
}

impl GameUnit {
    /// A zero or missing health means "fresh", i.e. full base health.
    pub fn new(
        catalog: &UnitCatalog,
        kind: UnitKind,
        owner: u8,
        location: Location,
        health: Option<f64>,
    ) -> Self {
        let stats = catalog.get(kind).base;
        let health = health
            .filter(|hp| *hp > 0.0)
            .unwrap_or(stats.max_health);
        Self {
            kind,
            owner,
            location,
            health,
            stats,
            upgraded: false,
            pending_removal: false,
            id: None,
        }
    }

    pub fn is_structure(&self) -> bool {
        self.kind.is_structure()
    }

    pub fn max_health(&self) -> f64 {
        self.stats.max_health
    }

    pub fn health_fraction(&self) -> f64 {
        if self.stats.max_health <= 0.0 {
            return 1.0;
        }
        self.health / self.stats.max_health
    }

    /// Apply the catalog's upgrade block. Current health is kept; the engine
    /// already reports post-upgrade health for upgraded units.
    pub fn upgrade(&mut self, catalog: &UnitCatalog) {
        if let Some(stats) = catalog.get(self.kind).upgraded {
            self.stats = stats;
        }
        self.upgraded = true;
    }

    /// Upgrade ordered this turn: the unit also gains the added max health.
    pub fn upgrade_and_heal(&mut self, catalog: &UnitCatalog) {
        let before = self.max_health();
        self.upgrade(catalog);
        self.health += (self.max_health() - before).max(0.0);
    }
}

use std::sync::Arc;

use crate::config::GameRules;
use crate::geometry::Location;
use crate::units::{GameUnit, UnitCatalog, UnitKind};

pub const SAMPLE_CONFIG: &str = include_str!("../tests/fixtures/game-config.json");

pub fn config_line() -> String {
    SAMPLE_CONFIG.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn rules() -> Arc<GameRules> {
    match GameRules::from_json(SAMPLE_CONFIG) {
        Ok(rules) => Arc::new(rules),
        Err(err) => panic!("sample config must parse: {err}"),
    }
}

pub fn catalog() -> UnitCatalog {
    rules().catalog.clone()
}

pub fn wall(catalog: &UnitCatalog, owner: u8, x: i32, y: i32) -> GameUnit {
    GameUnit::new(catalog, UnitKind::Wall, owner, Location::new(x, y), None)
}

/// A deploy-phase frame with both players at 30 health.
pub fn turn_line(turn: u32, sp: f64, mp: f64, p1_units: &str, p2_units: &str) -> String {
    format!(
        r#"{{"turnInfo":[0,{turn},-1,0],"p1Stats":[30,{sp},{mp},0],"p2Stats":[30,40,5,0],"p1Units":{p1_units},"p2Units":{p2_units},"events":{{"breach":[]}}}}"#
    )
}

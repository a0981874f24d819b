use serde::Deserialize;
use serde_json::Value;

use crate::config::GameConfig;
use crate::constants::{FRAME_OWNER_SELF, PHASE_ACTION, PHASE_DEPLOY, PHASE_END};
use crate::error::FrameError;
use crate::geometry::Location;

/// One engine line, classified.
#[derive(Clone, Debug)]
pub enum EngineMessage {
    Config(Box<GameConfig>),
    Turn(Box<TurnFrame>),
    ActionFrame(Box<TurnFrame>),
    GameOver,
}

impl EngineMessage {
    /// Lines without `turnInfo` carry the game config; the rest are
    /// dispatched on `turnInfo[0]`.
    pub fn parse(line: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(line).map_err(|err| FrameError::Json {
            context: "engine line",
            message: err.to_string(),
        })?;

        if value.get("turnInfo").is_none() {
            let config = GameConfig::from_json(line)?;
            return Ok(Self::Config(Box::new(config)));
        }

        let frame = TurnFrame::from_value(value)?;
        match frame.phase() {
            PHASE_DEPLOY => Ok(Self::Turn(Box::new(frame))),
            PHASE_ACTION => Ok(Self::ActionFrame(Box::new(frame))),
            PHASE_END => Ok(Self::GameOver),
            phase => Err(FrameError::UnexpectedPhase { phase }),
        }
    }
}

/// A state line as the engine serializes it. Units are left as raw JSON
/// rows (`[x, y, health, id]`) and decoded against the unit catalog.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnFrame {
    pub turn_info: Vec<f64>,
    #[serde(default)]
    pub p1_stats: Vec<f64>,
    #[serde(default)]
    pub p2_stats: Vec<f64>,
    #[serde(default)]
    pub p1_units: Vec<Vec<Vec<Value>>>,
    #[serde(default)]
    pub p2_units: Vec<Vec<Vec<Value>>>,
    #[serde(default)]
    pub events: FrameEvents,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FrameEvents {
    #[serde(default)]
    pub breach: Vec<Vec<Value>>,
}

/// A mobile unit reaching an edge, as reported in an action frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Breach {
    pub location: Location,
    pub damage: f64,
    pub unit_type: Option<i64>,
    pub unit_id: Option<String>,
    pub owner: i64,
}

impl Breach {
    pub fn scored_on_us(&self) -> bool {
        self.owner != FRAME_OWNER_SELF
    }
}

impl TurnFrame {
    pub fn from_json(line: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(line).map_err(|err| FrameError::Json {
            context: "turn frame",
            message: err.to_string(),
        })?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, FrameError> {
        let frame: TurnFrame = serde_json::from_value(value).map_err(|err| FrameError::Json {
            context: "turn frame",
            message: err.to_string(),
        })?;
        if frame.turn_info.len() < 2 {
            return Err(FrameError::MissingField {
                field: "turnInfo[1]",
            });
        }
        Ok(frame)
    }

    pub fn phase(&self) -> i64 {
        self.turn_info.first().copied().unwrap_or(-1.0) as i64
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_info.get(1).copied().unwrap_or(0.0).max(0.0) as u32
    }

    pub fn action_frame(&self) -> i64 {
        self.turn_info.get(2).copied().unwrap_or(-1.0) as i64
    }

    pub fn breaches(&self) -> Result<Vec<Breach>, FrameError> {
        self.events.breach.iter().map(|row| parse_breach(row)).collect()
    }
}

fn parse_breach(row: &[Value]) -> Result<Breach, FrameError> {
    let location = row
        .first()
        .and_then(|value| serde_json::from_value::<Location>(value.clone()).ok())
        .ok_or(FrameError::MissingField {
            field: "breach[0]",
        })?;
    let owner = row
        .get(4)
        .and_then(Value::as_f64)
        .ok_or(FrameError::MissingField {
            field: "breach[4]",
        })? as i64;

    Ok(Breach {
        location,
        damage: row.get(1).and_then(Value::as_f64).unwrap_or(0.0),
        unit_type: row.get(2).and_then(Value::as_f64).map(|t| t as i64),
        unit_id: row.get(3).and_then(value_as_id),
        owner,
    })
}

/// Unit ids arrive as strings, but older engines send numbers.
pub(crate) fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

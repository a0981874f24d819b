pub mod attempt;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod map;
pub mod navigation;
pub mod protocol;
pub mod state;
pub mod units;

#[cfg(test)]
mod test_support;

pub use attempt::{AttemptOutcome, AttemptReport};
pub use config::{GameConfig, GameRules};
pub use error::FrameError;
pub use frame::{Breach, EngineMessage, TurnFrame};
pub use geometry::{locations, Edge, Location};
pub use protocol::{run, AlgoCore, SessionSummary};
pub use state::{GameState, Placement, Submission};
pub use units::{GameUnit, UnitCatalog, UnitKind};

use serde::Serialize;
use std::sync::Arc;
use terminal_core::constants::{MP, PLAYER_SELF, SP};
use terminal_core::{
    AlgoCore, FrameError, GameConfig, GameRules, GameState, Location, Submission, TurnFrame,
};

use crate::strategy::{LaneStrategy, PhaseSlot, StrategyLayout};

/// One submitted turn, as recorded for replay reports.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnSummary {
    pub turn: u32,
    pub slot: Option<PhaseSlot>,
    pub attacked: Vec<Location>,
    pub scout_origin: Option<Location>,
    pub demolishers: bool,
    pub accepted: usize,
    pub rejected: usize,
    pub build_orders: usize,
    pub deploy_orders: usize,
    pub sp_left: f64,
    pub mp_left: f64,
}

/// Engine-facing agent: owns the match rules and the strategy's breach history.
pub struct LaneAgent {
    layout: StrategyLayout,
    strategy: LaneStrategy,
    rules: Option<Arc<GameRules>>,
    turns: Vec<TurnSummary>,
    malformed_frames: u32,
}

impl LaneAgent {
    pub fn new(layout: StrategyLayout) -> Self {
        Self {
            strategy: LaneStrategy::new(layout.clone()),
            layout,
            rules: None,
            turns: Vec::new(),
            malformed_frames: 0,
        }
    }

    pub fn strategy(&self) -> &LaneStrategy {
        &self.strategy
    }

    pub fn turns(&self) -> &[TurnSummary] {
        &self.turns
    }

    pub fn malformed_frames(&self) -> u32 {
        self.malformed_frames
    }
}

impl AlgoCore for LaneAgent {
    fn on_game_start(&mut self, config: &GameConfig) -> Result<(), FrameError> {
        self.rules = Some(Arc::new(GameRules::from_config(config)?));
        self.strategy = LaneStrategy::new(self.layout.clone());
        self.turns.clear();
        self.malformed_frames = 0;
        tracing::info!("lane strategy configured");
        Ok(())
    }

    fn on_turn(&mut self, frame: &TurnFrame) -> Result<Submission, FrameError> {
        let rules = self.rules.clone().ok_or(FrameError::MissingField {
            field: "unitInformation",
        })?;
        let mut state = GameState::from_frame(rules, frame)?;
        state.suppress_warnings(self.layout.suppress_warnings);
        tracing::debug!(turn = state.turn_number, "performing turn");

        let plan = self.strategy.on_turn(&mut state);
        let resources = state.resources(PLAYER_SELF).unwrap_or_default();
        self.turns.push(TurnSummary {
            turn: plan.turn,
            slot: plan.slot,
            attacked: plan.attacked,
            scout_origin: plan.scout_origin,
            demolishers: plan.demolishers,
            accepted: plan.report.accepted(),
            rejected: plan.report.rejected(),
            build_orders: state.build_stack().len(),
            deploy_orders: state.deploy_stack().len(),
            sp_left: resources[SP],
            mp_left: resources[MP],
        });
        Ok(state.submission())
    }

    fn on_action_frame(&mut self, frame: &TurnFrame) {
        match frame.breaches() {
            Ok(breaches) => {
                self.strategy.record_breaches(&breaches);
            }
            Err(err) => {
                self.malformed_frames += 1;
                tracing::warn!(frame = frame.action_frame(), %err, "ignoring malformed action frame");
            }
        }
    }
}

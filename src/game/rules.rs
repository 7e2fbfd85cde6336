use serde::{Deserialize, Serialize};

use super::{
    board::{CellIndex, Mark, Outcome},
    state::{GameEvent, GameState, IntegrityError},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceMarkAction {
    pub mark: Mark,
    pub cell: CellIndex,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    NotYourTurn { mark: Mark },
    CellOutOfRange { cell: CellIndex },
    CellOccupied { cell: CellIndex },
    IntegrityViolation { error: IntegrityError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl RuleResolution {
    pub fn new(state: GameState, events: Vec<GameEvent>) -> Self {
        let outcome = state.outcome;
        Self {
            state,
            events,
            outcome,
        }
    }
}

/// 落子规则引擎：校验、落子、换手、结算。
#[derive(Debug, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    fn ensure_turn_owner(state: &GameState, mark: Mark) -> Result<(), RuleError> {
        if state.turn != mark {
            return Err(RuleError::NotYourTurn { mark });
        }
        Ok(())
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    pub fn place_mark(
        &mut self,
        state: &mut GameState,
        action: PlaceMarkAction,
    ) -> Result<Vec<GameEvent>, RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }

        Self::ensure_integrity(state)?;
        Self::ensure_turn_owner(state, action.mark)?;

        if action.cell >= 9 {
            return Err(RuleError::CellOutOfRange { cell: action.cell });
        }
        if state.board.mark_at(action.cell).is_some() {
            return Err(RuleError::CellOccupied { cell: action.cell });
        }

        state.board.place(action.cell, action.mark);
        state.turn = action.mark.opponent();

        let mut events = Vec::new();
        let placed = GameEvent::MarkPlaced {
            mark: action.mark,
            cell: action.cell,
        };
        state.record_event(placed.clone());
        events.push(placed);

        match state.board.evaluate() {
            Outcome::InProgress => {}
            outcome @ Outcome::Won { mark } => {
                state.outcome = Some(outcome);
                state.scoreboard.record(outcome);
                // winning_line 在 Won 分支下必然存在
                let line = state
                    .board
                    .winning_line()
                    .map(|(_, line)| line)
                    .unwrap_or_default();
                let won = GameEvent::GameWon { mark, line };
                state.record_event(won.clone());
                events.push(won);
            }
            outcome @ Outcome::Draw => {
                state.outcome = Some(outcome);
                state.scoreboard.record(outcome);
                state.record_event(GameEvent::GameDrawn);
                events.push(GameEvent::GameDrawn);
            }
        }

        Ok(events)
    }

    pub fn reset_board(&mut self, state: &mut GameState) -> Vec<GameEvent> {
        state.reset_board();
        vec![GameEvent::BoardCleared]
    }

    pub fn reset_scores(&mut self, state: &mut GameState) -> Vec<GameEvent> {
        state.reset_scores();
        vec![GameEvent::ScoresCleared]
    }
}

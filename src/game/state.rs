use serde::{Deserialize, Serialize};

use super::board::{Board, CellIndex, Mark, Outcome};

/// 胜负计分板，对应前端的 scores 状态（持久化由前端负责）。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBoard {
    pub x: u32,
    pub o: u32,
    pub draws: u32,
}

impl ScoreBoard {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Won { mark: Mark::X } => self.x += 1,
            Outcome::Won { mark: Mark::O } => self.o += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::InProgress => {}
        }
    }

    pub fn reset(&mut self) {
        *self = ScoreBoard::default();
    }
}

/// 对局事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MarkPlaced { mark: Mark, cell: CellIndex },
    GameWon { mark: Mark, line: [CellIndex; 3] },
    GameDrawn,
    BoardCleared,
    ScoresCleared,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    MarkCountImbalance { x: u8, o: u8 },
    TurnOutOfSync { expected: Mark },
}

/// 对局整体状态：棋盘、轮到谁落子、计分板与事件日志。X 先手。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    #[serde(default)]
    pub board: Board,
    pub turn: Mark,
    #[serde(default)]
    pub scoreboard: ScoreBoard,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
            scoreboard: ScoreBoard::default(),
            event_log: Vec::new(),
            outcome: None,
        }
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// 清空棋盘重新开局，计分板保留（对应前端的 Restart Game）。
    pub fn reset_board(&mut self) {
        self.board = Board::new();
        self.turn = Mark::X;
        self.outcome = None;
        self.event_log.clear();
        self.record_event(GameEvent::BoardCleared);
    }

    pub fn reset_scores(&mut self) {
        self.scoreboard.reset();
        self.record_event(GameEvent::ScoresCleared);
    }

    /// 校验棋盘与行棋方是否自洽：X 先手，两种符号的数量至多差一。
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let x = self.board.mark_count(Mark::X) as u8;
        let o = self.board.mark_count(Mark::O) as u8;
        if x != o && x != o + 1 {
            return Err(IntegrityError::MarkCountImbalance { x, o });
        }
        let expected = if x == o { Mark::X } else { Mark::O };
        if !self.is_finished() && self.turn != expected {
            return Err(IntegrityError::TurnOutOfSync { expected });
        }
        Ok(())
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

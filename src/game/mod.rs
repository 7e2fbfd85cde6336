//! 游戏核心逻辑模块（棋盘、状态与落子规则）。

pub mod board;
pub mod rules;
pub mod state;

pub use board::{Board, CellIndex, Mark, Outcome, WIN_LINES};
pub use rules::{PlaceMarkAction, RuleEngine, RuleError, RuleResolution};
pub use state::{GameEvent, GameState, IntegrityError, ScoreBoard};

use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::{Board, CellIndex, Mark, Outcome};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "medium" | "normal" => Ok(AiDifficulty::Medium),
            "hard" | "expert" => Ok(AiDifficulty::Hard),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AiConfig {
    /// 本次调用走随机落子的概率，其余情况走完整搜索。
    pub random_move_chance: f64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy => Self {
                random_move_chance: 1.0,
            },
            AiDifficulty::Medium => Self {
                random_move_chance: 0.5,
            },
            AiDifficulty::Hard => Self {
                random_move_chance: 0.0,
            },
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::from_difficulty(AiDifficulty::Medium)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<CellIndex>,
    pub evaluation: i32,
    pub nodes: u64,
    pub difficulty: AiDifficulty,
}

struct SearchStats {
    nodes: u64,
}

impl SearchStats {
    fn new() -> Self {
        Self { nodes: 0 }
    }
}

pub struct AiAgent {
    rng: SmallRng,
}

impl AiAgent {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// 为 `mark` 选出下一手棋。满盘时返回 None。
    pub fn select_move(
        &mut self,
        board: &mut Board,
        mark: Mark,
        difficulty: AiDifficulty,
    ) -> Option<CellIndex> {
        self.decide(board, mark, difficulty).cell
    }

    pub fn decide(
        &mut self,
        board: &mut Board,
        mark: Mark,
        difficulty: AiDifficulty,
    ) -> AiDecision {
        let config = AiConfig::from_difficulty(difficulty);
        let mut stats = SearchStats::new();

        let cell = if config.random_move_chance > 0.0
            && self.rng.gen_bool(config.random_move_chance)
        {
            self.random_move(board)
        } else {
            best_move_with(board, mark, &mut stats)
        };

        let evaluation = match cell {
            Some(cell) => with_mark(board, cell, mark, |board| {
                minimax(board, mark, 0, false, &mut stats)
            }),
            None => 0,
        };

        AiDecision {
            cell,
            evaluation,
            nodes: stats.nodes,
            difficulty,
        }
    }

    fn random_move(&mut self, board: &Board) -> Option<CellIndex> {
        board.empty_cells().choose(&mut self.rng).copied()
    }
}

impl Default for AiAgent {
    fn default() -> Self {
        AiAgent::new()
    }
}

/// 落子、求值、撤销。撤销走统一出口，任何返回路径都不会跳过。
fn with_mark<T>(
    board: &mut Board,
    cell: CellIndex,
    mark: Mark,
    scope: impl FnOnce(&mut Board) -> T,
) -> T {
    board.place(cell, mark);
    let value = scope(board);
    board.clear(cell);
    value
}

/// 完整极大极小搜索。同分取最小索引（严格大于才替换）。
pub fn best_move(board: &mut Board, mark: Mark) -> Option<CellIndex> {
    best_move_with(board, mark, &mut SearchStats::new())
}

fn best_move_with(board: &mut Board, mark: Mark, stats: &mut SearchStats) -> Option<CellIndex> {
    let mut best_score = i32::MIN;
    let mut best_cell = None;

    for cell in board.empty_cells() {
        let score = with_mark(board, cell, mark, |board| {
            minimax(board, mark, 0, false, stats)
        });
        if score > best_score {
            best_score = score;
            best_cell = Some(cell);
        }
    }

    best_cell
}

/// 以 `me` 的视角给当前局面打分。深度修正让引擎偏好速胜与拖延败局：
/// 胜 10-depth，负 depth-10，平 0。
fn minimax(board: &mut Board, me: Mark, depth: i32, maximizing: bool, stats: &mut SearchStats) -> i32 {
    stats.nodes += 1;

    match board.evaluate() {
        Outcome::Won { mark } if mark == me => return 10 - depth,
        Outcome::Won { .. } => return depth - 10,
        Outcome::Draw => return 0,
        Outcome::InProgress => {}
    }

    let to_move = if maximizing { me } else { me.opponent() };
    let mut best = if maximizing { i32::MIN } else { i32::MAX };

    for cell in board.empty_cells() {
        let score = with_mark(board, cell, to_move, |board| {
            minimax(board, me, depth + 1, !maximizing, stats)
        });
        best = if maximizing {
            best.max(score)
        } else {
            best.min(score)
        };
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Board;

    fn board_from(symbols: [char; 9]) -> Board {
        let mut board = Board::new();
        for (index, symbol) in symbols.iter().enumerate() {
            match symbol {
                'X' => board.place(index, Mark::X),
                'O' => board.place(index, Mark::O),
                _ => {}
            }
        }
        board
    }

    fn hard_move(board: &mut Board, mark: Mark) -> CellIndex {
        best_move(board, mark).expect("board has an empty cell")
    }

    #[test]
    fn search_leaves_the_board_untouched() {
        let mut board = board_from(['X', 'X', '.', '.', 'O', '.', '.', '.', '.']);
        let snapshot = board;
        hard_move(&mut board, Mark::O);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn full_board_yields_no_move() {
        let mut board = board_from(['X', 'O', 'X', 'X', 'O', 'O', 'O', 'X', 'X']);
        let mut agent = AiAgent::with_seed(7);
        for difficulty in [AiDifficulty::Easy, AiDifficulty::Medium, AiDifficulty::Hard] {
            assert_eq!(agent.select_move(&mut board, Mark::X, difficulty), None);
        }
    }

    #[test]
    fn hard_blocks_the_open_winning_line() {
        // 顶行两个 X，2 号位是唯一不输的应手
        let mut board = board_from(['X', 'X', '.', '.', '.', '.', '.', '.', '.']);
        assert_eq!(hard_move(&mut board, Mark::O), 2);
    }

    #[test]
    fn hard_takes_its_own_winning_line_first() {
        // O 可直接在 5 号位成线，优先于堵截
        let mut board = board_from(['X', 'X', '.', 'O', 'O', '.', 'X', '.', '.']);
        assert_eq!(hard_move(&mut board, Mark::O), 5);
    }

    #[test]
    fn hard_opening_is_corner_or_center() {
        let mut board = Board::new();
        let opening = hard_move(&mut board, Mark::X);
        assert!([0, 2, 4, 6, 8].contains(&opening), "opening {opening}");
    }

    #[test]
    fn hard_is_deterministic_for_a_fixed_board() {
        let cells = ['X', '.', '.', '.', 'O', '.', '.', '.', 'X'];
        let first = hard_move(&mut board_from(cells), Mark::O);
        for _ in 0..10 {
            assert_eq!(hard_move(&mut board_from(cells), Mark::O), first);
        }
    }

    #[test]
    fn hard_self_play_always_draws() {
        let mut board = Board::new();
        let mut to_move = Mark::X;
        while board.evaluate() == Outcome::InProgress {
            let cell = hard_move(&mut board, to_move);
            board.place(cell, to_move);
            to_move = to_move.opponent();
        }
        assert_eq!(board.evaluate(), Outcome::Draw);
    }

    #[test]
    fn hard_never_hands_over_an_immediate_win() {
        // 对手任意开局，引擎应手后对手不应再有一步制胜棋
        for opening in 0..9 {
            let mut board = Board::new();
            board.place(opening, Mark::X);
            let reply = hard_move(&mut board, Mark::O);
            board.place(reply, Mark::O);
            for threat in board.empty_cells() {
                let handed_win = with_mark(&mut board, threat, Mark::X, |board| {
                    board.evaluate() == Outcome::Won { mark: Mark::X }
                });
                assert!(!handed_win, "opening {opening}, reply {reply}, threat {threat}");
            }
        }
    }

    #[test]
    fn easy_takes_the_only_remaining_cell() {
        let cells = ['X', 'O', 'X', 'X', 'O', 'O', 'O', 'X', '.'];
        for seed in 0..8 {
            let mut agent = AiAgent::with_seed(seed);
            let mut board = board_from(cells);
            assert_eq!(
                agent.select_move(&mut board, Mark::X, AiDifficulty::Easy),
                Some(8)
            );
        }
    }

    #[test]
    fn easy_only_returns_legal_cells() {
        let mut agent = AiAgent::with_seed(11);
        let cells = ['X', 'X', '.', '.', 'O', '.', 'O', '.', '.'];
        for _ in 0..50 {
            let mut board = board_from(cells);
            let cell = agent
                .select_move(&mut board, Mark::O, AiDifficulty::Easy)
                .unwrap();
            assert_eq!(board.mark_at(cell), None);
        }
    }

    #[test]
    fn medium_mixes_optimal_and_random_play() {
        // 2 号位是 Hard 的唯一选择；多次调用应同时出现它与其他格子
        let cells = ['X', 'X', '.', '.', '.', '.', '.', '.', '.'];
        let mut agent = AiAgent::with_seed(42);
        let mut saw_optimal = false;
        let mut saw_other = false;
        for _ in 0..100 {
            let mut board = board_from(cells);
            let cell = agent
                .select_move(&mut board, Mark::O, AiDifficulty::Medium)
                .unwrap();
            if cell == 2 {
                saw_optimal = true;
            } else {
                saw_other = true;
            }
        }
        assert!(saw_optimal && saw_other);
    }

    #[test]
    fn decision_reports_search_size_and_score() {
        let mut board = board_from(['X', 'X', '.', 'O', 'O', '.', 'X', '.', '.']);
        let mut agent = AiAgent::with_seed(3);
        let decision = agent.decide(&mut board, Mark::O, AiDifficulty::Hard);
        assert_eq!(decision.cell, Some(5));
        // 在 5 号位成线即刻获胜，根节点落子后深度为 0
        assert_eq!(decision.evaluation, 10);
        assert!(decision.nodes > 0);
    }

    #[test]
    fn difficulty_parses_the_frontend_strings() {
        assert_eq!("Easy".parse(), Ok(AiDifficulty::Easy));
        assert_eq!("Medium".parse(), Ok(AiDifficulty::Medium));
        assert_eq!("hard".parse(), Ok(AiDifficulty::Hard));
        assert!("impossible".parse::<AiDifficulty>().is_err());
    }
}

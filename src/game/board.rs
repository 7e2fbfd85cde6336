use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 棋盘格子索引（0-8，按行排列）。
pub type CellIndex = usize;

/// 棋盘上的落子符号。序列化为 "X" / "O"，与前端棋格取值一致。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl FromStr for Mark {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Mark::X),
            "o" => Ok(Mark::O),
            _ => Err(()),
        }
    }
}

/// 八条获胜线：三行、三列、两条对角线。
pub const WIN_LINES: [[CellIndex; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 局面判定结果。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Outcome {
    InProgress,
    Won { mark: Mark },
    Draw,
}

/// 3×3 棋盘，空格为 null。序列化为 9 元素数组，与前端 board 状态同构。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Mark>; 9],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cells(cells: [Option<Mark>; 9]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<Mark>; 9] {
        &self.cells
    }

    pub fn mark_at(&self, cell: CellIndex) -> Option<Mark> {
        self.cells.get(cell).copied().flatten()
    }

    pub fn place(&mut self, cell: CellIndex, mark: Mark) {
        self.cells[cell] = Some(mark);
    }

    pub fn clear(&mut self, cell: CellIndex) {
        self.cells[cell] = None;
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    pub fn empty_cells(&self) -> Vec<CellIndex> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.is_none().then_some(index))
            .collect()
    }

    pub fn mark_count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(mark)).count()
    }

    /// 返回第一条被占满的获胜线及其符号。
    pub fn winning_line(&self) -> Option<(Mark, [CellIndex; 3])> {
        for line in &WIN_LINES {
            let [a, b, c] = *line;
            if let Some(mark) = self.cells[a] {
                if self.cells[b] == Some(mark) && self.cells[c] == Some(mark) {
                    return Some((mark, *line));
                }
            }
        }
        None
    }

    /// 判定当前局面：连线获胜、满盘平局，否则对局继续。
    pub fn evaluate(&self) -> Outcome {
        if let Some((mark, _)) = self.winning_line() {
            return Outcome::Won { mark };
        }
        if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }
}

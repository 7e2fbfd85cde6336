pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{best_move, AiAgent, AiConfig, AiDecision, AiDifficulty};
pub use game::{
    Board, CellIndex, GameEvent, GameState, IntegrityError, Mark, Outcome, PlaceMarkAction,
    RuleEngine, RuleError, RuleResolution, ScoreBoard, WIN_LINES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn parse_difficulty(difficulty: Option<String>) -> AiDifficulty {
    difficulty
        .as_deref()
        .and_then(|value| AiDifficulty::from_str(value).ok())
        .unwrap_or(AiDifficulty::Hard)
}

fn make_agent(seed: Option<u64>) -> AiAgent {
    match seed {
        Some(seed) => AiAgent::with_seed(seed),
        None => AiAgent::new(),
    }
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<RuleResolution>,
}

#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_state_json: Option<String>) -> Result<GameEngine, JsValue> {
        let state = if let Some(json) = initial_state_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            GameState::new()
        };
        Ok(GameEngine { state })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    /// 在指定格子落下当前行棋方的符号，返回结算结果。
    pub fn place_mark(&mut self, cell: usize) -> Result<String, JsValue> {
        let action = PlaceMarkAction {
            mark: self.state.turn,
            cell,
        };
        let mut engine = RuleEngine::new();
        let events = engine
            .place_mark(&mut self.state, action)
            .map_err(to_js_error)?;
        make_resolution_json(RuleResolution::new(self.state.clone(), events))
    }

    pub fn reset(&mut self) -> Result<String, JsValue> {
        let events = RuleEngine::new().reset_board(&mut self.state);
        make_resolution_json(RuleResolution::new(self.state.clone(), events))
    }

    pub fn reset_scores(&mut self) -> Result<String, JsValue> {
        let events = RuleEngine::new().reset_scores(&mut self.state);
        make_resolution_json(RuleResolution::new(self.state.clone(), events))
    }

    /// 为当前行棋方计算并落下 AI 的一手棋。满盘时只返回决策，不落子。
    pub fn apply_ai_move(
        &mut self,
        difficulty: Option<String>,
        seed: Option<u64>,
    ) -> Result<String, JsValue> {
        let difficulty = parse_difficulty(difficulty);
        let mark = self.state.turn;
        let mut board = self.state.board;
        let mut agent = make_agent(seed);
        let decision = agent.decide(&mut board, mark, difficulty);

        let applied = if let Some(cell) = decision.cell {
            let mut engine = RuleEngine::new();
            let events = engine
                .place_mark(&mut self.state, PlaceMarkAction { mark, cell })
                .map_err(to_js_error)?;
            Some(RuleResolution::new(self.state.clone(), events))
        } else {
            None
        };

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 异步计算 AI 决策，可选延迟（对应前端落子前的等待动画）。不修改状态。
    pub fn think_ai(
        &self,
        difficulty: Option<String>,
        seed: Option<u64>,
        delay_ms: Option<u32>,
    ) -> Promise {
        let mut board = self.state.board;
        let mark = self.state.turn;
        let difficulty = parse_difficulty(difficulty);
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = make_agent(seed);
            let decision = agent.decide(&mut board, mark, difficulty);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 返回一个新开局的对局状态，方便前端初始化。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::new()).map_err(JsValue::from)
}

/// 判定棋盘：连线获胜、满盘平局或对局继续。
#[wasm_bindgen(js_name = "evaluateBoard")]
pub fn evaluate_board(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.evaluate()).map_err(JsValue::from)
}

/// 返回获胜连线（[mark, [a, b, c]]），没有则返回 null。
#[wasm_bindgen(js_name = "winningLine")]
pub fn winning_line(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.winning_line()).map_err(JsValue::from)
}

/// 按难度为指定符号计算一手棋，返回完整决策对象。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    mark: &str,
    difficulty: Option<String>,
    seed: Option<u64>,
) -> Result<JsValue, JsValue> {
    let mut board: Board = from_value(board).map_err(JsValue::from)?;
    let mark = Mark::from_str(mark).map_err(|_| JsValue::from_str("unknown mark"))?;
    let difficulty = parse_difficulty(difficulty);
    let mut agent = make_agent(seed);
    let decision = agent.decide(&mut board, mark, difficulty);
    to_value(&decision).map_err(JsValue::from)
}

/// 最优一手的格子索引，满盘返回 -1（与原前端 getAIMove 的约定一致）。
#[wasm_bindgen(js_name = "bestMoveIndex")]
pub fn best_move_index(board: JsValue, mark: &str) -> Result<i32, JsValue> {
    let mut board: Board = from_value(board).map_err(JsValue::from)?;
    let mark = Mark::from_str(mark).map_err(|_| JsValue::from_str("unknown mark"))?;
    Ok(best_move(&mut board, mark).map_or(-1, |cell| cell as i32))
}

/// 校验对局状态的棋盘与行棋方是否自洽。
#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}

use crate::state::{Action, ActionKind, PlayerIndex};
use thiserror::Error;

/// 规则引擎违反约定时的错误，均视为致命，不做重试
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("引擎返回了越界的玩家索引 {player}（玩家数 {num_players}）")]
    InconsistentPlayer { player: PlayerIndex, num_players: usize },
    #[error("引擎返回的收益向量长度为 {got}，应为 {expected}")]
    PayoffLength { got: usize, expected: usize },
    #[error("引擎返回的底牌数量为 {got}，应为 {expected}")]
    HandCount { got: usize, expected: usize },
    #[error("引擎拒绝了动作 {action}：{reason}")]
    Rejected { action: Action, reason: String },
    #[error("引擎给出了未声明的动作类型 {kind}")]
    UndeclaredAction { kind: ActionKind },
    #[error("引擎尚未发牌")]
    NotDealt,
    #[error("牌堆已空")]
    DeckExhausted,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("配置错误：{0}")]
    Configuration(String),
    #[error("玩家索引 {player} 越界（玩家数 {num_players}）")]
    OutOfRange { player: PlayerIndex, num_players: usize },
    #[error("玩家 {player} 不是当前行动者（当前为 {current:?}）")]
    OutOfTurn { player: PlayerIndex, current: Option<PlayerIndex> },
    #[error("动作 {0} 的金额与类型不匹配")]
    InvalidAction(Action),
    #[error("玩家 {player} 当前不能执行 {kind}")]
    IllegalAction { player: PlayerIndex, kind: ActionKind },
    #[error("第 {ply} 步的转移已经记录过")]
    DuplicateTransition { ply: usize },
    #[error("环境尚未 reset")]
    NotStarted,
    #[error("本局已经结束")]
    GameOver,
    #[error("引擎已失效，需要重新 reset")]
    EngineFailed,
    #[error("引擎故障：{0}")]
    Engine(#[from] EngineError),
}

pub type EnvResult<T> = Result<T, EnvError>;

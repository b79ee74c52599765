//! 规则引擎的约定。
//!
//! 发牌、合法性判断、比牌和结算都由实现了 [`GameEngine`] 的类型负责，
//! 环境控制层只通过这里定义的接口与之交互。

use crate::card::{Card, HoleCards};
use crate::error::EngineError;
use crate::state::{Action, ActionKind, BettingRound, PlayerIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub num_players: usize,
    // 为 None 时每局使用随机种子
    pub seed: Option<u64>,
    pub small_blind: u32,
    pub big_blind: u32,
    // 每个下注轮最多加注次数
    pub raise_cap: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            num_players: 2,
            seed: None,
            small_blind: 1,
            big_blind: 2,
            raise_cap: 4,
        }
    }
}

impl EngineConfig {
    pub fn with_players(num_players: usize) -> Self {
        EngineConfig { num_players, ..Default::default() }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(format!(
                "玩家数必须在 {} 到 {} 之间，实际为 {}",
                MIN_PLAYERS, MAX_PLAYERS, self.num_players
            ));
        }
        if self.small_blind == 0 || self.big_blind < self.small_blind {
            return Err(format!(
                "盲注设置无效：小盲 {}，大盲 {}",
                self.small_blind, self.big_blind
            ));
        }
        Ok(())
    }
}

/// 引擎每一步返回的公共局面，不含任何玩家的底牌
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub public_cards: Vec<Card>,
    pub round: BettingRound,
    pub pot: u32,
    pub stakes: Vec<u32>,
    /// 轮到行动的玩家此刻可选的动作
    pub legal_actions: BTreeSet<ActionKind>,
    /// 当前玩家加注后本轮下注总额；不能加注时为 None
    pub raise_to: Option<u32>,
}

/// 所有玩家的底牌，只在完全信息视图中使用
#[derive(Debug, Clone, PartialEq)]
pub struct PerfectInformation {
    pub hand_cards: Vec<HoleCards>,
}

pub trait GameEngine {
    fn create(config: &EngineConfig) -> Result<Self, EngineError>
    where
        Self: Sized;

    /// 发新的一手牌，返回初始局面和第一个行动者
    fn reset(&mut self) -> Result<(EngineState, PlayerIndex), EngineError>;

    /// 由当前行动者执行一个动作，返回新局面和下一个行动者
    fn step(&mut self, action: Action) -> Result<(EngineState, PlayerIndex), EngineError>;

    fn is_over(&self) -> bool;

    /// 每个玩家的收益；只在 `is_over()` 之后有意义
    fn payoffs(&self) -> Vec<f64>;

    fn perfect_information(&self) -> Result<PerfectInformation, EngineError>;

    /// 登记各座位的代理名称，引擎可以用于日志
    fn set_agents(&mut self, _names: &[String]) {}

    /// 该引擎可能出现的全部动作类型
    fn actions(&self) -> BTreeSet<ActionKind>;

    fn num_players(&self) -> usize;
}

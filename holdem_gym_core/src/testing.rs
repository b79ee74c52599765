//! 测试用的脚本化引擎：固定轮转、固定步数、固定收益。

use crate::card::{Card, Rank, Suit};
use crate::engine::*;
use crate::error::EngineError;
use crate::state::*;
use std::collections::BTreeSet;

/// 每个玩家行动两次后结束；0 号位赢下其余每人 1 个单位
#[derive(Debug)]
pub(crate) struct StubEngine {
    num_players: usize,
    length: usize,
    steps: usize,
    current: PlayerIndex,
    dealt: bool,
}

impl StubEngine {
    fn state(&self) -> EngineState {
        let legal_actions = if self.is_over() {
            BTreeSet::new()
        } else {
            BTreeSet::from([ActionKind::Call, ActionKind::Raise, ActionKind::Fold])
        };
        EngineState {
            public_cards: vec![],
            round: BettingRound::PreFlop,
            pot: self.steps as u32,
            stakes: vec![0; self.num_players],
            legal_actions,
            raise_to: Some(2),
        }
    }
}

impl GameEngine for StubEngine {
    fn create(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(StubEngine {
            num_players: config.num_players,
            length: config.num_players * 2,
            steps: 0,
            current: 0,
            dealt: false,
        })
    }

    fn reset(&mut self) -> Result<(EngineState, PlayerIndex), EngineError> {
        self.steps = 0;
        self.current = 0;
        self.dealt = true;
        Ok((self.state(), self.current))
    }

    fn step(&mut self, _action: Action) -> Result<(EngineState, PlayerIndex), EngineError> {
        self.steps += 1;
        self.current = (self.current + 1) % self.num_players;
        Ok((self.state(), self.current))
    }

    fn is_over(&self) -> bool {
        self.steps >= self.length
    }

    fn payoffs(&self) -> Vec<f64> {
        let n = self.num_players;
        (0..n).map(|i| if i == 0 { (n - 1) as f64 } else { -1.0 }).collect()
    }

    fn perfect_information(&self) -> Result<PerfectInformation, EngineError> {
        if !self.dealt {
            return Err(EngineError::NotDealt);
        }
        let hand_cards = (0..self.num_players)
            .map(|i| [Card::new(Rank::ALL[i], Suit::Spade), Card::new(Rank::ALL[i], Suit::Heart)])
            .collect();
        Ok(PerfectInformation { hand_cards })
    }

    fn actions(&self) -> BTreeSet<ActionKind> {
        BTreeSet::from([ActionKind::Check, ActionKind::Call, ActionKind::Raise, ActionKind::Fold])
    }

    fn num_players(&self) -> usize {
        self.num_players
    }
}

/// 第一步之后报告一个越界的行动者
#[derive(Debug)]
pub(crate) struct RogueEngine(StubEngine);

impl GameEngine for RogueEngine {
    fn create(config: &EngineConfig) -> Result<Self, EngineError> {
        StubEngine::create(config).map(RogueEngine)
    }

    fn reset(&mut self) -> Result<(EngineState, PlayerIndex), EngineError> {
        self.0.reset()
    }

    fn step(&mut self, action: Action) -> Result<(EngineState, PlayerIndex), EngineError> {
        let (state, _) = self.0.step(action)?;
        Ok((state, self.0.num_players + 3))
    }

    fn is_over(&self) -> bool {
        self.0.is_over()
    }

    fn payoffs(&self) -> Vec<f64> {
        self.0.payoffs()
    }

    fn perfect_information(&self) -> Result<PerfectInformation, EngineError> {
        self.0.perfect_information()
    }

    fn actions(&self) -> BTreeSet<ActionKind> {
        self.0.actions()
    }

    fn num_players(&self) -> usize {
        self.0.num_players
    }
}

/// 种子为奇数时拒绝创建，用来模拟第二局建局失败
#[derive(Debug)]
pub(crate) struct FlakyEngine(StubEngine);

impl GameEngine for FlakyEngine {
    fn create(config: &EngineConfig) -> Result<Self, EngineError> {
        match config.seed {
            Some(seed) if seed % 2 == 1 => Err(EngineError::NotDealt),
            _ => StubEngine::create(config).map(FlakyEngine),
        }
    }

    fn reset(&mut self) -> Result<(EngineState, PlayerIndex), EngineError> {
        self.0.reset()
    }

    fn step(&mut self, action: Action) -> Result<(EngineState, PlayerIndex), EngineError> {
        self.0.step(action)
    }

    fn is_over(&self) -> bool {
        self.0.is_over()
    }

    fn payoffs(&self) -> Vec<f64> {
        self.0.payoffs()
    }

    fn perfect_information(&self) -> Result<PerfectInformation, EngineError> {
        self.0.perfect_information()
    }

    fn actions(&self) -> BTreeSet<ActionKind> {
        self.0.actions()
    }

    fn num_players(&self) -> usize {
        self.0.num_players
    }
}

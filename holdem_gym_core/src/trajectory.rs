use crate::error::{EnvError, EnvResult};
use crate::state::{Action, GameState, PlayerIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 一次状态转移 (s, a, r, s', done)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    // 本局内第几步，从 0 开始
    pub ply: usize,
    pub state: GameState,
    pub action: Action,
    pub reward: f64,
    pub next_state: GameState,
    pub terminal: bool,
}

/// 每个玩家一条只追加的轨迹，只有环境 reset 时才清空
#[derive(Debug, Clone, Default)]
pub struct TrajectoryRecorder {
    trajectories: Vec<Vec<Transition>>,
    recorded_plies: HashSet<usize>,
}

impl TrajectoryRecorder {
    pub fn new(num_players: usize) -> Self {
        TrajectoryRecorder {
            trajectories: vec![Vec::new(); num_players],
            recorded_plies: HashSet::new(),
        }
    }

    /// 同一步只能记录一次
    pub fn record(&mut self, player: PlayerIndex, transition: Transition) -> EnvResult<()> {
        let num_players = self.trajectories.len();
        if player >= num_players {
            return Err(EnvError::OutOfRange { player, num_players });
        }
        if !self.recorded_plies.insert(transition.ply) {
            return Err(EnvError::DuplicateTransition { ply: transition.ply });
        }
        self.trajectories[player].push(transition);
        Ok(())
    }

    /// 下标即玩家索引
    pub fn history(&self) -> &[Vec<Transition>] {
        &self.trajectories
    }

    pub fn len_of(&self, player: PlayerIndex) -> EnvResult<usize> {
        self.trajectories
            .get(player)
            .map(Vec::len)
            .ok_or(EnvError::OutOfRange { player, num_players: self.trajectories.len() })
    }
}

use crate::agent::DecisionMode;
use crate::engine::GameEngine;
use crate::env::Environment;
use crate::error::{EnvError, EnvResult};
use crate::state::SessionId;
use serde::{Deserialize, Serialize};
use tracing::info;

/// 一局游戏的结果汇总
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub session: SessionId,
    pub payoffs: Vec<f64>,
    pub plies: usize,
}

/// 从当前局面一直打到结束：询问当前代理、执行一步、记录转移。
/// 调用前环境必须已经 reset。
pub fn play_episode<E: GameEngine>(env: &mut Environment<E>, mode: DecisionMode) -> EnvResult<Episode> {
    let session = env.session().ok_or(EnvError::NotStarted)?;
    let mut plies = 0;
    while !env.is_terminal() {
        let player = env.current_player().ok_or(EnvError::NotStarted)?;
        let action = env.decide(mode)?;
        let transition = env.step(action)?;
        env.record(player, transition)?;
        plies += 1;
    }
    let payoffs = (0..env.num_players())
        .map(|p| env.reward(p))
        .collect::<EnvResult<Vec<_>>>()?;
    Ok(Episode { session, payoffs, plies })
}

/// 用相同的代理连续打 `games` 局，返回每个玩家的平均收益
pub fn tournament<E: GameEngine>(env: &mut Environment<E>, games: usize) -> EnvResult<Vec<f64>> {
    let mut totals = vec![0.0; env.num_players()];
    for _ in 0..games {
        env.restart()?;
        let episode = play_episode(env, DecisionMode::Eval)?;
        for (total, payoff) in totals.iter_mut().zip(&episode.payoffs) {
            *total += payoff;
        }
    }
    if games > 0 {
        totals.iter_mut().for_each(|t| *t /= games as f64);
    }
    info!(games, averages = ?totals, "锦标赛结束");
    Ok(totals)
}

use std::error::Error;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

use holdem_gym_core::{DecisionMode, Environment, Episode, LimitHoldem, SessionId, play_episode};

mod config;

use config::RunnerConfig;

type BoxError = Box<dyn Error + Send + Sync>;

// 各局的结果，按会话归档；每局独占自己的环境和引擎
type Results = Arc<DashMap<SessionId, Episode>>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(RunnerConfig::load()?);
    info!(
        games = config.games,
        players = config.engine.num_players,
        mode = ?config.info_mode(),
        "开始模拟"
    );

    let results: Results = Arc::new(DashMap::new());
    let mut handles = Vec::with_capacity(config.games);
    for game in 0..config.games {
        let config = config.clone();
        let results = results.clone();
        handles.push(tokio::task::spawn_blocking(move || run_game(game as u64, &config, &results)));
    }
    for handle in handles {
        handle.await??;
    }

    summarize(&config, &results);
    Ok(())
}

/// 打完一局并把结果写入汇总表
fn run_game(game: u64, config: &RunnerConfig, results: &DashMap<SessionId, Episode>) -> Result<(), BoxError> {
    let mut engine_config = config.engine.clone();
    engine_config.seed = engine_config.seed.map(|s| s.wrapping_add(game.wrapping_mul(1_000)));

    let mut env = Environment::<LimitHoldem>::new(engine_config)?.with_mode(config.info_mode());
    env.reset(config.build_agents(game))?;
    let episode = play_episode(&mut env, DecisionMode::Train)?;
    info!(game, session = %episode.session, plies = episode.plies, payoffs = ?episode.payoffs, "牌局结束");

    if config.print_history {
        println!("{}", serde_json::to_string(env.history())?);
    }
    results.insert(episode.session, episode);
    Ok(())
}

fn summarize(config: &RunnerConfig, results: &DashMap<SessionId, Episode>) {
    let games = results.len();
    if games == 0 {
        info!("没有完成任何牌局");
        return;
    }
    let mut totals = vec![0.0; config.engine.num_players];
    let mut plies = 0;
    for entry in results.iter() {
        plies += entry.plies;
        for (total, payoff) in totals.iter_mut().zip(&entry.payoffs) {
            *total += payoff;
        }
    }
    for (seat, total) in totals.iter().enumerate() {
        info!(seat, average = total / games as f64, "平均收益（大盲）");
    }
    info!(games, plies, "模拟完成");
}

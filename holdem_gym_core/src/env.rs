use crate::agent::{AgentRegistry, DecisionMode};
use crate::engine::{EngineConfig, EngineState, GameEngine, PerfectInformation};
use crate::error::{EngineError, EnvError, EnvResult};
use crate::state::*;
use crate::trajectory::{TrajectoryRecorder, Transition};
use crate::view::{InfoMode, InformationView, Viewer, conceal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 环境所处阶段。`Terminal` 与 `Failed` 之后只能通过 reset 离开。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    AwaitingAction(PlayerIndex),
    Terminal,
    // 引擎违反约定，与控制器已不同步
    Failed,
}

/// 环境控制器
///
/// 独占一个规则引擎实例，是"轮到谁"和"是否结束"的唯一依据。
/// 负责发放合法动作、按信息模式过滤状态、计算奖励，并保存每个玩家的轨迹。
pub struct Environment<E: GameEngine> {
    config: EngineConfig,
    engine: Option<E>,
    session: Option<SessionId>,
    phase: Phase,
    view: InformationView,
    agents: AgentRegistry,
    recorder: TrajectoryRecorder,
    // 完整快照（所有底牌可见），对外只返回过滤后的副本
    snapshot: Option<GameState>,
    payoffs: Option<Vec<f64>>,
    ply: usize,
    games_started: u64,
}

impl<E: GameEngine> Environment<E> {
    pub fn new(config: EngineConfig) -> EnvResult<Self> {
        config.validate().map_err(EnvError::Configuration)?;
        Ok(Environment {
            config,
            engine: None,
            session: None,
            phase: Phase::NotStarted,
            view: InformationView::default(),
            agents: AgentRegistry::new(),
            recorder: TrajectoryRecorder::default(),
            snapshot: None,
            payoffs: None,
            ply: 0,
            games_started: 0,
        })
    }

    pub fn with_mode(mut self, mode: InfoMode) -> Self {
        self.view = InformationView::new(mode);
        self
    }

    pub fn enable_imperfect_information(&mut self) {
        self.view.enable_imperfect_information();
    }

    pub fn info_mode(&self) -> InfoMode {
        self.view.mode()
    }

    pub fn num_players(&self) -> usize {
        self.config.num_players
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn current_player(&self) -> Option<PlayerIndex> {
        self.snapshot.as_ref().map(|s| s.current_player)
    }

    /// 用新的一组代理开始一局
    ///
    /// 代理数量必须与玩家数一致，否则返回配置错误且不改变任何状态。
    /// 成功时清空轨迹、重建合法动作缓存并发牌。
    pub fn reset(&mut self, agents: AgentRegistry) -> EnvResult<(GameState, PlayerIndex)> {
        agents.validate(self.config.num_players).map_err(EnvError::Configuration)?;
        let started = self.start(&agents)?;
        self.agents = agents;
        Ok(started)
    }

    /// 沿用当前代理再开一局；失败时代理和上一局的状态都保持不变
    pub fn restart(&mut self) -> EnvResult<(GameState, PlayerIndex)> {
        self.agents.validate(self.config.num_players).map_err(EnvError::Configuration)?;
        let agents = std::mem::take(&mut self.agents);
        let started = self.start(&agents);
        self.agents = agents;
        started
    }

    /// 新建引擎并发牌，全部成功后才提交到 `self`
    fn start(&mut self, agents: &AgentRegistry) -> EnvResult<(GameState, PlayerIndex)> {
        let mut config = self.config.clone();
        config.seed = self.config.seed.map(|s| s.wrapping_add(self.games_started));

        let mut engine = E::create(&config)?;
        if engine.num_players() != config.num_players {
            return Err(EnvError::Configuration(format!(
                "引擎玩家数 {} 与配置 {} 不一致",
                engine.num_players(),
                config.num_players
            )));
        }
        engine.set_agents(&agents.names());
        let (engine_state, first) = engine.reset()?;
        let snapshot = self.compose(&engine, engine_state, first)?;

        let session = Uuid::new_v4();
        let payoffs = if engine.is_over() { Some(checked_payoffs(&engine)?) } else { None };
        info!(%session, players = config.num_players, agents = ?agents, first, "环境已重置");

        self.phase = if payoffs.is_some() { Phase::Terminal } else { Phase::AwaitingAction(first) };
        self.payoffs = payoffs;
        self.engine = Some(engine);
        self.recorder = TrajectoryRecorder::new(config.num_players);
        self.session = Some(session);
        self.ply = 0;
        self.games_started += 1;
        let observed = self.view.observe(&snapshot, Viewer::Player(first));
        self.snapshot = Some(snapshot);
        Ok((observed, first))
    }

    /// 以当前行动者为请求者返回快照；`perfect` 为 true 时公开所有底牌
    pub fn state(&self, perfect: bool) -> EnvResult<GameState> {
        let snapshot = self.snapshot()?;
        self.state_for(snapshot.current_player, perfect)
    }

    pub fn state_for(&self, player: PlayerIndex, perfect: bool) -> EnvResult<GameState> {
        self.check_range(player)?;
        let snapshot = self.snapshot()?;
        if perfect {
            Ok(snapshot.clone())
        } else {
            Ok(conceal(snapshot, Viewer::Player(player)))
        }
    }

    /// 指定玩家视角的快照，按环境的信息模式过滤
    pub fn player_state(&self, player: PlayerIndex) -> EnvResult<GameState> {
        self.check_range(player)?;
        Ok(self.view.observe(self.snapshot()?, Viewer::Player(player)))
    }

    /// 不含任何底牌的公共局面
    pub fn public_state(&self) -> EnvResult<GameState> {
        Ok(self.view.observe(self.snapshot()?, Viewer::Public))
    }

    pub fn legal_actions(&self, player: PlayerIndex) -> EnvResult<BTreeSet<ActionKind>> {
        self.check_range(player)?;
        Ok(self.snapshot()?.legal_actions[player].clone())
    }

    /// 引擎全部动作类型
    pub fn action_space(&self) -> EnvResult<BTreeSet<ActionKind>> {
        Ok(self.engine()?.actions())
    }

    /// 指定玩家提交动作；不是当前行动者时拒绝且不改变任何状态
    pub fn apply(&mut self, player: PlayerIndex, kind: ActionKind, amount: Option<u32>) -> EnvResult<Transition> {
        self.check_range(player)?;
        let current = self.acting_player()?;
        if current != player {
            warn!(player, current, %kind, "非当前行动者提交动作，已拒绝");
            return Err(EnvError::OutOfTurn { player, current: Some(current) });
        }
        self.step(Action::new(kind, amount))
    }

    /// 由当前行动者执行一步，返回完整的转移
    ///
    /// 转移中的两个状态都取行动者的视角并按信息模式过滤；
    /// 奖励在未结束时为 0，结束时为该玩家的收益。
    pub fn step(&mut self, action: Action) -> EnvResult<Transition> {
        let player = self.acting_player()?;
        if !action.is_well_formed() {
            return Err(EnvError::InvalidAction(action));
        }
        let prev = self.snapshot()?;
        if !prev.legal_actions[player].contains(&action.kind) {
            return Err(EnvError::IllegalAction { player, kind: action.kind });
        }
        let prev_state = self.view.observe(prev, Viewer::Player(player));

        let mut engine = self.engine.take().ok_or(EnvError::NotStarted)?;
        let advanced = self.advance(&mut engine, action);
        self.engine = Some(engine);
        let (snapshot, terminal, payoffs) = match advanced {
            Ok(advanced) => advanced,
            // 引擎在拒绝前不会改动状态，其余错误说明引擎已经和控制器脱节
            Err(err @ EnvError::Engine(EngineError::Rejected { .. })) => return Err(err),
            Err(err) => {
                error!(session = ?self.session, %err, "引擎违反约定，本局作废");
                self.phase = Phase::Failed;
                return Err(err);
            }
        };

        let next_state = self.view.observe(&snapshot, Viewer::Player(player));
        let reward = payoffs.as_ref().map_or(0.0, |p| p[player]);
        let transition = Transition {
            ply: self.ply,
            state: prev_state,
            action,
            reward,
            next_state,
            terminal,
        };

        debug!(ply = self.ply, player, %action, pot = snapshot.pot, next = snapshot.current_player, "执行动作");
        self.ply += 1;
        self.phase = if terminal { Phase::Terminal } else { Phase::AwaitingAction(snapshot.current_player) };
        self.snapshot = Some(snapshot);
        if let Some(p) = payoffs {
            info!(session = ?self.session, payoffs = ?p, plies = self.ply, "本局结束");
            self.payoffs = Some(p);
        }
        Ok(transition)
    }

    /// 未结束时恒为 0
    pub fn reward(&self, player: PlayerIndex) -> EnvResult<f64> {
        self.check_range(player)?;
        Ok(self.payoffs.as_ref().map_or(0.0, |p| p[player]))
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// 让当前行动者的代理给出动作，代理看到的状态按信息模式过滤
    pub fn decide(&mut self, mode: DecisionMode) -> EnvResult<Action> {
        let player = self.acting_player()?;
        let state = self.player_state(player)?;
        let agent = self
            .agents
            .get_mut(player)
            .ok_or_else(|| EnvError::Configuration(format!("座位 {} 没有代理", player)))?;
        Ok(agent.decide(&state, mode))
    }

    pub fn record(&mut self, player: PlayerIndex, transition: Transition) -> EnvResult<()> {
        self.recorder.record(player, transition)
    }

    pub fn history(&self) -> &[Vec<Transition>] {
        self.recorder.history()
    }

    // --- 内部 ---

    fn advance(&self, engine: &mut E, action: Action) -> EnvResult<(GameState, bool, Option<Vec<f64>>)> {
        let (engine_state, next) = engine.step(action)?;
        let snapshot = self.compose(engine, engine_state, next)?;
        let terminal = engine.is_over();
        let payoffs = if terminal { Some(checked_payoffs(engine)?) } else { None };
        Ok((snapshot, terminal, payoffs))
    }

    /// 把引擎的公共局面与所有底牌合成为完整快照，并校验引擎的返回值
    fn compose(&self, engine: &E, engine_state: EngineState, current: PlayerIndex) -> EnvResult<GameState> {
        let n = self.config.num_players;
        if current >= n {
            return Err(EngineError::InconsistentPlayer { player: current, num_players: n }.into());
        }
        let declared = engine.actions();
        if let Some(&kind) = engine_state.legal_actions.difference(&declared).next() {
            return Err(EngineError::UndeclaredAction { kind }.into());
        }
        let PerfectInformation { hand_cards } = engine.perfect_information()?;
        if hand_cards.len() != n {
            return Err(EngineError::HandCount { got: hand_cards.len(), expected: n }.into());
        }

        let terminal = engine.is_over();
        let mut legal_actions = vec![BTreeSet::new(); n];
        if !terminal {
            legal_actions[current] = engine_state.legal_actions;
        }
        Ok(GameState {
            hands: hand_cards.into_iter().map(Some).collect(),
            public_cards: engine_state.public_cards,
            round: engine_state.round,
            pot: engine_state.pot,
            stakes: engine_state.stakes,
            legal_actions,
            raise_to: if terminal { None } else { engine_state.raise_to },
            current_player: current,
        })
    }

    fn acting_player(&self) -> EnvResult<PlayerIndex> {
        match self.phase {
            Phase::NotStarted => Err(EnvError::NotStarted),
            Phase::Terminal => Err(EnvError::GameOver),
            Phase::Failed => Err(EnvError::EngineFailed),
            Phase::AwaitingAction(p) => Ok(p),
        }
    }

    fn snapshot(&self) -> EnvResult<&GameState> {
        self.snapshot.as_ref().ok_or(EnvError::NotStarted)
    }

    fn engine(&self) -> EnvResult<&E> {
        self.engine.as_ref().ok_or(EnvError::NotStarted)
    }

    fn check_range(&self, player: PlayerIndex) -> EnvResult<()> {
        let num_players = self.config.num_players;
        if player >= num_players {
            return Err(EnvError::OutOfRange { player, num_players });
        }
        Ok(())
    }
}

fn checked_payoffs<E: GameEngine>(engine: &E) -> EnvResult<Vec<f64>> {
    let payoffs = engine.payoffs();
    let expected = engine.num_players();
    if payoffs.len() != expected {
        return Err(EngineError::PayoffLength { got: payoffs.len(), expected }.into());
    }
    Ok(payoffs)
}

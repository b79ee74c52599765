use crate::state::{Action, ActionKind, GameState, PlayerIndex};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use std::collections::BTreeMap;
use std::fmt;

/// 训练时允许探索，评估时应给出确定性更强的决策
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionMode {
    #[default]
    Train,
    Eval,
}

/// 决策者：给定状态，返回动作。代理可以有自己的内部状态，环境不会读取它。
pub trait Agent: Send {
    fn decide(&mut self, state: &GameState, mode: DecisionMode) -> Action;

    fn name(&self) -> &str {
        "agent"
    }
}

/// 把选中的动作类型补全为完整动作（加注需带上金额）
pub fn complete_action(kind: ActionKind, state: &GameState) -> Action {
    match kind {
        ActionKind::Raise | ActionKind::AllIn => Action::new(kind, state.raise_to),
        _ => Action::new(kind, None),
    }
}

/// 在合法动作中均匀随机选择
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        RandomAgent { rng: StdRng::from_rng(&mut rand::rng()) }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomAgent { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn decide(&mut self, state: &GameState, _mode: DecisionMode) -> Action {
        let kind = state
            .current_legal_actions()
            .iter()
            .copied()
            .choose(&mut self.rng)
            .unwrap_or(ActionKind::Fold);
        complete_action(kind, state)
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// 只过牌或跟注，从不弃牌也从不加注
#[derive(Debug, Default, Clone, Copy)]
pub struct CallingAgent;

impl Agent for CallingAgent {
    fn decide(&mut self, state: &GameState, _mode: DecisionMode) -> Action {
        if state.current_legal_actions().contains(&ActionKind::Check) {
            Action::check()
        } else {
            Action::call()
        }
    }

    fn name(&self) -> &str {
        "calling"
    }
}

/// 玩家索引到代理的映射
#[derive(Default)]
pub struct AgentRegistry {
    agents: BTreeMap<PlayerIndex, Box<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, player: PlayerIndex, agent: impl Agent + 'static) -> Self {
        self.insert(player, Box::new(agent));
        self
    }

    /// 返回被替换的旧代理
    pub fn insert(&mut self, player: PlayerIndex, agent: Box<dyn Agent>) -> Option<Box<dyn Agent>> {
        self.agents.insert(player, agent)
    }

    pub fn get_mut(&mut self, player: PlayerIndex) -> Option<&mut (dyn Agent + 'static)> {
        self.agents.get_mut(&player).map(|a| a.as_mut())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// 每个座位恰好一个代理，索引连续覆盖 [0, num_players)
    pub fn validate(&self, num_players: usize) -> Result<(), String> {
        if self.agents.len() != num_players {
            return Err(format!("代理数量 {} 与玩家数 {} 不一致", self.agents.len(), num_players));
        }
        if let Some(&stray) = self.agents.keys().find(|&&p| p >= num_players) {
            return Err(format!("代理注册在不存在的座位 {}", stray));
        }
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.agents.values().map(|a| a.name().to_string()).collect()
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.agents.iter().map(|(p, a)| (p, a.name())))
            .finish()
    }
}

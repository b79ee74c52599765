use holdem_gym_core::{AgentRegistry, CallingAgent, EngineConfig, InfoMode, RandomAgent};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 配置文件路径所在的环境变量
pub const CONFIG_ENV: &str = "HOLDEM_GYM_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("配置文件格式错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("配置无效: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Random,
    Calling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub engine: EngineConfig,
    // 并行进行的独立牌局数
    pub games: usize,
    pub imperfect_information: bool,
    // 为空时所有座位都使用随机代理
    pub agents: Vec<AgentKind>,
    // 把每局轨迹以 JSON 打印到标准输出
    pub print_history: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            engine: EngineConfig::default(),
            games: 4,
            imperfect_information: false,
            agents: Vec::new(),
            print_history: false,
        }
    }
}

impl RunnerConfig {
    /// 未设置环境变量时使用默认配置
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate().map_err(ConfigError::Invalid)?;
        if !self.agents.is_empty() && self.agents.len() != self.engine.num_players {
            return Err(ConfigError::Invalid(format!(
                "配置了 {} 个代理，但玩家数为 {}",
                self.agents.len(),
                self.engine.num_players
            )));
        }
        Ok(())
    }

    pub fn info_mode(&self) -> InfoMode {
        if self.imperfect_information { InfoMode::Imperfect } else { InfoMode::Perfect }
    }

    /// 为第 `game` 局构造代理，随机代理的种子随局号变化
    pub fn build_agents(&self, game: u64) -> AgentRegistry {
        let base = self.engine.seed.unwrap_or(0).wrapping_add(game.wrapping_mul(1_000));
        let mut registry = AgentRegistry::new();
        for seat in 0..self.engine.num_players {
            let kind = self.agents.get(seat).copied().unwrap_or(AgentKind::Random);
            registry = match kind {
                AgentKind::Random if self.engine.seed.is_some() => {
                    registry.with(seat, RandomAgent::seeded(base + seat as u64))
                }
                AgentKind::Random => registry.with(seat, RandomAgent::new()),
                AgentKind::Calling => registry.with(seat, CallingAgent),
            };
        }
        registry
    }
}

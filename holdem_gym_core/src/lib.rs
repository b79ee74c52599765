//! # 限注德州扑克强化学习环境
//!
//! 这个 crate 位于规则引擎与决策代理之间，负责环境控制层：
//! 轮次调度、合法动作发放、完全/不完全信息视图、
//! 每个玩家的轨迹记录，以及奖励与终局判定。
//! 规则本身通过 [`GameEngine`] 接入，内置了一个固定限注引擎 [`LimitHoldem`]。

mod agent;
mod card;
mod driver;
mod engine;
mod env;
mod error;
mod limit;
mod state;
#[cfg(test)]
mod testing;
mod trajectory;
mod view;

pub use agent::*;

pub use card::*;

pub use driver::*;

pub use engine::*;

pub use env::*;

pub use error::*;

pub use limit::*;

pub use state::*;

pub use trajectory::*;

pub use view::*;

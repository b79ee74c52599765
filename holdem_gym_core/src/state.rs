use crate::card::{Card, HoleCards};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// 玩家索引，取值范围 [0, N)
pub type PlayerIndex = usize;

/// 每次 reset 生成一个新的会话标识，用于日志和结果汇总
pub type SessionId = Uuid;

/// 下注轮
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BettingRound {
    PreFlop,
    Flop,
    Turn,
    River,
}

impl BettingRound {
    pub fn next(self) -> Option<BettingRound> {
        match self {
            BettingRound::PreFlop => Some(BettingRound::Flop),
            BettingRound::Flop => Some(BettingRound::Turn),
            BettingRound::Turn => Some(BettingRound::River),
            BettingRound::River => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Check,
    Call,
    Raise,
    Fold,
    AllIn,
}

impl ActionKind {
    /// Raise 与 AllIn 必须携带金额
    pub fn requires_amount(self) -> bool {
        matches!(self, ActionKind::Raise | ActionKind::AllIn)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Raise => "raise",
            ActionKind::Fold => "fold",
            ActionKind::AllIn => "all-in",
        })
    }
}

/// 玩家动作：类型加上可选金额（下注后的总额）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Action {
    pub kind: ActionKind,
    pub amount: Option<u32>,
}

impl Action {
    pub fn new(kind: ActionKind, amount: Option<u32>) -> Action {
        Action { kind, amount }
    }

    pub fn check() -> Action {
        Action::new(ActionKind::Check, None)
    }

    pub fn call() -> Action {
        Action::new(ActionKind::Call, None)
    }

    pub fn fold() -> Action {
        Action::new(ActionKind::Fold, None)
    }

    pub fn raise(amount: u32) -> Action {
        Action::new(ActionKind::Raise, Some(amount))
    }

    /// 金额是否与动作类型匹配
    pub fn is_well_formed(&self) -> bool {
        self.kind.requires_amount() == self.amount.is_some()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(f, "{} {}", self.kind, amount),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// 某一时刻的只读快照，每次查询重新生成，不会被原地修改。
///
/// `hands[i]` 为 `None` 表示该玩家的底牌对请求者不可见。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub hands: Vec<Option<HoleCards>>,
    pub public_cards: Vec<Card>,
    pub round: BettingRound,
    pub pot: u32,
    // 本局各玩家已投入的筹码
    pub stakes: Vec<u32>,
    pub legal_actions: Vec<BTreeSet<ActionKind>>,
    // 当前行动者加注后的本轮下注总额
    pub raise_to: Option<u32>,
    pub current_player: PlayerIndex,
}

impl GameState {
    pub fn num_players(&self) -> usize {
        self.hands.len()
    }

    pub fn hand_of(&self, player: PlayerIndex) -> Option<&HoleCards> {
        self.hands.get(player).and_then(Option::as_ref)
    }

    /// 当前行动者可选的动作类型
    pub fn current_legal_actions(&self) -> &BTreeSet<ActionKind> {
        static NONE: BTreeSet<ActionKind> = BTreeSet::new();
        self.legal_actions.get(self.current_player).unwrap_or(&NONE)
    }

    pub fn visible_hands(&self) -> usize {
        self.hands.iter().filter(|h| h.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_required_only_for_raise_and_all_in() {
        assert!(Action::raise(4).is_well_formed());
        assert!(Action::call().is_well_formed());
        assert!(!Action::new(ActionKind::Raise, None).is_well_formed());
        assert!(!Action::new(ActionKind::AllIn, None).is_well_formed());
        assert!(!Action::new(ActionKind::Fold, Some(3)).is_well_formed());
    }

    #[test]
    fn test_round_order() {
        assert_eq!(BettingRound::PreFlop.next(), Some(BettingRound::Flop));
        assert_eq!(BettingRound::River.next(), None);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::raise(8).to_string(), "raise 8");
        assert_eq!(Action::check().to_string(), "check");
    }
}

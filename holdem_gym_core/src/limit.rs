use crate::card::*;
use crate::engine::*;
use crate::error::EngineError;
use crate::state::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;
use tracing::debug;

/// 固定限注德州扑克引擎
///
/// - 0 号位小盲，1 号位大盲；按钮位是最后一个座位。
///   单挑时按钮就是小盲：0 号位翻牌前先行动，翻牌后由 1 号位先行动。
/// - 翻牌前和翻牌圈每次加注一个大盲，转牌和河牌圈加注两个大盲。
/// - 每轮最多加注 `raise_cap` 次；筹码不设上限，因此没有全下。
/// - 收益以大盲为单位：赢得的筹码减去投入的筹码。
#[derive(Debug)]
pub struct LimitHoldem {
    config: EngineConfig,
    rng: StdRng,
    seat_names: Vec<String>,
    deck: Deck,
    hands: Vec<HoleCards>,
    public_cards: Vec<Card>,
    round: BettingRound,
    // 本局累计投入
    stakes: Vec<u32>,
    // 本轮投入
    round_bets: Vec<u32>,
    folded: Vec<bool>,
    raises_this_round: u8,
    // 本轮还需行动的人数，归零即本轮结束
    pending: usize,
    current: PlayerIndex,
    winnings: Option<Vec<u32>>,
}

impl GameEngine for LimitHoldem {
    fn create(config: &EngineConfig) -> Result<Self, EngineError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let n = config.num_players;
        Ok(LimitHoldem {
            config: config.clone(),
            rng,
            seat_names: (0..n).map(|i| format!("seat-{}", i)).collect(),
            deck: Deck::ordered(),
            hands: Vec::new(),
            public_cards: Vec::new(),
            round: BettingRound::PreFlop,
            stakes: vec![0; n],
            round_bets: vec![0; n],
            folded: vec![false; n],
            raises_this_round: 0,
            pending: 0,
            current: 0,
            winnings: None,
        })
    }

    /// 开始新的一手牌：洗牌、发底牌、下盲注、确定第一个行动者
    fn reset(&mut self) -> Result<(EngineState, PlayerIndex), EngineError> {
        let n = self.config.num_players;
        self.deck = Deck::shuffled(&mut self.rng);
        self.public_cards.clear();
        self.round = BettingRound::PreFlop;
        self.stakes = vec![0; n];
        self.round_bets = vec![0; n];
        self.folded = vec![false; n];
        self.raises_this_round = 0;
        self.winnings = None;

        // 与线下发牌一致：每人先发一张，再发第二张
        let mut firsts = Vec::with_capacity(n);
        for _ in 0..n {
            firsts.push(self.draw()?);
        }
        self.hands = Vec::with_capacity(n);
        for first in firsts {
            let second = self.draw()?;
            self.hands.push([first, second]);
        }

        let (sb, bb) = (0, 1);
        self.put_chips(sb, self.config.small_blind);
        self.put_chips(bb, self.config.big_blind);

        // 翻牌前所有人（包括大盲）都要行动一次
        self.pending = n;
        self.current = 2 % n;
        debug!(players = ?self.seat_names, first = self.current, "新的一手牌");
        Ok((self.public_state(), self.current))
    }

    /// 处理当前玩家的动作
    ///
    /// 验证合法性后更新筹码与弃牌状态；本轮结束时推进到下一轮，
    /// 只剩一名玩家或河牌圈结束时结算。
    fn step(&mut self, action: Action) -> Result<(EngineState, PlayerIndex), EngineError> {
        if self.hands.is_empty() {
            return Err(EngineError::NotDealt);
        }
        if self.is_over() {
            return Err(reject(action, "本局已经结束"));
        }
        let player = self.current;
        let legal = self.legal_actions_of(player);
        if !legal.contains(&action.kind) {
            return Err(reject(action, "当前不允许该动作"));
        }

        let max_bet = self.max_round_bet();
        match action.kind {
            ActionKind::Fold => {
                self.folded[player] = true;
            }
            ActionKind::Check => {}
            ActionKind::Call => {
                self.put_chips(player, max_bet - self.round_bets[player]);
            }
            ActionKind::Raise => {
                let target = max_bet + self.raise_size();
                if action.amount != Some(target) {
                    return Err(reject(action, &format!("限注加注后总额必须为 {}", target)));
                }
                self.put_chips(player, target - self.round_bets[player]);
                self.raises_this_round += 1;
                // 加注后其他未弃牌玩家都需重新行动
                self.pending = self.active_count();
            }
            ActionKind::AllIn => return Err(reject(action, "限注规则没有全下")),
        }
        self.pending = self.pending.saturating_sub(1);
        debug!(seat = %self.seat_names[player], %action, pot = self.pot(), "玩家行动");

        let survivors = self.survivors();
        if survivors.len() == 1 {
            self.distribute_pot(&survivors);
            return Ok((self.public_state(), self.current));
        }

        if self.pending == 0 {
            self.advance_to_next_round()?;
        } else {
            self.current = self.next_active_after(player);
        }
        Ok((self.public_state(), self.current))
    }

    fn is_over(&self) -> bool {
        self.winnings.is_some()
    }

    fn payoffs(&self) -> Vec<f64> {
        let bb = self.config.big_blind as f64;
        match &self.winnings {
            Some(won) => won
                .iter()
                .zip(&self.stakes)
                .map(|(&w, &s)| (w as f64 - s as f64) / bb)
                .collect(),
            None => vec![0.0; self.config.num_players],
        }
    }

    fn perfect_information(&self) -> Result<PerfectInformation, EngineError> {
        if self.hands.is_empty() {
            return Err(EngineError::NotDealt);
        }
        Ok(PerfectInformation { hand_cards: self.hands.clone() })
    }

    fn set_agents(&mut self, names: &[String]) {
        for (slot, name) in self.seat_names.iter_mut().zip(names) {
            *slot = name.clone();
        }
    }

    fn actions(&self) -> BTreeSet<ActionKind> {
        [ActionKind::Call, ActionKind::Raise, ActionKind::Fold, ActionKind::Check].into()
    }

    fn num_players(&self) -> usize {
        self.config.num_players
    }
}

fn reject(action: Action, reason: &str) -> EngineError {
    EngineError::Rejected { action, reason: reason.to_string() }
}

// --- 辅助逻辑 ---

impl LimitHoldem {
    fn draw(&mut self) -> Result<Card, EngineError> {
        self.deck.deal().ok_or(EngineError::DeckExhausted)
    }

    fn put_chips(&mut self, player: PlayerIndex, amount: u32) {
        self.round_bets[player] += amount;
        self.stakes[player] += amount;
    }

    fn pot(&self) -> u32 {
        self.stakes.iter().sum()
    }

    fn max_round_bet(&self) -> u32 {
        self.round_bets.iter().copied().max().unwrap_or(0)
    }

    fn raise_size(&self) -> u32 {
        match self.round {
            BettingRound::PreFlop | BettingRound::Flop => self.config.big_blind,
            BettingRound::Turn | BettingRound::River => self.config.big_blind * 2,
        }
    }

    fn active_count(&self) -> usize {
        self.folded.iter().filter(|f| !**f).count()
    }

    fn survivors(&self) -> Vec<PlayerIndex> {
        (0..self.config.num_players).filter(|&i| !self.folded[i]).collect()
    }

    fn button(&self) -> PlayerIndex {
        match self.config.num_players {
            2 => 0,
            n => n - 1,
        }
    }

    fn next_active_after(&self, player: PlayerIndex) -> PlayerIndex {
        let n = self.config.num_players;
        (1..=n)
            .map(|offset| (player + offset) % n)
            .find(|&i| !self.folded[i])
            .unwrap_or(player)
    }

    fn legal_actions_of(&self, player: PlayerIndex) -> BTreeSet<ActionKind> {
        let mut legal = BTreeSet::from([ActionKind::Fold]);
        if self.round_bets[player] == self.max_round_bet() {
            legal.insert(ActionKind::Check);
        } else {
            legal.insert(ActionKind::Call);
        }
        if self.raises_this_round < self.config.raise_cap {
            legal.insert(ActionKind::Raise);
        }
        legal
    }

    /// 一轮下注结束后：发公共牌、重置本轮下注，
    /// 由按钮后第一个未弃牌玩家开始；河牌圈结束则摊牌。
    fn advance_to_next_round(&mut self) -> Result<(), EngineError> {
        let Some(next) = self.round.next() else {
            self.handle_showdown();
            return Ok(());
        };
        let count = if next == BettingRound::Flop { 3 } else { 1 };
        self.draw()?; // 烧牌
        for _ in 0..count {
            let card = self.draw()?;
            self.public_cards.push(card);
        }

        self.round = next;
        self.round_bets.iter_mut().for_each(|bet| *bet = 0);
        self.raises_this_round = 0;
        self.pending = self.active_count();
        self.current = self.next_active_after(self.button());
        debug!(round = ?self.round, board = ?self.public_cards, "进入下一轮");
        Ok(())
    }

    fn handle_showdown(&mut self) {
        let mut best: Option<HandRank> = None;
        let mut winners = Vec::new();
        for player in self.survivors() {
            let mut cards = self.public_cards.clone();
            cards.extend_from_slice(&self.hands[player]);
            let Some(rank) = find_best_hand(&cards) else { continue };
            match best.as_ref().map(|b| rank.cmp(b)) {
                None | Some(std::cmp::Ordering::Greater) => {
                    best = Some(rank);
                    winners = vec![player];
                }
                Some(std::cmp::Ordering::Equal) => winners.push(player),
                Some(std::cmp::Ordering::Less) => {}
            }
        }
        self.distribute_pot(&winners);
    }

    /// 平分奖池，零头给座位靠前的赢家
    fn distribute_pot(&mut self, winners: &[PlayerIndex]) {
        let mut won = vec![0; self.config.num_players];
        if !winners.is_empty() {
            let pot = self.pot();
            let share = pot / winners.len() as u32;
            let remainder = pot % winners.len() as u32;
            for (i, &w) in winners.iter().enumerate() {
                won[w] = share + if i == 0 { remainder } else { 0 };
            }
        }
        debug!(?winners, pot = self.pot(), "本局结算");
        self.winnings = Some(won);
    }

    fn public_state(&self) -> EngineState {
        let legal_actions = if self.is_over() {
            BTreeSet::new()
        } else {
            self.legal_actions_of(self.current)
        };
        let raise_to = legal_actions
            .contains(&ActionKind::Raise)
            .then(|| self.max_round_bet() + self.raise_size());
        EngineState {
            public_cards: self.public_cards.clone(),
            round: self.round,
            pot: self.pot(),
            stakes: self.stakes.clone(),
            legal_actions,
            raise_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(players: usize) -> LimitHoldem {
        let config = EngineConfig { seed: Some(11), ..EngineConfig::with_players(players) };
        LimitHoldem::create(&config).unwrap()
    }

    fn total(payoffs: &[f64]) -> f64 {
        payoffs.iter().sum()
    }

    #[test]
    fn test_reset_posts_blinds() {
        let mut e = engine(4);
        let (state, first) = e.reset().unwrap();
        assert_eq!(state.pot, 3);
        assert_eq!(state.stakes, vec![1, 2, 0, 0]);
        assert_eq!(first, 2);
        assert_eq!(state.round, BettingRound::PreFlop);
        assert!(state.public_cards.is_empty());
        assert_eq!(state.raise_to, Some(4));
    }

    #[test]
    fn test_heads_up_small_blind_acts_first() {
        let mut e = engine(2);
        let (state, first) = e.reset().unwrap();
        assert_eq!(first, 0);
        assert!(state.legal_actions.contains(&ActionKind::Call));
        assert!(!state.legal_actions.contains(&ActionKind::Check));
    }

    #[test]
    fn test_fold_ends_hand() {
        let mut e = engine(2);
        e.reset().unwrap();
        e.step(Action::fold()).unwrap();
        assert!(e.is_over());
        assert_eq!(e.payoffs(), vec![-0.5, 0.5]);
    }

    #[test]
    fn test_call_then_check_deals_flop() {
        let mut e = engine(2);
        e.reset().unwrap();
        let (_, next) = e.step(Action::call()).unwrap();
        assert_eq!(next, 1);
        let (state, next) = e.step(Action::check()).unwrap();
        assert_eq!(state.round, BettingRound::Flop);
        assert_eq!(state.public_cards.len(), 3);
        assert_eq!(state.pot, 4);
        assert_eq!(next, 1);
    }

    #[test]
    fn test_heads_up_big_blind_opens_every_later_street() {
        let mut e = engine(2);
        e.reset().unwrap();
        e.step(Action::call()).unwrap();
        let (mut state, mut next) = e.step(Action::check()).unwrap();
        while !e.is_over() {
            assert_eq!(next, 1, "{:?}", state.round);
            e.step(Action::check()).unwrap();
            (state, next) = e.step(Action::check()).unwrap();
        }
        assert_eq!(state.public_cards.len(), 5);
    }

    #[test]
    fn test_seat_after_button_opens_flop() {
        let mut e = engine(3);
        let (_, first) = e.reset().unwrap();
        assert_eq!(first, 2);
        e.step(Action::call()).unwrap();
        e.step(Action::call()).unwrap();
        let (state, next) = e.step(Action::check()).unwrap();
        assert_eq!(state.round, BettingRound::Flop);
        assert_eq!(next, 0);
    }

    #[test]
    fn test_raise_amount_is_fixed() {
        let mut e = engine(2);
        e.reset().unwrap();
        let err = e.step(Action::raise(10)).unwrap_err();
        assert!(matches!(err, EngineError::Rejected { .. }));
        let (state, next) = e.step(Action::raise(4)).unwrap();
        assert_eq!(next, 1);
        assert_eq!(state.stakes, vec![4, 2]);
    }

    #[test]
    fn test_raise_cap_removes_raise() {
        let mut e = engine(2);
        let (mut state, _) = e.reset().unwrap();
        for _ in 0..4 {
            let target = state.raise_to.unwrap();
            state = e.step(Action::raise(target)).unwrap().0;
        }
        assert!(!state.legal_actions.contains(&ActionKind::Raise));
        assert_eq!(state.raise_to, None);
    }

    #[test]
    fn test_check_down_to_showdown_is_zero_sum() {
        let mut e = engine(3);
        let (mut state, _) = e.reset().unwrap();
        while !e.is_over() {
            let action = if state.legal_actions.contains(&ActionKind::Check) {
                Action::check()
            } else {
                Action::call()
            };
            state = e.step(action).unwrap().0;
        }
        assert_eq!(state.public_cards.len(), 5);
        assert!(total(&e.payoffs()).abs() < 1e-9);
        assert!(e.step(Action::check()).is_err());
    }

    #[test]
    fn test_step_before_reset() {
        let mut e = engine(2);
        assert_eq!(e.step(Action::call()).unwrap_err(), EngineError::NotDealt);
        assert!(e.perfect_information().is_err());
    }
}

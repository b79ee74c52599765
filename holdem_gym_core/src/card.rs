use rand::Rng;
use rand::prelude::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 花色
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Heart,
    Club,
    Diamond,
}

/// 点数，Ace 默认最大；A-2-3-4-5 顺子在评估时单独处理
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven,
        Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Club, Suit::Diamond];
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

/// 一名玩家的两张底牌
pub type HoleCards = [Card; 2];

/// 牌型等级，变体从小到大排列，直接用 `Ord` 比较；
/// 变体内部携带比较所需的踢脚牌。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Serialize, Deserialize)]
pub enum HandRank {
    HighCard(Rank, Rank, Rank, Rank, Rank),
    OnePair(Rank, Rank, Rank, Rank),
    TwoPair(Rank, Rank, Rank),
    ThreeOfAKind(Rank, Rank, Rank),
    Straight(Rank),
    Flush(Rank, Rank, Rank, Rank, Rank),
    FullHouse(Rank, Rank),
    FourOfAKind(Rank, Rank),
    StraightFlush(Rank),
    RoyalFlush,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Suit::Spade => "♠",
            Suit::Heart => "♥",
            Suit::Club => "♣",
            Suit::Diamond => "♦",
        })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

// --- 牌堆 ---

/// 一副洗好的牌，从末尾发牌
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// 按花色、点数顺序生成完整的 52 张牌
    pub fn ordered() -> Deck {
        let mut cards = Vec::with_capacity(52);
        for &suit in &Suit::ALL {
            for &rank in &Rank::ALL {
                cards.push(Card { rank, suit });
            }
        }
        Deck { cards }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Deck {
        let mut deck = Deck::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

// --- 牌型评估 ---

/// 从 5 到 7 张牌中找出最优的 5 张组合。
/// 牌数不在该范围内时返回 `None`。
pub fn find_best_hand(all_cards: &[Card]) -> Option<HandRank> {
    if !(5..=7).contains(&all_cards.len()) {
        return None;
    }
    // 穷举所有 5 张组合；贪心删牌可能拆散顺子或同花
    get_combinations(all_cards, 5)
        .into_iter()
        .map(|hand| evaluate_5_card_hand(&hand))
        .max()
}

fn evaluate_5_card_hand(hand: &[Card]) -> HandRank {
    let mut cards = hand.to_vec();
    cards.sort_by(|a, b| b.rank.cmp(&a.rank));
    let ranks: Vec<Rank> = cards.iter().map(|c| c.rank).collect();

    let is_flush = cards.windows(2).all(|w| w[0].suit == w[1].suit);
    let is_wheel = ranks == [Rank::Ace, Rank::Five, Rank::Four, Rank::Three, Rank::Two];
    let is_straight = is_wheel || ranks.windows(2).all(|w| w[0] as u8 == w[1] as u8 + 1);

    // A-5 顺子里 5 是最大牌
    let high_card = if is_wheel { Rank::Five } else { ranks[0] };

    if is_straight && is_flush {
        return if high_card == Rank::Ace {
            HandRank::RoyalFlush
        } else {
            HandRank::StraightFlush(high_card)
        };
    }

    let mut counts: HashMap<Rank, u8> = HashMap::new();
    for rank in &ranks {
        *counts.entry(*rank).or_insert(0) += 1;
    }

    // (出现次数, 点数)，先按次数再按点数降序
    let mut grouped: Vec<(u8, Rank)> = counts.into_iter().map(|(r, c)| (c, r)).collect();
    grouped.sort_by(|a, b| b.cmp(a));

    match grouped[0].0 {
        4 => HandRank::FourOfAKind(grouped[0].1, grouped[1].1),
        3 if grouped[1].0 == 2 => HandRank::FullHouse(grouped[0].1, grouped[1].1),
        3 => HandRank::ThreeOfAKind(grouped[0].1, grouped[1].1, grouped[2].1),
        2 if grouped[1].0 == 2 => HandRank::TwoPair(grouped[0].1, grouped[1].1, grouped[2].1),
        2 => HandRank::OnePair(grouped[0].1, grouped[1].1, grouped[2].1, grouped[3].1),
        _ if is_flush => HandRank::Flush(ranks[0], ranks[1], ranks[2], ranks[3], ranks[4]),
        _ if is_straight => HandRank::Straight(high_card),
        _ => HandRank::HighCard(ranks[0], ranks[1], ranks[2], ranks[3], ranks[4]),
    }
}

fn get_combinations<T: Clone>(data: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![vec![]];
    }
    if data.len() < k {
        return vec![];
    }

    let (first, rest) = data.split_at(1);
    let mut result = get_combinations(rest, k - 1);
    for combo in &mut result {
        combo.insert(0, first[0].clone());
    }
    if data.len() > k {
        result.extend(get_combinations(rest, k));
    }
    result
}

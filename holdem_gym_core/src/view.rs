use crate::state::{GameState, PlayerIndex};
use serde::{Deserialize, Serialize};

/// 信息模式：完全信息下所有底牌可见，不完全信息下只能看到自己的底牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InfoMode {
    #[default]
    Perfect,
    Imperfect,
}

/// 谁在看这个快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Player(PlayerIndex),
    // 旁观者，看不到任何底牌
    Public,
}

/// 按信息模式过滤快照。除模式外不持有任何状态。
#[derive(Debug, Clone, Copy, Default)]
pub struct InformationView {
    mode: InfoMode,
}

impl InformationView {
    pub fn new(mode: InfoMode) -> Self {
        InformationView { mode }
    }

    pub fn mode(&self) -> InfoMode {
        self.mode
    }

    pub fn enable_imperfect_information(&mut self) {
        self.mode = InfoMode::Imperfect;
    }

    pub fn observe(&self, full: &GameState, viewer: Viewer) -> GameState {
        match (self.mode, viewer) {
            (_, Viewer::Public) | (InfoMode::Imperfect, _) => conceal(full, viewer),
            (InfoMode::Perfect, Viewer::Player(_)) => full.clone(),
        }
    }
}

/// 把不属于 `viewer` 的底牌替换为未知
pub fn conceal(full: &GameState, viewer: Viewer) -> GameState {
    let mut state = full.clone();
    for (i, hand) in state.hands.iter_mut().enumerate() {
        if viewer != Viewer::Player(i) {
            *hand = None;
        }
    }
    state
}

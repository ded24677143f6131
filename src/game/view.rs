use super::event::CardView;
use crate::rules::Declaration;
use crate::table::SeatStatus;
use crate::Chips;
use crate::PlayerId;
use crate::Position;
use std::collections::BTreeMap;

/// Game lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Waiting,
    Dealing,
    Betting,
    Drawing,
    Showdown,
    Complete,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One seat as an observer is allowed to see it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeatView {
    pub position: Position,
    pub player: PlayerId,
    pub name: String,
    pub stack: Chips,
    pub status: SeatStatus,
    pub round_bet: Chips,
    pub subsets: BTreeMap<String, Vec<CardView>>,
    /// revealed only once declarations are collected
    pub declaration: Option<Declaration>,
}

/// The redacted state snapshot for one observer.
///
/// Own hole cards are always identified; other players' face-down cards
/// are opaque slots until showdown reveals the hands still in contention.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GameStateView {
    pub state: GameState,
    pub hand_number: u64,
    pub step_name: Option<String>,
    pub current_actor: Option<PlayerId>,
    pub pot_total: Chips,
    pub community: BTreeMap<String, Vec<CardView>>,
    pub seats: Vec<SeatView>,
}

impl GameStateView {
    pub fn seat(&self, player: PlayerId) -> Option<&SeatView> {
        self.seats.iter().find(|s| s.player == player)
    }
}

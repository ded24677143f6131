use crate::cards::Card;
use crate::rules::CardState;
use crate::rules::Declaration;
use crate::Chips;
use crate::PlayerId;
use crate::Position;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Active,
    Folded,
    AllIn,
    SittingOut,
    Disconnected,
}

impl SeatStatus {
    /// still contesting the hand
    pub fn in_hand(&self) -> bool {
        matches!(self, Self::Active | Self::AllIn)
    }
}

impl std::fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "A"),
            Self::Folded => write!(f, "F"),
            Self::AllIn => write!(f, "S"),
            Self::SittingOut => write!(f, "O"),
            Self::Disconnected => write!(f, "D"),
        }
    }
}

/// One dealt card with its visibility history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DealtCard {
    pub card: Card,
    pub state: CardState,
    /// step index at which the card went face up, if it did
    pub exposed_at: Option<usize>,
}

impl DealtCard {
    pub fn new(card: Card, state: CardState) -> Self {
        Self {
            card,
            state,
            exposed_at: None,
        }
    }
    pub fn is_up(&self) -> bool {
        self.state == CardState::FaceUp
    }
}

/// A seated player's per-hand record.
///
/// Hole cards live in named subsets; the unnamed default subset covers
/// games that never split the hand. A separate step moves cards between
/// subsets of the same map.
#[derive(Debug, Clone)]
pub struct Seat {
    pub position: Position,
    pub id: PlayerId,
    pub name: String,
    pub stack: Chips,
    pub status: SeatStatus,
    pub hole: BTreeMap<String, Vec<DealtCard>>,
    pub declaration: Option<Declaration>,
}

impl Seat {
    pub fn new(position: Position, id: PlayerId, name: String, stack: Chips) -> Self {
        Self {
            position,
            id,
            name,
            stack,
            status: SeatStatus::Active,
            hole: BTreeMap::new(),
            declaration: None,
        }
    }

    /// every card held, across subsets, deal order within each
    pub fn cards(&self) -> Vec<Card> {
        self.hole.values().flatten().map(|h| h.card).collect()
    }
    pub fn cards_in(&self, subset: &str) -> Vec<Card> {
        self.hole
            .get(subset)
            .map(|v| v.iter().map(|h| h.card).collect())
            .unwrap_or_default()
    }
    pub fn face_up(&self) -> Vec<Card> {
        self.hole
            .values()
            .flatten()
            .filter(|h| h.is_up())
            .map(|h| h.card)
            .collect()
    }
    pub fn face_down(&self) -> Vec<Card> {
        self.hole
            .values()
            .flatten()
            .filter(|h| !h.is_up())
            .map(|h| h.card)
            .collect()
    }
    pub fn hand_size(&self) -> usize {
        self.hole.values().map(|v| v.len()).sum()
    }

    pub fn give(&mut self, subset: &str, card: Card, state: CardState) {
        self.hole
            .entry(subset.to_string())
            .or_default()
            .push(DealtCard::new(card, state));
    }

    /// remove specific cards from a subset, preserving order of the rest
    pub fn take(&mut self, subset: &str, cards: &[Card]) -> Vec<DealtCard> {
        let Some(held) = self.hole.get_mut(subset) else {
            return Vec::new();
        };
        let mut taken = Vec::new();
        for card in cards {
            if let Some(i) = held.iter().position(|h| h.card == *card) {
                taken.push(held.remove(i));
            }
        }
        taken
    }

    /// flip cards face up, recording the step that exposed them
    pub fn expose(&mut self, subset: &str, cards: &[Card], step: usize) {
        if let Some(held) = self.hole.get_mut(subset) {
            for h in held.iter_mut() {
                if cards.contains(&h.card) {
                    h.state = CardState::FaceUp;
                    h.exposed_at = Some(step);
                }
            }
        }
    }

    pub fn win(&mut self, amount: Chips) {
        self.stack += amount;
    }

    /// wipe per-hand state; funded seats come back active
    pub fn reset(&mut self) {
        self.hole.clear();
        self.declaration = None;
        self.status = if self.stack > 0 {
            SeatStatus::Active
        } else {
            SeatStatus::SittingOut
        };
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:<3}{} {:<12} {:>8}",
            self.position, self.status, self.name, self.stack
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    #[test]
    fn subsets_and_visibility() {
        let mut seat = Seat::new(0, 7, "hero".to_string(), 100);
        let cards = parse_cards("As Kh 2c").unwrap();
        seat.give("default", cards[0], CardState::FaceDown);
        seat.give("default", cards[1], CardState::FaceDown);
        seat.give("Point", cards[2], CardState::FaceUp);
        assert_eq!(seat.hand_size(), 3);
        assert_eq!(seat.face_up(), vec![cards[2]]);
        seat.expose("default", &cards[..1], 4);
        assert_eq!(seat.face_up().len(), 2);
        let taken = seat.take("default", &cards[1..2]);
        assert_eq!(taken.len(), 1);
        assert_eq!(seat.hand_size(), 2);
    }

    #[test]
    fn reset_restores_active() {
        let mut seat = Seat::new(0, 7, "hero".to_string(), 100);
        seat.status = SeatStatus::Folded;
        seat.reset();
        assert_eq!(seat.status, SeatStatus::Active);
        seat.stack = 0;
        seat.reset();
        assert_eq!(seat.status, SeatStatus::SittingOut);
    }
}

use crate::cards::Card;
use crate::rules::CardState;
use crate::rules::DealLocation;
use crate::rules::Declaration;
use crate::Chips;
use crate::PlayerId;
use crate::Position;

/// One card as it appears in an event or view: hidden cards survive
/// redaction as opaque face-down markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CardView {
    pub card: Option<Card>,
    pub state: CardState,
}

impl CardView {
    pub fn open(card: Card) -> Self {
        Self {
            card: Some(card),
            state: CardState::FaceUp,
        }
    }
    pub fn held(card: Card) -> Self {
        Self {
            card: Some(card),
            state: CardState::FaceDown,
        }
    }
    pub fn hidden() -> Self {
        Self {
            card: None,
            state: CardState::FaceDown,
        }
    }
    /// redact the identity but keep the slot
    pub fn redacted(&self) -> Self {
        match self.state {
            CardState::FaceUp => *self,
            CardState::FaceDown => Self::hidden(),
        }
    }
}

/// Which forced bet an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForcedKind {
    Ante,
    SmallBlind,
    BigBlind,
    BringIn,
}

/// The totally ordered event log the caller drains.
///
/// Events carry full card identity; `Game::events_for` projects a
/// player-specific stream with face-down cards they do not own redacted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GameEvent {
    HandStarted {
        hand: u64,
        dealer: Position,
        stacks: Vec<(PlayerId, Chips)>,
    },
    ForcedBet {
        hand: u64,
        step: usize,
        player: PlayerId,
        kind: ForcedKind,
        amount: Chips,
    },
    Deal {
        hand: u64,
        step: usize,
        location: DealLocation,
        subset: String,
        player: Option<PlayerId>,
        cards: Vec<CardView>,
    },
    Action {
        hand: u64,
        step: usize,
        player: PlayerId,
        kind: String,
        amount: Option<Chips>,
        pot: Chips,
    },
    Discarded {
        hand: u64,
        step: usize,
        player: PlayerId,
        count: usize,
        to_community: Option<String>,
    },
    Drew {
        hand: u64,
        step: usize,
        player: PlayerId,
        count: usize,
    },
    Exposed {
        hand: u64,
        step: usize,
        player: PlayerId,
        cards: Vec<Card>,
    },
    Passed {
        hand: u64,
        step: usize,
        player: PlayerId,
        to: PlayerId,
        count: usize,
    },
    Separated {
        hand: u64,
        step: usize,
        player: PlayerId,
        subsets: Vec<String>,
    },
    Declared {
        hand: u64,
        step: usize,
        player: PlayerId,
        declaration: Declaration,
    },
    Chose {
        hand: u64,
        step: usize,
        player: PlayerId,
        name: String,
        value: String,
    },
    DieRolled {
        hand: u64,
        step: usize,
        subset: String,
        face: u8,
    },
    BoardRemoved {
        hand: u64,
        step: usize,
        subset: String,
    },
    PhaseChange {
        hand: u64,
        step: usize,
        name: String,
    },
    ShowdownHand {
        hand: u64,
        player: PlayerId,
        configuration: String,
        description: String,
        cards: Vec<Card>,
    },
    PotAwarded {
        hand: u64,
        pot: Option<usize>,
        configuration: String,
        board: Option<String>,
        winners: Vec<(PlayerId, Chips)>,
    },
    HandComplete {
        hand: u64,
    },
}

impl GameEvent {
    /// the player whose private cards this event may contain
    fn owner(&self) -> Option<PlayerId> {
        match self {
            Self::Deal { player, .. } => *player,
            _ => None,
        }
    }

    /// project this event for one observer, redacting hidden cards;
    /// pass `None` for a spectator
    pub fn for_observer(&self, observer: Option<PlayerId>) -> Self {
        match self.owner() {
            Some(owner) if Some(owner) != observer => match self {
                Self::Deal {
                    hand,
                    step,
                    location,
                    subset,
                    player,
                    cards,
                } => Self::Deal {
                    hand: *hand,
                    step: *step,
                    location: *location,
                    subset: subset.clone(),
                    player: *player,
                    cards: cards.iter().map(|c| c.redacted()).collect(),
                },
                _ => self.clone(),
            },
            _ => self.clone(),
        }
    }
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::HandStarted { hand, dealer, .. } => {
                write!(f, "hand #{} (dealer seat {})", hand, dealer)
            }
            Self::ForcedBet {
                player, kind, amount, ..
            } => write!(f, "P{} posts {:?} {}", player, kind, amount),
            Self::Deal {
                subset,
                player,
                cards,
                ..
            } => {
                let shown = cards
                    .iter()
                    .map(|c| c.card.map(|c| c.to_string()).unwrap_or("??".to_string()))
                    .collect::<Vec<String>>()
                    .join(" ");
                match player {
                    Some(p) => write!(f, "P{} dealt [{}] into {}", p, shown, subset),
                    None => write!(f, "board {} gets [{}]", subset, shown),
                }
            }
            Self::Action {
                player,
                kind,
                amount,
                pot,
                ..
            } => match amount {
                Some(n) => write!(f, "P{}: {} {} (pot {})", player, kind, n, pot),
                None => write!(f, "P{}: {} (pot {})", player, kind, pot),
            },
            Self::Discarded { player, count, .. } => write!(f, "P{} discards {}", player, count),
            Self::Drew { player, count, .. } => write!(f, "P{} draws {}", player, count),
            Self::Exposed { player, cards, .. } => {
                write!(
                    f,
                    "P{} exposes {}",
                    player,
                    cards
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<String>>()
                        .join(" ")
                )
            }
            Self::Passed { player, to, count, .. } => {
                write!(f, "P{} passes {} to P{}", player, count, to)
            }
            Self::Separated { player, subsets, .. } => {
                write!(f, "P{} separates into {}", player, subsets.join("/"))
            }
            Self::Declared {
                player, declaration, ..
            } => write!(f, "P{} declares {}", player, declaration),
            Self::Chose {
                player, name, value, ..
            } => write!(f, "P{} chooses {} = {}", player, name, value),
            Self::DieRolled { subset, face, .. } => write!(f, "die in {} shows {}", subset, face),
            Self::BoardRemoved { subset, .. } => write!(f, "board {} removed", subset),
            Self::PhaseChange { name, .. } => write!(f, "step: {}", name),
            Self::ShowdownHand {
                player, description, ..
            } => write!(f, "P{} shows {}", player, description),
            Self::PotAwarded {
                configuration,
                winners,
                ..
            } => {
                let list = winners
                    .iter()
                    .map(|(p, c)| format!("P{} +{}", p, c))
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "{}: {}", configuration, list)
            }
            Self::HandComplete { hand } => write!(f, "hand #{} complete", hand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    #[test]
    fn deal_redaction() {
        let cards = parse_cards("As Kh").unwrap();
        let event = GameEvent::Deal {
            hand: 1,
            step: 0,
            location: DealLocation::Player,
            subset: "default".to_string(),
            player: Some(7),
            cards: cards.iter().map(|&c| CardView::held(c)).collect(),
        };
        let own = event.for_observer(Some(7));
        let other = event.for_observer(Some(8));
        let spectator = event.for_observer(None);
        match own {
            GameEvent::Deal { cards, .. } => assert!(cards.iter().all(|c| c.card.is_some())),
            _ => unreachable!(),
        }
        for view in [other, spectator] {
            match view {
                GameEvent::Deal { cards, .. } => {
                    assert!(cards.iter().all(|c| c.card.is_none()))
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn face_up_deals_stay_visible() {
        let cards = parse_cards("As").unwrap();
        let event = GameEvent::Deal {
            hand: 1,
            step: 3,
            location: DealLocation::Player,
            subset: "default".to_string(),
            player: Some(7),
            cards: vec![CardView::open(cards[0])],
        };
        match event.for_observer(Some(8)) {
            GameEvent::Deal { cards, .. } => assert_eq!(cards[0].card, Some(parse_cards("As").unwrap()[0])),
            _ => unreachable!(),
        }
    }

    #[test]
    fn serde_round_trip() {
        let event = GameEvent::PotAwarded {
            hand: 4,
            pot: Some(1),
            configuration: "Low Hand".to_string(),
            board: None,
            winners: vec![(1, 50), (2, 50)],
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}

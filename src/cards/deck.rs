use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use crate::errors::EngineError;
use crate::errors::RulesError;
use rand::seq::SliceRandom;

/// Deck families supported by rule documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckKind {
    /// 52 cards
    Standard,
    /// 36 cards, sixes up
    Short,
    /// 20 cards, tens up
    Twenty,
}

impl DeckKind {
    /// lowest rank present in this deck family
    const fn floor(&self) -> Rank {
        match self {
            Self::Standard => Rank::Two,
            Self::Short => Rank::Six,
            Self::Twenty => Rank::Ten,
        }
    }
    pub const fn size(&self) -> usize {
        match self {
            Self::Standard => 52,
            Self::Short => 36,
            Self::Twenty => 20,
        }
    }
}

/// The deck descriptor carried by a rule document.
///
/// `cards` is the declared total including jokers; composition is validated
/// against it so a malformed document fails at load, not mid-hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeckSpec {
    #[serde(rename = "type")]
    pub kind: DeckKind,
    pub cards: usize,
    #[serde(default)]
    pub jokers: u8,
}

impl DeckSpec {
    pub const fn standard() -> Self {
        Self {
            kind: DeckKind::Standard,
            cards: 52,
            jokers: 0,
        }
    }
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.jokers > 4 {
            return Err(RulesError::InvalidRules(format!(
                "deck declares {} jokers, at most 4 supported",
                self.jokers
            )));
        }
        let expected = self.kind.size() + self.jokers as usize;
        if self.cards != expected {
            return Err(RulesError::InvalidRules(format!(
                "deck declares {} cards, composition yields {}",
                self.cards, expected
            )));
        }
        Ok(())
    }
    /// every card this descriptor composes, jokers last
    pub fn composition(&self) -> Vec<Card> {
        let floor = self.kind.floor() as u8;
        let mut cards = Rank::all()
            .into_iter()
            .filter(|r| (*r as u8) >= floor)
            .flat_map(|r| Suit::all().into_iter().map(move |s| Card::from((r, s))))
            .collect::<Vec<Card>>();
        cards.extend((0..self.jokers).map(Card::joker));
        cards
    }
}

/// An ordered deck. Dealing is strictly sequential from the top.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(spec: &DeckSpec) -> Result<Self, RulesError> {
        spec.validate()?;
        let cards = spec.composition();
        assert!(cards.len() == spec.cards);
        Ok(Self { cards })
    }

    pub fn shuffle<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// A deck that deals `front` in order, then the rest of the
    /// descriptor's composition. Fixture support: scripted hands name
    /// their exact cards, and a card the variant's deck never held is a
    /// broken fixture, not a quiet extra.
    pub fn rigged(spec: &DeckSpec, front: Vec<Card>) -> Result<Self, RulesError> {
        let mut deck = Self::new(spec)?;
        for card in front.iter() {
            match deck.cards.iter().position(|c| c == card) {
                Some(i) => {
                    deck.cards.remove(i);
                }
                None => {
                    return Err(RulesError::InvalidRules(format!(
                        "rigged card {} is not in the deck",
                        card
                    )));
                }
            }
        }
        deck.cards.extend(front.into_iter().rev());
        Ok(deck)
    }

    /// top of the deck is the end of the vec; cards come back in the
    /// order they left it
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, EngineError> {
        if n > self.cards.len() {
            return Err(EngineError::DeckExhausted {
                requested: n,
                remaining: self.cards.len(),
            });
        }
        let mut cards = self.cards.split_off(self.cards.len() - n);
        cards.reverse();
        Ok(cards)
    }

    pub fn burn(&mut self) -> Result<Card, EngineError> {
        self.deal(1).map(|mut cards| cards.pop().expect("one card"))
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashSet;

    #[test]
    fn standard_composition() {
        let mut deck = Deck::new(&DeckSpec::standard()).unwrap();
        assert_eq!(deck.remaining(), 52);
        let distinct = deck.deal(52).unwrap().into_iter().collect::<HashSet<Card>>();
        assert_eq!(distinct.len(), 52);
    }

    #[test]
    fn short_deck_floor() {
        let spec = DeckSpec {
            kind: DeckKind::Short,
            cards: 36,
            jokers: 0,
        };
        let mut deck = Deck::new(&spec).unwrap();
        let cards = deck.deal(36).unwrap();
        assert!(cards.iter().all(|c| c.rank() >= Rank::Six));
    }

    #[test]
    fn joker_composition() {
        let spec = DeckSpec {
            kind: DeckKind::Standard,
            cards: 54,
            jokers: 2,
        };
        let deck = Deck::new(&spec).unwrap();
        assert_eq!(deck.remaining(), 54);
    }

    #[test]
    fn invalid_composition_rejected() {
        let spec = DeckSpec {
            kind: DeckKind::Standard,
            cards: 53,
            jokers: 0,
        };
        assert!(Deck::new(&spec).is_err());
    }

    #[test]
    fn exhaustion() {
        let mut deck = Deck::new(&DeckSpec::standard()).unwrap();
        assert!(deck.deal(52).is_ok());
        assert_eq!(
            deck.deal(1),
            Err(EngineError::DeckExhausted {
                requested: 1,
                remaining: 0
            })
        );
    }

    #[test]
    fn seeded_shuffle_is_deterministic() {
        let mut one = Deck::new(&DeckSpec::standard()).unwrap();
        let mut two = Deck::new(&DeckSpec::standard()).unwrap();
        one.shuffle(&mut SmallRng::seed_from_u64(7));
        two.shuffle(&mut SmallRng::seed_from_u64(7));
        assert_eq!(one.deal(52).unwrap(), two.deal(52).unwrap());
    }

    #[test]
    fn rigged_deals_front_first() {
        let front = crate::cards::parse_cards("As Ks 2c").unwrap();
        let mut deck = Deck::rigged(&DeckSpec::standard(), front.clone()).unwrap();
        assert_eq!(deck.deal(3).unwrap(), front);
        assert_eq!(deck.remaining(), 49);
    }

    #[test]
    fn rigged_keeps_the_deck_family() {
        let spec = DeckSpec {
            kind: DeckKind::Short,
            cards: 36,
            jokers: 0,
        };
        let front = crate::cards::parse_cards("As 9h").unwrap();
        let mut deck = Deck::rigged(&spec, front).unwrap();
        let cards = deck.deal(36).unwrap();
        assert!(cards.iter().all(|c| c.rank() >= Rank::Six));
    }

    #[test]
    fn rigged_rejects_foreign_cards() {
        let spec = DeckSpec {
            kind: DeckKind::Short,
            cards: 36,
            jokers: 0,
        };
        // no deuces in a short deck, and no card twice
        let front = crate::cards::parse_cards("2c").unwrap();
        assert!(Deck::rigged(&spec, front).is_err());
        let front = crate::cards::parse_cards("As As").unwrap();
        assert!(Deck::rigged(&DeckSpec::standard(), front).is_err());
    }
}

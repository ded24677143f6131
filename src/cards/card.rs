use super::rank::Rank;
use super::suit::Suit;

/// A playing card.
///
/// Jokers carry rank `Joker` and reuse the suit field as a token index, so
/// up to four jokers in one deck remain distinguishable. Ordering here is
/// structural only: hand comparisons are the evaluator's business.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub const fn rank(&self) -> Rank {
        self.rank
    }
    pub const fn suit(&self) -> Suit {
        self.suit
    }
    pub const fn is_joker(&self) -> bool {
        self.rank.is_joker()
    }
    pub const fn joker(token: u8) -> Self {
        assert!(token < 4, "at most four jokers per deck");
        Self {
            rank: Rank::Joker,
            suit: match token {
                0 => Suit::Club,
                1 => Suit::Diamond,
                2 => Suit::Heart,
                _ => Suit::Spade,
            },
        }
    }
}

impl From<(Rank, Suit)> for Card {
    fn from((rank, suit): (Rank, Suit)) -> Self {
        Self { rank, suit }
    }
}

// u8 isomorphism. standard cards occupy 0..52, jokers 52..56
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        (c.rank as u8) * 4 + (c.suit as u8)
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        Self {
            rank: Rank::from(n / 4),
            suit: Suit::from(n % 4),
        }
    }
}

impl TryFrom<&str> for Card {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut chars = s.chars();
        let rank = chars.next().ok_or(anyhow::anyhow!("empty card"))?;
        let suit = chars.next().ok_or(anyhow::anyhow!("missing suit"))?;
        anyhow::ensure!(chars.next().is_none(), "trailing card chars in {}", s);
        Ok(Self {
            rank: Rank::try_from(rank)?,
            suit: Suit::try_from(suit)?,
        })
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl crate::Arbitrary for Card {
    fn random() -> Self {
        Self::from(rand::random_range(0..52u8))
    }
}

/// parse a whitespace-separated card list, mainly for tests and fixtures
pub fn parse_cards(s: &str) -> Result<Vec<Card>, anyhow::Error> {
    s.split_whitespace().map(Card::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u8() {
        for n in 0..52u8 {
            assert_eq!(u8::from(Card::from(n)), n);
        }
    }

    #[test]
    fn parse_roundtrip() {
        for s in ["As", "Td", "2c", "Kh"] {
            let card = Card::try_from(s).unwrap();
            assert_eq!(card.to_string(), s);
        }
    }

    #[test]
    fn jokers_distinguishable() {
        assert_ne!(Card::joker(0), Card::joker(1));
        assert!(Card::joker(0).is_joker());
    }
}

use crate::cards::Rank;

/// A five-card hand's shape.
///
/// This is the category half of a hand's value; kickers break ties within
/// a category. How categories order against each other is a property of the
/// evaluation family: short-deck play lifts flushes above full houses, and
/// the lowball families invert the ladder outright.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub enum Ranking {
    HighCard(Rank),        // 4 kickers
    OnePair(Rank),         // 3 kickers
    TwoPair(Rank, Rank),   // 1 kickers
    ThreeOAK(Rank),        // 2 kickers
    Straight(Rank),        // 0 kickers
    Flush(Rank),           // 0 kickers
    FullHouse(Rank, Rank), // 0 kickers
    FourOAK(Rank),         // 1 kickers
    StraightFlush(Rank),   // 0 kickers
}

impl Ranking {
    pub fn n_kickers(&self) -> usize {
        match self {
            Ranking::HighCard(_) => 4,
            Ranking::OnePair(_) => 3,
            Ranking::ThreeOAK(_) => 2,
            Ranking::FourOAK(_) | Ranking::TwoPair(_, _) => 1,
            _ => 0,
        }
    }

    /// Category index under the standard high ladder. 1 is strongest.
    pub fn high_category(&self) -> u32 {
        match self {
            Ranking::StraightFlush(_) => 1,
            Ranking::FourOAK(_) => 2,
            Ranking::FullHouse(..) => 3,
            Ranking::Flush(_) => 4,
            Ranking::Straight(_) => 5,
            Ranking::ThreeOAK(_) => 6,
            Ranking::TwoPair(..) => 7,
            Ranking::OnePair(_) => 8,
            Ranking::HighCard(_) => 9,
        }
    }

    /// Category index with flushes above full houses, the 36-card ladder.
    pub fn short_category(&self) -> u32 {
        match self {
            Ranking::StraightFlush(_) => 1,
            Ranking::FourOAK(_) => 2,
            Ranking::Flush(_) => 3,
            Ranking::FullHouse(..) => 4,
            Ranking::Straight(_) => 5,
            Ranking::ThreeOAK(_) => 6,
            Ranking::TwoPair(..) => 7,
            Ranking::OnePair(_) => 8,
            Ranking::HighCard(_) => 9,
        }
    }

    /// The payload ranks that define the category, strongest first.
    pub fn primaries(&self) -> Vec<Rank> {
        match *self {
            Ranking::TwoPair(hi, lo) | Ranking::FullHouse(hi, lo) => vec![hi, lo],
            Ranking::HighCard(r)
            | Ranking::OnePair(r)
            | Ranking::ThreeOAK(r)
            | Ranking::Straight(r)
            | Ranking::Flush(r)
            | Ranking::FourOAK(r)
            | Ranking::StraightFlush(r) => vec![r],
        }
    }

    /// Player-facing description, e.g. "Two Pair, Aces and Kings".
    pub fn describe(&self) -> String {
        match *self {
            Ranking::HighCard(r) => format!("{} High", r.label()),
            Ranking::OnePair(r) => format!("Pair of {}s", r.label()),
            Ranking::TwoPair(hi, lo) => {
                format!("Two Pair, {}s and {}s", hi.label(), lo.label())
            }
            Ranking::ThreeOAK(r) => format!("Three of a Kind, {}s", r.label()),
            Ranking::Straight(r) => format!("{}-High Straight", r.label()),
            Ranking::Flush(r) => format!("{}-High Flush", r.label()),
            Ranking::FullHouse(hi, lo) => {
                format!("Full House, {}s over {}s", hi.label(), lo.label())
            }
            Ranking::FourOAK(r) => format!("Four of a Kind, {}s", r.label()),
            Ranking::StraightFlush(Rank::Ace) => "Royal Flush".to_string(),
            Ranking::StraightFlush(r) => format!("{}-High Straight Flush", r.label()),
        }
    }
}

impl std::fmt::Display for Ranking {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Ranking::FullHouse(r1, r2) => write!(f, "FullHouse     {}{}", r1, r2),
            Ranking::TwoPair(r1, r2) => write!(f, "TwoPair       {}{}", r1, r2),
            Ranking::HighCard(r) => write!(f, "HighCard      {} ", r),
            Ranking::OnePair(r) => write!(f, "OnePair       {} ", r),
            Ranking::ThreeOAK(r) => write!(f, "ThreeOfAKind  {} ", r),
            Ranking::Straight(r) => write!(f, "Straight      {} ", r),
            Ranking::FourOAK(r) => write!(f, "FourOfAKind   {} ", r),
            Ranking::Flush(r) => write!(f, "Flush         {} ", r),
            Ranking::StraightFlush(r) => write!(f, "StraightFlush {} ", r),
        }
    }
}

use crate::cards::Card;
use std::cmp::Ordering;

/// A hand's evaluated strength.
///
/// `rank` is the category index within the evaluation family (1 is
/// strongest); `ordered_rank` positions the hand within its category.
/// `rank == 0` is reserved for hands that failed a qualifier and lose to
/// everything. Ties on both numbers split the pot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HandStrength {
    pub rank: u32,
    pub ordered_rank: u32,
    pub description: String,
    pub cards_used: Vec<Card>,
}

impl HandStrength {
    pub fn unqualified() -> Self {
        Self {
            rank: 0,
            ordered_rank: 0,
            description: "Does Not Qualify".to_string(),
            cards_used: Vec::new(),
        }
    }
    pub fn is_qualified(&self) -> bool {
        self.rank > 0
    }
    /// Strength comparison: Greater means self wins.
    pub fn cmp_strength(&self, other: &Self) -> Ordering {
        match (self.is_qualified(), other.is_qualified()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => (other.rank, other.ordered_rank).cmp(&(self.rank, self.ordered_rank)),
        }
    }
    pub fn beats(&self, other: &Self) -> bool {
        self.cmp_strength(other) == Ordering::Greater
    }
    pub fn ties(&self, other: &Self) -> bool {
        self.cmp_strength(other) == Ordering::Equal
    }
}

impl std::fmt::Display for HandStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:<32} ({}:{})", self.description, self.rank, self.ordered_rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strength(rank: u32, ordered: u32) -> HandStrength {
        HandStrength {
            rank,
            ordered_rank: ordered,
            description: String::new(),
            cards_used: Vec::new(),
        }
    }

    #[test]
    fn lower_numbers_win() {
        assert!(strength(1, 1).beats(&strength(1, 2)));
        assert!(strength(1, 9).beats(&strength(2, 1)));
        assert!(strength(3, 4).ties(&strength(3, 4)));
    }

    #[test]
    fn unqualified_loses_to_everything() {
        assert!(strength(9, 999).beats(&HandStrength::unqualified()));
        assert!(HandStrength::unqualified().ties(&HandStrength::unqualified()));
    }
}

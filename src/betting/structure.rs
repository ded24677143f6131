use crate::Chips;

/// How bet sizes are bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Structure {
    Limit,
    NoLimit,
    PotLimit,
}

impl std::fmt::Display for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Limit => write!(f, "Limit"),
            Self::NoLimit => write!(f, "No-Limit"),
            Self::PotLimit => write!(f, "Pot-Limit"),
        }
    }
}

/// Table stakes: every forced-bet and limit-rung amount in one place.
///
/// Which fields matter depends on the variant; a blinds game ignores the
/// bring-in, a stud game ignores the blinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Stakes {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub ante: Chips,
    pub bring_in: Chips,
    /// limit rung for early streets; the no-limit minimum open
    pub small_bet: Chips,
    /// limit rung for later streets
    pub big_bet: Chips,
}

impl Stakes {
    /// blinds games: bets at the big blind, double on later streets
    pub fn blinds(small_blind: Chips, big_blind: Chips) -> Self {
        Self {
            small_blind,
            big_blind,
            ante: 0,
            bring_in: 0,
            small_bet: big_blind,
            big_bet: big_blind * 2,
        }
    }
    /// stud games: antes and a bring-in, fixed rungs
    pub fn stud(ante: Chips, bring_in: Chips, small_bet: Chips) -> Self {
        Self {
            small_blind: 0,
            big_blind: 0,
            ante,
            bring_in,
            small_bet,
            big_bet: small_bet * 2,
        }
    }
    pub fn with_ante(mut self, ante: Chips) -> Self {
        self.ante = ante;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rungs_follow_blinds() {
        let stakes = Stakes::blinds(1, 2);
        assert_eq!(stakes.small_bet, 2);
        assert_eq!(stakes.big_bet, 4);
    }
}

use crate::cards::Card;
use crate::Chips;
use crate::PlayerId;

/// One pot share's outcome at showdown.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PotResult {
    /// `None` is the main pot, `Some(i)` side pot i
    pub pot: Option<usize>,
    pub configuration: String,
    pub board: Option<String>,
    pub amount: Chips,
    pub winners: Vec<(PlayerId, Chips)>,
}

/// One revealed hand at showdown.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShownHand {
    pub player: PlayerId,
    pub configuration: String,
    pub rank: u32,
    pub ordered_rank: u32,
    pub description: String,
    pub cards_used: Vec<Card>,
}

/// The authoritative result of one hand.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HandResults {
    pub hand_number: u64,
    pub pots: Vec<PotResult>,
    pub hands: Vec<ShownHand>,
}

impl HandResults {
    pub fn total_awarded(&self) -> Chips {
        self.pots
            .iter()
            .flat_map(|p| p.winners.iter())
            .map(|(_, amount)| amount)
            .sum()
    }
    pub fn won_by(&self, player: PlayerId) -> Chips {
        self.pots
            .iter()
            .flat_map(|p| p.winners.iter())
            .filter(|(p, _)| *p == player)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl std::fmt::Display for HandResults {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "hand #{}:", self.hand_number)?;
        for pot in self.pots.iter() {
            for (player, amount) in pot.winners.iter() {
                write!(f, " P{} +{} ({})", player, amount, pot.configuration)?;
            }
        }
        Ok(())
    }
}
